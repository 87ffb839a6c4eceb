//! Per-request health snapshot and the context prefix built from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write;

const CONTEXT_HEADER: &str = "Current health metrics:\n";
const USER_MESSAGE_MARKER: &str = "\nUser message: ";

/// Metric name to value, in the order the client sent them.
///
/// Never stored: it only shapes the message of the request it arrived with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthSnapshot(Map<String, Value>);

impl HealthSnapshot {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the context block, or `None` when there are no metrics.
    pub fn render_context(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut context = String::from(CONTEXT_HEADER);
        for (metric, value) in &self.0 {
            let _ = writeln!(context, "- {}: {}", metric, display_value(value));
        }
        context.push_str(USER_MESSAGE_MARKER);
        Some(context)
    }
}

impl From<Map<String, Value>> for HealthSnapshot {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// Strings go in bare; everything else keeps its JSON spelling
// (`true`, `false`, `null`), matching what the client sent.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Build the message sent to the model: context block (if any) followed by the user's text.
pub fn compose_message(user_message: &str, snapshot: Option<&HealthSnapshot>) -> String {
    match snapshot.and_then(HealthSnapshot::render_context) {
        Some(context) => format!("{}{}", context, user_message),
        None => user_message.to_string(),
    }
}
