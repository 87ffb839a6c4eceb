pub mod chat;
pub mod history;
pub mod metrics;
pub mod providers;

pub use chat::{ChatError, ChatOrchestrator};
pub use history::{HistoryStore, InMemoryHistoryStore};
