//! Domain models for the chat service.

pub mod health;
pub mod turn;

pub use health::{compose_message, HealthSnapshot};
pub use turn::{Role, Turn};
