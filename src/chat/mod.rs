pub mod engine;

pub use engine::{ChatEngine, ChatError, Role, Turn};
