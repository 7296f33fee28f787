// Handlers module

pub mod health;
pub mod home;
pub mod webhook;

pub use health::health_handler;
pub use home::home_handler;
pub use webhook::{relay, webhook_handler};
