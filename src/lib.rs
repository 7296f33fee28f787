// HTTP Server modules
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

// Relay pipeline
pub mod conversation;
pub mod gateway;
pub mod reply;
pub mod twiml;

pub mod config;
pub mod error;

// LLM abstraction layer
pub mod llm;
