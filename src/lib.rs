// Library exports for the spiral cycles bot
// This allows the replay tool, the binaries and integration tests to share the core logic

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod edge_guard;
pub mod engine;
pub mod fallback;
pub mod handler;
pub mod pattern;
pub mod replay;
pub mod session;
pub mod trail;
pub mod types;
pub mod validator;
