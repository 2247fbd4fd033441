pub mod config;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod server;

pub use handler::McpHandler;
pub use server::McpServer;
