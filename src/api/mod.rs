//! API server module for the WebSocket chat endpoint and client UI

pub mod events;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod session;
pub mod types;

pub use handlers::AppState;
pub use server::serve;
