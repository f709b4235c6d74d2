//! Bingo HTTP API
//!
//! Accepts start requests, acknowledges them immediately and runs each game
//! as an independent background task.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use server::{build_app, ApiServer};
