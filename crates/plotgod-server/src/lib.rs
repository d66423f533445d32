pub mod errors;
pub mod handlers;
pub mod payload;
pub mod server;

pub use errors::ApiError;
pub use server::{start, AppState, ServerConfig, ServerHandle};
