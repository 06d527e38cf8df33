//! REST surface for the hive community-safety pipeline.
//!
//! Routes are grouped per resource, state is shared through
//! [`state::AppState`], and authentication is a JWT bearer middleware
//! that places the validated claims into request extensions.

pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ApiConfig;
pub use routes::create_router;
pub use server::{run_server, start_background_server};
pub use state::AppState;
