pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod sweeper;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types
pub use routes::{build_app, build_router};
pub use state::AppState;
pub use sweeper::spawn_sweeper;
