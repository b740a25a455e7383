//! LegacyTree server: router, shared state and demo data.

pub mod routes;
pub mod seed;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
