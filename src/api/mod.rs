mod error;
pub mod models;
pub mod normalize;
mod server;
pub mod services;
pub mod state;

pub use error::ApiError;
pub use server::{router, run};
pub use state::AppState;
