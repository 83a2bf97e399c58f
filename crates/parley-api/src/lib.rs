pub mod accounts;
pub mod chat;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::{AppState, AppStateInner};
