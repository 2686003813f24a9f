//! # Guichet Axum Integration
//!
//! Ready-to-use Axum routes for the guichet authentication service:
//! registration, login, email verification, password reset and the
//! administrative `/users` surface.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use guichet_axum::{AppState, create_router};
//! use guichet_core::{CredentialHasher, services::NullNotifier};
//! use guichet_storage_sqlite::SqliteRepositoryProvider;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
//!     let repositories = Arc::new(SqliteRepositoryProvider::new(pool));
//!
//!     let state = AppState::new(
//!         repositories,
//!         Arc::new(CredentialHasher::default()),
//!         Arc::new(NullNotifier),
//!     );
//!     let app = create_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

mod error;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use routes::{AppState, create_router};
pub use types::{
    AccountSummary, EmailRequest, GENERIC_ACK, HealthResponse, ListQuery, LoginRequest,
    MessageResponse, RegisterRequest, ResetPasswordRequest, TokenQuery, UpdateAccountRequest,
};
