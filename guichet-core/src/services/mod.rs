//! Service layer for business logic
//!
//! [`AuthService`] is the state machine driving the account lifecycle
//! flows; [`AccountService`] covers administrative account operations;
//! [`Notifier`] is the seam to out-of-band delivery.

pub mod account;
pub mod auth;
pub mod notify;

pub use account::AccountService;
pub use auth::{AuthService, Registration};
pub use notify::{Notifier, NotifyError, NullNotifier};
