//! Typed REST clients for the JobGrid platform services.
//!
//! Every wrapper routes through [`http::ApiClient`], which attaches the
//! stored access token to outbound requests and recovers from a 401 exactly
//! once by refreshing the session. Service clients built from the same
//! [`session::SessionManager`] share its refresh coalescing, so a burst of
//! unauthorized responses across services still produces a single refresh
//! call.

pub mod applications;
pub mod auth;
pub mod error;
pub mod health;
pub mod http;
pub mod jobs;
pub mod profile;
pub mod services;

pub use error::ApiError;
pub use http::{ApiClient, AuthMode, RequestOptions};
pub use services::ServiceClients;
