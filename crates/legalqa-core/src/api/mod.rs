//! REST API client module for the Legal QA backend.
//!
//! This module provides the `ApiClient` for the authentication endpoints
//! (`/token`, `/register`, `/users/me`) and the workspace endpoints used by
//! the view layer.
//!
//! The API uses OAuth2 password-grant bearer tokens.

pub mod auth;
pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
