//! Data models for the Legal QA backend.
//!
//! - `Token`: opaque bearer credential
//! - `User`: identity returned by `/users/me`
//! - Workspace types: answers, ingestion acknowledgements, usage metrics and
//!   drift comparison records

pub mod token;
pub mod user;
pub mod workspace;

pub use token::Token;
pub use user::User;
pub use workspace::{
    AnswerComparison, AskResponse, DriftMetrics, DriftRecord, MessageResponse, MetricPoint,
    MetricSeries, MetricsWindow, RetrievedDocuments,
};
