//! Backend HTTP boundary
//!
//! - `client`: [`ApiClient`], one method per endpoint
//! - `types`: request and response bodies

pub mod client;
pub mod types;

pub use client::{validate_csv_path, ApiClient};
pub use types::{ConversationDetail, ConversationSummary, DatasetInfo, UploadResponse};
