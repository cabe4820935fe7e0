//! Ingestion backend client.
//!
//! This crate is the single source of truth for the backend wire contract:
//! multipart upload with cast directives, and paginated data queries.
//!
//! The controllers in `castgrid-core` only see the [`IngestTransport`]
//! trait; [`IngestClient`] is the blocking reqwest implementation.

mod cancel;
mod client;

use thiserror::Error;

use castgrid_protocol::{QueryParams, TablePage, UploadResponse};

pub use cancel::CancelToken;
pub use client::{IngestClient, UploadRequest};

/// Error type for backend operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network error
    #[error("network error: {0}")]
    Network(String),
    /// HTTP error with status code
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    /// Server rejected the request (400/422 with message)
    #[error("{0}")]
    Validation(String),
    /// JSON parsing error
    #[error("parse error: {0}")]
    Parse(String),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(String),
    /// The request was superseded before it settled
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

/// The two backend operations the controllers depend on.
pub trait IngestTransport {
    fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ClientError>;

    /// Fetch one page. Implementations should give up with
    /// [`ClientError::Cancelled`] once `cancel` is set.
    fn query(&self, params: &QueryParams, cancel: &CancelToken) -> Result<TablePage, ClientError>;
}

impl IngestTransport for IngestClient {
    fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ClientError> {
        self.process_file(request)
    }

    fn query(&self, params: &QueryParams, cancel: &CancelToken) -> Result<TablePage, ClientError> {
        self.get_data(params, cancel)
    }
}
