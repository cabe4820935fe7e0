//! castgrid wire format
//!
//! Types for the two backend endpoints and for the shared notification
//! value. Everything here is plain serde data; no I/O.
//!
//! # Endpoints
//!
//! - `POST /api/process-file`: multipart upload. One `file` part plus one
//!   `cast-col-<header>` part per requested cast. Answers [`UploadResponse`].
//! - `GET /api/get-data`: one page of an ingested file. Query string is
//!   [`QueryParams`], answer is [`TablePage`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const PROCESS_FILE_PATH: &str = "/api/process-file";
pub const GET_DATA_PATH: &str = "/api/get-data";

/// Multipart part holding the file bytes.
pub const FILE_PART: &str = "file";

// =============================================================================
// Ingestion
// =============================================================================

/// Answer of the ingestion endpoint.
///
/// `errors` lists columns whose requested cast failed. The upload itself
/// still succeeded; the backend kept an inferred type for those columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: String,
    #[serde(default)]
    pub errors: HashMap<String, String>,
}

// =============================================================================
// Query
// =============================================================================

/// Query string of the data endpoint. Sorting is omitted when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    pub file_id: String,
    /// 0-based
    pub page: u64,
    pub page_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asc: Option<bool>,
}

/// Backend metadata for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub col_index: u32,
    pub col_name: String,
    /// Machine type tag (`int64`, `datetime64[ns]`, `complex128`, ...)
    pub col_type: String,
    pub human_col_type: String,
}

/// One row as sent by the backend.
///
/// Values are JSON scalars, `{real, imag}` objects for complex columns,
/// date/time strings for datetime columns, or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRow {
    /// 0-based
    pub row_index: u64,
    pub values: HashMap<String, serde_json::Value>,
}

/// One page of an ingested dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    pub cols: HashMap<String, ColumnDescriptor>,
    pub rows: Vec<WireRow>,
    pub page: u64,
    #[serde(rename = "pageSize", alias = "page_size")]
    pub page_size: u64,
    pub total_rows: u64,
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Success,
    Error,
}

/// The single user-facing outcome banner.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Notification {
    pub open: bool,
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn shown(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            open: true,
            severity,
            message: message.into(),
        }
    }
}
