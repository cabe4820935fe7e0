//! Upload lifecycle: file selection, cast plan editing, submission.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use castgrid_client::{ClientError, IngestTransport, UploadRequest};
use castgrid_plan::CastPlan;
use castgrid_protocol::{Severity, UploadResponse};
use castgrid_reader::{CellGrid, FileKind};
use serde::Serialize;

use crate::notify::Dispatcher;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";
pub const UPLOAD_ERROR_MESSAGE: &str = "Error uploading file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// A selected file and what was read from it.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub kind: FileKind,
    pub grid: CellGrid,
}

/// One submission in flight.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    seq: u64,
    request: UploadRequest,
}

impl UploadTicket {
    pub fn request(&self) -> &UploadRequest {
        &self.request
    }
}

/// Per-column cast failure reported by a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CastFailure {
    pub column: String,
    pub message: String,
}

impl std::fmt::Display for CastFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error in {}: {}", self.column, self.message)
    }
}

pub struct UploadCoordinator {
    status: UploadStatus,
    file: Option<SelectedFile>,
    plan: Option<CastPlan>,
    file_id: Option<String>,
    errors: HashMap<String, String>,
    failure: Option<ClientError>,
    /// Headers of the last submitted file, for ordering `errors`
    submitted_headers: Vec<String>,
    next_seq: u64,
    in_flight: Option<u64>,
    dispatch: Dispatcher,
}

impl UploadCoordinator {
    pub fn new(dispatch: Dispatcher) -> Self {
        Self {
            status: UploadStatus::Idle,
            file: None,
            plan: None,
            file_id: None,
            errors: HashMap::new(),
            failure: None,
            submitted_headers: Vec::new(),
            next_seq: 0,
            in_flight: None,
            dispatch,
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn grid(&self) -> Option<&CellGrid> {
        self.file.as_ref().map(|f| &f.grid)
    }

    pub fn plan(&self) -> Option<&CastPlan> {
        self.plan.as_ref()
    }

    pub fn plan_mut(&mut self) -> Option<&mut CastPlan> {
        self.plan.as_mut()
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    /// Transport error behind the current `Error` status.
    pub fn last_failure(&self) -> Option<&ClientError> {
        self.failure.as_ref()
    }

    /// Select a file from disk.
    ///
    /// Unsupported or unreadable files are logged and leave everything as
    /// it was; returns whether the selection took.
    pub fn select_file(&mut self, path: &Path) -> bool {
        let Some(grid) = castgrid_reader::load(path) else {
            return false;
        };
        let Ok(kind) = FileKind::from_path(path) else {
            return false;
        };
        self.select_grid(path.to_path_buf(), kind, grid);
        true
    }

    /// Select an already decoded file.
    ///
    /// An upload still in flight is abandoned; its outcome is ignored when
    /// it settles.
    pub fn select_grid(&mut self, path: PathBuf, kind: FileKind, grid: CellGrid) {
        let headers = castgrid_reader::headers(&grid).to_vec();
        tracing::debug!(path = %path.display(), columns = headers.len(), rows = grid.len(), "file selected");
        if let Some(seq) = self.in_flight.take() {
            tracing::debug!(seq, "abandoning in-flight upload");
        }
        self.plan = Some(CastPlan::new(headers));
        self.file = Some(SelectedFile { path, kind, grid });
        self.enter(UploadStatus::Idle);
    }

    /// Start a submission.
    ///
    /// Returns `None` when there is no file or plan, when another
    /// submission is still loading, or when the file cannot be read.
    pub fn begin_submit(&mut self) -> Option<UploadTicket> {
        if self.status == UploadStatus::Loading {
            tracing::debug!("submit ignored, upload already in flight");
            return None;
        }
        let (file, plan) = match (&self.file, &self.plan) {
            (Some(file), Some(plan)) => (file, plan),
            _ => return None,
        };

        let request = match UploadRequest::from_path(&file.path, file.kind.mime(), plan.directives()) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!("cannot read {}: {}", file.path.display(), e);
                return None;
            }
        };

        self.submitted_headers = plan.headers().to_vec();
        self.next_seq += 1;
        self.in_flight = Some(self.next_seq);
        self.enter(UploadStatus::Loading);
        Some(UploadTicket {
            seq: self.next_seq,
            request,
        })
    }

    /// Report the outcome of a submission. Returns the new file id on
    /// success.
    pub fn settle(
        &mut self,
        ticket: UploadTicket,
        result: Result<UploadResponse, ClientError>,
    ) -> Option<String> {
        if self.in_flight != Some(ticket.seq) {
            tracing::debug!(seq = ticket.seq, "ignoring stale upload");
            return None;
        }
        self.in_flight = None;

        match result {
            Ok(response) => {
                tracing::info!(
                    file_id = %response.file_id,
                    cast_errors = response.errors.len(),
                    "upload accepted"
                );
                self.file_id = Some(response.file_id.clone());
                self.plan = None;
                self.status = UploadStatus::Success;
                self.errors = response.errors;
                self.dispatch.show(Severity::Success, UPLOAD_SUCCESS_MESSAGE);
                Some(response.file_id)
            }
            Err(e) => {
                tracing::error!("upload failed: {}", e);
                self.status = UploadStatus::Error;
                self.failure = Some(e);
                self.dispatch.show(Severity::Error, UPLOAD_ERROR_MESSAGE);
                None
            }
        }
    }

    /// Submit and settle in one step on a blocking transport.
    pub fn submit(&mut self, transport: &dyn IngestTransport) -> Option<String> {
        let ticket = self.begin_submit()?;
        let result = transport.upload(&ticket.request);
        self.settle(ticket, result)
    }

    /// Cast failures of the last successful upload, in header order.
    /// Columns the backend names that are not headers come last, sorted.
    pub fn cast_errors(&self) -> Vec<CastFailure> {
        let mut out: Vec<CastFailure> = self
            .submitted_headers
            .iter()
            .filter_map(|h| {
                self.errors.get(h).map(|m| CastFailure {
                    column: h.clone(),
                    message: m.clone(),
                })
            })
            .collect();

        let mut extra: Vec<_> = self
            .errors
            .iter()
            .filter(|(col, _)| !self.submitted_headers.contains(col))
            .collect();
        extra.sort();
        out.extend(extra.into_iter().map(|(col, m)| CastFailure {
            column: col.clone(),
            message: m.clone(),
        }));
        out
    }

    fn enter(&mut self, status: UploadStatus) {
        self.status = status;
        self.errors.clear();
        self.failure = None;
        self.dispatch.close();
    }
}
