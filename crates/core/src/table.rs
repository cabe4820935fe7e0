//! Remote table controller.
//!
//! Keeps one displayed page in sync with `{file id, page, page size, sort}`.
//! Every effective change issues exactly one [`FetchTicket`]. Tickets carry
//! a sequence number; only the most recently issued ticket may change what
//! is displayed. Older tickets are cancelled when a new one is issued and
//! their settlement, success or failure, is dropped without a trace: no
//! rows, no loading flag, no notification.
//!
//! The controller does no I/O itself. Callers run the ticket against an
//! [`IngestTransport`] (or hand it to any other executor) and report back
//! through [`TableController::settle`].

use castgrid_client::{CancelToken, ClientError, IngestTransport};
use castgrid_protocol::{QueryParams, Severity, TablePage};
use serde::Serialize;
use serde_json::Value;

use crate::normalize::{normalize_value, ColumnKind};
use crate::notify::Dispatcher;

pub const DEFAULT_PAGE_SIZE: u64 = 100;

pub const FETCH_SUCCESS_MESSAGE: &str = "Table data fetched successfully";
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching table data";

/// Field name of the synthetic 1-based ordinal column.
pub const ORDINAL_FIELD: &str = "row_index";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// 0-based
    pub page: u64,
    pub page_size: u64,
    pub sort: Option<SortSpec>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

/// One issued page request.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    seq: u64,
    params: QueryParams,
    cancel: CancelToken,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Set once a newer ticket has been issued.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

/// What a settlement did to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Page replaced, success notified
    Applied,
    /// Page cleared, error notified
    Failed,
    /// A newer ticket exists; ignored
    Superseded,
    /// Transport reported cancellation; ignored
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayColumn {
    pub field: String,
    pub header: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    /// Backend 0-based row index
    pub id: u64,
    /// 1-based position shown in the ordinal column
    pub ordinal: u64,
    /// Values aligned with the data columns (ordinal excluded)
    pub cells: Vec<Value>,
}

/// A normalized page ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayPage {
    /// Ordinal column first, then data columns by ascending `col_index`
    pub columns: Vec<DisplayColumn>,
    pub rows: Vec<DisplayRow>,
    pub page: u64,
    pub page_size: u64,
    pub total_rows: u64,
}

impl DisplayPage {
    pub fn from_wire(page: TablePage) -> Self {
        let mut descriptors: Vec<_> = page.cols.into_values().collect();
        descriptors.sort_by(|a, b| {
            a.col_index
                .cmp(&b.col_index)
                .then_with(|| a.col_name.cmp(&b.col_name))
        });

        let kinds: Vec<ColumnKind> = descriptors.iter().map(|c| ColumnKind::of(&c.col_type)).collect();

        let rows = page
            .rows
            .into_iter()
            .map(|row| DisplayRow {
                id: row.row_index,
                ordinal: row.row_index.saturating_add(1),
                cells: descriptors
                    .iter()
                    .zip(&kinds)
                    .map(|(col, kind)| {
                        row.values
                            .get(&col.col_name)
                            .map(|v| normalize_value(*kind, v))
                            .unwrap_or(Value::Null)
                    })
                    .collect(),
            })
            .collect();

        let mut columns = Vec::with_capacity(descriptors.len() + 1);
        columns.push(DisplayColumn {
            field: ORDINAL_FIELD.to_string(),
            header: "#".to_string(),
            description: String::new(),
        });
        columns.extend(descriptors.into_iter().map(|c| DisplayColumn {
            header: format!("{} ({})", c.col_name, c.col_type),
            field: c.col_name,
            description: c.human_col_type,
        }));

        Self {
            columns,
            rows,
            page: page.page,
            page_size: page.page_size,
            total_rows: page.total_rows,
        }
    }
}

pub struct TableController {
    file_id: Option<String>,
    query: QueryState,
    next_seq: u64,
    in_flight: Option<(u64, CancelToken)>,
    page: Option<DisplayPage>,
    loading: bool,
    failure: Option<ClientError>,
    dispatch: Dispatcher,
}

impl TableController {
    pub fn new(dispatch: Dispatcher) -> Self {
        Self::with_query(dispatch, QueryState::default())
    }

    pub fn with_query(dispatch: Dispatcher, query: QueryState) -> Self {
        Self {
            file_id: None,
            query,
            next_seq: 0,
            in_flight: None,
            page: None,
            loading: false,
            failure: None,
            dispatch,
        }
    }

    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn page(&self) -> Option<&DisplayPage> {
        self.page.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Transport error behind the last failed fetch.
    pub fn last_failure(&self) -> Option<&ClientError> {
        self.failure.as_ref()
    }

    /// Point the view at another dataset.
    ///
    /// Sorting resets; page and page size are kept as they are.
    pub fn set_file_id(&mut self, file_id: impl Into<String>) -> Option<FetchTicket> {
        let file_id = file_id.into();
        if self.file_id.as_deref() == Some(file_id.as_str()) {
            return None;
        }
        self.file_id = Some(file_id);
        self.query.sort = None;
        self.issue()
    }

    pub fn set_pagination(&mut self, page: u64, page_size: u64) -> Option<FetchTicket> {
        if self.query.page == page && self.query.page_size == page_size {
            return None;
        }
        self.query.page = page;
        self.query.page_size = page_size;
        self.issue()
    }

    pub fn set_page(&mut self, page: u64) -> Option<FetchTicket> {
        self.set_pagination(page, self.query.page_size)
    }

    pub fn set_page_size(&mut self, page_size: u64) -> Option<FetchTicket> {
        self.set_pagination(self.query.page, page_size)
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) -> Option<FetchTicket> {
        if self.query.sort == sort {
            return None;
        }
        self.query.sort = sort;
        self.issue()
    }

    /// Re-issue the current state, e.g. to retry after a failure.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.issue()
    }

    fn issue(&mut self) -> Option<FetchTicket> {
        let file_id = self.file_id.clone()?;

        if let Some((seq, cancel)) = self.in_flight.take() {
            tracing::debug!(seq, "cancelling superseded fetch");
            cancel.cancel();
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        let cancel = CancelToken::new();
        self.in_flight = Some((seq, cancel.clone()));
        self.loading = true;
        self.failure = None;

        let params = QueryParams {
            file_id,
            page: self.query.page,
            page_size: self.query.page_size,
            sort_by: self.query.sort.as_ref().map(|s| s.field.clone()),
            asc: self.query.sort.as_ref().map(|s| s.ascending),
        };
        Some(FetchTicket { seq, params, cancel })
    }

    /// Report the outcome of a ticket.
    pub fn settle(&mut self, ticket: FetchTicket, result: Result<TablePage, ClientError>) -> Settlement {
        let latest = self.in_flight.as_ref().map(|(seq, _)| *seq);
        if latest != Some(ticket.seq) {
            tracing::debug!(seq = ticket.seq, ?latest, "ignoring stale fetch");
            return Settlement::Superseded;
        }

        match result {
            Err(ClientError::Cancelled) => {
                tracing::debug!(seq = ticket.seq, "fetch cancelled");
                Settlement::Cancelled
            }
            Ok(page) => {
                self.in_flight = None;
                self.loading = false;
                self.page = Some(DisplayPage::from_wire(page));
                self.dispatch.show(Severity::Success, FETCH_SUCCESS_MESSAGE);
                Settlement::Applied
            }
            Err(e) => {
                tracing::error!(seq = ticket.seq, "fetch failed: {}", e);
                self.in_flight = None;
                self.loading = false;
                self.page = None;
                self.failure = Some(e);
                self.dispatch.show(Severity::Error, FETCH_ERROR_MESSAGE);
                Settlement::Failed
            }
        }
    }

    /// Run a ticket to completion on a blocking transport.
    pub fn run(&mut self, transport: &dyn IngestTransport, ticket: FetchTicket) -> Settlement {
        let result = transport.query(&ticket.params, &ticket.cancel);
        self.settle(ticket, result)
    }
}
