//! Controllers behind the castgrid workflow.
//!
//! - [`UploadCoordinator`]: file selection, cast plan, submit lifecycle
//! - [`TableController`]: paginated, sorted view of an ingested file
//! - [`NotificationSlot`]: the single "latest outcome" value both report to
//!
//! Nothing here performs I/O on its own. Network calls go through the
//! [`castgrid_client::IngestTransport`] trait, either via the `run`/`submit`
//! helpers or by executing tickets elsewhere and settling them back.

pub mod normalize;
pub mod notify;
pub mod session;
pub mod table;
pub mod upload;

pub use normalize::{normalize_value, ColumnKind};
pub use notify::{Dispatcher, NoticeAction, NotificationSlot};
pub use session::Session;
pub use table::{
    DisplayColumn, DisplayPage, DisplayRow, FetchTicket, QueryState, Settlement, SortSpec,
    TableController, DEFAULT_PAGE_SIZE, FETCH_ERROR_MESSAGE, FETCH_SUCCESS_MESSAGE,
};
pub use upload::{
    CastFailure, SelectedFile, UploadCoordinator, UploadStatus, UploadTicket,
    UPLOAD_ERROR_MESSAGE, UPLOAD_SUCCESS_MESSAGE,
};
