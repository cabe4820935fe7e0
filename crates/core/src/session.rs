//! One user session: the notification owner wired to both controllers.

use std::path::Path;

use castgrid_client::IngestTransport;
use castgrid_protocol::Notification;

use crate::notify::NotificationSlot;
use crate::table::{FetchTicket, QueryState, Settlement, TableController};
use crate::upload::UploadCoordinator;

pub struct Session {
    notice: NotificationSlot,
    upload: UploadCoordinator,
    table: TableController,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(QueryState::default())
    }
}

impl Session {
    pub fn new(query: QueryState) -> Self {
        let notice = NotificationSlot::new();
        let upload = UploadCoordinator::new(notice.dispatcher());
        let table = TableController::with_query(notice.dispatcher(), query);
        Self { notice, upload, table }
    }

    pub fn upload(&self) -> &UploadCoordinator {
        &self.upload
    }

    pub fn upload_mut(&mut self) -> &mut UploadCoordinator {
        &mut self.upload
    }

    pub fn table(&self) -> &TableController {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableController {
        &mut self.table
    }

    pub fn select_file(&mut self, path: &Path) -> bool {
        self.upload.select_file(path)
    }

    /// Submit the selected file. On success the table is pointed at the new
    /// file id; the returned ticket is its first page fetch.
    pub fn submit(&mut self, transport: &dyn IngestTransport) -> Option<FetchTicket> {
        let file_id = self.upload.submit(transport)?;
        self.table.set_file_id(file_id)
    }

    /// Run a table ticket, if any.
    pub fn run(&mut self, transport: &dyn IngestTransport, ticket: Option<FetchTicket>) -> Option<Settlement> {
        ticket.map(|t| self.table.run(transport, t))
    }

    /// The latest outcome, after applying every pending message.
    pub fn notification(&mut self) -> &Notification {
        self.notice.pump()
    }

    pub fn dismiss_notification(&mut self) {
        self.notice.dismiss();
    }
}
