// Upload then browse, against an in-process transport.

use std::cell::RefCell;
use std::collections::HashMap;

use castgrid_client::{CancelToken, ClientError, IngestTransport, UploadRequest};
use castgrid_core::{Session, Settlement, SortSpec, UploadStatus};
use castgrid_plan::{CastType, Directive};
use castgrid_protocol::{ColumnDescriptor, QueryParams, Severity, TablePage, UploadResponse, WireRow};

#[derive(Default)]
struct ScriptedBackend {
    uploads: RefCell<Vec<UploadRequest>>,
    queries: RefCell<Vec<QueryParams>>,
}

impl IngestTransport for ScriptedBackend {
    fn upload(&self, request: &UploadRequest) -> Result<UploadResponse, ClientError> {
        self.uploads.borrow_mut().push(request.clone());
        Ok(UploadResponse {
            file_id: "f1".to_string(),
            errors: HashMap::new(),
        })
    }

    fn query(&self, params: &QueryParams, cancel: &CancelToken) -> Result<TablePage, ClientError> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        self.queries.borrow_mut().push(params.clone());
        let cols = HashMap::from([
            (
                "A".to_string(),
                ColumnDescriptor {
                    col_index: 0,
                    col_name: "A".to_string(),
                    col_type: "int32".to_string(),
                    human_col_type: "Signed 32 bit Integer".to_string(),
                },
            ),
            (
                "B".to_string(),
                ColumnDescriptor {
                    col_index: 1,
                    col_name: "B".to_string(),
                    col_type: "object".to_string(),
                    human_col_type: "Text".to_string(),
                },
            ),
        ]);
        let rows = (0..2u64)
            .map(|i| WireRow {
                row_index: params.page * params.page_size + i,
                values: HashMap::from([
                    ("A".to_string(), serde_json::json!(i)),
                    ("B".to_string(), serde_json::json!(format!("r{}", i))),
                ]),
            })
            .collect();
        Ok(TablePage {
            cols,
            rows,
            page: params.page,
            page_size: params.page_size,
            total_rows: 2,
        })
    }
}

fn write_csv(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("data.csv");
    std::fs::write(&path, "A,B\n1,x\n2,y").unwrap();
    path
}

#[test]
fn upload_then_first_page() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir);
    let backend = ScriptedBackend::default();
    let mut session = Session::default();

    assert!(session.select_file(&path));
    assert_eq!(session.upload().status(), UploadStatus::Idle);
    {
        let plan = session.upload_mut().plan_mut().unwrap();
        plan.set_type("A", CastType::Int).unwrap();
        plan.set_option("A", "int32").unwrap();
    }

    let ticket = session.upload_mut().begin_submit().unwrap();
    assert_eq!(session.upload().status(), UploadStatus::Loading);
    assert_eq!(
        ticket.request().directives,
        vec![Directive { column: "A".into(), value: "int32".into() }]
    );

    let result = backend.upload(ticket.request());
    let file_id = session.upload_mut().settle(ticket, result).unwrap();
    assert_eq!(session.upload().status(), UploadStatus::Success);
    assert_eq!(session.notification().severity, Severity::Success);

    let fetch = session.table_mut().set_file_id(file_id).unwrap();
    assert_eq!(fetch.params().page, 0);
    assert_eq!(fetch.params().page_size, 100);
    assert_eq!(session.table_mut().run(&backend, fetch), Settlement::Applied);

    let page = session.table().page().unwrap();
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.columns[0].header, "#");
    let ordinals: Vec<u64> = page.rows.iter().map(|r| r.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2]);
    assert_eq!(session.notification().message, "Table data fetched successfully");
}

#[test]
fn session_submit_points_table_at_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir);
    let backend = ScriptedBackend::default();
    let mut session = Session::default();

    session.select_file(&path);
    let ticket = session.submit(&backend);
    assert_eq!(session.table().file_id(), Some("f1"));
    assert_eq!(session.run(&backend, ticket), Some(Settlement::Applied));

    // Plain upload: no directives at all
    assert!(backend.uploads.borrow()[0].directives.is_empty());
}

#[test]
fn superseded_ticket_is_cancelled_before_it_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir);
    let backend = ScriptedBackend::default();
    let mut session = Session::default();

    session.select_file(&path);
    let first = session.submit(&backend).unwrap();
    let second = session
        .table_mut()
        .set_sort(Some(SortSpec { field: "B".into(), ascending: false }))
        .unwrap();

    // The stale ticket reaches the transport late and is refused there
    assert_eq!(session.table_mut().run(&backend, first), Settlement::Superseded);
    assert_eq!(session.table_mut().run(&backend, second), Settlement::Applied);

    let queries = backend.queries.borrow();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].sort_by.as_deref(), Some("B"));
    assert_eq!(queries[0].asc, Some(false));
}
