//! Backend HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};

use castgrid_plan::Directive;
use castgrid_protocol::{
    QueryParams, TablePage, UploadResponse, FILE_PART, GET_DATA_PATH, PROCESS_FILE_PATH,
};

use crate::{CancelToken, ClientError};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Backend API client (blocking).
#[derive(Clone)]
pub struct IngestClient {
    http: reqwest::blocking::Client,
    api_base: String,
}

/// A file plus its cast directives, ready to send.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub directives: Vec<Directive>,
}

impl UploadRequest {
    pub fn new(
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
        directives: Vec<Directive>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
            directives,
        }
    }

    /// Read the file from disk. The file name sent is the path's last
    /// component; the backend derives the file id from it.
    pub fn from_path(path: &Path, mime: &str, directives: Vec<Directive>) -> Result<Self, ClientError> {
        let bytes = std::fs::read(path).map_err(|e| ClientError::Io(e.to_string()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::Io(format!("not a file: {}", path.display())))?;
        Ok(Self::new(file_name, mime, bytes, directives))
    }

    /// Directive parts as (field name, value), in plan order.
    pub fn directive_fields(&self) -> Vec<(String, String)> {
        self.directives
            .iter()
            .map(|d| (d.field_name(), d.value.clone()))
            .collect()
    }

    fn form(&self) -> Result<Form, ClientError> {
        let part = Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        let mut form = Form::new().part(FILE_PART, part);
        for (name, value) in self.directive_fields() {
            form = form.text(name, value);
        }
        Ok(form)
    }
}

impl IngestClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_timeout(api_base, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(api_base: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("castgrid/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Upload a file with its cast directives.
    pub fn process_file(&self, request: &UploadRequest) -> Result<UploadResponse, ClientError> {
        let url = format!("{}{}", self.api_base, PROCESS_FILE_PATH);
        tracing::debug!(
            file = %request.file_name,
            directives = request.directives.len(),
            "uploading"
        );

        let response = self
            .http
            .post(&url)
            .multipart(request.form()?)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let response = check_status(response)?;
        response
            .json::<UploadResponse>()
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Fetch one page of an ingested file.
    ///
    /// `cancel` is checked before sending and again before decoding; a
    /// blocking request in flight cannot be interrupted.
    pub fn get_data(&self, params: &QueryParams, cancel: &CancelToken) -> Result<TablePage, ClientError> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let url = format!("{}{}", self.api_base, GET_DATA_PATH);
        tracing::debug!(
            file_id = %params.file_id,
            page = params.page,
            page_size = params.page_size,
            sort_by = ?params.sort_by,
            "querying"
        );

        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let response = check_status(response)?;
        response
            .json::<TablePage>()
            .map_err(|e| ClientError::Parse(e.to_string()))
    }
}

// ── Internal helpers ────────────────────────────────────────────────

fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, ClientError> {
    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        if status == 422 || status == 400 {
            return Err(ClientError::Validation(body));
        }
        return Err(ClientError::Http(status, body));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn page_json() -> serde_json::Value {
        serde_json::json!({
            "cols": {
                "n": {"col_index": 0, "col_name": "n", "col_type": "int64", "human_col_type": "Signed 64 bit Integer"}
            },
            "rows": [
                {"row_index": 0, "values": {"n": 1}},
                {"row_index": 1, "values": {"n": 2}}
            ],
            "page": 0,
            "page_size": 100,
            "total_rows": 2
        })
    }

    fn params() -> QueryParams {
        QueryParams {
            file_id: "data-1.csv".into(),
            page: 0,
            page_size: 100,
            sort_by: None,
            asc: None,
        }
    }

    #[test]
    fn test_directive_fields() {
        let req = UploadRequest::new(
            "data.csv",
            "text/csv",
            b"a,b\n1,2".to_vec(),
            vec![
                Directive { column: "a".into(), value: "int32".into() },
                Directive { column: "b".into(), value: "datetime(%Y)".into() },
            ],
        );
        assert_eq!(
            req.directive_fields(),
            vec![
                ("cast-col-a".to_string(), "int32".to_string()),
                ("cast-col-b".to_string(), "datetime(%Y)".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_path_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "a\n1").unwrap();

        let req = UploadRequest::from_path(&path, "text/csv", Vec::new()).unwrap();
        assert_eq!(req.file_name, "sales.csv");
        assert_eq!(req.bytes, b"a\n1");
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = UploadRequest::from_path(Path::new("/nonexistent/x.csv"), "text/csv", Vec::new())
            .unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn test_process_file() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/process-file");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "file_id": "data-1.csv",
                    "errors": {"b": "could not cast to int8"}
                }));
        });

        let client = IngestClient::new(server.base_url());
        let req = UploadRequest::new("data.csv", "text/csv", b"a,b\n1,x".to_vec(), Vec::new());
        let resp = client.process_file(&req).unwrap();

        mock.assert();
        assert_eq!(resp.file_id, "data-1.csv");
        assert_eq!(resp.errors["b"], "could not cast to int8");
    }

    #[test]
    fn test_process_file_validation_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/process-file");
            then.status(400).body("Extension '.txt' not supported");
        });

        let client = IngestClient::new(server.base_url());
        let req = UploadRequest::new("notes.txt", "text/plain", Vec::new(), Vec::new());
        let err = client.process_file(&req).unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref m) if m.contains(".txt")));
    }

    #[test]
    fn test_get_data_query_string() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/get-data")
                .query_param("file_id", "data-1.csv")
                .query_param("page", "2")
                .query_param("page_size", "25")
                .query_param("sort_by", "n")
                .query_param("asc", "false");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(page_json());
        });

        let client = IngestClient::new(format!("{}/", server.base_url()));
        let params = QueryParams {
            page: 2,
            page_size: 25,
            sort_by: Some("n".into()),
            asc: Some(false),
            ..params()
        };
        let page = client.get_data(&params, &CancelToken::new()).unwrap();

        mock.assert();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.total_rows, 2);
    }

    #[test]
    fn test_get_data_omits_unset_sort() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/get-data")
                .query_param_missing("sort_by")
                .query_param_missing("asc");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(page_json());
        });

        let client = IngestClient::new(server.base_url());
        client.get_data(&params(), &CancelToken::new()).unwrap();
        mock.assert();
    }

    #[test]
    fn test_get_data_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/get-data");
            then.status(500).body("boom");
        });

        let client = IngestClient::new(server.base_url());
        let err = client.get_data(&params(), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, ClientError::Http(500, _)));
    }

    #[test]
    fn test_cancelled_before_send() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/get-data");
            then.status(200).json_body(page_json());
        });

        let client = IngestClient::new(server.base_url());
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = client.get_data(&params(), &cancel).unwrap_err();

        assert!(err.is_cancelled());
        mock.assert_hits(0);
    }
}
