use crate::core::dataset::TableDataset;
use chrono::Local;
use futures::future::BoxFuture;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_DISPOSITION, HeaderValue, REFERER};
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const TABLE_VIEWER_PAGE: &str = "table-viewer/";
pub const UPLOAD_PATH: &str = "table-viewer/upload-data/";
pub const LOAD_EXAMPLE_PATH: &str = "table-viewer/load-example/";
pub const ADD_PROTEIN_ID_PATH: &str = "table-viewer/add-protein-id/";
pub const ADD_GENES_PATH: &str = "table-viewer/add-genes/";
pub const REMOVE_CONTAMINANTS_PATH: &str = "table-viewer/remove-contaminants/";
pub const DOWNLOAD_PATH: &str = "table-viewer/download/";

const CSRF_FIELD: &str = "csrfmiddlewaretoken";
const CSRF_HEADER: &str = "X-CSRFToken";
const CSRF_COOKIE: &str = "csrftoken";

lazy_static! {
    static ref CSRF_INPUT_NAME_FIRST: Option<Regex> =
        Regex::new(r#"name=["']csrfmiddlewaretoken["'][^>]*?value=["']([^"']+)["']"#).ok();
    static ref CSRF_INPUT_VALUE_FIRST: Option<Regex> =
        Regex::new(r#"value=["']([^"']+)["'][^>]*?name=["']csrfmiddlewaretoken["']"#).ok();
    static ref DISPOSITION_FILENAME: Option<Regex> =
        Regex::new(r#"filename\*?=(?:UTF-8'')?"?([^";]+)"?"#).ok();
}

/// JSON envelope returned by every table viewer endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<TableDataset>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: TableDataset) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected response from server (HTTP {status}): {detail}")]
    InvalidResponse { status: u16, detail: String },
    #[error("{0}")]
    Server(String),
    #[error("no CSRF token found on {0}")]
    MissingCsrfToken(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

/// Table viewer endpoints
///
/// Futures are `'static` so callers can move them onto a spawned task.
pub trait TableViewerApi: Send + Sync {
    fn upload_data(&self, path: PathBuf) -> BoxFuture<'static, Result<ApiResponse, ApiError>>;
    fn load_example(&self) -> BoxFuture<'static, Result<ApiResponse, ApiError>>;
    fn add_protein_id(&self) -> BoxFuture<'static, Result<ApiResponse, ApiError>>;
    fn add_genes(&self, sheets: Vec<String>) -> BoxFuture<'static, Result<ApiResponse, ApiError>>;
    fn remove_contaminants(
        &self,
        sheets: Vec<String>,
    ) -> BoxFuture<'static, Result<ApiResponse, ApiError>>;
    /// Save the current workbook into `dir` and return the written path
    fn download(&self, dir: PathBuf) -> BoxFuture<'static, Result<PathBuf, ApiError>>;
}

/// HTTP client for a BioMutate server
///
/// Keeps the session cookie between calls since the server holds the loaded
/// dataset in the session.
#[derive(Clone)]
pub struct ServerClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    csrf_token: Mutex<Option<String>>,
}

#[derive(Serialize)]
struct SheetsRequest<'a> {
    sheets: &'a [String],
}

impl ServerClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .user_agent(concat!("biomutate/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(jar.clone())
            .build()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                jar,
                base_url,
                csrf_token: Mutex::new(None),
            }),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// CSRF token for the session, fetched from `page` on first use
    pub(crate) async fn csrf_token(&self, page: &str) -> Result<String, ApiError> {
        let mut cached = self.inner.csrf_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let url = self.url(page)?;
        debug!(%url, "fetching csrf token");
        let body = self.inner.http.get(url.clone()).send().await?.text().await?;
        let token = extract_csrf_token(&body)
            .or_else(|| self.csrf_cookie(&url))
            .ok_or_else(|| ApiError::MissingCsrfToken(url.to_string()))?;
        *cached = Some(token.clone());
        Ok(token)
    }

    fn csrf_cookie(&self, url: &Url) -> Option<String> {
        let header = self.inner.jar.cookies(url)?;
        let cookies = header.to_str().ok()?;
        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == CSRF_COOKIE).then(|| value.to_string())
        })
    }

    pub(crate) fn referer(&self, page: &str) -> Option<HeaderValue> {
        self.url(page)
            .ok()
            .and_then(|u| HeaderValue::from_str(u.as_str()).ok())
    }

    async fn post_json(
        &self,
        path: &'static str,
        sheets: Option<Vec<String>>,
    ) -> Result<ApiResponse, ApiError> {
        let token = self.csrf_token(TABLE_VIEWER_PAGE).await?;
        let url = self.url(path)?;
        info!(%url, ?sheets, "posting table viewer request");

        let mut request = self.inner.http.post(url).header(CSRF_HEADER, token);
        if let Some(referer) = self.referer(TABLE_VIEWER_PAGE) {
            request = request.header(REFERER, referer);
        }
        request = match &sheets {
            Some(sheets) => request.json(&SheetsRequest { sheets }),
            None => request.header(reqwest::header::CONTENT_TYPE, "application/json"),
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_table_response(status, &body)
    }

    async fn upload(&self, path: PathBuf) -> Result<ApiResponse, ApiError> {
        let token = self.csrf_token(TABLE_VIEWER_PAGE).await?;
        let bytes = tokio::fs::read(&path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.xlsx")
            .to_string();
        info!(file = %file_name, size = bytes.len(), "uploading workbook");

        let form = Form::new()
            .part("data_file", Part::bytes(bytes).file_name(file_name))
            .text(CSRF_FIELD, token);
        let mut request = self.inner.http.post(self.url(UPLOAD_PATH)?).multipart(form);
        if let Some(referer) = self.referer(TABLE_VIEWER_PAGE) {
            request = request.header(REFERER, referer);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_table_response(status, &body)
    }

    async fn download_to(&self, dir: PathBuf) -> Result<PathBuf, ApiError> {
        let url = self.url(DOWNLOAD_PATH)?;
        info!(%url, "downloading workbook");
        let response = self.inner.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            return Err(error_from_body(status, &body));
        }

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(fallback_download_name);
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(&dir).await?;
        let target = dir.join(file_name);
        tokio::fs::write(&target, &bytes).await?;
        info!(path = %target.display(), size = bytes.len(), "workbook saved");
        Ok(target)
    }
}

impl TableViewerApi for ServerClient {
    fn upload_data(&self, path: PathBuf) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        let client = self.clone();
        Box::pin(async move { client.upload(path).await })
    }

    fn load_example(&self) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        let client = self.clone();
        Box::pin(async move { client.post_json(LOAD_EXAMPLE_PATH, None).await })
    }

    fn add_protein_id(&self) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        let client = self.clone();
        Box::pin(async move { client.post_json(ADD_PROTEIN_ID_PATH, None).await })
    }

    fn add_genes(&self, sheets: Vec<String>) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        let client = self.clone();
        Box::pin(async move { client.post_json(ADD_GENES_PATH, Some(sheets)).await })
    }

    fn remove_contaminants(
        &self,
        sheets: Vec<String>,
    ) -> BoxFuture<'static, Result<ApiResponse, ApiError>> {
        let client = self.clone();
        Box::pin(async move { client.post_json(REMOVE_CONTAMINANTS_PATH, Some(sheets)).await })
    }

    fn download(&self, dir: PathBuf) -> BoxFuture<'static, Result<PathBuf, ApiError>> {
        let client = self.clone();
        Box::pin(async move { client.download_to(dir).await })
    }
}

/// Parse a table viewer response body regardless of the HTTP status
///
/// Error statuses still carry the `{error}` envelope, which is reported as an
/// unsuccessful response rather than a transport failure.
pub fn parse_table_response(status: StatusCode, body: &str) -> Result<ApiResponse, ApiError> {
    match serde_json::from_str::<ApiResponse>(body) {
        Ok(response) => {
            if !status.is_success() {
                warn!(%status, error = ?response.error, "server rejected request");
            }
            Ok(response)
        }
        Err(e) => Err(ApiError::InvalidResponse {
            status: status.as_u16(),
            detail: e.to_string(),
        }),
    }
}

fn error_from_body(status: StatusCode, body: &str) -> ApiError {
    match serde_json::from_str::<ApiResponse>(body) {
        Ok(ApiResponse {
            error: Some(error), ..
        }) => ApiError::Server(error),
        _ => ApiError::InvalidResponse {
            status: status.as_u16(),
            detail: body.trim().chars().take(200).collect(),
        },
    }
}

pub fn extract_csrf_token(html: &str) -> Option<String> {
    let capture = |re: &Option<Regex>| re.as_ref().and_then(|re| re.captures(html));
    capture(&CSRF_INPUT_NAME_FIRST)
        .or_else(|| capture(&CSRF_INPUT_VALUE_FIRST))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// File name from a `Content-Disposition` header, stripped of any directory part
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let re = DISPOSITION_FILENAME.as_ref()?;
    let raw = re.captures(header)?.get(1)?.as_str().trim();
    Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

pub fn fallback_download_name() -> String {
    Local::now()
        .format("filtered_data_%Y%m%d_%H%M%S.xlsx")
        .to_string()
}
