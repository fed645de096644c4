use crate::services::ServerEvent;
use crate::services::api::{ApiError, ServerClient, filename_from_disposition};
use crate::services::gate::{InFlightGuard, RequestGate};
use futures::future::BoxFuture;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, REFERER};
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strum::{Display, EnumIter, IntoEnumIterator};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const MISSENSE_PAGE: &str = "missense/";

/// Lines of each result file shown in the preview
pub const PREVIEW_LINES: usize = 10;

lazy_static! {
    static ref ERROR_ALERT: Option<Regex> =
        Regex::new(r#"(?s)class="[^"]*alert-(?:danger|error)[^"]*"[^>]*>(?:\s*<[^>]+>)*\s*([^<]+)"#).ok();
}

/// Result files produced by a missense run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ResultKind {
    #[strum(serialize = "dbpepmutref")]
    DbPepMutRef,
    #[strum(serialize = "dbsaida")]
    DbSaida,
    #[strum(serialize = "dbfinal")]
    DbFinal,
}

impl ResultKind {
    pub fn download_path(&self) -> String {
        format!("missense/download/{self}/")
    }

    /// Name the server gives the file when it sends none
    pub fn default_file_name(&self) -> String {
        format!("{self}.txt")
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::DbPepMutRef => "Reference peptides (dbpepmutref)",
            Self::DbSaida => "Mutated peptides (dbsaida)",
            Self::DbFinal => "Final database (dbfinal)",
        }
    }
}

/// Peptide input submitted from the missense form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissenseInput {
    Text(String),
    File(PathBuf),
}

impl MissenseInput {
    pub fn input_type(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::File(_) => "file",
        }
    }
}

/// A complete result file as downloaded from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    pub kind: ResultKind,
    pub file_name: String,
    pub contents: String,
}

impl ResultFile {
    pub fn new(kind: ResultKind, contents: impl Into<String>) -> Self {
        Self {
            kind,
            file_name: kind.default_file_name(),
            contents: contents.into(),
        }
    }

    /// Write the file into `dir`, creating it if needed
    pub fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let target = dir.join(&self.file_name);
        std::fs::write(&target, &self.contents)?;
        info!(kind = %self.kind, path = %target.display(), "saved result file");
        Ok(target)
    }
}

/// Result files of a run, in [`ResultKind`] order
///
/// `sections` holds the preview shown and copied per file; `files` keeps the
/// full contents for saving.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissenseResults {
    pub sections: Vec<(ResultKind, String)>,
    pub files: Vec<ResultFile>,
}

impl MissenseResults {
    pub fn from_files(files: impl IntoIterator<Item = ResultFile>) -> Self {
        let mut files: Vec<ResultFile> = files.into_iter().collect();
        files.sort_by_key(|file| ResultKind::iter().position(|k| k == file.kind));
        let sections = files
            .iter()
            .map(|file| (file.kind, preview(&file.contents)))
            .collect();
        Self { sections, files }
    }

    /// Files with the server's default names
    pub fn from_texts(texts: impl IntoIterator<Item = (ResultKind, String)>) -> Self {
        Self::from_files(
            texts
                .into_iter()
                .map(|(kind, text)| ResultFile::new(kind, text)),
        )
    }

    /// Preview text of a section
    pub fn get(&self, kind: ResultKind) -> Option<&str> {
        self.sections
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, text)| text.as_str())
    }

    pub fn file(&self, kind: ResultKind) -> Option<&ResultFile> {
        self.files.iter().find(|file| file.kind == kind)
    }
}

/// Holds the submitter's gate until the page has taken the outcome
#[derive(Debug)]
pub struct MissenseCompletion {
    pub id: Uuid,
    pub outcome: Result<MissenseResults, ApiError>,
    pub(crate) guard: Option<InFlightGuard>,
}

pub trait MissenseApi: Send + Sync {
    fn submit(&self, input: MissenseInput) -> BoxFuture<'static, Result<MissenseResults, ApiError>>;
}

impl ServerClient {
    async fn submit_missense(&self, input: MissenseInput) -> Result<MissenseResults, ApiError> {
        let token = self.csrf_token(MISSENSE_PAGE).await?;
        let mut form = Form::new()
            .text("csrfmiddlewaretoken", token)
            .text("input_type", input.input_type());
        form = match &input {
            MissenseInput::Text(text) => form.text("peptide_text", text.clone()),
            MissenseInput::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("peptides.txt")
                    .to_string();
                form.part("peptide_file", Part::bytes(bytes).file_name(name))
            }
        };

        info!(input_type = input.input_type(), "submitting missense form");
        let mut request = self.http().post(self.url(MISSENSE_PAGE)?).multipart(form);
        if let Some(referer) = self.referer(MISSENSE_PAGE) {
            request = request.header(REFERER, referer);
        }
        let response = request.send().await?;
        let status = response.status();
        let page = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::InvalidResponse {
                status: status.as_u16(),
                detail: "missense form was rejected".to_string(),
            });
        }
        if let Some(message) = extract_page_error(&page) {
            return Err(ApiError::Server(message));
        }

        let mut files = Vec::new();
        for kind in ResultKind::iter() {
            let response = self.http().get(self.url(&kind.download_path())?).send().await?;
            let status = response.status();
            let file_name = response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .and_then(filename_from_disposition)
                .unwrap_or_else(|| kind.default_file_name());
            let body = response.text().await?;
            if !status.is_success() {
                return Err(ApiError::Server(body.trim().to_string()));
            }
            files.push(ResultFile {
                kind,
                file_name,
                contents: body,
            });
        }
        Ok(MissenseResults::from_files(files))
    }
}

impl MissenseApi for ServerClient {
    fn submit(&self, input: MissenseInput) -> BoxFuture<'static, Result<MissenseResults, ApiError>> {
        let client = self.clone();
        Box::pin(async move { client.submit_missense(input).await })
    }
}

/// First [`PREVIEW_LINES`] lines of a result file
pub fn preview(text: &str) -> String {
    text.split_inclusive('\n')
        .take(PREVIEW_LINES)
        .collect::<String>()
}

/// Error alert rendered into the missense page, if any
pub fn extract_page_error(html: &str) -> Option<String> {
    let re = ERROR_ALERT.as_ref()?;
    let text = re.captures(html)?.get(1)?.as_str().trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Runs missense submissions one at a time
pub struct MissenseSubmitter {
    api: Arc<dyn MissenseApi>,
    events: UnboundedSender<ServerEvent>,
    gate: RequestGate,
}

impl MissenseSubmitter {
    pub fn new(api: Arc<dyn MissenseApi>, events: UnboundedSender<ServerEvent>) -> Self {
        Self {
            api,
            events,
            gate: RequestGate::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Start a submission; `None` while another one is still running
    pub fn submit(&self, input: MissenseInput) -> Option<Uuid> {
        let guard = self.gate.try_acquire()?;
        let id = Uuid::new_v4();
        let future = self.api.submit(input);
        let events = self.events.clone();

        tokio::spawn(async move {
            let outcome = future.await;
            if let Err(e) = &outcome {
                error!(%id, "missense submission failed: {e}");
            }
            let completion = MissenseCompletion {
                id,
                outcome,
                guard: Some(guard),
            };
            if events.send(ServerEvent::Missense(completion)).is_err()
            {
                warn!(%id, "ui loop closed before missense submission completed");
            }
        });
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preview_keeps_ten_lines() {
        let text = (1..=15).map(|i| format!(">seq{i}\n")).collect::<String>();
        let preview = preview(&text);
        assert_eq!(preview.lines().count(), 10);
        assert!(preview.ends_with(">seq10\n"));
        assert_eq!(super::preview("short"), "short");
    }

    #[test]
    fn test_download_paths() {
        let paths: Vec<String> = ResultKind::iter().map(|k| k.download_path()).collect();
        assert_eq!(
            paths,
            vec![
                "missense/download/dbpepmutref/",
                "missense/download/dbsaida/",
                "missense/download/dbfinal/",
            ]
        );
    }

    #[test]
    fn test_extract_page_error() {
        let html = r#"<div class="alert alert-danger" role="alert">
            <i class="fas fa-exclamation"></i> The peptide text cannot be empty.
        </div>"#;
        assert_eq!(
            extract_page_error(html),
            Some("The peptide text cannot be empty.".into())
        );
        assert_eq!(extract_page_error(r#"<div class="alert alert-success">ok</div>"#), None);
    }

    #[test]
    fn test_results_keep_full_files() {
        let long = (1..=25).map(|i| format!("line{i}\n")).collect::<String>();
        let results = MissenseResults::from_texts([
            (ResultKind::DbFinal, long.clone()),
            (ResultKind::DbPepMutRef, ">ref\n".to_string()),
        ]);
        let kinds: Vec<_> = results.sections.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![ResultKind::DbPepMutRef, ResultKind::DbFinal]);
        assert_eq!(results.get(ResultKind::DbFinal).map(|t| t.lines().count()), Some(10));
        let file = results.file(ResultKind::DbFinal).unwrap();
        assert_eq!(file.file_name, "dbfinal.txt");
        assert_eq!(file.contents, long);
    }

    #[test]
    fn test_save_writes_full_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target_dir = dir.path().join("results");
        let file = ResultFile::new(ResultKind::DbSaida, ">mut\nMKV\n");
        let saved = file.save_to(&target_dir).unwrap();
        assert_eq!(saved, target_dir.join("dbsaida.txt"));
        assert_eq!(std::fs::read_to_string(saved).unwrap(), ">mut\nMKV\n");
    }

    #[test]
    fn test_input_type() {
        assert_eq!(MissenseInput::Text("PEPTIDE".into()).input_type(), "text");
        assert_eq!(MissenseInput::File("a.fasta".into()).input_type(), "file");
    }
}
