use std::path::Path;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use url::form_urlencoded;

use crate::persist::{PendingFile, PersistError};
use crate::{FailureKind, FetchError, FetchSettings};

/// Value the export form expects in `wpEditToken` from anonymous clients.
pub const EDIT_TOKEN_PLACEHOLDER: &str = "+\\";

/// One POST to the export endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest<'a> {
    pub export_url: &'a str,
    pub article: &'a str,
    pub batch_index: usize,
    /// Timestamp of the last revision of the previous batch.
    pub offset: Option<&'a str>,
}

impl BatchRequest<'_> {
    pub fn form_body(&self) -> String {
        let mut form = form_urlencoded::Serializer::new(String::new());
        form.append_pair("pages", self.article)
            .append_pair("wpEditToken", EDIT_TOKEN_PLACEHOLDER)
            .append_pair("title", "Special:Export");
        if let Some(offset) = self.offset {
            form.append_pair("offset", offset);
        }
        form.finish()
    }
}

/// Where export batches come from.
#[async_trait::async_trait]
pub trait ExportSource: Send + Sync {
    /// Download one batch into `dest`, which must not exist yet. Returns the
    /// number of bytes written.
    async fn download(&self, request: &BatchRequest<'_>, dest: &Path) -> Result<u64, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestExportSource {
    client: reqwest::Client,
}

impl ReqwestExportSource {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ExportSource for ReqwestExportSource {
    async fn download(&self, request: &BatchRequest<'_>, dest: &Path) -> Result<u64, FetchError> {
        let url = reqwest::Url::parse(request.export_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(request.form_body())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let mut file = PendingFile::create(dest).map_err(map_persist_error)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            file.write_chunk(&chunk).map_err(map_persist_error)?;
        }
        file.finish().map_err(map_persist_error)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

fn map_persist_error(err: PersistError) -> FetchError {
    FetchError::new(FailureKind::Cache, err.to_string())
}
