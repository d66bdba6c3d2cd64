use std::path::{Path, PathBuf};

use crate::http::error::ServeError;
use crate::http::mime::ContentType;
use crate::http::request::{Classification, ParsedRequest};

/// Body sent with every 404.
pub const NOT_FOUND_BODY: &[u8] = b"<html><note>404 Not Found</note></html>";

/// HTTP status codes the server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use filegate::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }
}

/// A file that existed when it was stat'ed for this response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResource {
    /// Name as it appeared in the request line.
    pub name: String,
    /// Where the name resolved to under the document root.
    pub path: PathBuf,
    /// Size reported by the stat, sent as `Content-Length`.
    pub size: u64,
    pub content_type: Option<ContentType>,
}

impl FileResource {
    /// Stats `name` under `root`.
    ///
    /// The name is joined as-is: `..` segments and absolute names are not
    /// rejected.
    pub async fn stat(root: &Path, name: &str) -> Result<Self, ServeError> {
        let path = root.join(name);
        let metadata = tokio::fs::metadata(&path).await.map_err(|source| {
            ServeError::ResourceUnavailable {
                resource: name.to_string(),
                source,
            }
        })?;

        Ok(Self {
            name: name.to_string(),
            path,
            size: metadata.len(),
            content_type: ContentType::from_name(name),
        })
    }
}

/// The one response a connection will get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    BadRequest,
    NotFound,
    Ok(FileResource),
}

impl ResponseOutcome {
    /// Turns a classified request into an outcome, checking the filesystem for `Ok` requests.
    pub async fn resolve(request: &ParsedRequest, root: &Path) -> Self {
        match request.classification() {
            Classification::BadRequest => ResponseOutcome::BadRequest,
            Classification::Ok => match FileResource::stat(root, request.resource_name()).await {
                Ok(file) => ResponseOutcome::Ok(file),
                Err(e) => {
                    tracing::debug!(error = %e, "File not found, sending 404 Not Found");
                    ResponseOutcome::NotFound
                }
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ResponseOutcome::BadRequest => StatusCode::BadRequest,
            ResponseOutcome::NotFound => StatusCode::NotFound,
            ResponseOutcome::Ok(_) => StatusCode::Ok,
        }
    }

    /// Status line and headers for this outcome. The body is written separately.
    pub fn head(&self) -> ResponseHead {
        match self {
            ResponseOutcome::BadRequest => ResponseBuilder::new(StatusCode::BadRequest).build(),
            ResponseOutcome::NotFound => ResponseBuilder::new(StatusCode::NotFound)
                .header("Content-Type", ContentType::Html.as_str())
                .build(),
            ResponseOutcome::Ok(file) => {
                let mut builder = ResponseBuilder::new(StatusCode::Ok);
                if let Some(content_type) = file.content_type {
                    builder = builder.header("Content-Type", content_type.as_str());
                }
                builder
                    .header("Content-Length", file.size.to_string())
                    .build()
            }
        }
    }
}

/// Status line plus headers, kept in the order they go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for [`ResponseHead`].
///
/// # Example
///
/// ```
/// # use filegate::http::response::{ResponseBuilder, StatusCode};
/// let head = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Length", "5")
///     .build();
/// assert_eq!(head.header("Content-Length"), Some("5"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Appends a header. Order of calls is the order on the wire.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> ResponseHead {
        ResponseHead {
            status: self.status,
            headers: self.headers,
        }
    }
}
