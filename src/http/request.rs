use bytes::Bytes;

/// Largest request we read from a connection. Anything past this is dropped.
pub const MAX_REQUEST_SIZE: usize = 1024;

/// The bytes captured from the single read performed on a connection.
///
/// Immutable once captured. Input longer than [`MAX_REQUEST_SIZE`] is cut
/// off at the limit rather than read in further chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    bytes: Bytes,
}

impl RawRequest {
    /// Captures `bytes`, truncated to [`MAX_REQUEST_SIZE`].
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        let mut bytes = bytes.into();
        bytes.truncate(MAX_REQUEST_SIZE);
        Self { bytes }
    }

    /// A request for which the read produced nothing (EOF or read error).
    pub fn empty() -> Self {
        Self { bytes: Bytes::new() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Outcome of validating a request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Unreadable input, no header terminator, or no grammar matched.
    BadRequest,
    /// A resource name was extracted; whether it exists is decided later.
    Ok,
}

/// A classified request together with the resource it names.
///
/// Only the parser hands out `Ok` values, so an `Ok` request always carries a
/// non-empty resource name that matched one of the request-line grammars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    classification: Classification,
    resource_name: String,
}

impl ParsedRequest {
    pub fn bad_request() -> Self {
        Self {
            classification: Classification::BadRequest,
            resource_name: String::new(),
        }
    }

    pub(crate) fn ok(resource_name: impl Into<String>) -> Self {
        let resource_name = resource_name.into();
        debug_assert!(!resource_name.is_empty());
        Self {
            classification: Classification::Ok,
            resource_name,
        }
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// The requested file name, without the leading `/`. Empty for bad requests.
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn is_ok(&self) -> bool {
        self.classification == Classification::Ok
    }
}
