use std::fmt;
use std::io;

use crate::http::parser::ParseError;

/// Everything that can end a connection early.
///
/// None of these escape the connection that produced them: the first two
/// are answered with a 400 or 404, the last one only truncates the body
/// that is already on its way to the client.
#[derive(Debug)]
pub enum ServeError {
    /// The request could not be read or did not match the request-line grammar.
    MalformedRequest(ParseError),
    /// The request was valid but the file could not be stat'ed or opened.
    ResourceUnavailable { resource: String, source: io::Error },
    /// Reading the file or writing to the client failed mid-transfer.
    TransferInterrupted { resource: String, source: io::Error },
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeError::MalformedRequest(reason) => write!(f, "malformed request: {}", reason),
            ServeError::ResourceUnavailable { resource, source } => {
                write!(f, "resource {} unavailable: {}", resource, source)
            }
            ServeError::TransferInterrupted { resource, source } => {
                write!(f, "transfer of {} interrupted: {}", resource, source)
            }
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServeError::MalformedRequest(reason) => Some(reason),
            ServeError::ResourceUnavailable { source, .. }
            | ServeError::TransferInterrupted { source, .. } => Some(source),
        }
    }
}

impl From<ParseError> for ServeError {
    fn from(reason: ParseError) -> Self {
        ServeError::MalformedRequest(reason)
    }
}
