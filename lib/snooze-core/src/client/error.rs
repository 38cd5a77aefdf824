use std::fmt::Debug;

/// Errors that can occur when calling an endpoint.
///
/// Every failure of a call, from body encoding to response decoding, ends up as one of
/// these variants and is placed in the error output of the endpoint.
/// Use [`SnoozeError::kind`] to get the coarse category of an error.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum SnoozeError {
    /// HTTP client error from the underlying reqwest library.
    ///
    /// Occurs when network requests fail, timeouts occur, or connection issues arise.
    ReqwestError(reqwest::Error),

    /// URL parsing error when joining the root and the resolved path.
    UrlError(url::ParseError),

    /// Invalid HTTP header value.
    ///
    /// Occurs when the endpoint content type contains invalid characters.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// The endpoint declares a method that is not a valid HTTP verb.
    #[display("Invalid HTTP method: '{method}'")]
    #[from(skip)]
    InvalidMethod {
        /// The declared method.
        method: String,
    },

    /// The client root is not an absolute URL.
    #[display("Invalid root '{root}': {error}")]
    #[from(skip)]
    InvalidRoot {
        /// The configured root.
        root: String,
        /// Why the root was rejected.
        error: url::ParseError,
    },

    /// Path template contains unresolved placeholders.
    #[display("Path '{path}' is missing required arguments: {missings:?}")]
    #[from(skip)]
    PathUnresolved {
        /// The path after substitution.
        path: String,
        /// The placeholders left in the path.
        missings: Vec<String>,
    },

    /// A path argument is `.` or `..`, URL normalization would move the request to another resource.
    #[display("Path argument {position} cannot be the dot segment '{value}'")]
    #[from(skip)]
    DotSegment {
        /// Position of the argument in the method signature.
        position: usize,
        /// The rejected value.
        value: String,
    },

    /// The request body could not be serialized.
    #[display("Failed to encode request body as {content_type}: {message}")]
    #[from(skip)]
    Encoding {
        /// The content type used for encoding.
        content_type: String,
        /// The serializer error message.
        message: String,
    },

    /// No codec is available for the request content type.
    #[display("Content type '{content_type}' is not supported for request bodies")]
    #[from(skip)]
    ContentTypeUnsupported {
        /// The endpoint content type.
        content_type: String,
    },

    /// The response body could not be parsed into the declared payload type.
    #[display("Failed to decode {content_type} response: {message}\n{body}")]
    #[from(skip)]
    Decoding {
        /// The effective response content type.
        content_type: String,
        /// The deserializer error message.
        message: String,
        /// The response body that failed to parse (lossy UTF-8).
        body: String,
    },

    /// Failure reported by a custom [`Transport`](super::Transport).
    #[display("Transport failure: {message}")]
    #[from(skip)]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// Server returned a non-success status code while `error_for_status` is enabled.
    #[display("Unexpected status code {status_code}: {body}")]
    #[from(skip)]
    UnexpectedStatusCode {
        /// The HTTP status code received.
        status_code: u16,
        /// The response body for debugging.
        body: String,
    },
}

/// Coarse category of a [`SnoozeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Body serialization failed, no request was sent.
    Encoding,
    /// The request could not be built (verb, URL, path, header).
    RequestConstruction,
    /// The transport failed or the status was rejected.
    Transport,
    /// The response body could not be decoded.
    Decoding,
}

impl SnoozeError {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Encoding { .. } | Self::ContentTypeUnsupported { .. } => ErrorKind::Encoding,
            Self::UrlError(_)
            | Self::InvalidHeaderValue(_)
            | Self::InvalidMethod { .. }
            | Self::InvalidRoot { .. }
            | Self::PathUnresolved { .. }
            | Self::DotSegment { .. } => ErrorKind::RequestConstruction,
            Self::ReqwestError(_) | Self::Transport { .. } | Self::UnexpectedStatusCode { .. } => {
                ErrorKind::Transport
            }
            Self::Decoding { .. } => ErrorKind::Decoding,
        }
    }

    /// Creates a transport error from any message, for custom [`Transport`](super::Transport)s.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snooze_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SnoozeError>();
        assert_sync::<SnoozeError>();
    }

    #[test]
    fn test_error_kinds() {
        let encoding = SnoozeError::ContentTypeUnsupported {
            content_type: "text/plain".to_string(),
        };
        assert_eq!(encoding.kind(), ErrorKind::Encoding);

        let construction = SnoozeError::InvalidMethod {
            method: "GE T".to_string(),
        };
        assert_eq!(construction.kind(), ErrorKind::RequestConstruction);

        let transport = SnoozeError::transport("connection refused");
        assert_eq!(transport.kind(), ErrorKind::Transport);

        let decoding = SnoozeError::Decoding {
            content_type: "application/json".to_string(),
            message: "EOF".to_string(),
            body: String::new(),
        };
        assert_eq!(decoding.kind(), ErrorKind::Decoding);
    }

    #[test]
    fn test_error_display() {
        let error = SnoozeError::PathUnresolved {
            path: "/users/{0}".to_string(),
            missings: vec!["0".to_string()],
        };
        insta::assert_snapshot!(error, @r#"Path '/users/{0}' is missing required arguments: ["0"]"#);

        let error = SnoozeError::ContentTypeUnsupported {
            content_type: "text/plain".to_string(),
        };
        insta::assert_snapshot!(error, @"Content type 'text/plain' is not supported for request bodies");

        let error = SnoozeError::DotSegment {
            position: 0,
            value: "..".to_string(),
        };
        insta::assert_snapshot!(error, @"Path argument 0 cannot be the dot segment '..'");
        assert_eq!(error.kind(), ErrorKind::RequestConstruction);
    }
}
