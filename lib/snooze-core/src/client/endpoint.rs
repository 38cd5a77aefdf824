use super::ResultShape;
use super::codec::DEFAULT_CONTENT_TYPE;

/// Metadata of one remote endpoint.
///
/// Usually produced by the [`service`](crate::service) macro from an `#[endpoint(...)]`
/// attribute, but it can be written by hand:
///
/// ```rust
/// use snooze_core::Endpoint;
///
/// const CREATE_USER: Endpoint = Endpoint::new("/users", "POST").with_content_type("application/xml");
/// assert_eq!(CREATE_USER.content_type(), "application/xml");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    path: &'static str,
    method: &'static str,
    content_type: &'static str,
    response_content_type: Option<&'static str>,
}

impl Endpoint {
    /// Creates an endpoint with the default `application/json` content type.
    #[must_use]
    pub const fn new(path: &'static str, method: &'static str) -> Self {
        Self {
            path,
            method,
            content_type: DEFAULT_CONTENT_TYPE,
            response_content_type: None,
        }
    }

    /// Sets the content type of the request body.
    #[must_use]
    pub const fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = content_type;
        self
    }

    /// Forces the content type used to decode responses, whatever the response header says.
    #[must_use]
    pub const fn with_response_content_type(mut self, content_type: &'static str) -> Self {
        self.response_content_type = Some(content_type);
        self
    }

    /// The path template, with `{0}`, `{1}`, ... placeholders.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// The HTTP verb.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        self.method
    }

    /// The request content type.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// The declared response content type, if any.
    #[must_use]
    pub const fn response_content_type(&self) -> Option<&'static str> {
        self.response_content_type
    }

    /// Content type used to decode a response.
    ///
    /// The declared response content type wins, then the response `Content-Type`
    /// header, then `application/json`.
    #[must_use]
    pub fn effective_response_content_type<'a>(&self, header: Option<&'a str>) -> &'a str {
        if let Some(declared) = self.response_content_type {
            return declared;
        }
        match header.map(str::trim) {
            Some(header) if !header.is_empty() => header,
            _ => DEFAULT_CONTENT_TYPE,
        }
    }
}

/// An endpoint bound to the shape of its declared outputs.
///
/// This is what a generated client method calls [`Client::call`](super::Client::call) with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stub {
    endpoint: Endpoint,
    shape: ResultShape,
}

impl Stub {
    /// Binds an endpoint to its result shape.
    #[must_use]
    pub const fn new(endpoint: Endpoint, shape: ResultShape) -> Self {
        Self { endpoint, shape }
    }

    /// The endpoint metadata.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The result shape.
    #[must_use]
    pub const fn shape(&self) -> &ResultShape {
        &self.shape
    }
}
