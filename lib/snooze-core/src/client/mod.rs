use std::sync::Arc;

use http::Method;
use http::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Body, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

mod builder;
pub use self::builder::ClientBuilder;

mod codec;
pub use self::codec::Codec;

mod endpoint;
pub use self::endpoint::{Endpoint, Stub};

mod error;
pub use self::error::{ErrorKind, SnoozeError};

mod outcome;
pub use self::outcome::Outcome;

mod path;
pub use self::path::Arguments;

mod shape;
pub use self::shape::{ResultShape, ShapeError, Slot};

mod transport;
pub use self::transport::{
    ReqwestTransport, ResponseEnvelope, Transport, TransportConfig, TransportFuture,
};

pub(in crate::client) const BODY_MAX_LENGTH: usize = 1024;

/// Hook called with every outgoing request and its transport configuration.
pub type BeforeSend = Arc<dyn Fn(&mut Request, &mut TransportConfig) + Send + Sync>;

/// Shared configuration of generated service clients.
///
/// A `Client` holds the root URL, the optional `before_send` hook and the transport.
/// It is read-only once built and cheap to clone, every call builds its own request.
///
/// # Example
///
/// ```rust,no_run
/// use serde::Deserialize;
/// use snooze_core::{Client, SnoozeError, service};
///
/// #[derive(Debug, Default, Deserialize)]
/// struct User {
///     id: u32,
///     name: String,
/// }
///
/// #[service]
/// trait UserApi {
///     #[endpoint(path = "/users/{0}", method = "GET")]
///     async fn get_user(&self, id: u32) -> Result<User, SnoozeError>;
/// }
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder().with_root("https://api.example.com").build()?;
/// let users = UserApiClient::new(client);
///
/// let user = users.get_user(7).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_more::Debug)]
pub struct Client {
    root: Arc<str>,
    #[debug(skip)]
    before_send: Option<BeforeSend>,
    transport: Arc<dyn Transport>,
    error_for_status: bool,
}

impl Client {
    /// Creates a [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The root URL.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Calls an endpoint.
    ///
    /// Resolves the path, encodes the body (except for `GET`), builds the request,
    /// runs the `before_send` hook, sends the request with the transport and decodes
    /// the response. Any failure is placed in the error output of the returned [`Outcome`].
    ///
    /// Every call is independent: no cache, no retry.
    pub async fn call<B, T>(&self, stub: &Stub, arguments: Arguments<'_, B>) -> Outcome<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let endpoint = stub.endpoint();
        match self.exchange(endpoint, &arguments).await {
            Ok(response) => {
                let content_type =
                    endpoint.effective_response_content_type(response.content_type.as_deref());
                stub.shape()
                    .build(None, content_type, response.body.as_deref())
            }
            Err(error) => {
                debug!(%error, method = endpoint.method(), path = endpoint.path(), "call failed");
                stub.shape().build(Some(error), endpoint.content_type(), None)
            }
        }
    }

    async fn exchange<B>(
        &self,
        endpoint: &Endpoint,
        arguments: &Arguments<'_, B>,
    ) -> Result<ResponseEnvelope, SnoozeError>
    where
        B: Serialize + Sync,
    {
        let path = arguments.resolve_path(endpoint.path())?;

        let body = match arguments.body() {
            Some(body) if endpoint.method() != Method::GET.as_str() => {
                Codec::encode(endpoint.content_type(), body)?
            }
            _ => Vec::new(),
        };

        let mut request = self.build_request(endpoint, &path, body)?;
        let mut config = TransportConfig::default();
        if let Some(before_send) = &self.before_send {
            before_send(&mut request, &mut config);
        }

        let response = self.transport.send(request, config).await?;

        if self.error_for_status && !response.status.is_success() {
            let body = response
                .body
                .as_deref()
                .map(|bytes| {
                    if bytes.len() > BODY_MAX_LENGTH {
                        let truncated = bytes.get(..BODY_MAX_LENGTH).unwrap_or(bytes);
                        format!("{}... (truncated)", String::from_utf8_lossy(truncated))
                    } else {
                        String::from_utf8_lossy(bytes).into_owned()
                    }
                })
                .unwrap_or_default();
            return Err(SnoozeError::UnexpectedStatusCode {
                status_code: response.status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    fn build_request(
        &self,
        endpoint: &Endpoint,
        path: &str,
        body: Vec<u8>,
    ) -> Result<Request, SnoozeError> {
        let method = Method::from_bytes(endpoint.method().as_bytes()).map_err(|_| {
            SnoozeError::InvalidMethod {
                method: endpoint.method().to_string(),
            }
        })?;
        let url = Url::parse(&format!("{}{path}", self.root))?;

        let mut request = Request::new(method, url);
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_str(endpoint.content_type())?);
        if !body.is_empty() {
            *request.body_mut() = Some(Body::from(body));
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::StatusCode;

    use super::*;

    #[derive(Debug)]
    struct StaticTransport {
        status: StatusCode,
        body: &'static str,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl StaticTransport {
        fn new(status: StatusCode, body: &'static str) -> Self {
            Self {
                status,
                body,
                requests: Arc::default(),
            }
        }
    }

    impl Transport for StaticTransport {
        fn send(&self, request: Request, _config: TransportConfig) -> TransportFuture<'_> {
            let line = format!("{} {}", request.method(), request.url());
            self.requests.lock().expect("not poisoned").push(line);
            let response = ResponseEnvelope {
                status: self.status,
                content_type: None,
                body: Some(self.body.into()),
            };
            Box::pin(async move { Ok(response) })
        }
    }

    fn client_with(transport: StaticTransport) -> Client {
        Client::builder()
            .with_root("http://localhost:8080")
            .with_transport(transport)
            .build()
            .expect("valid client")
    }

    #[test]
    fn should_build_request() {
        let client = client_with(StaticTransport::new(StatusCode::OK, ""));
        let endpoint = Endpoint::new("/users", "PUT").with_content_type("application/xml");

        let request = client
            .build_request(&endpoint, "/users/7", b"<User/>".to_vec())
            .expect("valid request");

        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(request.url().as_str(), "http://localhost:8080/users/7");
        assert_eq!(
            request.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/xml"))
        );
        let body = request.body().and_then(Body::as_bytes);
        assert_eq!(body, Some(&b"<User/>"[..]));
    }

    #[test]
    fn should_not_attach_empty_body() {
        let client = client_with(StaticTransport::new(StatusCode::OK, ""));
        let endpoint = Endpoint::new("/users", "GET");

        let request = client
            .build_request(&endpoint, "/users", Vec::new())
            .expect("valid request");

        assert!(request.body().is_none());
    }

    #[test]
    fn should_reject_invalid_method() {
        let client = client_with(StaticTransport::new(StatusCode::OK, ""));
        let endpoint = Endpoint::new("/users", "GE T");

        let result = client.build_request(&endpoint, "/users", Vec::new());

        insta::assert_snapshot!(result.expect_err("invalid method"), @"Invalid HTTP method: 'GE T'");
    }

    #[tokio::test]
    async fn should_reject_unexpected_status_when_enabled() {
        let client = Client::builder()
            .with_root("http://localhost:8080")
            .with_transport(StaticTransport::new(StatusCode::NOT_FOUND, "no such user"))
            .with_error_for_status(true)
            .build()
            .expect("valid client");
        let stub = Stub::new(Endpoint::new("/users/{0}", "GET"), ResultShape::ERROR_ONLY);

        let outcome = client
            .call::<(), ()>(&stub, Arguments::without_body().path(0, 1))
            .await;

        insta::assert_debug_snapshot!(outcome.error(), @r#"
        Some(
            UnexpectedStatusCode {
                status_code: 404,
                body: "no such user",
            },
        )
        "#);
    }

    #[tokio::test]
    async fn should_accept_any_status_by_default() {
        let transport = StaticTransport::new(StatusCode::NOT_FOUND, r#"{"id":0}"#);
        let requests = Arc::clone(&transport.requests);
        let client = client_with(transport);
        let stub = Stub::new(
            Endpoint::new("/users/{0}", "GET"),
            ResultShape::PAYLOAD_AND_ERROR,
        );

        let outcome = client
            .call::<(), serde_json::Value>(&stub, Arguments::without_body().path(0, 1))
            .await;

        assert!(outcome.error().is_none());
        assert_eq!(outcome.payload(), Some(&serde_json::json!({"id": 0})));
        let requests = requests.lock().expect("not poisoned");
        assert_eq!(*requests, vec!["GET http://localhost:8080/users/1".to_string()]);
    }
}
