use std::fmt::Debug;
use std::future::Future;
use std::mem;
use std::pin::Pin;

use bytes::Bytes;
use http::StatusCode;
use http::header::CONTENT_TYPE;
use reqwest::{ClientBuilder, Request};
use tracing::debug;

use super::SnoozeError;

/// Future returned by [`Transport::send`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ResponseEnvelope, SnoozeError>> + Send + 'a>>;

/// What the client needs from an HTTP response.
#[derive(Clone, derive_more::Debug)]
pub struct ResponseEnvelope {
    /// The response status.
    pub status: StatusCode,
    /// The response `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// The response body, if any.
    #[debug("{:?}", body.as_ref().map(Bytes::len))]
    pub body: Option<Bytes>,
}

impl ResponseEnvelope {
    /// A `200 OK` response.
    #[must_use]
    pub fn ok(content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: content_type.map(ToOwned::to_owned),
            body: Some(body.into()),
        }
    }

    /// A response without body.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: None,
        }
    }
}

/// Transport configuration of one call.
///
/// A fresh configuration is created for every call and handed to the
/// `before_send` hook, so timeouts, proxies or TLS settings can be adjusted per call.
///
/// ```rust
/// use std::time::Duration;
/// use snooze_core::TransportConfig;
///
/// let mut config = TransportConfig::default();
/// config.configure(|builder| builder.timeout(Duration::from_secs(5)));
/// ```
#[derive(Debug, Default)]
pub struct TransportConfig {
    builder: ClientBuilder,
}

impl TransportConfig {
    /// Applies `update` to the underlying [`reqwest::ClientBuilder`].
    pub fn configure(&mut self, update: impl FnOnce(ClientBuilder) -> ClientBuilder) {
        let builder = mem::take(&mut self.builder);
        self.builder = update(builder);
    }

    /// Consumes the configuration.
    #[must_use]
    pub fn into_builder(self) -> ClientBuilder {
        self.builder
    }
}

/// Sends requests built by the client.
///
/// The default implementation is [`ReqwestTransport`]. Implement this trait to plug
/// another HTTP stack, or a mock in tests.
pub trait Transport: Debug + Send + Sync {
    /// Sends `request` and returns the response.
    fn send(&self, request: Request, config: TransportConfig) -> TransportFuture<'_>;
}

/// [`Transport`] based on `reqwest`.
///
/// A new [`reqwest::Client`] is built from the [`TransportConfig`] for every call,
/// connections are not reused across calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl Transport for ReqwestTransport {
    fn send(&self, request: Request, config: TransportConfig) -> TransportFuture<'_> {
        Box::pin(async move {
            let client = config.into_builder().build()?;

            debug!(?request, "sending...");
            let response = client.execute(request).await?;
            debug!(?response, "...receiving");

            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(ToOwned::to_owned);
            let body = response.bytes().await?;

            Ok(ResponseEnvelope {
                status,
                content_type,
                body: Some(body),
            })
        })
    }
}
