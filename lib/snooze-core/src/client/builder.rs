use std::sync::Arc;

use reqwest::Request;
use url::Url;

use super::{BeforeSend, Client, ReqwestTransport, SnoozeError, Transport, TransportConfig};

/// Builder for creating [`Client`] instances.
///
/// # Default Configuration
///
/// - **Root**: `http://127.0.0.1`
/// - **Hook**: none
/// - **Transport**: [`ReqwestTransport`]
/// - **Status check**: disabled, every status is decoded like a success
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use snooze_core::Client;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder()
///     .with_root("https://api.example.com/v1")
///     .with_before_send(|request, config| {
///         request.headers_mut().insert("x-api-key", "secret".parse().expect("valid header"));
///         config.configure(|builder| builder.timeout(Duration::from_secs(10)));
///     })
///     .with_error_for_status(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_more::Debug)]
pub struct ClientBuilder {
    root: String,
    #[debug(skip)]
    before_send: Option<BeforeSend>,
    transport: Arc<dyn Transport>,
    error_for_status: bool,
}

impl ClientBuilder {
    /// Builds the [`Client`].
    ///
    /// # Errors
    ///
    /// Returns [`SnoozeError::InvalidRoot`] if the root is not an absolute URL.
    pub fn build(self) -> Result<Client, SnoozeError> {
        let Self {
            root,
            before_send,
            transport,
            error_for_status,
        } = self;

        if let Err(error) = Url::parse(&root) {
            return Err(SnoozeError::InvalidRoot { root, error });
        }

        Ok(Client {
            root: root.into(),
            before_send,
            transport,
            error_for_status,
        })
    }

    /// Sets the root URL, prefixed verbatim to every resolved path.
    ///
    /// Trailing slashes are kept: with the root `http://host/api/` the path `/users`
    /// gives `http://host/api//users`.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Sets the hook called with every request and its transport configuration just before sending.
    ///
    /// Use it for authentication headers, timeouts, or any other per-call tuning.
    #[must_use]
    pub fn with_before_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Request, &mut TransportConfig) + Send + Sync + 'static,
    {
        self.before_send = Some(Arc::new(hook));
        self
    }

    /// Sets the transport used to send requests.
    #[must_use]
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// When enabled, a non-2xx response becomes a [`SnoozeError::UnexpectedStatusCode`].
    #[must_use]
    pub fn with_error_for_status(mut self, error_for_status: bool) -> Self {
        self.error_for_status = error_for_status;
        self
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            root: "http://127.0.0.1".to_string(),
            before_send: None,
            transport: Arc::new(ReqwestTransport),
            error_for_status: false,
        }
    }
}
