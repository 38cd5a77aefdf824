//! # Snooze Core
//!
//! Declarative HTTP clients: describe the endpoints of a service as an annotated trait,
//! get a working client for it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde::{Deserialize, Serialize};
//! use snooze_core::{Client, SnoozeError, service};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct User {
//!     id: u32,
//!     name: String,
//! }
//!
//! #[service]
//! pub trait UserApi {
//!     #[endpoint(path = "/users/{0}", method = "GET")]
//!     async fn get_user(&self, id: u32) -> Result<User, SnoozeError>;
//!
//!     #[endpoint(path = "/users", method = "POST")]
//!     async fn create_user(&self, user: &User) -> Result<(), SnoozeError>;
//!
//!     #[endpoint(path = "/users/{0}", method = "PUT", content_type = "application/xml")]
//!     async fn update_user(&self, id: u32, user: &User) -> Result<User, SnoozeError>;
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder()
//!     .with_root("https://api.example.com")
//!     .build()?;
//! let users = UserApiClient::new(client);
//!
//! // GET https://api.example.com/users/7
//! let user = users.get_user(7).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Endpoint metadata
//!
//! | key                     | meaning                                              | default            |
//! |-------------------------|------------------------------------------------------|--------------------|
//! | `path`                  | path template with `{0}`, `{1}`, ... placeholders    | required           |
//! | `method`                | HTTP verb                                            | required           |
//! | `content_type`          | request body content type                            | `application/json` |
//! | `response_content_type` | forces the content type used to decode the response  | response header    |
//! | `discard_errors`        | allows a return type without error output            | off                |
//!
//! Placeholders refer to the position of the method parameters (`&self` excluded).
//! Scalar parameters (numbers, `bool`, `char`, strings) fill the placeholders, percent-encoded.
//! The structured parameter, at most one, is the request body; it is not sent for `GET`.
//! Use `#[body]` or `#[path]` on a parameter to override the classification.
//!
//! ## Outputs
//!
//! - `Result<T, E>`: the decoded payload, or the error converted with `E: From<SnoozeError>`;
//! - `Result<(), E>`: only the error, the body is not decoded;
//! - `T` or `()` with `discard_errors`: errors are logged and dropped.
//!
//! When no payload can be produced without error (unsupported response content type),
//! the payload is `T::default()`. Declare `Option<T>` to get `None` instead.
//!
//! ## Codecs
//!
//! `application/json` uses `serde_json`, `application/xml` and `text/xml` use `serde-xml-rs`.
//! A response without `Content-Type` is decoded as JSON.
//! A response with an unsupported content type is not decoded (a warning is logged),
//! a request with an unsupported content type fails before anything is sent.
//!
//! ## Customization
//!
//! The `before_send` hook of the [`ClientBuilder`] sees every request and its
//! [`TransportConfig`] before dispatch: add authentication headers, timeouts, proxies there.
//! The [`Transport`] trait lets you replace `reqwest`, for example with a mock in tests.

mod client;

pub use self::client::{
    Arguments, BeforeSend, Client, ClientBuilder, Codec, Endpoint, ErrorKind, Outcome,
    ReqwestTransport, ResponseEnvelope, ResultShape, ShapeError, Slot, SnoozeError, Stub,
    Transport, TransportConfig, TransportFuture,
};

/// Generates a client for an annotated service trait.
///
/// See the [crate documentation](crate) for the supported attributes.
pub use snooze_macro::service;

/// Result type of snooze operations.
pub type Result<T, E = SnoozeError> = std::result::Result<T, E>;
