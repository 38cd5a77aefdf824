//! Procedural macros for snooze service clients.
//!
//! `#[service]` turns a trait whose methods carry `#[endpoint(...)]` metadata into
//! a working HTTP client: the trait is kept (with `async fn` rewritten as
//! `fn -> impl Future + Send`) and a `<Trait>Client` struct implementing it is generated.
//!
//! ```ignore
//! use snooze_core::{SnoozeError, service};
//!
//! #[service]
//! pub trait UserApi {
//!     #[endpoint(path = "/users/{0}", method = "GET")]
//!     async fn get_user(&self, id: u32) -> Result<User, SnoozeError>;
//! }
//!
//! let users = UserApiClient::new(client);
//! ```
//!
//! Invalid declarations are rejected at compile time: unknown placeholders, unused path
//! parameters, several bodies, tuple outputs, missing error output without `discard_errors`.
//!
//! Use it through `snooze_core::service`, the generated code refers to `::snooze_core`.

use proc_macro::TokenStream;

mod expand;
mod scan;

/// Generates a client implementing the annotated service trait.
#[proc_macro_attribute]
pub fn service(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand::expand_service(attr.into(), item.into()).into()
}
