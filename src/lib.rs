//! # Restion - a fluent HTTP request builder
//!
//! Restion assembles requests step by step (path, method, headers, query
//! parameters, body) and executes them through a shared [`Client`] that
//! returns a typed [`Response`]. Bodies are encoded by pluggable codecs (JSON
//! and XML are included), and the transport is pluggable too, with `reqwest`
//! as the default.
//!
//! ## Quick Start
//!
//! ```no_run
//! use http::Method;
//! use restion::{Client, RequestBuilder};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     name: String,
//!     email: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//!     email: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restion::Error> {
//!     let client = Client::builder()
//!         .base_url("https://api.example.com")?
//!         .default_header("User-Agent", "my-app/1.0")?
//!         .build()?;
//!
//!     // Make a GET request
//!     let request = RequestBuilder::new("/users/123").add_parameter("expand", "profile")?;
//!     let response = client.execute::<User, _>(request).await?;
//!     if let Some(user) = &response.content {
//!         println!("User: {}", user.name);
//!     }
//!     println!("Request took {:?}", response.latency);
//!
//!     // Make a POST request
//!     let request = RequestBuilder::new("/users")
//!         .with_http_method(Method::POST)?
//!         .with_content(CreateUser {
//!             name: "Alice".to_string(),
//!             email: "alice@example.com".to_string(),
//!         })?;
//!     let created = client.execute::<User, _>(request).await?.into_result()?;
//!     println!("Created user with ID: {}", created.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Misuse of the API (blank or duplicate keys, missing codecs, reusing a
//! disposed request) fails immediately with an [`Error`]. Failures that happen
//! once a request is in flight never escape [`Client::execute`]; they are
//! captured on [`Response::exception`] together with whatever else is known
//! about the call:
//!
//! ```no_run
//! use restion::{Client, Error, RequestBuilder};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().base_url("https://api.example.com")?.build()?;
//! let response = client
//!     .execute::<serde_json::Value, _>(RequestBuilder::new("/endpoint"))
//!     .await?;
//!
//! match response.exception {
//!     None => println!("Success: {:?}", response.content),
//!     Some(Error::HttpError { status, raw_response, .. }) => {
//!         eprintln!("HTTP error {}: {}", status, raw_response);
//!     }
//!     Some(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Bodies
//!
//! A request carries at most one kind of body: serialized content
//! ([`RequestBuilder::with_content`]), url-encoded form fields
//! ([`RequestBuilder::add_form_url`]) or multipart fields
//! ([`RequestBuilder::add_form_data`]). `GET` requests never send a body.

mod client;
pub mod codec;
mod error;
mod options;
pub mod query;
mod request;
mod response;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use options::ClientOptions;
pub use request::{NoContent, RequestBuilder};
pub use response::Response;
pub use transport::{Charset, FormValue};
