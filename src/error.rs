//! Error types for building and executing requests.
//!
//! Errors fall into two tiers. Usage errors (empty arguments, duplicate keys,
//! a missing codec, a disposed builder) are returned straight to the caller
//! as soon as the misuse is detected. Everything that can go wrong once a
//! request is in flight (network failures, error statuses, codec failures)
//! is captured on [`Response::exception`](crate::Response::exception) instead.

use http::{HeaderMap, StatusCode};

/// The main error type for request building and execution.
///
/// # Examples
///
/// ```no_run
/// use restion::{Client, Error, RequestBuilder};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
///
/// let response = client
///     .execute::<serde_json::Value, _>(RequestBuilder::new("/endpoint"))
///     .await?;
///
/// match response.exception {
///     None => println!("Success: {:?}", response.content),
///     Some(Error::DeserializationFailed { raw_response, serde_error }) => {
///         eprintln!("Failed to deserialize. Raw response: {}", raw_response);
///         eprintln!("Serde error: {}", serde_error);
///     }
///     Some(Error::HttpError { status, raw_response, .. }) => {
///         eprintln!("HTTP error {}: {}", status, raw_response);
///     }
///     Some(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required string argument was empty or whitespace.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A key was added twice to the same request collection.
    ///
    /// Headers, query parameters and form fields are separate namespaces.
    #[error("There is already a {kind} with the key '{key}'")]
    DuplicateKey {
        /// Which collection rejected the key (`"parameter"`, `"header"`, ...)
        kind: &'static str,
        /// The rejected key
        key: String,
    },

    /// Two different kinds of body were configured on one request.
    #[error("Conflicting request body: {0}")]
    ConflictingBody(String),

    /// The request builder was used after it had been disposed.
    #[error("Request builder has already been disposed")]
    RequestDisposed,

    /// A body needed serializing but no serializer is installed.
    #[error("Serializer is not defined")]
    MissingSerializer,

    /// A response needed decoding but no deserializer is installed.
    #[error("Deserializer is not defined")]
    MissingDeserializer,

    /// Invalid configuration was provided.
    ///
    /// This covers header names or values that are not valid HTTP, and
    /// failures to construct the underlying HTTP client.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The composed request URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A custom [`Transport`](crate::transport::Transport) failed to deliver the request.
    #[error("Transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// The server returned a non-2xx HTTP status code.
    #[error("HTTP error {status}: {raw_response}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Failed to deserialize the response body into the expected type.
    ///
    /// The raw body is kept so parse failures can be debugged in production.
    #[error("Failed to deserialize response: {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The codec's error message
        serde_error: String,
    },

    /// A response was unwrapped but carried neither content nor an exception.
    #[error("Response carried no content")]
    NoContent,
}

impl Error {
    /// Returns `true` for errors caused by misuse of the API.
    ///
    /// These are the errors [`Client::execute`](crate::Client::execute) and the
    /// request builder return directly. All other variants describe run-time
    /// conditions and are captured on the response.
    ///
    /// # Examples
    ///
    /// ```
    /// use restion::Error;
    ///
    /// assert!(Error::MissingSerializer.is_usage_error());
    /// assert!(!Error::SerializationFailed("boom".to_string()).is_usage_error());
    /// ```
    pub fn is_usage_error(&self) -> bool {
        match self {
            Error::InvalidArgument(_) => true,
            Error::DuplicateKey { .. } => true,
            Error::ConflictingBody(_) => true,
            Error::RequestDisposed => true,
            Error::MissingSerializer => true,
            Error::MissingDeserializer => true,
            Error::ConfigurationError(_) => true,
            Error::InvalidUrl(_) => false,
            Error::Network(_) => false,
            Error::Transport(_) => false,
            Error::HttpError { .. } => false,
            Error::SerializationFailed(_) => false,
            Error::DeserializationFailed { .. } => false,
            Error::NoContent => false,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    pub(crate) fn invalid_argument(name: &str) -> Self {
        Error::InvalidArgument(format!("'{name}' must not be empty or whitespace"))
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
