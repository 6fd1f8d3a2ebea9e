//! The outcome of one executed request.
//!
//! A [`Response`] is always returned once a request has been dispatched,
//! whether the call worked or not. Failures that happen in flight are kept
//! on [`Response::exception`]; check it before trusting
//! [`Response::content`].

use crate::{Error, Result};
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// The outcome of [`Client::execute`](crate::Client::execute).
///
/// # Type Parameters
///
/// * `T` - The type of the deserialized response data
///
/// # Examples
///
/// ```no_run
/// use restion::{Client, RequestBuilder};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), restion::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
///
/// let response = client.execute::<User, _>(RequestBuilder::new("/users/123")).await?;
///
/// match (&response.content, &response.exception) {
///     (_, Some(e)) => eprintln!("Request failed: {}", e),
///     (Some(user), None) => println!("User: {}", user.name),
///     (None, None) => println!("No content"),
/// }
/// println!("Status: {:?}", response.status);
/// println!("Request took {:?}", response.latency);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Response<T> {
    /// The deserialized response data.
    pub content: Option<T>,

    /// The raw response body, kept only when
    /// [`ClientOptions::allow_raw_content`](crate::ClientOptions::allow_raw_content) is set.
    pub raw_content: Option<String>,

    /// The HTTP status code, or `None` if no reply was received.
    pub status: Option<StatusCode>,

    /// The response headers. Empty if no reply was received.
    pub headers: HeaderMap,

    /// Time from dispatch until the body was decoded or the call failed.
    pub latency: Duration,

    /// The failure captured while the request was in flight.
    pub exception: Option<Error>,
}

impl<T> Response<T> {
    pub(crate) fn pending() -> Self {
        Self {
            content: None,
            raw_content: None,
            status: None,
            headers: HeaderMap::new(),
            latency: Duration::ZERO,
            exception: None,
        }
    }

    /// Returns `true` if content was decoded and nothing failed.
    pub fn is_success(&self) -> bool {
        self.exception.is_none() && self.content.is_some()
    }

    /// Converts the response into its content or its captured failure.
    ///
    /// # Errors
    ///
    /// Returns the captured exception, or [`Error::NoContent`] if the
    /// response carries neither.
    ///
    /// # Examples
    ///
    /// ```
    /// # use restion::{Error, Response};
    /// let response = Response::new(Some(42), None, None);
    /// assert_eq!(response.into_result().unwrap(), 42);
    ///
    /// let failed: Response<u32> = Response::new(None, None, Some(Error::MissingDeserializer));
    /// assert!(failed.into_result().is_err());
    /// ```
    pub fn into_result(self) -> Result<T> {
        match (self.exception, self.content) {
            (Some(e), _) => Err(e),
            (None, Some(content)) => Ok(content),
            (None, None) => Err(Error::NoContent),
        }
    }

    /// Creates a response by hand, for tests and custom pipelines.
    pub fn new(content: Option<T>, status: Option<StatusCode>, exception: Option<Error>) -> Self {
        Self {
            content,
            status,
            exception,
            ..Self::pending()
        }
    }

    /// Maps the content to a different type, keeping everything else.
    ///
    /// # Examples
    ///
    /// ```
    /// # use restion::Response;
    /// let response = Response::new(Some(42), None, None);
    /// let string_response = response.map(|n| n.to_string());
    /// assert_eq!(string_response.content.as_deref(), Some("42"));
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            content: self.content.map(f),
            raw_content: self.raw_content,
            status: self.status,
            headers: self.headers,
            latency: self.latency,
            exception: self.exception,
        }
    }

    /// Returns a reference to a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn pending_response_has_unknown_status() {
        let response: Response<()> = Response::pending();
        assert!(response.status.is_none());
        assert!(!response.is_success());
        assert!(matches!(response.into_result(), Err(Error::NoContent)));
    }

    #[test]
    fn exception_takes_precedence_over_content() {
        let response = Response::new(
            Some(1),
            Some(StatusCode::OK),
            Some(Error::SerializationFailed("boom".to_string())),
        );

        assert!(!response.is_success());
        assert!(matches!(
            response.into_result(),
            Err(Error::SerializationFailed(_))
        ));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut response = Response::new(Some(()), Some(StatusCode::OK), None);
        response
            .headers
            .insert("content-type", HeaderValue::from_static("application/json"));

        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }
}
