//! The per-call request builder.
//!
//! A [`RequestBuilder`] collects the method, path, headers, query parameters
//! and at most one kind of body for a single call. Every setter consumes the
//! builder and hands it back, so a chain reads top to bottom and a half-built
//! request is never shared. The client consumes the builder in
//! [`Client::execute`](crate::Client::execute) and disposes it afterwards.

use crate::{
    codec::Serializer,
    query::to_query_string,
    transport::{Charset, FormValue, RequestBody, TransportRequest},
    Error, Result,
};
use http::{
    header::{CONTENT_LENGTH, CONTENT_TYPE},
    HeaderMap, HeaderName, HeaderValue, Method,
};
use reqwest::cookie::Jar;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Content type of a builder that carries no scalar body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoContent;

enum Payload<C> {
    None,
    Content(C),
    FormUrlEncoded(Vec<(String, String)>),
    Multipart(Vec<(String, FormValue)>),
}

impl<C> Payload<C> {
    fn kind(&self) -> &'static str {
        match self {
            Payload::None => "empty",
            Payload::Content(_) => "content",
            Payload::FormUrlEncoded(_) => "form-url-encoded",
            Payload::Multipart(_) => "multipart",
        }
    }

    fn conflict(&self, adding: &str) -> Error {
        Error::ConflictingBody(format!(
            "cannot add {adding} to a request that already has a {} body",
            self.kind()
        ))
    }
}

impl<C> Default for Payload<C> {
    fn default() -> Self {
        Payload::None
    }
}

/// Describes one HTTP call.
///
/// The type parameter is the scalar body type set through
/// [`with_content`](Self::with_content); it is [`NoContent`] until then.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use restion::RequestBuilder;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct NewCustomer { name: String }
///
/// # fn example() -> restion::Result<()> {
/// let request = RequestBuilder::new("/Customer/")
///     .with_http_method(Method::POST)?
///     .add_header("X-Request-Id", "42")?
///     .add_parameter("notify", "true")?
///     .with_content(NewCustomer { name: "John".to_string() })?;
///
/// assert_eq!(request.method(), Method::POST);
/// assert_eq!(request.parameters().len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct RequestBuilder<C = NoContent> {
    method: Method,
    path: String,
    base_url: Option<String>,
    headers: HeaderMap,
    parameters: Vec<(String, String)>,
    payload: Payload<C>,
    charset: Charset,
    media_type: Option<String>,
    cookie_jar: Option<Arc<Jar>>,
    disposed: bool,
}

impl RequestBuilder<NoContent> {
    /// Creates a `GET` request for `path`, relative to the client's base URL.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            base_url: None,
            headers: HeaderMap::new(),
            parameters: Vec::new(),
            payload: Payload::None,
            charset: Charset::default(),
            media_type: None,
            cookie_jar: None,
            disposed: false,
        }
    }
}

impl Default for RequestBuilder<NoContent> {
    fn default() -> Self {
        Self::new("")
    }
}

impl<C> RequestBuilder<C> {
    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            Err(Error::RequestDisposed)
        } else {
            Ok(())
        }
    }

    /// Sets the HTTP method.
    pub fn with_http_method(mut self, method: Method) -> Result<Self> {
        self.ensure_live()?;
        self.method = method;
        Ok(self)
    }

    /// Adds a query parameter. Parameters are rendered in insertion order
    /// and are not escaped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty key or value and
    /// [`Error::DuplicateKey`] if the key was already added.
    pub fn add_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.ensure_live()?;
        let (key, value) = (key.into(), value.into());
        require("parameter key", &key)?;
        require("parameter value", &value)?;

        if self.parameters.iter().any(|(existing, _)| *existing == key) {
            return Err(Error::DuplicateKey {
                kind: "parameter",
                key,
            });
        }

        self.parameters.push((key, value));
        Ok(self)
    }

    /// Adds a header. Header names compare case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty name or value,
    /// [`Error::ConfigurationError`] if either is not valid HTTP, and
    /// [`Error::DuplicateKey`] if the header was already added.
    pub fn add_header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        self.ensure_live()?;
        let (key, value) = (key.as_ref(), value.as_ref());
        require("header key", key)?;
        require("header value", value)?;

        let name = HeaderName::try_from(key)
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;

        if self.headers.contains_key(&name) {
            return Err(Error::DuplicateKey {
                kind: "header",
                key: key.to_string(),
            });
        }

        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds an `application/x-www-form-urlencoded` field.
    ///
    /// # Errors
    ///
    /// Same validation as [`add_parameter`](Self::add_parameter), plus
    /// [`Error::ConflictingBody`] if another kind of body is already set.
    pub fn add_form_url(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.ensure_live()?;
        let (key, value) = (key.into(), value.into());
        require("form field key", &key)?;
        require("form field value", &value)?;

        if matches!(self.payload, Payload::None) {
            self.payload = Payload::FormUrlEncoded(Vec::new());
        }
        let fields = match &mut self.payload {
            Payload::FormUrlEncoded(fields) => fields,
            other => return Err(other.conflict("form-url-encoded fields")),
        };

        if fields.iter().any(|(existing, _)| *existing == key) {
            return Err(Error::DuplicateKey {
                kind: "form field",
                key,
            });
        }

        fields.push((key, value));
        Ok(self)
    }

    /// Adds a `multipart/form-data` field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty field name,
    /// [`Error::DuplicateKey`] for a repeated name, and
    /// [`Error::ConflictingBody`] if another kind of body is already set.
    pub fn add_form_data(mut self, key: impl Into<String>, value: impl Into<FormValue>) -> Result<Self> {
        self.ensure_live()?;
        let key = key.into();
        require("form data key", &key)?;

        if matches!(self.payload, Payload::None) {
            self.payload = Payload::Multipart(Vec::new());
        }
        let fields = match &mut self.payload {
            Payload::Multipart(fields) => fields,
            other => return Err(other.conflict("multipart fields")),
        };

        if fields.iter().any(|(existing, _)| *existing == key) {
            return Err(Error::DuplicateKey {
                kind: "form data field",
                key,
            });
        }

        fields.push((key, value.into()));
        Ok(self)
    }

    /// Sets the scalar body, serialized by the client's serializer.
    ///
    /// Setting content again replaces the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingBody`] if form fields were already added.
    pub fn with_content<T>(self, content: T) -> Result<RequestBuilder<T>> {
        self.ensure_live()?;
        let payload = match self.payload {
            Payload::None | Payload::Content(_) => Payload::Content(content),
            other => return Err(other.conflict("content")),
        };

        Ok(RequestBuilder {
            method: self.method,
            path: self.path,
            base_url: self.base_url,
            headers: self.headers,
            parameters: self.parameters,
            payload,
            charset: self.charset,
            media_type: self.media_type,
            cookie_jar: self.cookie_jar,
            disposed: false,
        })
    }

    /// Sets the charset used to encode a serialized body. Defaults to UTF-8.
    pub fn with_content_encoding(mut self, charset: Charset) -> Result<Self> {
        self.ensure_live()?;
        self.charset = charset;
        Ok(self)
    }

    /// Overrides the media type of a serialized body.
    pub fn with_content_media_type(mut self, media_type: impl Into<String>) -> Result<Self> {
        self.ensure_live()?;
        self.media_type = Some(media_type.into());
        Ok(self)
    }

    /// Sends this request through a transport bound to `jar` instead of the
    /// client's own.
    ///
    /// The jar is ignored, with a warning, when the client sends through a
    /// custom [`Transport`](crate::transport::Transport).
    pub fn with_cookie_jar(mut self, jar: Arc<Jar>) -> Result<Self> {
        self.ensure_live()?;
        self.cookie_jar = Some(jar);
        Ok(self)
    }

    /// The HTTP method.
    pub fn method(&self) -> Method {
        self.method.clone()
    }

    /// The path, relative to the client's base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The headers added so far.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The query parameters added so far, in insertion order.
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Releases everything the builder holds. Any later setter fails with
    /// [`Error::RequestDisposed`].
    pub fn dispose(&mut self) {
        self.path.clear();
        self.base_url = None;
        self.headers.clear();
        self.parameters.clear();
        self.payload = Payload::None;
        self.media_type = None;
        self.cookie_jar = None;
        self.disposed = true;
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn set_base_url(&mut self, base_url: Option<&str>) {
        self.base_url = base_url.map(str::to_string);
    }

    /// Fills in defaults for headers this request did not set itself.
    pub(crate) fn merge_default_headers(&mut self, defaults: &HeaderMap) {
        for (name, value) in defaults {
            if !self.headers.contains_key(name) {
                self.headers.insert(name.clone(), value.clone());
            }
        }
    }

    pub(crate) fn take_cookie_jar(&mut self) -> Option<Arc<Jar>> {
        self.cookie_jar.take()
    }

    fn url(&self) -> Result<Url> {
        let address = format!(
            "{}{}{}",
            self.base_url.as_deref().unwrap_or_default(),
            self.path,
            to_query_string(&self.parameters)
        );
        Ok(Url::parse(&address)?)
    }
}

impl<C> RequestBuilder<C>
where
    C: Serialize + Send + Sync,
{
    /// Produces the transport request, consuming the configured body.
    ///
    /// `GET` never carries a body; any configured one is dropped. Other
    /// methods, `DELETE` included, send whatever body was configured.
    pub(crate) async fn build_request<S>(&mut self, serializer: Option<&S>) -> Result<TransportRequest>
    where
        S: Serializer,
    {
        self.ensure_live()?;
        let url = self.url()?;
        let mut headers = self.headers.clone();
        let payload = std::mem::take(&mut self.payload);

        if self.method == Method::GET {
            if !matches!(payload, Payload::None) {
                tracing::debug!(url = %url, body = payload.kind(), "Ignoring body on GET request");
            }
            return Ok(TransportRequest {
                method: Method::GET,
                url,
                headers,
                body: RequestBody::Empty,
            });
        }

        let body = match payload {
            Payload::None => RequestBody::Empty,
            Payload::FormUrlEncoded(fields) => RequestBody::FormUrlEncoded(fields),
            Payload::Multipart(fields) => RequestBody::Multipart(fields),
            Payload::Content(content) => {
                let serializer = serializer.ok_or(Error::MissingSerializer)?;
                let text = serializer.serialize(&content).await?;
                let media_type = self
                    .media_type
                    .clone()
                    .filter(|media_type| !media_type.trim().is_empty())
                    .unwrap_or_else(|| serializer.content_type().to_string());
                let payload = self.charset.encode(&text)?;

                let content_type = format!("{}; charset={}", media_type, self.charset.label());
                let content_type = HeaderValue::try_from(content_type)
                    .map_err(|e| Error::ConfigurationError(format!("Invalid media type: {}", e)))?;
                headers.insert(CONTENT_TYPE, content_type);
                headers.insert(CONTENT_LENGTH, HeaderValue::from(payload.len()));

                RequestBody::Text {
                    payload,
                    media_type,
                    charset: self.charset,
                }
            }
        };

        Ok(TransportRequest {
            method: self.method.clone(),
            url,
            headers,
            body,
        })
    }
}

impl<C> fmt::Debug for RequestBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("parameters", &self.parameters)
            .field("body", &self.payload.kind())
            .field("charset", &self.charset)
            .field("media_type", &self.media_type)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::invalid_argument(name))
    } else {
        Ok(())
    }
}
