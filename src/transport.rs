//! The transport capability and the request/reply shapes it exchanges.
//!
//! A [`RequestBuilder`](crate::RequestBuilder) produces a [`TransportRequest`]
//! as plain data. A [`Transport`] sends it and hands back a
//! [`TransportResponse`] with the body already read as text. The default
//! transport is [`ReqwestTransport`]; tests and embedders can plug in their own.

use crate::{Error, Result};
use encoding_rs::Encoding;
use futures::future::{BoxFuture, FutureExt};
use http::{HeaderMap, Method, StatusCode};
use reqwest::cookie::Jar;
use std::sync::Arc;
use url::Url;

/// Character set used to encode a text payload.
///
/// Any encoding `encoding_rs` can write is accepted, looked up by its
/// WHATWG label. UTF-16 is written directly, since `encoding_rs` only
/// decodes it.
///
/// # Examples
///
/// ```
/// use restion::Charset;
///
/// let latin1 = Charset::for_label("latin1")?;
/// assert_eq!(latin1.label(), "windows-1252");
/// assert_eq!(latin1.encode("café")?, b"caf\xe9".to_vec());
/// assert_eq!(Charset::default().label(), "utf-8");
/// # Ok::<(), restion::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl Default for Charset {
    fn default() -> Self {
        Self::utf8()
    }
}

impl Charset {
    /// UTF-8, the default.
    pub fn utf8() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }

    /// UTF-16, little endian, no byte order mark.
    pub fn utf16le() -> Self {
        Self {
            encoding: encoding_rs::UTF_16LE,
        }
    }

    /// Looks up a charset by label, such as `"utf-8"`, `"iso-8859-1"` or
    /// `"shift_jis"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] for an unknown label, or for an
    /// encoding that can only be decoded.
    pub fn for_label(label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            Error::ConfigurationError(format!("Unknown charset label: {}", label))
        })?;

        if !is_utf16(encoding) && encoding.output_encoding() != encoding {
            return Err(Error::ConfigurationError(format!(
                "Charset {} cannot be used to encode",
                encoding.name()
            )));
        }

        Ok(Self { encoding })
    }

    /// The label written into the `Content-Type` charset parameter.
    pub fn label(&self) -> String {
        self.encoding.name().to_ascii_lowercase()
    }

    /// Encodes `text` into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `text` holds a character
    /// the charset cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        if self.encoding == encoding_rs::UTF_16LE {
            return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
        }
        if self.encoding == encoding_rs::UTF_16BE {
            return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
        }

        let (bytes, _, unmappable) = self.encoding.encode(text);
        if unmappable {
            return Err(Error::SerializationFailed(format!(
                "payload holds characters that cannot be encoded as {}",
                self.encoding.name()
            )));
        }

        Ok(bytes.into_owned())
    }
}

fn is_utf16(encoding: &'static Encoding) -> bool {
    encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE
}

/// The value of one multipart form field.
///
/// The variant decides how the part is written: raw bytes, a streamed body,
/// or a plain text field.
#[derive(Debug)]
pub enum FormValue {
    /// Binary content, sent as an octet part.
    Binary(Vec<u8>),
    /// Streamed content, such as an open file.
    Stream(reqwest::Body),
    /// Text content.
    Text(String),
}

impl From<Vec<u8>> for FormValue {
    fn from(bytes: Vec<u8>) -> Self {
        FormValue::Binary(bytes)
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        FormValue::Text(text)
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        FormValue::Text(text.to_string())
    }
}

/// The body of a [`TransportRequest`]. At most one encoding is ever present.
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No entity.
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` fields, in insertion order.
    FormUrlEncoded(Vec<(String, String)>),
    /// A serialized payload, already encoded with `charset`.
    Text {
        /// Encoded bytes.
        payload: Vec<u8>,
        /// MIME type, without parameters.
        media_type: String,
        /// Charset the payload was encoded with.
        charset: Charset,
    },
    /// `multipart/form-data` fields, in insertion order.
    Multipart(Vec<(String, FormValue)>),
}

impl RequestBody {
    /// Returns `true` if there is no entity.
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

/// A fully built request, ready for a [`Transport`].
#[derive(Debug)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute request URL, query string included.
    pub url: Url,
    /// Request headers, including `Content-Type`/`Content-Length` for text bodies.
    pub headers: HeaderMap,
    /// The request entity.
    pub body: RequestBody,
}

/// What a [`Transport`] hands back after a round-trip.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The full response body, read as text.
    pub body: String,
}

/// Sends built requests over the network.
///
/// # Examples
///
/// ```
/// use futures::future::{BoxFuture, FutureExt};
/// use http::{HeaderMap, StatusCode};
/// use restion::transport::{Transport, TransportRequest, TransportResponse};
///
/// struct Canned;
///
/// impl Transport for Canned {
///     fn send(&self, _request: TransportRequest) -> BoxFuture<'_, restion::Result<TransportResponse>> {
///         async move {
///             Ok(TransportResponse {
///                 status: StatusCode::OK,
///                 headers: HeaderMap::new(),
///                 body: "{}".to_string(),
///             })
///         }
///         .boxed()
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Sends `request` and reads the full reply body.
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse>>;
}

/// The default [`Transport`], backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport without a cookie store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Creates a transport that stores and replays cookies through `jar`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_cookie_jar(jar: Arc<Jar>) -> Result<Self> {
        Self::build(Some(jar))
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn from_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    pub(crate) fn build(jar: Option<Arc<Jar>>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(jar) = jar {
            builder = builder.cookie_provider(jar);
        }

        let http_client = builder.build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { http_client })
    }

    fn to_reqwest(&self, request: TransportRequest) -> reqwest::RequestBuilder {
        let builder = self
            .http_client
            .request(request.method, request.url)
            .headers(request.headers);

        match request.body {
            RequestBody::Empty => builder,
            RequestBody::FormUrlEncoded(fields) => builder.form(&fields),
            RequestBody::Text { payload, .. } => builder.body(payload),
            RequestBody::Multipart(fields) => {
                let mut form = reqwest::multipart::Form::new();
                for (name, value) in fields {
                    form = match value {
                        FormValue::Binary(bytes) => {
                            form.part(name, reqwest::multipart::Part::bytes(bytes))
                        }
                        FormValue::Stream(body) => {
                            form.part(name, reqwest::multipart::Part::stream(body))
                        }
                        FormValue::Text(text) => form.text(name, text),
                    };
                }
                builder.multipart(form)
            }
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse>> {
        let request = self.to_reqwest(request);
        async move {
            let response = request.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await?;

            Ok(TransportResponse {
                status,
                headers,
                body,
            })
        }
        .boxed()
    }
}
