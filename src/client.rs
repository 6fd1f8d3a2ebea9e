//! HTTP client that executes request builders.
//!
//! The [`Client`] type is the main entry point for making HTTP requests.
//! Use [`ClientBuilder`] to configure and create clients.

use crate::{
    codec::{Deserializer, JsonDeserializer, JsonSerializer, Serializer},
    transport::{ReqwestTransport, Transport},
    ClientOptions, Error, RequestBuilder, Response, Result,
};
use http::{header::AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, Method};
use reqwest::cookie::Jar;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

#[derive(Clone)]
enum Binding {
    Reqwest(ReqwestTransport),
    Custom(Arc<dyn Transport>),
}

impl Binding {
    fn transport(&self) -> &dyn Transport {
        match self {
            Binding::Reqwest(transport) => transport,
            Binding::Custom(transport) => transport.as_ref(),
        }
    }
}

/// An HTTP client that executes [`RequestBuilder`]s.
///
/// The client holds the base URL, default headers, codecs and options that
/// apply to every request, and is meant to be reused across many calls.
/// Configuration setters take `&mut self`, so they cannot race requests that
/// are still in flight.
///
/// # Examples
///
/// ```no_run
/// use http::Method;
/// use restion::{Client, RequestBuilder, Response};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct CreateUser {
///     name: String,
///     email: String,
/// }
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
///     email: String,
/// }
///
/// # async fn example() -> Result<(), restion::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
///
/// // GET request
/// let user: Response<User> = client.get("/users/123").await?;
/// if let Some(user) = &user.content {
///     println!("User: {}", user.name);
/// }
///
/// // POST request through the builder
/// let request = RequestBuilder::new("/users")
///     .with_http_method(Method::POST)?
///     .with_content(CreateUser {
///         name: "Alice".to_string(),
///         email: "alice@example.com".to_string(),
///     })?;
/// let created: User = client.execute(request).await?.into_result()?;
/// println!("Created user with ID: {}", created.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client<S = JsonSerializer, D = JsonDeserializer> {
    base_url: Option<String>,
    default_headers: HeaderMap,
    serializer: Option<S>,
    deserializer: Option<D>,
    options: ClientOptions,
    cookie_jar: Option<Arc<Jar>>,
    binding: Binding,
}

impl Client {
    /// Creates a new `ClientBuilder` with the JSON codecs installed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use restion::Client;
    ///
    /// # async fn example() -> Result<(), restion::Error> {
    /// let client = Client::builder()
    ///     .base_url("https://api.example.com")?
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client with JSON codecs and no base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }
}

impl<S, D> Client<S, D> {
    /// The base URL prefixed to every request path.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Headers merged into every request.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// The client-wide options.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The installed serializer.
    pub fn serializer(&self) -> Option<&S> {
        self.serializer.as_ref()
    }

    /// The installed deserializer.
    pub fn deserializer(&self) -> Option<&D> {
        self.deserializer.as_ref()
    }

    /// Sets the base URL and rebinds the transport.
    ///
    /// The URL is used verbatim as the prefix of every request path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a blank URL and
    /// [`Error::InvalidUrl`] if it does not parse.
    pub fn set_base_address(&mut self, url: impl AsRef<str>) -> Result<&mut Self> {
        self.base_url = Some(validate_base_url(url.as_ref())?);
        self.rebind()?;
        Ok(self)
    }

    /// Adds a header merged into every request that does not set it itself.
    ///
    /// Adding the same default header twice keeps the later value.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is blank or invalid.
    pub fn add_default_header(
        &mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<&mut Self> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets a default `Authorization` header of the form `"<scheme> <value>"`,
    /// or just `value` when no scheme is given.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn example() -> restion::Result<()> {
    /// let mut client = restion::Client::new()?;
    /// client.set_authorization("sk-xxx", Some("Bearer"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn set_authorization(&mut self, value: &str, scheme: Option<&str>) -> Result<&mut Self> {
        let credentials = match scheme.filter(|scheme| !scheme.trim().is_empty()) {
            Some(scheme) => format!("{} {}", scheme, value),
            None => value.to_string(),
        };
        let (_, value) = parse_header(AUTHORIZATION.as_str(), &credentials)?;
        self.default_headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Stores cookies for every request in `jar`.
    ///
    /// This rebinds the client to a reqwest transport carrying the jar,
    /// replacing any custom transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn set_cookie_jar(&mut self, jar: Arc<Jar>) -> Result<&mut Self> {
        self.cookie_jar = Some(jar);
        self.binding = Binding::Reqwest(ReqwestTransport::build(self.cookie_jar.clone())?);
        Ok(self)
    }

    /// Sends every request through `transport`.
    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) -> &mut Self {
        self.binding = Binding::Custom(transport);
        self
    }

    fn rebind(&mut self) -> Result<()> {
        if let Binding::Reqwest(_) = self.binding {
            self.binding = Binding::Reqwest(ReqwestTransport::build(self.cookie_jar.clone())?);
        }
        Ok(())
    }
}

impl<S, D> Client<S, D>
where
    S: Serializer,
    D: Deserializer,
{
    /// Replaces the serializer; takes effect on the next request.
    pub fn set_serializer(&mut self, serializer: S) -> &mut Self {
        self.serializer = Some(serializer);
        self.apply_date_format();
        self
    }

    /// Replaces the deserializer; takes effect on the next request.
    pub fn set_deserializer(&mut self, deserializer: D) -> &mut Self {
        self.deserializer = Some(deserializer);
        self.apply_date_format();
        self
    }

    /// Swaps in a serializer of a different type.
    pub fn with_serializer<S2: Serializer>(self, serializer: S2) -> Client<S2, D> {
        let mut client = Client {
            base_url: self.base_url,
            default_headers: self.default_headers,
            serializer: Some(serializer),
            deserializer: self.deserializer,
            options: self.options,
            cookie_jar: self.cookie_jar,
            binding: self.binding,
        };
        client.apply_date_format();
        client
    }

    /// Swaps in a deserializer of a different type.
    pub fn with_deserializer<D2: Deserializer>(self, deserializer: D2) -> Client<S, D2> {
        let mut client = Client {
            base_url: self.base_url,
            default_headers: self.default_headers,
            serializer: self.serializer,
            deserializer: Some(deserializer),
            options: self.options,
            cookie_jar: self.cookie_jar,
            binding: self.binding,
        };
        client.apply_date_format();
        client
    }

    /// Replaces the client options. A non-blank date format is pushed into
    /// both codecs.
    pub fn set_client_options(&mut self, options: ClientOptions) -> &mut Self {
        self.options = options;
        self.apply_date_format();
        self
    }

    fn apply_date_format(&mut self) {
        let Some(format) = self.options.effective_date_format().map(str::to_string) else {
            return;
        };

        if let Some(serializer) = self.serializer.as_mut() {
            serializer.set_date_format(Some(format.clone()));
        }
        if let Some(deserializer) = self.deserializer.as_mut() {
            deserializer.set_date_format(Some(format));
        }
    }

    /// Executes `request` and decodes the reply into `T`.
    ///
    /// The base URL and default headers are merged into the request, the
    /// request is built and sent, and the body is decoded with the installed
    /// deserializer. The builder is disposed afterwards.
    ///
    /// # Errors
    ///
    /// Only usage errors are returned directly: a missing serializer or
    /// deserializer, or a builder that was already disposed. Everything that
    /// fails once the request is underway (building, network, status,
    /// decoding) is captured on [`Response::exception`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use restion::{Client, RequestBuilder};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Customer { name: String }
    ///
    /// # async fn example() -> Result<(), restion::Error> {
    /// let client = Client::builder()
    ///     .base_url("http://localhost/api")?
    ///     .build()?;
    ///
    /// let request = RequestBuilder::new("/Customer/")
    ///     .add_parameter("Name", "123")?
    ///     .add_parameter("DateOfBirth", "2020-01-01")?;
    ///
    /// let response = client.execute::<Customer, _>(request).await?;
    /// match response.exception {
    ///     Some(e) => eprintln!("Request failed: {}", e),
    ///     None => println!("Customer: {:?}", response.content.map(|c| c.name)),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<T, C>(&self, mut request: RequestBuilder<C>) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send + 'static,
        C: Serialize + Send + Sync,
    {
        if request.is_disposed() {
            return Err(Error::RequestDisposed);
        }
        let serializer = self.serializer.as_ref().ok_or(Error::MissingSerializer)?;
        let deserializer = self.deserializer.as_ref().ok_or(Error::MissingDeserializer)?;

        let start_time = Instant::now();
        let mut response = Response::pending();

        if let Err(e) = self
            .dispatch(&mut request, serializer, deserializer, &mut response, start_time)
            .await
        {
            tracing::warn!(
                error = %e,
                method = %request.method(),
                path = %request.path(),
                "Request failed"
            );
            response.exception = Some(e);
        }

        response.latency = start_time.elapsed();
        request.dispose();
        Ok(response)
    }

    /// Runs one request, filling `response` as far as it gets.
    async fn dispatch<T, C>(
        &self,
        request: &mut RequestBuilder<C>,
        serializer: &S,
        deserializer: &D,
        response: &mut Response<T>,
        start_time: Instant,
    ) -> Result<()>
    where
        T: DeserializeOwned + Send + 'static,
        C: Serialize + Send + Sync,
    {
        request.set_base_url(self.base_url.as_deref());
        request.merge_default_headers(&self.default_headers);

        let transport_request = request.build_request(Some(serializer)).await?;

        // A per-request cookie jar gets its own transport for this call only.
        let scoped;
        let transport: &dyn Transport = match (&self.binding, request.take_cookie_jar()) {
            (Binding::Reqwest(_), Some(jar)) => {
                scoped = ReqwestTransport::with_cookie_jar(jar)?;
                &scoped
            }
            (Binding::Custom(transport), Some(_)) => {
                tracing::warn!("Per-request cookie jar ignored because a custom transport is set");
                transport.as_ref()
            }
            (binding, None) => binding.transport(),
        };

        tracing::debug!(
            method = %transport_request.method,
            url = %transport_request.url,
            "Executing HTTP request"
        );

        let reply = transport.send(transport_request).await?;
        let status = reply.status;
        response.status = Some(status);
        response.headers = reply.headers;

        tracing::info!(
            status = status.as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "Received HTTP response"
        );

        if self.options.allow_raw_content {
            response.raw_content = Some(reply.body.clone());
        }

        if !status.is_success() {
            if status.is_client_error() {
                tracing::error!(
                    status = status.as_u16(),
                    response = %reply.body,
                    "Client error (4xx)"
                );
            } else if status.is_server_error() {
                tracing::warn!(
                    status = status.as_u16(),
                    response = %reply.body,
                    "Server error (5xx)"
                );
            }

            return Err(Error::HttpError {
                status,
                raw_response: reply.body,
                headers: response.headers.clone(),
            });
        }

        match deserializer.deserialize::<T>(reply.body).await {
            Ok(content) => {
                response.content = Some(content);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to deserialize response");
                Err(e)
            }
        }
    }

    /// Makes a GET request to the specified path.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use restion::Client;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct User { name: String }
    ///
    /// # async fn example() -> Result<(), restion::Error> {
    /// let client = Client::builder()
    ///     .base_url("https://api.example.com")?
    ///     .build()?;
    ///
    /// let user: restion::Response<User> = client.get("/users/123").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<T>(&self, path: impl Into<String>) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.execute(RequestBuilder::new(path)).await
    }

    /// Makes a POST request to the specified path with a serialized body.
    pub async fn post<B, T>(&self, path: impl Into<String>, body: &B) -> Result<Response<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        self.send_with_body(Method::POST, path, body).await
    }

    /// Makes a PUT request to the specified path with a serialized body.
    pub async fn put<B, T>(&self, path: impl Into<String>, body: &B) -> Result<Response<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        self.send_with_body(Method::PUT, path, body).await
    }

    /// Makes a PATCH request to the specified path with a serialized body.
    pub async fn patch<B, T>(&self, path: impl Into<String>, body: &B) -> Result<Response<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        self.send_with_body(Method::PATCH, path, body).await
    }

    /// Makes a DELETE request to the specified path.
    pub async fn delete<T>(&self, path: impl Into<String>) -> Result<Response<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let request = RequestBuilder::new(path).with_http_method(Method::DELETE)?;
        self.execute(request).await
    }

    async fn send_with_body<B, T>(
        &self,
        method: Method,
        path: impl Into<String>,
        body: &B,
    ) -> Result<Response<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send + 'static,
    {
        let request = RequestBuilder::new(path)
            .with_http_method(method)?
            .with_content(body)?;
        self.execute(request).await
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use restion::{ClientBuilder, ClientOptions};
/// use restion::codec::{XmlDeserializer, XmlSerializer};
///
/// # async fn example() -> Result<(), restion::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com")?
///     .default_header("User-Agent", "my-app/1.0")?
///     .serializer(XmlSerializer::new().with_root_element("request"))
///     .deserializer(XmlDeserializer::new())
///     .options(ClientOptions::default().with_allow_raw_content(true))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder<S = JsonSerializer, D = JsonDeserializer> {
    base_url: Option<String>,
    default_headers: HeaderMap,
    serializer: Option<S>,
    deserializer: Option<D>,
    options: ClientOptions,
    cookie_jar: Option<Arc<Jar>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a `ClientBuilder` with the JSON codecs installed.
    pub fn new() -> Self {
        Self {
            serializer: Some(JsonSerializer::new()),
            deserializer: Some(JsonDeserializer::new()),
            ..Self::without_codecs()
        }
    }

    /// Creates a `ClientBuilder` with no codecs installed.
    ///
    /// A serializer and deserializer must be supplied before the built
    /// client can execute requests.
    pub fn without_codecs() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            serializer: None,
            deserializer: None,
            options: ClientOptions::default(),
            cookie_jar: None,
            transport: None,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, D> ClientBuilder<S, D> {
    /// Sets the base URL for all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is blank or invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(validate_base_url(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is blank or invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = parse_header(name.as_ref(), value.as_ref())?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the serializer.
    pub fn serializer<S2>(self, serializer: S2) -> ClientBuilder<S2, D> {
        ClientBuilder {
            base_url: self.base_url,
            default_headers: self.default_headers,
            serializer: Some(serializer),
            deserializer: self.deserializer,
            options: self.options,
            cookie_jar: self.cookie_jar,
            transport: self.transport,
        }
    }

    /// Sets the deserializer.
    pub fn deserializer<D2>(self, deserializer: D2) -> ClientBuilder<S, D2> {
        ClientBuilder {
            base_url: self.base_url,
            default_headers: self.default_headers,
            serializer: self.serializer,
            deserializer: Some(deserializer),
            options: self.options,
            cookie_jar: self.cookie_jar,
            transport: self.transport,
        }
    }

    /// Sets the client options.
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Stores cookies for every request in `jar`.
    ///
    /// Ignored when a custom transport is set.
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Sends every request through `transport` instead of reqwest.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl<S, D> ClientBuilder<S, D>
where
    S: Serializer,
    D: Deserializer,
{
    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<Client<S, D>> {
        let binding = match self.transport {
            Some(transport) => {
                if self.cookie_jar.is_some() {
                    tracing::warn!("Cookie jar ignored because a custom transport is set");
                }
                Binding::Custom(transport)
            }
            None => Binding::Reqwest(ReqwestTransport::build(self.cookie_jar.clone())?),
        };

        let mut client = Client {
            base_url: self.base_url,
            default_headers: self.default_headers,
            serializer: self.serializer,
            deserializer: self.deserializer,
            options: self.options,
            cookie_jar: self.cookie_jar,
            binding,
        };
        client.apply_date_format();
        Ok(client)
    }
}

fn validate_base_url(url: &str) -> Result<String> {
    if url.trim().is_empty() {
        return Err(Error::invalid_argument("base address"));
    }
    Url::parse(url)?;
    Ok(url.to_string())
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    if name.trim().is_empty() {
        return Err(Error::invalid_argument("header key"));
    }
    if value.trim().is_empty() {
        return Err(Error::invalid_argument("header value"));
    }

    let name = HeaderName::try_from(name)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
    let value = HeaderValue::try_from(value)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
    Ok((name, value))
}
