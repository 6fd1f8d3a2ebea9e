//! Integration tests using wiremock to simulate HTTP servers.

use chrono::NaiveDate;
use futures::future::{BoxFuture, FutureExt};
use http::{HeaderMap, Method, StatusCode};
use reqwest::cookie::Jar;
use restion::codec::{XmlDeserializer, XmlSerializer};
use restion::transport::{RequestBody, Transport, TransportRequest, TransportResponse};
use restion::{Client, ClientBuilder, ClientOptions, Error, FormValue, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestData {
    id: u32,
    name: String,
}

fn test_data() -> TestData {
    TestData {
        id: 1,
        name: "Test".to_string(),
    }
}

fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.uri())
        .unwrap()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_successful_get_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let response = client
        .execute::<TestData, _>(RequestBuilder::new("/test"))
        .await
        .unwrap();

    assert!(response.exception.is_none());
    assert_eq!(response.content, Some(test_data()));
    assert_eq!(response.status, Some(StatusCode::OK));
    assert!(response.raw_content.is_none());
    assert!(response.is_success());
}

#[tokio::test]
async fn test_raw_content_kept_only_when_allowed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1,"name":"Test"}"#))
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);

    let response = client.get::<TestData>("/test").await.unwrap();
    assert!(response.raw_content.is_none());

    client.set_client_options(ClientOptions::default().with_allow_raw_content(true));
    let response = client.get::<TestData>("/test").await.unwrap();
    assert_eq!(response.raw_content.as_deref(), Some(r#"{"id":1,"name":"Test"}"#));
    assert_eq!(response.content, Some(test_data()));
}

#[tokio::test]
async fn test_successful_post_request() {
    let mock_server = MockServer::start().await;

    let request_data = TestData {
        id: 0,
        name: "New".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/test"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(body_string(r#"{"id":0,"name":"New"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let response = client
        .post::<TestData, TestData>("/test", &request_data)
        .await
        .unwrap();

    assert_eq!(response.status, Some(StatusCode::CREATED));
    assert_eq!(response.into_result().unwrap(), test_data());
}

#[tokio::test]
async fn test_http_error_is_captured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let response = client.get::<TestData>("/test").await.unwrap();

    assert!(response.content.is_none());
    assert_eq!(response.status, Some(StatusCode::NOT_FOUND));
    match response.exception {
        Some(Error::HttpError {
            status,
            raw_response,
            ..
        }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(raw_response, "Not found");
        }
        other => panic!("Expected HttpError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_keeps_raw_content_when_allowed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .options(ClientOptions::default().with_allow_raw_content(true))
        .build()
        .unwrap();

    let response = client.get::<TestData>("/test").await.unwrap();

    assert_eq!(response.raw_content.as_deref(), Some("Server error"));
    assert_eq!(
        response.exception.as_ref().and_then(Error::status),
        Some(StatusCode::INTERNAL_SERVER_ERROR)
    );
}

#[tokio::test]
async fn test_deserialization_error_is_captured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let response = client.get::<TestData>("/test").await.unwrap();

    assert_eq!(response.status, Some(StatusCode::OK));
    assert!(response.content.is_none());
    match response.exception {
        Some(Error::DeserializationFailed {
            raw_response,
            serde_error,
        }) => {
            assert_eq!(raw_response, "invalid json");
            assert!(serde_error.contains("expected"));
        }
        other => panic!("Expected DeserializationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_network_failure_is_captured() {
    // Nothing listens on port 1.
    let client = Client::builder()
        .base_url("http://127.0.0.1:1")
        .unwrap()
        .build()
        .unwrap();

    let response = client.get::<TestData>("/test").await.unwrap();

    assert!(matches!(response.exception, Some(Error::Network(_))));
    assert!(response.status.is_none());
    assert!(response.content.is_none());
}

#[tokio::test]
async fn test_query_parameters_follow_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Customer/"))
        .and(query_param("Name", "123"))
        .and(query_param("DateOfBirth", "2020-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(format!("{}/api", mock_server.uri()))
        .unwrap()
        .build()
        .unwrap();

    let request = RequestBuilder::new("/Customer/")
        .add_parameter("Name", "123")
        .unwrap()
        .add_parameter("DateOfBirth", "2020-01-01")
        .unwrap();

    let response = client.execute::<TestData, _>(request).await.unwrap();
    assert_eq!(response.content, Some(test_data()));
}

#[tokio::test]
async fn test_request_headers_win_over_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .and(header("x-client", "mine"))
        .and(header("user-agent", "test-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .default_header("User-Agent", "test-agent")
        .unwrap()
        .default_header("X-Client", "default")
        .unwrap()
        .build()
        .unwrap();

    let request = RequestBuilder::new("/test")
        .add_header("X-Client", "mine")
        .unwrap();

    let response = client.execute::<TestData, _>(request).await.unwrap();
    assert!(response.exception.is_none());
}

#[tokio::test]
async fn test_delete_sends_configured_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/test/1"))
        .and(body_string(r#"{"id":1,"name":"Test"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let request = RequestBuilder::new("/test/1")
        .with_http_method(Method::DELETE)
        .unwrap()
        .with_content(test_data())
        .unwrap();

    let response = client.execute::<TestData, _>(request).await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn test_form_url_encoded_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("grant_type=password&user=john"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let request = RequestBuilder::new("/token")
        .with_http_method(Method::POST)
        .unwrap()
        .add_form_url("grant_type", "password")
        .unwrap()
        .add_form_url("user", "john")
        .unwrap();

    let response = client.execute::<TestData, _>(request).await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn test_multipart_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("name=\"description\""))
        .and(body_string_contains("holiday"))
        .and(body_string_contains("name=\"file\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let request = RequestBuilder::new("/upload")
        .with_http_method(Method::POST)
        .unwrap()
        .add_form_data("description", "holiday")
        .unwrap()
        .add_form_data("file", b"raw-bytes".to_vec())
        .unwrap()
        .add_form_data("notes", FormValue::Stream(reqwest::Body::from("streamed")))
        .unwrap();

    let response = client.execute::<TestData, _>(request).await.unwrap();
    assert!(response.is_success(), "{:?}", response.exception);
}

#[tokio::test]
async fn test_xml_codecs() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/data"))
        .and(header("content-type", "application/xml; charset=utf-8"))
        .and(body_string("<data><id>1</id><name>Test</name></data>"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<TestData><id>2</id><name>Stored</name></TestData>"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(mock_server.uri())
        .unwrap()
        .serializer(XmlSerializer::new().with_root_element("data"))
        .deserializer(XmlDeserializer::new())
        .build()
        .unwrap();

    let response = client.put::<_, TestData>("/data", &test_data()).await.unwrap();

    assert_eq!(
        response.into_result().unwrap(),
        TestData {
            id: 2,
            name: "Stored".to_string(),
        }
    );
}

#[tokio::test]
async fn test_per_request_cookie_jar() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let jar = Arc::new(Jar::default());
    let url = mock_server.uri().parse().unwrap();
    jar.add_cookie_str("session=abc", &url);

    let request = RequestBuilder::new("/me").with_cookie_jar(jar).unwrap();
    let response = client.execute::<TestData, _>(request).await.unwrap();
    assert!(response.is_success(), "{:?}", response.exception);
}

#[tokio::test]
async fn test_client_cookie_jar_replays_cookies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=xyz; Path=/")
                .set_body_json(test_data()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("cookie", "session=xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut client = client_for(&mock_server);
    client.set_cookie_jar(Arc::new(Jar::default())).unwrap();

    assert!(client.get::<TestData>("/login").await.unwrap().is_success());
    assert!(client.get::<TestData>("/me").await.unwrap().is_success());
}

#[tokio::test]
async fn test_verbs_use_matching_methods() {
    let mock_server = MockServer::start().await;

    for verb in ["GET", "POST", "PUT", "PATCH", "DELETE"] {
        Mock::given(method(verb))
            .and(path("/test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(test_data()))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = client_for(&mock_server);
    let body = test_data();

    assert!(client.get::<TestData>("/test").await.unwrap().is_success());
    assert!(client.post::<_, TestData>("/test", &body).await.unwrap().is_success());
    assert!(client.put::<_, TestData>("/test", &body).await.unwrap().is_success());
    assert!(client.patch::<_, TestData>("/test", &body).await.unwrap().is_success());
    assert!(client.delete::<TestData>("/test").await.unwrap().is_success());
}

/// What a [`RecordingTransport`] saw.
#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    url: String,
    headers: HeaderMap,
    payload: Option<Vec<u8>>,
}

/// A transport that records requests and replies with a canned body.
struct RecordingTransport {
    seen: Mutex<Vec<Recorded>>,
    reply: String,
}

impl RecordingTransport {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            reply: reply.to_string(),
        })
    }

    fn last(&self) -> Recorded {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, restion::Result<TransportResponse>> {
        let payload = match request.body {
            RequestBody::Empty => None,
            RequestBody::Text { payload, .. } => Some(payload),
            other => Some(format!("{:?}", other).into_bytes()),
        };
        self.seen.lock().unwrap().push(Recorded {
            method: request.method,
            url: request.url.to_string(),
            headers: request.headers,
            payload,
        });

        async move {
            Ok(TransportResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: self.reply.clone(),
            })
        }
        .boxed()
    }
}

struct OfflineTransport;

impl Transport for OfflineTransport {
    fn send(&self, _request: TransportRequest) -> BoxFuture<'_, restion::Result<TransportResponse>> {
        async move { Err(Error::Transport("offline".into())) }.boxed()
    }
}

#[tokio::test]
async fn test_get_never_carries_body_through_transport() {
    let transport = RecordingTransport::new(r#"{"id":1,"name":"Test"}"#);
    let client = Client::builder()
        .base_url("http://h/api")
        .unwrap()
        .transport(transport.clone())
        .build()
        .unwrap();

    let request = RequestBuilder::new("/test").with_content(test_data()).unwrap();
    let response = client.execute::<TestData, _>(request).await.unwrap();

    assert!(response.is_success());
    let seen = transport.last();
    assert_eq!(seen.method, Method::GET);
    assert_eq!(seen.url, "http://h/api/test");
    assert!(seen.payload.is_none());
    assert!(!seen.headers.contains_key("content-type"));
}

#[tokio::test]
async fn test_date_format_applies_to_both_directions() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Customer {
        name: String,
        reference: String,
        date_of_birth: NaiveDate,
    }

    let transport = RecordingTransport::new(
        r#"{"name":"John","reference":"2020-01-01","date_of_birth":"22/07/1985"}"#,
    );
    let client = Client::builder()
        .base_url("http://h/api")
        .unwrap()
        .options(ClientOptions::default().with_date_format("%d/%m/%Y"))
        .transport(transport.clone())
        .build()
        .unwrap();

    let john = Customer {
        name: "John".to_string(),
        reference: "2020-01-01".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1985, 7, 22).unwrap(),
    };
    let response = client.post::<_, Customer>("/Customer/", &john).await.unwrap();

    assert_eq!(response.into_result().unwrap(), john);
    assert_eq!(
        transport.last().payload.unwrap(),
        br#"{"name":"John","reference":"2020-01-01","date_of_birth":"22/07/1985"}"#.to_vec()
    );
}

#[tokio::test]
async fn test_per_request_cookie_jar_keeps_custom_transport() {
    let transport = RecordingTransport::new(r#"{"id":1,"name":"Test"}"#);
    let client = Client::builder()
        .base_url("http://h/api")
        .unwrap()
        .transport(transport.clone())
        .build()
        .unwrap();

    let jar = Arc::new(Jar::default());
    jar.add_cookie_str("session=abc", &"http://h".parse().unwrap());

    let request = RequestBuilder::new("/me").with_cookie_jar(jar).unwrap();
    let response = client.execute::<TestData, _>(request).await.unwrap();

    assert!(response.is_success(), "{:?}", response.exception);
    assert_eq!(transport.last().url, "http://h/api/me");
}

#[tokio::test]
async fn test_transport_failure_is_captured() {
    let client = Client::builder()
        .base_url("http://h/api")
        .unwrap()
        .transport(Arc::new(OfflineTransport))
        .build()
        .unwrap();

    let response = client.get::<TestData>("/test").await.unwrap();

    match response.exception {
        Some(Error::Transport(e)) => assert_eq!(e.to_string(), "offline"),
        other => panic!("Expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_serializer_fails_fast() {
    let client = ClientBuilder::without_codecs()
        .deserializer(restion::codec::JsonDeserializer::new())
        .transport(RecordingTransport::new("{}"))
        .build()
        .unwrap();

    let result = client
        .execute::<TestData, _>(RequestBuilder::new("http://h/test"))
        .await;

    match result {
        Err(e) => {
            assert!(matches!(e, Error::MissingSerializer));
            assert!(e.is_usage_error());
        }
        Ok(response) => panic!("Expected fail-fast error, got {:?}", response),
    }
}
