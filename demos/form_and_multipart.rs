//! Example demonstrating form bodies, cookies and XML.
//!
//! This example shows how to:
//! - Send `application/x-www-form-urlencoded` fields
//! - Upload `multipart/form-data` with text and binary parts
//! - Carry cookies for a single request
//! - Swap the JSON codecs for XML
//!
//! Run with: `cargo run --example form_and_multipart`

use http::Method;
use reqwest::cookie::Jar;
use restion::codec::{XmlDeserializer, XmlSerializer};
use restion::{Client, Error, RequestBuilder};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct Note {
    title: String,
    pinned: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("restion=debug,form_and_multipart=info")
        .init();

    let client = Client::builder().base_url("https://httpbin.org")?.build()?;

    println!("=== Form URL-Encoded Example ===");
    let request = RequestBuilder::new("/post")
        .with_http_method(Method::POST)?
        .add_form_url("grant_type", "password")?
        .add_form_url("username", "john")?;
    let response = client.execute::<serde_json::Value, _>(request).await?;
    println!("Echoed form: {:?}", response.content.as_ref().map(|c| &c["form"]));
    println!();

    println!("=== Multipart Example ===");
    let request = RequestBuilder::new("/post")
        .with_http_method(Method::POST)?
        .add_form_data("description", "holiday photos")?
        .add_form_data("file", vec![0x89, 0x50, 0x4e, 0x47])?;
    let response = client.execute::<serde_json::Value, _>(request).await?;
    println!("Status: {:?}", response.status);
    println!("Echoed files: {:?}", response.content.as_ref().map(|c| &c["files"]));
    println!();

    println!("=== Per-Request Cookies ===");
    let jar = Arc::new(Jar::default());
    if let Ok(url) = "https://httpbin.org".parse() {
        jar.add_cookie_str("session=abc123", &url);
    }
    let request = RequestBuilder::new("/cookies").with_cookie_jar(jar)?;
    let response = client.execute::<serde_json::Value, _>(request).await?;
    println!("Server saw cookies: {:?}", response.content);
    println!();

    println!("=== XML Example ===");
    let xml_client = client
        .with_serializer(XmlSerializer::new().with_root_element("note"))
        .with_deserializer(XmlDeserializer::new());
    let note = Note {
        title: "Groceries".to_string(),
        pinned: true,
    };
    let request = RequestBuilder::new("/anything")
        .with_http_method(Method::PUT)?
        .with_content(note)?;
    // httpbin answers in JSON, so XML decoding is expected to fail here
    let response = xml_client.execute::<String, _>(request).await?;
    println!("Status: {:?}", response.status);
    if let Some(e) = &response.exception {
        println!("Captured: {}", e);
    }

    Ok(())
}
