//! Example demonstrating how failures are reported.
//!
//! This example shows how to:
//! - Tell usage errors apart from failures captured on the response
//! - Access raw response data on errors
//! - Inspect HTTP status codes and headers
//! - Deal with deserialization failures
//!
//! Run with: `cargo run --example error_handling`

use restion::{Client, ClientBuilder, ClientOptions, Error, RequestBuilder};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    id: u32,
    title: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("restion=info")
        .init();

    let client = Client::builder()
        .base_url("https://jsonplaceholder.typicode.com")?
        .options(ClientOptions::default().with_allow_raw_content(true))
        .build()?;

    println!("=== Example 1: Handling HTTP Errors ===");
    // A missing resource is reported on the response, not returned as Err
    let response = client.get::<Post>("/posts/999999").await?;
    println!("Status: {:?}", response.status);
    match response.exception {
        None => println!("Success: {:?}", response.content),
        Some(Error::HttpError {
            status,
            raw_response,
            headers,
        }) => {
            println!("HTTP Error!");
            println!("  Status code: {}", status.as_u16());
            println!("  Is client error (4xx): {}", status.is_client_error());
            println!("  Is server error (5xx): {}", status.is_server_error());
            println!("  Raw response: {}", raw_response);
            println!("  Content-Type: {:?}", headers.get("content-type"));
        }
        Some(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 2: Handling Deserialization Errors ===");
    // Define a struct that doesn't match the API response
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct WrongSchema {
        nonexistent_field: String,
    }

    let response = client.get::<WrongSchema>("/posts/1").await?;
    match &response.exception {
        Some(Error::DeserializationFailed {
            raw_response,
            serde_error,
        }) => {
            println!("Deserialization Failed!");
            println!("  Status: {:?}", response.status);
            println!("  Serde error: {}", serde_error);
            println!(
                "  Raw response (first 200 chars): {}",
                raw_response.chars().take(200).collect::<String>()
            );
        }
        other => println!("Unexpected outcome: {:?}", other),
    }
    println!();

    println!("=== Example 3: Handling Network Errors ===");
    let bad_client = Client::builder()
        .base_url("https://this-domain-does-not-exist-12345.com")?
        .build()?;

    let response = bad_client.get::<serde_json::Value>("/").await?;
    match response.exception {
        Some(Error::Network(e)) => {
            println!("Network Error!");
            println!("  Error: {}", e);
            println!("  Is connect error: {}", e.is_connect());
            println!("  Status recorded: {:?}", response.status);
        }
        other => println!("Unexpected outcome: {:?}", other),
    }
    println!();

    println!("=== Example 4: Usage Errors Fail Fast ===");
    match RequestBuilder::new("/posts").add_parameter("", "1") {
        Ok(_) => println!("Unexpected success"),
        Err(e) => println!("Rejected: {} (usage error: {})", e, e.is_usage_error()),
    }

    let codecless = ClientBuilder::without_codecs().build()?;
    match codecless.get::<Post>("https://jsonplaceholder.typicode.com/posts/1").await {
        Ok(_) => println!("Unexpected success"),
        Err(e) => println!("Rejected: {} (usage error: {})", e, e.is_usage_error()),
    }
    println!();

    println!("=== Example 5: Converting to a Result ===");
    match client.get::<Post>("/posts/999999").await?.into_result() {
        Ok(post) => println!("Post: {:?}", post),
        Err(e) => {
            println!("Error occurred: {}", e);
            if let Some(status) = e.status() {
                println!("  HTTP status: {}", status);
            }
            if let Some(raw) = e.raw_response() {
                println!("  Raw response available: {} bytes", raw.len());
            }
        }
    }

    Ok(())
}
