//! Basic example demonstrating simple GET and POST requests.
//!
//! This example shows how to:
//! - Create a client with a base URL and default headers
//! - Build a request with query parameters
//! - Send JSON content with a POST request
//! - Access response data and metadata
//!
//! Run with: `cargo run --example basic_call`

use http::Method;
use restion::{Client, ClientOptions, Error, RequestBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("restion=debug,basic_call=info")
        .init();

    // Create a client for the JSONPlaceholder API
    let client = Client::builder()
        .base_url("https://jsonplaceholder.typicode.com")?
        .default_header("User-Agent", "restion-demo/0.1")?
        .options(ClientOptions::default().with_allow_raw_content(true))
        .build()?;

    println!("=== GET Request Example ===");
    let request = RequestBuilder::new("/posts").add_parameter("id", "1")?;
    let response = client.execute::<Vec<Post>, _>(request).await?;

    match (&response.content, &response.exception) {
        (_, Some(e)) => println!("Request failed: {}", e),
        (Some(posts), None) => {
            for post in posts {
                println!("Post ID: {}", post.id);
                println!("Title: {}", post.title);
            }
        }
        (None, None) => println!("No content"),
    }
    println!("Request latency: {:?}", response.latency);
    println!("Status code: {:?}", response.status);
    println!();

    println!("=== POST Request Example ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };

    let request = RequestBuilder::new("/posts")
        .with_http_method(Method::POST)?
        .with_content(new_post)?;
    let response = client.execute::<Post, _>(request).await?;

    println!("Request latency: {:?}", response.latency);
    println!("Content-Type: {:?}", response.header("content-type"));
    println!(
        "Raw response length: {} bytes",
        response.raw_content.as_ref().map_or(0, String::len)
    );

    let created = response.into_result()?;
    println!("Created post ID: {}", created.id);
    println!("Title: {}", created.title);

    Ok(())
}
