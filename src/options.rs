//! Client-wide options shared by every request.

use serde::{Deserialize, Serialize};

/// Options applied to every request a [`Client`](crate::Client) executes.
///
/// The type deserializes with missing fields defaulted, so it can be read
/// straight out of an application's config file.
///
/// # Examples
///
/// ```
/// use restion::ClientOptions;
///
/// let options = ClientOptions::default()
///     .with_allow_raw_content(true)
///     .with_date_format("%d/%m/%Y");
///
/// let parsed: ClientOptions =
///     serde_json::from_str(r#"{ "allow_raw_content": true, "date_format": "%d/%m/%Y" }"#).unwrap();
/// assert_eq!(parsed, options);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Keep the raw response body on [`Response::raw_content`](crate::Response::raw_content).
    pub allow_raw_content: bool,

    /// Date format pushed into the installed serializer and deserializer.
    pub date_format: Option<String>,
}

impl ClientOptions {
    /// Sets whether raw response bodies are kept.
    pub fn with_allow_raw_content(mut self, allow: bool) -> Self {
        self.allow_raw_content = allow;
        self
    }

    /// Sets the date format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// The date format, if set to something other than whitespace.
    pub(crate) fn effective_date_format(&self) -> Option<&str> {
        self.date_format
            .as_deref()
            .filter(|format| !format.trim().is_empty())
    }
}
