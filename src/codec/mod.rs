//! Pluggable body codecs.
//!
//! A [`Serializer`] turns a request payload into text and names the media
//! type it produces. A [`Deserializer`] turns response text back into a typed
//! value. JSON and XML implementations are provided; the client and request
//! builder are agnostic to which pair is installed.

mod date;
mod json;
mod xml;

pub use json::{JsonDeserializer, JsonSerializer};
pub use xml::{XmlDeserializer, XmlSerializer};

use crate::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;

/// Media type produced by the JSON codec.
pub const APPLICATION_JSON: &str = "application/json";

/// Media type produced by the XML codec.
pub const APPLICATION_XML: &str = "application/xml";

/// Settings shared by every codec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecSettings {
    /// A `chrono` format string applied to dates, if set.
    pub date_format: Option<String>,
    /// Name of the outer element, for formats that have one.
    pub root_element: Option<String>,
}

/// Converts request payloads into text.
pub trait Serializer: Send + Sync {
    /// The canonical media type of the produced text.
    fn content_type(&self) -> &'static str;

    /// Serializes `value`.
    fn serialize<T>(&self, value: &T) -> impl Future<Output = Result<String>> + Send
    where
        T: Serialize + Sync + ?Sized;

    /// The codec's settings.
    fn settings(&self) -> &CodecSettings;

    /// Mutable access to the codec's settings.
    fn settings_mut(&mut self) -> &mut CodecSettings;

    /// The configured date format, if any.
    fn date_format(&self) -> Option<&str> {
        self.settings().date_format.as_deref()
    }

    /// Replaces the configured date format.
    fn set_date_format(&mut self, format: Option<String>) {
        self.settings_mut().date_format = format;
    }

    /// The configured root element, if any.
    fn root_element(&self) -> Option<&str> {
        self.settings().root_element.as_deref()
    }

    /// Replaces the configured root element.
    fn set_root_element(&mut self, root: Option<String>) {
        self.settings_mut().root_element = root;
    }
}

/// Converts response text into typed values.
///
/// Parse failures are returned as
/// [`Error::DeserializationFailed`](crate::Error::DeserializationFailed);
/// implementations never panic on malformed input.
pub trait Deserializer: Send + Sync {
    /// Deserializes `text` into `T`.
    fn deserialize<T>(&self, text: String) -> impl Future<Output = Result<T>> + Send
    where
        T: DeserializeOwned + Send + 'static;

    /// The codec's settings.
    fn settings(&self) -> &CodecSettings;

    /// Mutable access to the codec's settings.
    fn settings_mut(&mut self) -> &mut CodecSettings;

    /// The configured date format, if any.
    fn date_format(&self) -> Option<&str> {
        self.settings().date_format.as_deref()
    }

    /// Replaces the configured date format.
    fn set_date_format(&mut self, format: Option<String>) {
        self.settings_mut().date_format = format;
    }

    /// The configured root element, if any.
    fn root_element(&self) -> Option<&str> {
        self.settings().root_element.as_deref()
    }

    /// Replaces the configured root element.
    fn set_root_element(&mut self, root: Option<String>) {
        self.settings_mut().root_element = root;
    }
}
