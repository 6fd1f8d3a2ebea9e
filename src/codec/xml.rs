use super::{CodecSettings, Deserializer, Serializer, APPLICATION_XML};
use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};

/// XML request serializer backed by `quick-xml`.
///
/// The outer element is the configured root element, or the type's own name
/// when none is set. Dates are written by the type's serde implementation;
/// the date format setting is kept for parity with the JSON codec.
#[derive(Debug, Clone, Default)]
pub struct XmlSerializer {
    settings: CodecSettings,
}

impl XmlSerializer {
    /// Creates a serializer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name of the outer element.
    pub fn with_root_element(mut self, root: impl Into<String>) -> Self {
        self.settings.root_element = Some(root.into());
        self
    }
}

impl Serializer for XmlSerializer {
    fn content_type(&self) -> &'static str {
        APPLICATION_XML
    }

    async fn serialize<T>(&self, value: &T) -> Result<String>
    where
        T: Serialize + Sync + ?Sized,
    {
        let written = match self.settings.root_element.as_deref() {
            Some(root) => quick_xml::se::to_string_with_root(root, value),
            None => quick_xml::se::to_string(value),
        };

        written.map_err(|e| Error::SerializationFailed(e.to_string()))
    }

    fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut CodecSettings {
        &mut self.settings
    }
}

/// XML response deserializer backed by `quick-xml`.
#[derive(Debug, Clone, Default)]
pub struct XmlDeserializer {
    settings: CodecSettings,
}

impl XmlDeserializer {
    /// Creates a deserializer with default settings.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deserializer for XmlDeserializer {
    async fn deserialize<T>(&self, text: String) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        tokio::task::spawn_blocking(move || {
            let parsed = quick_xml::de::from_str::<T>(&text);
            parsed.map_err(|e| Error::DeserializationFailed {
                serde_error: e.to_string(),
                raw_response: text,
            })
        })
        .await
        .map_err(|e| Error::DeserializationFailed {
            raw_response: String::new(),
            serde_error: format!("deserialization task failed: {e}"),
        })?
    }

    fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut CodecSettings {
        &mut self.settings
    }
}
