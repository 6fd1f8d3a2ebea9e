use super::{date, CodecSettings, Deserializer, Serializer, APPLICATION_JSON};
use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};

/// JSON request serializer backed by `serde_json`.
///
/// With a date format set, `chrono` dates and date-times in the payload are
/// written in that format. Plain strings are sent as they are, even when
/// they look like dates.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use restion::codec::{JsonSerializer, Serializer};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Person {
///     born: NaiveDate,
///     note: String,
/// }
///
/// # async fn example() -> restion::Result<()> {
/// let serializer = JsonSerializer::new().with_date_format("%d/%m/%Y");
/// let person = Person {
///     born: NaiveDate::from_ymd_opt(1985, 7, 22).unwrap(),
///     note: "1985-07-22".to_string(),
/// };
/// let text = serializer.serialize(&person).await?;
/// assert_eq!(text, r#"{"born":"22/07/1985","note":"1985-07-22"}"#);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    settings: CodecSettings,
}

impl JsonSerializer {
    /// Creates a serializer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the date format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.settings.date_format = Some(format.into());
        self
    }
}

impl Serializer for JsonSerializer {
    fn content_type(&self) -> &'static str {
        APPLICATION_JSON
    }

    async fn serialize<T>(&self, value: &T) -> Result<String>
    where
        T: Serialize + Sync + ?Sized,
    {
        let failed = |e: serde_json::Error| Error::SerializationFailed(e.to_string());

        match self.settings.date_format.as_deref() {
            Some(format) => {
                let mut buffer = Vec::new();
                let mut json = serde_json::Serializer::new(&mut buffer);
                value
                    .serialize(date::DateSerializer::new(&mut json, format))
                    .map_err(failed)?;
                String::from_utf8(buffer).map_err(|e| Error::SerializationFailed(e.to_string()))
            }
            None => serde_json::to_string(value).map_err(failed),
        }
    }

    fn settings(&self) -> &CodecSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut CodecSettings {
        &mut self.settings
    }
}

/// JSON response deserializer backed by `serde_json`.
///
/// An empty or whitespace-only body is read as JSON `null`. Parsing runs on
/// the blocking pool so large bodies do not stall the async workers.
#[derive(Debug, Clone, Default)]
pub struct JsonDeserializer {
    settings: CodecSettings,
}

impl JsonDeserializer {
    /// Creates a deserializer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the date format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.settings.date_format = Some(format.into());
        self
    }
}

impl Deserializer for JsonDeserializer {
    async fn deserialize<T>(&self, text: String) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let date_format = self.settings.date_format.clone();

        tokio::task::spawn_blocking(move || parse_json(text, date_format.as_deref()))
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

fn parse_json<T: DeserializeOwned>(text: String, date_format: Option<&str>) -> Result<T> {
    let source = if text.trim().is_empty() { "null" } else { text.as_str() };

    let parsed = match date_format {
        Some(format) => serde_json::from_str::<serde_json::Value>(source).and_then(|mut tree| {
            date::normalize_dates(&mut tree, format);
            serde_json::from_value::<T>(tree)
        }),
        None => serde_json::from_str::<T>(source),
    };

    parsed.map_err(|e| Error::DeserializationFailed {
        serde_error: e.to_string(),
        raw_response: text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Customer {
        name: String,
        date_of_birth: NaiveDate,
    }

    fn john() -> Customer {
        Customer {
            name: "John".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 7, 22).unwrap(),
        }
    }

    #[tokio::test]
    async fn serializes_without_date_format() {
        let text = JsonSerializer::new().serialize(&john()).await.unwrap();
        assert_eq!(text, r#"{"name":"John","date_of_birth":"1985-07-22"}"#);
    }

    #[tokio::test]
    async fn date_format_round_trips_through_both_halves() {
        let text = JsonSerializer::new()
            .with_date_format("%d/%m/%Y")
            .serialize(&john())
            .await
            .unwrap();
        assert_eq!(text, r#"{"name":"John","date_of_birth":"22/07/1985"}"#);

        let customer: Customer = JsonDeserializer::new()
            .with_date_format("%d/%m/%Y")
            .deserialize(text)
            .await
            .unwrap();
        assert_eq!(customer, john());
    }

    #[tokio::test]
    async fn date_format_skips_strings_that_look_like_dates() {
        #[derive(Serialize)]
        struct Order {
            reference: String,
            placed_at: DateTime<Utc>,
        }

        let order = Order {
            reference: "2020-01-01".to_string(),
            placed_at: Utc.with_ymd_and_hms(2021, 5, 6, 7, 8, 9).unwrap(),
        };

        let text = JsonSerializer::new()
            .with_date_format("%d/%m/%Y")
            .serialize(&order)
            .await
            .unwrap();
        assert_eq!(text, r#"{"reference":"2020-01-01","placed_at":"06/05/2021"}"#);
    }

    #[tokio::test]
    async fn offset_aware_dates_round_trip() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Shipment {
            sent_at: DateTime<Utc>,
            received_at: DateTime<FixedOffset>,
        }

        let shipment = Shipment {
            sent_at: Utc.with_ymd_and_hms(2021, 5, 6, 7, 8, 9).unwrap(),
            received_at: FixedOffset::east_opt(2 * 3600)
                .unwrap()
                .with_ymd_and_hms(2021, 5, 7, 10, 0, 0)
                .unwrap(),
        };

        for format in ["%Y-%m-%dT%H:%M:%S%:z", "%d/%m/%Y %H:%M:%S %z"] {
            let text = JsonSerializer::new()
                .with_date_format(format)
                .serialize(&shipment)
                .await
                .unwrap();

            let parsed: Shipment = JsonDeserializer::new()
                .with_date_format(format)
                .deserialize(text)
                .await
                .unwrap();
            assert_eq!(parsed, shipment);
        }
    }

    #[tokio::test]
    async fn malformed_payload_keeps_raw_text() {
        let result = JsonDeserializer::new()
            .deserialize::<Customer>("invalid json".to_string())
            .await;

        match result {
            Err(Error::DeserializationFailed {
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
    async fn empty_body_reads_as_null() {
        JsonDeserializer::new()
            .deserialize::<()>(String::new())
            .await
            .unwrap();

        let missing: Option<Customer> = JsonDeserializer::new()
            .deserialize("  ".to_string())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn settings_are_mutable_through_the_trait() {
        let mut serializer = JsonSerializer::new();
        Serializer::set_date_format(&mut serializer, Some("%Y".to_string()));
        Serializer::set_root_element(&mut serializer, Some("root".to_string()));
        assert_eq!(Serializer::date_format(&serializer), Some("%Y"));
        assert_eq!(Serializer::root_element(&serializer), Some("root"));
        assert_eq!(serializer.content_type(), "application/json");
    }
}
