//! Query string composition.
//!
//! Values are written exactly as given. Callers that need percent-escaping
//! must escape keys and values before adding them to a request.

/// Renders ordered key/value pairs as a `?k=v&k=v` suffix.
///
/// An empty slice renders as an empty string.
///
/// # Examples
///
/// ```
/// use restion::query::to_query_string;
///
/// let params = vec![
///     ("Name".to_string(), "123".to_string()),
///     ("DateOfBirth".to_string(), "2020-01-01".to_string()),
/// ];
///
/// assert_eq!(to_query_string(&params), "?Name=123&DateOfBirth=2020-01-01");
/// assert_eq!(to_query_string(&[]), "");
/// ```
pub fn to_query_string(params: &[(String, String)]) -> String {
    if params.is_empty() {
        return String::new();
    }

    let pairs: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();

    format!("?{}", pairs.join("&"))
}

/// Splits a query string produced by [`to_query_string`] back into pairs.
///
/// A leading `?` is optional. Segments without `=` yield an empty value.
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return Vec::new();
    }

    query
        .split('&')
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (segment.to_string(), String::new()),
        })
        .collect()
}
