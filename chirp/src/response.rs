use serde::Deserialize;

use crate::tweet::RawTweet;

/// Success envelope of the search endpoint. The timeline endpoint returns a
/// bare array instead, so it has no envelope type.
#[derive(Deserialize, Debug)]
pub(crate) struct SearchResponse {
    pub statuses: Vec<RawTweet>,
}

/// Failure payload. Older endpoints use a singular `error` string, newer
/// ones a list of `{code, message}` objects.
#[derive(Deserialize, Default, Debug)]
pub(crate) struct ErrorPayload {
    error: Option<Box<str>>,
    #[serde(default)]
    errors: Box<[ErrorEntry]>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ErrorEntry {
    message: Option<Box<str>>,
}

impl ErrorPayload {
    const UNKNOWN: &'static str = "unknown provider error";

    /// Best-effort extraction of a human-readable message from a failure
    /// body. Proxies in front of the provider can answer a bare 502/503 with
    /// HTML, so an unparseable body falls back to a generic message instead
    /// of failing.
    pub(crate) fn extract_message(body: &[u8]) -> Box<str> {
        serde_json::from_slice::<ErrorPayload>(body)
            .ok()
            .and_then(ErrorPayload::into_message)
            .unwrap_or_else(|| Self::UNKNOWN.into())
    }

    fn into_message(self) -> Option<Box<str>> {
        if let Some(message) = self.error {
            return Some(message);
        }
        self.errors
            .into_vec()
            .into_iter()
            .next()
            .and_then(|entry| entry.message)
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorPayload;

    #[test]
    fn singular_error_field() {
        let message = ErrorPayload::extract_message(br#"{"error": "Not authorized."}"#);
        assert_eq!(&*message, "Not authorized.");
    }

    #[test]
    fn errors_list_takes_first_message() {
        let body = br#"{"errors": [
            {"code": 34, "message": "Sorry, that page does not exist."},
            {"code": 88, "message": "Rate limit exceeded."}
        ]}"#;
        let message = ErrorPayload::extract_message(body);
        assert_eq!(&*message, "Sorry, that page does not exist.");
    }

    #[test]
    fn unparseable_body_falls_back() {
        let message = ErrorPayload::extract_message(b"<html>503 Service Unavailable</html>");
        assert_eq!(&*message, "unknown provider error");
    }

    #[test]
    fn json_without_error_fields_falls_back() {
        let message = ErrorPayload::extract_message(b"{}");
        assert_eq!(&*message, "unknown provider error");
    }
}
