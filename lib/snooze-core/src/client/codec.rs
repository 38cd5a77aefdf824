use mime::Mime;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::SnoozeError;

/// Content type used when neither the endpoint nor the response tells otherwise.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Encode/decode strategy selected by a content type.
///
/// | content type        | codec           |
/// |---------------------|-----------------|
/// | `application/json`  | [`Codec::Json`] |
/// | `application/xml`   | [`Codec::Xml`]  |
/// | `text/xml`          | [`Codec::Xml`]  |
///
/// Everything after the first `;` is ignored, the essence is matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// JSON, with `serde_json`.
    Json,
    /// XML, with `serde-xml-rs`.
    Xml,
}

impl Codec {
    /// Finds the codec for a content type, `None` if the content type is not supported.
    #[must_use]
    pub fn for_content_type(content_type: &str) -> Option<Self> {
        // parameters are dropped before parsing, malformed ones must not hide the essence
        let essence = content_type
            .split_once(';')
            .map_or(content_type, |(essence, _)| essence);
        let parsed = essence.trim().to_ascii_lowercase().parse::<Mime>().ok()?;
        let (kind, subtype) = (parsed.type_(), parsed.subtype());
        if kind == mime::APPLICATION && subtype == mime::JSON {
            Some(Self::Json)
        } else if (kind == mime::APPLICATION || kind == mime::TEXT) && subtype == mime::XML {
            Some(Self::Xml)
        } else {
            None
        }
    }

    /// Serializes a request body.
    ///
    /// # Errors
    ///
    /// Returns [`SnoozeError::ContentTypeUnsupported`] if no codec handles `content_type`,
    /// or [`SnoozeError::Encoding`] if the serializer fails.
    pub fn encode<B>(content_type: &str, body: &B) -> Result<Vec<u8>, SnoozeError>
    where
        B: Serialize,
    {
        let Some(codec) = Self::for_content_type(content_type) else {
            return Err(SnoozeError::ContentTypeUnsupported {
                content_type: content_type.to_string(),
            });
        };

        let result = match codec {
            Self::Json => serde_json::to_vec(body).map_err(|err| err.to_string()),
            Self::Xml => serde_xml_rs::to_string(body)
                .map(String::into_bytes)
                .map_err(|err| err.to_string()),
        };
        result.map_err(|message| SnoozeError::Encoding {
            content_type: content_type.to_string(),
            message,
        })
    }

    /// Deserializes a response body.
    ///
    /// An unsupported content type is not an error: a warning is emitted and `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SnoozeError::Decoding`] if the body does not match the payload type.
    pub fn decode<T>(content_type: &str, bytes: &[u8]) -> Result<Option<T>, SnoozeError>
    where
        T: DeserializeOwned,
    {
        let Some(codec) = Self::for_content_type(content_type) else {
            warn!(%content_type, "content type not supported, skip payload decoding");
            return Ok(None);
        };

        let result = match codec {
            Self::Json => serde_json::from_slice(bytes).map_err(|err| err.to_string()),
            Self::Xml => serde_xml_rs::from_reader(bytes).map_err(|err| err.to_string()),
        };
        result.map(Some).map_err(|message| SnoozeError::Decoding {
            content_type: content_type.to_string(),
            message,
            body: String::from_utf8_lossy(bytes).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Bird {
        name: String,
        wingspan: u32,
    }

    fn bird() -> Bird {
        Bird {
            name: "Heron".to_string(),
            wingspan: 180,
        }
    }

    #[rstest]
    #[case::json("application/json", Some(Codec::Json))]
    #[case::json_charset("application/json; charset=utf-8", Some(Codec::Json))]
    #[case::xml("application/xml", Some(Codec::Xml))]
    #[case::text_xml("text/xml;charset=UTF-8", Some(Codec::Xml))]
    #[case::upper_case("Application/JSON", Some(Codec::Json))]
    #[case::trailing_semicolon("application/json;", Some(Codec::Json))]
    #[case::parameter_without_value("application/json; charset", Some(Codec::Json))]
    #[case::unknown_trailing_parameter("application/json; charset=utf-8; foo", Some(Codec::Json))]
    #[case::unterminated_quote("application/json;charset=\"utf-8", Some(Codec::Json))]
    #[case::xml_broken_parameter("application/xml; =", Some(Codec::Xml))]
    #[case::text("text/plain", None)]
    #[case::only_parameters("; charset=utf-8", None)]
    #[case::empty("", None)]
    #[case::garbage("not a mime", None)]
    fn should_select_codec(#[case] content_type: &str, #[case] expected: Option<Codec>) {
        assert_eq!(Codec::for_content_type(content_type), expected);
    }

    #[rstest]
    #[case::json("application/json")]
    #[case::xml("application/xml")]
    #[case::text_xml("text/xml")]
    fn should_decode_what_was_encoded(#[case] content_type: &str) {
        let bytes = Codec::encode(content_type, &bird()).expect("encoded");

        let decoded = Codec::decode::<Bird>(content_type, &bytes).expect("decoded");

        assert_eq!(decoded, Some(bird()));
    }

    #[test]
    fn should_encode_json() {
        let bytes = Codec::encode("application/json", &bird()).expect("encoded");

        insta::assert_snapshot!(String::from_utf8_lossy(&bytes), @r#"{"name":"Heron","wingspan":180}"#);
    }

    #[test]
    fn should_reject_unsupported_request_content_type() {
        let result = Codec::encode("text/plain", &bird());

        match result {
            Err(SnoozeError::ContentTypeUnsupported { content_type }) => {
                assert_eq!(content_type, "text/plain");
            }
            other => panic!("expected ContentTypeUnsupported, got {other:?}"),
        }
    }

    #[test]
    fn should_skip_unsupported_response_content_type() {
        let decoded = Codec::decode::<Bird>("text/plain", b"Heron").expect("no error");

        assert_eq!(decoded, None);
    }

    #[test]
    fn should_fail_on_invalid_json() {
        let result = Codec::decode::<Bird>("application/json", br#"{"name": 42}"#);

        match result {
            Err(SnoozeError::Decoding {
                content_type, body, ..
            }) => {
                assert_eq!(content_type, "application/json");
                assert_eq!(body, r#"{"name": 42}"#);
            }
            other => panic!("expected Decoding, got {other:?}"),
        }
    }

    #[test]
    fn should_fail_on_empty_json_body() {
        let result = Codec::decode::<Bird>("application/json", b"");

        assert!(matches!(result, Err(SnoozeError::Decoding { .. })));
    }
}
