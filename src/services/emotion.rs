//! Emotion tags are persisted as a serialized text blob. Rows written by older
//! clients may hold plain text or broken JSON, so every read goes through
//! [`decode`], which never fails.

use serde::{Deserialize, Serialize};

/// Outcome of decoding a stored emotion blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmotionDecode {
    Tags(Vec<String>),
    Absent,
    Malformed,
}

impl EmotionDecode {
    pub fn into_tags(self) -> Option<Vec<String>> {
        match self {
            EmotionDecode::Tags(tags) => Some(tags),
            EmotionDecode::Absent | EmotionDecode::Malformed => None,
        }
    }
}

pub fn decode(raw: Option<&str>) -> EmotionDecode {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return EmotionDecode::Absent;
    };

    match serde_json::from_str::<Option<Vec<String>>>(raw) {
        Ok(Some(tags)) => EmotionDecode::Tags(tags),
        Ok(None) => EmotionDecode::Absent,
        Err(_) => EmotionDecode::Malformed,
    }
}

/// A row type that carries a raw emotion column.
pub trait HasEmotion {
    fn record_id(&self) -> i64;
    fn raw_emotion(&self) -> Option<&str>;
}

/// A row serialized together with its decoded emotion tags. The row type is
/// expected to skip its own raw `emotion` column when serializing.
#[derive(Debug, Clone, Serialize)]
pub struct WithEmotion<T> {
    #[serde(flatten)]
    pub log: T,
    pub emotion: Option<Vec<String>>,
}

pub fn attach<T: HasEmotion>(log: T) -> WithEmotion<T> {
    let emotion = match decode(log.raw_emotion()) {
        EmotionDecode::Malformed => {
            tracing::warn!(
                log_id = log.record_id(),
                raw = log.raw_emotion().unwrap_or_default(),
                "Unparseable emotion field, returning null"
            );
            None
        }
        decoded => decoded.into_tags(),
    };
    WithEmotion { log, emotion }
}

/// Emotion as submitted by a client: a tag list, or a raw string kept verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EmotionInput {
    Tags(Vec<String>),
    Raw(String),
}

impl EmotionInput {
    pub fn into_stored(self) -> String {
        match self {
            // Serializing a Vec<String> cannot fail.
            EmotionInput::Tags(tags) => serde_json::to_string(&tags).unwrap_or_default(),
            EmotionInput::Raw(raw) => raw,
        }
    }
}

pub fn encode(input: Option<EmotionInput>) -> Option<String> {
    input.map(EmotionInput::into_stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        id: i64,
        emotion: Option<String>,
    }

    impl HasEmotion for Row {
        fn record_id(&self) -> i64 {
            self.id
        }
        fn raw_emotion(&self) -> Option<&str> {
            self.emotion.as_deref()
        }
    }

    #[test]
    fn test_decode_tag_list() {
        assert_eq!(
            decode(Some(r#"["sad","tired"]"#)),
            EmotionDecode::Tags(vec!["sad".into(), "tired".into()])
        );
        assert_eq!(decode(Some("[]")), EmotionDecode::Tags(vec![]));
    }

    #[test]
    fn test_decode_absent_forms() {
        assert_eq!(decode(None), EmotionDecode::Absent);
        assert_eq!(decode(Some("")), EmotionDecode::Absent);
        assert_eq!(decode(Some("   ")), EmotionDecode::Absent);
        assert_eq!(decode(Some("null")), EmotionDecode::Absent);
    }

    #[test]
    fn test_decode_malformed_forms() {
        assert_eq!(decode(Some("{not json")), EmotionDecode::Malformed);
        assert_eq!(decode(Some("happy")), EmotionDecode::Malformed);
        assert_eq!(decode(Some(r#"{"mood":"ok"}"#)), EmotionDecode::Malformed);
        assert_eq!(decode(Some("[1,2]")), EmotionDecode::Malformed);
    }

    #[test]
    fn test_attach_serializes_flat() {
        #[derive(Serialize)]
        struct Flat {
            id: i64,
        }
        impl HasEmotion for Flat {
            fn record_id(&self) -> i64 {
                self.id
            }
            fn raw_emotion(&self) -> Option<&str> {
                Some(r#"["calm"]"#)
            }
        }

        let json = serde_json::to_value(attach(Flat { id: 7 })).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "emotion": ["calm"]}));
    }

    #[test]
    fn test_attach_malformed_is_null() {
        let row = Row {
            id: 3,
            emotion: Some("{not json".into()),
        };
        assert_eq!(attach(row).emotion, None);
    }

    #[test]
    fn test_input_accepts_list_or_string() {
        let tags: EmotionInput = serde_json::from_str(r#"["focused","nervous"]"#).unwrap();
        assert_eq!(tags.into_stored(), r#"["focused","nervous"]"#);

        let raw: EmotionInput = serde_json::from_str(r#""excited""#).unwrap();
        assert_eq!(raw.into_stored(), "excited");

        assert_eq!(encode(None), None);
    }

    #[test]
    fn test_stored_tags_decode_back() {
        let stored = encode(Some(EmotionInput::Tags(vec!["proud".into()])));
        assert_eq!(
            decode(stored.as_deref()),
            EmotionDecode::Tags(vec!["proud".into()])
        );
    }
}
