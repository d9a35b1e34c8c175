//! Extraction of a post submission from an inbound form payload.
//!
//! The broker forwards browser form posts as JSON of the shape
//! `{"PostForm": {"title": ["..."], "content": ["..."], ...}}`, where every
//! field maps to the list of values submitted under that name. Only the first
//! value of `title` and `content` is used; anything else is ignored.

use serde_json::{Map, Value};

use crate::error::CoreError;

/// Top-level key holding the submitted form fields.
pub const FORM_KEY: &str = "PostForm";

pub const TITLE_FIELD: &str = "title";
pub const CONTENT_FIELD: &str = "content";

/// The fields of a post as submitted by the client, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSubmission {
    pub title: String,
    pub content: String,
}

/// Parse a raw request payload into a [`PostSubmission`].
///
/// Returns [`CoreError::Parse`] (or [`CoreError::Encoding`]) when the payload
/// is not a JSON document, and [`CoreError::Schema`] when the document does
/// not carry the expected form structure.
pub fn parse_submission(payload: &[u8]) -> Result<PostSubmission, CoreError> {
    let text = std::str::from_utf8(payload)?;
    let document: Value = serde_json::from_str(text)?;

    let form = document
        .get(FORM_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| CoreError::Schema(format!("missing \"{FORM_KEY}\" object")))?;

    Ok(PostSubmission {
        title: first_value(form, TITLE_FIELD)?,
        content: first_value(form, CONTENT_FIELD)?,
    })
}

/// First string value submitted under `field`.
fn first_value(form: &Map<String, Value>, field: &str) -> Result<String, CoreError> {
    let values = form
        .get(field)
        .ok_or_else(|| CoreError::Schema(format!("missing form field \"{field}\"")))?
        .as_array()
        .ok_or_else(|| CoreError::Schema(format!("form field \"{field}\" is not a list")))?;

    match values.first() {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(CoreError::Schema(format!(
            "form field \"{field}\" holds a non-string value"
        ))),
        None => Err(CoreError::Schema(format!("form field \"{field}\" is empty"))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn extracts_title_and_content() {
        let post =
            parse_submission(br#"{"PostForm":{"title":["Hello"],"content":["World"]}}"#).unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "World");
    }

    #[test]
    fn uses_only_the_first_value() {
        let post =
            parse_submission(br#"{"PostForm":{"title":["A","B"],"content":["x","y"]}}"#).unwrap();
        assert_eq!(post.title, "A");
        assert_eq!(post.content, "x");
    }

    #[test]
    fn ignores_extra_keys() {
        let payload = br#"{
            "Method": "POST",
            "PostForm": {"title": ["t"], "content": ["c"], "csrf": ["token"]}
        }"#;
        let post = parse_submission(payload).unwrap();
        assert_eq!(post, PostSubmission { title: "t".into(), content: "c".into() });
    }

    #[test]
    fn keeps_empty_strings() {
        let post = parse_submission(br#"{"PostForm":{"title":[""],"content":[""]}}"#).unwrap();
        assert!(post.title.is_empty());
        assert!(post.content.is_empty());
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_submission(b"not json").unwrap_err();
        assert_matches!(err, CoreError::Parse(_));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = parse_submission(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert_matches!(err, CoreError::Encoding(_));
    }

    #[test]
    fn rejects_missing_form() {
        let err = parse_submission(br#"{"title":["Hello"]}"#).unwrap_err();
        assert_matches!(err, CoreError::Schema(msg) if msg.contains("PostForm"));
    }

    #[test]
    fn rejects_form_that_is_not_an_object() {
        let err = parse_submission(br#"{"PostForm":["title"]}"#).unwrap_err();
        assert_matches!(err, CoreError::Schema(_));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = parse_submission(br#"{"PostForm":{}}"#).unwrap_err();
        assert_matches!(err, CoreError::Schema(msg) if msg.contains("title"));

        let err = parse_submission(br#"{"PostForm":{"title":["t"]}}"#).unwrap_err();
        assert_matches!(err, CoreError::Schema(msg) if msg.contains("content"));
    }

    #[test]
    fn rejects_empty_value_list() {
        let err = parse_submission(br#"{"PostForm":{"title":[],"content":["c"]}}"#).unwrap_err();
        assert_matches!(err, CoreError::Schema(msg) if msg.contains("empty"));
    }

    #[test]
    fn rejects_scalar_field() {
        let err = parse_submission(br#"{"PostForm":{"title":"t","content":["c"]}}"#).unwrap_err();
        assert_matches!(err, CoreError::Schema(msg) if msg.contains("not a list"));
    }

    #[test]
    fn rejects_non_string_value() {
        let err = parse_submission(br#"{"PostForm":{"title":[1],"content":["c"]}}"#).unwrap_err();
        assert_matches!(err, CoreError::Schema(msg) if msg.contains("non-string"));
    }
}
