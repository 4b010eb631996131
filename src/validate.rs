//! Validation of paste creation requests.
//!
//! Fields are checked in order (`content`, `ttl_seconds`, `max_views`) and the
//! first failure is reported. Nothing is clamped: zero and negative values are
//! rejected outright.

use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

/// A creation request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PasteInput {
    pub content: String,
    pub ttl_seconds: Option<f64>,
    pub max_views: Option<i64>,
}

/// State of an optional request field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<T> {
    Absent,
    Invalid,
    Valid(T),
}

impl<T> Field<T> {
    fn classify(
        body: &Map<String, Value>,
        key: &str,
        parse: impl FnOnce(&Value) -> Option<T>,
    ) -> Self {
        match body.get(key) {
            None => Field::Absent,
            Some(value) => parse(value).map_or(Field::Invalid, Field::Valid),
        }
    }

    fn or_reject(self, error: ApiError) -> ApiResult<Option<T>> {
        match self {
            Field::Absent => Ok(None),
            Field::Invalid => Err(error),
            Field::Valid(value) => Ok(Some(value)),
        }
    }
}

/// Parse and validate a raw JSON request body.
pub fn parse_body(body: &[u8]) -> ApiResult<PasteInput> {
    let body: Value = serde_json::from_slice(body)?;
    validate(&body)
}

pub fn validate(body: &Value) -> ApiResult<PasteInput> {
    let empty = Map::new();
    let body = match body {
        Value::Object(body) => body,
        Value::Null => return Err(ApiError::NullBody),
        // other non-object bodies have no content field
        _ => &empty,
    };

    let content = match body.get("content") {
        Some(Value::String(content)) if !content.trim().is_empty() => content.clone(),
        _ => return Err(ApiError::MissingOrInvalidContent),
    };

    let ttl_seconds =
        Field::classify(body, "ttl_seconds", ttl_seconds).or_reject(ApiError::InvalidTtl)?;
    let max_views =
        Field::classify(body, "max_views", max_views).or_reject(ApiError::InvalidMaxViews)?;

    Ok(PasteInput {
        content,
        ttl_seconds,
        max_views,
    })
}

fn ttl_seconds(value: &Value) -> Option<f64> {
    value.as_f64().filter(|ttl| *ttl >= 1.0)
}

fn max_views(value: &Value) -> Option<i64> {
    if let Some(max_views) = value.as_i64() {
        return (max_views >= 1).then_some(max_views);
    }

    // integral floats such as `3.0` are accepted, fractions are not
    let max_views = value.as_f64()?;
    let integral = max_views.fract() == 0.0 && max_views >= 1.0 && max_views < i64::MAX as f64;
    integral.then_some(max_views as i64)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn error(body: Value) -> ApiError {
        validate(&body).unwrap_err()
    }

    #[test]
    fn content_only() {
        let input = validate(&json!({ "content": "hello" })).unwrap();
        assert_eq!(
            input,
            PasteInput {
                content: "hello".into(),
                ttl_seconds: None,
                max_views: None,
            }
        );
    }

    #[test]
    fn content_is_kept_verbatim() {
        let input = validate(&json!({ "content": "  padded\n" })).unwrap();
        assert_eq!(input.content, "  padded\n");
    }

    #[test]
    fn invalid_content() {
        for body in [
            json!({}),
            json!({ "content": "" }),
            json!({ "content": " \t\n" }),
            json!({ "content": 42 }),
            json!({ "content": null }),
            json!({ "content": ["a"] }),
            json!("just a string"),
            json!([]),
            json!(3),
        ] {
            assert!(
                matches!(error(body.clone()), ApiError::MissingOrInvalidContent),
                "{body}"
            );
        }
    }

    #[test]
    fn ttl() {
        let input = validate(&json!({ "content": "x", "ttl_seconds": 60 })).unwrap();
        assert_eq!(input.ttl_seconds, Some(60.0));

        let input = validate(&json!({ "content": "x", "ttl_seconds": 1 })).unwrap();
        assert_eq!(input.ttl_seconds, Some(1.0));

        for ttl in [json!(0), json!(-5), json!(0.5), json!("60"), json!(null), json!(true)] {
            let body = json!({ "content": "x", "ttl_seconds": ttl });
            assert!(matches!(error(body), ApiError::InvalidTtl), "{ttl}");
        }
    }

    #[test]
    fn max_views() {
        let input = validate(&json!({ "content": "x", "max_views": 3 })).unwrap();
        assert_eq!(input.max_views, Some(3));

        let input = validate(&json!({ "content": "x", "max_views": 2.0 })).unwrap();
        assert_eq!(input.max_views, Some(2));

        for views in [json!(0), json!(-1), json!(2.5), json!("3"), json!(null), json!(1e30)] {
            let body = json!({ "content": "x", "max_views": views });
            assert!(matches!(error(body), ApiError::InvalidMaxViews), "{views}");
        }
    }

    #[test]
    fn first_failure_wins() {
        let body = json!({ "content": "", "ttl_seconds": 0, "max_views": 0 });
        assert!(matches!(error(body), ApiError::MissingOrInvalidContent));

        let body = json!({ "content": "x", "ttl_seconds": 0, "max_views": 0 });
        assert!(matches!(error(body), ApiError::InvalidTtl));
    }

    #[test]
    fn unreadable_bodies_are_server_errors() {
        let err = parse_body(b"{\"content\":").unwrap_err();
        assert!(matches!(err, ApiError::MalformedBody { .. }));
        assert!(err.status_code().is_server_error());

        let err = parse_body(b"null").unwrap_err();
        assert!(matches!(err, ApiError::NullBody));
        assert!(err.status_code().is_server_error());
    }

    #[test]
    fn field_classification() {
        let body = json!({ "a": 1, "b": "x" });
        let body = body.as_object().unwrap();
        assert_eq!(Field::classify(body, "a", Value::as_i64), Field::Valid(1));
        assert_eq!(Field::classify(body, "b", Value::as_i64), Field::Invalid);
        assert_eq!(Field::classify(body, "c", Value::as_i64), Field::Absent);
    }
}
