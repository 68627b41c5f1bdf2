//! Declarative payload validation.
//!
//! A [`Schema`] is a static table of [`Rule`]s. Validating a raw JSON object
//! yields a map holding only the known fields that were present, with
//! coercion applied, or the full list of field errors.

use serde::Serialize;
use serde_json::{Map, Value};

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// A string of at least `min_len` characters.
    Text { min_len: usize },
    /// A string or `null`.
    NullableText,
    /// An integer, or a string holding one.
    Integer,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub field: &'static str,
    pub required: bool,
    pub check: Check,
}

impl Rule {
    pub const fn required(field: &'static str, check: Check) -> Self {
        Self {
            field,
            required: true,
            check,
        }
    }

    pub const fn optional(field: &'static str, check: Check) -> Self {
        Self {
            field,
            required: false,
            check,
        }
    }
}

#[derive(Debug)]
pub struct Schema {
    pub rules: &'static [Rule],
}

impl Schema {
    /// Unknown keys are dropped without error.
    pub fn validate(&self, input: &Fields) -> Result<Fields, Vec<FieldError>> {
        let mut clean = Fields::new();
        let mut errors = Vec::new();

        for rule in self.rules {
            match input.get(rule.field) {
                None if rule.required => errors.push(FieldError::new(rule.field, "Field required")),
                None => {}
                Some(value) => match check(rule.field, rule.check, value) {
                    Ok(value) => {
                        clean.insert(rule.field.to_string(), value);
                    }
                    Err(message) => errors.push(FieldError::new(rule.field, message)),
                },
            }
        }

        if errors.is_empty() {
            Ok(clean)
        } else {
            Err(errors)
        }
    }
}

fn check(field: &str, check: Check, value: &Value) -> Result<Value, String> {
    match (check, value) {
        (Check::Text { min_len }, Value::String(s)) => {
            if s.chars().count() >= min_len {
                Ok(value.clone())
            } else if min_len == 1 {
                Err(format!("{field} must not be empty"))
            } else {
                Err(format!("{field} must be at least {min_len} characters long"))
            }
        }
        (Check::Text { .. }, _) => Err("Input should be a valid string".into()),
        (Check::NullableText, Value::String(_) | Value::Null) => Ok(value.clone()),
        (Check::NullableText, _) => Err("Input should be a valid string or null".into()),
        (Check::Integer, Value::Number(n)) if n.is_i64() => Ok(value.clone()),
        (Check::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| "Input should be a valid integer".to_string()),
        (Check::Integer, _) => Err("Input should be a valid integer".into()),
    }
}

/// Typed accessors for maps that already passed a [`Schema`].
pub trait FieldsExt {
    fn text(&self, field: &str) -> Option<String>;
    fn integer(&self, field: &str) -> Option<i64>;
    /// `Some(None)` when the field was explicitly `null`.
    fn nullable_text(&self, field: &str) -> Option<Option<String>>;
}

impl FieldsExt for Fields {
    fn text(&self, field: &str) -> Option<String> {
        self.get(field).and_then(Value::as_str).map(str::to_owned)
    }

    fn integer(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    fn nullable_text(&self, field: &str) -> Option<Option<String>> {
        self.get(field).map(|v| v.as_str().map(str::to_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static SCHEMA: Schema = Schema {
        rules: &[
            Rule::required("name", Check::Text { min_len: 1 }),
            Rule::required("secret", Check::Text { min_len: 8 }),
            Rule::optional("note", Check::NullableText),
            Rule::optional("count", Check::Integer),
        ],
    };

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn keeps_only_present_known_fields() {
        let out = SCHEMA
            .validate(&fields(json!({"name": "a", "secret": "12345678", "extra": 1})))
            .unwrap();
        assert_eq!(Value::Object(out), json!({"name": "a", "secret": "12345678"}));
    }

    #[test]
    fn reports_every_missing_field() {
        let errors = SCHEMA.validate(&Fields::new()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("name", "Field required"),
                FieldError::new("secret", "Field required"),
            ]
        );
    }

    #[test]
    fn enforces_minimum_length_in_characters() {
        let errors = SCHEMA
            .validate(&fields(json!({"name": "", "secret": "ééééééé"})))
            .unwrap_err();
        assert_eq!(errors[0], FieldError::new("name", "name must not be empty"));
        assert_eq!(
            errors[1],
            FieldError::new("secret", "secret must be at least 8 characters long")
        );
        assert!(SCHEMA
            .validate(&fields(json!({"name": "x", "secret": "éééééééé"})))
            .is_ok());
    }

    #[test]
    fn rejects_wrong_types() {
        let errors = SCHEMA
            .validate(&fields(json!({"name": 5, "secret": "12345678", "note": 1, "count": true})))
            .unwrap_err();
        let failed: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(failed, ["name", "note", "count"]);
    }

    #[test]
    fn coerces_integer_strings() {
        let out = SCHEMA
            .validate(&fields(json!({"name": "a", "secret": "12345678", "count": " 42 "})))
            .unwrap();
        assert_eq!(out.integer("count"), Some(42));

        let errors = SCHEMA
            .validate(&fields(json!({"name": "a", "secret": "12345678", "count": 1.5})))
            .unwrap_err();
        assert_eq!(errors, vec![FieldError::new("count", "Input should be a valid integer")]);
    }

    #[test]
    fn distinguishes_null_from_absent() {
        let out = SCHEMA
            .validate(&fields(json!({"name": "a", "secret": "12345678", "note": null})))
            .unwrap();
        assert_eq!(out.nullable_text("note"), Some(None));
        assert_eq!(out.nullable_text("missing"), None);
    }
}
