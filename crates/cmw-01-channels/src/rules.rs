//! Default-fill and validation rules
//!
//! Each topic carries a table of [`FieldRule`]s. The same table is applied on
//! send (keyed off the local widget id) and on receive (keyed off the decoded
//! sender id), so both ends of a channel see identically populated records.
//!
//! Rules run in table order; a `CopyOf` default must come after the field it
//! copies.

use crate::error::ValidationError;
use crate::validator::{kind_of, valid_formats, valid_map_type, valid_request_types};
use serde_json::Value;
use shared_types::Record;

/// A constant default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Null,
    Bool(bool),
    Str(&'static str),
    StrList(&'static [&'static str]),
}

impl Literal {
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Str(s) => Value::String((*s).to_string()),
            Literal::StrList(items) => Value::Array(
                items
                    .iter()
                    .map(|s| Value::String((*s).to_string()))
                    .collect(),
            ),
        }
    }
}

/// Where a missing field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// The id of the widget on whose behalf the record is processed.
    SenderId,
    /// A constant.
    Literal(Literal),
    /// The (already defaulted) value of another field.
    CopyOf(&'static str),
}

/// Enumerated value checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCheck {
    /// Array of request type names.
    RequestTypes,
    /// A single map type name.
    MapType,
    /// Array of feature format names.
    Formats,
}

/// One entry in a topic's rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Default {
        field: &'static str,
        value: FieldDefault,
    },
    Required {
        field: &'static str,
    },
    Check {
        field: &'static str,
        check: FieldCheck,
    },
}

impl FieldRule {
    #[must_use]
    pub const fn sender(field: &'static str) -> Self {
        FieldRule::Default {
            field,
            value: FieldDefault::SenderId,
        }
    }

    #[must_use]
    pub const fn literal(field: &'static str, literal: Literal) -> Self {
        FieldRule::Default {
            field,
            value: FieldDefault::Literal(literal),
        }
    }

    #[must_use]
    pub const fn copy_of(field: &'static str, source: &'static str) -> Self {
        FieldRule::Default {
            field,
            value: FieldDefault::CopyOf(source),
        }
    }

    #[must_use]
    pub const fn required(field: &'static str) -> Self {
        FieldRule::Required { field }
    }

    #[must_use]
    pub const fn check(field: &'static str, check: FieldCheck) -> Self {
        FieldRule::Check { field, check }
    }
}

/// A field counts as missing when absent, null or an empty string.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Apply a rule table to one record in place.
pub fn apply_rules(
    record: &mut Record,
    sender_id: &str,
    rules: &[FieldRule],
) -> Result<(), ValidationError> {
    for rule in rules {
        match *rule {
            FieldRule::Default { field, value } => {
                if !is_missing(record.get(field)) {
                    continue;
                }
                let filled = match value {
                    FieldDefault::SenderId => Some(Value::String(sender_id.to_string())),
                    FieldDefault::Literal(literal) => Some(literal.to_value()),
                    FieldDefault::CopyOf(source) => record
                        .get(source)
                        .filter(|v| !is_missing(Some(*v)))
                        .cloned(),
                };
                if let Some(filled) = filled {
                    record.insert(field.to_string(), filled);
                }
            }
            FieldRule::Required { field } => {
                if is_missing(record.get(field)) {
                    return Err(ValidationError::MissingField { field });
                }
            }
            FieldRule::Check { field, check } => {
                if let Some(value) = record.get(field).filter(|v| !v.is_null()) {
                    run_check(field, check, value)?;
                }
            }
        }
    }
    Ok(())
}

fn run_check(field: &'static str, check: FieldCheck, value: &Value) -> Result<(), ValidationError> {
    match check {
        FieldCheck::MapType => {
            let map_type = value.as_str().ok_or(ValidationError::WrongFieldType {
                field,
                expected: "a string",
            })?;
            valid_map_type(map_type).map(|_| ())
        }
        FieldCheck::RequestTypes => valid_request_types(&string_list(field, value)?).map(|_| ()),
        FieldCheck::Formats => valid_formats(&string_list(field, value)?).map(|_| ()),
    }
}

fn string_list<'a>(field: &'static str, value: &'a Value) -> Result<Vec<&'a str>, ValidationError> {
    let wrong = || ValidationError::WrongFieldType {
        field,
        expected: "an array of strings",
    };
    let items = value.as_array().ok_or_else(wrong)?;
    items
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| {
                tracing::trace!(field = field, found = kind_of(item), "Non-string list entry");
                wrong()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_sender_default_fills_missing_and_empty() {
        let rules = [FieldRule::sender("overlayId")];

        let mut absent = Record::new();
        apply_rules(&mut absent, "w1", &rules).unwrap();
        assert_eq!(absent["overlayId"], "w1");

        let mut empty = record(json!({"overlayId": ""}));
        apply_rules(&mut empty, "w1", &rules).unwrap();
        assert_eq!(empty["overlayId"], "w1");

        let mut present = record(json!({"overlayId": "mine"}));
        apply_rules(&mut present, "w1", &rules).unwrap();
        assert_eq!(present["overlayId"], "mine");
    }

    #[test]
    fn test_literal_does_not_override_false() {
        let rules = [FieldRule::literal("zoom", Literal::Bool(false))];

        let mut absent = Record::new();
        apply_rules(&mut absent, "w", &rules).unwrap();
        assert_eq!(absent["zoom"], false);

        let mut set = record(json!({"zoom": true}));
        apply_rules(&mut set, "w", &rules).unwrap();
        assert_eq!(set["zoom"], true);
    }

    #[test]
    fn test_copy_of_uses_defaulted_source() {
        let rules = [
            FieldRule::sender("featureId"),
            FieldRule::copy_of("name", "featureId"),
        ];
        let mut rec = Record::new();
        apply_rules(&mut rec, "w", &rules).unwrap();
        assert_eq!(rec["name"], "w");
    }

    #[test]
    fn test_required_field() {
        let rules = [FieldRule::required("url")];
        let mut rec = record(json!({"url": ""}));
        assert_eq!(
            apply_rules(&mut rec, "w", &rules),
            Err(ValidationError::MissingField { field: "url" })
        );
    }

    #[test]
    fn test_checks() {
        let rules = [
            FieldRule::literal("types", Literal::StrList(&["about", "format", "view"])),
            FieldRule::check("types", FieldCheck::RequestTypes),
        ];
        let mut defaulted = Record::new();
        apply_rules(&mut defaulted, "w", &rules).unwrap();
        assert_eq!(defaulted["types"], json!(["about", "format", "view"]));

        let mut bad = record(json!({"types": ["ghi"]}));
        assert!(matches!(
            apply_rules(&mut bad, "w", &rules),
            Err(ValidationError::InvalidRequestType { .. })
        ));

        let mut not_list = record(json!({"types": "view"}));
        assert!(matches!(
            apply_rules(&mut not_list, "w", &rules),
            Err(ValidationError::WrongFieldType { field: "types", .. })
        ));

        let map_rules = [FieldRule::check("type", FieldCheck::MapType)];
        let mut wrong_type = record(json!({"type": ["ghi"]}));
        assert!(apply_rules(&mut wrong_type, "w", &map_rules).is_err());
    }
}
