/*!
 * Shape inference and coercion for loosely typed JSON
 *
 * A [`Schema`] is inferred once from a hand-written sample value and then
 * used to coerce untrusted data into exactly that shape. Leaves that do
 * not match are handled according to an explicit [`OnTypeMismatch`]
 * policy instead of failing the whole load.
 */

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// Kind of a scalar leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// JSON string
    String,
    /// JSON number (integer or float)
    Number,
    /// JSON boolean
    Boolean,
    /// Null in the sample; any value is accepted as-is
    Unknown,
}

impl ScalarKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Unknown => true,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Structural shape of a JSON value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    /// A single leaf value
    Scalar(ScalarKind),
    /// A sequence whose elements all share one schema
    ArrayOf(Box<Schema>),
    /// An object with a fixed set of named fields
    RecordOf(BTreeMap<String, Schema>),
}

impl Schema {
    /// Infer the shape of `sample`
    ///
    /// Arrays take their element schema from the first element only; an
    /// empty array (or one starting with `null`) infers `unknown` elements.
    pub fn infer(sample: &Value) -> Self {
        match sample {
            Value::String(_) => Self::Scalar(ScalarKind::String),
            Value::Number(_) => Self::Scalar(ScalarKind::Number),
            Value::Bool(_) => Self::Scalar(ScalarKind::Boolean),
            Value::Null => Self::Scalar(ScalarKind::Unknown),
            Value::Array(items) => {
                let element = items
                    .first()
                    .map(Self::infer)
                    .unwrap_or(Self::Scalar(ScalarKind::Unknown));
                Self::ArrayOf(Box::new(element))
            }
            Value::Object(fields) => Self::RecordOf(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::infer(value)))
                    .collect(),
            ),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Scalar(kind) => kind.to_string(),
            Self::ArrayOf(_) => "array".to_string(),
            Self::RecordOf(_) => "object".to_string(),
        }
    }
}

/// What the validator does with a leaf that has the wrong shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnTypeMismatch {
    /// Replace the value with its default: `null` for scalars, an empty
    /// sequence for arrays, a record of defaults for objects
    #[default]
    SubstituteDefault,
    /// Fail with [`AppError::SchemaMismatch`]
    Reject,
}

/// Coerces raw values against a schema
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    policy: OnTypeMismatch,
}

impl Validator {
    /// Create a validator with the given mismatch policy
    pub fn new(policy: OnTypeMismatch) -> Self {
        Self { policy }
    }

    /// Coerce `raw` into the shape of `schema`
    ///
    /// `None` stands for an absent value (a missing object key).
    pub fn validate(&self, raw: Option<&Value>, schema: &Schema) -> Result<Value> {
        self.validate_at(raw, schema, "$")
    }

    fn validate_at(&self, raw: Option<&Value>, schema: &Schema, path: &str) -> Result<Value> {
        match schema {
            Schema::Scalar(ScalarKind::Unknown) => Ok(raw.cloned().unwrap_or(Value::Null)),
            Schema::Scalar(kind) => match raw {
                Some(value) if kind.accepts(value) => Ok(value.clone()),
                _ => self.mismatch(path, schema, raw, Value::Null),
            },
            Schema::ArrayOf(element) => match raw {
                Some(Value::Array(items)) => items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        self.validate_at(Some(item), element, &format!("{}[{}]", path, index))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array),
                _ => self.mismatch(path, schema, raw, Value::Array(Vec::new())),
            },
            Schema::RecordOf(fields) => {
                let object = match raw {
                    Some(Value::Object(object)) => Some(object),
                    _ if self.policy == OnTypeMismatch::Reject => {
                        return self.mismatch(path, schema, raw, Value::Null);
                    }
                    _ => None,
                };

                let mut result = Map::new();
                for (key, field) in fields {
                    let value = object.and_then(|o| o.get(key));
                    let coerced = self.validate_at(value, field, &format!("{}.{}", path, key))?;
                    result.insert(key.clone(), coerced);
                }
                Ok(Value::Object(result))
            }
        }
    }

    fn mismatch(
        &self,
        path: &str,
        schema: &Schema,
        raw: Option<&Value>,
        default: Value,
    ) -> Result<Value> {
        match self.policy {
            OnTypeMismatch::SubstituteDefault => Ok(default),
            OnTypeMismatch::Reject => Err(AppError::SchemaMismatch {
                path: path.to_string(),
                expected: schema.describe(),
                found: raw.map_or_else(|| "nothing".to_string(), |v| value_kind(v).to_string()),
            }),
        }
    }
}

/// Coerce `raw` against `schema`, substituting defaults on mismatch
pub fn validate(raw: &Value, schema: &Schema) -> Value {
    Validator::default()
        .validate(Some(raw), schema)
        .unwrap_or(Value::Null)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_scalars_and_containers() {
        let schema = Schema::infer(&json!({
            "name": "x",
            "count": 1,
            "flag": true,
            "nothing": null,
            "tags": ["a"],
            "empty": [],
        }));

        let Schema::RecordOf(fields) = schema else {
            panic!("expected a record");
        };
        assert_eq!(fields["name"], Schema::Scalar(ScalarKind::String));
        assert_eq!(fields["count"], Schema::Scalar(ScalarKind::Number));
        assert_eq!(fields["flag"], Schema::Scalar(ScalarKind::Boolean));
        assert_eq!(fields["nothing"], Schema::Scalar(ScalarKind::Unknown));
        assert_eq!(
            fields["tags"],
            Schema::ArrayOf(Box::new(Schema::Scalar(ScalarKind::String)))
        );
        assert_eq!(
            fields["empty"],
            Schema::ArrayOf(Box::new(Schema::Scalar(ScalarKind::Unknown)))
        );
    }

    #[test]
    fn test_value_is_unchanged_against_its_own_schema() {
        let samples = [
            json!("text"),
            json!(3.5),
            json!(null),
            json!(["a", "b", "c"]),
            json!({
                "excludeFolders": ["target", "node_modules"],
                "excludeCode": { "folders": ["gen"], "name": ["*.lock"] },
                "rules": [{ "source": "a", "injection": [{ "text": "x", "position": -1 }] }],
                "flag": false,
                "missing": null,
            }),
        ];

        for sample in samples {
            let schema = Schema::infer(&sample);
            assert_eq!(validate(&sample, &schema), sample);
        }
    }

    #[test]
    fn test_matching_fields_are_kept() {
        let schema = Schema::infer(&json!({ "a": "y", "b": 0 }));
        assert_eq!(
            validate(&json!({ "a": "x", "b": 5 }), &schema),
            json!({ "a": "x", "b": 5 })
        );
    }

    #[test]
    fn test_swapped_types_become_null() {
        let schema = Schema::infer(&json!({ "a": "y", "b": 0 }));
        assert_eq!(
            validate(&json!({ "a": 5, "b": "x" }), &schema),
            json!({ "a": null, "b": null })
        );
    }

    #[test]
    fn test_missing_keys_default_and_extra_keys_drop() {
        let schema = Schema::infer(&json!({ "a": "y", "b": 0 }));
        assert_eq!(
            validate(&json!({ "a": "x", "extra": true }), &schema),
            json!({ "a": "x", "b": null })
        );
    }

    #[test]
    fn test_non_object_input_yields_defaults() {
        let schema = Schema::infer(&json!({ "list": ["a"], "nested": { "n": 1 } }));
        assert_eq!(
            validate(&json!("garbage"), &schema),
            json!({ "list": [], "nested": { "n": null } })
        );
    }

    #[test]
    fn test_array_elements_are_coerced() {
        let schema = Schema::infer(&json!([{ "text": "t", "position": 1 }]));
        assert_eq!(
            validate(&json!([{ "text": "a", "position": "x" }, 7]), &schema),
            json!([
                { "text": "a", "position": null },
                { "text": null, "position": null }
            ])
        );
    }

    #[test]
    fn test_non_array_input_yields_empty_sequence() {
        let schema = Schema::infer(&json!(["a"]));
        assert_eq!(validate(&json!({ "not": "an array" }), &schema), json!([]));
        assert_eq!(validate(&json!(null), &schema), json!([]));
    }

    #[test]
    fn test_reject_policy_reports_path() {
        let schema = Schema::infer(&json!({ "a": "y", "items": [0] }));
        let validator = Validator::new(OnTypeMismatch::Reject);

        let err = validator
            .validate(Some(&json!({ "a": "x", "items": [1, "two"] })), &schema)
            .unwrap_err();
        match err {
            AppError::SchemaMismatch {
                path,
                expected,
                found,
            } => {
                assert_eq!(path, "$.items[1]");
                assert_eq!(expected, "number");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }

        let ok = validator
            .validate(Some(&json!({ "a": "x", "items": [1, 2] })), &schema)
            .unwrap();
        assert_eq!(ok, json!({ "a": "x", "items": [1, 2] }));
    }

    #[test]
    fn test_reject_policy_flags_missing_keys() {
        let schema = Schema::infer(&json!({ "a": "y" }));
        let err = Validator::new(OnTypeMismatch::Reject)
            .validate(Some(&json!({})), &schema)
            .unwrap_err();
        assert!(err.to_string().contains("found nothing"));
    }
}
