//! Declarative input contracts for tools.
//!
//! A tool describes its arguments once, as a table of [`FieldSpec`]s. The
//! JSON Schema advertised by `tools/list` and the validator run by
//! `tools/call` are both derived from that table, so the two cannot drift.

use serde_json::{json, Map, Value};

use crate::types::Violation;

const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

/// Structural type of a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    String,
    /// RFC 3339 date-time string.
    DateTime,
    Boolean,
    Integer {
        min: Option<i64>,
        max: Option<i64>,
    },
    /// String restricted to a fixed set of values.
    Enum(&'static [&'static str]),
    StringArray {
        max_items: Option<usize>,
    },
    Object(ObjectSpec),
}

/// Value filled in when an optional field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Integer(i64),
    Boolean(bool),
}

impl DefaultValue {
    fn to_value(self) -> Value {
        match self {
            DefaultValue::Integer(n) => Value::from(n),
            DefaultValue::Boolean(b) => Value::Bool(b),
        }
    }
}

/// One named field of an object contract.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub description: Option<&'static str>,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            description: None,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            description: None,
        }
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// An object contract: its fields plus an optional description.
#[derive(Debug, Clone, Copy)]
pub struct ObjectSpec {
    pub fields: &'static [FieldSpec],
    pub description: Option<&'static str>,
}

impl ObjectSpec {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self {
            fields,
            description: None,
        }
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Render as a standalone draft-07 JSON Schema document.
    pub fn to_json_schema(&self) -> Value {
        let mut schema = render_object(self);
        if let Value::Object(map) = &mut schema {
            map.insert("$schema".to_string(), json!(JSON_SCHEMA_DRAFT));
        }
        schema
    }

    /// Check `raw` against the contract.
    ///
    /// Collects every violation instead of stopping at the first. On success
    /// returns a normalized copy: unknown keys dropped, defaults filled in,
    /// whole-number floats coerced to integers.
    pub fn validate(&self, raw: &Value) -> Result<Value, Vec<Violation>> {
        let mut violations = Vec::new();
        let normalized = match raw {
            Value::Object(obj) => validate_object(self, obj, "", &mut violations),
            other => {
                violations.push(Violation::new(
                    "",
                    format!("expected object, received {}", type_name(other)),
                ));
                Map::new()
            }
        };

        if violations.is_empty() {
            Ok(Value::Object(normalized))
        } else {
            Err(violations)
        }
    }
}

fn render_object(spec: &ObjectSpec) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in spec.fields {
        properties.insert(field.name.to_string(), render_field(field));
        if field.required {
            required.push(json!(field.name));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    schema.insert("additionalProperties".to_string(), json!(false));
    if let Some(description) = spec.description {
        schema.insert("description".to_string(), json!(description));
    }
    Value::Object(schema)
}

fn render_field(field: &FieldSpec) -> Value {
    let mut schema = match field.kind {
        FieldKind::String => json!({ "type": "string" }),
        FieldKind::DateTime => json!({ "type": "string", "format": "date-time" }),
        FieldKind::Boolean => json!({ "type": "boolean" }),
        FieldKind::Integer { min, max } => {
            let mut s = json!({ "type": "integer" });
            if let Some(min) = min {
                s["minimum"] = json!(min);
            }
            if let Some(max) = max {
                s["maximum"] = json!(max);
            }
            s
        }
        FieldKind::Enum(values) => json!({ "type": "string", "enum": values }),
        FieldKind::StringArray { max_items } => {
            let mut s = json!({ "type": "array", "items": { "type": "string" } });
            if let Some(max) = max_items {
                s["maxItems"] = json!(max);
            }
            s
        }
        FieldKind::Object(ref spec) => render_object(spec),
    };

    if let Some(default) = field.default {
        schema["default"] = default.to_value();
    }
    if let Some(description) = field.description {
        schema["description"] = json!(description);
    }
    schema
}

fn validate_object(
    spec: &ObjectSpec,
    obj: &Map<String, Value>,
    prefix: &str,
    violations: &mut Vec<Violation>,
) -> Map<String, Value> {
    let mut out = Map::new();

    for field in spec.fields {
        let path = join_path(prefix, field.name);
        match obj.get(field.name) {
            None if field.required => {
                violations.push(Violation::new(path, "required field is missing"));
            }
            None => {
                if let Some(default) = field.default {
                    out.insert(field.name.to_string(), default.to_value());
                }
            }
            Some(value) => {
                if let Some(v) = validate_value(&field.kind, value, &path, violations) {
                    out.insert(field.name.to_string(), v);
                }
            }
        }
    }

    out
}

fn validate_value(
    kind: &FieldKind,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let mismatch = |expected: &str| {
        Violation::new(
            path,
            format!("expected {expected}, received {}", type_name(value)),
        )
    };

    match kind {
        FieldKind::String => match value {
            Value::String(_) => Some(value.clone()),
            _ => {
                violations.push(mismatch("string"));
                None
            }
        },
        FieldKind::DateTime => match value {
            Value::String(s) if is_utc_datetime(s) => Some(value.clone()),
            Value::String(s) => {
                violations.push(Violation::new(
                    path,
                    format!(
                        "expected a UTC date-time (YYYY-MM-DDTHH:MM:SSZ), received \"{s}\""
                    ),
                ));
                None
            }
            _ => {
                violations.push(mismatch("string"));
                None
            }
        },
        FieldKind::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            _ => {
                violations.push(mismatch("boolean"));
                None
            }
        },
        FieldKind::Integer { min, max } => {
            let Some(n) = as_integer(value) else {
                match value.as_f64() {
                    Some(f) if f.fract() == 0.0 => {
                        violations.push(out_of_range(path, f, *min, *max));
                    }
                    Some(_) => {
                        violations.push(Violation::new(path, "expected integer, received float"));
                    }
                    None => violations.push(mismatch("integer")),
                }
                return None;
            };
            let mut ok = true;
            if let Some(min) = min {
                if n < *min {
                    violations.push(Violation::new(
                        path,
                        format!("must be greater than or equal to {min}"),
                    ));
                    ok = false;
                }
            }
            if let Some(max) = max {
                if n > *max {
                    violations.push(Violation::new(
                        path,
                        format!("must be less than or equal to {max}"),
                    ));
                    ok = false;
                }
            }
            ok.then(|| Value::from(n))
        }
        FieldKind::Enum(allowed) => match value {
            Value::String(s) if allowed.contains(&s.as_str()) => Some(value.clone()),
            Value::String(s) => {
                let expected = allowed
                    .iter()
                    .map(|v| format!("'{v}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                violations.push(Violation::new(
                    path,
                    format!("expected one of {expected}, received '{s}'"),
                ));
                None
            }
            _ => {
                violations.push(mismatch("string"));
                None
            }
        },
        FieldKind::StringArray { max_items } => {
            let Value::Array(items) = value else {
                violations.push(mismatch("array"));
                return None;
            };
            let before = violations.len();
            for (i, item) in items.iter().enumerate() {
                if !item.is_string() {
                    violations.push(Violation::new(
                        format!("{path}[{i}]"),
                        format!("expected string, received {}", type_name(item)),
                    ));
                }
            }
            if let Some(max) = max_items {
                if items.len() > *max {
                    violations.push(Violation::new(
                        path,
                        format!("must contain at most {max} item(s), received {}", items.len()),
                    ));
                }
            }
            (violations.len() == before).then(|| value.clone())
        }
        FieldKind::Object(spec) => match value {
            Value::Object(obj) => {
                let before = violations.len();
                let nested = validate_object(spec, obj, path, violations);
                (violations.len() == before).then_some(Value::Object(nested))
            }
            _ => {
                violations.push(mismatch("object"));
                None
            }
        },
    }
}

/// Integers, including floats with no fractional part (`10.0`).
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
}

/// Violation for a whole number that does not fit in an `i64`.
fn out_of_range(path: &str, value: f64, min: Option<i64>, max: Option<i64>) -> Violation {
    if value > 0.0 {
        let max = max.unwrap_or(i64::MAX);
        Violation::new(path, format!("must be less than or equal to {max}"))
    } else {
        let min = min.unwrap_or(i64::MIN);
        Violation::new(path, format!("must be greater than or equal to {min}"))
    }
}

/// RFC 3339 restricted to the canonical UTC form: uppercase `T` separator
/// and a trailing `Z`, with optional fractional seconds.
fn is_utc_datetime(s: &str) -> bool {
    s.as_bytes().get(10) == Some(&b'T')
        && s.ends_with('Z')
        && chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INNER: &[FieldSpec] = &[
        FieldSpec::optional("flag", FieldKind::Boolean).with_default(DefaultValue::Boolean(false)),
        FieldSpec::optional("limit", FieldKind::Integer { min: None, max: None }),
    ];

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::required("name", FieldKind::String).describe("A name."),
        FieldSpec::optional(
            "count",
            FieldKind::Integer {
                min: Some(1),
                max: Some(5),
            },
        )
        .with_default(DefaultValue::Integer(2)),
        FieldSpec::optional("mode", FieldKind::Enum(&["a", "b"])),
        FieldSpec::optional("tags", FieldKind::StringArray { max_items: Some(1) }),
        FieldSpec::optional("when", FieldKind::DateTime),
        FieldSpec::optional("inner", FieldKind::Object(ObjectSpec::new(INNER))),
    ];

    const SPEC: ObjectSpec = ObjectSpec::new(FIELDS).describe("Test contract");

    fn paths(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.path.as_str()).collect()
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(SPEC.to_json_schema(), SPEC.to_json_schema());
    }

    #[test]
    fn test_render_shape() {
        let schema = SPEC.to_json_schema();
        assert_eq!(schema["$schema"], JSON_SCHEMA_DRAFT);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["name"]));
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["description"], "Test contract");
        assert_eq!(schema["properties"]["name"]["description"], "A name.");
        assert_eq!(schema["properties"]["count"]["minimum"], 1);
        assert_eq!(schema["properties"]["count"]["maximum"], 5);
        assert_eq!(schema["properties"]["count"]["default"], 2);
        assert_eq!(schema["properties"]["mode"]["enum"], json!(["a", "b"]));
        assert_eq!(schema["properties"]["tags"]["maxItems"], 1);
        assert_eq!(schema["properties"]["when"]["format"], "date-time");
        assert_eq!(
            schema["properties"]["inner"]["properties"]["flag"]["default"],
            false
        );
        assert!(schema["properties"]["inner"].get("required").is_none());
    }

    #[test]
    fn test_defaults_and_stripping() {
        let out = SPEC
            .validate(&json!({ "name": "x", "extra": 1, "inner": {} }))
            .unwrap();
        assert_eq!(
            out,
            json!({ "name": "x", "count": 2, "inner": { "flag": false } })
        );
    }

    #[test]
    fn test_nested_defaults_only_when_parent_present() {
        let out = SPEC.validate(&json!({ "name": "x" })).unwrap();
        assert!(out.get("inner").is_none());
    }

    #[test]
    fn test_collects_all_violations() {
        let err = SPEC
            .validate(&json!({
                "count": 9,
                "mode": "c",
                "tags": [2],
                "when": "yesterday",
                "inner": { "flag": "yes", "limit": 1.5 }
            }))
            .unwrap_err();
        assert_eq!(
            paths(&err),
            vec![
                "name",
                "count",
                "mode",
                "tags[0]",
                "when",
                "inner.flag",
                "inner.limit"
            ]
        );
    }

    #[test]
    fn test_array_too_long() {
        let err = SPEC
            .validate(&json!({ "name": "x", "tags": ["a", "b"] }))
            .unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err[0].message.contains("at most 1"));
    }

    #[test]
    fn test_non_object_root() {
        let err = SPEC.validate(&json!("hello")).unwrap_err();
        assert_eq!(err, vec![Violation::new("", "expected object, received string")]);
    }

    #[test]
    fn test_null_is_not_absent() {
        let err = SPEC.validate(&json!({ "name": null })).unwrap_err();
        assert_eq!(err[0].message, "expected string, received null");
    }

    #[test]
    fn test_whole_float_accepted_as_integer() {
        let out = SPEC.validate(&json!({ "name": "x", "count": 3.0 })).unwrap();
        assert_eq!(out["count"], json!(3));
    }

    #[test]
    fn test_datetime_requires_utc_form() {
        for ok in ["2024-01-01T00:00:00Z", "2024-01-01T00:00:00.000Z"] {
            assert!(SPEC.validate(&json!({ "name": "x", "when": ok })).is_ok(), "{ok}");
        }
        for bad in [
            "2024-01-01T00:00:00+02:00",
            "2024-01-01 00:00:00Z",
            "2024-01-01t00:00:00z",
            "2024-01-01",
        ] {
            let err = SPEC.validate(&json!({ "name": "x", "when": bad })).unwrap_err();
            assert_eq!(err.len(), 1, "{bad}");
            assert_eq!(err[0].path, "when");
        }
    }

    #[test]
    fn test_huge_whole_number_is_out_of_range() {
        let err = SPEC
            .validate(&json!({ "name": "x", "inner": { "limit": 1e20 } }))
            .unwrap_err();
        assert_eq!(
            err,
            vec![Violation::new(
                "inner.limit",
                format!("must be less than or equal to {}", i64::MAX)
            )]
        );

        let err = SPEC.validate(&json!({ "name": "x", "count": -1e20 })).unwrap_err();
        assert_eq!(err[0].message, "must be greater than or equal to 1");

        let err = SPEC.validate(&json!({ "name": "x", "count": 2.5 })).unwrap_err();
        assert_eq!(err[0].message, "expected integer, received float");
    }
}
