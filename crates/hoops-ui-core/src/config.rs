//! Configuration records and their validation.
//!
//! A configuration record is a flat struct of primitives (bools, numbers, color
//! strings, string literals). Validation happens in two passes: a structural
//! pass over the raw JSON object (every declared field present with the right
//! shape) and a semantic pass over the typed record (ranges). Both report every
//! violated field rather than stopping at the first one.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::color::is_css_color;

/// Expected shape of one configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Number,
    /// A CSS hex color string.
    Color,
    /// One of a fixed set of strings.
    Literal(&'static [&'static str]),
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            FieldKind::Bool => "a boolean",
            FieldKind::Number => "a number",
            FieldKind::Color => "a color string",
            FieldKind::Literal(_) => "a known literal",
        }
    }
}

/// A named field of a configuration record, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn bool(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Bool }
    }

    pub const fn number(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Number }
    }

    pub const fn color(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Color }
    }

    pub const fn literal(name: &'static str, names: &'static [&'static str]) -> Self {
        Self { name, kind: FieldKind::Literal(names) }
    }

    /// Check a raw JSON value against this field's shape.
    pub fn check(&self, value: Option<&Value>) -> Option<Violation> {
        let Some(value) = value else {
            return Some(Violation::Missing(self.name));
        };

        let ok = match self.kind {
            FieldKind::Bool => value.is_boolean(),
            FieldKind::Number => value.as_f64().is_some_and(f64::is_finite),
            FieldKind::Color => value.as_str().is_some_and(is_css_color),
            FieldKind::Literal(names) => value.as_str().is_some_and(|s| names.contains(&s)),
        };

        (!ok).then(|| Violation::WrongType {
            field: self.name,
            expected: self.kind.describe(),
        })
    }
}

/// One reason a configuration object was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    NotAnObject,
    Missing(&'static str),
    WrongType { field: &'static str, expected: &'static str },
    OutOfRange { field: &'static str, constraint: &'static str },
    Malformed(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NotAnObject => f.write_str("not an object"),
            Violation::Missing(field) => write!(f, "`{field}` is missing"),
            Violation::WrongType { field, expected } => write!(f, "`{field}` must be {expected}"),
            Violation::OutOfRange { field, constraint } => {
                write!(f, "`{field}` must be {constraint}")
            }
            Violation::Malformed(reason) => f.write_str(reason),
        }
    }
}

impl Violation {
    /// Field the violation refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Violation::Missing(field)
            | Violation::WrongType { field, .. }
            | Violation::OutOfRange { field, .. } => Some(field),
            Violation::NotAnObject | Violation::Malformed(_) => None,
        }
    }
}

/// A configuration object failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid configuration object for {service}: {}", join(.violations))]
pub struct ConfigurationError {
    pub service: &'static str,
    pub violations: Vec<Violation>,
}

impl ConfigurationError {
    pub fn new(service: &'static str, violations: Vec<Violation>) -> Self {
        Self { service, violations }
    }

    /// Names of the violated fields.
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().filter_map(Violation::field).collect()
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Range check: `value >= 0`.
pub fn non_negative(field: &'static str, value: f64) -> Option<Violation> {
    (!(value >= 0.0 && value.is_finite())).then_some(Violation::OutOfRange {
        field,
        constraint: ">= 0",
    })
}

/// Range check: `value > 0`.
pub fn positive(field: &'static str, value: f64) -> Option<Violation> {
    (!(value > 0.0 && value.is_finite())).then_some(Violation::OutOfRange {
        field,
        constraint: "> 0",
    })
}

/// Range check: `0 <= value <= 1`.
pub fn unit_interval(field: &'static str, value: f64) -> Option<Violation> {
    (!(0.0..=1.0).contains(&value)).then_some(Violation::OutOfRange {
        field,
        constraint: "between 0 and 1",
    })
}

/// Turn a failed range check on a setter argument into an error.
pub fn ensure(violation: Option<Violation>) -> Result<(), crate::error::ServiceError> {
    match violation {
        Some(violation) => Err(crate::error::ServiceError::InvalidArgument(violation.to_string())),
        None => Ok(()),
    }
}

/// A validated configuration record for one service.
pub trait Configuration:
    Clone + Default + PartialEq + fmt::Debug + Serialize + DeserializeOwned + 'static
{
    /// Name of the service the record configures.
    const SERVICE: &'static str;

    /// Declared fields, in the order a reset applies them.
    const FIELDS: &'static [FieldSpec];

    /// Semantic checks on an already typed record.
    fn violations(&self) -> Vec<Violation> {
        Vec::new()
    }

    /// Run the semantic checks.
    fn check(&self) -> Result<(), ConfigurationError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::new(Self::SERVICE, violations))
        }
    }

    /// Validate a raw configuration object and convert it to the record.
    fn validate(value: &Value) -> Result<Self, ConfigurationError> {
        let Some(object) = value.as_object() else {
            return Err(ConfigurationError::new(Self::SERVICE, vec![Violation::NotAnObject]));
        };

        let violations = shape_violations(object, Self::FIELDS);
        if !violations.is_empty() {
            return Err(ConfigurationError::new(Self::SERVICE, violations));
        }

        let config: Self = serde_json::from_value(value.clone()).map_err(|e| {
            ConfigurationError::new(Self::SERVICE, vec![Violation::Malformed(e.to_string())])
        })?;
        config.check()?;
        Ok(config)
    }

    /// Boolean form of [`Configuration::validate`].
    fn matches(value: &Value) -> bool {
        Self::validate(value).is_ok()
    }

    /// The record as a JSON object.
    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn shape_violations(object: &Map<String, Value>, fields: &[FieldSpec]) -> Vec<Violation> {
    fields
        .iter()
        .filter_map(|field| field.check(object.get(field.name)))
        .collect()
}

/// Declare a string-literal enum used in configuration records.
///
/// Generates serde renames, `NAMES` (for [`FieldSpec::literal`]), `ALL`,
/// `as_str`, `Default` and `Display`.
macro_rules! literal_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $lit:literal),+ $(,)?
        }
        default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $($(#[$vmeta])* #[serde(rename = $lit)] $variant),+
        }

        impl $name {
            pub const NAMES: &'static [&'static str] = &[$($lit),+];
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $lit),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use literal_enum;
