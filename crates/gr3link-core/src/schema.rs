//! Recipe parameter schema
//!
//! Every recipe parameter is declared once in [`SCHEMA`] with its kind,
//! bounds and default. Validation, defaulting and seeding all go through
//! this table; nothing else in the crate knows individual parameter names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Recipe name must not be empty")]
    EmptyName,
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("Parameter {name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("Parameter {name} expects {expected}")]
    TypeMismatch { name: String, expected: &'static str },
    #[error("Parameter {name} does not allow value {value}")]
    NotAllowed { name: String, value: String },
}

/// A single parameter value as persisted: a flat JSON primitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// Legal values of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParamKind {
    /// Inclusive integer range
    IntRange { min: i64, max: i64 },
    Bool,
    /// One of a fixed set of labels
    Choice { options: &'static [&'static str] },
    /// One of a fixed set of integers
    IntChoice { options: &'static [i64] },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamDefault {
    Int(i64),
    Bool(bool),
    Text(&'static str),
}

/// Declaration of one recipe parameter
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: ParamKind,
    pub default: ParamDefault,
}

impl ParamSpec {
    const fn range(name: &'static str, min: i64, max: i64) -> Self {
        Self {
            name,
            kind: ParamKind::IntRange { min, max },
            default: ParamDefault::Int(0),
        }
    }

    const fn flag(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            default: ParamDefault::Bool(false),
        }
    }

    const fn choice(
        name: &'static str,
        options: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            name,
            kind: ParamKind::Choice { options },
            default: ParamDefault::Text(default),
        }
    }

    /// Default value as a [`ParamValue`]
    pub fn default_value(&self) -> ParamValue {
        match self.default {
            ParamDefault::Int(v) => ParamValue::Int(v),
            ParamDefault::Bool(v) => ParamValue::Bool(v),
            ParamDefault::Text(v) => ParamValue::Text(v.to_string()),
        }
    }

    /// Check a value against this parameter's kind and bounds
    pub fn validate(&self, value: &ParamValue) -> Result<(), ValidationError> {
        let mismatch = |expected: &'static str| ValidationError::TypeMismatch {
            name: self.name.to_string(),
            expected,
        };

        match (&self.kind, value) {
            (ParamKind::IntRange { min, max }, ParamValue::Int(v)) => {
                if v < min || v > max {
                    return Err(ValidationError::OutOfRange {
                        name: self.name.to_string(),
                        value: *v,
                        min: *min,
                        max: *max,
                    });
                }
                Ok(())
            }
            (ParamKind::IntRange { .. }, _) => Err(mismatch("an integer")),
            (ParamKind::Bool, ParamValue::Bool(_)) => Ok(()),
            (ParamKind::Bool, _) => Err(mismatch("a boolean")),
            (ParamKind::Choice { options }, ParamValue::Text(v)) => {
                if options.contains(&v.as_str()) {
                    Ok(())
                } else {
                    Err(ValidationError::NotAllowed {
                        name: self.name.to_string(),
                        value: v.clone(),
                    })
                }
            }
            (ParamKind::Choice { .. }, _) => Err(mismatch("one of its listed labels")),
            (ParamKind::IntChoice { options }, ParamValue::Int(v)) => {
                if options.contains(v) {
                    Ok(())
                } else {
                    Err(ValidationError::NotAllowed {
                        name: self.name.to_string(),
                        value: v.to_string(),
                    })
                }
            }
            (ParamKind::IntChoice { .. }, _) => Err(mismatch("one of its listed numbers")),
        }
    }
}

pub const TONING: &[&str] = &["Off", "Sepia", "Red", "Green", "Blue", "Purple"];
pub const SHADOW_CORRECTION: &[&str] = &["Off", "Low", "Medium", "High"];
pub const WHITE_BALANCE: &[&str] = &[
    "Auto",
    "Daylight",
    "Shade",
    "Cloudy",
    "Tungsten",
    "Fluorescent",
    "Manual",
];
pub const ISO_MAX: &[i64] = &[
    100, 200, 400, 800, 1600, 3200, 6400, 12800, 25600, 51200, 102400,
];
/// Exposure compensation in thirds of a stop, -2 EV to +2 EV
pub const EXPOSURE_COMPENSATION: &[&str] = &[
    "-2", "-5/3", "-4/3", "-1", "-2/3", "-1/3", "0", "+1/3", "+2/3", "+1", "+4/3", "+5/3", "+2",
];

/// The complete parameter table
pub static SCHEMA: &[ParamSpec] = &[
    ParamSpec::range("saturation", -4, 4),
    ParamSpec::range("hue", -4, 4),
    ParamSpec::range("highLowKey", -4, 4),
    ParamSpec::range("contrast", -4, 4),
    ParamSpec::range("contrastHighlight", -4, 4),
    ParamSpec::range("contrastShadow", -4, 4),
    ParamSpec::range("sharpness", -4, 4),
    ParamSpec::range("clarity", -4, 4),
    ParamSpec::range("shading", -4, 4),
    ParamSpec::range("filterEffect", 0, 4),
    ParamSpec::range("grainEffect", 0, 3),
    ParamSpec::choice("toning", TONING, "Off"),
    ParamSpec::flag("highlightCorrection"),
    ParamSpec::choice("shadowCorrection", SHADOW_CORRECTION, "Off"),
    ParamSpec::flag("peripheralIlluminationCorrection"),
    ParamSpec::flag("highISONoiseReduction"),
    ParamSpec::choice("whiteBalance", WHITE_BALANCE, "Auto"),
    ParamSpec::range("wbCompensationA", -7, 7),
    ParamSpec::range("wbCompensationM", -7, 7),
    ParamSpec {
        name: "isoMax",
        kind: ParamKind::IntChoice { options: ISO_MAX },
        default: ParamDefault::Int(6400),
    },
    ParamSpec::choice("exposureCompensation", EXPOSURE_COMPENSATION, "0"),
];

/// Names used by older versions of the app, mapped to their current name
pub const LEGACY_ALIASES: &[(&str, &str)] = &[("highKey", "highLowKey"), ("grain", "grainEffect")];

/// Look up a parameter by its current name
pub fn spec(name: &str) -> Option<&'static ParamSpec> {
    SCHEMA.iter().find(|p| p.name == name)
}

/// Resolve a legacy parameter name to its current name
pub fn canonical_name(name: &str) -> &str {
    LEGACY_ALIASES
        .iter()
        .find(|(legacy, _)| *legacy == name)
        .map(|(_, current)| *current)
        .unwrap_or(name)
}

/// Parameter name to value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every schema parameter set to its default
    pub fn defaults() -> Self {
        Self(
            SCHEMA
                .iter()
                .map(|p| (p.name.to_string(), p.default_value()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style [`Params::set`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True if any key is a legacy alias
    pub fn has_legacy_names(&self) -> bool {
        self.0.keys().any(|k| canonical_name(k) != k.as_str())
    }

    /// Overlay `changes` on top of `self`, resolving legacy names and
    /// validating every value. `self` is assumed to be valid already.
    ///
    /// A key given under both its legacy and current name takes the value of
    /// the current name; the legacy value is ignored without being checked.
    pub fn merged(&self, changes: &Params) -> Result<Params, ValidationError> {
        let mut out = self.clone();
        for (given, value) in changes.iter() {
            let name = canonical_name(given);
            if name != given && changes.get(name).is_some() {
                continue;
            }
            let param =
                spec(name).ok_or_else(|| ValidationError::UnknownParameter(name.to_string()))?;
            param.validate(value)?;
            out.0.insert(name.to_string(), value.clone());
        }
        Ok(out)
    }

    /// Fill every missing parameter with its default and validate the rest
    pub fn normalized(&self) -> Result<Params, ValidationError> {
        Params::defaults().merged(self)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
