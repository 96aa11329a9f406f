//! Strategy parameter maps and the schema each module publishes for them.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => write!(f, "{}", s),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Longest window any module will ask for, whatever the parameter map holds.
pub const MAX_PERIOD: usize = 1_000_000;

/// Validated parameter values for one strategy binding.
///
/// Lookups fall back to the supplied default when a key is missing, has the
/// wrong type, or holds a zero / non-finite number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyParams {
    values: BTreeMap<String, ParamValue>,
}

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    pub fn number(&self, name: &str, default: f64) -> f64 {
        match self.values.get(name) {
            Some(ParamValue::Number(n)) if *n != 0.0 && n.is_finite() => *n,
            _ => default,
        }
    }

    /// A window length: the number rounded to the nearest whole bar, clamped
    /// to `1..=MAX_PERIOD`.
    pub fn period(&self, name: &str, default: usize) -> usize {
        let n = self.number(name, default as f64).round();
        if n >= 1.0 {
            n.min(MAX_PERIOD as f64) as usize
        } else {
            default.min(MAX_PERIOD)
        }
    }

    pub fn text<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.values.get(name) {
            Some(ParamValue::Text(s)) if !s.is_empty() => s.as_str(),
            _ => default,
        }
    }

    pub fn flag(&self, name: &str, default: bool) -> bool {
        match self.values.get(name) {
            Some(ParamValue::Bool(b)) => *b,
            _ => default,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    Number {
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    },
    Select {
        default: &'static str,
        options: &'static [&'static str],
    },
    Text {
        default: &'static str,
    },
    Boolean {
        default: bool,
    },
}

/// One entry of a strategy's parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDefinition {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
}

impl ParamDefinition {
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ParamKind::Number { .. } => "number",
            ParamKind::Select { .. } => "select",
            ParamKind::Text { .. } => "string",
            ParamKind::Boolean { .. } => "boolean",
        }
    }

    pub fn default_value(&self) -> ParamValue {
        match &self.kind {
            ParamKind::Number { default, .. } => ParamValue::Number(*default),
            ParamKind::Select { default, .. } | ParamKind::Text { default } => {
                ParamValue::Text(default.to_string())
            }
            ParamKind::Boolean { default } => ParamValue::Bool(*default),
        }
    }

    /// Parse a raw config string into a value, enforcing bounds and options.
    pub fn parse(&self, raw: &str) -> Result<ParamValue, String> {
        let raw = raw.trim();
        match &self.kind {
            ParamKind::Number { min, max, .. } => {
                let n: f64 = raw
                    .parse()
                    .map_err(|_| format!("{} must be a number, got '{}'", self.name, raw))?;
                if !n.is_finite() || n < *min || n > *max {
                    return Err(format!(
                        "{} must be between {} and {}, got {}",
                        self.name, min, max, n
                    ));
                }
                Ok(ParamValue::Number(n))
            }
            ParamKind::Select { options, .. } => {
                if options.iter().any(|o| *o == raw) {
                    Ok(ParamValue::Text(raw.to_string()))
                } else {
                    Err(format!(
                        "{} must be one of [{}], got '{}'",
                        self.name,
                        options.join(", "),
                        raw
                    ))
                }
            }
            ParamKind::Text { .. } => Ok(ParamValue::Text(raw.to_string())),
            ParamKind::Boolean { .. } => match raw.to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(ParamValue::Bool(true)),
                "false" | "no" | "0" => Ok(ParamValue::Bool(false)),
                _ => Err(format!("{} must be true or false, got '{}'", self.name, raw)),
            },
        }
    }
}

/// Parameter map holding every schema default.
pub fn default_params(schema: &[ParamDefinition]) -> StrategyParams {
    let mut params = StrategyParams::new();
    for def in schema {
        params.set(def.name, def.default_value());
    }
    params
}
