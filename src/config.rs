//! Typed parameter definitions and scoped argument lookup for the link/chain runtime.
//!
//! A [ParamSpec] declares the shape of a configuration value a link or chain accepts; a
//! [ParamValue] is the value actually bound. [Scope] implements the link-local → chain → default
//! lookup order that [crate::link::Link::arg] and friends are built on.

use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// The error kinds raised by the configuration/capability registry.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("required parameter not set: {0}")]
    Missing(String),

    #[error("parameter {name} has type {actual}, expected {expected}")]
    TypeMismatch { name: String, expected: &'static str, actual: &'static str },
}

/// The type of a [ParamValue], used for mismatch reporting.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamKind {
    Str,
    StrList,
    Bool,
    Int,
}

impl Display for ParamKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Str => "string",
            Self::StrList => "string list",
            Self::Bool => "bool",
            Self::Int => "int",
        })
    }
}

/// A bound configuration value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParamValue {
    Str(String),
    StrList(Vec<String>),
    Bool(bool),
    Int(i64),
}

impl ParamValue {
    fn kind(&self) -> ParamKind {
        match self {
            Self::Str(_) => ParamKind::Str,
            Self::StrList(_) => ParamKind::StrList,
            Self::Bool(_) => ParamKind::Bool,
            Self::Int(_) => ParamKind::Int,
        }
    }

    /// Returns the value as a string, or a type-mismatch error.
    pub fn as_str(&self, name: &str) -> Result<&str, ConfigError> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(ConfigError::TypeMismatch { name: name.to_string(), expected: "string", actual: kind_name(other) }),
        }
    }

    /// Returns the value as a string list. A bare [ParamValue::Str] is treated as a single-element list, since the
    /// `regions` parameter (for example) is commonly bound as either a single region or a comma-expanded list.
    pub fn as_str_list(&self, name: &str) -> Result<Vec<String>, ConfigError> {
        match self {
            Self::StrList(v) => Ok(v.clone()),
            Self::Str(s) => Ok(vec![s.clone()]),
            other => Err(ConfigError::TypeMismatch { name: name.to_string(), expected: "string list", actual: kind_name(other) }),
        }
    }

    pub fn as_bool(&self, name: &str) -> Result<bool, ConfigError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(ConfigError::TypeMismatch { name: name.to_string(), expected: "bool", actual: kind_name(other) }),
        }
    }

    pub fn as_int(&self, name: &str) -> Result<i64, ConfigError> {
        match self {
            Self::Int(i) => Ok(*i),
            other => Err(ConfigError::TypeMismatch { name: name.to_string(), expected: "int", actual: kind_name(other) }),
        }
    }
}

fn kind_name(v: &ParamValue) -> &'static str {
    match v.kind() {
        ParamKind::Str => "string",
        ParamKind::StrList => "string list",
        ParamKind::Bool => "bool",
        ParamKind::Int => "int",
    }
}

/// The declared shape of a configuration parameter.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    name: String,
    description: String,
    short: Option<char>,
    required: bool,
    default: Option<ParamValue>,
}

impl ParamSpec {
    pub fn new<S: Into<String>>(name: S, description: S) -> Self {
        Self { name: name.into(), description: description.into(), short: None, required: false, default: None }
    }

    pub fn short(mut self, c: char) -> Self {
        self.short = Some(c);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: ParamValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn short_code(&self) -> Option<char> {
        self.short
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// A scoped argument lookup: link-local bindings, then the enclosing chain's bindings, then
/// declared defaults.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    local: HashMap<String, ParamValue>,
    parent: Option<Box<Scope>>,
    defaults: HashMap<String, ParamValue>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a child scope whose lookups fall back to `self` when a key is not bound locally.
    pub fn child(&self) -> Self {
        Self { local: HashMap::new(), parent: Some(Box::new(self.clone())), defaults: HashMap::new() }
    }

    pub fn bind<S: Into<String>>(&mut self, name: S, value: ParamValue) -> &mut Self {
        self.local.insert(name.into(), value);
        self
    }

    pub fn set_default<S: Into<String>>(&mut self, name: S, value: ParamValue) -> &mut Self {
        self.defaults.insert(name.into(), value);
        self
    }

    /// Looks up `name`: link-local binding, then the parent chain's binding, then the declared default.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.local.get(name).or_else(|| self.parent.as_deref().and_then(|p| p.get(name))).or_else(|| self.defaults.get(name))
    }

    /// Looks up a required parameter, returning [ConfigError::Missing] if unbound anywhere in the scope chain.
    pub fn arg(&self, name: &str) -> Result<&ParamValue, ConfigError> {
        self.get(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
    }
}
