//! Parameter contracts and binding
//!
//! Descriptors arrive as loose JSON maps. Binding checks them against a
//! contract's parameter specs and produces typed [`Params`] before any
//! operation runs.

use crate::core::error::{Result, TaifError};
use ahash::AHashMap;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::catalog::CapabilityContract;
use super::OpError;

/// Shape a parameter value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Free text
    Text,
    /// File system path, resolved against the working directory
    Path,
    /// Boolean, also accepted as "true"/"false"
    Flag,
    /// Integer, also accepted as a numeric string
    Integer,
    /// List of strings; a lone string is a one-element list
    List,
}

impl ParamKind {
    fn expected(&self) -> &'static str {
        match self {
            ParamKind::Text => "a string",
            ParamKind::Path => "a path string",
            ParamKind::Flag => "a boolean",
            ParamKind::Integer => "an integer",
            ParamKind::List => "a string or list of strings",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ParamKind::Text => "text",
            ParamKind::Path => "path",
            ParamKind::Flag => "flag",
            ParamKind::Integer => "int",
            ParamKind::List => "list",
        }
    }
}

/// A bound, typed parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Path(PathBuf),
    Flag(bool),
    Integer(i64),
    List(Vec<String>),
}

/// One named parameter of a capability contract
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    /// Value used when an optional parameter is absent
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    pub fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            default: None,
        }
    }

    pub fn text(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Text, description)
    }

    pub fn path(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Path, description)
    }

    pub fn flag(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Flag, description).with_default(ParamValue::Flag(false))
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Integer, description)
    }

    pub fn list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::List, description)
    }

    pub fn with_default(mut self, default: ParamValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Compact signature used in prompts, e.g. `path:path`
    pub fn signature(&self) -> String {
        format!("{}:{}", self.name, self.kind.label())
    }

    fn coerce(&self, value: &Value, workdir: Option<&Path>) -> Option<ParamValue> {
        match (self.kind, value) {
            (ParamKind::Text, Value::String(s)) => Some(ParamValue::Text(s.clone())),
            (ParamKind::Text, Value::Number(n)) => Some(ParamValue::Text(n.to_string())),
            (ParamKind::Text, Value::Bool(b)) => Some(ParamValue::Text(b.to_string())),
            (ParamKind::Path, Value::String(s)) if !s.trim().is_empty() => {
                Some(ParamValue::Path(resolve_path(workdir, s.trim())))
            }
            (ParamKind::Flag, Value::Bool(b)) => Some(ParamValue::Flag(*b)),
            (ParamKind::Flag, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(ParamValue::Flag(true)),
                "false" | "no" => Some(ParamValue::Flag(false)),
                _ => None,
            },
            (ParamKind::Integer, Value::Number(n)) => n.as_i64().map(ParamValue::Integer),
            (ParamKind::Integer, Value::String(s)) => s.trim().parse().ok().map(ParamValue::Integer),
            (ParamKind::List, Value::String(s)) => Some(ParamValue::List(vec![s.clone()])),
            (ParamKind::List, Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(ParamValue::List),
            _ => None,
        }
    }
}

/// Join a relative path onto the working directory, if one is set
pub fn resolve_path(workdir: Option<&Path>, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    match workdir {
        Some(base) if path.is_relative() => {
            if raw == "." {
                base.to_path_buf()
            } else {
                base.join(path)
            }
        }
        _ => path.to_path_buf(),
    }
}

/// Parameters bound against a contract
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: AHashMap<&'static str, ParamValue>,
    workdir: Option<PathBuf>,
}

impl Params {
    /// Bind raw descriptor parameters onto a contract
    ///
    /// Missing required parameters and values of the wrong shape are
    /// rejected. Parameters the contract does not name are ignored.
    pub fn bind(
        contract: &CapabilityContract,
        raw: &Map<String, Value>,
        workdir: Option<&Path>,
    ) -> Result<Self> {
        let mut values = AHashMap::new();

        for spec in &contract.required {
            let value = match raw.get(spec.name) {
                Some(v) if !v.is_null() => v,
                _ => {
                    return Err(TaifError::MissingParameter {
                        action: contract.name.to_string(),
                        parameter: spec.name.to_string(),
                    })
                }
            };
            values.insert(spec.name, Self::coerce_or_reject(contract, spec, value, workdir)?);
        }

        for spec in &contract.optional {
            match raw.get(spec.name) {
                Some(v) if !v.is_null() => {
                    values.insert(spec.name, Self::coerce_or_reject(contract, spec, v, workdir)?);
                }
                _ => {
                    if let Some(default) = &spec.default {
                        let default = match default {
                            ParamValue::Path(p) => {
                                ParamValue::Path(resolve_path(workdir, &p.to_string_lossy()))
                            }
                            other => other.clone(),
                        };
                        values.insert(spec.name, default);
                    }
                }
            }
        }

        for key in raw.keys() {
            if contract.param(key).is_none() {
                tracing::warn!(action = contract.name, parameter = %key, "Ignoring unknown parameter");
            }
        }

        Ok(Self {
            values,
            workdir: workdir.map(Path::to_path_buf),
        })
    }

    fn coerce_or_reject(
        contract: &CapabilityContract,
        spec: &ParamSpec,
        value: &Value,
        workdir: Option<&Path>,
    ) -> Result<ParamValue> {
        spec.coerce(value, workdir)
            .ok_or_else(|| TaifError::InvalidParameter {
                action: contract.name.to_string(),
                parameter: spec.name.to_string(),
                expected: spec.kind.expected().to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ParamValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        match self.values.get(name) {
            Some(ParamValue::Path(p)) => Some(p),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ParamValue::Flag(true)))
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ParamValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name) {
            Some(ParamValue::List(items)) => Some(items),
            _ => None,
        }
    }

    pub fn required_text(&self, name: &str) -> std::result::Result<&str, OpError> {
        self.text(name).ok_or_else(|| OpError::Unbound(name.to_string()))
    }

    pub fn required_path(&self, name: &str) -> std::result::Result<&Path, OpError> {
        self.path(name).ok_or_else(|| OpError::Unbound(name.to_string()))
    }

    /// Directory relative paths were resolved against, if any
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
