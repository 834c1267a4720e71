// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Inject parameters and how each one resolves to a JSON value.

use serde_json::{json, Number, Value};
use std::str::FromStr;

use crate::document::json::JsonObjectExt;
use crate::errors::{ConstructionError, NodeError};
use crate::traits::EnvironmentSource;

const FIELD: &str = "Parameters";

/// Where a parameter's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterSource {
    /// The configured literal, typed by the declared type.
    Primitive,
    /// Current Unix time in milliseconds.
    Timestamp,
    /// The process environment variable named by the configured value.
    Environment,
}

impl ParameterSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterSource::Primitive => "Primitive",
            ParameterSource::Timestamp => "Timestamp",
            ParameterSource::Environment => "Environment",
        }
    }
}

impl FromStr for ParameterSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primitive" => Ok(ParameterSource::Primitive),
            "timestamp" => Ok(ParameterSource::Timestamp),
            "environment" => Ok(ParameterSource::Environment),
            _ => Err(format!("unknown parameter source '{}'", s)),
        }
    }
}

/// Declared type of a primitive parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Number,
    Boolean,
}

impl ParameterType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::Number => "Number",
            ParameterType::Boolean => "Boolean",
        }
    }
}

impl FromStr for ParameterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(ParameterType::String),
            "number" => Ok(ParameterType::Number),
            "boolean" => Ok(ParameterType::Boolean),
            _ => Err(format!("unknown parameter type '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterType,
    pub source: ParameterSource,
    pub value: String,
}

/// A resolved parameter value plus any warning raised while resolving it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub warning: Option<String>,
}

impl Resolved {
    fn value(value: Value) -> Self {
        Self {
            value,
            warning: None,
        }
    }
}

impl Parameter {
    pub fn primitive(name: impl Into<String>, kind: ParameterType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            source: ParameterSource::Primitive,
            value: value.into(),
        }
    }

    pub fn timestamp(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterType::Number,
            source: ParameterSource::Timestamp,
            value: String::new(),
        }
    }

    /// Parameter whose value is read from the environment variable `variable`.
    pub fn environment(name: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterType::String,
            source: ParameterSource::Environment,
            value: variable.into(),
        }
    }

    /// Reads one entry of a `Parameters` array.
    ///
    /// `Source` defaults to primitive and `Type` to string. The declared type
    /// only matters for primitives; an unknown type or source is rejected.
    pub fn from_json(entry: &Value) -> Result<Self, ConstructionError> {
        let object = entry.as_object().ok_or_else(|| ConstructionError::InvalidField {
            field: FIELD,
            reason: format!("expected an object, found {}", entry),
        })?;

        let source = object
            .str_ignore_case("Source")
            .map(str::parse::<ParameterSource>)
            .transpose()
            .map_err(|reason| ConstructionError::InvalidField { field: FIELD, reason })?
            .unwrap_or(ParameterSource::Primitive);

        let kind = match (source, object.str_ignore_case("Type")) {
            (ParameterSource::Primitive, Some(declared)) => declared
                .parse::<ParameterType>()
                .map_err(|reason| ConstructionError::InvalidField { field: FIELD, reason })?,
            (ParameterSource::Timestamp, _) => ParameterType::Number,
            (_, declared) => declared
                .and_then(|d| d.parse::<ParameterType>().ok())
                .unwrap_or(ParameterType::String),
        };

        let name = object.str_ignore_case("Name").unwrap_or("Unknown").to_string();
        let value = match object.get_ignore_case("Value") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Ok(Self {
            name,
            kind,
            source,
            value,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "Name": self.name,
            "Type": self.kind.as_str(),
            "Source": self.source.as_str(),
            "Value": self.value,
        })
    }

    /// Resolves the parameter for one production cycle.
    pub fn resolve(
        &self,
        environment: &dyn EnvironmentSource,
        now_millis: i64,
    ) -> Result<Resolved, NodeError> {
        match self.source {
            ParameterSource::Timestamp => Ok(Resolved::value(Value::from(now_millis))),
            ParameterSource::Environment => {
                let raw = environment
                    .var(&self.value)
                    .filter(|v| !v.trim().is_empty())
                    .ok_or_else(|| NodeError::MissingEnvironmentVariable(self.value.clone()))?;
                let value = parse_number(&raw)
                    .map(Value::Number)
                    .unwrap_or(Value::String(raw));
                Ok(Resolved::value(value))
            }
            ParameterSource::Primitive => self.resolve_primitive(),
        }
    }

    fn resolve_primitive(&self) -> Result<Resolved, NodeError> {
        match self.kind {
            ParameterType::String => Ok(Resolved::value(Value::String(self.value.clone()))),
            ParameterType::Number => Ok(match parse_number(&self.value) {
                Some(number) => Resolved::value(Value::Number(number)),
                None => Resolved {
                    value: Value::from(0),
                    warning: Some(
                        NodeError::InvalidParameter {
                            name: self.name.clone(),
                            expected: "number",
                            value: self.value.clone(),
                        }
                        .to_string(),
                    ),
                },
            }),
            ParameterType::Boolean => match self.value.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Resolved::value(Value::Bool(true))),
                "false" => Ok(Resolved::value(Value::Bool(false))),
                _ => Err(NodeError::InvalidParameter {
                    name: self.name.clone(),
                    expected: "boolean",
                    value: self.value.clone(),
                }),
            },
        }
    }
}

/// Integer if it fits, otherwise a finite float.
pub fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::from(u));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}
