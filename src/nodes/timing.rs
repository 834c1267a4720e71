// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Map, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use crate::document::json::JsonObjectExt;
use crate::errors::ConstructionError;

/// Unit of a configured interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Millisecond => "Millisecond",
            TimeUnit::Second => "Second",
            TimeUnit::Minute => "Minute",
        }
    }

    pub fn duration(self, value: u64) -> Duration {
        match self {
            TimeUnit::Millisecond => Duration::from_millis(value),
            TimeUnit::Second => Duration::from_secs(value),
            TimeUnit::Minute => Duration::from_secs(value.saturating_mul(60)),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "millisecond" => Ok(TimeUnit::Millisecond),
            "second" => Ok(TimeUnit::Second),
            "minute" => Ok(TimeUnit::Minute),
            _ => Err(format!(
                "unknown time unit '{}', expected Millisecond, Second or Minute",
                s
            )),
        }
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `{ "Type": unit, "Value": n }` interval. A value of 0 disables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub unit: TimeUnit,
    pub value: u64,
}

impl Interval {
    pub fn new(unit: TimeUnit, value: u64) -> Self {
        Self { unit, value }
    }

    pub fn seconds(value: u64) -> Self {
        Self::new(TimeUnit::Second, value)
    }

    pub fn is_enabled(&self) -> bool {
        self.value > 0
    }

    pub fn duration(&self) -> Duration {
        self.unit.duration(self.value)
    }

    /// Reads the interval object stored under `field`.
    pub fn from_field(
        fields: &Map<String, Value>,
        field: &'static str,
    ) -> Result<Self, ConstructionError> {
        let object = fields
            .get_ignore_case(field)
            .ok_or(ConstructionError::MissingField(field))?
            .as_object()
            .ok_or_else(|| invalid(field, "expected an object with Type and Value"))?;

        let unit = object
            .str_ignore_case("Type")
            .ok_or_else(|| invalid(field, "missing Type"))?
            .parse::<TimeUnit>()
            .map_err(|reason| invalid(field, reason))?;

        let value = match object.get_ignore_case("Value") {
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| invalid(field, format!("Value {} is not a whole number of at least 0", n)))?,
            Some(Value::String(s)) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid(field, format!("Value '{}' is not a whole number of at least 0", s)))?,
            _ => return Err(invalid(field, "missing Value")),
        };

        Ok(Self { unit, value })
    }

    pub fn to_json(&self) -> Value {
        json!({ "Type": self.unit.as_str(), "Value": self.value })
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConstructionError {
    ConstructionError::InvalidField {
        field,
        reason: reason.into(),
    }
}
