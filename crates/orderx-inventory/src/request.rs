//! Lookup requests and their validation
//!
//! A [`LookupRequest`] can only be built through the validator, so holding
//! one means the invariants below already hold:
//!
//! 1. `keys` is a non-empty list of strings
//! 2. `required_amounts` has the same length and holds non-negative integers
//! 3. `scope` is a non-empty string
//!
//! Checks run in that order and stop at the first violation. Validation is
//! pure; it never touches the filesystem or the data source.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A validated batch lookup
///
/// Deserializing goes through [`LookupRequest::from_value`], so serde input
/// is held to the same checks as every other entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct LookupRequest {
    keys: Vec<String>,
    required_amounts: Vec<u64>,
    scope: String,
}

impl LookupRequest {
    /// Validate typed input
    ///
    /// Amounts are taken as signed integers so that negative values coming
    /// from callers are rejected here rather than wrapped.
    pub fn new(
        keys: Vec<String>,
        required_amounts: Vec<i64>,
        scope: impl Into<String>,
    ) -> Result<Self> {
        check_keys_present(keys.len())?;
        check_lengths(keys.len(), required_amounts.len())?;

        let mut amounts = Vec::with_capacity(required_amounts.len());
        for (index, amount) in required_amounts.into_iter().enumerate() {
            let amount = u64::try_from(amount).map_err(|_| {
                Error::validation(format!(
                    "required_amounts[{index}] must be non-negative, got {amount}"
                ))
            })?;
            amounts.push(amount);
        }

        let scope = scope.into();
        check_scope(&scope)?;

        Ok(Self {
            keys,
            required_amounts: amounts,
            scope,
        })
    }

    /// Validate an untyped JSON object with `keys`, `required_amounts` and
    /// `scope` members
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::validation("request must be a JSON object"))?;
        let missing = Value::Null;
        Self::from_parts(
            object.get("keys").unwrap_or(&missing),
            object.get("required_amounts").unwrap_or(&missing),
            object.get("scope").unwrap_or(&missing),
        )
    }

    /// Validate the three request members individually
    pub fn from_parts(keys: &Value, required_amounts: &Value, scope: &Value) -> Result<Self> {
        let keys = parse_keys(keys)?;
        let required_amounts = parse_amounts(required_amounts)?;
        check_lengths(keys.len(), required_amounts.len())?;

        let scope = match scope {
            Value::String(s) => s.clone(),
            Value::Null => return Err(Error::validation("scope is required")),
            other => {
                return Err(Error::validation(format!(
                    "scope must be a string, got {}",
                    json_type(other)
                )));
            }
        };
        check_scope(&scope)?;

        Ok(Self {
            keys,
            required_amounts,
            scope,
        })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn required_amounts(&self) -> &[u64] {
        &self.required_amounts
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Number of keys in the batch
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false for a validated request
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys paired with their required amounts, in request order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, u64)> {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.required_amounts.iter().copied())
    }
}

fn parse_keys(value: &Value) -> Result<Vec<String>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Err(Error::validation("keys is required")),
        other => {
            return Err(Error::validation(format!(
                "keys must be an array of strings, got {}",
                json_type(other)
            )));
        }
    };
    check_keys_present(items.len())?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(Error::validation(format!(
                "keys[{index}] must be a string, got {}",
                json_type(other)
            ))),
        })
        .collect()
}

fn parse_amounts(value: &Value) -> Result<Vec<u64>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Err(Error::validation("required_amounts is required")),
        other => {
            return Err(Error::validation(format!(
                "required_amounts must be an array of integers, got {}",
                json_type(other)
            )));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if let Some(amount) = item.as_u64() {
                return Ok(amount);
            }
            match item.as_i64() {
                Some(negative) => Err(Error::validation(format!(
                    "required_amounts[{index}] must be non-negative, got {negative}"
                ))),
                None => Err(Error::validation(format!(
                    "required_amounts[{index}] must be an integer, got {}",
                    json_type(item)
                ))),
            }
        })
        .collect()
}

fn check_keys_present(count: usize) -> Result<()> {
    if count == 0 {
        return Err(Error::validation("keys must not be empty"));
    }
    Ok(())
}

fn check_lengths(keys: usize, amounts: usize) -> Result<()> {
    if keys != amounts {
        return Err(Error::validation(format!(
            "required_amounts has {amounts} entries but keys has {keys}"
        )));
    }
    Ok(())
}

fn check_scope(scope: &str) -> Result<()> {
    if scope.trim().is_empty() {
        return Err(Error::validation("scope must not be empty"));
    }
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "a fractional number",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl TryFrom<Value> for LookupRequest {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(&value)
    }
}
