use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

/// Consumer fields a representative may propose edits to.
///
/// Status, allocation and ownership fields are deliberately absent: they only
/// move through the allocation and approval workflows.
pub const EDITABLE_CONSUMER_FIELDS: &[&str] = &[
    "name",
    "email",
    "phone",
    "document",
    "consumer_unit",
    "address",
    "city",
    "state",
    "average_monthly_consumption",
    "discount_offered",
];

const DECIMAL_FIELDS: &[&str] = &["average_monthly_consumption", "discount_offered"];

pub fn is_editable_field(field: &str) -> bool {
    EDITABLE_CONSUMER_FIELDS.contains(&field)
}

/// A diff between a live consumer record and a proposed edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub old_values: Map<String, Value>,
    pub new_values: Map<String, Value>,
    pub changed_fields: Vec<String>,
}

impl ChangeSet {
    /// Computes the diff of `proposed` against `current`.
    ///
    /// Proposed fields equal to the live value are dropped. Non-editable fields
    /// and an empty resulting diff are validation errors.
    pub fn diff(current: &Map<String, Value>, proposed: &Map<String, Value>) -> ApiResult<Self> {
        let mut change_set = ChangeSet {
            old_values: Map::new(),
            new_values: Map::new(),
            changed_fields: Vec::new(),
        };

        for (field, proposed_value) in proposed {
            if !is_editable_field(field) {
                return Err(ApiError::ValidationError(format!("Field '{field}' cannot be changed")));
            }
            let new_value = normalize(field, proposed_value)?;
            let old_value = current
                .get(field)
                .map(|value| normalize(field, value))
                .transpose()?
                .unwrap_or(Value::Null);

            if old_value != new_value {
                change_set.old_values.insert(field.clone(), old_value);
                change_set.new_values.insert(field.clone(), new_value);
                change_set.changed_fields.push(field.clone());
            }
        }

        if change_set.changed_fields.is_empty() {
            return Err(ApiError::ValidationError(
                "Change request does not change any field".to_string(),
            ));
        }
        Ok(change_set)
    }

    /// Checks a change set built elsewhere before it is stored or applied.
    pub fn validate(&self) -> ApiResult<()> {
        if self.changed_fields.is_empty() {
            return Err(ApiError::ValidationError("changed_fields must not be empty".to_string()));
        }
        let changed: BTreeSet<&str> = self.changed_fields.iter().map(String::as_str).collect();
        if changed.len() != self.changed_fields.len() {
            return Err(ApiError::ValidationError("changed_fields contains duplicates".to_string()));
        }
        for field in &self.changed_fields {
            if !is_editable_field(field) {
                return Err(ApiError::ValidationError(format!("Field '{field}' cannot be changed")));
            }
            if !self.new_values.contains_key(field) {
                return Err(ApiError::ValidationError(format!(
                    "Field '{field}' is listed as changed but has no new value"
                )));
            }
        }
        Ok(())
    }

    /// Writes the new values into `target`.
    ///
    /// Only fields listed in `changed_fields` are touched; any other key of
    /// `new_values` is ignored.
    pub fn apply_to(&self, target: &mut Map<String, Value>) -> ApiResult<()> {
        self.validate()?;
        for field in &self.changed_fields {
            if let Some(value) = self.new_values.get(field) {
                target.insert(field.clone(), normalize(field, value)?);
            }
        }
        Ok(())
    }
}

/// Decimal fields are compared and stored in their canonical string form so
/// that `300`, `300.0` and `"300"` are the same value.
fn normalize(field: &str, value: &Value) -> ApiResult<Value> {
    if !DECIMAL_FIELDS.contains(&field) {
        return Ok(value.clone());
    }
    let decimal = match value {
        Value::Null => return Ok(Value::Null),
        Value::Number(number) => Decimal::from_str(&number.to_string()),
        Value::String(text) => Decimal::from_str(text.trim()),
        _ => {
            return Err(ApiError::ValidationError(format!(
                "Field '{field}' must be a decimal number"
            )))
        }
    }
    .map_err(|_| ApiError::ValidationError(format!("Field '{field}' must be a decimal number")))?;

    Ok(Value::String(decimal.normalize().to_string()))
}
