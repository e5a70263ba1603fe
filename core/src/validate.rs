//! Required-field validation.
//!
//! Purely structural: a field is present when it is non-null. The `details`
//! bag and cross-referenced models are never inspected.

use crate::hydrate::Model;

/// Outcome of validating one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    /// Required fields that were null, in declaration order.
    pub missing_fields: Vec<&'static str>,
}

impl Validation {
    /// Human-readable complaints, one per missing field.
    pub fn messages(&self) -> Vec<String> {
        self.missing_fields
            .iter()
            .map(|field| format!("{field} can't be blank"))
            .collect()
    }
}

pub fn validate<M: Model>(model: &M) -> Validation {
    let missing_fields: Vec<&'static str> = M::REQUIRED
        .iter()
        .copied()
        .filter(|field| model.field(field).is_none())
        .collect();
    Validation {
        valid: missing_fields.is_empty(),
        missing_fields,
    }
}
