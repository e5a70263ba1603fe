//! Generic hydration of models from loosely-structured payloads.
//!
//! # Design
//! A model describes itself through [`Model`]: the allow-list of scalar
//! fields it declares, the fields required for validity, and a small table
//! of structural strategies keyed by payload key. Hydration walks the
//! payload once:
//!
//! 1. blank strings become `null`;
//! 2. a declared field is assigned directly;
//! 3. a key in the strategy table is handed to that strategy (splitting,
//!    unwrapping, or hydrating an embedded model);
//! 4. anything else lands verbatim in the model's `details` bag.
//!
//! Unknown keys therefore never fail hydration. Only a payload whose shape
//! cannot be walked at all (not an object, or a nested object where a
//! scalar field is declared) is a `MalformedResponse`.

use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::payload::{blank_to_null, kind_of, normalize_map};
use crate::validate::{validate, Validation};

/// Open-ended extension bag for keys a model does not declare.
pub type Details = Map<String, Value>;

/// Model-specific handling for one payload key.
pub type Strategy<M> = fn(&mut M, Value) -> Result<()>;

/// Declarative schema of a hydratable model.
///
/// Implementations normally use [`model_fields!`](crate::model_fields) for
/// the field allow-list and only spell out the names, required set, and
/// strategy table by hand.
pub trait Model: Default + 'static {
    /// Singular payload name, e.g. `Entity`.
    const NAME: &'static str;
    /// Plural wrapper name, e.g. `Entities`.
    const PLURAL: &'static str;
    /// Scalar fields assigned directly from same-named payload keys.
    const FIELDS: &'static [&'static str];
    /// Fields that must be non-null for the model to be valid.
    const REQUIRED: &'static [&'static str];
    /// Structural cases checked after the field allow-list.
    const STRATEGIES: &'static [(&'static str, Strategy<Self>)] = &[];

    fn field_slot(&mut self, name: &str) -> Option<&mut Option<String>>;

    /// Value of a declared field; `None` when null or not declared.
    fn field(&self, name: &str) -> Option<&str>;

    fn details(&self) -> &Details;

    fn details_mut(&mut self) -> &mut Details;

    fn validate(&self) -> Validation {
        validate(self)
    }

    fn is_valid(&self) -> bool {
        self.validate().valid
    }
}

/// Implement the field allow-list half of [`Model`] for a struct whose
/// scalar fields are all `Option<String>`.
#[macro_export]
macro_rules! model_fields {
    ($($field:ident),+ $(,)?) => {
        const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

        fn field_slot(&mut self, name: &str) -> Option<&mut Option<String>> {
            $(
                if name == stringify!($field) {
                    return Some(&mut self.$field);
                }
            )+
            None
        }

        fn field(&self, name: &str) -> Option<&str> {
            $(
                if name == stringify!($field) {
                    return self.$field.as_deref();
                }
            )+
            None
        }

        fn details(&self) -> &$crate::hydrate::Details {
            &self.details
        }

        fn details_mut(&mut self) -> &mut $crate::hydrate::Details {
            &mut self.details
        }
    };
}

/// Hydrate one model from a payload value, which must be an object.
pub fn hydrate<M: Model>(payload: Value) -> Result<M> {
    match payload {
        Value::Object(map) => hydrate_map(map),
        other => Err(ApiError::malformed(format!(
            "cannot hydrate {} from {}",
            M::NAME,
            kind_of(&other)
        ))),
    }
}

pub fn hydrate_map<M: Model>(map: Map<String, Value>) -> Result<M> {
    let mut model = M::default();
    for (key, value) in normalize_map(map) {
        let value = blank_to_null(value);
        if let Some(slot) = model.field_slot(&key) {
            *slot = scalar_text::<M>(&key, value)?;
        } else if let Some((_, strategy)) = M::STRATEGIES.iter().find(|(name, _)| *name == key) {
            strategy(&mut model, value)?;
        } else {
            model.details_mut().insert(key, value);
        }
    }
    Ok(model)
}

/// Hydrate every element of an already-uniform sequence, preserving order.
pub fn hydrate_many<M: Model>(payloads: Vec<Value>) -> Result<Vec<M>> {
    payloads.into_iter().map(hydrate).collect()
}

/// Declared fields stay string-typed; callers coerce numbers and dates.
fn scalar_text<M: Model>(key: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(if b { "1" } else { "0" }.to_string())),
        other => Err(ApiError::malformed(format!(
            "{}.{key} is {}, expected a scalar",
            M::NAME,
            kind_of(&other)
        ))),
    }
}
