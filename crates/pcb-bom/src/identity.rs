//! Identity keys: the part of a BOM record that says which part it is.
//!
//! A record splits into an [`IdentityKey`] (every field except the supplier
//! part numbers, with the designator blanked) and an [`IdentityPayload`] (the
//! supplier part numbers plus the quantity). [`from_identity`] is the exact
//! inverse of [`to_identity`] for records whose designator is already blank.

use serde::{Deserialize, Serialize};

use crate::codec::CanonicalRecord;
use crate::schema::BomSchema;
use crate::BomError;

/// Fields identifying a part, in schema order, backfillable fields skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(Vec<String>);

impl IdentityKey {
    pub fn new(fragments: Vec<String>) -> Self {
        Self(fragments)
    }

    pub fn fragments(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(";"))
    }
}

/// Data attached to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityPayload {
    /// Backfillable field values, last declared field first.
    pub parts: Vec<String>,
    pub quantity: u64,
}

impl IdentityPayload {
    /// Value of the `n`th backfillable field in declaration order.
    pub fn part(&self, n: usize) -> Option<&str> {
        let len = self.parts.len();
        (n < len).then(|| self.parts[len - 1 - n].as_str())
    }
}

pub fn to_identity(
    record: &CanonicalRecord,
    quantity: u64,
    schema: &BomSchema,
) -> (IdentityKey, IdentityPayload) {
    let mut key = Vec::with_capacity(schema.identity_len());
    let mut parts = Vec::with_capacity(schema.backfillable.len());

    for (i, field) in record.fields().iter().enumerate() {
        if schema.is_backfillable(i) {
            parts.insert(0, field.clone());
        } else if i == schema.ignored {
            key.push(String::new());
        } else {
            key.push(field.clone());
        }
    }

    (IdentityKey(key), IdentityPayload { parts, quantity })
}

/// Rebuild a record from its identity. The designator comes back empty.
///
/// Keys shorter than [`BomSchema::identity_len`] are padded with empty fields.
pub fn from_identity(
    key: &IdentityKey,
    payload: &IdentityPayload,
    schema: &BomSchema,
) -> Result<(CanonicalRecord, u64), BomError> {
    if key.0.len() > schema.identity_len() {
        return Err(BomError::InvalidSchema(format!(
            "identity key '{key}' has {} fields, schema allows {}",
            key.0.len(),
            schema.identity_len()
        )));
    }
    if payload.parts.len() != schema.backfillable.len() {
        return Err(BomError::InvalidSchema(format!(
            "identity '{key}' carries {} part numbers, schema expects {}",
            payload.parts.len(),
            schema.backfillable.len()
        )));
    }

    let mut fragments = key.0.iter();
    let mut parts = payload.parts.iter().rev();
    let record = (0..schema.field_count)
        .map(|i| {
            let next = if schema.is_backfillable(i) {
                parts.next()
            } else {
                fragments.next()
            };
            if i == schema.ignored {
                String::new()
            } else {
                next.cloned().unwrap_or_default()
            }
        })
        .collect();

    Ok((record, payload.quantity))
}
