use std::collections::HashMap;

use crate::codec::CanonicalRecord;
use crate::identity::{IdentityKey, IdentityPayload, to_identity};
use crate::schema::BomSchema;

/// Supplier part numbers of a trusted sample BOM, keyed by part identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleIndex {
    entries: HashMap<IdentityKey, IdentityPayload>,
}

impl SampleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index decoded sample rows. A later row with the same identity replaces an earlier one.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = (&'a CanonicalRecord, u64)>,
        schema: &BomSchema,
    ) -> Self {
        let mut index = Self::new();
        for (record, quantity) in records {
            let (key, payload) = to_identity(record, quantity, schema);
            index.insert(key, payload);
        }
        index
    }

    pub fn insert(&mut self, key: IdentityKey, payload: IdentityPayload) {
        if let Some(previous) = self.entries.get(&key) {
            if previous.parts != payload.parts {
                log::warn!(
                    "Sample BOM lists '{key}' twice with different part numbers, using the last one"
                );
            }
        }
        self.entries.insert(key, payload);
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&IdentityPayload> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fill backfillable fields of `records` from the sample.
///
/// Records whose identity the sample does not know are returned unchanged.
/// Quantities and identity fields are never touched.
pub fn backfill(
    sample: &SampleIndex,
    records: Vec<(CanonicalRecord, u64)>,
    schema: &BomSchema,
) -> Vec<(CanonicalRecord, u64)> {
    records
        .into_iter()
        .map(|(mut record, quantity)| {
            let (key, _) = to_identity(&record, quantity, schema);
            match sample.get(&key) {
                Some(found) => {
                    for (n, &index) in schema.backfillable.iter().enumerate() {
                        if let Some(part) = found.part(n) {
                            record.set_field(index, part);
                        }
                    }
                    log::trace!("Backfilled '{key}'");
                }
                None => log::trace!("No sample entry for '{key}'"),
            }
            (record, quantity)
        })
        .collect()
}
