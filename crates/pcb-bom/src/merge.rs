use std::collections::HashMap;

use serde::Serialize;

use crate::codec::CanonicalRecord;
use crate::identity::{from_identity, to_identity};
use crate::schema::BomSchema;
use crate::BomError;

/// Quantities keyed by record, iterated in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BomTable {
    entries: Vec<(CanonicalRecord, u64)>,
    index: HashMap<CanonicalRecord, usize>,
}

impl BomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold decoded rows into a table; identical records add up.
    pub fn from_records(
        records: impl IntoIterator<Item = (CanonicalRecord, u64)>,
    ) -> Result<Self, BomError> {
        let mut table = Self::new();
        for (record, quantity) in records {
            table.merge_row(record, quantity)?;
        }
        Ok(table)
    }

    pub fn merge_row(&mut self, key: CanonicalRecord, quantity: u64) -> Result<(), BomError> {
        match self.index.get(&key) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.1 = entry
                    .1
                    .checked_add(quantity)
                    .ok_or_else(|| BomError::QuantityOverflow {
                        key: entry.0.to_string(),
                    })?;
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, quantity));
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &CanonicalRecord) -> Option<u64> {
        self.index.get(key).map(|&i| self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalRecord, u64)> {
        self.entries.iter().map(|(record, quantity)| (record, *quantity))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all quantities, widened so distinct entries cannot overflow it.
    pub fn total_quantity(&self) -> u128 {
        self.entries.iter().map(|(_, q)| u128::from(*q)).sum()
    }
}

#[derive(Serialize)]
struct TableRow<'a> {
    fields: &'a CanonicalRecord,
    quantity: u64,
}

impl Serialize for BomTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.iter()
                .map(|(fields, quantity)| TableRow { fields, quantity }),
        )
    }
}

pub fn merge_row(
    table: &mut BomTable,
    key: CanonicalRecord,
    quantity: u64,
) -> Result<(), BomError> {
    table.merge_row(key, quantity)
}

/// Add a project's entries to the master, merging entries that differ only by designator.
pub fn fold_into_master(
    master: &mut BomTable,
    project: &BomTable,
    schema: &BomSchema,
) -> Result<(), BomError> {
    for (record, quantity) in project.iter() {
        let (key, payload) = to_identity(record, quantity, schema);
        let (master_key, master_quantity) = from_identity(&key, &payload, schema)?;
        master.merge_row(master_key, master_quantity)?;
    }
    Ok(())
}
