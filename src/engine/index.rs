use std::collections::HashMap;

use log::{debug, warn};

use crate::engine::protection::ProtectionLevel;
use crate::engine::shortcut::{RawShortcut, ShortcutRecord};
use crate::keyboard::combo::NormalizedCombo;
use crate::keyboard::platform::Os;

/// Read-only shortcut dictionary for one (application, OS) pair.
///
/// Records keep their catalog order. `by_combo` resolves exact matches and
/// `by_prefix` lists records under every ordered prefix of their modifier list,
/// so holding `Ctrl` lists `Ctrl+C` as well as `Ctrl+Shift+T`.
#[derive(Clone, Debug)]
pub struct ShortcutIndex {
    app: String,
    os: Os,
    records: Vec<ShortcutRecord>,
    by_combo: HashMap<NormalizedCombo, usize>,
    by_prefix: HashMap<NormalizedCombo, Vec<usize>>,
}

impl ShortcutIndex {
    /// Build from catalog entries, skipping (and logging) malformed ones.
    pub fn build(app: &str, os: Os, raw: &[RawShortcut]) -> Self {
        let records = raw
            .iter()
            .enumerate()
            .filter_map(|(pos, entry)| match ShortcutRecord::from_raw(app, entry, os) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("{app}: skipping shortcut #{pos}: {err}");
                    None
                }
            })
            .collect();
        Self::from_records(app, os, records)
    }

    /// Build from already-validated records. Later duplicates of a combo are dropped.
    pub fn from_records(app: &str, os: Os, records: Vec<ShortcutRecord>) -> Self {
        let mut index = Self {
            app: app.to_string(),
            os,
            records: Vec::with_capacity(records.len()),
            by_combo: HashMap::with_capacity(records.len()),
            by_prefix: HashMap::new(),
        };

        for record in records {
            if record.combo.is_empty() {
                warn!("{app}: skipping {:?} with an empty combo", record.description);
                continue;
            }
            if let Some(&existing) = index.by_combo.get(&record.combo) {
                warn!(
                    "{app}: duplicate combo {} ({:?}), keeping {:?}",
                    record.combo, record.description, index.records[existing].description
                );
                continue;
            }

            let slot = index.records.len();
            index.by_combo.insert(record.combo.clone(), slot);
            for prefix in record.combo.modifier_prefixes() {
                index.by_prefix.entry(prefix).or_default().push(slot);
            }
            index.records.push(record);
        }

        debug!("{app}: indexed {} shortcuts for {}", index.records.len(), os.as_str());
        index
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn os(&self) -> Os {
        self.os
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ShortcutRecord] {
        &self.records
    }

    pub fn get(&self, combo: &NormalizedCombo) -> Option<&ShortcutRecord> {
        self.by_combo.get(combo).map(|&i| &self.records[i])
    }

    /// Records whose modifier list starts with `prefix`, in catalog order, capped at `limit`.
    pub fn with_prefix(&self, prefix: &NormalizedCombo, limit: usize) -> Vec<&ShortcutRecord> {
        self.by_prefix
            .get(prefix)
            .map(|slots| slots.iter().take(limit).map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    pub fn sequential(&self) -> impl Iterator<Item = &ShortcutRecord> {
        self.records.iter().filter(|r| r.is_sequential())
    }

    /// Effective protection of a record on this index's OS.
    pub fn protection(&self, record: &ShortcutRecord) -> ProtectionLevel {
        record.protection_on(self.os)
    }
}
