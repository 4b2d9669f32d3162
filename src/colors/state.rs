//! ColorState - assignment table, pending buffer and allocator in one place

use std::collections::HashSet;

use super::allocator::ColorAllocator;
use super::cache::{merge_into, AssignmentTable, PendingBuffer};
use crate::core::QrColors;

/// Result of one lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub colors: QrColors,
    /// A new color went into the pending buffer and needs a merge
    pub allocated: bool,
}

impl Resolution {
    fn existing(colors: QrColors) -> Self { Self { colors, allocated: false } }
}

#[derive(Debug)]
pub struct ColorState {
    table: AssignmentTable,
    pending: PendingBuffer,
    allocator: ColorAllocator,
    privileged: HashSet<String>,
}

impl ColorState {
    pub fn new<I, S>(allocator: ColorAllocator, privileged: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: AssignmentTable::new(),
            pending: PendingBuffer::new(),
            allocator,
            privileged: privileged.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_privileged(&self, identifier: &str) -> bool { self.privileged.contains(identifier) }

    /// Table first, then pending, then allocate.
    pub fn resolve(&mut self, identifier: Option<&str>) -> Resolution {
        let id = match identifier {
            Some(id) if !id.is_empty() => id,
            _ => return Resolution::existing(QrColors::neutral()),
        };

        if self.is_privileged(id) {
            return Resolution::existing(QrColors::privileged());
        }

        if let Some(color) = self.table.get(id).or_else(|| self.pending.get(id)) {
            return Resolution::existing(QrColors::assigned(color.clone()));
        }

        let color = self.allocator.generate();
        self.pending.insert(id.to_string(), color.clone());
        Resolution { colors: QrColors::assigned(color), allocated: true }
    }

    /// Install the persisted table. Persisted colors take precedence over
    /// anything allocated before the load finished.
    pub fn apply_loaded(&mut self, mut loaded: AssignmentTable) {
        // Privileged addresses never hold a generated color.
        let before = loaded.len();
        loaded.retain(|id, _| !self.privileged.contains(id));
        if loaded.len() != before {
            tracing::debug!(dropped = before - loaded.len(), "ignored stored colors for privileged addresses");
        }
        self.allocator.used_mut().extend(loaded.values().cloned());
        let superseded: Vec<String> = self
            .pending
            .keys()
            .chain(self.table.keys())
            .filter(|id| loaded.contains_key(*id))
            .cloned()
            .collect();
        for id in &superseded {
            self.pending.remove(id);
        }
        if !superseded.is_empty() {
            tracing::warn!(count = superseded.len(), "early allocations replaced by persisted colors");
        }
        self.table.extend(loaded);
    }

    pub fn has_pending(&self) -> bool { !self.pending.is_empty() }

    /// Move the pending buffer into the table and return a snapshot to persist.
    pub fn merge_pending(&mut self) -> AssignmentTable {
        let pending = std::mem::take(&mut self.pending);
        merge_into(&mut self.table, pending);
        self.table.clone()
    }

    /// Table plus not-yet-merged allocations
    pub fn snapshot(&self) -> AssignmentTable {
        let mut all = self.table.clone();
        all.extend(self.pending.iter().map(|(k, v)| (k.clone(), v.clone())));
        all
    }

    pub fn table(&self) -> &AssignmentTable { &self.table }

    pub fn pending(&self) -> &PendingBuffer { &self.pending }

    pub fn allocator(&self) -> &ColorAllocator { &self.allocator }
}
