//! The editable, checkable list of model identifiers.

/// One entry in the model checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    /// Model identifier (case-sensitive, unique within the list).
    pub id: String,
    /// Whether the entry is selected for the next run.
    pub checked: bool,
}

/// Ordered set of unique model identifiers with per-entry check state.
///
/// Identifiers are trimmed on entry; blanks and case-sensitive duplicates
/// are dropped, first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelList {
    entries: Vec<ModelEntry>,
}

impl ModelList {
    /// Build a list from identifiers, all unchecked.
    #[must_use]
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for id in ids {
            list.add(id.as_ref());
        }
        list
    }

    /// Replace the identifiers wholesale, preserving the check state of
    /// entries that survive the replacement.
    pub fn update<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let previous = std::mem::take(&mut self.entries);
        for id in ids {
            self.add(id.as_ref());
        }
        for entry in &mut self.entries {
            if previous.iter().any(|p| p.id == entry.id && p.checked) {
                entry.checked = true;
            }
        }
    }

    /// Append an identifier. Returns false when it is blank or already
    /// present.
    pub fn add(&mut self, id: &str) -> bool {
        let id = id.trim();
        if id.is_empty() || self.entries.iter().any(|e| e.id == id) {
            return false;
        }
        self.entries.push(ModelEntry {
            id: id.to_string(),
            checked: false,
        });
        true
    }

    /// Remove the entry at `index`, if any.
    pub fn remove(&mut self, index: usize) {
        if index < self.entries.len() {
            self.entries.remove(index);
        }
    }

    /// Flip the check state of the entry at `index`, if any.
    pub fn toggle(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.checked = !entry.checked;
        }
    }

    /// Check every entry.
    pub fn check_all(&mut self) {
        for entry in &mut self.entries {
            entry.checked = true;
        }
    }

    /// Uncheck every entry.
    pub fn clear_checks(&mut self) {
        for entry in &mut self.entries {
            entry.checked = false;
        }
    }

    /// Identifiers of checked entries, in list order.
    #[must_use]
    pub fn checked_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.checked)
            .map(|e| e.id.clone())
            .collect()
    }

    /// All identifiers, in list order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
