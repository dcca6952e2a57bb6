use indexmap::IndexSet;

/// Set of selected task ids, kept in the order they were selected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = String>) -> Self {
        Selection {
            ids: ids.into_iter().collect(),
        }
    }

    /// Add the id if absent, remove it if present. Returns whether it is now
    /// selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.shift_remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop one id, e.g. after the task is archived or deleted
    pub fn forget(&mut self, id: &str) -> bool {
        self.ids.shift_remove(id)
    }

    /// Keep only ids the predicate recognizes. Returns how many were dropped.
    pub fn retain_known(&mut self, is_known: impl Fn(&str) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| is_known(id));
        before - self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Selected ids in selection order
    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
