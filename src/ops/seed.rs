use crate::io::store::{EntityStore, StoreError};
use crate::model::label::{DEFAULT_LABELS, NewLabel};

/// What a bootstrap run did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    /// Ids of labels created by this run
    pub labels_created: Vec<String>,
}

/// First-run setup: create the default labels when the board has none, and
/// make sure the note exists. Safe to run repeatedly.
pub fn bootstrap<S: EntityStore>(store: &mut S, seed_labels: bool) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    if seed_labels && store.list_labels()?.is_empty() {
        for (id, name, color) in DEFAULT_LABELS {
            let label = store.create_label(NewLabel {
                id: Some(id.to_string()),
                name: name.to_string(),
                color,
            })?;
            report.labels_created.push(label.id);
        }
        tracing::info!(count = report.labels_created.len(), "default labels created");
    }

    store.get_note()?;
    Ok(report)
}
