use crate::io::store::EntityStore;
use crate::model::label::{Label, LabelColor, NewLabel};
use crate::ops::board::{BoardError, non_blank};

/// Look up each of `ids` in `labels`, keeping the task's order. Ids with no
/// matching label are skipped.
pub fn resolve_labels<'a>(ids: &[String], labels: &'a [Label]) -> Vec<&'a Label> {
    ids.iter()
        .filter_map(|id| labels.iter().find(|l| &l.id == id))
        .collect()
}

/// Find a label by id, or by case-insensitive name
pub fn find_label<'a>(labels: &'a [Label], key: &str) -> Option<&'a Label> {
    labels
        .iter()
        .find(|l| l.id == key)
        .or_else(|| labels.iter().find(|l| l.name.eq_ignore_ascii_case(key)))
}

pub fn add_label<S: EntityStore>(
    store: &mut S,
    name: &str,
    color: LabelColor,
) -> Result<Label, BoardError> {
    let name = non_blank("label name", name)?;
    let label = store.create_label(NewLabel {
        id: None,
        name,
        color,
    })?;
    tracing::debug!(label = %label.id, "label created");
    Ok(label)
}
