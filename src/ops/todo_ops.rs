use crate::io::store::EntityStore;
use crate::model::todo::{Todo, TodoPatch};
use crate::ops::board::{BoardError, non_blank};

/// Display order: open todos first, then oldest first
pub fn order_todos(mut todos: Vec<Todo>) -> Vec<Todo> {
    todos.sort_by(|a, b| {
        a.completed
            .cmp(&b.completed)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    todos
}

pub fn add_todo<S: EntityStore>(store: &mut S, text: &str) -> Result<Todo, BoardError> {
    let text = non_blank("todo text", text)?;
    Ok(store.create_todo(&text)?)
}

pub fn edit_todo<S: EntityStore>(store: &mut S, id: &str, text: &str) -> Result<Todo, BoardError> {
    let text = non_blank("todo text", text)?;
    let patch = TodoPatch {
        text: Some(text),
        ..Default::default()
    };
    Ok(store.update_todo(id, patch)?)
}

/// Flip a todo's completed flag
pub fn toggle_todo<S: EntityStore>(store: &mut S, id: &str) -> Result<Todo, BoardError> {
    let current = store
        .list_todos()?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| BoardError::not_found("todo", id))?;
    let patch = TodoPatch {
        completed: Some(!current.completed),
        ..Default::default()
    };
    Ok(store.update_todo(id, patch)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn todo(id: &str, completed: bool, secs: i64) -> Todo {
        Todo {
            id: id.into(),
            text: id.into(),
            completed,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs),
        }
    }

    #[test]
    fn open_todos_sort_before_done() {
        let todos = vec![
            todo("done-old", true, 0),
            todo("open-new", false, 20),
            todo("open-old", false, 10),
        ];
        let ids: Vec<String> = order_todos(todos).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["open-old", "open-new", "done-old"]);
    }

    #[test]
    fn toggle_flips_completion() {
        let mut store = MemoryStore::new();
        let t = add_todo(&mut store, "buy milk").unwrap();
        assert!(toggle_todo(&mut store, &t.id).unwrap().completed);
        assert!(!toggle_todo(&mut store, &t.id).unwrap().completed);
    }

    #[test]
    fn blank_text_is_rejected() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            add_todo(&mut store, "\t"),
            Err(BoardError::Validation(_))
        ));
        let t = add_todo(&mut store, "x").unwrap();
        assert!(matches!(
            edit_todo(&mut store, &t.id, ""),
            Err(BoardError::Validation(_))
        ));
    }

    #[test]
    fn toggle_unknown_is_not_found() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            toggle_todo(&mut store, "nope"),
            Err(BoardError::NotFound { .. })
        ));
    }
}
