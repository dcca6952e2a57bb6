use std::cmp::Ordering;

use chrono::{Local, NaiveDate};

use crate::model::task::Task;

/// Urgency of a task with no due date
pub const NO_DUE_DATE: i64 = i64::MAX;

/// Today's date on the local calendar
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Days until the task is due (negative once past due), or [`NO_DUE_DATE`].
pub fn urgency(task: &Task, today: NaiveDate) -> i64 {
    match task.due_date {
        Some(due) => (due - today).num_days(),
        None => NO_DUE_DATE,
    }
}

pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    urgency(task, today) < 0
}

/// Board order: overdue first, then priority (high first), then oldest
/// first. Ties on all three fall back to id so the order is total.
pub fn compare(a: &Task, b: &Task, today: NaiveDate) -> Ordering {
    // `true` sorts after `false`, so compare the negation
    (!is_overdue(a, today))
        .cmp(&!is_overdue(b, today))
        .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort one column's tasks in board order
pub fn order(mut tasks: Vec<Task>, today: NaiveDate) -> Vec<Task> {
    tasks.sort_by(|a, b| compare(a, b, today));
    tasks
}

/// Borrowing variant of [`order`]
pub fn order_refs(tasks: &mut [&Task], today: NaiveDate) {
    tasks.sort_by(|a, b| compare(a, b, today));
}
