use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};

use crate::model::task::{Priority, Task};

/// Priority clause of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

/// Criteria a task must satisfy to be shown. Clauses are AND-ed; an empty
/// spec matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    /// Case-insensitive literal text matched against title or description
    pub search: String,
    pub priority: PriorityFilter,
    /// A task matches when it carries at least one of these label ids
    pub labels: BTreeSet<String>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.priority == PriorityFilter::All
            && self.labels.is_empty()
    }

    /// Prepare the filter for matching many tasks
    pub fn compile(&self) -> CompiledFilter<'_> {
        let search = if self.search.trim().is_empty() {
            None
        } else {
            Some(search_regex(&self.search))
        };
        CompiledFilter { spec: self, search }
    }
}

/// Literal, case-insensitive matcher for the search text
fn search_regex(needle: &str) -> SearchMatcher {
    match RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => SearchMatcher::Regex(re),
        // Only reachable when the escaped text exceeds the regex size limit
        Err(_) => SearchMatcher::Lowercase(needle.to_lowercase()),
    }
}

#[derive(Debug)]
enum SearchMatcher {
    Regex(Regex),
    Lowercase(String),
}

impl SearchMatcher {
    fn is_match(&self, haystack: &str) -> bool {
        match self {
            SearchMatcher::Regex(re) => re.is_match(haystack),
            SearchMatcher::Lowercase(needle) => haystack.to_lowercase().contains(needle),
        }
    }
}

/// A [`FilterSpec`] with its search text compiled once
#[derive(Debug)]
pub struct CompiledFilter<'a> {
    spec: &'a FilterSpec,
    search: Option<SearchMatcher>,
}

impl CompiledFilter<'_> {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(search) = &self.search {
            let in_title = search.is_match(&task.title);
            let in_description = task
                .description
                .as_deref()
                .is_some_and(|d| search.is_match(d));
            if !in_title && !in_description {
                return false;
            }
        }

        if let PriorityFilter::Only(priority) = self.spec.priority
            && task.priority != priority
        {
            return false;
        }

        if !self.spec.labels.is_empty()
            && !task.labels.iter().any(|l| self.spec.labels.contains(l))
        {
            return false;
        }

        true
    }
}

/// Tasks matching `spec`, in input order
pub fn filter(tasks: &[Task], spec: &FilterSpec) -> Vec<Task> {
    filter_refs(tasks, spec).into_iter().cloned().collect()
}

/// Borrowing variant of [`filter`]
pub fn filter_refs<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    spec: &FilterSpec,
) -> Vec<&'a Task> {
    let compiled = spec.compile();
    tasks.into_iter().filter(|t| compiled.matches(t)).collect()
}
