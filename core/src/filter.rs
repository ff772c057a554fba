//! Status filter over the canonical todo list.
//!
//! The filtered view is always computed from the list on read; nothing in
//! the store keeps a second, filtered copy.

use crate::types::Todo;

/// Which todos the presentation layer is currently showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }

    /// Items of `todos` selected by this filter, in list order.
    pub fn project(self, todos: &[Todo]) -> Vec<&Todo> {
        todos.iter().filter(|todo| self.matches(todo)).collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }
}
