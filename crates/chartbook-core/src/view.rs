//! Expand/collapse state and flattening for display
//!
//! The forest itself carries no view state. Which groups are expanded is a
//! separate [`ViewState`], and [`flatten`] takes both to produce the single
//! ordered list an indented table renders.

use std::collections::HashSet;

use serde::Serialize;

use crate::forest::{AccountId, Forest};
use crate::types::RootType;

/// Set of expanded group accounts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    expanded: HashSet<AccountId>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: AccountId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn set_expanded(&mut self, id: AccountId, expanded: bool) {
        if expanded {
            self.expanded.insert(id);
        } else {
            self.expanded.remove(&id);
        }
    }

    /// Flip the expand flag of a group account; detail accounts are ignored.
    /// Returns the new state.
    pub fn toggle(&mut self, forest: &Forest, id: AccountId) -> bool {
        let is_group = forest.get(id).map(|a| a.is_group()).unwrap_or(false);
        if !is_group {
            return false;
        }
        let expanded = !self.is_expanded(id);
        self.set_expanded(id, expanded);
        expanded
    }

    /// Expand every reachable group account
    pub fn expand_all(&mut self, forest: &Forest) {
        self.expanded.extend(forest.groups());
    }

    /// Collapse every reachable group account
    pub fn collapse_all(&mut self, forest: &Forest) {
        for id in forest.groups() {
            self.expanded.remove(&id);
        }
    }

    /// Drop state held for an account that no longer exists
    pub fn forget(&mut self, id: AccountId) {
        self.expanded.remove(&id);
    }

    /// True when every group in the forest is expanded
    pub fn all_expanded(&self, forest: &Forest) -> bool {
        forest.groups().all(|id| self.is_expanded(id))
    }

    /// True when no group in the forest is expanded
    pub fn all_collapsed(&self, forest: &Forest) -> bool {
        forest.groups().all(|id| !self.is_expanded(id))
    }
}

/// One account in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatAccount {
    #[serde(skip)]
    pub id: AccountId,
    pub name: String,
    /// Ancestor count from the forest root
    pub level: usize,
    /// Sibling index of each ancestor, then of the account itself
    pub location: Vec<usize>,
    pub is_group: bool,
    pub expanded: bool,
    pub root_type: RootType,
}

/// Pre-order traversal emitting a group's children only while it is expanded
pub fn flatten(forest: &Forest, view: &ViewState) -> Vec<FlatAccount> {
    let mut out = Vec::new();
    flatten_into(forest, view, forest.roots(), &[], &mut out);
    out
}

fn flatten_into(
    forest: &Forest,
    view: &ViewState,
    ids: &[AccountId],
    parent_location: &[usize],
    out: &mut Vec<FlatAccount>,
) {
    for (i, id) in ids.iter().enumerate() {
        let Some(account) = forest.get(*id) else {
            continue;
        };
        let mut location = parent_location.to_vec();
        location.push(i);
        let expanded = account.is_group() && view.is_expanded(*id);

        out.push(FlatAccount {
            id: *id,
            name: account.name.clone(),
            level: parent_location.len(),
            location: location.clone(),
            is_group: account.is_group(),
            expanded,
            root_type: account.root_type,
        });

        if expanded {
            flatten_into(forest, view, forest.children(*id), &location, out);
        }
    }
}
