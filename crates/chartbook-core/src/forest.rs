//! Arena-backed forest of accounts
//!
//! Accounts live in slots addressed by stable [`AccountId`]s. Each node owns
//! the ordered list of its children's ids and a back-reference to its parent;
//! a name index gives O(1) lookup by the forest-wide unique name. Ids are
//! never reused, so an id held by a view or pending edit can go stale but can
//! never point at a different account.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::models::{Account, AccountRecord};
use crate::types::{AccountKind, RootType};
use crate::view::ViewState;

/// Stable handle to an account inside a [`Forest`]
///
/// Slots of deleted accounts are not reclaimed while the forest lives;
/// rebuilding through [`Forest::from_records`] packs the arena again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(usize);

#[derive(Debug, Clone)]
struct Node {
    account: Account,
    parent: Option<AccountId>,
    children: Vec<AccountId>,
}

/// Ordered, multi-root tree of accounts
#[derive(Debug, Clone, Default)]
pub struct Forest {
    nodes: Vec<Option<Node>>,
    roots: Vec<AccountId>,
    index: HashMap<String, AccountId>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts in the forest
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn roots(&self) -> &[AccountId] {
        &self.roots
    }

    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.node(id).map(|n| &n.account)
    }

    pub fn parent(&self, id: AccountId) -> Option<AccountId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of `id` in display order; empty for detail accounts
    pub fn children(&self, id: AccountId) -> &[AccountId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Exact, case-sensitive lookup
    pub fn find(&self, name: &str) -> Option<AccountId> {
        self.index.get(name).copied()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Account> {
        self.find(name).and_then(|id| self.get(id))
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: AccountId) -> Vec<AccountId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Number of ancestors between `id` and its forest root
    pub fn level(&self, id: AccountId) -> usize {
        self.ancestors(id).len()
    }

    /// All descendants of `id` in pre-order, excluding `id` itself
    pub fn descendants(&self, id: AccountId) -> Vec<AccountId> {
        let mut out = Vec::new();
        let mut stack: Vec<AccountId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Every account in pre-order, ignoring expand/collapse state
    pub fn iter(&self) -> impl Iterator<Item = (AccountId, &Account)> + '_ {
        let mut order = Vec::with_capacity(self.len());
        for root in &self.roots {
            order.push(*root);
            order.extend(self.descendants(*root));
        }
        order
            .into_iter()
            .filter_map(move |id| self.get(id).map(|a| (id, a)))
    }

    /// Every group account in pre-order
    pub fn groups(&self) -> impl Iterator<Item = AccountId> + '_ {
        self.iter()
            .filter(|(_, account)| account.is_group())
            .map(|(id, _)| id)
    }

    /// Detail accounts in pre-order, optionally limited to one root type
    pub fn detail_accounts(
        &self,
        root_type: Option<RootType>,
    ) -> impl Iterator<Item = &Account> + '_ {
        self.iter()
            .map(|(_, account)| account)
            .filter(move |a| !a.is_group() && root_type.map_or(true, |rt| a.root_type == rt))
    }

    /// Append `account` under `parent`, or as a new root when `parent` is `None`.
    ///
    /// Nothing is mutated unless every check passes.
    pub fn insert(&mut self, parent: Option<&str>, account: Account) -> CoreResult<AccountId> {
        let name = account.name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Account name is required"));
        }
        if self.contains(name) {
            return Err(CoreError::validation(format!(
                "An account named '{}' already exists",
                name
            )));
        }

        let parent_id = match parent {
            None => None,
            Some(parent_name) => {
                let id = self.find(parent_name).ok_or_else(|| {
                    CoreError::validation(format!(
                        "Parent account '{}' does not exist",
                        parent_name
                    ))
                })?;
                if !self.node(id).map(|n| n.account.is_group()).unwrap_or(false) {
                    return Err(CoreError::validation(format!(
                        "'{}' is a detail account and cannot have child accounts",
                        parent_name
                    )));
                }
                Some(id)
            }
        };

        let account = Account {
            name: name.to_string(),
            ..account
        };
        let id = AccountId(self.nodes.len());
        log::debug!(
            "Inserting account '{}' under {}",
            account.name,
            parent.unwrap_or("<root>")
        );
        self.index.insert(account.name.clone(), id);
        self.nodes.push(Some(Node {
            account,
            parent: parent_id,
            children: Vec::new(),
        }));
        match parent_id {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        Ok(id)
    }

    /// Remove a childless account, returning it
    pub fn delete(&mut self, name: &str) -> CoreResult<Account> {
        let id = self.find(name).ok_or_else(|| CoreError::not_found(name))?;
        if !self.children(id).is_empty() {
            return Err(CoreError::ConstraintViolation {
                name: name.to_string(),
            });
        }

        let node = self.nodes[id.0]
            .take()
            .ok_or_else(|| CoreError::InternalError {
                message: format!("index points at an empty slot for '{}'", name),
            })?;
        match node.parent.and_then(|p| self.node_mut(p)) {
            Some(parent) => parent.children.retain(|c| *c != id),
            None => self.roots.retain(|c| *c != id),
        }
        self.index.remove(name);
        log::debug!("Deleted account '{}'", name);
        Ok(node.account)
    }

    /// Give an account a new unique name; its position is unchanged
    pub fn rename(&mut self, from: &str, to: &str) -> CoreResult<AccountId> {
        let id = self.find(from).ok_or_else(|| CoreError::not_found(from))?;
        let to = to.trim();
        if to.is_empty() {
            return Err(CoreError::validation("Account name is required"));
        }
        if to == from {
            return Ok(id);
        }
        if self.contains(to) {
            return Err(CoreError::validation(format!(
                "An account named '{}' already exists",
                to
            )));
        }

        self.index.remove(from);
        self.index.insert(to.to_string(), id);
        if let Some(node) = self.node_mut(id) {
            node.account.name = to.to_string();
        }
        log::debug!("Renamed account '{}' to '{}'", from, to);
        Ok(id)
    }

    /// Build a forest from its persisted nested form.
    ///
    /// Returns the forest together with the expand state the records carried.
    /// Records that break a forest invariant are rejected as a whole.
    pub fn from_records(records: &[AccountRecord]) -> CoreResult<(Forest, ViewState)> {
        let mut forest = Forest::new();
        let mut view = ViewState::new();
        for record in records {
            forest.load_record(record, None, &mut view)?;
        }
        Ok((forest, view))
    }

    fn load_record(
        &mut self,
        record: &AccountRecord,
        parent: Option<AccountId>,
        view: &mut ViewState,
    ) -> CoreResult<()> {
        let corrupt = |message: String| CoreError::StoreCorrupt {
            key: record.name.clone(),
            message,
        };

        if record.name.trim().is_empty() {
            return Err(corrupt("account with a blank name".to_string()));
        }
        if record.name.trim() != record.name {
            return Err(corrupt("account name has surrounding whitespace".to_string()));
        }
        if record.is_group != record.account_type.is_group() {
            return Err(corrupt(format!(
                "isGroup={} disagrees with accountType={}",
                record.is_group, record.account_type
            )));
        }
        if record.account_type == AccountKind::Detail && !record.children.is_empty() {
            return Err(corrupt("detail account has child accounts".to_string()));
        }
        let expected_parent = parent.and_then(|p| self.get(p)).map(|a| a.name.as_str());
        if record.parent_account.as_deref() != expected_parent {
            return Err(corrupt(format!(
                "parentAccount {:?} disagrees with nesting under {:?}",
                record.parent_account, expected_parent
            )));
        }
        if self.contains(&record.name) {
            return Err(corrupt("duplicate account name".to_string()));
        }

        let parent_name = expected_parent.map(str::to_string);
        let account = Account::new(record.name.clone(), record.root_type, record.account_type);
        let id = self
            .insert(parent_name.as_deref(), account)
            .map_err(|e| corrupt(e.to_string()))?;
        if record.is_group && record.expanded {
            view.set_expanded(id, true);
        }
        for child in &record.children {
            self.load_record(child, Some(id), view)?;
        }
        Ok(())
    }

    /// Convert back to the persisted nested form
    pub fn to_records(&self, view: &ViewState) -> Vec<AccountRecord> {
        self.roots
            .iter()
            .filter_map(|id| self.to_record(*id, view))
            .collect()
    }

    fn to_record(&self, id: AccountId, view: &ViewState) -> Option<AccountRecord> {
        let node = self.node(id)?;
        Some(AccountRecord {
            name: node.account.name.clone(),
            parent_account: node
                .parent
                .and_then(|p| self.get(p))
                .map(|a| a.name.clone()),
            root_type: node.account.root_type,
            account_type: node.account.kind,
            is_group: node.account.is_group(),
            children: node
                .children
                .iter()
                .filter_map(|c| self.to_record(*c, view))
                .collect(),
            expanded: node.account.is_group() && view.is_expanded(id),
        })
    }

    fn node(&self, id: AccountId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(|n| n.as_ref())
    }

    fn node_mut(&mut self, id: AccountId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(|n| n.as_mut())
    }
}

/// Structural equality: same names, types and child order, regardless of
/// arena slot layout
impl PartialEq for Forest {
    fn eq(&self, other: &Self) -> bool {
        let view = ViewState::new();
        self.to_records(&view) == other.to_records(&view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Forest {
        let mut forest = Forest::new();
        forest.insert(None, Account::group("Assets", RootType::Asset)).unwrap();
        forest
            .insert(Some("Assets"), Account::group("Current Assets", RootType::Asset))
            .unwrap();
        forest
            .insert(Some("Current Assets"), Account::detail("Cash", RootType::Asset))
            .unwrap();
        forest
            .insert(Some("Current Assets"), Account::detail("Inventory", RootType::Asset))
            .unwrap();
        forest
            .insert(None, Account::group("Liabilities", RootType::Liability))
            .unwrap();
        forest
    }

    #[test]
    fn test_find_by_name_is_exact() {
        let forest = sample();
        assert_eq!(forest.find_by_name("Cash").unwrap().root_type, RootType::Asset);
        assert!(forest.find_by_name("cash").is_none());
        assert!(forest.find_by_name("Bank").is_none());
    }

    #[test]
    fn test_insert_appends_in_order() {
        let forest = sample();
        let current = forest.find("Current Assets").unwrap();
        let names: Vec<_> = forest
            .children(current)
            .iter()
            .map(|id| forest.get(*id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["Cash", "Inventory"]);
        assert_eq!(forest.roots().len(), 2);
        assert_eq!(forest.len(), 5);
    }

    #[test]
    fn test_insert_duplicate_anywhere_fails() {
        let mut forest = sample();
        let err = forest
            .insert(Some("Liabilities"), Account::detail("Cash", RootType::Liability))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
        assert_eq!(forest.len(), 5);
    }

    #[test]
    fn test_insert_blank_name_fails() {
        let mut forest = sample();
        let err = forest
            .insert(Some("Assets"), Account::detail("   ", RootType::Asset))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
    }

    #[test]
    fn test_insert_trims_name() {
        let mut forest = sample();
        forest
            .insert(Some("Assets"), Account::detail("  Prepaid  ", RootType::Asset))
            .unwrap();
        assert!(forest.contains("Prepaid"));
    }

    #[test]
    fn test_insert_unknown_parent_fails() {
        let mut forest = sample();
        let err = forest
            .insert(Some("Nowhere"), Account::detail("Petty Cash", RootType::Asset))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
        assert!(!forest.contains("Petty Cash"));
    }

    #[test]
    fn test_insert_under_detail_fails() {
        let mut forest = sample();
        let err = forest
            .insert(Some("Cash"), Account::detail("Petty Cash", RootType::Asset))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
        assert!(forest.children(forest.find("Cash").unwrap()).is_empty());
    }

    #[test]
    fn test_delete_leaf() {
        let mut forest = sample();
        let removed = forest.delete("Cash").unwrap();
        assert_eq!(removed.name, "Cash");
        assert!(!forest.contains("Cash"));
        let current = forest.find("Current Assets").unwrap();
        assert_eq!(forest.children(current).len(), 1);
    }

    #[test]
    fn test_delete_root() {
        let mut forest = sample();
        forest.delete("Liabilities").unwrap();
        assert_eq!(forest.roots().len(), 1);
    }

    #[test]
    fn test_delete_group_with_children_is_rejected_unchanged() {
        let mut forest = sample();
        let before = serde_json::to_string(&forest.to_records(&ViewState::new())).unwrap();
        let err = forest.delete("Assets").unwrap_err();
        assert!(matches!(err, CoreError::ConstraintViolation { .. }));
        let after = serde_json::to_string(&forest.to_records(&ViewState::new())).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_delete_missing() {
        let mut forest = sample();
        assert!(matches!(
            forest.delete("Goodwill").unwrap_err(),
            CoreError::AccountNotFound { .. }
        ));
    }

    #[test]
    fn test_insert_then_delete_restores_structure() {
        let original = sample();
        let mut forest = original.clone();
        forest
            .insert(Some("Current Assets"), Account::group("Deposits", RootType::Asset))
            .unwrap();
        assert_ne!(forest, original);
        forest.delete("Deposits").unwrap();
        assert_eq!(forest, original);
    }

    #[test]
    fn test_rename() {
        let mut forest = sample();
        let id = forest.rename("Cash", "Cash & Bank").unwrap();
        assert_eq!(forest.get(id).unwrap().name, "Cash & Bank");
        assert!(!forest.contains("Cash"));
        assert_eq!(forest.find("Cash & Bank"), Some(id));

        assert!(matches!(
            forest.rename("Inventory", "Cash & Bank").unwrap_err(),
            CoreError::ValidationError { .. }
        ));
        assert!(matches!(
            forest.rename("Inventory", " ").unwrap_err(),
            CoreError::ValidationError { .. }
        ));
        assert!(matches!(
            forest.rename("Goodwill", "X").unwrap_err(),
            CoreError::AccountNotFound { .. }
        ));
    }

    #[test]
    fn test_rename_keeps_parent_reference_in_records() {
        let mut forest = sample();
        forest.rename("Current Assets", "Short-term Assets").unwrap();
        let records = forest.to_records(&ViewState::new());
        let cash = &records[0].children[0].children[0];
        assert_eq!(cash.parent_account.as_deref(), Some("Short-term Assets"));
    }

    #[test]
    fn test_ancestors_and_levels() {
        let forest = sample();
        let cash = forest.find("Cash").unwrap();
        let names: Vec<_> = forest
            .ancestors(cash)
            .into_iter()
            .map(|id| forest.get(id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["Current Assets", "Assets"]);
        assert_eq!(forest.level(cash), 2);
        assert_eq!(forest.level(forest.find("Liabilities").unwrap()), 0);
    }

    #[test]
    fn test_iter_is_preorder() {
        let forest = sample();
        let names: Vec<_> = forest.iter().map(|(_, a)| a.name.clone()).collect();
        assert_eq!(
            names,
            vec!["Assets", "Current Assets", "Cash", "Inventory", "Liabilities"]
        );
        assert_eq!(forest.groups().count(), 3);
    }

    #[test]
    fn test_records_round_trip_preserves_expand_state() {
        let forest = sample();
        let mut view = ViewState::new();
        view.set_expanded(forest.find("Assets").unwrap(), true);

        let records = forest.to_records(&view);
        assert!(records[0].expanded);
        assert!(!records[0].children[0].expanded);

        let (loaded, loaded_view) = Forest::from_records(&records).unwrap();
        assert_eq!(loaded, forest);
        assert!(loaded_view.is_expanded(loaded.find("Assets").unwrap()));
        assert!(!loaded_view.is_expanded(loaded.find("Current Assets").unwrap()));
    }

    #[test]
    fn test_from_records_rejects_duplicates() {
        let mut records = sample().to_records(&ViewState::new());
        let mut dup = records[1].clone();
        dup.name = "Cash".to_string();
        records.push(dup);
        let err = Forest::from_records(&records).unwrap_err();
        assert!(matches!(err, CoreError::StoreCorrupt { .. }));
    }

    #[test]
    fn test_from_records_rejects_detail_with_children() {
        let mut records = sample().to_records(&ViewState::new());
        let cash = &mut records[0].children[0].children[0];
        cash.children.push(AccountRecord {
            name: "Petty Cash".to_string(),
            parent_account: Some("Cash".to_string()),
            root_type: RootType::Asset,
            account_type: AccountKind::Detail,
            is_group: false,
            children: vec![],
            expanded: false,
        });
        assert!(matches!(
            Forest::from_records(&records).unwrap_err(),
            CoreError::StoreCorrupt { .. }
        ));
    }

    #[test]
    fn test_from_records_rejects_mismatched_parent() {
        let mut records = sample().to_records(&ViewState::new());
        records[0].children[0].parent_account = Some("Liabilities".to_string());
        assert!(Forest::from_records(&records).is_err());

        let mut records = sample().to_records(&ViewState::new());
        records[1].is_group = false;
        assert!(Forest::from_records(&records).is_err());
    }

    #[test]
    fn test_detail_accounts_filters_by_root_type() {
        let mut forest = sample();
        forest
            .insert(Some("Liabilities"), Account::detail("Loan", RootType::Liability))
            .unwrap();

        let all: Vec<&str> = forest.detail_accounts(None).map(|a| a.name.as_str()).collect();
        assert_eq!(all, vec!["Cash", "Inventory", "Loan"]);

        let liabilities: Vec<&str> = forest
            .detail_accounts(Some(RootType::Liability))
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(liabilities, vec!["Loan"]);
        assert_eq!(forest.detail_accounts(Some(RootType::Equity)).count(), 0);
    }

    #[test]
    fn test_from_records_rejects_padded_names() {
        let mut records = sample().to_records(&ViewState::new());
        records[0].children[0].children[0].name = " Cash".to_string();
        assert!(matches!(
            Forest::from_records(&records).unwrap_err(),
            CoreError::StoreCorrupt { .. }
        ));
    }

    #[test]
    fn test_reload_packs_deleted_slots() {
        let mut forest = sample();
        for i in 0..10 {
            let name = format!("Temp {}", i);
            forest
                .insert(Some("Liabilities"), Account::detail(name.as_str(), RootType::Liability))
                .unwrap();
            forest.delete(&name).unwrap();
        }
        assert_eq!(forest.nodes.len(), forest.len() + 10);

        let (reloaded, _) = Forest::from_records(&forest.to_records(&ViewState::new())).unwrap();
        assert_eq!(reloaded.nodes.len(), reloaded.len());
        assert_eq!(reloaded, forest);
    }
}
