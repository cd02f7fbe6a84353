//! Presentation adapter over the chart of accounts
//!
//! [`ChartView`] is the single entry point for a UI. It owns the forest, the
//! balance map, the expand state and the pending "add account" edit, and
//! re-flattens the display list after every change.

use serde::Serialize;

use chartbook_config::{Config, CurrencyConfig};

use crate::balance::{BalanceResolver, SignedBalance};
use crate::error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity,
};
use crate::forest::{AccountId, Forest};
use crate::models::{Account, BalanceMap};
use crate::store::AccountStore;
use crate::types::{AccountKind, RootType};
use crate::view::{flatten, ViewState};

/// One row of the indented chart table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    pub name: String,
    pub level: usize,
    pub location: Vec<usize>,
    pub is_group: bool,
    pub expanded: bool,
    pub root_type: RootType,
    pub balance: SignedBalance,
    pub balance_display: String,
}

/// State of the "add child account" editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddState {
    Idle,
    Adding {
        parent: String,
        kind: AccountKind,
        /// Text entered so far; kept when a commit is rejected
        name: String,
    },
}

pub struct ChartView {
    store: AccountStore,
    forest: Forest,
    balances: BalanceMap,
    view: ViewState,
    rows: Vec<DisplayRow>,
    pending: AddState,
    all_expanded: bool,
    all_collapsed: bool,
    autosave: bool,
    roll_up_groups: bool,
    currency: CurrencyConfig,
    logger: DefaultErrorLogger,
}

impl ChartView {
    /// Load the forest and balances once and build the first display list
    pub fn open(config: &Config, mut store: AccountStore) -> Self {
        let snapshot = store.load_accounts();
        let balances = store.load_balances();

        let mut view = snapshot.view;
        if config.display.expand_roots_on_load {
            for root in snapshot.forest.roots() {
                if snapshot.forest.get(*root).map(|a| a.is_group()).unwrap_or(false) {
                    view.set_expanded(*root, true);
                }
            }
        }

        let mut chart = Self {
            store,
            forest: snapshot.forest,
            balances,
            view,
            rows: Vec::new(),
            pending: AddState::Idle,
            all_expanded: false,
            all_collapsed: true,
            autosave: config.storage.autosave,
            roll_up_groups: config.display.roll_up_groups,
            currency: config.currency.clone(),
            logger: DefaultErrorLogger,
        };
        chart.refresh_flags();
        chart.refresh();
        log::info!(
            "Opened chart with {} accounts and {} balances",
            chart.forest.len(),
            chart.balances.len()
        );
        chart
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn balances(&self) -> &BalanceMap {
        &self.balances
    }

    /// Current display list
    pub fn rows(&self) -> &[DisplayRow] {
        &self.rows
    }

    pub fn currency(&self) -> &CurrencyConfig {
        &self.currency
    }

    pub fn pending(&self) -> &AddState {
        &self.pending
    }

    pub fn is_all_expanded(&self) -> bool {
        self.all_expanded
    }

    pub fn is_all_collapsed(&self) -> bool {
        self.all_collapsed
    }

    /// Flip a group's expand state; detail accounts are left alone
    pub fn toggle(&mut self, name: &str) -> CoreResult<bool> {
        let id = self.lookup(name).map_err(|e| self.report("toggle", name, e))?;
        let expanded = self.view.toggle(&self.forest, id);
        self.refresh_flags();
        self.refresh();
        Ok(expanded)
    }

    pub fn expand_all(&mut self) {
        self.view.expand_all(&self.forest);
        self.all_expanded = true;
        self.all_collapsed = false;
        self.refresh();
    }

    pub fn collapse_all(&mut self) {
        self.view.collapse_all(&self.forest);
        self.all_expanded = false;
        self.all_collapsed = true;
        self.refresh();
    }

    /// Open the new-row editor under `parent`, expanding it so the row is visible
    pub fn begin_add(&mut self, parent: &str, kind: AccountKind) -> CoreResult<()> {
        let id = self.lookup(parent).map_err(|e| self.report("begin_add", parent, e))?;
        if !self.forest.get(id).map(|a| a.is_group()).unwrap_or(false) {
            let error = CoreError::validation(format!(
                "'{}' is a detail account and cannot have child accounts",
                parent
            ));
            return Err(self.report("begin_add", parent, error));
        }

        self.pending = AddState::Adding {
            parent: parent.to_string(),
            kind,
            name: String::new(),
        };
        if !self.view.is_expanded(id) {
            self.view.set_expanded(id, true);
            self.refresh_flags();
            self.refresh();
        }
        Ok(())
    }

    /// Record editor text without committing it
    pub fn set_pending_name(&mut self, text: &str) {
        if let AddState::Adding { name, .. } = &mut self.pending {
            *name = text.to_string();
        }
    }

    /// Create the pending account. On failure the editor stays open with
    /// `name` retained.
    pub fn commit_add(&mut self, name: &str) -> CoreResult<AccountId> {
        let (parent, kind) = match &mut self.pending {
            AddState::Idle => {
                return Err(CoreError::validation("No account is being added"));
            }
            AddState::Adding {
                parent,
                kind,
                name: pending_name,
            } => {
                *pending_name = name.to_string();
                (parent.clone(), *kind)
            }
        };

        if name.trim().is_empty() {
            let error = CoreError::validation("Account name is required");
            return Err(self.report("commit_add", &parent, error));
        }

        let root_type = match self.forest.find_by_name(&parent) {
            Some(account) => account.root_type,
            None => return Err(self.report("commit_add", &parent, CoreError::not_found(&parent))),
        };
        let account = Account::new(name.trim(), root_type, kind);

        let id = self
            .forest
            .insert(Some(&parent), account)
            .map_err(|e| self.report("commit_add", name, e))?;
        self.pending = AddState::Idle;
        self.refresh_flags();
        self.refresh();
        self.persist("commit_add", name.trim())?;
        Ok(id)
    }

    pub fn cancel_add(&mut self) {
        self.pending = AddState::Idle;
    }

    /// Delete a childless account. Confirmation is the caller's job.
    pub fn remove(&mut self, name: &str) -> CoreResult<Account> {
        let id = self.lookup(name).map_err(|e| self.report("remove", name, e))?;
        let removed = self
            .forest
            .delete(name)
            .map_err(|e| self.report("remove", name, e))?;
        self.view.forget(id);
        if matches!(&self.pending, AddState::Adding { parent, .. } if parent == name) {
            self.pending = AddState::Idle;
        }
        self.refresh_flags();
        self.refresh();
        self.persist("remove", name)?;
        Ok(removed)
    }

    /// Rename an account; its feed totals follow it to the new name
    pub fn rename(&mut self, name: &str, new_name: &str) -> CoreResult<()> {
        self.forest
            .rename(name, new_name)
            .map_err(|e| self.report("rename", name, e))?;
        let new_name = new_name.trim();

        let mut balances_moved = false;
        if new_name != name {
            if let Some(mut balance) = self.balances.remove(name) {
                balance.account = new_name.to_string();
                self.balances.insert(new_name.to_string(), balance);
                balances_moved = true;
            }
        }
        if let AddState::Adding { parent, .. } = &mut self.pending {
            if parent == name {
                *parent = new_name.to_string();
            }
        }
        self.refresh();
        self.persist("rename", new_name)?;
        if balances_moved {
            self.persist_balances("rename", new_name)?;
        }
        Ok(())
    }

    /// Create a new top-level group account
    pub fn add_root(&mut self, name: &str, root_type: RootType) -> CoreResult<AccountId> {
        let id = self
            .forest
            .insert(None, Account::group(name, root_type))
            .map_err(|e| self.report("add_root", name, e))?;
        self.refresh_flags();
        self.refresh();
        self.persist("add_root", name.trim())?;
        Ok(id)
    }

    /// Balance of one account; unknown accounts resolve to zero
    pub fn balance_of(&self, name: &str) -> SignedBalance {
        match self.forest.find(name) {
            Some(id) => self.balance_for(id),
            None => SignedBalance::zero(RootType::Asset),
        }
    }

    /// Detail account names in chart order, for dropdowns
    pub fn account_options(&self, root_type: Option<RootType>) -> Vec<String> {
        self.forest
            .detail_accounts(root_type)
            .map(|a| a.name.clone())
            .collect()
    }

    fn balance_for(&self, id: AccountId) -> SignedBalance {
        let resolver = BalanceResolver::new(&self.balances);
        match self.forest.get(id) {
            Some(account) if account.is_group() && self.roll_up_groups => {
                resolver.rollup(&self.forest, id)
            }
            Some(account) => resolver.resolve(&account.name, account.root_type),
            None => SignedBalance::zero(RootType::Asset),
        }
    }

    /// Log a rejected edit at a level matching its severity
    fn report(&self, operation: &str, account: &str, error: CoreError) -> CoreError {
        let context = ErrorContext::new(operation).with_account(account);
        match error.severity() {
            ErrorSeverity::Info => self.logger.log_debug(&error.to_string(), &context),
            ErrorSeverity::Warning => self.logger.log_warning(&error.to_string(), &context),
            _ => self.logger.log_error(&error, &context),
        }
        error
    }

    fn lookup(&self, name: &str) -> CoreResult<AccountId> {
        self.forest.find(name).ok_or_else(|| CoreError::not_found(name))
    }

    fn refresh_flags(&mut self) {
        self.all_expanded = self.view.all_expanded(&self.forest);
        self.all_collapsed = self.view.all_collapsed(&self.forest);
    }

    fn refresh(&mut self) {
        self.rows = flatten(&self.forest, &self.view)
            .into_iter()
            .map(|flat| {
                let balance = self.balance_for(flat.id);
                DisplayRow {
                    balance_display: balance.display(&self.currency),
                    balance,
                    name: flat.name,
                    level: flat.level,
                    location: flat.location,
                    is_group: flat.is_group,
                    expanded: flat.expanded,
                    root_type: flat.root_type,
                }
            })
            .collect();
    }

    /// The in-memory forest stays authoritative when a save fails
    fn persist(&mut self, operation: &str, account: &str) -> CoreResult<()> {
        if !self.autosave {
            return Ok(());
        }
        let result = self.store.save_accounts(&self.forest, &self.view);
        self.log_save_failure(result, operation, account)
    }

    fn persist_balances(&mut self, operation: &str, account: &str) -> CoreResult<()> {
        if !self.autosave {
            return Ok(());
        }
        let result = self.store.save_balances(&self.balances);
        self.log_save_failure(result, operation, account)
    }

    fn log_save_failure(
        &self,
        result: CoreResult<()>,
        operation: &str,
        account: &str,
    ) -> CoreResult<()> {
        if let Err(e) = &result {
            let context = ErrorContext::new(operation).with_account(account);
            self.logger.log_error(e, &context);
        }
        result
    }
}
