//! Chart of accounts: account records and the parent/child tree built from
//! the flat list the API returns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerdesk_core::AccountId;

/// High-level account kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountKind {
    #[serde(alias = "asset")]
    Asset,
    #[serde(alias = "liability")]
    Liability,
    #[serde(alias = "equity")]
    Equity,
    #[serde(alias = "revenue")]
    Revenue,
    #[serde(alias = "expense")]
    Expense,
}

/// Account as listed by `GET /accounts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(alias = "name")]
    pub account_name: String,
    #[serde(alias = "type", alias = "kind")]
    pub account_type: AccountKind,
    #[serde(default)]
    pub parent_account_id: Option<AccountId>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "ledgerdesk_core::money::serde_amount::deserialize")]
    pub initial_balance: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Account {
    /// Selection label, e.g. `1000 - Cash`.
    pub fn label(&self) -> String {
        match self.code.as_deref() {
            Some(code) if !code.is_empty() => format!("{code} - {}", self.account_name),
            _ => self.account_name.clone(),
        }
    }

    /// Parent reference, treating an empty id as "no parent".
    fn parent(&self) -> Option<&AccountId> {
        self.parent_account_id.as_ref().filter(|p| !p.is_blank())
    }
}

/// Body of `POST /accounts` and `PATCH /accounts/{id}`.
///
/// `parentAccountId` is always sent; `null` detaches the account from its
/// parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAccount {
    pub code: String,
    pub account_name: String,
    pub account_type: AccountKind,
    pub parent_account_id: Option<AccountId>,
    #[serde(default)]
    pub description: String,
}

impl SaveAccount {
    pub fn new(code: impl Into<String>, account_name: impl Into<String>, account_type: AccountKind) -> Self {
        Self {
            code: code.into(),
            account_name: account_name.into(),
            account_type,
            parent_account_id: None,
            description: String::new(),
        }
    }

    pub fn under(mut self, parent: impl Into<AccountId>) -> Self {
        let parent = parent.into();
        self.parent_account_id = (!parent.is_blank()).then_some(parent);
        self
    }

    /// Form state for editing an existing account.
    pub fn from_account(account: &Account) -> Self {
        Self {
            code: account.code.clone().unwrap_or_default(),
            account_name: account.account_name.clone(),
            account_type: account.account_type,
            parent_account_id: account.parent().cloned(),
            description: account.description.clone().unwrap_or_default(),
        }
    }

    /// Check the chosen parent against the current chart before sending.
    ///
    /// `editing` is the id of the account being updated, if any. Choosing the
    /// account itself or one of its descendants would close a loop.
    pub fn check_parent(&self, tree: &AccountTree, editing: Option<&AccountId>) -> Result<(), ChartError> {
        let (Some(parent), Some(id)) = (self.parent_account_id.as_ref(), editing) else {
            return Ok(());
        };
        if tree.is_within(parent, id) {
            return Err(ChartError::Cycle(id.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("duplicate account id: {0}")]
    DuplicateId(AccountId),

    /// The account is its own (transitive) ancestor.
    #[error("account {0} is part of a parent cycle")]
    Cycle(AccountId),
}

/// One account plus arena links.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountNode {
    pub account: Account,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Accounts linked into a forest by `parentAccountId`.
///
/// Nodes live in an arena (`Vec`) and refer to each other by index; an
/// id→index map resolves parent references. Accounts whose parent is not in
/// the list become roots.
#[derive(Debug, Clone, Default)]
pub struct AccountTree {
    nodes: Vec<AccountNode>,
    index: HashMap<AccountId, usize>,
    roots: Vec<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

impl AccountTree {
    pub fn build(accounts: impl IntoIterator<Item = Account>) -> Result<Self, ChartError> {
        let mut tree = AccountTree::default();

        // Pass 1: arena + index.
        for account in accounts {
            let idx = tree.nodes.len();
            if tree.index.insert(account.id.clone(), idx).is_some() {
                return Err(ChartError::DuplicateId(account.id));
            }
            tree.nodes.push(AccountNode {
                account,
                parent: None,
                children: Vec::new(),
            });
        }

        // Pass 2: link children to parents.
        for idx in 0..tree.nodes.len() {
            let parent = match tree.nodes[idx].account.parent() {
                None => None,
                Some(parent_id) => match tree.index.get(parent_id) {
                    Some(&p) if p == idx => {
                        return Err(ChartError::Cycle(tree.nodes[idx].account.id.clone()));
                    }
                    Some(&p) => Some(p),
                    None => {
                        tracing::warn!(
                            account_id = %tree.nodes[idx].account.id,
                            parent_id = %parent_id,
                            "parent account not found; treating as root"
                        );
                        None
                    }
                },
            };

            match parent {
                Some(p) => {
                    tree.nodes[idx].parent = Some(p);
                    tree.nodes[p].children.push(idx);
                }
                None => tree.roots.push(idx),
            }
        }

        tree.reject_cycles()?;
        Ok(tree)
    }

    /// Follow parent links from every node; reaching a node already on the
    /// current path means the chain loops.
    fn reject_cycles(&self) -> Result<(), ChartError> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut path = Vec::new();

        for start in 0..self.nodes.len() {
            let mut cursor = Some(start);
            while let Some(idx) = cursor {
                match marks[idx] {
                    Mark::Done => break,
                    Mark::OnPath => {
                        return Err(ChartError::Cycle(self.nodes[idx].account.id.clone()));
                    }
                    Mark::Unvisited => {
                        marks[idx] = Mark::OnPath;
                        path.push(idx);
                        cursor = self.nodes[idx].parent;
                    }
                }
            }
            for idx in path.drain(..) {
                marks[idx] = Mark::Done;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &AccountId) -> Option<&AccountNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn roots(&self) -> impl Iterator<Item = &AccountNode> + '_ {
        self.roots.iter().map(|&idx| &self.nodes[idx])
    }

    pub fn children(&self, id: &AccountId) -> Vec<&Account> {
        self.index
            .get(id)
            .map(|&idx| {
                self.nodes[idx]
                    .children
                    .iter()
                    .map(|&c| &self.nodes[c].account)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parent(&self, id: &AccountId) -> Option<&Account> {
        let idx = *self.index.get(id)?;
        self.nodes[idx].parent.map(|p| &self.nodes[p].account)
    }

    /// Depth-first, pre-order walk with depth (roots are depth 0), in input order.
    pub fn walk(&self) -> Vec<(usize, &Account)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&r| (r, 0)).collect();
        while let Some((idx, depth)) = stack.pop() {
            out.push((depth, &self.nodes[idx].account));
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// Accounts that may be chosen as parent of `editing`: everything except
    /// the account itself and its descendants. With no account being edited
    /// every account qualifies.
    pub fn parent_options(&self, editing: Option<&AccountId>) -> Vec<&Account> {
        self.walk()
            .into_iter()
            .map(|(_, account)| account)
            .filter(|account| editing.is_none_or(|id| !self.is_within(&account.id, id)))
            .collect()
    }

    /// True when `id` is `ancestor` or sits somewhere below it.
    fn is_within(&self, id: &AccountId, ancestor: &AccountId) -> bool {
        let (Some(&target), Some(mut cursor)) = (self.index.get(ancestor), self.index.get(id).copied()) else {
            return id == ancestor;
        };
        loop {
            if cursor == target {
                return true;
            }
            match self.nodes[cursor].parent {
                Some(p) => cursor = p,
                None => return false,
            }
        }
    }

    /// Sum of `initialBalance` over the account and all its descendants.
    pub fn subtree_balance(&self, id: &AccountId) -> Option<f64> {
        let start = *self.index.get(id)?;
        let mut total = 0.0;
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            total += self.nodes[idx].account.initial_balance;
            stack.extend(self.nodes[idx].children.iter().copied());
        }
        Some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, parent: Option<&str>, balance: f64) -> Account {
        Account {
            id: AccountId::new(id),
            code: None,
            account_name: format!("Account {id}"),
            account_type: AccountKind::Asset,
            parent_account_id: parent.map(AccountId::new),
            currency: None,
            initial_balance: balance,
            description: None,
        }
    }

    #[test]
    fn builds_nested_tree_in_input_order() {
        let tree = AccountTree::build(vec![
            account("1-1-1", Some("1-1"), 50_000.0),
            account("1", None, 0.0),
            account("1-1", Some("1"), 0.0),
            account("1-1-2", Some("1-1"), 250_000.0),
            account("2", None, 0.0),
        ])
        .unwrap();

        assert_eq!(tree.len(), 5);
        let walked: Vec<(usize, &str)> = tree
            .walk()
            .into_iter()
            .map(|(d, a)| (d, a.id.as_str()))
            .collect();
        assert_eq!(
            walked,
            vec![(0, "1"), (1, "1-1"), (2, "1-1-1"), (2, "1-1-2"), (0, "2")]
        );
        assert_eq!(
            tree.parent(&AccountId::new("1-1-2")).map(|a| a.id.as_str()),
            Some("1-1")
        );
        assert_eq!(tree.children(&AccountId::new("1")).len(), 1);
        assert_eq!(tree.subtree_balance(&AccountId::new("1")), Some(300_000.0));
        assert_eq!(tree.subtree_balance(&AccountId::new("missing")), None);
    }

    #[test]
    fn orphans_and_blank_parents_become_roots() {
        let tree = AccountTree::build(vec![
            account("a", Some("ghost"), 0.0),
            account("b", Some(""), 0.0),
        ])
        .unwrap();
        let roots: Vec<&str> = tree.roots().map(|n| n.account.id.as_str()).collect();
        assert_eq!(roots, vec!["a", "b"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = AccountTree::build(vec![account("a", None, 0.0), account("a", None, 0.0)])
            .unwrap_err();
        assert_eq!(err, ChartError::DuplicateId(AccountId::new("a")));
    }

    #[test]
    fn rejects_self_parent() {
        let err = AccountTree::build(vec![account("a", Some("a"), 0.0)]).unwrap_err();
        assert_eq!(err, ChartError::Cycle(AccountId::new("a")));
    }

    #[test]
    fn rejects_transitive_cycle() {
        let err = AccountTree::build(vec![
            account("root", None, 0.0),
            account("a", Some("c"), 0.0),
            account("b", Some("a"), 0.0),
            account("c", Some("b"), 0.0),
        ])
        .unwrap_err();
        assert!(matches!(err, ChartError::Cycle(_)));
    }

    #[test]
    fn decodes_api_shape() {
        let json = r#"[
            {"id": "10", "code": "1000", "name": "Cash", "accountType": "ASSET", "initialBalance": "25.00"},
            {"id": "11", "accountName": "Bank", "type": "asset", "parentAccountId": "10"}
        ]"#;
        let accounts: Vec<Account> = serde_json::from_str(json).unwrap();
        assert_eq!(accounts[0].label(), "1000 - Cash");
        assert_eq!(accounts[0].initial_balance, 25.0);
        assert_eq!(accounts[1].label(), "Bank");
        assert_eq!(accounts[1].account_type, AccountKind::Asset);

        let tree = AccountTree::build(accounts).unwrap();
        assert_eq!(tree.roots().count(), 1);
    }

    #[test]
    fn parent_options_exclude_the_account_and_its_descendants() {
        let tree = AccountTree::build(vec![
            account("1", None, 0.0),
            account("1-1", Some("1"), 0.0),
            account("1-1-1", Some("1-1"), 0.0),
            account("2", None, 0.0),
        ])
        .unwrap();

        let ids = |options: Vec<&Account>| options.into_iter().map(|a| a.id.to_string()).collect::<Vec<_>>();
        assert_eq!(ids(tree.parent_options(None)), ["1", "1-1", "1-1-1", "2"]);
        assert_eq!(ids(tree.parent_options(Some(&AccountId::new("1-1")))), ["1", "2"]);
    }

    #[test]
    fn save_request_refuses_a_parent_below_itself() {
        let tree = AccountTree::build(vec![
            account("1", None, 0.0),
            account("1-1", Some("1"), 0.0),
            account("2", None, 0.0),
        ])
        .unwrap();
        let editing = AccountId::new("1");

        let below = SaveAccount::new("1000", "Assets", AccountKind::Asset).under("1-1");
        assert_eq!(below.check_parent(&tree, Some(&editing)), Err(ChartError::Cycle(editing.clone())));

        let itself = SaveAccount::new("1000", "Assets", AccountKind::Asset).under("1");
        assert!(itself.check_parent(&tree, Some(&editing)).is_err());

        let sideways = SaveAccount::new("1000", "Assets", AccountKind::Asset).under("2");
        assert!(sideways.check_parent(&tree, Some(&editing)).is_ok());

        // New accounts cannot close a loop.
        assert!(below.check_parent(&tree, None).is_ok());
    }

    #[test]
    fn save_request_serializes_detached_parent_as_null() {
        let mut existing = account("1-1", Some("1"), 0.0);
        existing.code = Some("1010".to_string());
        existing.description = Some("petty cash".to_string());

        let edit = SaveAccount::from_account(&existing);
        let json = serde_json::to_value(&edit).unwrap();
        assert_eq!(json["code"], "1010");
        assert_eq!(json["accountName"], "Account 1-1");
        assert_eq!(json["accountType"], "ASSET");
        assert_eq!(json["parentAccountId"], "1");
        assert_eq!(json["description"], "petty cash");

        let root = SaveAccount::new("3000", "Equity", AccountKind::Equity).under("");
        let json = serde_json::to_value(&root).unwrap();
        assert!(json["parentAccountId"].is_null());
        assert_eq!(json["description"], "");
    }
}
