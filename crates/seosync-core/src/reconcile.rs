//! Key-set reconciliation between the sitemap and the metadata store.

use crate::page_key::PageKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Keys exempt from removal even when absent from the sitemap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList(BTreeSet<PageKey>);

impl AllowList {
    pub fn new(keys: impl IntoIterator<Item = PageKey>) -> Self {
        Self(keys.into_iter().collect())
    }

    pub fn contains(&self, key: &PageKey) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which halves of a reconciliation a run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    Sync,
    AddOnly,
    RemoveOnly,
}

impl SyncMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::AddOnly => "add_only",
            Self::RemoveOnly => "remove_only",
        }
    }

    pub fn adds(self) -> bool {
        matches!(self, Self::Sync | Self::AddOnly)
    }

    pub fn removes(self) -> bool {
        matches!(self, Self::Sync | Self::RemoveOnly)
    }
}

/// Keys to add and remove. Both lists are duplicate-free and disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// In sitemap order.
    pub to_add: Vec<PageKey>,
    /// In store order.
    pub to_remove: Vec<PageKey>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Drop the half that `mode` does not apply.
    pub fn restrict(mut self, mode: SyncMode) -> Self {
        if !mode.adds() {
            self.to_add.clear();
        }
        if !mode.removes() {
            self.to_remove.clear();
        }
        self
    }

    /// `(existing − to_remove) ∪ to_add`, preserving store then sitemap order.
    pub fn apply<'a>(&'a self, existing: impl IntoIterator<Item = &'a PageKey>) -> Vec<PageKey> {
        let removed: HashSet<&PageKey> = self.to_remove.iter().collect();
        let mut seen = HashSet::new();
        existing
            .into_iter()
            .filter(|key| !removed.contains(key))
            .chain(self.to_add.iter())
            .filter(|key| seen.insert(*key))
            .cloned()
            .collect()
    }
}

/// `to_add = sitemap − existing`, `to_remove = existing − sitemap − allow_list`.
pub fn reconcile<'a, 'b>(
    sitemap_keys: impl IntoIterator<Item = &'a PageKey>,
    existing_keys: impl IntoIterator<Item = &'b PageKey>,
    allow_list: &AllowList,
) -> Reconciliation {
    let sitemap: Vec<&PageKey> = unique(sitemap_keys);
    let existing: Vec<&PageKey> = unique(existing_keys);
    let in_sitemap: HashSet<&PageKey> = sitemap.iter().copied().collect();
    let in_store: HashSet<&PageKey> = existing.iter().copied().collect();

    let to_add = sitemap
        .iter()
        .filter(|key| !in_store.contains(*key))
        .map(|key| (*key).clone())
        .collect();
    let to_remove = existing
        .iter()
        .filter(|key| !in_sitemap.contains(*key) && !allow_list.contains(key))
        .map(|key| (*key).clone())
        .collect();

    Reconciliation { to_add, to_remove }
}

fn unique<'a>(keys: impl IntoIterator<Item = &'a PageKey>) -> Vec<&'a PageKey> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|key| seen.insert(*key)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[&str]) -> Vec<PageKey> {
        raw.iter()
            .map(|key| PageKey::new(*key).expect("valid key"))
            .collect()
    }

    fn names(keys: &[PageKey]) -> Vec<&str> {
        keys.iter().map(PageKey::as_str).collect()
    }

    #[test]
    fn about_pricing_legacy_scenario() {
        let sitemap = keys(&["about", "pricing-plans"]);
        let existing = keys(&["pricing-plans", "legacy-offer"]);
        let allow = AllowList::new(keys(&["home"]));

        let plan = reconcile(&sitemap, &existing, &allow);
        assert_eq!(names(&plan.to_add), vec!["about"]);
        assert_eq!(names(&plan.to_remove), vec!["legacy-offer"]);
        assert_eq!(
            names(&plan.apply(&existing)),
            vec!["pricing-plans", "about"]
        );
    }

    #[test]
    fn allow_listed_keys_are_never_removed() {
        let existing = keys(&["home", "services", "old"]);
        let allow = AllowList::new(keys(&["home", "services"]));
        let plan = reconcile(std::iter::empty(), &existing, &allow);
        assert_eq!(names(&plan.to_remove), vec!["old"]);
        assert!(plan.to_add.is_empty());
    }

    #[test]
    fn restrict_drops_the_other_half() {
        let sitemap = keys(&["a"]);
        let existing = keys(&["b"]);
        let plan = reconcile(&sitemap, &existing, &AllowList::default());

        let add_only = plan.clone().restrict(SyncMode::AddOnly);
        assert_eq!(names(&add_only.to_add), vec!["a"]);
        assert!(add_only.to_remove.is_empty());

        let remove_only = plan.clone().restrict(SyncMode::RemoveOnly);
        assert!(remove_only.to_add.is_empty());
        assert_eq!(names(&remove_only.to_remove), vec!["b"]);

        assert_eq!(plan.clone().restrict(SyncMode::Sync), plan);
    }

    #[test]
    fn duplicate_inputs_produce_unique_outputs() {
        let sitemap = keys(&["a", "a", "b"]);
        let existing = keys(&["c", "c"]);
        let plan = reconcile(&sitemap, &existing, &AllowList::default());
        assert_eq!(names(&plan.to_add), vec!["a", "b"]);
        assert_eq!(names(&plan.to_remove), vec!["c"]);
    }

    #[test]
    fn reconciled_keys_reconcile_to_nothing() {
        let sitemap = keys(&["a", "b"]);
        let existing = keys(&["b", "home", "z"]);
        let allow = AllowList::new(keys(&["home"]));
        let plan = reconcile(&sitemap, &existing, &allow);
        let after = plan.apply(&existing);
        assert!(reconcile(&sitemap, &after, &allow).is_empty());
    }
}
