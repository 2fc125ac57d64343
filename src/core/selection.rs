use crate::domain::model::{
    Cardinality, CatalogItem, DerivedSummary, ItemGroup, SelectionChangeEvent, SelectionKey,
    SummaryEntry, SummaryFormat,
};

/// The visitor's current picks, in the order they were made.
///
/// Single source of truth for the quote widget: controls, chips and hidden
/// fields are all rendered from [`SelectionStore::snapshot`]. Mutations are
/// driven by user actions only and never fail; an unknown key is a no-op.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    entries: Vec<(SelectionKey, CatalogItem)>,
    format: SummaryFormat,
    scope_packages_by_service: bool,
}

impl SelectionStore {
    pub fn new(format: SummaryFormat) -> Self {
        Self {
            entries: Vec::new(),
            format,
            scope_packages_by_service: false,
        }
    }

    /// One package per service instead of one package overall.
    pub fn with_scoped_packages(mut self, scoped: bool) -> Self {
        self.scope_packages_by_service = scoped;
        self
    }

    pub fn format(&self) -> SummaryFormat {
        self.format
    }

    pub fn cardinality(&self, group: ItemGroup) -> Cardinality {
        match group {
            ItemGroup::AddOn => Cardinality::Multi,
            ItemGroup::Package if self.scope_packages_by_service => Cardinality::ScopedSingle,
            ItemGroup::Package | ItemGroup::ProgramPackage => Cardinality::Single,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &SelectionKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.entries.iter().map(|(_, item)| item)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SelectionKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn toggle(&mut self, item: &CatalogItem) -> SelectionChangeEvent {
        let key = item.key();
        if self.remove(&key) {
            tracing::debug!("Deselected {}", key);
            return SelectionChangeEvent {
                removed: vec![key],
                added: Vec::new(),
            };
        }

        let removed = self.evict_for(item);
        self.entries.push((key.clone(), item.clone()));
        tracing::debug!("Selected {} (evicted {})", key, removed.len());

        SelectionChangeEvent {
            removed,
            added: vec![key],
        }
    }

    /// Radio-style selection: replaces the slot, never empties it.
    pub fn set_single_select_slot(
        &mut self,
        group: ItemGroup,
        item: &CatalogItem,
    ) -> SelectionChangeEvent {
        if item.group != group {
            tracing::warn!(
                "Ignoring {} for the {} slot: item belongs to {}",
                item.id,
                group,
                item.group
            );
            return SelectionChangeEvent::default();
        }

        let key = item.key();
        if self.contains(&key) {
            return SelectionChangeEvent::default();
        }

        let removed = self.evict_for(item);
        self.entries.push((key.clone(), item.clone()));
        tracing::debug!("Slot {} now holds {}", group, key);

        SelectionChangeEvent {
            removed,
            added: vec![key],
        }
    }

    pub fn remove(&mut self, key: &SelectionKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!("Clearing {} selections", self.entries.len());
        }
        self.entries.clear();
    }

    /// Drops entries whose key the predicate rejects; returns the dropped keys.
    pub fn prune<F>(&mut self, mut keep: F) -> Vec<SelectionKey>
    where
        F: FnMut(&SelectionKey) -> bool,
    {
        let mut dropped = Vec::new();
        self.entries.retain(|(key, _)| {
            let kept = keep(key);
            if !kept {
                dropped.push(key.clone());
            }
            kept
        });
        if !dropped.is_empty() {
            tracing::debug!("Pruned {} stale selections", dropped.len());
        }
        dropped
    }

    /// Seeds the store from a pre-filled summary value (e.g. a hidden field
    /// rendered server-side). Labels that match nothing in `catalog` are skipped.
    pub fn seed_from_summary<'a, I>(&mut self, value: &str, catalog: I) -> usize
    where
        I: IntoIterator<Item = &'a CatalogItem>,
        I::IntoIter: Clone,
    {
        let catalog = catalog.into_iter();
        let mut seeded = 0;
        for label in DerivedSummary::parse_joined(value, self.format.separator) {
            let found = catalog.clone().find(|item| {
                item.display_label(self.format.decorate_service) == label
                    || item.label_or_id() == label
                    || item.id == label
            });
            match found {
                Some(item) if !self.contains(&item.key()) => {
                    self.evict_for(item);
                    self.entries.push((item.key(), item.clone()));
                    seeded += 1;
                }
                Some(_) => {}
                None => tracing::debug!("No catalog item matches pre-filled label {:?}", label),
            }
        }
        seeded
    }

    pub fn snapshot(&self) -> DerivedSummary {
        let entries: Vec<SummaryEntry> = self
            .entries
            .iter()
            .map(|(key, item)| SummaryEntry {
                key: key.clone(),
                label: item.display_label(self.format.decorate_service),
                service_tag: item.service_tag.clone(),
            })
            .collect();

        let joined = entries
            .iter()
            .map(|e| e.label.as_str())
            .collect::<Vec<_>>()
            .join(self.format.separator.as_str());

        DerivedSummary { entries, joined }
    }

    fn evict_for(&mut self, item: &CatalogItem) -> Vec<SelectionKey> {
        let cardinality = self.cardinality(item.group);
        if cardinality == Cardinality::Multi {
            return Vec::new();
        }
        self.prune(|key| {
            let same_slot = match cardinality {
                Cardinality::Single => key.group == item.group,
                Cardinality::ScopedSingle => {
                    key.group == item.group && key.scope == item.service_tag
                }
                Cardinality::Multi => false,
            };
            !same_slot
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Separator;

    fn package(id: &str, service: &str) -> CatalogItem {
        CatalogItem::new(ItemGroup::Package, id, id).with_service(service)
    }

    fn option(id: &str) -> CatalogItem {
        CatalogItem::new(ItemGroup::AddOn, id, id)
    }

    #[test]
    fn test_toggle_single_select_evicts_previous() {
        let mut store = SelectionStore::new(SummaryFormat::default());
        let a = package("basic", "Lawn Mowing");
        let b = package("premium", "Lawn Mowing");

        store.toggle(&a);
        let event = store.toggle(&b);

        assert_eq!(event.removed, vec![a.key()]);
        assert_eq!(event.added, vec![b.key()]);
        assert_eq!(store.keys().cloned().collect::<Vec<_>>(), vec![b.key()]);
    }

    #[test]
    fn test_toggle_selected_item_deselects() {
        let mut store = SelectionStore::new(SummaryFormat::default());
        let a = option("edging");
        store.toggle(&a);
        let event = store.toggle(&a);
        assert_eq!(event.removed, vec![a.key()]);
        assert!(event.added.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_scoped_packages_allow_one_per_service() {
        let mut store = SelectionStore::new(SummaryFormat::default()).with_scoped_packages(true);
        store.toggle(&package("basic", "Lawn Mowing"));
        store.toggle(&package("basic", "Snow Removal"));
        assert_eq!(store.len(), 2);

        store.toggle(&package("premium", "Snow Removal"));
        let labels = store.snapshot().labels().join("|");
        assert_eq!(labels, "basic (Lawn Mowing)|premium (Snow Removal)");
    }

    #[test]
    fn test_single_select_slot_never_empties() {
        let mut store = SelectionStore::new(SummaryFormat::default());
        let a = package("basic", "Lawn Mowing");
        store.set_single_select_slot(ItemGroup::Package, &a);
        let event = store.set_single_select_slot(ItemGroup::Package, &a);
        assert!(event.is_empty());
        assert!(store.contains(&a.key()));
    }

    #[test]
    fn test_single_select_slot_rejects_other_group() {
        let mut store = SelectionStore::new(SummaryFormat::default());
        let event = store.set_single_select_slot(ItemGroup::Package, &option("edging"));
        assert!(event.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut store = SelectionStore::new(SummaryFormat::default());
        store.toggle(&option("edging"));
        assert!(!store.remove(&option("aeration").key()));
        assert_eq!(store.len(), 1);
        assert!(store.remove(&option("edging").key()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_joins_with_configured_separator() {
        let format = SummaryFormat {
            separator: Separator::Semicolon,
            decorate_service: false,
        };
        let mut store = SelectionStore::new(format);
        store.toggle(&package("basic", "Lawn Mowing"));
        store.toggle(&option("edging"));
        assert_eq!(store.snapshot().joined, "basic; edging");
    }

    #[test]
    fn test_seed_from_summary_matches_display_labels() {
        let catalog = vec![
            package("basic", "Lawn Mowing"),
            package("premium", "Lawn Mowing"),
            option("edging"),
        ];
        let mut store = SelectionStore::new(SummaryFormat::default());
        let seeded = store.seed_from_summary("basic (Lawn Mowing), edging, unknown", &catalog);
        assert_eq!(seeded, 2);
        assert_eq!(store.snapshot().joined, "basic (Lawn Mowing), edging");
    }

    #[test]
    fn test_seed_respects_cardinality() {
        let catalog = vec![package("basic", "Lawn Mowing"), package("premium", "Lawn Mowing")];
        let mut store = SelectionStore::new(SummaryFormat::default());
        store.seed_from_summary("basic, premium", &catalog);
        assert_eq!(store.len(), 1);
        assert_eq!(store.items().next().map(|i| i.id.as_str()), Some("premium"));
    }

    #[test]
    fn test_prune_reports_dropped_keys() {
        let mut store = SelectionStore::new(SummaryFormat::default());
        let keep = option("edging");
        let stale = option("aeration");
        store.toggle(&keep);
        store.toggle(&stale);
        let dropped = store.prune(|key| key.id != "aeration");
        assert_eq!(dropped, vec![stale.key()]);
        assert!(store.contains(&keep.key()));
    }
}
