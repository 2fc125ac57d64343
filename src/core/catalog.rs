use crate::domain::model::{CatalogItem, Frequency, ItemGroup, SelectionKey};
use crate::utils::error::{QuoteError, Result};
use std::collections::HashMap;

/// Registered catalog items for one page, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: HashMap<SelectionKey, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items<I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = CatalogItem>,
    {
        let mut catalog = Self::new();
        for item in items {
            catalog.register(item)?;
        }
        Ok(catalog)
    }

    pub fn register(&mut self, item: CatalogItem) -> Result<SelectionKey> {
        let key = item.key();
        if self.index.contains_key(&key) {
            return Err(QuoteError::DuplicateCatalogItem { key });
        }
        self.index.insert(key.clone(), self.items.len());
        self.items.push(item);
        Ok(key)
    }

    pub fn get(&self, key: &SelectionKey) -> Option<&CatalogItem> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    pub fn contains(&self, key: &SelectionKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks an item up by group and id; `scope` narrows the match when given.
    pub fn find(&self, group: ItemGroup, scope: Option<&str>, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| {
            item.group == group
                && item.id == id
                && scope.map_or(true, |s| item.service_tag.as_deref() == Some(s))
        })
    }
}

/// Builds a catalog item from a control's data attributes.
///
/// Recognised keys: `data-id`, `data-group`, `data-label`, `data-service`,
/// `data-price`, `data-frequency`, plus the shorthand `data-package` /
/// `data-option` and `text` for the control's text content. Returns `None`
/// only when neither an id nor a label can be found.
pub fn item_from_attributes(
    attrs: &HashMap<String, String>,
    default_group: ItemGroup,
) -> Option<CatalogItem> {
    let attr = |name: &str| {
        attrs
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    let group = match attr("data-group") {
        Some(raw) => raw.parse::<ItemGroup>().unwrap_or_else(|e| {
            tracing::warn!("{}; using {}", e, default_group);
            default_group
        }),
        None if attr("data-package").is_some() => ItemGroup::Package,
        None if attr("data-option").is_some() => ItemGroup::AddOn,
        None => default_group,
    };

    let label = attr("data-label")
        .or_else(|| attr("data-package"))
        .or_else(|| attr("data-option"))
        .or_else(|| attr("text"));
    let id = attr("data-id").or(label);

    let Some(id) = id else {
        tracing::warn!("Skipping {} control with neither id nor label", group);
        return None;
    };
    if label.is_none() {
        tracing::warn!("Catalog item {} has no label; showing its id", id);
    }

    let frequency = attr("data-frequency").and_then(|raw| match raw.parse::<Frequency>() {
        Ok(freq) => Some(freq),
        Err(e) => {
            tracing::warn!("Ignoring frequency on {}: {}", id, e);
            None
        }
    });

    Some(CatalogItem {
        id: id.to_string(),
        group,
        label: label.unwrap_or(id).to_string(),
        service_tag: attr("data-service").map(str::to_string),
        price: attr("data-price").map(str::to_string),
        frequency,
    })
}
