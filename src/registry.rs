use std::collections::HashMap;

use crate::catalog::{Catalog, GroupKind};

/// Metadata for one selectable option
#[derive(Debug, Clone, PartialEq)]
pub struct OptionEntry {
    pub group: String,
    pub value: String,
    pub kind: GroupKind,
    pub price: f64,
}

/// Typed lookup table consulted when a control changes
///
/// Built from the catalog for one car model, so an option the model does not
/// offer simply has no entry.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    entries: HashMap<(String, String), OptionEntry>,
    order: Vec<(String, String)>,
}

impl OptionRegistry {
    pub fn for_model(catalog: &Catalog, model: Option<&str>) -> Self {
        let mut registry = Self::default();
        for group in catalog.groups_for(model) {
            for option in group.options {
                let key = (group.name.clone(), option.value.clone());
                registry.order.push(key.clone());
                registry.entries.insert(
                    key,
                    OptionEntry {
                        group: group.name.clone(),
                        value: option.value,
                        kind: group.kind,
                        price: option.price,
                    },
                );
            }
        }
        registry
    }

    pub fn lookup(&self, group: &str, value: &str) -> Option<&OptionEntry> {
        self.entries.get(&(group.to_string(), value.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in catalog order
    pub fn entries(&self) -> impl Iterator<Item = &OptionEntry> {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }
}
