use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One chosen option instance: the option value and its price delta from base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub value: String,
    pub price: f64,
}

impl Selection {
    pub fn new(value: impl Into<String>, price: f64) -> Self {
        Self {
            value: value.into(),
            price,
        }
    }
}

/// What a configuration key holds
///
/// Exclusive (radio) groups hold a single selection, multi-select (checkbox)
/// groups hold an ordered sequence with unique values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupValue {
    Single(Selection),
    Multiple(Vec<Selection>),
}

impl GroupValue {
    /// Iterate the selections held by this group, in stored order
    pub fn selections(&self) -> std::slice::Iter<'_, Selection> {
        match self {
            Self::Single(selection) => std::slice::from_ref(selection).iter(),
            Self::Multiple(items) => items.iter(),
        }
    }

    /// Sum of every selection price in this group
    pub fn price(&self) -> f64 {
        self.selections().map(|s| s.price).sum()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.selections().any(|s| s.value == value)
    }
}

/// Mapping from option-group name to its selections
///
/// Keys iterate in sorted order, which is the order used for highlights and
/// price breakdown rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    groups: BTreeMap<String, GroupValue>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn get(&self, group: &str) -> Option<&GroupValue> {
        self.groups.get(group)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupValue)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every (group, selection) pair, in key order then sequence order
    pub fn selections(&self) -> impl Iterator<Item = (&str, &Selection)> {
        self.iter()
            .flat_map(|(group, value)| value.selections().map(move |s| (group, s)))
    }

    /// Every selected value across all groups
    pub fn selected_values(&self) -> impl Iterator<Item = &str> {
        self.selections().map(|(_, s)| s.value.as_str())
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected_values().any(|v| v == value)
    }

    /// Whether `group` holds `value`
    pub fn is_selected_in(&self, group: &str, value: &str) -> bool {
        self.groups
            .get(group)
            .map_or(false, |held| held.contains(value))
    }

    /// Value of an exclusive group, if one is selected
    pub fn selected_value(&self, group: &str) -> Option<&str> {
        match self.groups.get(group)? {
            GroupValue::Single(selection) => Some(selection.value.as_str()),
            GroupValue::Multiple(_) => None,
        }
    }

    /// Set an exclusive group, overwriting any prior selection
    pub fn set_exclusive(&mut self, group: &str, selection: Selection) {
        self.groups
            .insert(group.to_string(), GroupValue::Single(selection));
    }

    /// Append to a multi-select group
    ///
    /// Returns false when the value is already present. A key holding a
    /// single selection is converted to a sequence first.
    pub fn add_multiple(&mut self, group: &str, selection: Selection) -> bool {
        let entry = self
            .groups
            .entry(group.to_string())
            .or_insert_with(|| GroupValue::Multiple(Vec::new()));

        match entry {
            GroupValue::Multiple(items) => {
                if items.iter().any(|s| s.value == selection.value) {
                    return false;
                }
                items.push(selection);
                true
            }
            GroupValue::Single(existing) => {
                if existing.value == selection.value {
                    return false;
                }
                let previous = existing.clone();
                *entry = GroupValue::Multiple(vec![previous, selection]);
                true
            }
        }
    }

    /// Remove a value from a multi-select group
    ///
    /// The key is dropped once its sequence is empty. Returns true if a
    /// selection was removed.
    pub fn remove_multiple(&mut self, group: &str, value: &str) -> bool {
        let Some(entry) = self.groups.get_mut(group) else {
            return false;
        };

        let removed = match entry {
            GroupValue::Multiple(items) => {
                let before = items.len();
                items.retain(|s| s.value != value);
                items.len() != before
            }
            GroupValue::Single(selection) => selection.value == value,
        };

        let now_empty = match entry {
            GroupValue::Multiple(items) => items.is_empty(),
            GroupValue::Single(_) => removed,
        };
        if now_empty {
            self.groups.remove(group);
        }

        removed
    }

    /// Keep only the selections for which `keep` returns true
    ///
    /// `keep` may adjust a selection in place. Groups left empty are dropped.
    /// Returns the removed selections in key order.
    pub fn retain_selections<F>(&mut self, mut keep: F) -> Vec<Selection>
    where
        F: FnMut(&str, &mut Selection) -> bool,
    {
        let mut removed = Vec::new();
        self.groups.retain(|group, value| match value {
            GroupValue::Single(selection) => {
                if keep(group.as_str(), selection) {
                    return true;
                }
                removed.push(selection.clone());
                false
            }
            GroupValue::Multiple(items) => {
                items.retain_mut(|selection| {
                    if keep(group.as_str(), selection) {
                        return true;
                    }
                    removed.push(selection.clone());
                    false
                });
                !items.is_empty()
            }
        });
        removed
    }
}

/// State written to the local key-value store after every change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub model: Option<String>,
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub total_price: f64,
}
