use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::SaveRequest;
use crate::catalog::{Catalog, GroupKind};
use crate::client::RemoteStore;
use crate::model::{Configuration, PersistedState, Selection};
use crate::preview::{feature_highlights, resolve_preview, AssetResolver};
use crate::pricing::{format_price, total_price, PriceBreakdown};
use crate::registry::OptionRegistry;
use crate::store::{KeyValueStore, STATE_KEY};
use crate::surface::{ControlSurface, Notification, OptionChange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The user gave no name; nothing was sent
    Cancelled,
    Saved { id: Option<String> },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// `skipped` counts stored selections that had no matching control
    Loaded { applied: usize, skipped: usize },
    Failed,
}

/// Application state for one configurator session
///
/// Owns the current model, the selections and the derived total. Every
/// mutation runs to completion (recompute, render, persist) before the next
/// event is accepted; callers hold `&mut self` for the duration.
pub struct Configurator<S: KeyValueStore> {
    catalog: Arc<Catalog>,
    registry: OptionRegistry,
    store: S,
    assets: Arc<dyn AssetResolver>,
    image_base: String,
    model: Option<String>,
    configuration: Configuration,
    total_price: f64,
}

impl<S: KeyValueStore> Configurator<S> {
    /// Start a session from whatever the store holds
    ///
    /// Missing or unreadable state yields an empty configuration with no
    /// model. The total is recomputed rather than trusted.
    pub fn restore(
        catalog: Arc<Catalog>,
        store: S,
        assets: Arc<dyn AssetResolver>,
        image_base: impl Into<String>,
    ) -> Self {
        let state = read_state(&store).unwrap_or_default();
        let registry = OptionRegistry::for_model(&catalog, state.model.as_deref());

        let mut configurator = Self {
            catalog,
            registry,
            store,
            assets,
            image_base: image_base.into(),
            model: state.model,
            configuration: state.configuration,
            total_price: 0.0,
        };
        configurator.total_price = total_price(configurator.base_price(), &configurator.configuration);

        debug!(
            model = ?configurator.model,
            groups = configurator.configuration.len(),
            total = configurator.total_price,
            "Configurator state restored"
        );
        configurator
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn base_price(&self) -> f64 {
        self.catalog.base_price(self.model.as_deref())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn breakdown(&self) -> PriceBreakdown {
        PriceBreakdown::from_configuration(self.base_price(), &self.configuration)
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            model: self.model.clone(),
            configuration: self.configuration.clone(),
            total_price: self.total_price,
        }
    }

    /// Switch to another car model
    ///
    /// Selections the new model offers are repriced from its registry; the
    /// rest are dropped and reported through an info notification.
    pub fn select_model(
        &mut self,
        surface: &mut dyn ControlSurface,
        model: &str,
    ) -> anyhow::Result<()> {
        if self.catalog.model(model).is_none() {
            anyhow::bail!("Unknown model: {}", model);
        }

        let registry = OptionRegistry::for_model(&self.catalog, Some(model));
        let dropped = self
            .configuration
            .retain_selections(|group, selection| match registry.lookup(group, &selection.value) {
                Some(entry) => {
                    selection.price = entry.price;
                    true
                }
                None => false,
            });

        info!(model = %model, dropped = dropped.len(), "Model selected");
        self.model = Some(model.to_string());
        self.registry = registry;

        if !dropped.is_empty() {
            let values: Vec<&str> = dropped.iter().map(|s| s.value.as_str()).collect();
            surface.notify(Notification::info(format!(
                "Removed options not available for {}: {}",
                model,
                values.join(", ")
            )));
        }
        self.refresh(surface);
        self.persist();
        Ok(())
    }

    /// Apply a control change
    ///
    /// Additions are priced from the registry and ignored when the option is
    /// not offered. An uncheck removes the matching stored selection whether
    /// or not the registry knows it. Returns false when the configuration was
    /// left as it was.
    pub fn handle_option_change(
        &mut self,
        surface: &mut dyn ControlSurface,
        change: &OptionChange,
    ) -> bool {
        let entry = self.registry.lookup(&change.group, &change.value).cloned();

        let changed = match entry {
            Some(entry) if entry.kind == GroupKind::Exclusive => {
                let selection = Selection::new(entry.value, entry.price);
                self.configuration.set_exclusive(&change.group, selection);
                true
            }
            Some(entry) if change.checked => {
                let selection = Selection::new(entry.value, entry.price);
                self.configuration.add_multiple(&change.group, selection)
            }
            Some(_) => self
                .configuration
                .remove_multiple(&change.group, &change.value),
            None if !change.checked
                && self.configuration.is_selected_in(&change.group, &change.value) =>
            {
                debug!(
                    group = %change.group,
                    value = %change.value,
                    "Removing selection not offered for the current model"
                );
                self.configuration
                    .remove_multiple(&change.group, &change.value)
            }
            None => {
                warn!(
                    group = %change.group,
                    value = %change.value,
                    checked = change.checked,
                    "Ignoring change for unknown option"
                );
                return false;
            }
        };

        debug!(
            group = %change.group,
            value = %change.value,
            checked = change.checked,
            changed,
            "Option change handled"
        );

        self.refresh(surface);
        self.persist();
        changed
    }

    /// Recompute the total and render every derived view
    pub fn refresh(&mut self, surface: &mut dyn ControlSurface) {
        self.update_price(surface);
        self.update_preview(surface);
    }

    /// Check the control of every stored selection
    ///
    /// Returns `(applied, skipped)`; selections without a control are skipped.
    pub fn apply_to_controls(&self, surface: &mut dyn ControlSurface) -> (usize, usize) {
        surface.clear_controls();

        let mut applied = 0;
        let mut skipped = 0;
        for (group, selection) in self.configuration.selections() {
            if surface.check_control(group, &selection.value) {
                applied += 1;
            } else {
                debug!(group = %group, value = %selection.value, "No control for stored selection");
                skipped += 1;
            }
        }
        (applied, skipped)
    }

    /// Prompt for a name and submit the current state to the remote store
    pub async fn save(
        &self,
        surface: &mut dyn ControlSurface,
        remote: &dyn RemoteStore,
    ) -> SaveOutcome {
        let name = match surface.prompt_name("Enter a name for this configuration:") {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => {
                debug!("Save cancelled");
                return SaveOutcome::Cancelled;
            }
        };

        let request = SaveRequest {
            name,
            model: self.model.clone(),
            configuration: self.configuration.clone(),
            total_price: self.total_price,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        match remote.save(&request).await {
            Ok(id) => {
                info!(name = %request.name, id = ?id, "Configuration saved");
                surface.notify(Notification::success("Configuration saved successfully!"));
                SaveOutcome::Saved { id }
            }
            Err(e) => {
                warn!(error = %e, "Error saving configuration");
                surface.notify(Notification::error("Failed to save configuration."));
                SaveOutcome::Failed
            }
        }
    }

    /// Replace the configuration with one fetched from the remote store
    pub async fn load(
        &mut self,
        surface: &mut dyn ControlSurface,
        remote: &dyn RemoteStore,
        id: &str,
    ) -> LoadOutcome {
        let configuration = match remote.load(id).await {
            Ok(configuration) => configuration,
            Err(e) => {
                warn!(id = %id, error = %e, "Error loading configuration");
                surface.notify(Notification::error("Failed to load configuration."));
                return LoadOutcome::Failed;
            }
        };

        self.configuration = configuration;
        let (applied, skipped) = self.apply_to_controls(surface);
        self.refresh(surface);

        info!(id = %id, applied, skipped, "Configuration loaded");
        surface.notify(Notification::success("Configuration loaded successfully!"));
        LoadOutcome::Loaded { applied, skipped }
    }

    /// Placeholder action; only tells the user it is not available yet
    pub fn compare(&self, surface: &mut dyn ControlSurface) {
        info!("Compare requested");
        surface.notify(Notification::info("Compare configurations feature coming soon!"));
    }

    fn update_price(&mut self, surface: &mut dyn ControlSurface) {
        let breakdown = self.breakdown();
        self.total_price = breakdown.total;
        surface.render_total(&format_price(self.total_price));
        surface.render_breakdown(&breakdown);
    }

    fn update_preview(&self, surface: &mut dyn ControlSurface) {
        if let Some(preview) = resolve_preview(
            &self.image_base,
            self.model.as_deref(),
            &self.configuration,
            self.assets.as_ref(),
        ) {
            surface.render_preview(&preview);
        }
        surface.render_highlights(&feature_highlights(&self.configuration));
    }

    /// Write the current state to the local store
    ///
    /// Runs after every model or option change; failures are logged only.
    pub fn persist(&mut self) {
        let state = self.snapshot();
        let result = serde_json::to_string(&state)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(STATE_KEY, &json));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist configurator state");
        }
    }
}

fn read_state<S: KeyValueStore>(store: &S) -> Option<PersistedState> {
    let raw = match store.get(STATE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "Error reading saved state");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(error = %e, "Error loading saved state");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::AnyAsset;
    use crate::store::MemoryStore;
    use crate::surface::HeadlessSurface;

    fn configurator(store: MemoryStore) -> Configurator<MemoryStore> {
        let catalog = Arc::new(Catalog::builtin().unwrap());
        Configurator::restore(catalog, store, Arc::new(AnyAsset), "/static/images")
    }

    fn x3() -> (Configurator<MemoryStore>, HeadlessSurface) {
        let mut cfg = configurator(MemoryStore::new());
        let mut surface = HeadlessSurface::new();
        cfg.select_model(&mut surface, "X3").unwrap();
        let surface = HeadlessSurface::from_registry(cfg.registry());
        (cfg, surface)
    }

    #[test]
    fn test_color_and_package_total() {
        let (mut cfg, mut surface) = x3();
        cfg.handle_option_change(&mut surface, &OptionChange::checked("exterior_color", "Black"));
        cfg.handle_option_change(&mut surface, &OptionChange::checked("package_premium", "Luxury"));

        assert_eq!(cfg.total_price(), 48500.0);
        assert_eq!(surface.total.as_deref(), Some("$48,500"));
        let breakdown = surface.breakdown.clone().unwrap();
        assert_eq!(breakdown.options.get("Black"), Some(&0.0));
        assert_eq!(breakdown.packages.get("Luxury"), Some(&3500.0));
        assert_eq!(surface.highlights, vec!["Black", "Luxury"]);
        assert_eq!(surface.preview.clone().unwrap().src, "/static/images/x3-black.jpg");
    }

    #[test]
    fn test_unknown_option_is_ignored() {
        let (mut cfg, mut surface) = x3();
        let changed = cfg.handle_option_change(
            &mut surface,
            &OptionChange::checked("exterior_color", "Hot Pink"),
        );
        assert!(!changed);
        assert!(cfg.configuration().is_empty());
        assert_eq!(cfg.total_price(), 45000.0);
    }

    #[test]
    fn test_state_persisted_after_change() {
        let (mut cfg, mut surface) = x3();
        cfg.handle_option_change(&mut surface, &OptionChange::checked("wheels", "19\" Y-Spoke"));

        let raw = cfg.store().get(STATE_KEY).unwrap().unwrap();
        let state: PersistedState = serde_json::from_str(&raw).unwrap();
        assert_eq!(state.model.as_deref(), Some("X3"));
        assert_eq!(state.total_price, 45800.0);
        assert_eq!(state.configuration, *cfg.configuration());
    }

    #[test]
    fn test_malformed_state_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(STATE_KEY, "{not json").unwrap();

        let cfg = configurator(store);
        assert_eq!(cfg.model(), None);
        assert!(cfg.configuration().is_empty());
        assert_eq!(cfg.total_price(), cfg.base_price());
    }

    #[test]
    fn test_restore_recomputes_total() {
        let mut store = MemoryStore::new();
        store
            .set(
                STATE_KEY,
                r#"{"model":"X5","configuration":{"package_premium":[{"value":"Luxury","price":3500}]},"totalPrice":1}"#,
            )
            .unwrap();

        let cfg = configurator(store);
        assert_eq!(cfg.model(), Some("X5"));
        assert_eq!(cfg.total_price(), 65500.0);
    }

    #[test]
    fn test_select_unknown_model_fails() {
        let mut cfg = configurator(MemoryStore::new());
        let mut surface = HeadlessSurface::new();
        assert!(cfg.select_model(&mut surface, "Z4").is_err());
        assert_eq!(cfg.model(), None);
    }

    #[test]
    fn test_apply_to_controls_counts_skipped() {
        let (mut cfg, mut surface) = x3();
        cfg.handle_option_change(&mut surface, &OptionChange::checked("exterior_color", "Black"));
        cfg.configuration
            .add_multiple("individual_options", Selection::new("Rocket Booster", 1.0));

        let (applied, skipped) = cfg.apply_to_controls(&mut surface);
        assert_eq!((applied, skipped), (1, 1));
        assert!(surface.is_checked("exterior_color", "Black"));
    }

    #[test]
    fn test_compare_only_notifies() {
        let (cfg, mut surface) = x3();
        let before = cfg.snapshot();

        cfg.compare(&mut surface);

        assert_eq!(cfg.snapshot(), before);
        let notifications = surface.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].level, crate::surface::NotificationLevel::Info);
    }

    #[test]
    fn test_model_switch_drops_unavailable_options() {
        let mut cfg = configurator(MemoryStore::new());
        let mut surface = HeadlessSurface::new();
        cfg.select_model(&mut surface, "X5").unwrap();
        cfg.handle_option_change(&mut surface, &OptionChange::checked("package_premium", "Luxury"));
        cfg.handle_option_change(&mut surface, &OptionChange::checked("package_premium", "Executive"));
        assert_eq!(cfg.total_price(), 62000.0 + 3500.0 + 4200.0);

        cfg.select_model(&mut surface, "X3").unwrap();

        assert!(!cfg.configuration().is_selected("Executive"));
        assert!(cfg.configuration().is_selected("Luxury"));
        assert_eq!(cfg.total_price(), 45000.0 + 3500.0);
        assert!(surface
            .notifications()
            .iter()
            .any(|n| n.message == "Removed options not available for X3: Executive"));

        let raw = cfg.store().get(STATE_KEY).unwrap().unwrap();
        assert!(!raw.contains("Executive"));
    }

    #[test]
    fn test_uncheck_removes_selection_missing_from_registry() {
        let mut store = MemoryStore::new();
        store
            .set(
                STATE_KEY,
                r#"{"model":"X3","configuration":{"package_premium":[{"value":"Executive","price":4200}]},"totalPrice":0}"#,
            )
            .unwrap();
        let mut cfg = configurator(store);
        let mut surface = HeadlessSurface::from_registry(cfg.registry());
        assert_eq!(cfg.total_price(), 49200.0);

        let changed = cfg.handle_option_change(
            &mut surface,
            &OptionChange::unchecked("package_premium", "Executive"),
        );

        assert!(changed);
        assert!(cfg.configuration().is_empty());
        assert_eq!(cfg.total_price(), 45000.0);

        let checked_again = cfg.handle_option_change(
            &mut surface,
            &OptionChange::checked("package_premium", "Executive"),
        );
        assert!(!checked_again);
        assert!(cfg.configuration().is_empty());
    }
}
