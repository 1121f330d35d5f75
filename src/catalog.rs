use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

/// A car model offered by the configurator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarModel {
    pub id: String,
    pub name: String,
    pub category: String,
    pub base_price: f64,
}

/// How many options of a group may be selected at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Radio-style, at most one value
    Exclusive,
    /// Checkbox-style, any subset
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDef {
    pub value: String,
    pub price: f64,
    /// Models offering this option. Empty means every model.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
}

impl OptionDef {
    pub fn available_for(&self, model: Option<&str>) -> bool {
        match model {
            Some(model) if !self.models.is_empty() => self.models.iter().any(|m| m == model),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub name: String,
    pub label: String,
    pub kind: GroupKind,
    /// Quote line category; derived from the kind when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub options: Vec<OptionDef>,
}

impl OptionGroup {
    pub fn category(&self) -> &str {
        match &self.category {
            Some(category) => category,
            None if crate::pricing::is_package_group(&self.name) => "Package",
            None => "Option",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub requires: Vec<RequiresRule>,
    #[serde(default)]
    pub incompatible: Vec<IncompatibleRule>,
    #[serde(default)]
    pub models: Vec<ModelRule>,
    #[serde(default)]
    pub suggestions: Vec<SuggestionRule>,
    #[serde(default)]
    pub engine_drivetrain: Vec<EngineDrivetrainRule>,
}

/// Drivetrains an engine can be paired with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineDrivetrainRule {
    pub engine: String,
    pub drivetrains: Vec<String>,
}

/// Selecting `option` requires every value in `requires`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiresRule {
    pub option: String,
    pub requires: Vec<String>,
    pub reason: String,
}

/// At most one of `options` may be selected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompatibleRule {
    pub options: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRule {
    pub model: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRule {
    pub when: String,
    pub suggest: String,
    pub message: String,
}

/// Fixed reduction applied when every value in `requires` is selected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleDiscount {
    pub name: String,
    pub requires: Vec<String>,
    pub amount: f64,
}

/// A browsable family of models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub description: String,
    pub image: String,
    pub models: Vec<String>,
}

/// Models, option groups and the rules between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub models: Vec<CarModel>,
    #[serde(default)]
    pub series: Vec<Series>,
    pub groups: Vec<OptionGroup>,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub discounts: Vec<BundleDiscount>,
}

impl Catalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let catalog: Catalog = toml::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load from a TOML file, falling back to the built-in catalog when no
    /// path is given
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    anyhow::anyhow!("Failed to read catalog {}: {}", path.display(), e)
                })?;
                Self::from_toml(&text)
            }
            None => Self::builtin(),
        }
    }

    pub fn model(&self, id: &str) -> Option<&CarModel> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn group(&self, name: &str) -> Option<&OptionGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Models of a series, in series order
    pub fn series_models(&self, series: &Series) -> Vec<CarModel> {
        series
            .models
            .iter()
            .filter_map(|id| self.model(id))
            .cloned()
            .collect()
    }

    /// Drivetrains allowed with `engine`; `None` when no rule names the engine
    pub fn drivetrains_for(&self, engine: &str) -> Option<&[String]> {
        self.constraints
            .engine_drivetrain
            .iter()
            .find(|rule| rule.engine == engine)
            .map(|rule| rule.drivetrains.as_slice())
    }

    fn offers(&self, value: &str) -> bool {
        self.groups
            .iter()
            .any(|g| g.options.iter().any(|o| o.value == value))
    }

    /// Base price of a model, zero when the model is absent or unknown
    pub fn base_price(&self, model: Option<&str>) -> f64 {
        model
            .and_then(|id| self.model(id))
            .map(|m| m.base_price)
            .unwrap_or(0.0)
    }

    /// Option groups filtered to what `model` offers; empty groups are dropped
    pub fn groups_for(&self, model: Option<&str>) -> Vec<OptionGroup> {
        self.groups
            .iter()
            .filter_map(|group| {
                let options: Vec<OptionDef> = group
                    .options
                    .iter()
                    .filter(|o| o.available_for(model))
                    .cloned()
                    .collect();
                (!options.is_empty()).then(|| OptionGroup {
                    options,
                    ..group.clone()
                })
            })
            .collect()
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.models.is_empty() {
            anyhow::bail!("Catalog must define at least one model");
        }

        let mut model_ids = HashSet::new();
        for model in &self.models {
            if model.id.is_empty() {
                anyhow::bail!("Catalog model id cannot be empty");
            }
            if !model_ids.insert(model.id.as_str()) {
                anyhow::bail!("Catalog model '{}' is duplicated", model.id);
            }
            if model.base_price < 0.0 {
                anyhow::bail!("Catalog model '{}': base price must be >= 0", model.id);
            }
        }

        let mut group_names = HashSet::new();
        for group in &self.groups {
            if !group_names.insert(group.name.as_str()) {
                anyhow::bail!("Option group '{}' is duplicated", group.name);
            }
            let mut values = HashSet::new();
            for option in &group.options {
                if !values.insert(option.value.as_str()) {
                    anyhow::bail!(
                        "Option '{}' appears twice in group '{}'",
                        option.value,
                        group.name
                    );
                }
                for model in &option.models {
                    if !model_ids.contains(model.as_str()) {
                        anyhow::bail!(
                            "Option '{}' references unknown model '{}'",
                            option.value,
                            model
                        );
                    }
                }
            }
        }

        for series in &self.series {
            for model in &series.models {
                if !model_ids.contains(model.as_str()) {
                    anyhow::bail!("Series '{}' references unknown model '{}'", series.name, model);
                }
            }
        }

        for rule in &self.constraints.engine_drivetrain {
            for value in std::iter::once(&rule.engine).chain(&rule.drivetrains) {
                if !self.offers(value) {
                    anyhow::bail!(
                        "Engine rule for '{}' references unknown option '{}'",
                        rule.engine,
                        value
                    );
                }
            }
        }

        for rule in &self.constraints.models {
            if !model_ids.contains(rule.model.as_str()) {
                anyhow::bail!("Constraint references unknown model '{}'", rule.model);
            }
        }

        for discount in &self.discounts {
            if discount.requires.is_empty() {
                anyhow::bail!("Discount '{}' must require at least one option", discount.name);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.model("X3").unwrap().base_price, 45000.0);
        assert_eq!(catalog.group("exterior_color").unwrap().kind, GroupKind::Exclusive);
        assert_eq!(catalog.group("package_premium").unwrap().kind, GroupKind::Multiple);
    }

    #[test]
    fn test_base_price_defaults_to_zero() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.base_price(None), 0.0);
        assert_eq!(catalog.base_price(Some("Z4")), 0.0);
        assert_eq!(catalog.base_price(Some("X5")), 62000.0);
    }

    #[test]
    fn test_groups_for_filters_by_model() {
        let catalog = Catalog::builtin().unwrap();
        let groups = catalog.groups_for(Some("i4"));
        let engine = groups.iter().find(|g| g.name == "engine").unwrap();
        let values: Vec<&str> = engine.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["Electric Motor", "Dual Electric Motors"]);
    }

    #[test]
    fn test_group_categories() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.group("engine").unwrap().category(), "Engine");
        assert_eq!(catalog.group("wheels").unwrap().category(), "Exterior");
        assert_eq!(catalog.group("package_sport").unwrap().category(), "Package");
        assert_eq!(catalog.group("individual_options").unwrap().category(), "Option");
    }

    #[test]
    fn test_series_lookup() {
        let catalog = Catalog::builtin().unwrap();
        let electric = catalog.series("Electric").unwrap();
        let ids: Vec<String> = catalog
            .series_models(electric)
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["i4", "iX"]);
        assert!(catalog.series("Roadsters").is_none());
    }

    #[test]
    fn test_drivetrains_for_engine() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            catalog.drivetrains_for("4.4L TwinTurbo V8").unwrap(),
            ["xDrive".to_string()]
        );
        assert!(catalog.drivetrains_for("Hamster Wheel").is_none());
    }

    #[test]
    fn test_engine_rule_with_unknown_drivetrain_rejected() {
        let text = r#"
            [[models]]
            id = "X1"
            name = "X1"
            category = "SUV"
            base_price = 1

            [[groups]]
            name = "engine"
            label = "Engine"
            kind = "exclusive"
            options = [{ value = "2.0L", price = 0 }]

            [constraints]
            engine_drivetrain = [{ engine = "2.0L", drivetrains = ["qDrive"] }]
        "#;
        let err = Catalog::from_toml(text).unwrap_err();
        assert!(err.to_string().contains("unknown option 'qDrive'"));
    }

    #[test]
    fn test_duplicate_option_rejected() {
        let text = r#"
            [[models]]
            id = "X1"
            name = "X1"
            category = "SUV"
            base_price = 1

            [[groups]]
            name = "exterior_color"
            label = "Color"
            kind = "exclusive"
            options = [{ value = "Black", price = 0 }, { value = "Black", price = 0 }]
        "#;
        let err = Catalog::from_toml(text).unwrap_err();
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn test_unknown_model_reference_rejected() {
        let text = r#"
            [[models]]
            id = "X1"
            name = "X1"
            category = "SUV"
            base_price = 1

            [[groups]]
            name = "wheels"
            label = "Wheels"
            kind = "exclusive"
            options = [{ value = "18", price = 0, models = ["Z4"] }]
        "#;
        let err = Catalog::from_toml(text).unwrap_err();
        assert!(err.to_string().contains("unknown model 'Z4'"));
    }
}
