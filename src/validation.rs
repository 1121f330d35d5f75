use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::model::Configuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnknownModel,
    MissingRequiredOptions,
    IncompatibleOptions,
    ModelRequiredOptions,
    ModelExcludedOptions,
    EngineDrivetrainIncompatible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Not an option of any catalog group
    UnknownOption,
    /// A catalog option the model does not offer
    OptionNotOffered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_drivetrains: Vec<String>,
}

/// Advisory finding; does not make a configuration invalid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
    pub option: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub option: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    #[serde(default)]
    pub warnings: Vec<ValidationWarning>,
    pub suggestions: Vec<Suggestion>,
}

/// Check a configuration against the catalog's constraint rules
pub fn validate(
    catalog: &Catalog,
    model: Option<&str>,
    configuration: &Configuration,
) -> ValidationReport {
    let mut errors = Vec::new();
    let selected = |value: &str| configuration.is_selected(value);

    if let Some(id) = model {
        if catalog.model(id).is_none() {
            errors.push(ValidationIssue {
                kind: IssueKind::UnknownModel,
                message: format!("Unknown model: {}", id),
                options: Vec::new(),
                available_drivetrains: Vec::new(),
            });
        }
    }

    for rule in &catalog.constraints.requires {
        if !selected(rule.option.as_str()) {
            continue;
        }
        let missing = missing(&rule.requires, |v| selected(v));
        if !missing.is_empty() {
            errors.push(ValidationIssue {
                kind: IssueKind::MissingRequiredOptions,
                message: format!(
                    "{} requires: {} ({})",
                    rule.option,
                    missing.join(", "),
                    rule.reason
                ),
                options: missing,
                available_drivetrains: Vec::new(),
            });
        }
    }

    for rule in &catalog.constraints.incompatible {
        let conflicting: Vec<String> = rule
            .options
            .iter()
            .filter(|v| selected(v.as_str()))
            .cloned()
            .collect();
        if conflicting.len() > 1 {
            errors.push(ValidationIssue {
                kind: IssueKind::IncompatibleOptions,
                message: format!(
                    "Cannot select {}: {}",
                    conflicting.join(" and "),
                    rule.reason
                ),
                options: conflicting,
                available_drivetrains: Vec::new(),
            });
        }
    }

    if let Some(id) = model {
        for rule in catalog.constraints.models.iter().filter(|r| r.model == id) {
            let missing = missing(&rule.required, |v| selected(v));
            if !missing.is_empty() {
                errors.push(ValidationIssue {
                    kind: IssueKind::ModelRequiredOptions,
                    message: format!("{} requires: {}", id, missing.join(", ")),
                    options: missing,
                    available_drivetrains: Vec::new(),
                });
            }

            let excluded: Vec<String> = rule
                .excluded
                .iter()
                .filter(|v| selected(v.as_str()))
                .cloned()
                .collect();
            if !excluded.is_empty() {
                errors.push(ValidationIssue {
                    kind: IssueKind::ModelExcludedOptions,
                    message: format!("{} cannot have: {}", id, excluded.join(", ")),
                    options: excluded,
                    available_drivetrains: Vec::new(),
                });
            }
        }
    }

    if let (Some(engine), Some(drivetrain)) = (
        configuration.selected_value("engine"),
        configuration.selected_value("drivetrain"),
    ) {
        if let Some(allowed) = catalog.drivetrains_for(engine) {
            if !allowed.iter().any(|d| d == drivetrain) {
                errors.push(ValidationIssue {
                    kind: IssueKind::EngineDrivetrainIncompatible,
                    message: format!("Engine {} is not compatible with {}", engine, drivetrain),
                    options: vec![engine.to_string(), drivetrain.to_string()],
                    available_drivetrains: allowed.to_vec(),
                });
            }
        }
    }

    let known_model = model.filter(|id| catalog.model(id).is_some());
    let mut warnings = Vec::new();
    for (group, selection) in configuration.selections() {
        let option = catalog
            .group(group)
            .and_then(|g| g.options.iter().find(|o| o.value == selection.value));
        match option {
            None => warnings.push(ValidationWarning {
                kind: WarningKind::UnknownOption,
                message: format!("Unknown option: {}", selection.value),
                option: selection.value.clone(),
            }),
            Some(option) if !option.available_for(known_model) => {
                warnings.push(ValidationWarning {
                    kind: WarningKind::OptionNotOffered,
                    message: format!(
                        "{} is not offered for {}",
                        selection.value,
                        known_model.unwrap_or_default()
                    ),
                    option: selection.value.clone(),
                })
            }
            Some(_) => {}
        }
    }

    let suggestions = catalog
        .constraints
        .suggestions
        .iter()
        .filter(|s| selected(s.when.as_str()) && !selected(s.suggest.as_str()))
        .map(|s| Suggestion {
            option: s.suggest.clone(),
            message: s.message.clone(),
        })
        .collect();

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
        suggestions,
    }
}

fn missing(values: &[String], selected: impl Fn(&str) -> bool) -> Vec<String> {
    values.iter().filter(|v| !selected(v.as_str())).cloned().collect()
}
