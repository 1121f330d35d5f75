//! JSON bodies exchanged between the configurator and the save/load service

use serde::{Deserialize, Serialize};

use crate::model::Configuration;

/// Snapshot submitted when the user saves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(default)]
    pub name: String,
    pub model: Option<String>,
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub total_price: f64,
    /// RFC 3339 timestamp taken by the client
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A configuration as stored by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfiguration {
    pub id: String,
    pub name: String,
    pub model: Option<String>,
    pub configuration: Configuration,
    pub total_price: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Configuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(
        default,
        rename = "totalPrice",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl From<SavedConfiguration> for LoadResponse {
    fn from(saved: SavedConfiguration) -> Self {
        Self {
            success: true,
            configuration: Some(saved.configuration),
            id: Some(saved.id),
            name: Some(saved.name),
            model: saved.model,
            total_price: Some(saved.total_price),
            timestamp: Some(saved.timestamp),
        }
    }
}

/// Listing entry; omits the configuration body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationSummary {
    pub id: String,
    pub name: String,
    pub model: Option<String>,
    pub total_price: f64,
    pub timestamp: String,
}

/// Body of the price and validation endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub model: Option<String>,
    #[serde(default)]
    pub configuration: Configuration,
}
