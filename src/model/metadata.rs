//! Document metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The optional top-level `metadata` member. The common members are typed;
/// anything else round-trips through `other`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(rename = "citymodelIdentifier", skip_serializing_if = "Option::is_none")]
    pub citymodel_identifier: Option<String>,

    #[serde(rename = "datasetTitle", skip_serializing_if = "Option::is_none")]
    pub dataset_title: Option<String>,

    #[serde(rename = "datasetReferenceDate", skip_serializing_if = "Option::is_none")]
    pub dataset_reference_date: Option<String>,

    #[serde(rename = "datasetLanguage", skip_serializing_if = "Option::is_none")]
    pub dataset_language: Option<String>,

    #[serde(rename = "datasetTopicCategory", skip_serializing_if = "Option::is_none")]
    pub dataset_topic_category: Option<String>,

    #[serde(rename = "geographicLocation", skip_serializing_if = "Option::is_none")]
    pub geographic_location: Option<String>,

    #[serde(rename = "referenceSystem", skip_serializing_if = "Option::is_none")]
    pub reference_system: Option<String>,

    #[serde(rename = "geographicalExtent", skip_serializing_if = "Option::is_none")]
    pub geographical_extent: Option<[f64; 6]>,

    #[serde(rename = "datasetPointOfContact", skip_serializing_if = "Option::is_none")]
    pub dataset_point_of_contact: Option<Value>,

    #[serde(rename = "metadataStandard", skip_serializing_if = "Option::is_none")]
    pub metadata_standard: Option<String>,

    #[serde(
        rename = "metadataStandardVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata_standard_version: Option<String>,

    #[serde(rename = "presentLoDs", skip_serializing_if = "Option::is_none")]
    pub present_lods: Option<BTreeMap<String, u64>>,

    /// Metadata members outside the common set.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }
}
