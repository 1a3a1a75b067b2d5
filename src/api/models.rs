//! Wire types for the SO3 layout service
//!
//! The service speaks JSON with PascalCase property names and parses
//! request bodies case-insensitively, so every type here carries
//! `rename_all = "PascalCase"`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifying header of a placement, returned by create and query calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlacementHeader {
    /// Placement GUID assigned by the service
    pub guid: Uuid,
    /// Human-readable identification text, if any
    pub identification: Option<String>,
}

/// A point on a layout page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

/// Selects the placements an attribute update applies to.
///
/// Exactly one of the options is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlacementsSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_guid: Option<Uuid>,
}

impl PlacementsSelector {
    /// Select every placement on the layout page
    pub fn all() -> Self {
        PlacementsSelector {
            all: Some(true),
            identification_prefix: None,
            placement_guid: None,
        }
    }

    /// Select placements whose identification starts with the given prefix
    pub fn identification_prefix(prefix: impl Into<String>) -> Self {
        PlacementsSelector {
            all: None,
            identification_prefix: Some(prefix.into()),
            placement_guid: None,
        }
    }

    /// Select a single placement by GUID
    pub fn placement(guid: Uuid) -> Self {
        PlacementsSelector {
            all: None,
            identification_prefix: None,
            placement_guid: Some(guid),
        }
    }
}

/// One finished (name, value) pair of an attribute update.
///
/// A part carries either a value or a description; the service requires
/// value-set and description-set as two separate parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeValuePart {
    /// Attribute key name
    pub name: String,
    /// Locale tag, required when `description` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Discriminator for indexed attributes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Free-text description, only for identifying values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Marks the part as manually overwritten so the service will not
    /// recalculate it from defaults
    #[serde(default)]
    pub is_overwritten: bool,
}

impl AttributeValuePart {
    /// An empty part with just a name, to be filled in column by column
    pub fn named(name: impl Into<String>) -> Self {
        AttributeValuePart {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A plain value part
    pub fn value(name: impl Into<String>, value: impl Into<String>) -> Self {
        AttributeValuePart {
            name: name.into(),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn has_value(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.is_empty())
    }

    pub fn has_description(&self) -> bool {
        self.description.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// Attribute updates scoped to a set of placements
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeUpdates {
    pub selector: PlacementsSelector,
    pub value_parts: Vec<AttributeValuePart>,
    /// Attribute names whose whole value (as opposed to a single key part)
    /// was manually overwritten
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub overwritten_values: HashMap<String, bool>,
}

impl AttributeUpdates {
    pub fn new(selector: PlacementsSelector, value_parts: Vec<AttributeValuePart>) -> Self {
        AttributeUpdates {
            selector,
            value_parts,
            overwritten_values: HashMap::new(),
        }
    }
}

/// A placement with its resolved attribute values, as returned by the
/// paged placements query
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Placement {
    pub header: PlacementHeader,
    pub location: Location,
    #[serde(default)]
    pub rotation_z: f32,
    #[serde(default)]
    pub attribute_value_parts: Vec<AttributeValuePart>,
}

// === Request bodies ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CreateLayoutPageRequest<'a> {
    pub path: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TypeReference<'a> {
    pub path: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CreatePlacementRequest<'a> {
    #[serde(rename = "Type")]
    pub placement_type: TypeReference<'a>,
    pub location: Location,
    pub rotation_z: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification: Option<&'a str>,
    pub attribute_updates: Vec<AttributeUpdates>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct UpdateAttributesRequest<'a> {
    pub selector: PlacementsSelector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_parts: Option<Vec<AttributeValuePart>>,
}

// === Response bodies ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct LoginResponse {
    pub token: String,
}

/// A layout page as returned by lookup and create calls
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayoutPage {
    pub layout_guid: Uuid,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CreatePlacementResponse {
    #[serde(default)]
    pub placements: Option<Vec<PlacementHeader>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GetPlacementsResponse {
    #[serde(default)]
    pub placements: Vec<Placement>,
    #[serde(default)]
    pub has_next: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_serializes_only_the_set_option() {
        let by_guid = PlacementsSelector::placement(Uuid::nil());
        let json = serde_json::to_value(&by_guid).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "PlacementGuid": "00000000-0000-0000-0000-000000000000" })
        );

        let by_prefix = PlacementsSelector::identification_prefix("==A");
        let json = serde_json::to_value(&by_prefix).unwrap();
        assert_eq!(json, serde_json::json!({ "IdentificationPrefix": "==A" }));
    }

    #[test]
    fn value_part_uses_pascal_case_names() {
        let part = AttributeValuePart {
            name: "BMK".into(),
            language: Some("en-US".into()),
            description: Some("main breaker".into()),
            is_overwritten: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["Name"], "BMK");
        assert_eq!(json["Language"], "en-US");
        assert_eq!(json["Description"], "main breaker");
        assert_eq!(json["IsOverwritten"], true);
        assert!(json.get("Value").is_none());
    }

    #[test]
    fn placement_header_round_trips() {
        let json = r#"{ "Guid": "6f9619ff-8b86-d011-b42d-00c04fc964ff", "Identification": "==A1" }"#;
        let header: PlacementHeader = serde_json::from_str(json).unwrap();
        assert_eq!(header.identification.as_deref(), Some("==A1"));
    }
}
