//! SO3 layout service Web API client

pub mod client;
pub mod models;

pub use client::So3Client;
pub use models::{
    AttributeUpdates, AttributeValuePart, LayoutPage, Location, Placement, PlacementHeader,
    PlacementsSelector,
};

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// The layout-service operations the import pipeline depends on.
///
/// `So3Client` is the production implementation; tests drive the
/// orchestrator against a recording mock instead.
#[async_trait]
pub trait LayoutService {
    /// Create a placement from a symbol or macro path and return the
    /// headers of everything the service placed for it
    async fn create_placement(
        &self,
        layout_guid: Uuid,
        type_path: &str,
        location: Location,
        rotation_z: f32,
        identification: Option<&str>,
        attribute_updates: Vec<AttributeUpdates>,
    ) -> Result<Vec<PlacementHeader>>;

    /// Update attribute values and/or the identification of the selected
    /// placements
    async fn update_attributes(
        &self,
        layout_guid: Uuid,
        selector: PlacementsSelector,
        data_language: Option<&str>,
        identification: Option<&str>,
        value_parts: Option<Vec<AttributeValuePart>>,
    ) -> Result<()>;
}
