//! Execute placement intents against the layout service
//!
//! Intents run strictly one at a time, in the order the grouper produced
//! them: a later symbol reference may belong to an earlier macro, so no
//! call may overtake another. A failed intent is reported and skipped;
//! the run continues with the next one.

use uuid::Uuid;

use crate::api::{AttributeUpdates, LayoutService, Location, PlacementHeader, PlacementsSelector};

use super::grouping::PlacementIntent;
use super::ImportEvents;

/// Per-run outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub failed: usize,
}

/// Run every intent against the service and report outcomes through
/// `events`. Remote failures are local recovery points, never fatal.
pub async fn execute_intents<S: LayoutService + Sync>(
    service: &S,
    layout_guid: Uuid,
    intents: Vec<PlacementIntent>,
    events: &mut dyn ImportEvents,
) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for intent in intents {
        let kind = intent.kind();
        let result = match &intent {
            PlacementIntent::MacroInstance {
                macro_path,
                x,
                y,
                identification,
            } => {
                events.on_log(&format!("Creating macro: {} ...", macro_path));
                service
                    .create_placement(
                        layout_guid,
                        macro_path,
                        Location { x: *x, y: *y },
                        0.0,
                        (!identification.is_empty()).then_some(identification.as_str()),
                        Vec::new(),
                    )
                    .await
            }
            PlacementIntent::SymbolReference {
                symbol_path,
                x,
                y,
                rotation_rad,
                placement_guid,
                attributes,
            } => {
                events.on_log(&format!("Creating symbol: {} ...", symbol_path));
                let updates = AttributeUpdates {
                    selector: PlacementsSelector::placement(*placement_guid),
                    value_parts: attributes.value_parts.clone(),
                    overwritten_values: attributes.overwritten_values.clone(),
                };
                service
                    .create_placement(
                        layout_guid,
                        symbol_path,
                        Location { x: *x, y: *y },
                        *rotation_rad,
                        None,
                        vec![updates],
                    )
                    .await
            }
        };

        match result {
            Ok(mut created) => {
                summary.created += 1;
                sort_by_identification(&mut created);
                for header in &created {
                    events.on_placement_created(kind, header);
                }
            }
            Err(error) => {
                summary.failed += 1;
                let names = intent.attribute_names();
                if names.is_empty() {
                    log::error!("Failed to create {} '{}': {:#}", kind, intent.type_path(), error);
                } else {
                    log::error!(
                        "Failed to create {} '{}' (attributes: {}): {:#}",
                        kind,
                        intent.type_path(),
                        names.join(", "),
                        error
                    );
                }
                events.on_log(&format!(
                    "Failed to create {} '{}': {:#}",
                    kind,
                    intent.type_path(),
                    error
                ));
            }
        }
    }

    summary
}

/// Created placements are reported sorted by identification, empty first
fn sort_by_identification(headers: &mut [PlacementHeader]) {
    headers.sort_by(|a, b| {
        a.identification
            .as_deref()
            .unwrap_or_default()
            .cmp(b.identification.as_deref().unwrap_or_default())
    });
}
