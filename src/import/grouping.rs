//! Group import rows into placement intents
//!
//! Rows sharing a macro reference id collapse into one macro-instance
//! intent; the rest become standalone symbol-reference intents. Macro
//! intents always come first in the output so a symbol reference can
//! never be created before the macro it may belong to.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attributes::AttributeImport;
use super::placements::{ImportPlacement, SYMBOL_REFERENCE_TYPE};

/// How a macro cluster's identification is chosen among its member rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentificationStrategy {
    /// First member row (in sheet order) with a non-empty identification
    #[default]
    FirstEncountered,
    /// Alphabetically smallest non-empty identification
    AlphabeticalMin,
}

/// The kind of a placement intent, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    MacroInstance,
    SymbolReference,
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentKind::MacroInstance => write!(f, "macro instance"),
            IntentKind::SymbolReference => write!(f, "symbol reference"),
        }
    }
}

/// One unit of work against the layout service
#[derive(Debug, Clone)]
pub enum PlacementIntent {
    /// Create a macro instance at the cluster's anchor
    MacroInstance {
        macro_path: String,
        x: i32,
        y: i32,
        identification: String,
    },
    /// Create a standalone symbol reference with its attribute payload
    SymbolReference {
        symbol_path: String,
        x: i32,
        y: i32,
        rotation_rad: f32,
        /// Placement id from the sheet, used to scope the attribute update
        placement_guid: Uuid,
        attributes: AttributeImport,
    },
}

impl PlacementIntent {
    pub fn kind(&self) -> IntentKind {
        match self {
            PlacementIntent::MacroInstance { .. } => IntentKind::MacroInstance,
            PlacementIntent::SymbolReference { .. } => IntentKind::SymbolReference,
        }
    }

    /// The symbol or macro path the intent will instantiate
    pub fn type_path(&self) -> &str {
        match self {
            PlacementIntent::MacroInstance { macro_path, .. } => macro_path,
            PlacementIntent::SymbolReference { symbol_path, .. } => symbol_path,
        }
    }

    /// Attribute key names carried by the intent, for failure reports
    pub fn attribute_names(&self) -> Vec<&str> {
        match self {
            PlacementIntent::MacroInstance { .. } => Vec::new(),
            PlacementIntent::SymbolReference { attributes, .. } => attributes.attribute_names(),
        }
    }
}

/// Partition rows into macro clusters and standalone placements and
/// resolve each cluster's anchor and identification.
///
/// Every row lands in exactly one bucket: a macro cluster, the standalone
/// output, or the discard pile (sub-symbols, connection symbols and
/// non-symbol-reference rows, which are not independently placeable).
pub fn group_placements(
    placements: Vec<ImportPlacement>,
    strategy: IdentificationStrategy,
) -> Vec<PlacementIntent> {
    let mut clusters: IndexMap<Uuid, Vec<ImportPlacement>> = IndexMap::new();
    let mut standalone = Vec::new();

    for placement in placements {
        match placement.macro_reference_guid {
            Some(reference) => clusters.entry(reference).or_default().push(placement),
            None => standalone.push(placement),
        }
    }

    let mut intents = Vec::new();

    for (_, members) in clusters {
        intents.push(resolve_macro_cluster(&members, strategy));
    }

    let importable = standalone
        .into_iter()
        .filter(|p| p.placement_type == SYMBOL_REFERENCE_TYPE)
        .filter(|p| !p.is_sub_symbol)
        .filter(|p| !p.is_connection_symbol);

    for placement in importable {
        let rotation_rad = placement.rotation_z / 360.0 * 2.0 * std::f32::consts::PI;
        intents.push(PlacementIntent::SymbolReference {
            symbol_path: placement.symbol_path,
            x: placement.x as i32,
            y: placement.y as i32,
            rotation_rad,
            placement_guid: placement.placement_guid,
            attributes: placement.attributes,
        });
    }

    intents
}

fn resolve_macro_cluster(
    members: &[ImportPlacement],
    strategy: IdentificationStrategy,
) -> PlacementIntent {
    // top-left-biased anchor: the source system's vertical axis grows
    // downward while layout Y grows upward, so top is the maximum Y
    let left = members.iter().map(|m| m.x).fold(f32::INFINITY, f32::min);
    let top = members.iter().map(|m| m.y).fold(f32::NEG_INFINITY, f32::max);

    let mut non_empty = members
        .iter()
        .map(|m| m.full_identifying_value.as_str())
        .filter(|id| !id.is_empty());
    let identification = match strategy {
        IdentificationStrategy::FirstEncountered => non_empty.next(),
        IdentificationStrategy::AlphabeticalMin => non_empty.min(),
    }
    .unwrap_or_default()
    .to_string();

    PlacementIntent::MacroInstance {
        macro_path: members[0].macro_path.clone(),
        x: left as i32,
        y: top as i32,
        identification,
    }
}
