//! Spreadsheet-driven placement import
//!
//! Turns an element-list export into create-placement and
//! update-attribute operations against a layout page: headers are
//! classified into an attribute key schema, each row's attribute values
//! are assembled, rows are grouped into macro clusters and standalone
//! symbol references, and the resulting intents run against the service
//! in a fixed macros-first order.

pub mod attributes;
pub mod excel;
pub mod executor;
pub mod grouping;
pub mod placements;
pub mod schema;

pub use attributes::AttributeImport;
pub use excel::{read_sheet, CellValue, SheetData};
pub use executor::{execute_intents, ImportSummary};
pub use grouping::{group_placements, IdentificationStrategy, IntentKind, PlacementIntent};
pub use placements::{extract_placements, ImportPlacement};
pub use schema::{ColumnKey, KeySchema};

use std::path::Path;

use colored::Colorize;
use thiserror::Error;
use uuid::Uuid;

use crate::api::{LayoutService, PlacementHeader};

/// Errors that abort an import before any remote call
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("import file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported import format: .{0} (expected .xlsx, .xls or .csv)")]
    UnsupportedFormat(String),

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column missing: {0}")]
    MissingColumn(String),

    #[error("row {row}, column '{column}': {message}")]
    MalformedCell {
        row: usize,
        column: String,
        message: String,
    },
}

/// Progress sink for an import run.
///
/// The pipeline never prints; callers decide how to present progress by
/// passing an implementation (console output, a service log, a test
/// recorder).
pub trait ImportEvents {
    fn on_log(&mut self, message: &str);
    fn on_placement_created(&mut self, kind: IntentKind, header: &PlacementHeader);
}

/// Prints progress to stdout, the way the interactive CLI shows it
#[derive(Debug, Default)]
pub struct ConsoleEvents;

impl ImportEvents for ConsoleEvents {
    fn on_log(&mut self, message: &str) {
        println!("{}", message);
    }

    fn on_placement_created(&mut self, kind: IntentKind, header: &PlacementHeader) {
        println!(
            "  {} {} - {}",
            kind.to_string().dimmed(),
            header.guid,
            header.identification.as_deref().unwrap_or_default().green()
        );
    }
}

/// The import pipeline, bound to a layout service
pub struct Importer<'a, S> {
    service: &'a S,
    data_language: String,
    strategy: IdentificationStrategy,
}

impl<'a, S: LayoutService + Sync> Importer<'a, S> {
    pub fn new(service: &'a S, data_language: impl Into<String>) -> Self {
        Importer {
            service,
            data_language: data_language.into(),
            strategy: IdentificationStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: IdentificationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Run the whole pipeline for one file.
    ///
    /// The sheet is read and converted completely before the first remote
    /// call, so parse errors abort without side effects. Remote failures
    /// of single intents are reported through `events` and do not abort
    /// the run.
    pub async fn import_from_file(
        &self,
        path: &Path,
        layout_guid: Uuid,
        events: &mut dyn ImportEvents,
    ) -> Result<ImportSummary, ImportError> {
        let sheet = read_sheet(path)?;
        let schema = KeySchema::from_headers(&sheet.columns);
        let placements = extract_placements(&sheet, &schema, &self.data_language)?;

        events.on_log(&format!(
            "Loaded {} placements ({} attribute columns) from {}",
            placements.len(),
            schema.keys().len(),
            path.display()
        ));

        let intents = group_placements(placements, self.strategy);
        events.on_log(&format!("Importing {} placements ...", intents.len()));

        Ok(execute_intents(self.service, layout_guid, intents, events).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AttributeUpdates, AttributeValuePart, Location, PlacementsSelector};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::Builder;

    #[derive(Default)]
    struct RecordingService {
        created: Mutex<Vec<(String, i32, i32, Option<String>)>>,
    }

    #[async_trait]
    impl LayoutService for RecordingService {
        async fn create_placement(
            &self,
            _layout_guid: Uuid,
            type_path: &str,
            location: Location,
            _rotation_z: f32,
            identification: Option<&str>,
            _attribute_updates: Vec<AttributeUpdates>,
        ) -> Result<Vec<PlacementHeader>> {
            self.created.lock().unwrap().push((
                type_path.to_string(),
                location.x,
                location.y,
                identification.map(str::to_string),
            ));
            Ok(vec![PlacementHeader {
                guid: Uuid::from_u128(42),
                identification: identification.map(str::to_string),
            }])
        }

        async fn update_attributes(
            &self,
            _layout_guid: Uuid,
            _selector: PlacementsSelector,
            _data_language: Option<&str>,
            _identification: Option<&str>,
            _value_parts: Option<Vec<AttributeValuePart>>,
        ) -> Result<()> {
            Ok(())
        }
    }

    struct SilentEvents;

    impl ImportEvents for SilentEvents {
        fn on_log(&mut self, _message: &str) {}
        fn on_placement_created(&mut self, _kind: IntentKind, _header: &PlacementHeader) {}
    }

    #[tokio::test]
    async fn imports_a_macro_cluster_before_the_standalone_symbol() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            file,
            "PlacementGuid,Placement type,Full identifying value,X,Y,Z,Rotation Z,\
             Symbol path,Macro path,Macro reference guid,IsSubSymbol,IsConnectionSymbol,[=] Station"
        )
        .unwrap();
        // two rows sharing macro instance M1, one with identification
        writeln!(
            file,
            "00000000-0000-0000-0000-000000000001,SymbolReference,==A,5,10,0,0,\
             Symbols/S01,Macros/M01,00000000-0000-0000-0000-0000000000aa,False,False,"
        )
        .unwrap();
        writeln!(
            file,
            "00000000-0000-0000-0000-000000000002,SymbolReference,,2,20,0,0,\
             Symbols/S01,Macros/M01,00000000-0000-0000-0000-0000000000aa,False,False,"
        )
        .unwrap();
        // one unrelated standalone symbol reference
        writeln!(
            file,
            "00000000-0000-0000-0000-000000000003,SymbolReference,==B,7,7,0,180,\
             Symbols/S02,,,False,False,S7"
        )
        .unwrap();

        let service = RecordingService::default();
        let importer = Importer::new(&service, "en-US");
        let summary = importer
            .import_from_file(file.path(), Uuid::from_u128(9), &mut SilentEvents)
            .await
            .unwrap();

        assert_eq!(summary, ImportSummary { created: 2, failed: 0 });

        let created = service.created.lock().unwrap();
        assert_eq!(created.len(), 2);
        // macro first, at the (min X, max Y) anchor, with the first
        // non-empty identification of the cluster
        assert_eq!(
            created[0],
            ("Macros/M01".to_string(), 2, 20, Some("==A".to_string()))
        );
        assert_eq!(created[1].0, "Symbols/S02");
    }

    #[tokio::test]
    async fn parse_failures_abort_before_any_remote_call() {
        let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(
            file,
            "PlacementGuid,Placement type,Full identifying value,X,Y,Z,Rotation Z,\
             Symbol path,Macro path,Macro reference guid,IsSubSymbol,IsConnectionSymbol"
        )
        .unwrap();
        writeln!(
            file,
            "00000000-0000-0000-0000-000000000001,SymbolReference,,not-a-number,0,0,0,\
             Symbols/S01,,,False,False"
        )
        .unwrap();

        let service = RecordingService::default();
        let importer = Importer::new(&service, "en-US");
        let result = importer
            .import_from_file(file.path(), Uuid::from_u128(9), &mut SilentEvents)
            .await;

        assert!(matches!(result, Err(ImportError::MalformedCell { column, .. }) if column == "X"));
        assert!(service.created.lock().unwrap().is_empty());
    }
}
