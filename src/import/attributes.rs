//! Assemble one row's attribute values from its classified columns

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::api::AttributeValuePart;
use crate::import::excel::CellValue;
use crate::import::schema::KeySchema;
use crate::import::ImportError;

/// The finished attribute payload of one import row
#[derive(Debug, Clone, Default)]
pub struct AttributeImport {
    /// Value entries in first-encountered key order
    pub value_parts: Vec<AttributeValuePart>,
    /// Attribute names whose whole value was manually overwritten, as
    /// opposed to a single key part of it
    pub overwritten_values: HashMap<String, bool>,
}

impl AttributeImport {
    /// Key names involved in this payload, for error reporting
    pub fn attribute_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .value_parts
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.overwritten_values.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// Combine the classified columns of one data row into finished attribute
/// entries.
///
/// Entries accumulate per key name, not per prefix: several prefixes can
/// write to the same logical key (e.g. two connector description columns
/// feeding one SubBMK name). `sheet_row` is the 1-based sheet row number
/// (header is row 1) and only used for error context.
pub fn assemble_row(
    cells: &[CellValue],
    schema: &KeySchema,
    data_language: &str,
    sheet_row: usize,
) -> Result<AttributeImport, ImportError> {
    let mut parts: IndexMap<&str, AttributeValuePart> = IndexMap::new();
    let mut overwritten_values = HashMap::new();

    for key in schema.keys() {
        // orphan key parts (no primary for their prefix) never surface
        if key.is_key_part && !schema.has_primary(&key.prefix) {
            continue;
        }

        let cell = cells.get(key.ordinal).unwrap_or(&CellValue::Null);
        let part = parts
            .entry(key.key_name.as_str())
            .or_insert_with(|| AttributeValuePart::named(key.key_name.as_str()));

        if key.is_overwritten {
            let flag = cell.as_bool().ok_or_else(|| ImportError::MalformedCell {
                row: sheet_row,
                column: key.column_name.clone(),
                message: format!("expected a boolean overwrite flag, got '{}'", cell),
            })?;
            if flag {
                if key.is_key_part {
                    part.is_overwritten = true;
                } else {
                    overwritten_values.insert(key.key_name.clone(), true);
                }
            }
        } else if key.is_description {
            part.language = Some(data_language.to_string());
            part.description = Some(cell.to_text());
        } else {
            part.value = Some(cell.to_text());
        }
    }

    // Composite attributes are carried solely by their key-part children;
    // the parent key's own entry would be redundant.
    let composites = schema.composite_key_names();

    let value_parts = parts
        .into_values()
        .filter(|part| !composites.contains(part.name.as_str()))
        .filter(|part| part.is_overwritten || part.has_value() || part.has_description())
        .flat_map(split_value_and_description)
        .collect();

    Ok(AttributeImport {
        value_parts,
        overwritten_values,
    })
}

/// The service needs value-set and description-set as two separate update
/// commands, so an entry carrying both is split in two. Applied once per
/// entry; the halves each carry only one of the two and pass through
/// unchanged on a second application.
fn split_value_and_description(part: AttributeValuePart) -> Vec<AttributeValuePart> {
    if !part.has_value() || !part.has_description() {
        return vec![part];
    }

    let description_part = AttributeValuePart {
        name: part.name.clone(),
        language: part.language.clone(),
        description: part.description.clone(),
        value: None,
        index: None,
        is_overwritten: true,
    };

    let mut value_part = part;
    value_part.language = None;
    value_part.description = None;
    value_part.is_overwritten = false;

    vec![value_part, description_part]
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    const LANGUAGE: &str = "en-US";

    fn schema_for(headers: &[&str]) -> KeySchema {
        let columns: IndexMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_string(), i))
            .collect();
        KeySchema::from_headers(&columns)
    }

    fn text(value: &str) -> CellValue {
        CellValue::from_text(value)
    }

    #[test]
    fn value_and_description_columns_merge_into_one_entry() {
        let schema = schema_for(&["[=] Station", "[=] Station Is overwritten"]);
        let cells = vec![text("S10"), CellValue::Bool(false)];

        let import = assemble_row(&cells, &schema, LANGUAGE, 2).unwrap();
        assert_eq!(import.value_parts.len(), 1);
        let part = &import.value_parts[0];
        assert_eq!(part.name, "Station");
        assert_eq!(part.value.as_deref(), Some("S10"));
        assert!(!part.is_overwritten);
        assert!(import.overwritten_values.is_empty());
    }

    #[test]
    fn empty_entries_are_dropped() {
        let schema = schema_for(&["[=] Station", "[-] BMK"]);
        let cells = vec![CellValue::Null, text("K1")];

        let import = assemble_row(&cells, &schema, LANGUAGE, 2).unwrap();
        assert_eq!(import.value_parts.len(), 1);
        assert_eq!(import.value_parts[0].name, "BMK");
    }

    #[test]
    fn overwrite_only_entries_survive() {
        let schema = schema_for(&["[=] (P) Counter Is overwritten", "[=] Counter"]);
        let cells = vec![CellValue::Bool(true), CellValue::Null];

        let import = assemble_row(&cells, &schema, LANGUAGE, 2).unwrap();
        assert_eq!(import.value_parts.len(), 1);
        let part = &import.value_parts[0];
        assert_eq!(part.name, "Counter");
        assert!(part.is_overwritten);
        assert!(!part.has_value() && !part.has_description());
    }

    #[test]
    fn whole_attribute_overwrites_are_tracked_separately() {
        let schema = schema_for(&["[-] ArtNr", "[-] ArtNr Is overwritten"]);
        let cells = vec![text("A-123"), CellValue::Bool(true)];

        let import = assemble_row(&cells, &schema, LANGUAGE, 2).unwrap();
        assert_eq!(import.overwritten_values.get("ArtNr"), Some(&true));
        // the entry itself is not flagged, the whole attribute is
        assert!(!import.value_parts[0].is_overwritten);
    }

    #[test]
    fn malformed_overwrite_flag_is_fatal() {
        let schema = schema_for(&["[=] Station Is overwritten", "[=] Station"]);
        let cells = vec![text("maybe"), text("S10")];

        let result = assemble_row(&cells, &schema, LANGUAGE, 4);
        match result {
            Err(ImportError::MalformedCell { row, column, .. }) => {
                assert_eq!(row, 4);
                assert_eq!(column, "[=] Station Is overwritten");
            }
            other => panic!("expected MalformedCell, got {:?}", other),
        }
    }

    #[test]
    fn composite_parents_are_suppressed() {
        let schema = schema_for(&["[=] BMK", "[=] (P) FG-Counter"]);
        let cells = vec![text("==A1"), text("7")];

        let import = assemble_row(&cells, &schema, LANGUAGE, 2).unwrap();
        let names: Vec<&str> = import.value_parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["FG-Counter"]);
    }

    #[test]
    fn value_with_description_splits_into_two_commands() {
        let schema = schema_for(&["[=] Station", "[=] Station Description"]);
        let cells = vec![text("S10"), text("main station")];

        let import = assemble_row(&cells, &schema, LANGUAGE, 2).unwrap();
        assert_eq!(import.value_parts.len(), 2);

        let value_part = &import.value_parts[0];
        assert_eq!(value_part.value.as_deref(), Some("S10"));
        assert!(value_part.description.is_none());
        assert!(value_part.language.is_none());
        assert!(!value_part.is_overwritten);

        let description_part = &import.value_parts[1];
        assert!(description_part.value.is_none());
        assert_eq!(description_part.description.as_deref(), Some("main station"));
        assert_eq!(description_part.language.as_deref(), Some(LANGUAGE));
        assert!(description_part.is_overwritten);
    }

    #[test]
    fn splitting_is_idempotent() {
        let part = AttributeValuePart {
            name: "Station".into(),
            value: Some("S10".into()),
            description: Some("main station".into()),
            language: Some(LANGUAGE.into()),
            ..Default::default()
        };

        let split = split_value_and_description(part);
        assert_eq!(split.len(), 2);

        let again: Vec<_> = split
            .iter()
            .cloned()
            .flat_map(split_value_and_description)
            .collect();
        assert_eq!(again, split);
    }

    #[test]
    fn orphan_key_parts_never_surface() {
        // prefix ':1' has only key-part columns, so there is no primary
        // and its cells are ignored entirely
        let schema = schema_for(&["[:1] (P) SubBMK", "[=] BMK"]);
        let cells = vec![text("orphaned"), text("K1")];

        let import = assemble_row(&cells, &schema, LANGUAGE, 2).unwrap();
        let names: Vec<&str> = import.value_parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["BMK"]);
    }

    #[test]
    fn entries_keep_first_encounter_order() {
        let schema = schema_for(&["[-] BMK", "[=] Station", "[-] BMK Is overwritten"]);
        let cells = vec![text("K1"), text("S10"), CellValue::Bool(false)];

        let import = assemble_row(&cells, &schema, LANGUAGE, 2).unwrap();
        let names: Vec<&str> = import.value_parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["BMK", "Station"]);
    }

    #[test]
    fn round_trip_reproduces_the_row_cells() {
        let schema = schema_for(&[
            "[=] Station",
            "[=] Station Description",
            "[-] BMK",
        ]);
        let cells = vec![text("S10"), text("main station"), text("K1")];

        let import = assemble_row(&cells, &schema, LANGUAGE, 2).unwrap();

        // re-derive (name, value, description) triples; after the split a
        // name may appear twice, carrying value and description separately
        let mut derived: HashMap<(String, Option<String>, Option<String>), usize> = HashMap::new();
        for part in &import.value_parts {
            *derived
                .entry((part.name.clone(), part.value.clone(), part.description.clone()))
                .or_default() += 1;
        }

        assert_eq!(derived.len(), 3);
        assert_eq!(derived[&("Station".into(), Some("S10".into()), None)], 1);
        assert_eq!(
            derived[&("Station".into(), None, Some("main station".into()))],
            1
        );
        assert_eq!(derived[&("BMK".into(), Some("K1".into()), None)], 1);
    }
}
