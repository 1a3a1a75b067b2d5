//! Attribute key schema recovered from sheet column headers
//!
//! The element-list export encodes attribute columns as
//! `[<prefix>] <key name>`, with two derived columns per attribute:
//! `… Is overwritten` (boolean overwrite flag) and `… Description`
//! (free-text description). A `(P) ` marker after the prefix flags the
//! column as a key part of a composite attribute, e.g.
//! `[=] (P) FG-Counter Is overwritten`.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static DESCRIPTION_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(?P<prefix>.+)\] (?P<key_part>\(P\) )?(?P<key>.+) Description$").unwrap()
});

static OVERWRITTEN_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(?P<prefix>.+)\] (?P<key_part>\(P\) )?(?P<key>.+) Is overwritten$").unwrap()
});

static BASE_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?P<prefix>.+)\] (?P<key_part>\(P\) )?(?P<key>.+)$").unwrap());

/// One classified attribute column
#[derive(Debug, Clone)]
pub struct ColumnKey {
    /// Raw header text, unique per sheet
    pub column_name: String,
    /// Bracketed qualifier grouping the columns of one attribute
    pub prefix: String,
    /// Human attribute name after the qualifier
    pub key_name: String,
    /// Zero-based column ordinal
    pub ordinal: usize,
    /// Marked as part of the placement's identifying key
    pub is_key_part: bool,
    /// Carries the boolean overwrite flag for the attribute
    pub is_overwritten: bool,
    /// Carries the free-text description for the attribute
    pub is_description: bool,
    /// Arena index of the primary key this key is a child of
    pub parent: Option<usize>,
    /// Arena indices of key-part children, in column order
    pub children: Vec<usize>,
}

/// All attribute columns of a sheet, with the parent/child structure of
/// composite keys resolved.
///
/// Keys live in an arena (`Vec`) and reference each other by index, so the
/// parent back-references of the original column hierarchy stay cycle-free.
#[derive(Debug, Default)]
pub struct KeySchema {
    keys: Vec<ColumnKey>,
    /// Prefixes that resolved to a primary key
    primary_prefixes: HashSet<String>,
}

impl KeySchema {
    /// Classify every header and resolve the primary/child structure
    pub fn from_headers(columns: &IndexMap<String, usize>) -> Self {
        let mut keys: Vec<ColumnKey> = columns
            .iter()
            .filter_map(|(name, &ordinal)| classify_header(name, ordinal))
            .collect();

        // One primary key per prefix, chosen among the non-key-part
        // columns. The tie-break (key-part-ness, then overwritten-ness,
        // then column order) decides which column's value becomes the
        // attribute's canonical value and is kept as observed.
        let mut candidates: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (index, key) in keys.iter().enumerate() {
            if !key.is_key_part {
                candidates.entry(key.prefix.as_str()).or_default().push(index);
            }
        }

        let mut primaries: HashMap<String, usize> = HashMap::new();
        for (prefix, mut group) in candidates {
            group.sort_by_key(|&i| (keys[i].is_key_part, keys[i].is_overwritten));
            primaries.insert(prefix.to_string(), group[0]);
        }

        let attachments: Vec<(usize, usize)> = keys
            .iter()
            .enumerate()
            .filter(|(_, key)| key.is_key_part && !key.is_overwritten)
            .filter_map(|(index, key)| {
                primaries.get(key.prefix.as_str()).map(|&primary| (index, primary))
            })
            .filter(|(index, primary)| index != primary)
            .collect();

        for (child, primary) in attachments {
            keys[child].parent = Some(primary);
            keys[primary].children.push(child);
        }

        // Key parts under a prefix with no non-key-part column have no
        // primary to attach to and never surface as attributes.
        for key in &keys {
            if key.is_key_part && key.parent.is_none() && !primaries.contains_key(&key.prefix) {
                log::warn!(
                    "no primary key column for prefix '{}'; ignoring key part '{}'",
                    key.prefix,
                    key.column_name
                );
            }
        }

        KeySchema {
            keys,
            primary_prefixes: primaries.into_keys().collect(),
        }
    }

    /// All classified keys, in column order
    pub fn keys(&self) -> &[ColumnKey] {
        &self.keys
    }

    /// Whether a prefix resolved to a primary key. Key parts of a prefix
    /// without one are orphans and take no part in assembly.
    pub fn has_primary(&self, prefix: &str) -> bool {
        self.primary_prefixes.contains(prefix)
    }

    /// Key names of composite attributes, i.e. keys that own children.
    /// Their entries are represented solely via the children.
    pub fn composite_key_names(&self) -> HashSet<&str> {
        self.keys
            .iter()
            .filter(|key| !key.children.is_empty())
            .map(|key| key.key_name.as_str())
            .collect()
    }
}

fn classify_header(name: &str, ordinal: usize) -> Option<ColumnKey> {
    let (captures, is_description, is_overwritten) =
        if let Some(captures) = DESCRIPTION_COLUMN.captures(name) {
            (captures, true, false)
        } else if let Some(captures) = OVERWRITTEN_COLUMN.captures(name) {
            (captures, false, true)
        } else if let Some(captures) = BASE_COLUMN.captures(name) {
            (captures, false, false)
        } else {
            // not an attribute column
            return None;
        };

    Some(ColumnKey {
        column_name: name.to_string(),
        prefix: captures["prefix"].to_string(),
        key_name: captures["key"].to_string(),
        ordinal,
        is_key_part: captures.name("key_part").is_some(),
        is_overwritten,
        is_description,
        parent: None,
        children: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_for(headers: &[&str]) -> KeySchema {
        let columns: IndexMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_string(), i))
            .collect();
        KeySchema::from_headers(&columns)
    }

    fn find<'a>(schema: &'a KeySchema, column_name: &str) -> &'a ColumnKey {
        schema
            .keys()
            .iter()
            .find(|k| k.column_name == column_name)
            .unwrap()
    }

    #[test]
    fn classifies_the_three_column_shapes() {
        let schema = schema_for(&[
            "[=] Station",
            "[=] Station Is overwritten",
            "[=] Station Description",
        ]);

        let base = find(&schema, "[=] Station");
        assert_eq!(base.prefix, "=");
        assert_eq!(base.key_name, "Station");
        assert!(!base.is_key_part && !base.is_overwritten && !base.is_description);

        let overwritten = find(&schema, "[=] Station Is overwritten");
        assert!(overwritten.is_overwritten && !overwritten.is_description);
        assert_eq!(overwritten.key_name, "Station");

        let description = find(&schema, "[=] Station Description");
        assert!(description.is_description && !description.is_overwritten);
        assert_eq!(description.key_name, "Station");
    }

    #[test]
    fn key_part_marker_is_recognized() {
        let schema = schema_for(&["[=] BMK", "[=] (P) FG-Counter"]);
        let part = find(&schema, "[=] (P) FG-Counter");
        assert!(part.is_key_part);
        assert_eq!(part.key_name, "FG-Counter");
        assert_eq!(part.prefix, "=");
    }

    #[test]
    fn non_attribute_headers_are_ignored() {
        let schema = schema_for(&["PlacementGuid", "X", "[=] BMK", "Rotation Z"]);
        assert_eq!(schema.keys().len(), 1);
        assert_eq!(schema.keys()[0].key_name, "BMK");
    }

    #[test]
    fn key_parts_become_children_of_the_primary() {
        let schema = schema_for(&[
            "[=] BMK",
            "[=] (P) FG-Counter",
            "[=] (P) FG-Counter Is overwritten",
        ]);

        let primary = find(&schema, "[=] BMK");
        assert_eq!(primary.children.len(), 1);

        let child = find(&schema, "[=] (P) FG-Counter");
        assert_eq!(child.parent, Some(0));

        // overwritten key parts are never attached as children
        let flag = find(&schema, "[=] (P) FG-Counter Is overwritten");
        assert_eq!(flag.parent, None);

        assert!(schema.composite_key_names().contains("BMK"));
    }

    #[test]
    fn primary_selection_prefers_non_overwritten_columns() {
        // the overwritten column comes first in the sheet; the tie-break
        // must still pick the plain value column as primary
        let schema = schema_for(&[
            "[-] ArtNr Is overwritten",
            "[-] ArtNr",
            "[-] (P) Index",
        ]);

        let child = find(&schema, "[-] (P) Index");
        let primary_index = child.parent.unwrap();
        assert_eq!(schema.keys()[primary_index].column_name, "[-] ArtNr");
    }

    #[test]
    fn orphan_key_parts_are_dropped() {
        // prefix ':' has only key-part columns, so there is no primary
        let schema = schema_for(&["[:1] (P) SubBMK", "[=] BMK"]);
        let orphan = find(&schema, "[:1] (P) SubBMK");
        assert_eq!(orphan.parent, None);
        assert!(schema.composite_key_names().is_empty());
    }
}
