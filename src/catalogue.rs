//! Catalogue of selectable entries
//!
//! Loaded once at startup and immutable afterwards. An entry's position in the
//! catalogue is its selection index.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::matcher::tokenize;
use crate::{Error, Result};

/// One selectable item and the phrasings a visitor might use for it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogueEntry {
    #[serde(alias = "label")]
    pub primary_label: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl CatalogueEntry {
    #[must_use]
    pub fn new(primary_label: &str, synonyms: &[&str]) -> Self {
        Self {
            primary_label: primary_label.to_string(),
            synonyms: synonyms.iter().map(ToString::to_string).collect(),
        }
    }

    /// Whether at least one synonym has a word to match on
    #[must_use]
    pub fn is_matchable(&self) -> bool {
        self.synonyms.iter().any(|s| !tokenize(s).is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogueFile {
    entries: Vec<CatalogueEntry>,
}

/// Ordered, validated set of entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    entries: Vec<CatalogueEntry>,
}

// More specific phrasings come first: the first matching entry wins.
const BUILTIN: &[(&str, &[&str])] = &[
    ("Rose of Sharon", &["rose of sharon", "hibiscus"]),
    ("Rose", &["rose", "roses", "red rose"]),
    ("Tulip", &["tulip", "tulips"]),
    ("Sunflower", &["sunflower", "sunflowers", "sun flower"]),
    ("Daisy", &["daisy", "daisies"]),
    ("Lily", &["lily", "lilies", "water lily"]),
    ("Orchid", &["orchid", "orchids"]),
    ("Lavender", &["lavender"]),
    ("Lotus", &["lotus", "lotus flower"]),
    ("Cherry Blossom", &["cherry blossom", "sakura", "cherry tree"]),
    ("Poppy", &["poppy", "poppies"]),
    ("Iris", &["iris", "irises"]),
    ("Magnolia", &["magnolia"]),
    ("Dandelion", &["dandelion", "dandelions"]),
    ("Peony", &["peony", "peonies"]),
    ("Carnation", &["carnation", "carnations"]),
    ("Chrysanthemum", &["chrysanthemum", "mum", "mums"]),
];

impl Catalogue {
    /// Build a catalogue from entries
    ///
    /// # Errors
    ///
    /// Returns error if there are no entries or an entry has no synonym to match on
    pub fn new(entries: Vec<CatalogueEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Catalogue("catalogue has no entries".to_string()));
        }

        for (index, entry) in entries.iter().enumerate() {
            if entry.primary_label.trim().is_empty() {
                return Err(Error::Catalogue(format!("entry {index} has an empty label")));
            }
            if !entry.is_matchable() {
                return Err(Error::Catalogue(format!(
                    "entry {index} ({}) has no usable synonym",
                    entry.primary_label
                )));
            }
        }

        Ok(Self { entries })
    }

    /// The built-in flower catalogue
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(label, synonyms)| CatalogueEntry::new(label, synonyms))
                .collect(),
        }
    }

    /// Load a catalogue file; `.json` files are parsed as JSON, anything else as TOML
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or validated
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Catalogue(format!("cannot read {}: {e}", path.display()))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let catalogue = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        tracing::info!(
            path = %path.display(),
            entries = catalogue.len(),
            "loaded catalogue"
        );
        Ok(catalogue)
    }

    /// Load from the configured path, or fall back to the built-in catalogue
    ///
    /// # Errors
    ///
    /// Returns error if a configured file cannot be loaded
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(
            || {
                tracing::debug!("no catalogue configured, using built-in flowers");
                Ok(Self::builtin())
            },
            Self::load,
        )
    }

    /// Parse a TOML catalogue with `[[entries]]` tables
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogueFile = toml::from_str(content)?;
        Self::new(file.entries)
    }

    /// Parse a JSON catalogue `{"entries": [...]}`
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: CatalogueFile = serde_json::from_str(content)?;
        Self::new(file.entries)
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CatalogueEntry> {
        self.entries.get(index)
    }

    /// Primary label of the entry at `index`
    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.get(index).map(|e| e.primary_label.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a validated catalogue
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let builtin = Catalogue::builtin();
        assert_eq!(builtin.len(), 17);
        assert!(Catalogue::new(builtin.entries().to_vec()).is_ok());
    }

    #[test]
    fn test_matchable_needs_a_synonym() {
        assert!(CatalogueEntry::new("Cherry Blossom", &["sakura"]).is_matchable());
        assert!(CatalogueEntry::new("Rose", &["...", "red rose"]).is_matchable());
        // The label alone is not something to match on
        assert!(!CatalogueEntry::new("Moon", &[]).is_matchable());
    }

    #[test]
    fn test_from_toml() {
        let catalogue = Catalogue::from_toml_str(
            r#"
            [[entries]]
            label = "Tulip"
            synonyms = ["tulip", "tulips"]

            [[entries]]
            primary_label = "Moon"
            synonyms = ["moon", "full moon"]
            "#,
        )
        .unwrap();

        assert_eq!(catalogue.len(), 2);
        assert_eq!(catalogue.label(0), Some("Tulip"));
        assert_eq!(catalogue.get(1).unwrap().synonyms.len(), 2);
        assert_eq!(catalogue.label(2), None);
    }

    #[test]
    fn test_from_json() {
        let catalogue = Catalogue::from_json_str(
            r#"{"entries": [{"label": "Lotus", "synonyms": ["lotus"]}]}"#,
        )
        .unwrap();
        assert_eq!(catalogue.label(0), Some("Lotus"));
    }

    #[test]
    fn test_empty_catalogue_rejected() {
        assert!(matches!(Catalogue::new(Vec::new()), Err(Error::Catalogue(_))));
        assert!(Catalogue::from_toml_str("entries = []").is_err());
    }

    #[test]
    fn test_unmatchable_entry_rejected() {
        let entries = vec![CatalogueEntry::new("?!", &["...", "- -"])];
        assert!(matches!(Catalogue::new(entries), Err(Error::Catalogue(_))));

        let label_only = vec![CatalogueEntry::new("Iris", &[])];
        assert!(matches!(Catalogue::new(label_only), Err(Error::Catalogue(_))));
        assert!(Catalogue::from_toml_str("[[entries]]\nlabel = \"Moon\"\n").is_err());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("flowers.json");
        std::fs::write(&json, r#"{"entries": [{"label": "Iris", "synonyms": ["iris"]}]}"#).unwrap();
        let toml_path = dir.path().join("flowers.toml");
        std::fs::write(&toml_path, "[[entries]]\nlabel = \"Poppy\"\nsynonyms = [\"poppy\"]\n").unwrap();

        assert_eq!(Catalogue::load(&json).unwrap().label(0), Some("Iris"));
        assert_eq!(Catalogue::load(&toml_path).unwrap().label(0), Some("Poppy"));
        assert!(Catalogue::load(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_load_or_builtin() {
        assert_eq!(Catalogue::load_or_builtin(None).unwrap(), Catalogue::builtin());
    }
}
