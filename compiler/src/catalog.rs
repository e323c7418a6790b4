//! The foundation allow-list: which type names the runtime library already
//! provides, and how generated code refers to them.
//!
//! The table is data (`catalog.json`) rather than code so that adding a
//! foundation type never touches the generator. A project can also point the
//! generator at its own table through the `catalog` config key.

use std::{collections::BTreeMap, fs, path::Path};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::MolgenError;

/// Which of the two foundation shapes a catalog entry has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Foundation {
    /// Generic numeric/byte codec values and their vector/option forms.
    Primitive,
    /// Chain entities adapted into codecs.
    Domain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name:       String,
    pub bucket:     Foundation,
    /// Semantic type as written in generated code.
    pub rust_type:  String,
    /// Codec type exported by the runtime.
    pub codec_type: String,
    /// Codec constant exported by the runtime.
    pub codec:      String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CatalogFile {
    types:       Vec<CatalogEntry>,
    #[serde(default)]
    array_sizes: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries:     BTreeMap<String, CatalogEntry>,
    array_sizes: BTreeMap<String, usize>,
}

lazy_static! {
    static ref BUILTIN: Catalog =
        Catalog::from_json(include_str!("catalog.json")).expect("built-in catalog.json is valid");
}

impl Catalog {
    /// The table shipped with the generator, matching `molgen-schema`.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn from_json(text: &str) -> Result<Catalog, MolgenError> {
        let file: CatalogFile = serde_json::from_str(text)
            .map_err(|e| MolgenError::CatalogError(e.to_string()))?;

        let mut entries = BTreeMap::new();
        for entry in file.types {
            if entry.name.is_empty() || entry.codec.is_empty() || entry.codec_type.is_empty() {
                return Err(MolgenError::CatalogError(format!(
                    "Incomplete entry for {:?}",
                    entry.name
                )));
            }
            if let Some(previous) = entries.insert(entry.name.clone(), entry) {
                return Err(MolgenError::CatalogError(format!(
                    "The type {:?} is listed twice",
                    previous.name
                )));
            }
        }

        Ok(Catalog { entries, array_sizes: file.array_sizes })
    }

    pub fn from_path(path: &Path) -> Result<Catalog, MolgenError> {
        let text = fs::read_to_string(path)?;
        Catalog::from_json(&text)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Well-known byte lengths of array declarations, keyed by name.
    pub fn array_size(&self, name: &str) -> Option<usize> {
        self.array_sizes.get(name).copied()
    }

    pub fn to_json(&self) -> Result<String, MolgenError> {
        let file = CatalogFile {
            types:       self.entries.values().cloned().collect(),
            array_sizes: self.array_sizes.clone(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| MolgenError::CatalogError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::builtin();
        let uint32 = catalog.get("Uint32").unwrap();
        assert_eq!(uint32.bucket, Foundation::Primitive);
        assert_eq!(uint32.rust_type, "u32");
        assert_eq!(uint32.fixed_size, Some(4));

        let uint64 = catalog.get("Uint64").unwrap();
        assert_eq!(uint64.rust_type, "BigUint");

        let script = catalog.get("Script").unwrap();
        assert_eq!(script.bucket, Foundation::Domain);
        assert_eq!(script.codec, "SCRIPT");
        assert_eq!(script.fixed_size, None);

        assert!(catalog.contains("byte"));
        assert!(!catalog.contains("Campaign"));
    }

    #[test]
    fn builtin_array_sizes() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.array_size("Byte32"), Some(32));
        assert_eq!(catalog.array_size("Uint32"), Some(4));
        assert_eq!(catalog.array_size("Uint256"), Some(32));
        assert_eq!(catalog.array_size("Campaign"), None);
    }

    #[test]
    fn fixed_sizes_agree_with_array_sizes() {
        let catalog = Catalog::builtin();
        for entry in catalog.entries() {
            if let Some(size) = catalog.array_size(&entry.name) {
                assert_eq!(entry.fixed_size, Some(size), "{}", entry.name);
            }
        }
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let text = r#"{"types": [
            {"name": "A", "bucket": "primitive", "rust_type": "u8", "codec_type": "ACodec", "codec": "A"},
            {"name": "A", "bucket": "domain", "rust_type": "u8", "codec_type": "ACodec", "codec": "A"}
        ]}"#;
        assert!(matches!(Catalog::from_json(text), Err(MolgenError::CatalogError(_))));
    }

    #[test]
    fn catalog_json_round_trips() {
        let catalog = Catalog::builtin();
        let reloaded = Catalog::from_json(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(&reloaded, catalog);
    }
}
