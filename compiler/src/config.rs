use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{catalog::Catalog, error::MolgenError};

/// Generator settings, read from `molgen.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Schema IR produced by `moleculec --format json`.
    pub schema:           PathBuf,
    /// Directory receiving `<module>.rs` and `mod.rs`.
    pub out_dir:          PathBuf,
    /// Name of the generated module; defaults to the schema namespace.
    pub module:           Option<String>,
    /// Crate whose `prelude` the generated code imports.
    pub runtime_crate:    String,
    pub derive_serde:     bool,
    /// Custom types emitted before everything else. Only needed for schemas
    /// with intentional mutual references.
    pub early_types:      Vec<String>,
    /// Files left behind by older generator versions, removed after a write.
    pub legacy_artifacts: Vec<String>,
    /// Replacement for the built-in foundation catalog.
    pub catalog:          Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            schema:           PathBuf::from("schemas/quest.json"),
            out_dir:          PathBuf::from("src/generated"),
            module:           None,
            runtime_crate:    "molgen".to_string(),
            derive_serde:     true,
            early_types:      Vec::new(),
            legacy_artifacts: vec!["types.rs".to_string(), "codecs.rs".to_string()],
            catalog:          None,
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<GeneratorConfig, MolgenError> {
        let text = fs::read_to_string(path)?;
        GeneratorConfig::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<GeneratorConfig, MolgenError> {
        toml::from_str(text).map_err(|e| MolgenError::ConfigError(e.to_string()))
    }

    /// The catalog named by `catalog`, or the built-in one.
    pub fn load_catalog(&self) -> Result<Catalog, MolgenError> {
        match &self.catalog {
            Some(path) => Catalog::from_path(path),
            None => Ok(Catalog::builtin().clone()),
        }
    }
}
