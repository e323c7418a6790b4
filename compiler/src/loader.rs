use std::{fs, path::Path};

use tracing::{debug, info};

use crate::{error::MolgenError, types::Schema};

/// Reads and parses the schema IR at `path`.
///
/// Fails with `MissingInput` when there is no file and `EmptySchema` when the
/// file is blank or declares nothing. No semantic checks happen here.
pub fn load_schema(path: &Path) -> Result<Schema, MolgenError> {
    if !path.is_file() {
        return Err(MolgenError::MissingInput(path.to_path_buf()));
    }

    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Err(MolgenError::EmptySchema(path.to_path_buf()));
    }

    let schema = parse_schema(&text)?;
    if schema.declarations.is_empty() {
        return Err(MolgenError::EmptySchema(path.to_path_buf()));
    }

    info!(
        path = %path.display(),
        namespace = %schema.namespace,
        declarations = schema.declarations.len(),
        "loaded schema"
    );
    Ok(schema)
}

pub fn parse_schema(text: &str) -> Result<Schema, MolgenError> {
    let schema: Schema = serde_json::from_str(text)?;
    debug!(imports = schema.imports.len(), "parsed schema IR");
    Ok(schema)
}
