//! The generation pipeline: load, verify, order, lay out, emit, write.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    catalog::Catalog,
    classifier::{Bucket, Classifier},
    config::GeneratorConfig,
    error::MolgenError,
    gen_rust::{compile_schema_to_rust, render_index, EmitOptions},
    layout::Layout,
    loader::load_schema,
    order::emission_order,
    types::Schema,
    utils::{escape_rust_keyword, to_snake_case},
    verifier::verify_schema,
};

/// Source text of one generation run, before anything touches the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutput {
    pub module_name: String,
    /// Contents of `<module_name>.rs`.
    pub source:      String,
    /// Contents of `mod.rs`.
    pub index:       String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub written:      Vec<PathBuf>,
    pub removed:      Vec<PathBuf>,
    pub declarations: usize,
    pub custom:       usize,
}

/// Summary of a verification-only run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub namespace:  String,
    pub primitive:  usize,
    pub domain:     usize,
    pub custom:     usize,
    /// Custom declarations in emission order.
    pub order:      Vec<String>,
}

fn module_name(schema: &Schema, config: &GeneratorConfig) -> Result<String, MolgenError> {
    let name = match &config.module {
        Some(module) => module.clone(),
        None if schema.namespace.is_empty() => "schema".to_string(),
        None => escape_rust_keyword(&to_snake_case(&schema.namespace)),
    };
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid || name == "mod" {
        return Err(MolgenError::ConfigError(format!("{:?} is not a usable module name", name)));
    }
    Ok(name)
}

/// Runs every check and emits the module in memory. Pure: nothing is read
/// or written besides `schema`.
pub fn render(schema: &Schema, config: &GeneratorConfig, catalog: &Catalog) -> Result<GeneratedOutput, MolgenError> {
    let classifier = Classifier::new(catalog);

    verify_schema(schema, &classifier)?;
    let ordered = emission_order(schema, &classifier, &config.early_types)?;
    let layout = Layout::compute(&ordered, &classifier)?;
    debug!(
        order = ?ordered.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
        "emission order"
    );

    let module_name = module_name(schema, config)?;
    let options = EmitOptions {
        runtime_crate: &config.runtime_crate,
        derive_serde:  config.derive_serde,
    };
    let source = compile_schema_to_rust(schema, &ordered, &classifier, &layout, &options);
    let index = render_index(&module_name);

    Ok(GeneratedOutput { module_name, source, index })
}

/// Loads the schema and catalog named by `config` and verifies them without
/// writing anything.
pub fn check(config: &GeneratorConfig) -> Result<CheckReport, MolgenError> {
    let schema = load_schema(&config.schema)?;
    let catalog = config.load_catalog()?;
    let classifier = Classifier::new(&catalog);

    verify_schema(&schema, &classifier)?;
    let ordered = emission_order(&schema, &classifier, &config.early_types)?;
    Layout::compute(&ordered, &classifier)?;
    module_name(&schema, config)?;

    let mut report = CheckReport { namespace: schema.namespace.clone(), ..CheckReport::default() };
    for decl in &schema.declarations {
        match classifier.classify(&decl.name) {
            Bucket::FoundationPrimitive => report.primitive += 1,
            Bucket::FoundationDomain => report.domain += 1,
            Bucket::Custom => report.custom += 1,
        }
    }
    report.order = ordered.iter().map(|decl| decl.name.clone()).collect();
    Ok(report)
}

/// Generates `<module>.rs` and `mod.rs` into `config.out_dir`, then removes
/// legacy artifacts. Any load or verification failure returns before the
/// output directory is touched.
pub fn generate(config: &GeneratorConfig) -> Result<GenerationReport, MolgenError> {
    let schema = load_schema(&config.schema)?;
    let catalog = config.load_catalog()?;
    let output = render(&schema, config, &catalog)?;

    let classifier = Classifier::new(&catalog);
    let custom = schema.declarations.iter().filter(|d| classifier.is_custom(&d.name)).count();

    let mut report = GenerationReport {
        declarations: schema.declarations.len(),
        custom,
        ..GenerationReport::default()
    };

    fs::create_dir_all(&config.out_dir)?;
    let source_path = config.out_dir.join(format!("{}.rs", output.module_name));
    let index_path = config.out_dir.join("mod.rs");
    write_if_changed(&source_path, &output.source)?;
    write_if_changed(&index_path, &output.index)?;
    report.written.push(source_path);
    report.written.push(index_path);

    for legacy in &config.legacy_artifacts {
        let path = config.out_dir.join(legacy);
        if report.written.contains(&path) || !path.is_file() {
            continue;
        }
        fs::remove_file(&path)?;
        info!(path = %path.display(), "removed legacy artifact");
        report.removed.push(path);
    }

    info!(
        module = %output.module_name,
        out_dir = %config.out_dir.display(),
        declarations = report.declarations,
        custom = report.custom,
        "generated codecs"
    );
    Ok(report)
}

// Leaves the file (and its mtime) alone when the content is unchanged, so
// build scripts watching the output do not loop.
fn write_if_changed(path: &Path, contents: &str) -> Result<(), MolgenError> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == contents {
            debug!(path = %path.display(), "unchanged");
            return Ok(());
        }
    }
    fs::write(path, contents)?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote");
    Ok(())
}
