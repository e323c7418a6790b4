use std::{env, path::PathBuf};

use molgen::GeneratorConfig;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=schemas/quest.json");

    let out_dir = match env::var_os("OUT_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => panic!("OUT_DIR is not set; run through cargo"),
    };
    let config = GeneratorConfig {
        schema: PathBuf::from("schemas/quest.json"),
        out_dir,
        module: Some("quest".to_string()),
        legacy_artifacts: Vec::new(),
        ..GeneratorConfig::default()
    };

    if let Err(err) = molgen::generate(&config) {
        panic!("failed to generate quest codecs: {err}");
    }
}
