use crate::{
    classifier::Classifier,
    layout::{Layout, DEFAULT_ARRAY_SIZE},
    types::{Declaration, DeclarationKind, Schema},
    utils::{escape_rust_keyword, quote, to_pascal_case, to_snake_case},
};

/// Knobs that change the text of the generated module.
#[derive(Debug, Clone, Copy)]
pub struct EmitOptions<'a> {
    /// Crate whose `prelude` the generated module imports.
    pub runtime_crate: &'a str,
    pub derive_serde:  bool,
}

/// Compiles the schema into one Rust module as a string: semantic types,
/// codecs for custom declarations in `ordered` order, and a `serialize_*`
/// wrapper for every declaration.
///
/// `ordered` must come from `order::emission_order` so that each codec is
/// written after the codecs it uses.
pub fn compile_schema_to_rust(
    schema: &Schema,
    ordered: &[&Declaration],
    classifier: &Classifier,
    layout: &Layout,
    options: &EmitOptions,
) -> String {
    let mut rust_code: Vec<String> = Vec::new();

    rust_code.push(format!(
        "// @generated by molgen from the `{}` schema. Do not edit.",
        schema.namespace
    ));
    rust_code.push("".to_string());

    // Imports
    rust_code.push("#[allow(unused_imports)]".to_string());
    rust_code.push(format!("use {}::prelude::*;", options.runtime_crate));
    if options.derive_serde {
        rust_code.push("#[allow(unused_imports)]".to_string());
        rust_code.push("use serde::{Deserialize, Serialize};".to_string());
    }
    rust_code.push("".to_string());

    // Semantic types, in schema order
    for decl in &schema.declarations {
        if classifier.is_custom(&decl.name) {
            rust_code.push(generate_type(decl, classifier, layout, options));
        }
    }

    // Codecs, dependencies first
    for decl in ordered {
        rust_code.push(generate_codec(decl, classifier, layout));
    }

    // Wrappers, one per declaration of every bucket
    for decl in &schema.declarations {
        rust_code.push(generate_wrapper(decl, classifier));
    }

    let mut source = rust_code.join("\n");
    while source.ends_with("\n\n") {
        source.pop();
    }
    if !source.ends_with('\n') {
        source.push('\n');
    }
    source
}

/// The barrel file re-exporting a generated module.
pub fn render_index(module: &str) -> String {
    format!(
        "// @generated by molgen. Do not edit.\n\npub mod {0};\n\npub use {0}::*;\n",
        module
    )
}

fn field_name(name: &str) -> String {
    escape_rust_keyword(&to_snake_case(name))
}

fn item_of(decl: &Declaration) -> &str {
    decl.item.as_deref().unwrap_or_default()
}

/// Generates the semantic type of a custom declaration: a record for
/// structs and tables, an alias for everything else.
fn generate_type(decl: &Declaration, classifier: &Classifier, layout: &Layout, options: &EmitOptions) -> String {
    let type_name = to_pascal_case(&decl.name);

    match decl.kind {
        DeclarationKind::Struct | DeclarationKind::Table => {
            let mut fields = Vec::new();
            for field in &decl.fields {
                // The serde key stays the schema's name; the Rust field is snake_case.
                let rust_field_name = field_name(&field.name);
                let mut field_line = String::new();
                if options.derive_serde && rust_field_name != field.name {
                    field_line.push_str(&format!("    #[serde(rename = {})]\n", quote(&field.name)));
                }
                field_line.push_str(&format!(
                    "    pub {}: {},",
                    rust_field_name,
                    classifier.rust_type(&field.type_)
                ));
                fields.push(field_line);
            }

            let derived = if options.derive_serde {
                "#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]"
            } else {
                "#[derive(Debug, Clone, PartialEq, Eq, Default)]"
            };
            if fields.is_empty() {
                format!(
                    "/// Molecule {} `{}`.\n{}\npub struct {} {{}}\n",
                    decl.kind.as_str(),
                    decl.name,
                    derived,
                    type_name
                )
            } else {
                format!(
                    "/// Molecule {} `{}`.\n{}\npub struct {} {{\n{}\n}}\n",
                    decl.kind.as_str(),
                    decl.name,
                    derived,
                    type_name,
                    fields.join("\n")
                )
            }
        }
        DeclarationKind::Array => format!(
            "/// `{}` bytes, hex encoded.\npub type {} = Hex;\n",
            layout.array_size(&decl.name).unwrap_or(DEFAULT_ARRAY_SIZE),
            type_name
        ),
        DeclarationKind::Fixvec | DeclarationKind::Dynvec => format!(
            "pub type {} = Vec<{}>;\n",
            type_name,
            classifier.rust_type(item_of(decl))
        ),
        DeclarationKind::Option => format!(
            "pub type {} = Option<{}>;\n",
            type_name,
            classifier.rust_type(item_of(decl))
        ),
    }
}

/// Generates the codec type and its constant for a custom declaration.
fn generate_codec(decl: &Declaration, classifier: &Classifier, layout: &Layout) -> String {
    let codec_type = classifier.codec_type(&decl.name);
    let codec_const = classifier.codec_const(&decl.name);

    match decl.kind {
        DeclarationKind::Array => format!(
            "pub type {} = FixedBytes<{}>;\npub const {}: {} = FixedBytes;\n",
            codec_type,
            layout.array_size(&decl.name).unwrap_or(DEFAULT_ARRAY_SIZE),
            codec_const,
            codec_type
        ),
        DeclarationKind::Fixvec | DeclarationKind::Dynvec | DeclarationKind::Option => {
            let combinator = match decl.kind {
                DeclarationKind::Fixvec => "FixVec",
                DeclarationKind::Dynvec => "DynVec",
                _ => "Opt",
            };
            let item = item_of(decl);
            format!(
                "pub type {} = {}<{}>;\npub const {}: {} = {}({});\n",
                codec_type,
                combinator,
                classifier.codec_type(item),
                codec_const,
                codec_type,
                combinator,
                classifier.codec_const(item)
            )
        }
        DeclarationKind::Struct | DeclarationKind::Table => generate_record_codec(decl, classifier, layout),
    }
}

/// Generates the `Codec` implementation for a struct or table. Fields are
/// written and read in declared order; the binary layout is positional.
fn generate_record_codec(decl: &Declaration, classifier: &Classifier, layout: &Layout) -> String {
    let type_name = to_pascal_case(&decl.name);
    let codec_type = classifier.codec_type(&decl.name);
    let codec_const = classifier.codec_const(&decl.name);
    let name = quote(&decl.name);
    let is_struct = decl.kind == DeclarationKind::Struct;
    let size = layout.fixed_size(&decl.name, classifier).unwrap_or_default();

    let mut impl_lines = Vec::new();

    impl_lines.push("#[derive(Debug, Clone, Copy, Default)]".to_string());
    impl_lines.push(format!("pub struct {};", codec_type));
    impl_lines.push("".to_string());
    impl_lines.push(format!("pub const {}: {} = {};", codec_const, codec_type, codec_type));
    impl_lines.push("".to_string());
    impl_lines.push(format!("impl Codec for {} {{", codec_type));
    impl_lines.push(format!("    type Value = {};", type_name));
    impl_lines.push("".to_string());

    // encode
    // Only tables get here without fields; layout rejects empty structs.
    if decl.fields.is_empty() {
        impl_lines.push(format!(
            "    fn encode(&self, _value: &{}) -> Result<Vec<u8>, CodecError> {{",
            type_name
        ));
        impl_lines.push(format!("        TableWriter::new({}).finish()", name));
    } else {
        impl_lines.push(format!(
            "    fn encode(&self, value: &{}) -> Result<Vec<u8>, CodecError> {{",
            type_name
        ));
        if is_struct {
            impl_lines.push(format!("        let mut writer = StructWriter::new({}, {});", name, size));
        } else {
            impl_lines.push(format!("        let mut writer = TableWriter::new({});", name));
        }
        for field in &decl.fields {
            impl_lines.push(format!(
                "        writer.write(&{}, &value.{})?;",
                classifier.codec_const(&field.type_),
                field_name(&field.name)
            ));
        }
        impl_lines.push("        writer.finish()".to_string());
    }
    impl_lines.push("    }".to_string());
    impl_lines.push("".to_string());

    // decode
    impl_lines.push(format!(
        "    fn decode(&self, bytes: &[u8]) -> Result<{}, CodecError> {{",
        type_name
    ));
    if decl.fields.is_empty() {
        impl_lines.push(format!("        TableReader::new({}, bytes, 0)?;", name));
        impl_lines.push(format!("        Ok({} {{}})", type_name));
    } else {
        if is_struct {
            impl_lines.push(format!("        let mut reader = StructReader::new({}, bytes, {})?;", name, size));
        } else {
            impl_lines.push(format!(
                "        let reader = TableReader::new({}, bytes, {})?;",
                name,
                decl.fields.len()
            ));
        }
        impl_lines.push(format!("        Ok({} {{", type_name));
        for (index, field) in decl.fields.iter().enumerate() {
            let codec = classifier.codec_const(&field.type_);
            if is_struct {
                impl_lines.push(format!("            {}: reader.read(&{})?,", field_name(&field.name), codec));
            } else {
                impl_lines.push(format!(
                    "            {}: reader.field({}, &{})?,",
                    field_name(&field.name),
                    index,
                    codec
                ));
            }
        }
        impl_lines.push("        })".to_string());
    }
    impl_lines.push("    }".to_string());

    if is_struct {
        impl_lines.push("".to_string());
        impl_lines.push("    fn fixed_size(&self) -> Option<usize> {".to_string());
        impl_lines.push(format!("        Some({})", size));
        impl_lines.push("    }".to_string());
    }

    impl_lines.push("}".to_string());
    impl_lines.push("".to_string());

    impl_lines.join("\n")
}

/// Generates `serialize_<name>`, which encodes with the declaration's codec
/// whatever bucket it comes from.
fn generate_wrapper(decl: &Declaration, classifier: &Classifier) -> String {
    format!(
        "pub fn serialize_{}(value: &{}) -> Result<Vec<u8>, CodecError> {{\n    {}.encode(value)\n}}\n",
        to_snake_case(&decl.name),
        classifier.rust_type(&decl.name),
        classifier.codec_const(&decl.name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, loader::parse_schema, order::emission_order};

    fn generate(json: &str, derive_serde: bool) -> String {
        let schema = parse_schema(json).unwrap();
        let classifier = Classifier::new(Catalog::builtin());
        let ordered = emission_order(&schema, &classifier, &[]).unwrap();
        let layout = Layout::compute(&ordered, &classifier).unwrap();
        let options = EmitOptions { runtime_crate: "molgen", derive_serde };
        compile_schema_to_rust(&schema, &ordered, &classifier, &layout, &options)
    }

    const PAIR: &str = r#"{"namespace": "pair", "declarations": [
        {"type": "array", "name": "Byte32", "item": "byte", "item_count": 32},
        {"type": "struct", "name": "Pair", "fields": [
            {"name": "a", "type": "Uint8"},
            {"name": "b", "type": "Byte32"}
        ]}
    ]}"#;

    #[test]
    fn struct_codec() {
        let source = generate(PAIR, true);
        assert!(source.starts_with("// @generated by molgen from the `pair` schema."));
        assert!(source.contains("use molgen::prelude::*;"));
        assert!(source.contains("pub struct Pair {\n    pub a: u8,\n    pub b: Hex,\n}"));
        assert!(source.contains("let mut writer = StructWriter::new(\"Pair\", 33);"));
        assert!(source.contains("writer.write(&UINT8, &value.a)?;"));
        assert!(source.contains("b: reader.read(&BYTE32)?,"));
        assert!(source.contains("        Some(33)\n"));
        assert!(source.ends_with("}\n"));
    }

    #[test]
    fn wrappers_cover_every_bucket() {
        let source = generate(PAIR, true);
        assert!(source.contains(
            "pub fn serialize_byte32(value: &Hex) -> Result<Vec<u8>, CodecError> {\n    BYTE32.encode(value)\n}"
        ));
        assert!(source.contains("pub fn serialize_pair(value: &Pair)"));
        // Foundation declarations get no codec of their own.
        assert!(!source.contains("pub type Byte32Codec"));
    }

    #[test]
    fn table_with_renamed_fields() {
        let source = generate(
            r#"{"namespace": "t", "declarations": [
                {"type": "table", "name": "Entry", "fields": [
                    {"name": "type", "type": "Bytes"},
                    {"name": "totalPoints", "type": "Uint64"},
                    {"name": "lock", "type": "ScriptOpt"}
                ]}
            ]}"#,
            true,
        );
        assert!(source.contains("    #[serde(rename = \"type\")]\n    pub type_: Hex,"));
        assert!(source.contains("    #[serde(rename = \"totalPoints\")]\n    pub total_points: BigUint,"));
        assert!(source.contains("    pub lock: Option<Script>,"));
        assert!(source.contains("let reader = TableReader::new(\"Entry\", bytes, 3)?;"));
        assert!(source.contains("total_points: reader.field(1, &UINT64)?,"));
        assert!(source.contains("lock: reader.field(2, &SCRIPT_OPT)?,"));
        assert!(!source.contains("fn fixed_size"));
    }

    #[test]
    fn reserved_words_as_field_names() {
        let source = generate(
            r#"{"namespace": "t", "declarations": [
                {"type": "table", "name": "Step", "fields": [
                    {"name": "try", "type": "Uint8"},
                    {"name": "final", "type": "Uint8"},
                    {"name": "box", "type": "Uint8"}
                ]}
            ]}"#,
            true,
        );
        assert!(source.contains("    #[serde(rename = \"try\")]\n    pub try_: u8,"));
        assert!(source.contains("    pub final_: u8,"));
        assert!(source.contains("writer.write(&UINT8, &value.box_)?;"));
        assert!(!source.contains("pub try:"));
        assert!(!source.contains("pub final:"));
    }

    #[test]
    fn aliases_and_combinators() {
        let source = generate(
            r#"{"namespace": "t", "declarations": [
                {"type": "array", "name": "Signature", "item": "byte", "item_count": 65},
                {"type": "fixvec", "name": "SignatureVec", "item": "Signature"},
                {"type": "dynvec", "name": "Notes", "item": "Bytes"},
                {"type": "option", "name": "SignatureOpt", "item": "Signature"}
            ]}"#,
            false,
        );
        assert!(source.contains("pub type Signature = Hex;"));
        assert!(source.contains("pub type SignatureCodec = FixedBytes<65>;\npub const SIGNATURE: SignatureCodec = FixedBytes;"));
        assert!(source.contains("pub type SignatureVec = Vec<Signature>;"));
        assert!(source.contains("pub const SIGNATURE_VEC: SignatureVecCodec = FixVec(SIGNATURE);"));
        assert!(source.contains("pub type NotesCodec = DynVec<BytesCodec>;"));
        assert!(source.contains("pub const SIGNATURE_OPT: SignatureOptCodec = Opt(SIGNATURE);"));
        assert!(!source.contains("serde"));
    }

    #[test]
    fn empty_table() {
        let source = generate(
            r#"{"namespace": "t", "declarations": [{"type": "table", "name": "Nothing", "fields": []}]}"#,
            true,
        );
        assert!(source.contains("pub struct Nothing {}"));
        assert!(source.contains("TableWriter::new(\"Nothing\").finish()"));
        assert!(source.contains("TableReader::new(\"Nothing\", bytes, 0)?;\n        Ok(Nothing {})"));
    }

    #[test]
    fn index_file() {
        assert_eq!(
            render_index("quest"),
            "// @generated by molgen. Do not edit.\n\npub mod quest;\n\npub use quest::*;\n"
        );
    }
}
