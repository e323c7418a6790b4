use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    classifier::Classifier,
    error::MolgenError,
    types::{Declaration, Schema},
    utils::{escape_rust_keyword, quote, to_pascal_case, to_snake_case},
};

lazy_static! {
    // Leading underscores are allowed, but a name needs a letter to survive case conversion.
    static ref IDENTIFIER: Regex = Regex::new(r"^_*[A-Za-z][A-Za-z0-9_]*$").unwrap();
}

/// Names the generated module imports from the runtime prelude. A custom
/// declaration with one of these names would shadow the runtime item.
pub const RESERVED_NAMES: [&str; 22] = [
    "BigUint", "ByteBuffer", "ByteBufferMut", "Codec", "CodecError", "DynVec",
    "Entity", "EntityCodec", "FixVec", "FixedBytes", "Hex", "Opt", "Option",
    "Result", "Self", "String", "StructReader", "StructWriter", "TableReader",
    "TableWriter", "Vec", "WideUint",
];

/// Checks everything emission relies on: valid and unique names, the right
/// shape for each kind, and that every reference resolves to a catalog name or
/// a declared name.
///
/// Returns `Ok(())` if verification passed. Ordering and layout checks (cycles,
/// fixed sizes) happen in `order` and `layout`.
pub fn verify_schema(schema: &Schema, classifier: &Classifier) -> Result<(), MolgenError> {
    let mut declared: HashMap<&str, &Declaration> = HashMap::new();
    let mut snake_names: HashMap<String, &str> = HashMap::new();
    let mut pascal_names: HashMap<String, &str> = HashMap::new();

    // 1) Check declaration names
    for decl in &schema.declarations {
        if !IDENTIFIER.is_match(&decl.name) {
            return Err(MolgenError::VerifierError(format!(
                "The type name {} is not a valid identifier",
                quote(&decl.name)
            )));
        }
        if declared.insert(decl.name.as_str(), decl).is_some() {
            return Err(MolgenError::DuplicateDeclaration(quote(&decl.name)));
        }
        if let Some(other) = snake_names.insert(to_snake_case(&decl.name), &decl.name) {
            return Err(name_collision(other, &decl.name));
        }
        if !classifier.is_custom(&decl.name) {
            continue;
        }
        let pascal = to_pascal_case(&decl.name);
        if RESERVED_NAMES.contains(&pascal.as_str()) {
            return Err(MolgenError::VerifierError(format!(
                "The type name {} is reserved",
                quote(&decl.name)
            )));
        }
        if classifier.catalog().contains(&pascal) {
            return Err(name_collision(&pascal, &decl.name));
        }
        if let Some(other) = pascal_names.insert(pascal, &decl.name) {
            return Err(name_collision(other, &decl.name));
        }
    }

    // 2) Check the shape and references of each custom declaration
    for decl in &schema.declarations {
        if !classifier.is_custom(&decl.name) {
            continue;
        }
        verify_shape(decl)?;

        for reference in decl.references() {
            if !classifier.catalog().contains(reference) && !declared.contains_key(reference) {
                return Err(MolgenError::UnresolvedReference {
                    declaration: quote(&decl.name),
                    reference:   quote(reference),
                });
            }
        }
    }

    Ok(())
}

fn name_collision(first: &str, second: &str) -> MolgenError {
    MolgenError::VerifierError(format!(
        "The types {} and {} map to the same Rust name",
        quote(first),
        quote(second)
    ))
}

fn verify_shape(decl: &Declaration) -> Result<(), MolgenError> {
    let kind = decl.kind.as_str();

    if decl.item_count.is_some() && decl.kind != crate::types::DeclarationKind::Array {
        return Err(MolgenError::VerifierError(format!(
            "Only arrays have an item count, but {} {} declares one",
            kind,
            quote(&decl.name)
        )));
    }

    if decl.kind.has_fields() {
        if decl.item.is_some() {
            return Err(MolgenError::VerifierError(format!(
                "The {} {} declares an item type; it takes fields",
                kind,
                quote(&decl.name)
            )));
        }

        let mut field_names: Vec<String> = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            if !IDENTIFIER.is_match(&field.name) {
                return Err(MolgenError::VerifierError(format!(
                    "The field name {} in {} is not a valid identifier",
                    quote(&field.name),
                    quote(&decl.name)
                )));
            }
            let rust_name = escape_rust_keyword(&to_snake_case(&field.name));
            if field_names.contains(&rust_name) {
                return Err(MolgenError::VerifierError(format!(
                    "The field {} is defined twice in {}",
                    quote(&field.name),
                    quote(&decl.name)
                )));
            }
            field_names.push(rust_name);
        }
    } else {
        if decl.item.is_none() {
            return Err(MolgenError::VerifierError(format!(
                "The {} {} must declare an item type",
                kind,
                quote(&decl.name)
            )));
        }
        if !decl.fields.is_empty() {
            return Err(MolgenError::VerifierError(format!(
                "The {} {} cannot have fields",
                kind,
                quote(&decl.name)
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, loader::parse_schema};

    fn verify(json: &str) -> Result<(), MolgenError> {
        let schema = parse_schema(json).unwrap();
        verify_schema(&schema, &Classifier::new(Catalog::builtin()))
    }

    #[test]
    fn accepts_forward_references() {
        verify(
            r#"{"namespace": "t", "declarations": [
                {"type": "table", "name": "Campaign", "fields": [{"name": "quests", "type": "QuestVec"}]},
                {"type": "dynvec", "name": "QuestVec", "item": "Quest"},
                {"type": "table", "name": "Quest", "fields": [{"name": "id", "type": "Uint32"}]}
            ]}"#,
        )
        .unwrap();
    }

    #[test]
    fn rejects_unresolved_reference() {
        let err = verify(
            r#"{"namespace": "t", "declarations": [
                {"type": "table", "name": "Campaign", "fields": [{"name": "owner", "type": "Owner"}]}
            ]}"#,
        )
        .unwrap_err();
        match err {
            MolgenError::UnresolvedReference { declaration, reference } => {
                assert_eq!(declaration, "\"Campaign\"");
                assert_eq!(reference, "\"Owner\"");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn rejects_duplicates() {
        let err = verify(
            r#"{"namespace": "t", "declarations": [
                {"type": "fixvec", "name": "Ids", "item": "Uint32"},
                {"type": "dynvec", "name": "Ids", "item": "Bytes"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, MolgenError::DuplicateDeclaration(_)));
    }

    #[test]
    fn rejects_rust_name_collisions() {
        let err = verify(
            r#"{"namespace": "t", "declarations": [
                {"type": "fixvec", "name": "QuestIds", "item": "Uint32"},
                {"type": "fixvec", "name": "Quest_ids", "item": "Uint32"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("same Rust name"));

        let shadows_catalog = verify(
            r#"{"namespace": "t", "declarations": [{"type": "table", "name": "script", "fields": []}]}"#,
        );
        assert!(shadows_catalog.unwrap_err().to_string().contains("\"Script\""));
    }

    #[test]
    fn rejects_reserved_names() {
        let err = verify(
            r#"{"namespace": "t", "declarations": [{"type": "array", "name": "Hex", "item": "byte", "item_count": 2}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("reserved"));

        // The generated name is what matters: `hex` becomes `Hex`, `self` becomes `Self`.
        for name in ["hex", "self", "codec", "vec"] {
            let json = format!(
                r#"{{"namespace": "t", "declarations": [{{"type": "array", "name": "{}", "item": "byte", "item_count": 2}}]}}"#,
                name
            );
            let err = verify(&json).unwrap_err();
            assert!(err.to_string().contains("reserved"), "{} was accepted", name);
        }
    }

    #[test]
    fn rejects_names_without_letters() {
        for name in ["_", "__", "_1"] {
            let json = format!(
                r#"{{"namespace": "t", "declarations": [{{"type": "array", "name": "{}", "item": "byte", "item_count": 2}}]}}"#,
                name
            );
            assert!(verify(&json).unwrap_err().to_string().contains("not a valid identifier"));
        }

        let field = verify(
            r#"{"namespace": "t", "declarations": [{"type": "table", "name": "T", "fields": [{"name": "__", "type": "Uint8"}]}]}"#,
        );
        assert!(field.unwrap_err().to_string().contains("not a valid identifier"));

        verify(
            r#"{"namespace": "t", "declarations": [{"type": "table", "name": "_Private", "fields": [{"name": "_a", "type": "Uint8"}]}]}"#,
        )
        .unwrap();
    }

    #[test]
    fn rejects_bad_shapes() {
        let missing_item = verify(
            r#"{"namespace": "t", "declarations": [{"type": "option", "name": "MaybeQuest"}]}"#,
        );
        assert!(missing_item.unwrap_err().to_string().contains("must declare an item type"));

        let duplicate_field = verify(
            r#"{"namespace": "t", "declarations": [{"type": "struct", "name": "P", "fields": [
                {"name": "a", "type": "Uint8"}, {"name": "a", "type": "Uint8"}
            ]}]}"#,
        );
        assert!(duplicate_field.unwrap_err().to_string().contains("defined twice"));

        let bad_count = verify(
            r#"{"namespace": "t", "declarations": [{"type": "fixvec", "name": "V", "item": "byte", "item_count": 3}]}"#,
        );
        assert!(bad_count.unwrap_err().to_string().contains("Only arrays"));
    }

    #[test]
    fn foundation_declarations_are_trusted() {
        // `String` is reserved for custom types but is a catalog name here.
        verify(
            r#"{"namespace": "t", "declarations": [
                {"type": "fixvec", "name": "String", "item": "byte"},
                {"type": "table", "name": "Script", "fields": [{"name": "code_hash", "type": "Byte32"}]}
            ]}"#,
        )
        .unwrap();
    }
}
