//! Byte sizes of custom declarations.
//!
//! Arrays take their length from the catalog's well-known size table or from
//! `item_count`; structs are the sum of their fields. Everything else is
//! dynamically sized.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    classifier::Classifier,
    error::MolgenError,
    types::{Declaration, DeclarationKind},
    utils::quote,
};

/// Length used for an array whose size is known neither by name nor by count.
pub const DEFAULT_ARRAY_SIZE: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    sizes: HashMap<String, Option<usize>>,
}

impl Layout {
    /// Computes sizes for `ordered`, which must list dependencies first.
    pub fn compute(ordered: &[&Declaration], classifier: &Classifier) -> Result<Layout, MolgenError> {
        let mut layout = Layout::default();
        for decl in ordered {
            let size = layout.size_of(decl, classifier)?;
            debug!(name = %decl.name, kind = decl.kind.as_str(), size = ?size, "layout");
            layout.sizes.insert(decl.name.clone(), size);
        }
        Ok(layout)
    }

    /// Fixed byte size of `name`, or `None` for dynamically sized types.
    pub fn fixed_size(&self, name: &str, classifier: &Classifier) -> Option<usize> {
        match classifier.catalog().get(name) {
            Some(entry) => entry.fixed_size,
            None => self.sizes.get(name).copied().flatten(),
        }
    }

    /// Byte length of a custom array declaration.
    pub fn array_size(&self, name: &str) -> Option<usize> {
        self.sizes.get(name).copied().flatten()
    }

    fn size_of(&self, decl: &Declaration, classifier: &Classifier) -> Result<Option<usize>, MolgenError> {
        match decl.kind {
            DeclarationKind::Array => self.array_len(decl, classifier).map(Some),
            DeclarationKind::Struct => {
                if decl.fields.is_empty() {
                    return Err(MolgenError::VerifierError(format!(
                        "The struct {} has no fields",
                        quote(&decl.name)
                    )));
                }
                let mut total = 0usize;
                for field in &decl.fields {
                    match self.fixed_size(&field.type_, classifier) {
                        Some(size) => total += size,
                        None => {
                            return Err(MolgenError::VerifierError(format!(
                                "The struct {} has field {} of type {}, which is not fixed-size",
                                quote(&decl.name),
                                quote(&field.name),
                                quote(&field.type_)
                            )))
                        }
                    }
                }
                Ok(Some(total))
            }
            DeclarationKind::Fixvec => {
                let item = decl.item.as_deref().unwrap_or_default();
                if self.fixed_size(item, classifier).is_none() {
                    return Err(MolgenError::VerifierError(format!(
                        "The fixvec {} has item type {}, which is not fixed-size",
                        quote(&decl.name),
                        quote(item)
                    )));
                }
                Ok(None)
            }
            DeclarationKind::Table | DeclarationKind::Dynvec | DeclarationKind::Option => Ok(None),
        }
    }

    fn array_len(&self, decl: &Declaration, classifier: &Classifier) -> Result<usize, MolgenError> {
        if decl.item_count == Some(0) {
            return Err(MolgenError::VerifierError(format!(
                "The array {} has no items",
                quote(&decl.name)
            )));
        }

        let well_known = classifier.catalog().array_size(&decl.name);

        let counted = match (decl.item_count, decl.item.as_deref()) {
            (Some(count), Some(item)) => match self.fixed_size(item, classifier) {
                Some(size) => Some(count * size),
                None => {
                    return Err(MolgenError::VerifierError(format!(
                        "The array {} has item type {}, which is not fixed-size",
                        quote(&decl.name),
                        quote(item)
                    )))
                }
            },
            _ => None,
        };

        match (well_known, counted) {
            (Some(known), Some(count)) if known != count => Err(MolgenError::VerifierError(format!(
                "The array {} is {} bytes by name but declares {} bytes",
                quote(&decl.name),
                known,
                count
            ))),
            (Some(size), _) | (None, Some(size)) => Ok(size),
            (None, None) => {
                warn!(name = %decl.name, size = DEFAULT_ARRAY_SIZE, "array size unknown; using default");
                Ok(DEFAULT_ARRAY_SIZE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, loader::parse_schema, order::emission_order};

    fn layout(json: &str) -> Result<Layout, MolgenError> {
        let schema = parse_schema(json).unwrap();
        let classifier = Classifier::new(Catalog::builtin());
        let ordered = emission_order(&schema, &classifier, &[]).unwrap();
        Layout::compute(&ordered, &classifier)
    }

    #[test]
    fn array_sizes() {
        let layout = layout(
            r#"{"namespace": "t", "declarations": [
                {"type": "array", "name": "Signature", "item": "byte", "item_count": 65},
                {"type": "array", "name": "Hash", "item": "byte"},
                {"type": "array", "name": "Pair", "item": "Uint32", "item_count": 2},
                {"type": "array", "name": "ProofHash", "item": "byte"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(layout.array_size("Signature"), Some(65));
        assert_eq!(layout.array_size("Hash"), Some(32));
        assert_eq!(layout.array_size("Pair"), Some(8));
        assert_eq!(layout.array_size("ProofHash"), Some(DEFAULT_ARRAY_SIZE));
    }

    #[test]
    fn conflicting_array_size() {
        let err = layout(
            r#"{"namespace": "t", "declarations": [
                {"type": "array", "name": "PublicKey", "item": "byte", "item_count": 32}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("33 bytes by name"));
    }

    #[test]
    fn struct_sizes_nest() {
        let classifier = Classifier::new(Catalog::builtin());
        let layout = layout(
            r#"{"namespace": "t", "declarations": [
                {"type": "struct", "name": "Outer", "fields": [
                    {"name": "inner", "type": "Inner"},
                    {"name": "point", "type": "OutPoint"}
                ]},
                {"type": "struct", "name": "Inner", "fields": [
                    {"name": "a", "type": "Uint8"},
                    {"name": "b", "type": "Byte32"}
                ]},
                {"type": "table", "name": "Dynamic", "fields": [{"name": "a", "type": "Uint8"}]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(layout.fixed_size("Inner", &classifier), Some(33));
        assert_eq!(layout.fixed_size("Outer", &classifier), Some(33 + 36));
        assert_eq!(layout.fixed_size("Dynamic", &classifier), None);
        assert_eq!(layout.fixed_size("Uint128", &classifier), Some(16));
        assert_eq!(layout.fixed_size("Bytes", &classifier), None);
    }

    #[test]
    fn struct_fields_must_be_fixed_size() {
        let err = layout(
            r#"{"namespace": "t", "declarations": [
                {"type": "struct", "name": "Bad", "fields": [{"name": "note", "type": "Bytes"}]}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not fixed-size"));
    }

    #[test]
    fn zero_sized_layouts_are_rejected() {
        let empty_struct = layout(
            r#"{"namespace": "t", "declarations": [
                {"type": "struct", "name": "Unit", "fields": []},
                {"type": "option", "name": "UnitOpt", "item": "Unit"}
            ]}"#,
        );
        assert!(empty_struct.unwrap_err().to_string().contains("has no fields"));

        let empty_array = layout(
            r#"{"namespace": "t", "declarations": [
                {"type": "array", "name": "Empty", "item": "byte", "item_count": 0}
            ]}"#,
        );
        assert!(empty_array.unwrap_err().to_string().contains("has no items"));

        // Tables still encode to a header, so an empty one is fine.
        layout(r#"{"namespace": "t", "declarations": [{"type": "table", "name": "Nothing", "fields": []}]}"#)
            .unwrap();
    }

    #[test]
    fn fixvec_items_must_be_fixed_size() {
        let err = layout(
            r#"{"namespace": "t", "declarations": [
                {"type": "fixvec", "name": "Notes", "item": "Bytes"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("fixvec"));
    }
}
