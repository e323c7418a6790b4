use serde::Serialize;

use crate::{
    catalog::{Catalog, CatalogEntry, Foundation},
    utils::{to_pascal_case, to_screaming_snake_case},
};

/// Provenance of a type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Bucket {
    FoundationPrimitive,
    FoundationDomain,
    Custom,
}

/// Partitions names into buckets and answers how generated code refers to them.
///
/// Classification is total: any name missing from the catalog is `Custom`.
/// Whether a custom name is actually declared is the verifier's concern.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'c> {
    catalog: &'c Catalog,
}

impl<'c> Classifier<'c> {
    pub fn new(catalog: &'c Catalog) -> Classifier<'c> {
        Classifier { catalog }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn classify(&self, name: &str) -> Bucket {
        match self.catalog.get(name) {
            Some(CatalogEntry { bucket: Foundation::Primitive, .. }) => Bucket::FoundationPrimitive,
            Some(CatalogEntry { bucket: Foundation::Domain, .. }) => Bucket::FoundationDomain,
            None => Bucket::Custom,
        }
    }

    pub fn is_custom(&self, name: &str) -> bool {
        self.classify(name) == Bucket::Custom
    }

    /// The semantic type generated code uses for values of `name`.
    pub fn rust_type(&self, name: &str) -> String {
        match self.catalog.get(name) {
            Some(entry) => entry.rust_type.clone(),
            None => to_pascal_case(name),
        }
    }

    /// The codec type generated code uses for `name`.
    pub fn codec_type(&self, name: &str) -> String {
        match self.catalog.get(name) {
            Some(entry) => entry.codec_type.clone(),
            None => format!("{}Codec", to_pascal_case(name)),
        }
    }

    /// The codec constant generated code uses for `name`.
    pub fn codec_const(&self, name: &str) -> String {
        match self.catalog.get(name) {
            Some(entry) => entry.codec.clone(),
            None => to_screaming_snake_case(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets() {
        let classifier = Classifier::new(Catalog::builtin());
        assert_eq!(classifier.classify("Uint8"), Bucket::FoundationPrimitive);
        assert_eq!(classifier.classify("byte"), Bucket::FoundationPrimitive);
        assert_eq!(classifier.classify("BytesVec"), Bucket::FoundationPrimitive);
        assert_eq!(classifier.classify("Script"), Bucket::FoundationDomain);
        assert_eq!(classifier.classify("CellOutputVec"), Bucket::FoundationDomain);
        assert_eq!(classifier.classify("Campaign"), Bucket::Custom);
        assert_eq!(classifier.classify("NotDeclaredAnywhere"), Bucket::Custom);
    }

    #[test]
    fn references() {
        let classifier = Classifier::new(Catalog::builtin());
        assert_eq!(classifier.rust_type("Uint64"), "BigUint");
        assert_eq!(classifier.rust_type("Byte32"), "Hex");
        assert_eq!(classifier.rust_type("ScriptOpt"), "Option<Script>");
        assert_eq!(classifier.rust_type("QuestData"), "QuestData");

        assert_eq!(classifier.codec_const("Byte32"), "BYTE32");
        assert_eq!(classifier.codec_const("QuestDataVec"), "QUEST_DATA_VEC");
        assert_eq!(classifier.codec_type("QuestDataVec"), "QuestDataVecCodec");
        assert_eq!(classifier.codec_type("OutPoint"), "OutPointCodec");
    }
}
