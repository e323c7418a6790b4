use serde::{Deserialize, Serialize};

/// The schema IR, in the shape moleculec emits with `--format json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub namespace:    String,
    #[serde(default)]
    pub imports:      Vec<Import>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub name:        String,
    #[serde(default)]
    pub paths:       Vec<String>,
    #[serde(default)]
    pub path_supers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Array,
    Struct,
    Table,
    Fixvec,
    Dynvec,
    Option,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Array  => "array",
            DeclarationKind::Struct => "struct",
            DeclarationKind::Table  => "table",
            DeclarationKind::Fixvec => "fixvec",
            DeclarationKind::Dynvec => "dynvec",
            DeclarationKind::Option => "option",
        }
    }

    /// Struct and table declarations carry a field list.
    pub fn has_fields(self) -> bool {
        matches!(self, DeclarationKind::Struct | DeclarationKind::Table)
    }

    /// Vectors, options and arrays carry an item type.
    pub fn has_item(self) -> bool {
        !self.has_fields()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name:  String,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name:           String,
    #[serde(rename = "type")]
    pub kind:           DeclarationKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields:         Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item:           Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count:     Option<usize>,
    #[serde(default)]
    pub imported_depth: usize,
}

impl Declaration {
    /// Every type name this declaration refers to, in declaration order.
    pub fn references(&self) -> Vec<&str> {
        if self.kind.has_fields() {
            self.fields.iter().map(|field| field.type_.as_str()).collect()
        } else {
            self.item.iter().map(String::as_str).collect()
        }
    }
}
