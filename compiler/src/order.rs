//! Emission order for custom codecs.
//!
//! The schema does not promise that a declaration appears after the types it
//! refers to, so codecs are emitted in a depth-first post-order over the custom
//! reference graph: every custom codec follows every custom codec it uses.
//! Roots are visited in `early_types` order first, then in schema order, which
//! keeps the output stable and close to the schema's own layout.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::{
    classifier::Classifier,
    error::MolgenError,
    types::{Declaration, DeclarationKind, Schema},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

struct Walker<'s> {
    custom:  HashMap<&'s str, &'s Declaration>,
    pinned:  HashSet<&'s str>,
    marks:   HashMap<&'s str, Mark>,
    path:    Vec<&'s str>,
    ordered: Vec<&'s Declaration>,
}

impl<'s> Walker<'s> {
    fn visit(&mut self, name: &'s str) -> Result<(), MolgenError> {
        if self.marks.contains_key(name) {
            return Ok(());
        }
        let decl = match self.custom.get(name) {
            Some(decl) => *decl,
            None => return Ok(()),
        };

        self.marks.insert(name, Mark::Visiting);
        self.path.push(name);

        for dep in decl.references() {
            let dep = match self.custom.get_key_value(dep) {
                Some((key, _)) => *key,
                None => continue,
            };
            match self.marks.get(dep) {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => {
                    let start = self.path.iter().position(|n| *n == dep).unwrap_or(0);
                    // A hand-pinned pair may refer back to each other, but only through a
                    // vector: anything else nests a type inside itself.
                    if self.pinned.contains(dep) && self.pinned.contains(name) && self.is_indirect(start) {
                        warn!(from = name, to = dep, "forward reference allowed by early_types");
                        continue;
                    }
                    let mut cycle: Vec<String> =
                        self.path[start..].iter().map(|n| n.to_string()).collect();
                    cycle.push(dep.to_string());
                    return Err(MolgenError::Cycle(cycle));
                }
                None => self.visit(dep)?,
            }
        }

        self.path.pop();
        self.marks.insert(name, Mark::Done);
        self.ordered.push(decl);
        Ok(())
    }

    /// Whether the cycle `path[start..]` passes through a fixvec or dynvec.
    fn is_indirect(&self, start: usize) -> bool {
        self.path[start..].iter().any(|name| {
            self.custom
                .get(name)
                .map_or(false, |decl| matches!(decl.kind, DeclarationKind::Fixvec | DeclarationKind::Dynvec))
        })
    }
}

/// Orders the custom declarations of `schema` so that definitions precede uses.
///
/// A cycle in the reference graph is an error: molecule layouts cannot nest
/// a type inside itself.
pub fn emission_order<'s>(
    schema: &'s Schema,
    classifier: &Classifier,
    early_types: &[String],
) -> Result<Vec<&'s Declaration>, MolgenError> {
    let custom: HashMap<&str, &Declaration> = schema
        .declarations
        .iter()
        .filter(|decl| classifier.is_custom(&decl.name))
        .map(|decl| (decl.name.as_str(), decl))
        .collect();

    let mut roots: Vec<&str> = Vec::with_capacity(early_types.len() + custom.len());
    let mut pinned = HashSet::new();
    for name in early_types {
        match custom.get_key_value(name.as_str()) {
            Some((key, _)) => {
                pinned.insert(*key);
                roots.push(*key);
            }
            None => warn!(name = %name, "early type is not a custom declaration; ignoring"),
        }
    }
    roots.extend(
        schema
            .declarations
            .iter()
            .filter(|decl| custom.contains_key(decl.name.as_str()))
            .map(|decl| decl.name.as_str()),
    );

    let mut walker = Walker {
        ordered: Vec::with_capacity(custom.len()),
        custom,
        pinned,
        marks: HashMap::new(),
        path: Vec::new(),
    };
    for root in roots {
        walker.visit(root)?;
    }
    Ok(walker.ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, loader::parse_schema};

    fn names(json: &str, early: &[&str]) -> Result<Vec<String>, MolgenError> {
        let schema = parse_schema(json).unwrap();
        let early: Vec<String> = early.iter().map(|s| s.to_string()).collect();
        let classifier = Classifier::new(Catalog::builtin());
        emission_order(&schema, &classifier, &early)
            .map(|decls| decls.iter().map(|d| d.name.clone()).collect())
    }

    const OUT_OF_ORDER: &str = r#"{"namespace": "t", "declarations": [
        {"type": "array", "name": "Uint32", "item": "byte", "item_count": 4},
        {"type": "table", "name": "Campaign", "fields": [
            {"name": "id", "type": "Byte32"},
            {"name": "quests", "type": "QuestVec"},
            {"name": "reward", "type": "Reward"}
        ]},
        {"type": "dynvec", "name": "QuestVec", "item": "Quest"},
        {"type": "table", "name": "Quest", "fields": [{"name": "reward", "type": "Reward"}]},
        {"type": "struct", "name": "Reward", "fields": [{"name": "amount", "type": "Uint32"}]},
        {"type": "option", "name": "RewardOpt", "item": "Reward"}
    ]}"#;

    #[test]
    fn dependencies_come_first() {
        assert_eq!(
            names(OUT_OF_ORDER, &[]).unwrap(),
            vec!["Reward", "Quest", "QuestVec", "Campaign", "RewardOpt"]
        );
    }

    #[test]
    fn early_types_lead_the_order() {
        assert_eq!(
            names(OUT_OF_ORDER, &["RewardOpt", "NotAType"]).unwrap(),
            vec!["Reward", "RewardOpt", "Quest", "QuestVec", "Campaign"]
        );
    }

    #[test]
    fn already_sorted_schema_keeps_its_order() {
        let json = r#"{"namespace": "t", "declarations": [
            {"type": "struct", "name": "A", "fields": [{"name": "x", "type": "Uint8"}]},
            {"type": "fixvec", "name": "AVec", "item": "A"},
            {"type": "table", "name": "B", "fields": [{"name": "a", "type": "AVec"}]}
        ]}"#;
        assert_eq!(names(json, &[]).unwrap(), vec!["A", "AVec", "B"]);
    }

    #[test]
    fn cycles_are_errors() {
        let json = r#"{"namespace": "t", "declarations": [
            {"type": "table", "name": "Node", "fields": [{"name": "children", "type": "NodeVec"}]},
            {"type": "dynvec", "name": "NodeVec", "item": "Node"}
        ]}"#;
        match names(json, &[]) {
            Err(MolgenError::Cycle(cycle)) => assert_eq!(cycle, vec!["Node", "NodeVec", "Node"]),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn pinned_cycles_fall_back_to_the_curated_order() {
        let json = r#"{"namespace": "t", "declarations": [
            {"type": "table", "name": "Node", "fields": [{"name": "children", "type": "NodeVec"}]},
            {"type": "dynvec", "name": "NodeVec", "item": "Node"}
        ]}"#;
        assert_eq!(names(json, &["NodeVec", "Node"]).unwrap(), vec!["Node", "NodeVec"]);
    }

    #[test]
    fn pinned_cycles_without_a_vector_are_errors() {
        let json = r#"{"namespace": "t", "declarations": [
            {"type": "table", "name": "Node", "fields": [{"name": "next", "type": "NodeOpt"}]},
            {"type": "option", "name": "NodeOpt", "item": "Node"}
        ]}"#;
        match names(json, &["Node", "NodeOpt"]) {
            Err(MolgenError::Cycle(cycle)) => assert_eq!(cycle, vec!["Node", "NodeOpt", "Node"]),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let json = r#"{"namespace": "t", "declarations": [
            {"type": "option", "name": "Loop", "item": "Loop"}
        ]}"#;
        assert!(matches!(names(json, &[]), Err(MolgenError::Cycle(_))));
    }
}
