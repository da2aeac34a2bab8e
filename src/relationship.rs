//! Relationship bookkeeping: pair uniqueness and cascading removal.

use crate::error::Rejection;
use crate::model::FieldRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A line from one table's column to another's. Stored directionally, but
/// the direction does not matter for uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub source: FieldRef,
    pub target: FieldRef,
}

impl Relationship {
    pub fn new(source: FieldRef, target: FieldRef) -> Self {
        Self { source, target }
    }

    pub fn touches(&self, entity: &str) -> bool {
        self.source.entity == entity || self.target.entity == entity
    }

    /// Whether this relationship connects the unordered pair `{a, b}`.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        let (s, t) = (self.source.entity.as_str(), self.target.entity.as_str());
        (s == a && t == b) || (s == b && t == a)
    }
}

/// Insertion-ordered set of relationships, at most one per table pair.
#[derive(Debug, Clone, Default)]
pub struct RelationshipRegistry {
    relationships: Vec<Relationship>,
}

impl RelationshipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a relationship unless it relates a table to itself or the
    /// pair is already connected in either direction.
    pub fn add(&mut self, relationship: Relationship) -> Result<(), Rejection> {
        let (a, b) = (&relationship.source.entity, &relationship.target.entity);
        if a == b {
            debug!(entity = %a, "rejected self relationship");
            return Err(Rejection::SelfRelationship(a.clone()));
        }
        if self.contains_pair(a, b) {
            debug!(source = %a, target = %b, "rejected duplicate relationship");
            return Err(Rejection::DuplicateRelationship(a.clone(), b.clone()));
        }
        self.relationships.push(relationship);
        Ok(())
    }

    /// Remove and return every relationship touching `entity`, in order.
    pub fn remove_by_entity(&mut self, entity: &str) -> Vec<Relationship> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.relationships)
            .into_iter()
            .partition(|r| r.touches(entity));
        self.relationships = kept;
        removed
    }

    pub fn contains_pair(&self, a: &str, b: &str) -> bool {
        self.relationships.iter().any(|r| r.connects(a, b))
    }

    pub fn touching<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships.iter().filter(move |r| r.touches(entity))
    }

    pub fn list(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(a: &str, fa: &str, b: &str, fb: &str) -> Relationship {
        Relationship::new(FieldRef::new(a, fa), FieldRef::new(b, fb))
    }

    #[test]
    fn test_add_preserves_order() {
        let mut reg = RelationshipRegistry::new();
        reg.add(rel("A", "id", "B", "a_id")).unwrap();
        reg.add(rel("C", "id", "A", "c_id")).unwrap();
        reg.add(rel("B", "id", "C", "b_id")).unwrap();

        let pairs: Vec<(&str, &str)> = reg
            .list()
            .iter()
            .map(|r| (r.source.entity.as_str(), r.target.entity.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "B"), ("C", "A"), ("B", "C")]);
    }

    #[test]
    fn test_rejects_reverse_duplicate() {
        let mut reg = RelationshipRegistry::new();
        reg.add(rel("A", "f1", "B", "f2")).unwrap();
        let err = reg.add(rel("B", "f3", "A", "f4")).unwrap_err();

        assert_eq!(err, Rejection::DuplicateRelationship("B".into(), "A".into()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_rejects_same_direction_duplicate_on_other_columns() {
        let mut reg = RelationshipRegistry::new();
        reg.add(rel("A", "f1", "B", "f2")).unwrap();
        assert!(reg.add(rel("A", "f9", "B", "f8")).is_err());
    }

    #[test]
    fn test_rejects_self_relationship() {
        let mut reg = RelationshipRegistry::new();
        let err = reg.add(rel("A", "f1", "A", "f2")).unwrap_err();
        assert_eq!(err, Rejection::SelfRelationship("A".into()));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_by_entity_cascades() {
        let mut reg = RelationshipRegistry::new();
        reg.add(rel("A", "id", "B", "a_id")).unwrap();
        reg.add(rel("C", "a_id", "A", "id")).unwrap();
        reg.add(rel("B", "id", "C", "b_id")).unwrap();

        let removed = reg.remove_by_entity("A");

        assert_eq!(removed.len(), 2);
        assert_eq!(reg.list(), &[rel("B", "id", "C", "b_id")]);
        assert!(!reg.contains_pair("A", "B"));
    }

    #[test]
    fn test_remove_unknown_entity_is_noop() {
        let mut reg = RelationshipRegistry::new();
        reg.add(rel("A", "id", "B", "a_id")).unwrap();
        assert!(reg.remove_by_entity("Z").is_empty());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_list_is_stable() {
        let mut reg = RelationshipRegistry::new();
        reg.add(rel("A", "id", "B", "a_id")).unwrap();
        reg.add(rel("A", "id", "C", "a_id")).unwrap();
        assert_eq!(reg.list().to_vec(), reg.list().to_vec());
        assert_eq!(reg.touching("C").count(), 1);
    }
}
