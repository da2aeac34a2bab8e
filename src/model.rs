use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A table definition as supplied by the catalog. The canvas never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(rename = "columns", default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(rename = "isPrimary", default)]
    pub is_primary: bool,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &str, typ: &str, is_primary: bool) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            typ: typ.to_string(),
            is_primary,
        });
        self
    }

    /// Row index of a field, used for anchor and hit-test geometry.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A field addressed by owning entity id and field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub entity: String,
    pub field: String,
}

impl FieldRef {
    pub fn new(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            field: field.into(),
        }
    }
}

/// Static list of tables available for placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entities: Vec<Entity>,
}

impl Catalog {
    pub fn new(entities: Vec<Entity>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        for entity in &entities {
            if !ids.insert(entity.id.as_str()) {
                return Err(CatalogError::DuplicateEntity(entity.id.clone()));
            }
            let mut names = HashSet::new();
            for field in &entity.fields {
                if !names.insert(field.name.as_str()) {
                    return Err(CatalogError::DuplicateField {
                        entity: entity.id.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }
        Ok(Self { entities })
    }

    /// Parse a JSON array of `{id, name, columns: [{name, type, isPrimary}]}`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let entities: Vec<Entity> = serde_json::from_str(json)?;
        Self::new(entities)
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
}
