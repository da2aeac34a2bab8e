//! Rejection and input errors.

/// A canvas operation that was refused. State is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Table already exists in the grid: {0}")]
    AlreadyPlaced(String),
    #[error("Tables {0} and {1} are already related")]
    DuplicateRelationship(String, String),
    #[error("Table {0} cannot be related to itself")]
    SelfRelationship(String),
    #[error("Unknown table: {0:?}")]
    UnknownEntity(String),
    #[error("Unknown column {field:?} on table {entity}")]
    UnknownField { entity: String, field: String },
    #[error("Table is not on the canvas: {0}")]
    NotPlaced(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid canvas config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Grid cell must have a positive size, got {0}x{1}")]
    EmptyCell(f64, f64),
    #[error("Config value {0} must be a finite number")]
    NonFinite(&'static str),
    #[error("Config value {name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("Grid gutter must not be negative, got {0}")]
    NegativeGutter(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid table catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate table id: {0}")]
    DuplicateEntity(String),
    #[error("Duplicate column {field:?} on table {entity}")]
    DuplicateField { entity: String, field: String },
}
