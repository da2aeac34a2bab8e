//! The canvas: single owner of placements, relationships and the active
//! gesture. Every mutation goes through a method here.

use crate::config::CanvasConfig;
use crate::error::Rejection;
use crate::gesture::{GestureController, GestureOutcome, LiveUpdate};
use crate::layout::{Point, Rect, clamp, find_available_position, source_anchor};
use crate::model::{Catalog, Entity, FieldRef};
use crate::relationship::{Relationship, RelationshipRegistry};
use indexmap::IndexMap;
use tracing::{debug, info};

/// Receives committed changes. Each method runs after the state change it
/// reports is visible through the canvas.
pub trait CanvasObserver {
    fn entity_moved(&mut self, _entity: &str, _position: Point) {}
    fn entity_removed(&mut self, _entity: &str) {}
    fn relationship_created(&mut self, _relationship: &Relationship) {}
}

impl CanvasObserver for () {}

/// A committed change, as reported to a [`CanvasObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    EntityMoved { entity: String, position: Point },
    EntityRemoved(String),
    RelationshipCreated(Relationship),
}

/// Observer that holds notifications until they are drained, so they can be
/// delivered once the canvas is no longer borrowed.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
}

impl NotificationQueue {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}

impl CanvasObserver for NotificationQueue {
    fn entity_moved(&mut self, entity: &str, position: Point) {
        self.pending.push(Notification::EntityMoved {
            entity: entity.to_string(),
            position,
        });
    }

    fn entity_removed(&mut self, entity: &str) {
        self.pending.push(Notification::EntityRemoved(entity.to_string()));
    }

    fn relationship_created(&mut self, relationship: &Relationship) {
        self.pending
            .push(Notification::RelationshipCreated(relationship.clone()));
    }
}

pub struct Canvas<O: CanvasObserver = ()> {
    catalog: Catalog,
    config: CanvasConfig,
    /// Insertion order doubles as paint order; later tables are on top.
    placements: IndexMap<String, Point>,
    relationships: RelationshipRegistry,
    gestures: GestureController,
    observer: O,
}

impl Canvas {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_observer(catalog, CanvasConfig::default(), ())
    }
}

impl<O: CanvasObserver> Canvas<O> {
    pub fn with_observer(catalog: Catalog, config: CanvasConfig, observer: O) -> Self {
        Self {
            catalog,
            config,
            placements: IndexMap::new(),
            relationships: RelationshipRegistry::new(),
            gestures: GestureController::new(),
            observer,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn placements(&self) -> &IndexMap<String, Point> {
        &self.placements
    }

    pub fn position(&self, entity: &str) -> Option<Point> {
        self.placements.get(entity).copied()
    }

    /// Position to draw a table at: the live drag position while it is
    /// being moved, the committed placement otherwise.
    pub fn rendered_position(&self, entity: &str) -> Option<Point> {
        self.gestures
            .live_position(entity)
            .or_else(|| self.position(entity))
    }

    pub fn is_placed(&self, entity: &str) -> bool {
        self.placements.contains_key(entity)
    }

    pub fn relationships(&self) -> &[Relationship] {
        self.relationships.list()
    }

    pub fn gestures(&self) -> &GestureController {
        &self.gestures
    }

    fn catalog_entity(&self, id: &str) -> Result<&Entity, Rejection> {
        self.catalog
            .get(id)
            .ok_or_else(|| Rejection::UnknownEntity(id.to_string()))
    }

    fn check_placeable(&self, id: &str) -> Result<(), Rejection> {
        self.catalog_entity(id)?;
        if self.is_placed(id) {
            debug!(entity = id, "rejected placement, already on canvas");
            return Err(Rejection::AlreadyPlaced(id.to_string()));
        }
        Ok(())
    }

    /// Place a catalog table in the first free grid cell.
    pub fn place_entity(&mut self, id: &str) -> Result<Point, Rejection> {
        self.check_placeable(id)?;
        let obstacles: Vec<Point> = self.placements.values().copied().collect();
        let position = find_available_position(&obstacles, &self.config.grid);
        self.placements.insert(id.to_string(), position);
        info!(entity = id, x = position.x, y = position.y, "table placed");
        Ok(position)
    }

    /// Place a catalog table where it was dropped, clamped onto the canvas.
    pub fn place_entity_at(&mut self, id: &str, at: Point) -> Result<Point, Rejection> {
        self.check_placeable(id)?;
        let position = clamp(at);
        self.placements.insert(id.to_string(), position);
        info!(entity = id, x = position.x, y = position.y, "table dropped");
        Ok(position)
    }

    /// Take a table off the canvas along with every relationship touching it.
    pub fn remove_entity(&mut self, id: &str) -> Result<Vec<Relationship>, Rejection> {
        if self.placements.shift_remove(id).is_none() {
            return Err(Rejection::NotPlaced(id.to_string()));
        }
        if self.gestures.involves(id) {
            self.gestures.cancel();
        }
        let removed = self.relationships.remove_by_entity(id);
        info!(entity = id, relationships = removed.len(), "table removed");
        self.observer.entity_removed(id);
        Ok(removed)
    }

    pub fn move_entity(&mut self, id: &str, position: Point) -> Result<Point, Rejection> {
        let Some(slot) = self.placements.get_mut(id) else {
            return Err(Rejection::NotPlaced(id.to_string()));
        };
        let position = clamp(position);
        *slot = position;
        debug!(entity = id, x = position.x, y = position.y, "table moved");
        self.observer.entity_moved(id, position);
        Ok(position)
    }

    fn check_endpoint(&self, end: &FieldRef) -> Result<(), Rejection> {
        let entity = self.catalog_entity(&end.entity)?;
        if !self.is_placed(&end.entity) {
            return Err(Rejection::NotPlaced(end.entity.clone()));
        }
        if entity.field_index(&end.field).is_none() {
            return Err(Rejection::UnknownField {
                entity: end.entity.clone(),
                field: end.field.clone(),
            });
        }
        Ok(())
    }

    pub fn create_relationship(&mut self, candidate: Relationship) -> Result<(), Rejection> {
        if candidate.source.entity == candidate.target.entity {
            return Err(Rejection::SelfRelationship(candidate.source.entity));
        }
        self.check_endpoint(&candidate.source)?;
        self.check_endpoint(&candidate.target)?;
        self.relationships.add(candidate.clone())?;
        info!(
            source = %candidate.source.entity,
            target = %candidate.target.entity,
            "relationship created"
        );
        self.observer.relationship_created(&candidate);
        Ok(())
    }

    /// Pointer down on a table header. Ignored for tables not on the canvas.
    pub fn pointer_down_on_entity(&mut self, id: &str, pointer: Point) -> bool {
        match self.position(id) {
            Some(start) => self.gestures.begin_move(id, start, pointer),
            None => {
                debug!(entity = id, "pointer down on unplaced table ignored");
                false
            }
        }
    }

    /// Pointer down on a column row. Ignored for unknown tables or columns.
    pub fn pointer_down_on_field(&mut self, source: FieldRef, pointer: Point) -> bool {
        let anchor = self.position(&source.entity).and_then(|position| {
            let entity = self.catalog.get(&source.entity)?;
            let row = entity.field_index(&source.field)?;
            Some(source_anchor(entity, position, &self.config.table, row))
        });
        match anchor {
            Some(anchor) => self.gestures.begin_draw(source, anchor, pointer),
            None => {
                debug!(
                    entity = %source.entity,
                    field = %source.field,
                    "pointer down on unknown column ignored"
                );
                false
            }
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Option<LiveUpdate> {
        self.gestures.pointer_moved(pointer)
    }

    /// Release the pointer over `target` (the column row under it, if any)
    /// and commit whatever the gesture produced.
    pub fn pointer_up(&mut self, target: Option<&FieldRef>) -> Result<GestureOutcome, Rejection> {
        let outcome = self.gestures.release(target);
        match &outcome {
            GestureOutcome::Move { entity, position } => {
                let position = self.move_entity(entity, *position)?;
                Ok(GestureOutcome::Move {
                    entity: entity.clone(),
                    position,
                })
            }
            GestureOutcome::Connect(candidate) => {
                self.create_relationship(candidate.clone())?;
                Ok(outcome)
            }
            GestureOutcome::Ignored | GestureOutcome::Discarded => Ok(outcome),
        }
    }

    pub fn pointer_cancel(&mut self) -> bool {
        self.gestures.cancel()
    }

    pub fn table_rect(&self, id: &str) -> Option<Rect> {
        let entity = self.catalog.get(id)?;
        let position = self.rendered_position(id)?;
        Some(Rect::new(position, self.config.table.table_size(entity)))
    }

    /// Top-most table under `point`.
    pub fn entity_at(&self, point: Point) -> Option<&str> {
        self.placements
            .keys()
            .rev()
            .find(|id| self.table_rect(id).is_some_and(|r| r.contains(point)))
            .map(|id| id.as_str())
    }

    /// Column row under `point` on the top-most table there.
    pub fn field_at(&self, point: Point) -> Option<FieldRef> {
        let id = self.entity_at(point)?;
        let entity = self.catalog.get(id)?;
        let position = self.rendered_position(id)?;
        let row = self
            .config
            .table
            .row_at(position.y, entity.fields.len(), point.y)?;
        Some(FieldRef::new(id, entity.fields[row].name.as_str()))
    }
}
