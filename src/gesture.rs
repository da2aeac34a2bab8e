//! Pointer gesture state machine.
//!
//! At most one gesture is active at a time: either moving a table by its
//! header, or drawing a relationship line out of a column row. The
//! controller only tracks the gesture and reports what it would commit;
//! [`Canvas`](crate::canvas::Canvas) owns all state and applies outcomes.

use crate::layout::{Point, translate};
use crate::model::FieldRef;
use crate::relationship::Relationship;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct MoveSession {
    pub entity: String,
    /// Table position when the gesture began.
    pub start: Point,
    /// Pointer position when the gesture began.
    pub pointer_origin: Point,
    /// Clamped live position, not yet committed.
    pub current: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawSession {
    pub source: FieldRef,
    /// Fixed end of the line, on the source column row.
    pub anchor: Point,
    /// Free end of the line, following the pointer.
    pub pointer: Point,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Moving(MoveSession),
    Drawing(DrawSession),
}

/// In-progress relationship line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DraftLine {
    pub start: Point,
    pub end: Point,
}

/// What a pointer move produced for live rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveUpdate {
    Table { entity: String, position: Point },
    Draft(DraftLine),
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// No gesture was active.
    Ignored,
    /// The gesture ended without anything to commit.
    Discarded,
    Move { entity: String, position: Point },
    Connect(Relationship),
}

#[derive(Debug, Default)]
pub struct GestureController {
    state: Gesture,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Gesture {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, Gesture::Idle)
    }

    /// Start moving a table. Ignored while any gesture is active.
    pub fn begin_move(&mut self, entity: &str, start: Point, pointer: Point) -> bool {
        if self.is_active() {
            debug!(entity, "pointer down ignored, gesture already active");
            return false;
        }
        debug!(entity, x = start.x, y = start.y, "move started");
        self.state = Gesture::Moving(MoveSession {
            entity: entity.to_string(),
            start,
            pointer_origin: pointer,
            current: start,
        });
        true
    }

    /// Start drawing a line from a column. Ignored while any gesture is active.
    pub fn begin_draw(&mut self, source: FieldRef, anchor: Point, pointer: Point) -> bool {
        if self.is_active() {
            debug!(entity = %source.entity, "pointer down ignored, gesture already active");
            return false;
        }
        debug!(entity = %source.entity, field = %source.field, "connection draw started");
        self.state = Gesture::Drawing(DrawSession {
            source,
            anchor,
            pointer,
        });
        true
    }

    pub fn pointer_moved(&mut self, pointer: Point) -> Option<LiveUpdate> {
        match &mut self.state {
            Gesture::Idle => None,
            Gesture::Moving(session) => {
                session.current = translate(session.start, pointer - session.pointer_origin);
                Some(LiveUpdate::Table {
                    entity: session.entity.clone(),
                    position: session.current,
                })
            }
            Gesture::Drawing(session) => {
                session.pointer = pointer;
                Some(LiveUpdate::Draft(DraftLine {
                    start: session.anchor,
                    end: pointer,
                }))
            }
        }
    }

    /// End the active gesture. `target` is the column row under the pointer,
    /// if any; only a row on a different table completes a connection.
    pub fn release(&mut self, target: Option<&FieldRef>) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            Gesture::Idle => GestureOutcome::Ignored,
            Gesture::Moving(session) => GestureOutcome::Move {
                entity: session.entity,
                position: session.current,
            },
            Gesture::Drawing(session) => match target {
                Some(target) if target.entity != session.source.entity => {
                    GestureOutcome::Connect(Relationship::new(session.source, target.clone()))
                }
                _ => {
                    debug!(
                        entity = %session.source.entity,
                        "connection draw dropped outside a target"
                    );
                    GestureOutcome::Discarded
                }
            },
        }
    }

    /// Drop the active gesture without committing. Returns whether one was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        if was_active {
            debug!("gesture cancelled");
        }
        self.state = Gesture::Idle;
        was_active
    }

    /// Whether the active gesture concerns `entity`.
    pub fn involves(&self, entity: &str) -> bool {
        match &self.state {
            Gesture::Idle => false,
            Gesture::Moving(session) => session.entity == entity,
            Gesture::Drawing(session) => session.source.entity == entity,
        }
    }

    /// Live position of the table being moved.
    pub fn live_position(&self, entity: &str) -> Option<Point> {
        match &self.state {
            Gesture::Moving(session) if session.entity == entity => Some(session.current),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<DraftLine> {
        match &self.state {
            Gesture::Drawing(session) => Some(DraftLine {
                start: session.anchor,
                end: session.pointer,
            }),
            _ => None,
        }
    }

    pub fn drawing_from(&self) -> Option<&FieldRef> {
        match &self.state {
            Gesture::Drawing(session) => Some(&session.source),
            _ => None,
        }
    }
}
