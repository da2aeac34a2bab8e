//! Read-only snapshot of the canvas for the rendering surface.

use crate::canvas::{Canvas, CanvasObserver};
use crate::gesture::DraftLine;
use crate::layout::{Point, Size, line_endpoints};
use crate::model::Field;
use crate::relationship::Relationship;
use serde::Serialize;

/// Blank margin kept around the content when sizing the scene.
const SCENE_MARGIN: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub tables: Vec<SceneTable>,
    pub edges: Vec<SceneEdge>,
    pub draft: Option<DraftLine>,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneTable {
    pub id: String,
    pub name: String,
    pub position: Point,
    pub size: Size,
    pub fields: Vec<Field>,
    /// Drawn at its live drag position.
    pub dragging: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneEdge {
    pub relationship: Relationship,
    pub start: Point,
    pub end: Point,
    /// The line leaves the column a new line is being drawn from.
    pub highlighted: bool,
}

impl<O: CanvasObserver> Canvas<O> {
    pub fn scene(&self) -> Scene {
        let metrics = &self.config().table;

        let tables: Vec<SceneTable> = self
            .placements()
            .keys()
            .filter_map(|id| {
                let entity = self.catalog().get(id)?;
                let position = self.rendered_position(id)?;
                Some(SceneTable {
                    id: id.clone(),
                    name: entity.name.clone(),
                    position,
                    size: metrics.table_size(entity),
                    fields: entity.fields.clone(),
                    dragging: self.gestures().live_position(id).is_some(),
                })
            })
            .collect();

        let drawing_from = self.gestures().drawing_from();
        let edges: Vec<SceneEdge> = self
            .relationships()
            .iter()
            .filter_map(|rel| {
                let src = self.catalog().get(&rel.source.entity)?;
                let dst = self.catalog().get(&rel.target.entity)?;
                let (start, end) = line_endpoints(
                    (src, self.rendered_position(&src.id)?, rel.source.field.as_str()),
                    (dst, self.rendered_position(&dst.id)?, rel.target.field.as_str()),
                    metrics,
                )?;
                Some(SceneEdge {
                    relationship: rel.clone(),
                    start,
                    end,
                    highlighted: drawing_from == Some(&rel.source),
                })
            })
            .collect();

        let draft = self.gestures().draft();

        let mut width: f64 = 0.0;
        let mut height: f64 = 0.0;
        for table in &tables {
            width = width.max(table.position.x + table.size.width);
            height = height.max(table.position.y + table.size.height);
        }
        if let Some(line) = draft {
            width = width.max(line.end.x);
            height = height.max(line.end.y);
        }

        Scene {
            tables,
            edges,
            draft,
            width: width + SCENE_MARGIN,
            height: height + SCENE_MARGIN,
        }
    }
}

impl Scene {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
