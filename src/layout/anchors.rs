//! Column anchor points for relationship lines.

use crate::measure::TableMetrics;
use crate::model::Entity;

use super::types::Point;

/// Where a line leaves a column: the table's right edge, centred on the row.
pub fn source_anchor(
    entity: &Entity,
    position: Point,
    metrics: &TableMetrics,
    row: usize,
) -> Point {
    let width = metrics.table_size(entity).width;
    Point::new(position.x + width, metrics.row_center_y(position.y, row))
}

/// Where a line enters a column: the table's left edge, centred on the row.
pub fn target_anchor(position: Point, metrics: &TableMetrics, row: usize) -> Point {
    Point::new(position.x, metrics.row_center_y(position.y, row))
}

/// Resolve both ends of a line between two placed columns.
/// Returns `None` when either column is missing from its table.
pub fn line_endpoints(
    source: (&Entity, Point, &str),
    target: (&Entity, Point, &str),
    metrics: &TableMetrics,
) -> Option<(Point, Point)> {
    let (src_entity, src_pos, src_field) = source;
    let (dst_entity, dst_pos, dst_field) = target;
    let src_row = src_entity.field_index(src_field)?;
    let dst_row = dst_entity.field_index(dst_field)?;
    Some((
        source_anchor(src_entity, src_pos, metrics, src_row),
        target_anchor(dst_pos, metrics, dst_row),
    ))
}
