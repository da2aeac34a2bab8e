use crate::layout::Size;
use crate::model::Entity;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Box geometry of a rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableMetrics {
    pub char_width: f64,
    pub padding_x: f64,
    /// Minimum box width; relationship lines leave from the right edge.
    pub min_width: f64,
    pub min_height: f64,
    /// Distance from the box top to the first column row.
    pub header_height: f64,
    pub row_height: f64,
    /// Strip below the rows holding the "add column" action.
    pub footer_height: f64,
}

impl Default for TableMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            padding_x: 16.0,
            min_width: 280.0,
            min_height: 200.0,
            header_height: 80.0,
            row_height: 40.0,
            footer_height: 60.0,
        }
    }
}

impl TableMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    pub fn table_size(&self, entity: &Entity) -> Size {
        let header_width = self.text_width(&entity.name);

        let max_row_width = entity
            .fields
            .iter()
            .map(|f| {
                let badge = if f.is_primary {
                    self.text_width("PK") + self.char_width * 2.0
                } else {
                    0.0
                };
                self.text_width(&f.name) + self.text_width(&f.typ) + self.char_width * 2.0 + badge
            })
            .fold(0.0, f64::max);

        let width = (header_width.max(max_row_width) + self.padding_x * 2.0).max(self.min_width);
        let height = (self.header_height
            + entity.fields.len() as f64 * self.row_height
            + self.footer_height)
            .max(self.min_height);

        Size::new(width, height)
    }

    /// Vertical centre of a column row for a table placed at `table_y`.
    pub fn row_center_y(&self, table_y: f64, row: usize) -> f64 {
        table_y + self.header_height + row as f64 * self.row_height + self.row_height / 2.0
    }

    /// Row index under a y coordinate, if it lands on one of `rows` rows.
    pub fn row_at(&self, table_y: f64, rows: usize, y: f64) -> Option<usize> {
        let offset = y - table_y - self.header_height;
        if offset < 0.0 {
            return None;
        }
        let row = (offset / self.row_height).floor() as usize;
        (row < rows).then_some(row)
    }
}
