use crate::gesture::DraftLine;
use crate::measure::TableMetrics;
use crate::scene::{Scene, SceneEdge, SceneTable};
use std::fmt::Write;

/// Background grid spacing.
const GRID_SPACING: f64 = 20.0;

pub struct SvgRenderer {
    metrics: TableMetrics,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            metrics: TableMetrics::default(),
        }
    }
}

impl SvgRenderer {
    pub fn new(metrics: TableMetrics) -> Self {
        Self { metrics }
    }

    pub fn render(&self, scene: &Scene) -> String {
        let mut svg = String::new();

        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            scene.width, scene.height, scene.width, scene.height
        )
        .unwrap();

        writeln!(
            &mut svg,
            r#"<style>
  .canvas-bg {{ fill: #f8fafc; }}
  .table-bg {{ fill: #fff; stroke: #e2e8f0; stroke-width: 1; }}
  .table-header {{ fill: #f8fafc; }}
  .table-name {{ font-family: sans-serif; font-size: 14px; font-weight: 500; }}
  .column-text {{ font-family: sans-serif; font-size: 13px; }}
  .column-type {{ font-family: sans-serif; font-size: 11px; fill: #64748b; }}
  .pk {{ font-weight: bold; }}
  .edge {{ stroke: #64748b; stroke-width: 2; fill: none; }}
  .edge-end {{ fill: #64748b; }}
  .highlighted {{ stroke: #3b82f6; }}
  .edge-end.highlighted {{ fill: #3b82f6; stroke: none; }}
  .draft {{ stroke-dasharray: 5,5; }}
</style>"#
        )
        .unwrap();

        writeln!(
            &mut svg,
            r##"<defs><pattern id="grid" width="{0}" height="{0}" patternUnits="userSpaceOnUse"><path d="M {0} 0 L 0 0 0 {0}" fill="none" stroke="#e2e8f0" stroke-width="1" /></pattern></defs>"##,
            GRID_SPACING
        )
        .unwrap();
        writeln!(
            &mut svg,
            r#"<rect class="canvas-bg" width="100%" height="100%" /><rect width="100%" height="100%" fill="url(#grid)" />"#
        )
        .unwrap();

        // Lines go under the tables
        for edge in &scene.edges {
            self.render_edge(&mut svg, edge);
        }
        if let Some(draft) = &scene.draft {
            self.render_draft(&mut svg, draft);
        }

        for table in &scene.tables {
            self.render_table(&mut svg, table);
        }

        writeln!(&mut svg, "</svg>").unwrap();
        svg
    }

    fn render_table(&self, svg: &mut String, table: &SceneTable) {
        let m = &self.metrics;
        let x = table.position.x;
        let y = table.position.y;
        let w = table.size.width;

        writeln!(
            svg,
            r#"<rect class="table-bg" x="{}" y="{}" width="{}" height="{}" rx="6" />"#,
            x, y, w, table.size.height
        )
        .unwrap();
        writeln!(
            svg,
            r#"<rect class="table-header" x="{}" y="{}" width="{}" height="{}" rx="6" />"#,
            x + 1.0,
            y + 1.0,
            w - 2.0,
            m.header_height - 2.0
        )
        .unwrap();
        writeln!(
            svg,
            r#"<text class="table-name" x="{}" y="{}">{}</text>"#,
            x + m.padding_x,
            y + m.header_height / 2.0 + 5.0,
            escape_xml(&table.name)
        )
        .unwrap();

        for (row, field) in table.fields.iter().enumerate() {
            let text_y = m.row_center_y(y, row) + 4.0;
            let class = if field.is_primary { "column-text pk" } else { "column-text" };
            writeln!(
                svg,
                r#"<text class="{}" x="{}" y="{}">{}</text>"#,
                class,
                x + m.padding_x,
                text_y,
                escape_xml(&field.name)
            )
            .unwrap();

            let badge = if field.is_primary {
                format!("{} PK", field.typ)
            } else {
                field.typ.clone()
            };
            writeln!(
                svg,
                r#"<text class="column-type" x="{}" y="{}" text-anchor="end">{}</text>"#,
                x + w - m.padding_x,
                text_y,
                escape_xml(&badge)
            )
            .unwrap();
        }
    }

    fn render_edge(&self, svg: &mut String, edge: &SceneEdge) {
        let extra = if edge.highlighted { " highlighted" } else { "" };
        self.render_line(svg, edge.start.x, edge.start.y, edge.end.x, edge.end.y, extra);
    }

    fn render_draft(&self, svg: &mut String, draft: &DraftLine) {
        self.render_line(
            svg,
            draft.start.x,
            draft.start.y,
            draft.end.x,
            draft.end.y,
            " highlighted draft",
        );
    }

    fn render_line(&self, svg: &mut String, x1: f64, y1: f64, x2: f64, y2: f64, extra: &str) {
        writeln!(
            svg,
            r#"<path class="edge{}" d="M {} {} L {} {}" />"#,
            extra, x1, y1, x2, y2
        )
        .unwrap();
        // The end dot takes the colour classes only; dashing is for the stroke.
        let dot_class = extra.replace(" draft", "");
        writeln!(
            svg,
            r#"<circle class="edge-end{}" cx="{}" cy="{}" r="4" />"#,
            dot_class, x2, y2
        )
        .unwrap();
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
