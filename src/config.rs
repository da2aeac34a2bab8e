use crate::error::ConfigError;
use crate::layout::GridSpec;
use crate::measure::TableMetrics;
use serde::{Deserialize, Serialize};

/// Canvas configuration. Missing JSON keys fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub grid: GridSpec,
    pub table: TableMetrics,
}

impl CanvasConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CanvasConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridSpec {
            cell,
            gutter,
            origin,
            row_width_limit,
        } = self.grid;
        let table = &self.table;
        let values = [
            ("grid.cell.width", cell.width),
            ("grid.cell.height", cell.height),
            ("grid.gutter", gutter),
            ("grid.origin.x", origin.x),
            ("grid.origin.y", origin.y),
            ("grid.rowWidthLimit", row_width_limit),
            ("table.charWidth", table.char_width),
            ("table.paddingX", table.padding_x),
            ("table.minWidth", table.min_width),
            ("table.minHeight", table.min_height),
            ("table.headerHeight", table.header_height),
            ("table.rowHeight", table.row_height),
            ("table.footerHeight", table.footer_height),
        ];
        if let Some(&(name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFinite(name));
        }

        if cell.width <= 0.0 || cell.height <= 0.0 {
            return Err(ConfigError::EmptyCell(cell.width, cell.height));
        }
        if gutter < 0.0 {
            return Err(ConfigError::NegativeGutter(gutter));
        }
        // Row hit testing divides by the row height.
        let positive = [
            ("table.charWidth", table.char_width),
            ("table.headerHeight", table.header_height),
            ("table.rowHeight", table.row_height),
        ];
        if let Some(&(name, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ConfigError::NonPositive { name, value });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Point, Size};

    #[test]
    fn test_empty_json_is_default() {
        let config = CanvasConfig::from_json("{}").unwrap();
        assert_eq!(config, CanvasConfig::default());
        assert_eq!(config.grid.origin, Point::new(20.0, 20.0));
        assert_eq!(config.table.min_width, 280.0);
    }

    #[test]
    fn test_partial_override() {
        let config = CanvasConfig::from_json(
            r#"{"grid": {"rowWidthLimit": 600, "cell": {"width": 200, "height": 250}}, "table": {"rowHeight": 32}}"#,
        )
        .unwrap();
        assert_eq!(config.grid.row_width_limit, 600.0);
        assert_eq!(config.grid.cell, Size::new(200.0, 250.0));
        assert_eq!(config.grid.gutter, 20.0);
        assert_eq!(config.table.row_height, 32.0);
        assert_eq!(config.table.header_height, 80.0);
    }

    #[test]
    fn test_rejects_empty_cell() {
        let err = CanvasConfig::from_json(r#"{"grid": {"cell": {"width": 0, "height": 300}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCell(w, _) if w == 0.0));
    }

    #[test]
    fn test_rejects_non_positive_row_height() {
        for json in [r#"{"table": {"rowHeight": -40}}"#, r#"{"table": {"rowHeight": 0}}"#] {
            let err = CanvasConfig::from_json(json).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::NonPositive { name: "table.rowHeight", .. }
            ));
        }
    }

    #[test]
    fn test_rejects_non_positive_header_and_char_width() {
        let err = CanvasConfig::from_json(r#"{"table": {"headerHeight": -1}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { name: "table.headerHeight", .. }));

        let err = CanvasConfig::from_json(r#"{"table": {"charWidth": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { name: "table.charWidth", .. }));
    }

    #[test]
    fn test_rejects_negative_gutter() {
        let err = CanvasConfig::from_json(r#"{"grid": {"gutter": -20}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::NegativeGutter(g) if g == -20.0));
        assert!(CanvasConfig::from_json(r#"{"grid": {"gutter": 0}}"#).is_ok());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let mut config = CanvasConfig::default();
        config.table.row_height = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite("table.rowHeight"))
        ));

        let mut config = CanvasConfig::default();
        config.grid.row_width_limit = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite("grid.rowWidthLimit"))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            CanvasConfig::from_json("{\"grid\": 3}"),
            Err(ConfigError::Json(_))
        ));
    }
}
