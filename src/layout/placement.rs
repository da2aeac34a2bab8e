//! Table placement on the canvas grid.

use serde::{Deserialize, Serialize};

use super::types::{Delta, Point, Size};

/// Parameters of the virtual grid scanned for free table slots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridSpec {
    /// Footprint used for the overlap test.
    pub cell: Size,
    /// Space between neighbouring cells; the scan step is `cell + gutter`.
    pub gutter: f64,
    pub origin: Point,
    /// A candidate whose x exceeds this wraps to the next row.
    pub row_width_limit: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            cell: Size::new(300.0, 300.0),
            gutter: 20.0,
            origin: Point::new(20.0, 20.0),
            row_width_limit: 1000.0,
        }
    }
}

impl GridSpec {
    fn step_x(&self) -> f64 {
        self.cell.width + self.gutter
    }

    fn step_y(&self) -> f64 {
        self.cell.height + self.gutter
    }

    /// Candidate cells in scan order: left to right, wrapping into new rows.
    pub fn cells(&self) -> GridCells<'_> {
        GridCells {
            grid: self,
            row: 0,
            col: 0,
        }
    }

    /// Both axis distances are below the cell dimensions.
    pub fn overlaps(&self, a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < self.cell.width && (a.y - b.y).abs() < self.cell.height
    }
}

pub struct GridCells<'a> {
    grid: &'a GridSpec,
    row: usize,
    col: usize,
}

impl Iterator for GridCells<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let g = self.grid;
        let mut x = g.origin.x + self.col as f64 * g.step_x();
        // The first column of a row is always emitted, even if the limit is
        // left of the origin.
        if self.col > 0 && x > g.row_width_limit {
            self.col = 0;
            self.row += 1;
            x = g.origin.x;
        }
        let y = g.origin.y + self.row as f64 * g.step_y();
        self.col += 1;
        Some(Point::new(x, y))
    }
}

/// Find the first grid cell that does not overlap any existing placement.
///
/// One existing placement can block at most four cells, so the scan is
/// bounded by `4 * existing.len() + 1` candidates. Should that bound ever be
/// exhausted (a gutter narrower than zero breaks the four-cell argument), a
/// slot at the left edge below every obstacle is returned.
pub fn find_available_position(existing: &[Point], grid: &GridSpec) -> Point {
    if existing.is_empty() {
        return grid.origin;
    }

    let budget = existing.len() * 4 + 1;
    grid.cells()
        .take(budget)
        .find(|candidate| !existing.iter().any(|p| grid.overlaps(*p, *candidate)))
        .unwrap_or_else(|| below_all(existing, grid))
}

fn below_all(existing: &[Point], grid: &GridSpec) -> Point {
    let lowest = existing.iter().map(|p| p.y).fold(grid.origin.y, f64::max);
    Point::new(grid.origin.x, lowest + grid.step_y().max(grid.cell.height))
}

/// Coordinate-wise max with zero. The canvas has no upper bound.
pub fn clamp(p: Point) -> Point {
    Point::new(p.x.max(0.0), p.y.max(0.0))
}

/// Apply a pointer delta to a base position, then clamp.
pub fn translate(base: Point, delta: Delta) -> Point {
    clamp(base + delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_empty_canvas_returns_origin() {
        let grid = GridSpec::default();
        assert_eq!(find_available_position(&[], &grid), grid.origin);
    }

    #[test]
    fn test_first_row_fills_left_to_right() {
        let grid = GridSpec::default();
        let mut placed = Vec::new();
        for _ in 0..3 {
            let p = find_available_position(&placed, &grid);
            placed.push(p);
        }
        assert_eq!(
            placed,
            vec![
                Point::new(20.0, 20.0),
                Point::new(340.0, 20.0),
                Point::new(660.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_wraps_to_next_row_past_limit() {
        let grid = GridSpec::default();
        let placed = vec![
            Point::new(20.0, 20.0),
            Point::new(340.0, 20.0),
            Point::new(660.0, 20.0),
            Point::new(980.0, 20.0),
        ];
        // 1300 > 1000, so the next candidate starts a new row.
        assert_eq!(
            find_available_position(&placed, &grid),
            Point::new(20.0, 340.0)
        );
    }

    #[test]
    fn test_fills_gap_left_by_removed_table() {
        let grid = GridSpec::default();
        let placed = vec![Point::new(20.0, 20.0), Point::new(660.0, 20.0)];
        assert_eq!(
            find_available_position(&placed, &grid),
            Point::new(340.0, 20.0)
        );
    }

    #[test]
    fn test_off_grid_obstacle_blocks_neighbouring_cells() {
        let grid = GridSpec::default();
        // Overlaps (20,20) and (340,20) at once.
        let placed = vec![Point::new(180.0, 20.0)];
        assert_eq!(
            find_available_position(&placed, &grid),
            Point::new(660.0, 20.0)
        );
    }

    #[test]
    fn test_limit_left_of_origin_yields_single_column() {
        let grid = GridSpec {
            row_width_limit: 0.0,
            ..GridSpec::default()
        };
        let cells: Vec<Point> = grid.cells().take(3).collect();
        assert_eq!(
            cells,
            vec![
                Point::new(20.0, 20.0),
                Point::new(20.0, 340.0),
                Point::new(20.0, 660.0),
            ]
        );
    }

    #[test]
    fn test_result_never_overlaps_dense_cluster() {
        let grid = GridSpec::default();
        let placed: Vec<Point> = (0..40)
            .map(|i| Point::new((i % 7) as f64 * 97.0, (i / 7) as f64 * 113.0))
            .collect();
        let p = find_available_position(&placed, &grid);
        assert!(placed.iter().all(|q| !grid.overlaps(*q, p)));
    }

    #[rstest]
    #[case(Point::new(-5.0, -10.0), Point::new(0.0, 0.0))]
    #[case(Point::new(12.5, -1.0), Point::new(12.5, 0.0))]
    #[case(Point::new(-0.5, 40.0), Point::new(0.0, 40.0))]
    #[case(Point::new(3000.0, 4000.0), Point::new(3000.0, 4000.0))]
    fn test_clamp(#[case] input: Point, #[case] expected: Point) {
        assert_eq!(clamp(input), expected);
    }

    #[rstest]
    #[case(Point::new(100.0, 100.0), Delta::new(25.0, -40.0), Point::new(125.0, 60.0))]
    #[case(Point::new(100.0, 100.0), Delta::new(-150.0, 10.0), Point::new(0.0, 110.0))]
    #[case(Point::new(0.0, 0.0), Delta::new(-1.0, -1.0), Point::new(0.0, 0.0))]
    fn test_translate(#[case] base: Point, #[case] delta: Delta, #[case] expected: Point) {
        assert_eq!(translate(base, delta), expected);
    }
}
