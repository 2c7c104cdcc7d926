/// Logical grid dimensions passed through the game as a named type.
///
/// Replaces the anonymous `(u16, u16)` tuple that was used for bounds,
/// making width vs. height unambiguous at every call site.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Converts a viewport in display units into a discrete cell grid.
///
/// Pure floor division. The terminal frontend calls this with character
/// columns/rows and a 2×1 character cell so cells render roughly square;
/// a pixel frontend would pass pixel dimensions and a square cell.
#[must_use]
pub fn cell_count(
    viewport_width: u16,
    viewport_height: u16,
    cell_width: u16,
    cell_height: u16,
) -> GridSize {
    GridSize {
        width: viewport_width / cell_width.max(1),
        height: viewport_height / cell_height.max(1),
    }
}

/// Tick interval in milliseconds at normal speed.
pub const NORMAL_TICK_MS: u64 = 150;

/// Tick interval in milliseconds while the speed boost is held.
pub const BOOST_TICK_MS: u64 = 75;

/// Score awarded for each food eaten.
pub const FOOD_POINTS: u32 = 10;

/// Extra score when food is eaten while boosting.
pub const BOOST_BONUS_POINTS: u32 = 5;

/// Snake length at episode start.
pub const START_LENGTH: usize = 3;

/// Terminal columns occupied by one grid cell.
pub const CELL_WIDTH: u16 = 2;

/// Terminal rows occupied by one grid cell.
pub const CELL_HEIGHT: u16 = 1;

/// Rows reserved below the play area for the HUD.
pub const HUD_ROWS: u16 = 2;

#[cfg(test)]
mod tests {
    use super::{cell_count, GridSize};

    #[test]
    fn cell_count_uses_floor_division() {
        let grid = cell_count(81, 25, 2, 1);
        assert_eq!(
            grid,
            GridSize {
                width: 40,
                height: 25
            }
        );
    }

    #[test]
    fn cell_count_of_tiny_viewport_is_empty() {
        let grid = cell_count(1, 0, 2, 1);
        assert_eq!(grid.total_cells(), 0);
    }

    #[test]
    fn total_cells_multiplies_dimensions() {
        let grid = GridSize {
            width: 10,
            height: 10,
        };
        assert_eq!(grid.total_cells(), 100);
    }
}
