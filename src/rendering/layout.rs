/// Fixed two-row grid geometry
///
/// Row 0 holds up to three tiles, row 1 up to two. Each row is centered as if
/// it were full, so a partial row keeps the same offsets as a full one.

/// Edge length of a square tile
pub const TILE_SIZE: u32 = 200;
/// Horizontal gap between neighbouring tiles
pub const TILE_PADDING: u32 = 20;
pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 500;
/// Tiles beyond this count are never placed
pub const MAX_TILES: usize = 5;

const ROW_TOPS: [u32; 2] = [40, 300];
const ROW_CAPACITY: [u32; 2] = [3, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub left: u32,
    pub top: u32,
}

/// Placement of the tile at `index`, or `None` past [`MAX_TILES`].
pub fn tile_placement(index: usize) -> Option<Placement> {
    if index >= MAX_TILES {
        return None;
    }
    let row = if index < 3 { 0 } else { 1 };
    let col = (index % 3) as f64;
    let n = ROW_CAPACITY[row] as f64;

    let tile = TILE_SIZE as f64;
    let pad = TILE_PADDING as f64;
    let row_width = n * tile + (n - 1.0) * pad;
    let left = ((CANVAS_WIDTH as f64 - row_width) / 2.0 + (tile + pad) * col).round();

    Some(Placement {
        left: left as u32,
        top: ROW_TOPS[row],
    })
}

/// Placements for the first `count` tiles, capped at [`MAX_TILES`].
pub fn grid_layout(count: usize) -> Vec<Placement> {
    (0..count.min(MAX_TILES)).filter_map(tile_placement).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_row_is_centered() {
        let lefts: Vec<u32> = (0..3).map(|i| tile_placement(i).unwrap().left).collect();
        assert_eq!(lefts, vec![80, 300, 520]);
        assert!((0..3).all(|i| tile_placement(i).unwrap().top == 40));
    }

    #[test]
    fn second_row_is_centered_independently() {
        assert_eq!(tile_placement(3), Some(Placement { left: 190, top: 300 }));
        assert_eq!(tile_placement(4), Some(Placement { left: 410, top: 300 }));
    }

    #[test]
    fn single_tile_keeps_full_row_offset() {
        assert_eq!(grid_layout(1), vec![Placement { left: 80, top: 40 }]);
    }

    #[test]
    fn layout_caps_at_five() {
        assert_eq!(grid_layout(9).len(), MAX_TILES);
        assert_eq!(tile_placement(5), None);
        assert!(grid_layout(0).is_empty());
    }

    #[test]
    fn tiles_stay_inside_canvas_and_do_not_overlap() {
        let placed = grid_layout(MAX_TILES);
        for p in &placed {
            assert!(p.left + TILE_SIZE <= CANVAS_WIDTH);
            assert!(p.top + TILE_SIZE <= CANVAS_HEIGHT);
        }
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                let disjoint_x = a.left + TILE_SIZE <= b.left || b.left + TILE_SIZE <= a.left;
                let disjoint_y = a.top + TILE_SIZE <= b.top || b.top + TILE_SIZE <= a.top;
                assert!(disjoint_x || disjoint_y);
            }
        }
    }
}
