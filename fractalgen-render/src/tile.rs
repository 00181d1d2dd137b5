/// Default tile size in pixels. 64×64 results × 16 bytes = 64 KB per tile.
pub const TILE_SIZE: u32 = 64;

/// A rectangular tile within the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Pixel x of the top-left corner.
    pub x: u32,
    /// Pixel y of the top-left corner.
    pub y: u32,
    /// Tile width in pixels (may be smaller at the right edge).
    pub width: u32,
    /// Tile height in pixels (may be smaller at the bottom edge).
    pub height: u32,
}

impl Tile {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixel coordinates covered by this tile, row-major.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |py| (self.x..self.x + self.width).map(move |px| (px, py)))
    }
}

/// Cut a `width × height` raster into tiles of at most `tile_size` pixels
/// per side, row-major. The tiles partition the raster exactly.
pub fn build_tile_grid(width: u32, height: u32, tile_size: u32) -> Vec<Tile> {
    let tile_size = tile_size.max(1);
    let mut tiles = Vec::new();
    let mut y = 0;
    while y < height {
        let th = tile_size.min(height - y);
        let mut x = 0;
        while x < width {
            let tw = tile_size.min(width - x);
            tiles.push(Tile {
                x,
                y,
                width: tw,
                height: th,
            });
            x += tw;
        }
        y += th;
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_grid_covers_viewport_once() {
        let tiles = build_tile_grid(200, 150, TILE_SIZE);
        let mut covered = vec![false; 200 * 150];
        for tile in &tiles {
            for (px, py) in tile.pixels() {
                let idx = py as usize * 200 + px as usize;
                assert!(!covered[idx], "pixel ({px}, {py}) covered twice");
                covered[idx] = true;
            }
        }
        assert!(covered.iter().all(|&c| c), "all pixels must be covered");
    }

    #[test]
    fn edge_tiles_are_clipped() {
        let tiles = build_tile_grid(130, 70, TILE_SIZE);
        assert_eq!(tiles.len(), 3 * 2);
        let last = tiles[tiles.len() - 1];
        assert_eq!((last.x, last.y, last.width, last.height), (128, 64, 2, 6));
        for tile in &tiles {
            assert!(tile.width <= TILE_SIZE && tile.height <= TILE_SIZE);
        }
    }

    #[test]
    fn tiny_raster_is_one_tile() {
        let tiles = build_tile_grid(1, 1, TILE_SIZE);
        assert_eq!(
            tiles,
            vec![Tile {
                x: 0,
                y: 0,
                width: 1,
                height: 1
            }]
        );
    }
}
