use fractalgen_core::IterationResult;

use crate::tile::Tile;

/// Per-pixel `IterationResult` data for a full frame.
///
/// This is the raw output of either execution strategy before coloring, so
/// host and device renders go through the same color pass.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationBuffer {
    pub width: u32,
    pub height: u32,
    pub max_iterations: u32,
    pub data: Vec<IterationResult>,
}

impl IterationBuffer {
    pub fn new(width: u32, height: u32, max_iterations: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            max_iterations,
            data: vec![IterationResult::Interior; size],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> IterationResult {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Copy tile iteration data into the correct region of the buffer.
    pub fn blit_tile(&mut self, tile: &Tile, tile_data: &[IterationResult]) {
        debug_assert_eq!(tile_data.len(), tile.pixel_count());
        for py in 0..tile.height {
            let buf_y = tile.y + py;
            if buf_y >= self.height {
                break;
            }
            let dst_start = buf_y as usize * self.width as usize + tile.x as usize;
            let src_start = (py * tile.width) as usize;
            let copy_w = tile.width.min(self.width - tile.x) as usize;
            self.data[dst_start..dst_start + copy_w]
                .copy_from_slice(&tile_data[src_start..src_start + copy_w]);
        }
    }

    pub fn interior_count(&self) -> usize {
        self.data.iter().filter(|r| r.is_interior()).count()
    }
}
