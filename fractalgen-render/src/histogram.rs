use std::sync::atomic::{AtomicU32, Ordering};

/// Per-pixel hit counters for one Buddhabrot render.
///
/// Shared by reference between worker threads. Every increment is an atomic
/// read-modify-write, so concurrent hits on the same cell are never lost.
/// Relaxed ordering suffices: counts are only read after the workers join.
#[derive(Debug)]
pub struct OrbitHistogram {
    width: u32,
    height: u32,
    cells: Vec<AtomicU32>,
}

impl OrbitHistogram {
    /// A zeroed histogram covering a `width × height` raster.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Wrap counts produced elsewhere (e.g. read back from a device).
    pub fn from_counts(width: u32, height: u32, counts: Vec<u32>) -> Self {
        debug_assert_eq!(counts.len(), width as usize * height as usize);
        Self {
            width,
            height,
            cells: counts.into_iter().map(AtomicU32::new).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn increment(&self, x: u32, y: u32) {
        let i = y as usize * self.width as usize + x as usize;
        self.cells[i].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.cells[y as usize * self.width as usize + x as usize].load(Ordering::Relaxed)
    }

    /// The global maximum count; 0 for an empty histogram.
    pub fn max(&self) -> u32 {
        self.cells
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .max()
            .unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.cells
            .iter()
            .map(|c| c.load(Ordering::Relaxed) as u64)
            .sum()
    }

    /// Plain copy of the counts, row-major.
    pub fn snapshot(&self) -> Vec<u32> {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }
}
