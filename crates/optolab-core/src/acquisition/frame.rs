use std::sync::Arc;
use parking_lot::Mutex;

/// Bins of the histogram kept next to every stored frame
pub const HISTOGRAM_BINS: usize = 8;

/// A single grabbed or loaded image.
///
/// Pixels are stored row-major as `u16` so that 8 to 16 bit formats share
/// one representation; `bits_depth` tells consumers the meaningful range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub bits_depth: u8,
    pub pixels: Vec<u16>,
}

impl Frame {
    /// Build a frame, returning `None` when the pixel count does not match the size
    pub fn new(width: u32, height: u32, bits_depth: u8, pixels: Vec<u16>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, bits_depth, pixels })
    }

    /// Pixel at (x, y), if inside the frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y as usize) * (self.width as usize) + x as usize).copied()
    }

    /// Largest value representable at this bit depth
    pub fn max_value(&self) -> u16 {
        match self.bits_depth {
            0 => 0,
            d if d >= 16 => u16::MAX,
            d => (1u16 << d) - 1,
        }
    }

    /// Pixel counts over `bins` equal ranges of `0..=max_value()`
    pub fn histogram(&self, bins: usize) -> Vec<u64> {
        let mut counts = vec![0u64; bins];
        if bins == 0 {
            return counts;
        }
        let range = self.max_value() as usize + 1;
        for &p in &self.pixels {
            let bin = ((p as usize).min(range - 1) * bins) / range;
            counts[bin] += 1;
        }
        counts
    }
}

/// What a view needs to show a stored frame without touching its pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSummary {
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub bits_depth: u8,
    /// [`HISTOGRAM_BINS`] counts over `0..=max_value()`
    pub histogram: Vec<u64>,
}

impl FrameSummary {
    /// Lower bound of each histogram bin, for labelling
    pub fn bin_starts(&self) -> Vec<u32> {
        let range = match self.bits_depth {
            d if d >= 16 => 1u32 << 16,
            d => 1u32 << d,
        };
        let bins = self.histogram.len().max(1) as u32;
        (0..self.histogram.len() as u32).map(|i| i * range / bins).collect()
    }
}

/// Latest-image slot shared between the acquisition thread and the UI loop.
///
/// The writer replaces the frame and bumps the sequence counter under one
/// lock, so a reader never sees a sequence number that does not match the
/// stored frame. The histogram is computed by the writer before the lock is
/// taken; readers on the UI loop only copy the [`FrameSummary`].
#[derive(Debug, Clone, Default)]
pub struct FrameSlot {
    inner: Arc<Mutex<SlotState>>,
}

#[derive(Debug, Default)]
struct SlotState {
    frame: Option<Frame>,
    summary: Option<FrameSummary>,
    sequence: u64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored frame, returning the new sequence number
    pub fn store(&self, frame: Frame) -> u64 {
        let histogram = frame.histogram(HISTOGRAM_BINS);
        let mut state = self.inner.lock();
        state.sequence += 1;
        state.summary = Some(FrameSummary {
            sequence: state.sequence,
            width: frame.width,
            height: frame.height,
            bits_depth: frame.bits_depth,
            histogram,
        });
        state.frame = Some(frame);
        state.sequence
    }

    /// Clone of the most recent frame
    pub fn latest(&self) -> Option<Frame> {
        self.inner.lock().frame.clone()
    }

    /// Size, depth and histogram of the most recent frame
    pub fn summary(&self) -> Option<FrameSummary> {
        self.inner.lock().summary.clone()
    }

    /// Number of frames stored since creation
    pub fn sequence(&self) -> u64 {
        self.inner.lock().sequence
    }

    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.frame = None;
        state.summary = None;
    }
}
