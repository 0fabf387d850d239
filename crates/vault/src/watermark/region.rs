//! Geometry of the centred square used by the pattern scheme.

/// Lower bound on the side of the centre square, in pixels.
pub const MIN_REGION_SIDE: u32 = 16;

/// Index of the blue sample within an interleaved pixel.
pub const BLUE: usize = 2;

/// Largest offset, in pixels, between the expected and actual origin of the
/// centre square inside a centrally cropped copy.
pub const ORIGIN_DRIFT: i64 = 2;

/// Centre square of side `max(16, min(width, height) / 3)`, clipped to the
/// image bounds. Bounds are half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterRegion {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CenterRegion {
    /// Compute the region for an image of the given size.
    pub fn of(width: u32, height: u32) -> Self {
        let side = MIN_REGION_SIDE.max(width.min(height) / 3);
        let x0 = width.saturating_sub(side) / 2;
        let y0 = height.saturating_sub(side) / 2;
        Self {
            x0,
            y0,
            x1: x0.saturating_add(side).min(width),
            y1: y0.saturating_add(side).min(height),
        }
    }

    /// Squares that may hold the embedded pattern, most likely first.
    ///
    /// The square computed from the image's own size comes first. After it
    /// come squares for a central crop keeping at least half of each side of
    /// the marked original: sides from two thirds down to one third of the
    /// shorter side (never below [`MIN_REGION_SIDE`]), each centred and then
    /// shifted by up to [`ORIGIN_DRIFT`] pixels, nearest shifts first.
    pub fn candidates(width: u32, height: u32) -> Vec<Self> {
        let own = Self::of(width, height);
        let mut out = vec![own];

        let shorter = width.min(height);
        let largest = shorter.min(MIN_REGION_SIDE.max((2 * shorter + 2) / 3));
        let smallest = MIN_REGION_SIDE.max(shorter / 3);

        let mut drifts: Vec<(i64, i64)> = (-ORIGIN_DRIFT..=ORIGIN_DRIFT)
            .flat_map(|dy| (-ORIGIN_DRIFT..=ORIGIN_DRIFT).map(move |dx| (dx, dy)))
            .collect();
        drifts.sort_by_key(|&(dx, dy)| (dx.abs() + dy.abs(), dy, dx));

        for side in (smallest..=largest).rev() {
            let x = i64::from((width - side) / 2);
            let y = i64::from((height - side) / 2);
            for &(dx, dy) in &drifts {
                let Some(region) = Self::square(width, height, x + dx, y + dy, side) else {
                    continue;
                };
                if region != own {
                    out.push(region);
                }
            }
        }
        out
    }

    /// A `side`×`side` square at (`x0`, `y0`), if it lies inside the image.
    fn square(width: u32, height: u32, x0: i64, y0: i64, side: u32) -> Option<Self> {
        let x0 = u32::try_from(x0).ok()?;
        let y0 = u32::try_from(y0).ok()?;
        let x1 = x0.checked_add(side).filter(|&x1| x1 <= width)?;
        let y1 = y0.checked_add(side).filter(|&y1| y1 <= height)?;
        Some(Self { x0, y0, x1, y1 })
    }

    /// Number of pixels inside the region.
    pub fn area(&self) -> usize {
        (self.x1 - self.x0) as usize * (self.y1 - self.y0) as usize
    }

    /// Buffer indices of `channel` for every pixel in the region, row-major.
    pub fn sample_indices(
        &self,
        width: u32,
        channels: usize,
        channel: usize,
    ) -> impl Iterator<Item = usize> {
        let Self { x0, y0, x1, y1 } = *self;
        let stride = width as usize;
        (y0..y1).flat_map(move |y| {
            (x0..x1).map(move |x| (y as usize * stride + x as usize) * channels + channel)
        })
    }
}
