use std::collections::VecDeque;

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::raster::Raster;
use crate::transform::controller::Transform;

/// Auto-placement tuning.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlacementOpts {
    /// Side of a square grid cell in pixels.
    pub grid_size: u32,
    /// Cells scoring strictly below this qualify. `None` uses the median cell score, and then
    /// cells equal to the median qualify too unless every cell scores the same.
    pub threshold: Option<f64>,
}

impl Default for PlacementOpts {
    fn default() -> Self {
        Self {
            grid_size: 50,
            threshold: None,
        }
    }
}

/// 4-connected group of qualifying cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// `(column, row)` of each cell, in discovery order.
    pub cells: Vec<(u32, u32)>,
    /// Mean of the member cells' scores.
    pub mean_score: f64,
}

impl Region {
    /// Mean `(column, row)` of the member cells.
    pub fn centroid(&self) -> (f64, f64) {
        let n = self.cells.len().max(1) as f64;
        let (sc, sr) = self.cells.iter().fold((0.0, 0.0), |(c, r), &(x, y)| {
            (c + f64::from(x), r + f64::from(y))
        });
        (sc / n, sr / n)
    }
}

/// Grid scores and regions computed for one raster.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementAnalysis {
    /// Raster width.
    pub width: u32,
    /// Raster height.
    pub height: u32,
    /// Cell side in pixels.
    pub grid_size: u32,
    /// Number of cell columns (the last may be partial).
    pub cols: u32,
    /// Number of cell rows (the last may be partial).
    pub rows: u32,
    /// Mean gradient per cell, row-major.
    pub scores: Vec<f64>,
    /// Qualification cutoff that was applied.
    pub threshold: f64,
    /// Whether cells scoring exactly `threshold` qualified.
    pub inclusive: bool,
    /// Regions sorted by cell count, largest first (ties keep discovery order).
    pub regions: Vec<Region>,
}

impl PlacementAnalysis {
    /// Score of cell `(col, row)`.
    pub fn score(&self, col: u32, row: u32) -> Option<f64> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.scores.get((row * self.cols + col) as usize).copied()
    }

    /// Median cell score.
    pub fn median_score(&self) -> f64 {
        median(&self.scores)
    }

    /// Whether a cell with this score passes the cutoff.
    pub fn qualifies(&self, score: f64) -> bool {
        score < self.threshold || (self.inclusive && score == self.threshold)
    }

    /// Transform anchored on the largest region, or the centered default.
    ///
    /// The anchor is the region's centroid. When that point falls outside the region (a ring
    /// around a busy patch, say) the member cell nearest to it is used instead.
    pub fn suggestion(&self) -> Transform {
        let Some(best) = self.regions.first() else {
            return Transform::default();
        };
        let (mut c, mut r) = best.centroid();
        let landing = ((c + 0.5).floor() as u32, (r + 0.5).floor() as u32);
        if !best.cells.contains(&landing) {
            let nearest = best.cells.iter().min_by(|a, b| {
                let da = (f64::from(a.0) - c).powi(2) + (f64::from(a.1) - r).powi(2);
                let db = (f64::from(b.0) - c).powi(2) + (f64::from(b.1) - r).powi(2);
                da.total_cmp(&db)
            });
            if let Some(&(nc, nr)) = nearest {
                (c, r) = (f64::from(nc), f64::from(nr));
            }
        }
        let gs = f64::from(self.grid_size);
        Transform {
            x: ((c + 0.5) * gs / f64::from(self.width)).clamp(0.0, 1.0),
            y: ((r + 0.5) * gs / f64::from(self.height)).clamp(0.0, 1.0),
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

/// Low-gradient region finder.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AutoPlacement {
    opts: PlacementOpts,
}

impl AutoPlacement {
    /// Finder with the given options.
    pub fn new(opts: PlacementOpts) -> Self {
        Self { opts }
    }

    /// Options in use.
    pub fn opts(&self) -> PlacementOpts {
        self.opts
    }

    /// Score the grid and grow regions. Fails when the raster cannot be sampled.
    #[tracing::instrument(skip(self, raster), fields(w = raster.width, h = raster.height, grid = self.opts.grid_size))]
    pub fn analyze(&self, raster: &Raster) -> CaptionResult<PlacementAnalysis> {
        raster.validate()?;
        let gs = self.opts.grid_size;
        if gs == 0 {
            return Err(CaptionError::validation("grid size must be > 0"));
        }
        let (w, h) = raster.dimensions();
        let magnitude = gradient_magnitude(&grayscale(raster), w, h);

        let cols = w.div_ceil(gs);
        let rows = h.div_ceil(gs);
        let mut scores = vec![0.0f64; (cols * rows) as usize];
        for row in 0..rows {
            for col in 0..cols {
                let (x0, y0) = (col * gs, row * gs);
                let (x1, y1) = ((x0 + gs).min(w), (y0 + gs).min(h));
                let mut sum = 0.0;
                for y in y0..y1 {
                    let base = (y * w) as usize;
                    sum += magnitude[base + x0 as usize..base + x1 as usize]
                        .iter()
                        .sum::<f64>();
                }
                let n = f64::from((x1 - x0) * (y1 - y0));
                scores[(row * cols + col) as usize] = sum / n;
            }
        }

        let (threshold, inclusive) = match self.opts.threshold {
            Some(t) => (t, false),
            None => {
                let m = median(&scores);
                (m, scores.iter().any(|&s| s > m))
            }
        };
        let mut regions = grow_regions(&scores, cols, rows, threshold, inclusive);
        regions.sort_by(|a, b| b.cells.len().cmp(&a.cells.len()));
        tracing::debug!(
            regions = regions.len(),
            threshold,
            inclusive,
            "auto placement analysis"
        );

        Ok(PlacementAnalysis {
            width: w,
            height: h,
            grid_size: gs,
            cols,
            rows,
            scores,
            threshold,
            inclusive,
            regions,
        })
    }

    /// Suggested placement; the centered default when the raster cannot be sampled or no cell
    /// qualifies.
    pub fn suggest(&self, raster: &Raster) -> Transform {
        match self.analyze(raster) {
            Ok(analysis) => analysis.suggestion(),
            Err(err) => {
                tracing::debug!(error = %err, "auto placement fell back to center");
                Transform::default()
            }
        }
    }
}

fn grayscale(raster: &Raster) -> Vec<f64> {
    raster
        .to_straight_rgba8()
        .chunks_exact(4)
        .map(|px| 0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2]))
        .collect()
}

fn gradient_magnitude(gray: &[f64], w: u32, h: u32) -> Vec<f64> {
    let (w, h) = (w as usize, h as usize);
    let mut out = vec![0.0f64; w * h];
    for y in 0..h.saturating_sub(1) {
        for x in 0..w.saturating_sub(1) {
            let i = y * w + x;
            let gx = gray[i + 1] - gray[i];
            let gy = gray[i + w] - gray[i];
            out[i] = (gx * gx + gy * gy).sqrt();
        }
    }
    out
}

fn grow_regions(
    scores: &[f64],
    cols: u32,
    rows: u32,
    threshold: f64,
    inclusive: bool,
) -> Vec<Region> {
    let qualifies = |i: usize| scores[i] < threshold || (inclusive && scores[i] == threshold);
    let mut seen = vec![false; scores.len()];
    let mut regions = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..scores.len() {
        if seen[start] || !qualifies(start) {
            continue;
        }
        seen[start] = true;
        queue.push_back(start);
        let mut cells = Vec::new();
        let mut total = 0.0;
        while let Some(i) = queue.pop_front() {
            let (col, row) = ((i as u32) % cols, (i as u32) / cols);
            cells.push((col, row));
            total += scores[i];

            let mut visit = |c: u32, r: u32| {
                let j = (r * cols + c) as usize;
                if !seen[j] && qualifies(j) {
                    seen[j] = true;
                    queue.push_back(j);
                }
            };
            if col > 0 {
                visit(col - 1, row);
            }
            if col + 1 < cols {
                visit(col + 1, row);
            }
            if row > 0 {
                visit(col, row - 1);
            }
            if row + 1 < rows {
                visit(col, row + 1);
            }
        }
        let mean_score = total / cells.len() as f64;
        regions.push(Region { cells, mean_score });
    }
    regions
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/placement/auto.rs"]
mod tests;
