//! Column-count search for a ring group's device grid.
//!
//! The goal is not the densest packing but a balanced rectangle near the
//! target column count with about three rows. There is no closed form for
//! the hand-tuned objective below, so the search is a bounded brute force.

use serde::Serialize;

use crate::config::OptimizerConfig;

// ── Size term ───────────────────────────────────────────────────────
const SCALE_LARGE: f32 = 0.7;
const SCALE_MEDIUM: f32 = 0.5;
const SCALE_WEIGHT_LARGE: f32 = 200.0;
const SCALE_WEIGHT_MEDIUM: f32 = 150.0;
const SCALE_WEIGHT_SMALL: f32 = 100.0;

// ── Column term (peaks at the target, then grows slowly) ────────────
const COLUMN_WEIGHT_BELOW: f32 = 500.0;
const COLUMN_WEIGHT_ABOVE: f32 = 50.0;

const EVEN_DIVISION_BONUS: f32 = 1000.0;

// ── Proximity to the target column count ────────────────────────────
const TARGET_EXACT_BONUS: f32 = 3000.0;
const TARGET_NEAR_BONUS: f32 = 1500.0;
const TARGET_NEAR_RANGE: usize = 2;
const TARGET_FAIR_BONUS: f32 = 500.0;
const TARGET_FAIR_RANGE: usize = 5;
const TARGET_FAR_PENALTY: f32 = 1000.0;
const TARGET_FAR_RANGE: usize = 10;

// ── Row shape ───────────────────────────────────────────────────────
const ROWS_IDEAL_BONUS: f32 = 800.0;
const ROWS_TWO_BONUS: f32 = 200.0;
const ROWS_FEW_BONUS: f32 = 400.0;
const ROWS_MANY_LIMIT: usize = 5;
const ROWS_MANY_PENALTY: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutCandidate {
    pub columns: usize,
    pub rows: usize,
    pub scale: f32,
    pub score: f32,
}

impl LayoutCandidate {
    /// Unscored candidate for `device_count` devices in `columns` columns.
    pub fn new(device_count: usize, columns: usize, scale: f32) -> Self {
        Self {
            columns,
            rows: device_count.div_ceil(columns.max(1)),
            scale,
            score: 0.0,
        }
    }

    fn scored(mut self, device_count: usize, target_columns: usize) -> Self {
        self.score = score_candidate(&self, device_count, target_columns);
        self
    }
}

/// Objective for one candidate, higher is better. Pure, so it can be checked
/// in isolation from any placement.
pub fn score_candidate(candidate: &LayoutCandidate, device_count: usize, target_columns: usize) -> f32 {
    let columns = candidate.columns;
    let rows = candidate.rows;
    let scale = candidate.scale;
    let mut score = 0.0;

    score += if scale >= SCALE_LARGE {
        scale * SCALE_WEIGHT_LARGE
    } else if scale >= SCALE_MEDIUM {
        scale * SCALE_WEIGHT_MEDIUM
    } else {
        scale * SCALE_WEIGHT_SMALL
    };

    score += if columns <= target_columns {
        columns as f32 * COLUMN_WEIGHT_BELOW
    } else {
        target_columns as f32 * COLUMN_WEIGHT_BELOW
            + (columns - target_columns) as f32 * COLUMN_WEIGHT_ABOVE
    };

    if columns > 0 && device_count % columns == 0 {
        score += EVEN_DIVISION_BONUS;
    }

    let distance = columns.abs_diff(target_columns);
    if distance == 0 {
        score += TARGET_EXACT_BONUS;
    } else if distance <= TARGET_NEAR_RANGE {
        score += TARGET_NEAR_BONUS;
    } else if distance <= TARGET_FAIR_RANGE {
        score += TARGET_FAIR_BONUS;
    } else if distance > TARGET_FAR_RANGE {
        score -= TARGET_FAR_PENALTY;
    }

    if rows == 3 {
        score += ROWS_IDEAL_BONUS;
    } else if rows == 2 {
        score += ROWS_TWO_BONUS;
    } else if rows <= ROWS_MANY_LIMIT {
        score += ROWS_FEW_BONUS;
    } else {
        score -= (rows - ROWS_MANY_LIMIT) as f32 * ROWS_MANY_PENALTY;
    }

    score
}

/// Layout used when no column count in range keeps devices legible.
pub fn fallback_candidate(device_count: usize, config: &OptimizerConfig) -> LayoutCandidate {
    LayoutCandidate::new(device_count, config.fallback_columns, config.fallback_scale)
}

/// Searches `min_columns..=min(device_count, max_columns)` and keeps the
/// strictly best-scoring candidate, starting from the fallback.
pub fn optimize_grid(device_count: usize, available_width: f32, config: &OptimizerConfig) -> LayoutCandidate {
    let mut best = fallback_candidate(device_count, config);
    let unit = config.unit_width();
    if unit <= 0.0 {
        return best;
    }

    let upper = device_count.min(config.max_columns);
    for columns in config.min_columns.max(1)..=upper {
        let scale = available_width / (columns as f32 * unit);
        if scale < config.min_scale {
            continue;
        }
        let candidate = LayoutCandidate::new(device_count, columns, scale.min(1.0))
            .scored(device_count, config.target_columns);
        if candidate.score > best.score {
            best = candidate;
        }
    }

    best
}
