//! Synthetic job generator.
//!
//! Produces seeded inventories shaped like typical panel-saw work: carcass
//! sides, shelves, narrow rails and small fillers, rounded to whole
//! millimetres.

use rand::prelude::*;
use u_cutplan_guillotine::{PieceItem, Sheet};

use crate::job::Job;

/// Standard 2750 x 1830 board.
pub const STANDARD_SHEET: Sheet = Sheet {
    width: 2750.0,
    height: 1830.0,
    margin: 0.0,
};

/// Generator for synthetic jobs.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    rng: StdRng,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticGenerator {
    /// Creates a generator with a random seed.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a generator with a specific seed for reproducibility.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn dimension(&mut self, low: u32, high: u32) -> f64 {
        (self.rng.gen_range(low..=high) * 10) as f64
    }

    /// Mixed cabinet inventory with `count` entries.
    pub fn mixed(&mut self, count: usize, sheet: Sheet) -> Job {
        let mut pieces = Vec::with_capacity(count);
        for i in 0..count {
            let (width, height) = match self.rng.gen_range(0..4) {
                // Carcass side
                0 => (self.dimension(50, 90), self.dimension(30, 60)),
                // Shelf
                1 => (self.dimension(40, 120), self.dimension(25, 45)),
                // Rail
                2 => (self.dimension(40, 120), self.dimension(6, 12)),
                // Filler
                _ => (self.dimension(10, 30), self.dimension(10, 30)),
            };
            let quantity = self.rng.gen_range(1..=4);
            pieces.push(PieceItem::new(quantity, width, height).with_label(format!("P{}", i + 1)));
        }
        Job::new("synthetic_mixed", sheet, pieces)
    }

    /// Many copies of a few sizes, where grouping pays off.
    pub fn repetitive(&mut self, sizes: usize, sheet: Sheet) -> Job {
        let pieces = (0..sizes)
            .map(|_| {
                let width = self.dimension(20, 80);
                let height = self.dimension(20, 60);
                PieceItem::new(self.rng.gen_range(6..=20), width, height)
            })
            .collect();
        Job::new("synthetic_repetitive", sheet, pieces)
    }

    /// Long narrow strips.
    pub fn strips(&mut self, count: usize, sheet: Sheet) -> Job {
        let pieces = (0..count)
            .map(|_| {
                let width = self.dimension(100, 260);
                let height = self.dimension(5, 15);
                PieceItem::new(self.rng.gen_range(1..=6), width, height)
            })
            .collect();
        Job::new("synthetic_strips", sheet, pieces)
    }
}

/// Preset synthetic jobs.
pub struct SyntheticJobs;

impl SyntheticJobs {
    /// Every preset, generated from one seed.
    pub fn all(seed: u64) -> Vec<Job> {
        let mut generator = SyntheticGenerator::with_seed(seed);
        vec![
            generator.mixed(20, STANDARD_SHEET),
            generator.repetitive(5, STANDARD_SHEET),
            generator.strips(12, STANDARD_SHEET),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let a = SyntheticGenerator::with_seed(42).mixed(15, STANDARD_SHEET);
        let b = SyntheticGenerator::with_seed(42).mixed(15, STANDARD_SHEET);
        assert_eq!(a.pieces, b.pieces);
        assert_eq!(a.pieces.len(), 15);
    }

    #[test]
    fn test_generated_pieces_are_valid() {
        for job in SyntheticJobs::all(7) {
            assert!(!job.pieces.is_empty());
            for item in &job.pieces {
                assert!(item.validate().is_ok());
                assert_eq!(item.width % 10.0, 0.0);
            }
        }
    }

    #[test]
    fn test_labels_are_unique() {
        let job = SyntheticGenerator::with_seed(1).mixed(10, STANDARD_SHEET);
        let mut labels: Vec<_> = job.pieces.iter().filter_map(|p| p.label.clone()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 10);
    }
}
