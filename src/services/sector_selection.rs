use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{ProbabilityOverride, Sector};
use crate::utils::RandomSource;

/// Rewrites sector weights for a game that carries a probability override.
pub trait OverridePolicy: Send + Sync {
    /// `weights` are non-empty with a positive total; the override is already
    /// range-checked against them.
    fn effective_weights(&self, weights: &[f64], ovr: &ProbabilityOverride) -> Vec<f64>;
}

/// Target sector gets `p * W`; the other sectors share `(1 - p) * W` in
/// proportion to their configured weights. `W` is the configured total.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalRedistribution;

impl OverridePolicy for ProportionalRedistribution {
    fn effective_weights(&self, weights: &[f64], ovr: &ProbabilityOverride) -> Vec<f64> {
        let total: f64 = weights.iter().sum();
        let target = ovr.sector_index;
        let others: f64 = weights
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target)
            .map(|(_, w)| w)
            .sum();

        if others <= 0.0 {
            return weights
                .iter()
                .enumerate()
                .map(|(i, _)| if i == target { total } else { 0.0 })
                .collect();
        }

        let rest = (1.0 - ovr.probability) * total;
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| {
                if i == target {
                    ovr.probability * total
                } else {
                    rest * w / others
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    pub index: usize,
    pub sector: &'a Sector,
}

#[derive(Clone)]
pub struct SectorSelectionEngine {
    random: Arc<dyn RandomSource>,
    policy: Arc<dyn OverridePolicy>,
}

impl SectorSelectionEngine {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self::with_policy(random, Arc::new(ProportionalRedistribution))
    }

    pub fn with_policy(random: Arc<dyn RandomSource>, policy: Arc<dyn OverridePolicy>) -> Self {
        Self { random, policy }
    }

    pub fn select<'a>(
        &self,
        sectors: &'a [Sector],
        ovr: Option<&ProbabilityOverride>,
    ) -> AppResult<Selection<'a>> {
        if sectors.is_empty() {
            return Err(AppError::EmptySectorSet);
        }
        let weights: Vec<f64> = sectors.iter().map(|s| s.weight).collect();
        let total: f64 = weights.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(AppError::NonPositiveTotalWeight);
        }

        let weights = match ovr {
            Some(ovr) => {
                if ovr.sector_index >= sectors.len() {
                    return Err(AppError::ValidationError(format!(
                        "Sector index {} is out of range, wheel has {} sectors",
                        ovr.sector_index,
                        sectors.len()
                    )));
                }
                if !(0.0..=1.0).contains(&ovr.probability) {
                    return Err(AppError::ValidationError(
                        "Probability must be >= 0 and <= 1".to_string(),
                    ));
                }
                self.policy.effective_weights(&weights, ovr)
            }
            None => weights,
        };

        let index = pick_index(&weights, self.random.next_f64())
            .ok_or(AppError::NonPositiveTotalWeight)?;
        Ok(Selection {
            index,
            sector: &sectors[index],
        })
    }
}

/// Half-open cumulative lookup of `u * total`. Zero-weight entries own an
/// empty interval and are never returned.
fn pick_index(weights: &[f64], u: f64) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    let draw = u * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        if draw < cumulative {
            return Some(i);
        }
    }
    // rounding pushed the draw past the last boundary
    weights.iter().rposition(|&w| w > 0.0)
}
