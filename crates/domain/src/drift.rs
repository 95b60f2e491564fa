//! Randomized drift — the per-tick chance that a device changes one of its
//! own fields to a new, different, in-domain value.
//!
//! Resampling never loops: the candidate set is the domain minus the
//! current value, and one candidate is drawn uniformly from it.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::bounds::Bounds;
use crate::time::Timestamp;

/// Probability that a drift event fires on a given tick.
pub const DRIFT_CHANCE: f64 = 0.01;

/// How often drift fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drift {
    chance: f64,
}

impl Default for Drift {
    fn default() -> Self {
        Self {
            chance: DRIFT_CHANCE,
        }
    }
}

impl Drift {
    /// Drift firing with the given probability, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_chance(chance: f64) -> Self {
        let chance = if chance.is_nan() {
            0.0
        } else {
            chance.clamp(0.0, 1.0)
        };
        Self { chance }
    }

    #[must_use]
    pub fn chance(&self) -> f64 {
        self.chance
    }
}

/// Everything a device needs to advance one tick.
pub struct TickContext<'a, R: Rng> {
    rng: &'a mut R,
    drift: Drift,
    now: Timestamp,
}

impl<'a, R: Rng> TickContext<'a, R> {
    pub fn new(rng: &'a mut R, drift: Drift, now: Timestamp) -> Self {
        Self { rng, drift, now }
    }

    /// Wall-clock time of this tick.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Roll the dice for a drift event.
    pub fn drift_fires(&mut self) -> bool {
        self.rng.gen_bool(self.drift.chance)
    }

    /// Pick one of the eligible fields uniformly. `fields` is never empty
    /// for a device since `status` is always eligible.
    pub fn choose_field(&mut self, fields: &[&'static str]) -> &'static str {
        fields.choose(&mut *self.rng).copied().unwrap_or("status")
    }

    /// A value of `domain` different from `current`.
    pub fn other_choice<T: Copy + PartialEq>(&mut self, domain: &[T], current: T) -> T {
        complement(domain, current)
            .choose(&mut *self.rng)
            .copied()
            .unwrap_or(current)
    }

    /// An integer of `bounds` different from `current`.
    pub fn other_in(&mut self, bounds: Bounds, current: i64) -> i64 {
        other_in_range(&mut *self.rng, bounds.min, bounds.max, current)
    }
}

/// Every value of `domain` except `current`.
#[must_use]
pub fn complement<T: Copy + PartialEq>(domain: &[T], current: T) -> Vec<T> {
    domain.iter().copied().filter(|v| *v != current).collect()
}

/// Draw uniformly from `[min, max] \ {current}`.
///
/// Draws from a range one smaller than the domain and shifts picks at or
/// above `current` up by one. When `current` lies outside the domain the
/// full domain is used; a single-valued domain returns its only value.
pub fn other_in_range<R: Rng>(rng: &mut R, min: i64, max: i64, current: i64) -> i64 {
    if min >= max {
        return min;
    }
    if !(min..=max).contains(&current) {
        return rng.gen_range(min..=max);
    }
    let pick = rng.gen_range(min..max);
    if pick >= current { pick + 1 } else { pick }
}
