//! Check-in reward draws.

use rand::Rng;
use rand::rngs::ThreadRng;
use std::collections::VecDeque;
use std::ops::RangeInclusive;

/// Points awarded for a check-in are drawn uniformly from this closed range.
pub const CHECK_IN_POINTS: RangeInclusive<u32> = 10..=100;

/// Source of check-in reward amounts.
pub trait RewardSource {
    /// Draw one value uniformly from `range` (both ends inclusive).
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32;
}

/// Reward source backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngReward<R> {
    rng: R,
}

impl<R: Rng> RngReward<R> {
    /// Wrap an RNG.
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngReward<ThreadRng> {
    /// Reward source over the thread-local RNG.
    #[must_use]
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> RewardSource for RngReward<R> {
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.gen_range(range)
    }
}

/// Replays a fixed script of values, clamped into the requested range.
///
/// Once the script is exhausted the range's lower bound is returned.
#[derive(Debug, Clone, Default)]
pub struct ScriptedReward {
    values: VecDeque<u32>,
}

impl ScriptedReward {
    /// Script the given values in order.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = u32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl RewardSource for ScriptedReward {
    fn draw(&mut self, range: RangeInclusive<u32>) -> u32 {
        let (lo, hi) = (*range.start(), *range.end());
        self.values.pop_front().map_or(lo, |v| v.clamp(lo, hi))
    }
}
