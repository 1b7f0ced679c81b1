/*
random.rs

Copyright 2025 Skiddie contributors

This file is part of Skiddie.

Skiddie is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Skiddie is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Skiddie. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Seedable source of randomness shared by all the generators.
//!
//! A [`RandomSource`] is created once per play session and passed by mutable reference to the
//! generator. Two sources created with the same seed produce the same sequence of values, which
//! makes every generator reproducible in tests.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

/// Pseudorandom generator with the operations used by the puzzle generators.
///
/// This is not a cryptographically secure generator.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,

    /// Seed the generator was created with.
    seed: u64,
}

impl RandomSource {
    /// Create a [`RandomSource`] object from the given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a [`RandomSource`] object with a random seed.
    ///
    /// The seed is logged and available through [`RandomSource::seed`], so that the session can
    /// be replayed.
    pub fn from_entropy() -> Self {
        let seed: u64 = rand::rng().random();
        debug!("Random source seed = {seed}");
        Self::seeded(seed)
    }

    /// Return the seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return a uniform integer between `low` and `high`, both inclusive.
    ///
    /// When `high` is lower than `low`, `low` is returned.
    pub fn next_int(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..=high)
    }

    /// Return a uniform index in `0..len`. `len` must not be zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    /// Return `true` with the given probability.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }

    /// Return a random item of the slice, or [`None`] if the slice is empty.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Shuffle the slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Return `amount` items of the slice, picked without replacement and in random order.
    ///
    /// If the slice is shorter than `amount`, all the items are returned.
    pub fn sample<T: Clone>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        let mut copy: Vec<T> = items.to_vec();
        copy.shuffle(&mut self.rng);
        copy.truncate(amount);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomSource::seeded(42);
        let mut b = RandomSource::seeded(42);

        for _ in 0..100 {
            assert_eq!(a.next_int(-50, 50), b.next_int(-50, 50));
        }
        let mut v1: Vec<u32> = (0..20).collect();
        let mut v2: Vec<u32> = (0..20).collect();
        a.shuffle(&mut v1);
        b.shuffle(&mut v2);
        assert_eq!(v1, v2);
    }

    #[test]
    fn next_int_is_inclusive() {
        let mut rng = RandomSource::seeded(7);
        let mut seen_low = false;
        let mut seen_high = false;

        for _ in 0..500 {
            let n = rng.next_int(1, 3);
            assert!((1..=3).contains(&n));
            seen_low |= n == 1;
            seen_high |= n == 3;
        }
        assert!(seen_low && seen_high);
        assert_eq!(rng.next_int(5, 2), 5);
    }

    #[test]
    fn sample_without_replacement() {
        let mut rng = RandomSource::seeded(3);
        let mut s = rng.sample(&[1, 2, 3, 4, 5, 6], 4);

        assert_eq!(s.len(), 4);
        s.sort_unstable();
        s.dedup();
        assert_eq!(s.len(), 4);
        assert_eq!(rng.sample(&[1, 2], 5).len(), 2);
        assert!(rng.choice::<u8>(&[]).is_none());
    }
}
