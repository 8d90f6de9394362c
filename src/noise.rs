// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Seedable source of the random values used for roughening waveforms.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform noise in the range [-2, 2].
///
/// The sequence of values only depends on the seed and on how many values were
/// drawn before, so two sources with the same seed render identical notes.
///
/// ```
/// use note_forge::noise::NoiseSource;
///
/// let mut a = NoiseSource::seeded(42);
/// let mut b = NoiseSource::seeded(42);
/// assert_eq!(a.draw(), b.draw());
/// assert_eq!(a.draws(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: Pcg32,
    draws: u64,
}

impl NoiseSource {
    pub const MIN: f32 = -2.0;
    pub const MAX: f32 = 2.0;

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Draw the next value.
    pub fn draw(&mut self) -> f32 {
        self.draws += 1;
        self.rng.random_range(Self::MIN..=Self::MAX)
    }

    /// Number of values drawn since the source was seeded.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}
