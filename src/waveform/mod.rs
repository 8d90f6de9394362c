// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Primitive wave shapes and their noise blending.

pub mod mixer;

pub use mixer::{WaveformMixer, WeightedWaveform};

use std::convert::TryFrom;
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::instrument::ConfigError;
use crate::noise::NoiseSource;

/// Noise amounts at or below this threshold are treated as a clean waveform by the synthesizer.
pub const NOISE_THRESHOLD: f32 = 0.0001;

/// Position within one cycle of a waveform, always in [0, 1).
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Phase(f32);

impl Phase {
    pub const ZERO: Phase = Phase(0.0);

    /// Wrap an arbitrary offset into a single cycle.
    ///
    /// ```
    /// # use note_forge::waveform::Phase;
    /// assert_eq!(Phase::new(1.25).offset(), 0.25);
    /// assert_eq!(Phase::new(-0.25).offset(), 0.75);
    /// ```
    pub fn new(offset: f32) -> Phase {
        let wrapped = offset.rem_euclid(1.0);
        // rem_euclid may round up to exactly 1.0 for tiny negative inputs
        if wrapped >= 1.0 {
            Phase(0.0)
        } else {
            Phase(wrapped)
        }
    }

    pub fn offset(self) -> f32 {
        self.0
    }

    /// Advance by `amount` cycles.
    pub fn step(self, amount: f32) -> Phase {
        Phase::new(self.0 + amount)
    }
}

/// The closed set of shapes an instrument can be built from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WaveformKind {
    Sine,
    Square,
    Sawtooth,
    Triangle,
    SineCubed,
    TriangleCubed,
    SemiCircle,
}

impl WaveformKind {
    pub const ALL: [WaveformKind; 7] = [
        WaveformKind::Sine,
        WaveformKind::Square,
        WaveformKind::Sawtooth,
        WaveformKind::Triangle,
        WaveformKind::SineCubed,
        WaveformKind::TriangleCubed,
        WaveformKind::SemiCircle,
    ];

    /// Amplitude of the shape at a phase in [0, 1).
    ///
    /// The cubed and semi-circle shapes are not clamped and may exceed the unit
    /// range by a rounding error.
    ///
    /// ```
    /// # use note_forge::waveform::WaveformKind;
    /// assert_eq!(WaveformKind::Square.amplitude(0.1), 1.0);
    /// assert_eq!(WaveformKind::Square.amplitude(0.6), -1.0);
    /// assert_eq!(WaveformKind::Sawtooth.amplitude(0.25), 0.5);
    /// ```
    pub fn amplitude(self, phase: f32) -> f32 {
        match self {
            WaveformKind::Sine => (phase * PI * 2.0).sin(),
            WaveformKind::Square => (phase * PI * 2.0).sin().signum(),
            WaveformKind::Sawtooth => 2.0 * (phase - (phase + 0.5).floor()),
            WaveformKind::Triangle => triangle(phase),
            WaveformKind::SineCubed => (phase * PI * 2.0).sin().powi(3),
            WaveformKind::TriangleCubed => triangle(phase).powi(3),
            WaveformKind::SemiCircle => semi_circle(phase, 1.0),
        }
    }

    /// A zero-centered version of the shape scaled by `depth`, used for
    /// modulating volume and pitch over time.
    ///
    /// ```
    /// # use note_forge::waveform::WaveformKind;
    /// assert_eq!(WaveformKind::Square.modulation(0.25, 0.5), 0.5);
    /// assert_eq!(WaveformKind::Sawtooth.modulation(0.0, 0.5), -0.5);
    /// assert_eq!(WaveformKind::Triangle.modulation(0.5, 2.0), -2.0);
    /// ```
    pub fn modulation(self, phase: f32, depth: f32) -> f32 {
        match self {
            WaveformKind::Sine => (phase * PI * 2.0).sin() * depth,
            WaveformKind::Square => {
                if phase < 0.5 {
                    depth
                } else {
                    -depth
                }
            }
            WaveformKind::Sawtooth => (phase - 0.5) * depth * 2.0,
            WaveformKind::Triangle => ((0.5 - phase).abs() - 0.25) * depth * 4.0,
            WaveformKind::SineCubed => (phase * PI * 2.0).sin().powi(3) * depth,
            WaveformKind::TriangleCubed => ((0.5 - phase).abs() - 0.25).powi(3) * depth * 64.0,
            WaveformKind::SemiCircle => semi_circle(phase, depth * depth),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WaveformKind::Sine => "sine",
            WaveformKind::Square => "square",
            WaveformKind::Sawtooth => "sawtooth",
            WaveformKind::Triangle => "triangle",
            WaveformKind::SineCubed => "sine-cubed",
            WaveformKind::TriangleCubed => "triangle-cubed",
            WaveformKind::SemiCircle => "semi-circle",
        }
    }
}

fn triangle(phase: f32) -> f32 {
    (0.5 - phase).abs() * 4.0 - 1.0
}

/// Two half circles of opposite sign, squared radius `scale`.
fn semi_circle(phase: f32, scale: f32) -> f32 {
    // rounding close to the half cycle can push the sine slightly below zero
    let sine = ((phase % 0.5) * PI * 2.0).sin().max(0.0) * scale;
    if phase < 0.5 {
        sine.sqrt()
    } else {
        -sine.sqrt()
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveformKind {
    type Err = ConfigError;

    /// ```
    /// # use note_forge::waveform::WaveformKind;
    /// assert_eq!("Triangle".parse::<WaveformKind>(), Ok(WaveformKind::Triangle));
    /// assert_eq!("semi_circle".parse::<WaveformKind>(), Ok(WaveformKind::SemiCircle));
    /// assert!("noise".parse::<WaveformKind>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "sine" | "sin" => Ok(WaveformKind::Sine),
            "square" | "pulse" => Ok(WaveformKind::Square),
            "sawtooth" | "saw" => Ok(WaveformKind::Sawtooth),
            "triangle" | "tri" => Ok(WaveformKind::Triangle),
            "sinecubed" => Ok(WaveformKind::SineCubed),
            "trianglecubed" => Ok(WaveformKind::TriangleCubed),
            "semicircle" => Ok(WaveformKind::SemiCircle),
            _ => Err(ConfigError::UnknownWaveform { name: s.to_owned() }),
        }
    }
}

impl TryFrom<u8> for WaveformKind {
    type Error = ConfigError;

    /// Decode the index used by [`WaveformKind::ALL`].
    fn try_from(index: u8) -> Result<Self, Self::Error> {
        WaveformKind::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| ConfigError::UnknownWaveform {
                name: index.to_string(),
            })
    }
}

/// A waveform shape together with its starting phase and noise roughening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformSpec {
    pub kind: WaveformKind,
    /// Phase offset in [0, 1) added before evaluating the shape.
    pub phase_offset: f32,
    /// Blend factor in [0, 1] towards uniform noise.
    pub noise: f32,
}

impl WaveformSpec {
    pub fn new(kind: WaveformKind) -> Self {
        Self {
            kind,
            phase_offset: 0.0,
            noise: 0.0,
        }
    }

    pub fn with_offset(self, phase_offset: f32) -> Self {
        Self {
            phase_offset,
            ..self
        }
    }

    pub fn with_noise(self, noise: f32) -> Self {
        Self { noise, ..self }
    }

    /// Clean amplitude at `phase`, after applying the phase offset.
    ///
    /// ```
    /// # use note_forge::waveform::*;
    /// let shifted = WaveformSpec::new(WaveformKind::Sawtooth).with_offset(0.5);
    /// assert_eq!(shifted.amplitude(0.75), 0.5);
    /// ```
    pub fn amplitude(&self, phase: f32) -> f32 {
        self.kind
            .amplitude(Phase::new(phase + self.phase_offset).offset())
    }

    /// Amplitude at `phase` blended towards a random value by the noise amount.
    /// Always draws exactly one value from `noise`.
    pub fn amplitude_with_noise(&self, phase: f32, noise: &mut NoiseSource) -> f32 {
        blend_noise(self.amplitude(phase), self.noise, noise)
    }

    /// Whether the noise amount is large enough to be audible.
    pub fn is_noisy(&self) -> bool {
        self.noise > NOISE_THRESHOLD
    }
}

impl Default for WaveformSpec {
    fn default() -> Self {
        WaveformSpec::new(WaveformKind::Square)
    }
}

/// Interpolate from `clean` towards a noise draw by `amount`, clamped to [-1, 1].
pub fn blend_noise(clean: f32, amount: f32, noise: &mut NoiseSource) -> f32 {
    let random = noise.draw();
    let amount = amount.max(0.0).min(1.0);
    (clean + (random - clean) * amount).max(-1.0).min(1.0)
}

#[cfg(test)]
mod test {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn bounded() {
        for kind in WaveformKind::ALL.iter() {
            for step in 0..1000 {
                let phase = step as f32 / 1000.0;
                let amplitude = kind.amplitude(phase);
                assert!(
                    amplitude.abs() <= 1.0 + EPSILON,
                    "{} at {} is {}",
                    kind,
                    phase,
                    amplitude
                );
                assert!(!amplitude.is_nan());
            }
        }
    }

    #[test]
    fn canonical_points() {
        assert!(WaveformKind::Sine.amplitude(0.0).abs() < EPSILON);
        assert!((WaveformKind::Sine.amplitude(0.25) - 1.0).abs() < EPSILON);
        assert_eq!(WaveformKind::Square.amplitude(0.1), 1.0);
        assert_eq!(WaveformKind::Square.amplitude(0.6), -1.0);
        assert_eq!(WaveformKind::Triangle.amplitude(0.0), 1.0);
        assert_eq!(WaveformKind::Triangle.amplitude(0.25), 0.0);
        assert_eq!(WaveformKind::Triangle.amplitude(0.5), -1.0);
        assert_eq!(WaveformKind::TriangleCubed.amplitude(0.0), 1.0);
        assert_eq!(WaveformKind::Sawtooth.amplitude(0.0), 0.0);
        assert_eq!(WaveformKind::Sawtooth.amplitude(0.75), -0.5);
        assert!((WaveformKind::SemiCircle.amplitude(0.25) - 1.0).abs() < EPSILON);
        assert!((WaveformKind::SemiCircle.amplitude(0.75) + 1.0).abs() < EPSILON);
        assert!((WaveformKind::SineCubed.amplitude(0.75) + 1.0).abs() < EPSILON);
    }

    #[test]
    fn offset_wraps() {
        let spec = WaveformSpec::new(WaveformKind::Square).with_offset(0.5);
        assert_eq!(spec.amplitude(0.1), -1.0);
        assert_eq!(spec.amplitude(0.6), 1.0);
    }

    #[test]
    fn modulation_is_centered() {
        assert!(WaveformKind::Sine.modulation(0.0, 3.0).abs() < EPSILON);
        assert!((WaveformKind::Sine.modulation(0.25, 3.0) - 3.0).abs() < EPSILON);
        assert_eq!(WaveformKind::Triangle.modulation(0.5, 1.0), -1.0);
        assert_eq!(WaveformKind::Triangle.modulation(0.25, 1.0), 0.0);
        assert_eq!(WaveformKind::TriangleCubed.modulation(0.0, 1.0), 1.0);
        assert!((WaveformKind::SemiCircle.modulation(0.25, 0.5) - 0.5).abs() < EPSILON);
        for kind in WaveformKind::ALL.iter() {
            assert_eq!(kind.modulation(0.3, 0.0).abs(), 0.0);
        }
    }

    #[test]
    fn noise_blending() {
        let mut noise = NoiseSource::seeded(3);
        let clean = WaveformSpec::new(WaveformKind::Sine);
        // a clean waveform still consumes a draw, but is not altered
        assert_eq!(clean.amplitude_with_noise(0.25, &mut noise), clean.amplitude(0.25));
        assert_eq!(noise.draws(), 1);

        let full = WaveformSpec::new(WaveformKind::Sine).with_noise(1.0);
        for step in 0..100 {
            let value = full.amplitude_with_noise(step as f32 / 100.0, &mut noise);
            assert!((-1.0..=1.0).contains(&value));
        }
        assert_eq!(noise.draws(), 101);
        assert!(full.is_noisy());
        assert!(!clean.is_noisy());
    }

    #[test]
    fn parse_index() {
        assert_eq!(WaveformKind::try_from(1), Ok(WaveformKind::Square));
        assert_eq!(
            WaveformKind::try_from(7),
            Err(ConfigError::UnknownWaveform {
                name: "7".to_owned()
            })
        );
        for kind in WaveformKind::ALL.iter() {
            assert_eq!(kind.name().parse::<WaveformKind>(), Ok(*kind));
        }
    }
}
