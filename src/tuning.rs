// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

/// Defines the tuning of an instrument by assigning a frequency to a certain note index.
/// This defines the frequencies of all other notes at a standard tuning of 12 half-tones per octave.
///
/// # Examples
///
/// ```
/// use note_forge::tuning::*;
/// assert_eq!(Tuning::default().frequency(57.0), 440.0);
/// assert_eq!(Tuning::default().frequency(69.0), 880.0);
/// assert_eq!(Tuning::default().frequency(45.0), 220.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub reference_note: i32,
    pub reference_frequency: f32,
}

impl Tuning {
    /// Frequency multiplier for a distance in (possibly fractional) semitones.
    pub fn multiplier(semitones: f32) -> f32 {
        2.0f32.powf(semitones / 12.0)
    }

    /// Return the frequency of a (possibly detuned) note index relative to this tuning.
    pub fn frequency(&self, note: f32) -> f32 {
        self.reference_frequency * Self::multiplier(note - self.reference_note as f32)
    }

    /// How far the phase of a waveform advances per sample, in cycles, for a note
    /// that is `semitones` away from the reference note.
    ///
    /// ```
    /// # use note_forge::tuning::*;
    /// // the reference note completes one cycle every 20 samples at 8800 Hz
    /// assert_eq!(Tuning::default().phase_increment(0.0, 8800), 0.05);
    /// ```
    pub fn phase_increment(&self, semitones: f32, sampling_frequency: u32) -> f32 {
        Self::multiplier(semitones) / (sampling_frequency as f32 / self.reference_frequency)
    }
}

/// Default concert tuning, where note index 57 (A4) corresponds to 440 Hz.
impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            reference_note: 57,
            reference_frequency: 440.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn octaves() {
        let tuning = Tuning::default();
        for octave in -4..5 {
            let expected = 440.0 * 2.0f32.powi(octave);
            let actual = tuning.frequency(57.0 + 12.0 * octave as f32);
            assert!((actual - expected).abs() / expected < 1e-6);
        }
    }

    #[test]
    fn increment_matches_frequency() {
        let tuning = Tuning::default();
        let increment = tuning.phase_increment(-57.0, 44100);
        let expected = tuning.frequency(0.0) / 44100.0;
        assert!((increment - expected).abs() < 1e-9);
    }
}
