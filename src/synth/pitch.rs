// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Changes of the pitch over the course of a note.

use super::Oscillation;

/// Pitch bends at the start and end of a note plus an optional vibrato.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchParams {
    /// Semitones in [-36, 36] the note starts off from its actual pitch.
    pub attack: f32,
    /// Seconds until the initial bend has faded out.
    pub attack_time: f32,
    /// Semitones in [-36, 36] the pitch has moved by at the end of the release.
    pub release: f32,
    /// Seconds over which the release bend builds up.
    pub release_time: f32,
    /// Vibrato, amplitude in semitones in [0, 36].
    pub oscillation: Oscillation,
}

/// A cycle of semitone offsets, e.g. for arpeggios and trills.
#[derive(Debug, Clone, PartialEq)]
pub struct OrnamentParams {
    /// Seconds for a complete run through all offsets.
    pub cycle_time: f32,
    pub semitone_offsets: Vec<f32>,
}

impl Default for OrnamentParams {
    fn default() -> Self {
        Self {
            cycle_time: 0.1,
            semitone_offsets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct EvalBend {
    attack: f32,
    attack_samples: usize,
    release: f32,
    release_samples: usize,
    oscillation: Oscillation,
    oscillation_samples: usize,
}

#[derive(Debug, Clone)]
struct EvalOrnament<'a> {
    offsets: &'a [f32],
    cycle_samples: usize,
}

/// Sample-exact evaluator for the pitch deviation of a note.
///
/// # Example
///
/// ```
/// use note_forge::synth::pitch::*;
///
/// let bend = PitchParams {
///     attack: 12.0,
///     attack_time: 1.0,
///     ..PitchParams::default()
/// };
/// let arpeggio = OrnamentParams {
///     cycle_time: 1.0,
///     semitone_offsets: vec![0.0, 4.0, 7.0, 12.0],
/// };
/// let eval = EvalPitch::new(Some(&bend), Some(&arpeggio), 4, 8);
/// // the bend fades out over the first four samples
/// assert_eq!(eval.semitones(0, false), 12.0);
/// assert_eq!(eval.semitones(2, false), 6.0);
/// // one ornament step per sample
/// assert_eq!(eval.semitones(5, true), 4.0);
/// assert_eq!(eval.semitones(7, true), 12.0);
/// ```
#[derive(Debug, Clone)]
pub struct EvalPitch<'a> {
    note_samples: usize,
    bend: Option<EvalBend>,
    ornament: Option<EvalOrnament<'a>>,
}

impl<'a> EvalPitch<'a> {
    /// Disabled parts are passed as `None` and contribute nothing.
    pub fn new(
        pitch: Option<&PitchParams>,
        ornament: Option<&'a OrnamentParams>,
        sampling_frequency: u32,
        note_samples: usize,
    ) -> Self {
        let rate = sampling_frequency as f32;
        Self {
            note_samples,
            bend: pitch.map(|pitch| EvalBend {
                attack: pitch.attack,
                attack_samples: ((pitch.attack_time * rate) as usize).max(1),
                release: pitch.release,
                release_samples: ((pitch.release_time * rate) as usize).max(1),
                oscillation: pitch.oscillation,
                oscillation_samples: (pitch.oscillation.wavelength * rate) as usize,
            }),
            ornament: ornament
                .map(|ornament| EvalOrnament {
                    offsets: &ornament.semitone_offsets,
                    cycle_samples: (ornament.cycle_time * rate) as usize,
                })
                .filter(|ornament| ornament.cycle_samples > 0 && !ornament.offsets.is_empty()),
        }
    }

    /// Deviation from the note's pitch in semitones at sample `i`.
    /// Ornaments only apply when `apply_ornament` is set.
    pub fn semitones(&self, i: usize, apply_ornament: bool) -> f32 {
        let mut semitones = 0.0;
        if let Some(bend) = &self.bend {
            semitones += if i < bend.attack_samples {
                bend.attack * (1.0 - i as f32 / bend.attack_samples as f32)
            } else if i > self.note_samples {
                bend.release * ((i - self.note_samples) as f32 / bend.release_samples as f32)
            } else {
                0.0
            };
            if bend.oscillation_samples > 0 {
                let phase = (i % bend.oscillation_samples) as f32 / bend.oscillation_samples as f32;
                semitones += bend
                    .oscillation
                    .kind
                    .modulation(phase, bend.oscillation.amplitude);
            }
        }
        if apply_ornament {
            if let Some(ornament) = &self.ornament {
                let count = ornament.offsets.len();
                let position = (i % ornament.cycle_samples) as f32 / ornament.cycle_samples as f32;
                let index = ((position * count as f32) as usize).min(count - 1);
                semitones += ornament.offsets[index];
            }
        }
        semitones
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::waveform::WaveformKind;

    #[test]
    fn disabled_is_silent() {
        let eval = EvalPitch::new(None, None, 44100, 100);
        assert!((0..200).all(|i| eval.semitones(i, true) == 0.0));
    }

    #[test]
    fn release_bend() {
        let params = PitchParams {
            release: -12.0,
            release_time: 1.0,
            ..PitchParams::default()
        };
        let eval = EvalPitch::new(Some(&params), None, 10, 20);
        // the attack bend is zero but spans the minimum of one sample
        assert_eq!(eval.semitones(0, false), 0.0);
        assert_eq!(eval.semitones(20, false), 0.0);
        assert_eq!(eval.semitones(25, false), -6.0);
        assert_eq!(eval.semitones(30, false), -12.0);
    }

    #[test]
    fn vibrato() {
        let params = PitchParams {
            oscillation: Oscillation {
                kind: WaveformKind::Square,
                amplitude: 0.5,
                wavelength: 1.0,
            },
            ..PitchParams::default()
        };
        let eval = EvalPitch::new(Some(&params), None, 4, 100);
        let semitones: Vec<f32> = (0..8).map(|i| eval.semitones(i, false)).collect();
        assert_eq!(semitones, vec![0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn ornament_requires_flag_and_offsets() {
        let ornament = OrnamentParams {
            cycle_time: 0.5,
            semitone_offsets: vec![3.0, 5.0],
        };
        let eval = EvalPitch::new(None, Some(&ornament), 8, 100);
        assert_eq!(eval.semitones(1, false), 0.0);
        assert_eq!(eval.semitones(1, true), 3.0);
        assert_eq!(eval.semitones(2, true), 5.0);
        assert_eq!(eval.semitones(4, true), 3.0);

        let empty = OrnamentParams::default();
        let eval = EvalPitch::new(None, Some(&empty), 8, 100);
        assert_eq!(eval.semitones(1, true), 0.0);
    }
}
