// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use super::Oscillation;
use crate::instrument::ConfigError;
use crate::waveform::Phase;

/// How the volume falls off after the note was released.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReleaseDropOff {
    Linear,
    ShallowCurve,
    MediumCurve,
    SteepCurve,
}

impl ReleaseDropOff {
    /// The knee `k` of the hyperbolic fall off `k / (t + k)`, in samples.
    /// The smaller the knee, the faster the volume drops right after the release.
    /// Rates too low for a knee of at least one sample fall back to a linear release.
    fn knee(self, sampling_frequency: u32) -> Option<f32> {
        let divisor = match self {
            ReleaseDropOff::Linear => return None,
            ReleaseDropOff::ShallowCurve => 3,
            ReleaseDropOff::MediumCurve => 12,
            ReleaseDropOff::SteepCurve => 60,
        };
        match sampling_frequency / divisor {
            0 => None,
            knee => Some(knee as f32),
        }
    }
}

impl std::str::FromStr for ReleaseDropOff {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(ReleaseDropOff::Linear),
            "shallow" => Ok(ReleaseDropOff::ShallowCurve),
            "medium" => Ok(ReleaseDropOff::MediumCurve),
            "steep" => Ok(ReleaseDropOff::SteepCurve),
            _ => Err(ConfigError::UnknownDropOff { name: s.to_owned() }),
        }
    }
}

/// An Attack-Decay-Sustain-Release envelope for a note of known length.
/// The amplitude first rises from zero to one over `attack` seconds,
/// then decays over an additional `decay` seconds to the `sustain` level where it is held
/// until the note ends. After that the volume falls back to zero over the next `release`
/// seconds, either linearly or along one of the curved drop offs.
///
/// # Example
///
/// ```
/// use note_forge::synth::envelope::*;
/// let e = EnvelopeParams {
///     attack: 0.25,
///     decay: 0.5,
///     sustain: 0.75,
///     release: 1.0,
///     release_drop_off: ReleaseDropOff::Linear,
///     ..EnvelopeParams::default()
/// };
/// let eval = e.instantiate(4, 8); // 4 samples per second, note held for 8 samples
/// let gains: Vec<f32> = (0..13).map(|i| eval.gain(i)).collect();
/// assert_eq!(
///     gains,
///     vec![0.0, 1.0, 0.875, 0.75, 0.75, 0.75, 0.75, 0.75, 0.75, 0.5625, 0.375, 0.1875, 0.0]
/// );
/// assert_eq!(eval.release_samples(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeParams {
    /// Time in seconds to go from 0.0 to 1.0
    pub attack: f32,
    /// Time in seconds to go from 1.0 to `sustain`.
    pub decay: f32,
    /// Constant amplitude while the note is held.
    pub sustain: f32,
    /// Time in seconds to go from `sustain` to 0.0 after the note ended.
    pub release: f32,
    pub release_drop_off: ReleaseDropOff,
    /// Secondary oscillation of the volume (tremolo), amplitude in [0, 1].
    pub oscillation: Oscillation,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.05,
            decay: 0.0,
            sustain: 1.0,
            release: 0.1,
            release_drop_off: ReleaseDropOff::MediumCurve,
            oscillation: Oscillation::default(),
        }
    }
}

impl EnvelopeParams {
    pub fn instantiate(&self, sampling_frequency: u32, note_samples: usize) -> EvalEnvelope {
        let rate = sampling_frequency as f32;
        EvalEnvelope {
            attack_samples: (self.attack * rate) as usize,
            decay_samples: (self.decay * rate) as usize,
            note_samples,
            release_samples: (self.release * rate) as usize,
            sustain_level: self.sustain,
            knee: self.release_drop_off.knee(sampling_frequency),
        }
    }
}

/// Sample-exact evaluator for an envelope.
#[derive(Debug, Clone)]
pub struct EvalEnvelope {
    attack_samples: usize,
    decay_samples: usize,
    note_samples: usize,
    release_samples: usize,
    sustain_level: f32,
    knee: Option<f32>,
}

impl EvalEnvelope {
    /// The envelope of an instrument without volume shaping: full volume
    /// for the whole note and no release tail.
    pub fn neutral(note_samples: usize) -> Self {
        Self {
            attack_samples: 0,
            decay_samples: 0,
            note_samples,
            release_samples: 0,
            sustain_level: 1.0,
            knee: None,
        }
    }

    pub fn release_samples(&self) -> usize {
        self.release_samples
    }

    /// The envelope gain at sample `i` since the start of the note.
    pub fn gain(&self, i: usize) -> f32 {
        let decay_end = self.attack_samples + self.decay_samples;
        if i < self.attack_samples {
            // Rise from 0.0 to 1.0
            i as f32 / self.attack_samples as f32
        } else if i < decay_end {
            // Drop from 1.0 to `sustain_level`
            let progress = (i - self.attack_samples) as f32 / self.decay_samples as f32;
            1.0 - progress * (1.0 - self.sustain_level)
        } else if i < self.note_samples {
            self.sustain_level
        } else if i < self.note_samples + self.release_samples {
            let elapsed = (i - self.note_samples) as f32;
            let progress = elapsed / self.release_samples as f32;
            match self.knee {
                None => self.sustain_level - progress * self.sustain_level,
                Some(knee) => (knee / (elapsed + knee)) * self.sustain_level * (1.0 - progress),
            }
        } else {
            0.0
        }
    }
}

/// Running state of the secondary volume oscillation.
///
/// The position is shared by the whole note and keeps advancing across
/// envelope stages.
#[derive(Debug, Clone)]
pub struct EvalTremolo {
    oscillation: Option<Oscillation>,
    position: Phase,
    step: f32,
}

impl EvalTremolo {
    /// Oscillations with a negligible amplitude or wavelength are inactive.
    pub fn new(oscillation: Option<&Oscillation>, sampling_frequency: u32) -> Self {
        match oscillation.filter(|o| o.is_audible()) {
            Some(oscillation) => Self {
                oscillation: Some(*oscillation),
                position: Phase::ZERO,
                step: 1.0 / (oscillation.wavelength * sampling_frequency as f32),
            },
            None => Self {
                oscillation: None,
                position: Phase::ZERO,
                step: 0.0,
            },
        }
    }

    /// Volume multiplier for the current sample, then advance by one sample.
    pub fn step(&mut self) -> f32 {
        match &self.oscillation {
            None => 1.0,
            Some(oscillation) => {
                let multiplier = 1.0
                    + oscillation
                        .kind
                        .modulation(self.position.offset(), oscillation.amplitude);
                // short wavelengths advance by more than a whole cycle per sample
                self.position = self.position.step(self.step);
                multiplier
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::waveform::WaveformKind;

    #[test]
    fn instant_envelope_is_flat() {
        let params = EnvelopeParams {
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release: 0.0,
            ..EnvelopeParams::default()
        };
        let eval = params.instantiate(44100, 441);
        assert!((0..441).all(|i| eval.gain(i) == 1.0));
        assert_eq!(eval.release_samples(), 0);
    }

    #[test]
    fn neutral() {
        let eval = EvalEnvelope::neutral(100);
        assert!((0..100).all(|i| eval.gain(i) == 1.0));
        assert_eq!(eval.release_samples(), 0);
    }

    #[test]
    fn curves_drop_faster_than_linear() {
        let release_gain = |drop_off| {
            let params = EnvelopeParams {
                attack: 0.0,
                sustain: 0.5,
                release: 1.0,
                release_drop_off: drop_off,
                ..EnvelopeParams::default()
            };
            params.instantiate(600, 600).gain(900)
        };
        let linear = release_gain(ReleaseDropOff::Linear);
        let shallow = release_gain(ReleaseDropOff::ShallowCurve);
        let medium = release_gain(ReleaseDropOff::MediumCurve);
        let steep = release_gain(ReleaseDropOff::SteepCurve);
        assert_eq!(linear, 0.25);
        assert!(linear > shallow && shallow > medium && medium > steep);
        assert!(steep > 0.0);
    }

    #[test]
    fn curve_formula() {
        let params = EnvelopeParams {
            attack: 0.0,
            sustain: 1.0,
            release: 1.0,
            release_drop_off: ReleaseDropOff::MediumCurve,
            ..EnvelopeParams::default()
        };
        // knee is 1200 / 12 = 100 samples
        let eval = params.instantiate(1200, 0);
        assert_eq!(eval.gain(0), 1.0);
        assert_eq!(eval.gain(100), 0.5 * (1.0 - 100.0 / 1200.0));
    }

    #[test]
    fn attack_longer_than_note_keeps_rising() {
        let params = EnvelopeParams {
            attack: 1.0,
            release: 1.0,
            ..EnvelopeParams::default()
        };
        let eval = params.instantiate(10, 5);
        assert_eq!(eval.gain(5), 0.5);
        assert_eq!(eval.gain(8), 0.8);
    }

    #[test]
    fn tremolo() {
        let oscillation = Oscillation {
            kind: WaveformKind::Square,
            amplitude: 0.5,
            wavelength: 1.0,
        };
        let mut tremolo = EvalTremolo::new(Some(&oscillation), 4);
        let multipliers: Vec<f32> = (0..6).map(|_| tremolo.step()).collect();
        assert_eq!(multipliers, vec![1.5, 1.5, 0.5, 0.5, 1.5, 1.5]);

        let silent = Oscillation {
            amplitude: 0.0,
            ..oscillation
        };
        let mut tremolo = EvalTremolo::new(Some(&silent), 4);
        assert!((0..10).all(|_| tremolo.step() == 1.0));
        let mut tremolo = EvalTremolo::new(None, 4);
        assert_eq!(tremolo.step(), 1.0);
    }

    #[test]
    fn tremolo_faster_than_sampling_rate() {
        for kind in WaveformKind::ALL.iter() {
            // two and a half cycles per sample
            let oscillation = Oscillation {
                kind: *kind,
                amplitude: 1.0,
                wavelength: 0.0004,
            };
            let mut tremolo = EvalTremolo::new(Some(&oscillation), 1000);
            for _ in 0..1000 {
                let multiplier = tremolo.step();
                assert!(
                    (-1e-5..=2.0 + 1e-5).contains(&multiplier),
                    "{} tremolo reached {}",
                    kind,
                    multiplier
                );
            }
        }
    }

    #[test]
    fn curves_at_low_rates_are_linear() {
        for drop_off in [
            ReleaseDropOff::ShallowCurve,
            ReleaseDropOff::MediumCurve,
            ReleaseDropOff::SteepCurve,
        ]
        .iter()
        {
            let params = EnvelopeParams {
                attack: 0.0,
                sustain: 1.0,
                release: 1.0,
                release_drop_off: *drop_off,
                ..EnvelopeParams::default()
            };
            // 2 Hz is below every knee divisor
            let eval = params.instantiate(2, 2);
            assert_eq!(eval.gain(2), 1.0);
            assert_eq!(eval.gain(3), 0.5);
            assert_eq!(eval.gain(4), 0.0);
        }

        let steep = EnvelopeParams {
            attack: 0.0,
            release: 1.0,
            release_drop_off: ReleaseDropOff::SteepCurve,
            ..EnvelopeParams::default()
        }
        .instantiate(50, 50);
        assert!((0..120).all(|i| steep.gain(i).is_finite()));
        assert_eq!(steep.gain(50), 1.0);
    }

    #[test]
    fn parse_drop_off() {
        assert_eq!("Steep".parse(), Ok(ReleaseDropOff::SteepCurve));
        assert_eq!("linear".parse(), Ok(ReleaseDropOff::Linear));
        assert_eq!(
            "cliff".parse::<ReleaseDropOff>(),
            Err(ConfigError::UnknownDropOff {
                name: "cliff".to_owned()
            })
        );
    }
}
