// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The parameters making up an instrument, and the instrument owning its note cache.

use std::sync::Arc;

use snafu::Snafu;

use crate::cache::NoteWaveCache;
use crate::noise::NoiseSource;
use crate::synth::effects::{ChorusParams, EchoParams};
use crate::synth::envelope::EnvelopeParams;
use crate::synth::pitch::{OrnamentParams, PitchParams};
use crate::synth::{NoteRequest, NoteSynthesizer, Oscillation};
use crate::wave::NoteWave;
use crate::waveform::{WaveformMixer, WaveformSpec, WeightedWaveform};

/// Largest pitch deviation in either direction, in semitones.
pub const MAX_SEMITONES: f32 = 36.0;

/// Parameters that cannot be synthesized.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum ConfigError {
    #[snafu(display("Unknown waveform {:?}", name))]
    UnknownWaveform { name: String },
    #[snafu(display("Unknown release drop off {:?}", name))]
    UnknownDropOff { name: String },
    #[snafu(display("The sampling frequency must not be zero"))]
    ZeroSamplingFrequency,
    #[snafu(display("Invalid note length {}", length))]
    InvalidLength { length: f32 },
    #[snafu(display("Note {} is outside of [{}, {}]", note, min, max))]
    NoteOutOfRange { note: i32, min: i32, max: i32 },
    #[snafu(display("The {} must not be negative, got {}", parameter, value))]
    NegativeTime { parameter: &'static str, value: f32 },
    #[snafu(display("The {} must be in [{}, {}], got {}", parameter, min, max, value))]
    OutOfRange {
        parameter: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[snafu(display("An enabled ornament needs at least one semitone offset"))]
    EmptyOrnament,
    #[snafu(display("The ornament cycle must be longer than zero, got {}", value))]
    NonPositiveOrnamentCycle { value: f32 },
    #[snafu(display("The echo delay must be longer than zero, got {}", value))]
    NonPositiveEchoDelay { value: f32 },
    #[snafu(display("Waveform weights must not be negative, got {}", value))]
    NegativeWeight { value: f32 },
}

fn check_range(parameter: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    // NaN is never contained in a range
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            parameter,
            value,
            min,
            max,
        })
    }
}

fn check_time(parameter: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NegativeTime { parameter, value })
    }
}

fn check_oscillation(
    parameter: &'static str,
    oscillation: &Oscillation,
    max_amplitude: f32,
) -> Result<(), ConfigError> {
    check_range(parameter, oscillation.amplitude, 0.0, max_amplitude)?;
    check_time("oscillation wavelength", oscillation.wavelength)
}

/// An optional part of an instrument. The parameters are kept while the part
/// is switched off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Toggle<T> {
    pub enabled: bool,
    pub params: T,
}

impl<T> Toggle<T> {
    pub fn on(params: T) -> Self {
        Self {
            enabled: true,
            params,
        }
    }

    pub fn off(params: T) -> Self {
        Self {
            enabled: false,
            params,
        }
    }

    /// The parameters, if they take part in synthesis.
    pub fn active(&self) -> Option<&T> {
        if self.enabled {
            Some(&self.params)
        } else {
            None
        }
    }
}

/// The base waveform of an instrument, optionally blended with a second one.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformData {
    pub first: WaveformSpec,
    pub second: Option<WaveformSpec>,
    /// Share of the second waveform, in [0, 1].
    pub blend: f32,
}

impl Default for WaveformData {
    fn default() -> Self {
        Self::single(WaveformSpec::default())
    }
}

impl WaveformData {
    pub fn single(waveform: WaveformSpec) -> Self {
        Self {
            first: waveform,
            second: None,
            blend: 0.5,
        }
    }

    pub fn blended(first: WaveformSpec, second: WaveformSpec, blend: f32) -> Self {
        Self {
            first,
            second: Some(second),
            blend,
        }
    }

    /// The mixer evaluating this waveform, with one layer per configured shape.
    ///
    /// ```
    /// # use note_forge::instrument::WaveformData;
    /// # use note_forge::waveform::*;
    /// let data = WaveformData::blended(
    ///     WaveformSpec::new(WaveformKind::Square),
    ///     WaveformSpec::new(WaveformKind::Sawtooth),
    ///     0.25,
    /// );
    /// let weights: Vec<f32> = data.mixer().layers().iter().map(|l| l.weight).collect();
    /// assert_eq!(weights, vec![0.75, 0.25]);
    /// ```
    pub fn mixer(&self) -> WaveformMixer {
        match self.second {
            None => std::iter::once(WeightedWaveform::new(self.first, 1.0)).collect(),
            Some(second) => vec![
                WeightedWaveform::new(self.first, 1.0 - self.blend),
                WeightedWaveform::new(second, self.blend),
            ]
            .into_iter()
            .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for waveform in std::iter::once(&self.first).chain(self.second.iter()) {
            // a whole cycle is the same as no offset, so 1.0 itself is excluded
            if !(0.0..1.0).contains(&waveform.phase_offset) {
                return Err(ConfigError::OutOfRange {
                    parameter: "phase offset",
                    value: waveform.phase_offset,
                    min: 0.0,
                    max: 1.0,
                });
            }
            check_range("noise amount", waveform.noise, 0.0, 1.0)?;
        }
        if self.second.is_some() {
            check_range("waveform blend", self.blend, 0.0, 1.0)?;
        }
        validate_mixer(&self.mixer())
    }
}

/// Check that all layers of a mixer carry a usable weight.
pub fn validate_mixer(mixer: &WaveformMixer) -> Result<(), ConfigError> {
    for layer in mixer.layers() {
        if !(layer.weight >= 0.0 && layer.weight.is_finite()) {
            return Err(ConfigError::NegativeWeight {
                value: layer.weight,
            });
        }
    }
    Ok(())
}

/// Everything that determines the sound of an instrument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentDefinition {
    pub waveform: WaveformData,
    pub volume: Toggle<EnvelopeParams>,
    pub pitch: Toggle<PitchParams>,
    pub ornament: Toggle<OrnamentParams>,
    pub chorus: Toggle<ChorusParams>,
    pub echo: Toggle<EchoParams>,
}

impl InstrumentDefinition {
    /// Check the enabled parts. Disabled parts may hold anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.waveform.validate()?;
        if let Some(volume) = self.volume.active() {
            check_time("attack", volume.attack)?;
            check_time("decay", volume.decay)?;
            check_range("sustain", volume.sustain, 0.0, 1.0)?;
            check_time("release", volume.release)?;
            check_oscillation("volume oscillation", &volume.oscillation, 1.0)?;
        }
        if let Some(pitch) = self.pitch.active() {
            check_range("pitch attack", pitch.attack, -MAX_SEMITONES, MAX_SEMITONES)?;
            check_time("pitch attack time", pitch.attack_time)?;
            check_range("pitch release", pitch.release, -MAX_SEMITONES, MAX_SEMITONES)?;
            check_time("pitch release time", pitch.release_time)?;
            check_oscillation("pitch oscillation", &pitch.oscillation, MAX_SEMITONES)?;
        }
        if let Some(ornament) = self.ornament.active() {
            if ornament.semitone_offsets.is_empty() {
                return Err(ConfigError::EmptyOrnament);
            }
            if !(ornament.cycle_time > 0.0 && ornament.cycle_time.is_finite()) {
                return Err(ConfigError::NonPositiveOrnamentCycle {
                    value: ornament.cycle_time,
                });
            }
            for offset in ornament.semitone_offsets.iter() {
                check_range("ornament offset", *offset, -MAX_SEMITONES, MAX_SEMITONES)?;
            }
        }
        if let Some(chorus) = self.chorus.active() {
            check_range(
                "chorus pitch change",
                chorus.pitch_change,
                -MAX_SEMITONES,
                MAX_SEMITONES,
            )?;
        }
        if let Some(echo) = self.echo.active() {
            if !(echo.delay > 0.0 && echo.delay.is_finite()) {
                return Err(ConfigError::NonPositiveEchoDelay { value: echo.delay });
            }
        }
        Ok(())
    }
}

/// An instrument definition together with the notes already synthesized from it.
///
/// Every change of the definition goes through this type, so the cache can
/// never hold waves of an outdated definition.
///
/// # Example
///
/// ```
/// use note_forge::instrument::*;
/// use note_forge::noise::NoiseSource;
/// use note_forge::synth::NoteRequest;
///
/// let mut instrument = Instrument::new(InstrumentDefinition::default()).unwrap();
/// let mut noise = NoiseSource::seeded(0);
/// let request = NoteRequest::new(8000, 57, 0.5);
/// let first = instrument.note_wave(&request, true, &mut noise).unwrap();
/// let second = instrument.note_wave(&request, true, &mut noise).unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
///
/// instrument.edit(|definition| definition.chorus.enabled = true).unwrap();
/// assert_eq!(instrument.cached_notes(), 0);
/// ```
#[derive(Debug, Default)]
pub struct Instrument {
    definition: InstrumentDefinition,
    cache: NoteWaveCache,
}

impl Instrument {
    pub fn new(definition: InstrumentDefinition) -> Result<Self, ConfigError> {
        definition.validate()?;
        Ok(Self {
            definition,
            cache: NoteWaveCache::new(),
        })
    }

    pub fn definition(&self) -> &InstrumentDefinition {
        &self.definition
    }

    /// Change the definition in place. The change is discarded if the result is invalid.
    pub fn edit<F: FnOnce(&mut InstrumentDefinition)>(&mut self, edit: F) -> Result<(), ConfigError> {
        let mut edited = self.definition.clone();
        edit(&mut edited);
        self.set_definition(edited)
    }

    pub fn set_definition(&mut self, definition: InstrumentDefinition) -> Result<(), ConfigError> {
        definition.validate()?;
        self.definition = definition;
        self.cache.clear();
        Ok(())
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_notes(&self) -> usize {
        self.cache.len()
    }

    /// The wave of a note. One-off previews should pass `use_cache = false`
    /// so they do not keep the wave alive.
    pub fn note_wave(
        &mut self,
        request: &NoteRequest,
        use_cache: bool,
        noise: &mut NoiseSource,
    ) -> Result<Arc<NoteWave>, ConfigError> {
        if use_cache {
            self.cache
                .get_or_synthesize(&self.definition, request, noise)
        } else {
            NoteSynthesizer::new(&self.definition)
                .synthesize(request, noise)
                .map(Arc::new)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::waveform::WaveformKind;

    #[test]
    fn defaults_are_valid() {
        let mut definition = InstrumentDefinition::default();
        assert_eq!(definition.validate(), Ok(()));
        definition.volume.enabled = true;
        definition.pitch.enabled = true;
        definition.chorus.enabled = true;
        definition.echo.enabled = true;
        assert_eq!(definition.validate(), Ok(()));
        // an ornament without offsets is only a problem once it is used
        definition.ornament.enabled = true;
        assert_eq!(definition.validate(), Err(ConfigError::EmptyOrnament));
    }

    #[test]
    fn disabled_parts_are_not_checked() {
        let definition = InstrumentDefinition {
            echo: Toggle::off(EchoParams {
                repeat_count: 3,
                delay: 0.0,
            }),
            ..InstrumentDefinition::default()
        };
        assert_eq!(definition.validate(), Ok(()));
        let definition = InstrumentDefinition {
            echo: Toggle::on(definition.echo.params.clone()),
            ..definition
        };
        assert_eq!(
            definition.validate(),
            Err(ConfigError::NonPositiveEchoDelay { value: 0.0 })
        );
    }

    #[test]
    fn parameter_ranges() {
        let definition = InstrumentDefinition {
            volume: Toggle::on(EnvelopeParams {
                attack: -0.5,
                ..EnvelopeParams::default()
            }),
            ..InstrumentDefinition::default()
        };
        assert_eq!(
            definition.validate(),
            Err(ConfigError::NegativeTime {
                parameter: "attack",
                value: -0.5
            })
        );

        let definition = InstrumentDefinition {
            pitch: Toggle::on(PitchParams {
                attack: 40.0,
                ..PitchParams::default()
            }),
            ..InstrumentDefinition::default()
        };
        assert_eq!(
            definition.validate(),
            Err(ConfigError::OutOfRange {
                parameter: "pitch attack",
                value: 40.0,
                min: -36.0,
                max: 36.0
            })
        );

        let definition = InstrumentDefinition {
            ornament: Toggle::on(OrnamentParams {
                cycle_time: 0.0,
                semitone_offsets: vec![0.0, 12.0],
            }),
            ..InstrumentDefinition::default()
        };
        assert_eq!(
            definition.validate(),
            Err(ConfigError::NonPositiveOrnamentCycle { value: 0.0 })
        );

        let definition = InstrumentDefinition {
            waveform: WaveformData::blended(
                WaveformSpec::new(WaveformKind::Sine),
                WaveformSpec::new(WaveformKind::Square),
                1.5,
            ),
            ..InstrumentDefinition::default()
        };
        assert!(matches!(
            definition.validate(),
            Err(ConfigError::OutOfRange {
                parameter: "waveform blend",
                ..
            })
        ));
    }

    #[test]
    fn phase_offset_excludes_full_cycle() {
        let shifted = |phase_offset| {
            WaveformData::single(WaveformSpec::new(WaveformKind::Sawtooth).with_offset(phase_offset))
        };
        assert_eq!(shifted(0.0).validate(), Ok(()));
        assert_eq!(shifted(0.999).validate(), Ok(()));
        assert_eq!(
            shifted(1.0).validate(),
            Err(ConfigError::OutOfRange {
                parameter: "phase offset",
                value: 1.0,
                min: 0.0,
                max: 1.0
            })
        );
        assert!(shifted(-0.25).validate().is_err());
        assert!(shifted(f32::NAN).validate().is_err());
    }

    #[test]
    fn negative_weights() {
        let mut mixer = WaveformMixer::new();
        mixer.push(WeightedWaveform::new(WaveformSpec::default(), 1.0));
        assert_eq!(validate_mixer(&mixer), Ok(()));
        mixer.push(WeightedWaveform::new(WaveformSpec::default(), -0.5));
        assert_eq!(
            validate_mixer(&mixer),
            Err(ConfigError::NegativeWeight { value: -0.5 })
        );
    }

    #[test]
    fn single_waveform_ignores_blend() {
        let data = WaveformData {
            blend: 7.0,
            ..WaveformData::default()
        };
        assert_eq!(data.validate(), Ok(()));
        let layers = data.mixer();
        assert_eq!(layers.layers().len(), 1);
        assert_eq!(layers.layers()[0].weight, 1.0);
    }

    #[test]
    fn rejected_edit_keeps_definition() {
        let mut instrument = Instrument::new(InstrumentDefinition::default()).unwrap();
        let mut noise = NoiseSource::seeded(0);
        instrument
            .note_wave(&NoteRequest::new(8000, 57, 0.1), true, &mut noise)
            .unwrap();
        assert_eq!(instrument.cached_notes(), 1);

        let result = instrument.edit(|definition| {
            definition.volume = Toggle::on(EnvelopeParams {
                sustain: 2.0,
                ..EnvelopeParams::default()
            })
        });
        assert!(result.is_err());
        assert_eq!(instrument.definition(), &InstrumentDefinition::default());
        assert_eq!(instrument.cached_notes(), 1);

        instrument.clear_cache();
        assert_eq!(instrument.cached_notes(), 0);
    }

    #[test]
    fn uncached_waves_are_not_kept() {
        let mut instrument = Instrument::new(InstrumentDefinition::default()).unwrap();
        let mut noise = NoiseSource::seeded(0);
        let request = NoteRequest::new(8000, 57, 0.1);
        let a = instrument.note_wave(&request, false, &mut noise).unwrap();
        let b = instrument.note_wave(&request, false, &mut noise).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
        assert_eq!(instrument.cached_notes(), 0);
    }

    #[test]
    fn config_errors_display() {
        let err = ConfigError::UnknownWaveform {
            name: "noise".to_owned(),
        };
        assert_eq!(err.to_string(), "Unknown waveform \"noise\"");
        assert_eq!(
            ConfigError::ZeroSamplingFrequency.to_string(),
            "The sampling frequency must not be zero"
        );
    }
}
