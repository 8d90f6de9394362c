// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This namespace contains all the parts converting instrument parameters to wave data.

pub mod effects;
pub mod envelope;
pub mod pitch;

use log::debug;

use crate::instrument::{ConfigError, InstrumentDefinition};
use crate::noise::NoiseSource;
use crate::tuning::Tuning;
use crate::wave::NoteWave;
use crate::waveform::{Phase, WaveformKind};

use effects::{ChorusParams, ChorusPass, EchoTaps};
use envelope::{EvalEnvelope, EvalTremolo};
use pitch::EvalPitch;

/// Amplitudes or wavelengths below this are treated as no oscillation at all.
pub const MIN_OSCILLATION: f32 = 0.0001;

/// Notes further away from note 0 than this cannot be synthesized, their
/// frequency would not fit into an `f32`.
pub const MAX_NOTE_DISTANCE: i32 = 1024;

/// A periodic modulation of volume or pitch over the course of a note.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Oscillation {
    pub kind: WaveformKind,
    /// Depth of the modulation, its unit depends on what is modulated.
    pub amplitude: f32,
    /// Length of one cycle in seconds.
    pub wavelength: f32,
}

impl Oscillation {
    pub fn is_audible(&self) -> bool {
        self.amplitude >= MIN_OSCILLATION && self.wavelength >= MIN_OSCILLATION
    }
}

impl Default for Oscillation {
    fn default() -> Self {
        Self {
            kind: WaveformKind::Sine,
            amplitude: 0.0,
            wavelength: 0.0,
        }
    }
}

/// What to synthesize: a note index held for `length` seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NoteRequest {
    pub sampling_frequency: u32,
    /// Semitone index, 57 being A4.
    pub note: i32,
    pub length: f32,
}

impl NoteRequest {
    pub fn new(sampling_frequency: u32, note: i32, length: f32) -> Self {
        Self {
            sampling_frequency,
            note,
            length,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_frequency == 0 {
            return Err(ConfigError::ZeroSamplingFrequency);
        }
        if !(-MAX_NOTE_DISTANCE..=MAX_NOTE_DISTANCE).contains(&self.note) {
            return Err(ConfigError::NoteOutOfRange {
                note: self.note,
                min: -MAX_NOTE_DISTANCE,
                max: MAX_NOTE_DISTANCE,
            });
        }
        if !self.length.is_finite() || self.length < 0.0 {
            return Err(ConfigError::InvalidLength {
                length: self.length,
            });
        }
        Ok(())
    }

    /// Number of samples the note is held for, before the release.
    pub fn note_samples(&self) -> usize {
        (self.length * self.sampling_frequency as f32) as usize
    }
}

/// The sections of a note wave, in samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NoteLayout {
    pub note_samples: usize,
    pub release_samples: usize,
    pub echo_samples: usize,
}

impl NoteLayout {
    /// Samples produced by the synthesis loop itself.
    pub fn body_len(&self) -> usize {
        self.note_samples + self.release_samples
    }

    /// Total length of the wave, including the leading silent sample.
    pub fn wave_len(&self) -> usize {
        self.body_len() + self.echo_samples + 1
    }
}

/// Turns an instrument definition into the wave of single notes.
///
/// # Example
///
/// ```
/// use note_forge::instrument::InstrumentDefinition;
/// use note_forge::noise::NoiseSource;
/// use note_forge::synth::*;
///
/// let definition = InstrumentDefinition::default();
/// let synth = NoteSynthesizer::new(&definition);
/// let request = NoteRequest::new(8000, 0, 0.01);
/// let wave = synth.synthesize(&request, &mut NoiseSource::seeded(0)).unwrap();
/// assert_eq!(wave.len(), 81);
/// assert_eq!(wave[0], 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct NoteSynthesizer<'a> {
    definition: &'a InstrumentDefinition,
    tuning: Tuning,
}

impl<'a> NoteSynthesizer<'a> {
    pub fn new(definition: &'a InstrumentDefinition) -> Self {
        Self::with_tuning(definition, Tuning::default())
    }

    pub fn with_tuning(definition: &'a InstrumentDefinition, tuning: Tuning) -> Self {
        Self { definition, tuning }
    }

    /// Sample counts of a note without synthesizing it.
    pub fn layout(&self, request: &NoteRequest) -> NoteLayout {
        let f = request.sampling_frequency;
        NoteLayout {
            note_samples: request.note_samples(),
            release_samples: self
                .definition
                .volume
                .active()
                .map_or(0, |volume| (volume.release * f as f32) as usize),
            echo_samples: self.echo_taps(f).tail_samples(),
        }
    }

    fn echo_taps(&self, sampling_frequency: u32) -> EchoTaps {
        self.definition
            .echo
            .active()
            .map_or_else(EchoTaps::none, |echo| echo.taps(sampling_frequency))
    }

    /// Synthesize the complete wave of a note.
    ///
    /// The first sample is always silent, the dry signal starts at index one.
    /// Fails without allocating anything if the request or the definition is invalid.
    pub fn synthesize(
        &self,
        request: &NoteRequest,
        noise: &mut NoiseSource,
    ) -> Result<NoteWave, ConfigError> {
        request.validate()?;
        self.definition.validate()?;

        let f = request.sampling_frequency;
        let layout = self.layout(request);
        let volume = self.definition.volume.active();
        let envelope = match volume {
            Some(params) => params.instantiate(f, layout.note_samples),
            None => EvalEnvelope::neutral(layout.note_samples),
        };
        let mut tremolo = EvalTremolo::new(volume.map(|params| &params.oscillation), f);
        let pitch = EvalPitch::new(
            self.definition.pitch.active(),
            self.definition.ornament.active(),
            f,
            layout.note_samples,
        );
        let passes = self
            .definition
            .chorus
            .active()
            .map_or_else(|| vec![ChorusPass::SINGLE], ChorusParams::passes);
        let echo = self.echo_taps(f);
        let mixer = self.definition.waveform.mixer();

        debug!(
            "note {} at {} Hz: {} + {} + {} samples, {} chorus passes, {} echo taps",
            request.note,
            f,
            layout.note_samples,
            layout.release_samples,
            layout.echo_samples,
            passes.len(),
            echo.taps().len()
        );

        let mut wave = NoteWave::silent(layout.wave_len());
        let base_semitones = request.note as f32 - self.tuning.reference_note as f32;
        for pass in passes.iter() {
            let mut phases: Vec<Phase> = mixer
                .layers()
                .iter()
                .map(|layer| Phase::new(layer.waveform.phase_offset))
                .collect();
            for i in 0..layout.body_len() {
                let value = envelope.gain(i)
                    * (tremolo.step() * mixer.sample_layers(&phases, noise) * pass.gain);
                wave[i + 1] += value;
                for tap in echo.taps() {
                    wave[i + tap.offset] += value * tap.volume;
                }

                let semitones = base_semitones + pass.semitones + pitch.semitones(i, true);
                let increment = self.tuning.phase_increment(semitones, f);
                for phase in phases.iter_mut() {
                    *phase = phase.step(increment);
                }
            }
        }
        Ok(wave)
    }
}
