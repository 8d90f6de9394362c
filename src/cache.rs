// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Memoization of synthesized notes.

use std::sync::Arc;

use log::trace;

use crate::instrument::{ConfigError, InstrumentDefinition};
use crate::noise::NoiseSource;
use crate::synth::{NoteRequest, NoteSynthesizer};
use crate::wave::NoteWave;

/// Note lengths closer than this are considered equal.
pub const LENGTH_TOLERANCE: f32 = 0.0001;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub sampling_frequency: u32,
    pub note: i32,
    pub length: f32,
    pub wave: Arc<NoteWave>,
}

impl CacheEntry {
    fn matches(&self, request: &NoteRequest) -> bool {
        self.sampling_frequency == request.sampling_frequency
            && self.note == request.note
            && (self.length - request.length).abs() < LENGTH_TOLERANCE
    }
}

/// The waves synthesized from one instrument definition.
///
/// The cache does not know which definition its entries came from. It must be
/// cleared whenever the definition changes, which [`crate::instrument::Instrument`]
/// takes care of.
#[derive(Debug, Clone, Default)]
pub struct NoteWaveCache {
    entries: Vec<CacheEntry>,
}

impl NoteWaveCache {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, request: &NoteRequest) -> Option<Arc<NoteWave>> {
        self.entries
            .iter()
            .find(|entry| entry.matches(request))
            .map(|entry| Arc::clone(&entry.wave))
    }

    /// Look up the note, synthesizing and storing it on a miss.
    /// Errors are not cached.
    pub fn get_or_synthesize(
        &mut self,
        definition: &InstrumentDefinition,
        request: &NoteRequest,
        noise: &mut NoiseSource,
    ) -> Result<Arc<NoteWave>, ConfigError> {
        if let Some(wave) = self.get(request) {
            trace!("cache hit for note {} of {}s", request.note, request.length);
            return Ok(wave);
        }
        trace!("cache miss for note {} of {}s", request.note, request.length);
        let wave = Arc::new(NoteSynthesizer::new(definition).synthesize(request, noise)?);
        self.entries.push(CacheEntry {
            sampling_frequency: request.sampling_frequency,
            note: request.note,
            length: request.length,
            wave: Arc::clone(&wave),
        });
        Ok(wave)
    }
}
