// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Synthesizes the waveform of single notes from layered instrument parameters.
//!
//! ```
//! use note_forge::instrument::{Instrument, InstrumentDefinition};
//! use note_forge::noise::NoiseSource;
//! use note_forge::synth::NoteRequest;
//!
//! let mut instrument = Instrument::new(InstrumentDefinition::default()).unwrap();
//! let mut noise = NoiseSource::seeded(7);
//! let request = NoteRequest::new(8000, 57, 0.25);
//! let wave = instrument.note_wave(&request, true, &mut noise).unwrap();
//! assert_eq!(wave.len(), 2001);
//! ```

pub mod cache;
pub mod instrument;
pub mod noise;
pub mod note;
pub mod output;
pub mod synth;
pub mod tuning;
pub mod wave;
pub mod waveform;
