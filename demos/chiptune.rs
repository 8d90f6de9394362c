// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Plays a short arpeggiated melody, reusing cached notes for repeated pitches.
//!
//! Usage: `cargo run --example chiptune [output.wav]`

use std::io;
use std::path::PathBuf;

use log::info;

use note_forge::instrument::{Instrument, InstrumentDefinition, Toggle, WaveformData};
use note_forge::noise::NoiseSource;
use note_forge::note::{parse_note, NoteLength};
use note_forge::output::{self, SoxTarget};
use note_forge::synth::effects::EchoParams;
use note_forge::synth::envelope::{EnvelopeParams, ReleaseDropOff};
use note_forge::synth::pitch::OrnamentParams;
use note_forge::synth::NoteRequest;
use note_forge::wave::NoteWave;
use note_forge::waveform::{WaveformKind, WaveformSpec};

const SAMPLE_RATE: u32 = 22050;
const BPM: f32 = 140.0;

const MELODY: &[(&str, NoteLength)] = &[
    ("C4", NoteLength::Quaver),
    ("E4", NoteLength::Quaver),
    ("G4", NoteLength::Quaver),
    ("C5", NoteLength::Quaver),
    ("A3", NoteLength::Crotchet),
    ("C4", NoteLength::Quaver),
    ("E4", NoteLength::Quaver),
    ("G4", NoteLength::DottedCrotchet),
    ("C4", NoteLength::Minim),
];

fn lead() -> InstrumentDefinition {
    InstrumentDefinition {
        waveform: WaveformData::blended(
            WaveformSpec::new(WaveformKind::Square),
            WaveformSpec::new(WaveformKind::Triangle).with_offset(0.25),
            0.3,
        ),
        volume: Toggle::on(EnvelopeParams {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.6,
            release: 0.15,
            release_drop_off: ReleaseDropOff::SteepCurve,
            ..EnvelopeParams::default()
        }),
        ornament: Toggle::on(OrnamentParams {
            cycle_time: 0.06,
            semitone_offsets: vec![0.0, 12.0],
        }),
        echo: Toggle::on(EchoParams {
            repeat_count: 2,
            delay: 0.12,
        }),
        ..InstrumentDefinition::default()
    }
}

fn to_io(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

fn main() -> io::Result<()> {
    simple_logger::init_with_level(log::Level::Info).map_err(to_io)?;
    let output_path = std::env::args_os().nth(1).map(PathBuf::from);

    let mut instrument = Instrument::new(lead()).map_err(to_io)?;
    let mut noise = NoiseSource::seeded(1);

    // notes overlap with the release and echo of their predecessors
    let mut mix: Vec<f32> = Vec::new();
    let mut start = 0;
    for (name, value) in MELODY {
        let note = parse_note(name).ok_or_else(|| to_io(format!("bad note {}", name)))?;
        let request = NoteRequest::new(SAMPLE_RATE, note, value.seconds(BPM));
        let wave = instrument
            .note_wave(&request, true, &mut noise)
            .map_err(to_io)?;
        if mix.len() < start + wave.len() {
            mix.resize(start + wave.len(), 0.0);
        }
        for (target, sample) in mix[start..].iter_mut().zip(wave.iter()) {
            *target += sample * 0.5;
        }
        start += request.note_samples();
    }
    info!(
        "rendered {} notes from {} distinct waves",
        MELODY.len(),
        instrument.cached_notes()
    );

    let target = output_path
        .as_deref()
        .map_or(SoxTarget::Play, SoxTarget::File);
    output::preview(SAMPLE_RATE, &NoteWave::from(mix), "the melody is empty", target).map_err(to_io)
}
