// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `forge` - renders a single note of an instrument described on the command line.

use std::io;
use std::path::PathBuf;

use log::info;
use simple_logger;
use structopt::StructOpt;

use note_forge::instrument::{ConfigError, Instrument, InstrumentDefinition, Toggle, WaveformData};
use note_forge::noise::NoiseSource;
use note_forge::note::{parse_note, NoteLength};
use note_forge::output::{self, PreviewError, SoxTarget};
use note_forge::synth::effects::{ChorusParams, EchoParams};
use note_forge::synth::envelope::{EnvelopeParams, ReleaseDropOff};
use note_forge::synth::pitch::{OrnamentParams, PitchParams};
use note_forge::synth::{NoteRequest, Oscillation};
use note_forge::waveform::{WaveformKind, WaveformSpec};

#[derive(Debug, StructOpt)]
#[structopt(name = "forge", about = "Forging single notes of chiptune instruments")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// Sampling frequency in Hz.
    #[structopt(long, default_value = "44100")]
    rate: u32,

    /// Note to play, either a name like A4, C#5, Gb2 or a note index.
    #[structopt(short, long, default_value = "A4", parse(try_from_str = parse_note_arg))]
    note: i32,

    /// Length of the note in seconds.
    #[structopt(short, long)]
    length: Option<f32>,

    /// Length of the note as a note value, e.g. crotchet or dotted-eighth.
    #[structopt(long, conflicts_with = "length")]
    value: Option<NoteLength>,

    /// Tempo in crotchets per minute, used with --value.
    #[structopt(long, default_value = "120")]
    bpm: f32,

    #[structopt(short, long, default_value = "square")]
    waveform: WaveformKind,

    /// Blend a second waveform into the first.
    #[structopt(long)]
    second_waveform: Option<WaveformKind>,

    /// Share of the second waveform.
    #[structopt(long, default_value = "0.5")]
    blend: f32,

    /// Noise amount in [0, 1] roughening the waveforms.
    #[structopt(long, default_value = "0")]
    noise: f32,

    /// Phase offset of the second waveform.
    #[structopt(long, default_value = "0")]
    phase: f32,

    /// Shape the volume with the envelope options below.
    #[structopt(long)]
    envelope: bool,

    #[structopt(long, default_value = "0.05")]
    attack: f32,

    #[structopt(long, default_value = "0")]
    decay: f32,

    #[structopt(long, default_value = "1")]
    sustain: f32,

    #[structopt(long, default_value = "0.1")]
    release: f32,

    /// One of linear, shallow, medium, steep.
    #[structopt(long, default_value = "medium")]
    drop_off: ReleaseDropOff,

    /// Depth of the volume oscillation in [0, 1].
    #[structopt(long, default_value = "0")]
    tremolo: f32,

    /// Seconds per cycle of the volume oscillation.
    #[structopt(long, default_value = "0.2")]
    tremolo_wavelength: f32,

    /// Semitones the note starts off from its pitch.
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    bend_start: f32,

    #[structopt(long, default_value = "0")]
    bend_start_time: f32,

    /// Semitones the pitch moves by during the release.
    #[structopt(long, default_value = "0", allow_hyphen_values = true)]
    bend_end: f32,

    #[structopt(long, default_value = "0")]
    bend_end_time: f32,

    /// Depth of the vibrato in semitones.
    #[structopt(long, default_value = "0")]
    vibrato: f32,

    /// Seconds per cycle of the vibrato.
    #[structopt(long, default_value = "0.1")]
    vibrato_wavelength: f32,

    #[structopt(long, default_value = "sine")]
    vibrato_shape: WaveformKind,

    /// Semitone offsets cycled through during the note, e.g. `0 4 7`.
    #[structopt(long, allow_hyphen_values = true)]
    ornament: Vec<f32>,

    /// Seconds for one cycle through the ornament.
    #[structopt(long, default_value = "0.1")]
    ornament_cycle: f32,

    /// Detune of the chorus copies in semitones.
    #[structopt(long)]
    chorus: Option<f32>,

    /// Number of echo repetitions.
    #[structopt(long)]
    echo_count: Option<u32>,

    /// Seconds between echo repetitions.
    #[structopt(long, default_value = "0.1")]
    echo_delay: f32,

    /// Seed of the noise source.
    #[structopt(long, default_value = "0")]
    seed: u64,

    /// Output file (any sox-supported format). The note is played directly if not given.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

fn parse_note_arg(s: &str) -> Result<i32, String> {
    parse_note(s).ok_or_else(|| format!("not a note: {:?}", s))
}

impl Opt {
    fn length(&self) -> f32 {
        match (self.length, self.value) {
            (Some(length), _) => length,
            (None, Some(value)) => value.seconds(self.bpm),
            (None, None) => NoteLength::Crotchet.seconds(self.bpm),
        }
    }

    fn definition(&self) -> InstrumentDefinition {
        let first = WaveformSpec::new(self.waveform).with_noise(self.noise);
        let waveform = match self.second_waveform {
            Some(kind) => WaveformData::blended(
                first,
                WaveformSpec::new(kind)
                    .with_noise(self.noise)
                    .with_offset(self.phase),
                self.blend,
            ),
            None => WaveformData::single(first),
        };
        let volume = EnvelopeParams {
            attack: self.attack,
            decay: self.decay,
            sustain: self.sustain,
            release: self.release,
            release_drop_off: self.drop_off,
            oscillation: Oscillation {
                kind: WaveformKind::Sine,
                amplitude: self.tremolo,
                wavelength: self.tremolo_wavelength,
            },
        };
        let pitch = PitchParams {
            attack: self.bend_start,
            attack_time: self.bend_start_time,
            release: self.bend_end,
            release_time: self.bend_end_time,
            oscillation: Oscillation {
                kind: self.vibrato_shape,
                amplitude: self.vibrato,
                wavelength: self.vibrato_wavelength,
            },
        };
        let pitch_enabled = self.bend_start != 0.0 || self.bend_end != 0.0 || self.vibrato != 0.0;
        let ornament = OrnamentParams {
            cycle_time: self.ornament_cycle,
            semitone_offsets: self.ornament.clone(),
        };
        InstrumentDefinition {
            waveform,
            volume: Toggle {
                enabled: self.envelope,
                params: volume,
            },
            pitch: Toggle {
                enabled: pitch_enabled,
                params: pitch,
            },
            ornament: Toggle {
                enabled: !self.ornament.is_empty(),
                params: ornament,
            },
            chorus: match self.chorus {
                Some(pitch_change) => Toggle::on(ChorusParams { pitch_change }),
                None => Toggle::default(),
            },
            echo: match self.echo_count {
                Some(repeat_count) => Toggle::on(EchoParams {
                    repeat_count,
                    delay: self.echo_delay,
                }),
                None => Toggle::default(),
            },
        }
    }
}

fn config_error(err: ConfigError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;

    let mut instrument = Instrument::new(opt.definition()).map_err(config_error)?;
    let request = NoteRequest::new(opt.rate, opt.note, opt.length());
    let mut noise = NoiseSource::seeded(opt.seed);
    let wave = instrument
        .note_wave(&request, false, &mut noise)
        .map_err(config_error)?;
    info!(
        "forged note {} of {:.3}s: {} samples ({:.3}s), peak {:.3}",
        request.note,
        request.length,
        wave.len(),
        wave.duration(request.sampling_frequency),
        wave.peak()
    );

    let target = opt
        .output
        .as_deref()
        .map_or(SoxTarget::Play, SoxTarget::File);
    match output::preview(opt.rate, &wave, "the note has no samples", target) {
        Ok(()) => Ok(()),
        // already reported by the preview
        Err(PreviewError::Empty { .. }) => Ok(()),
        Err(PreviewError::Io { source }) => Err(source),
        Err(err) => Err(io::Error::new(io::ErrorKind::Other, err.to_string())),
    }
}
