// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Easy interface for listening to a note wave using a sox subprocess.

use std::io;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};

use log::{debug, warn};
use snafu::{ResultExt, Snafu};

use crate::wave::NoteWave;

/// Where sox sends the wave.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SoxTarget<'a> {
    /// The default audio device.
    Play,
    /// Any file format supported by sox, deduced from the extension.
    File(&'a Path),
}

#[derive(Debug, Snafu)]
pub enum PreviewError {
    #[snafu(display("Nothing to preview: {}", message))]
    Empty { message: String },
    #[snafu(display("Could not run sox: {}", source))]
    Io { source: io::Error },
    #[snafu(display("sox exited with {}", status))]
    Failed { status: ExitStatus },
}

/// Arguments describing the raw mono `f32` stream sox reads from stdin.
fn input_args(sampling_frequency: u32) -> Vec<String> {
    vec![
        "-R".to_owned(), // make the output reproducible
        "--channels".to_owned(),
        "1".to_owned(),
        "--rate".to_owned(),
        sampling_frequency.to_string(),
        "--type".to_owned(),
        "f32".to_owned(),
        "/dev/stdin".to_owned(),
    ]
}

fn sox_command(sampling_frequency: u32, target: SoxTarget) -> Command {
    // For properly recording the sox dependency on nix:
    let bin_dir = option_env!("NIX_SOX_BIN").map(Path::new);
    let program = |name: &str| match bin_dir {
        Some(dir) => dir.join(name),
        None => name.into(),
    };
    match target {
        SoxTarget::Play => {
            let mut command = Command::new(program("play"));
            command
                .args(input_args(sampling_frequency))
                .stdout(Stdio::null())
                .stderr(Stdio::null());
            command
        }
        SoxTarget::File(outfile) => {
            let mut command = Command::new(program("sox"));
            command.args(input_args(sampling_frequency)).arg(outfile);
            command
        }
    }
}

/// Send a wave to sox and wait until it has been played or written.
///
/// An empty wave is rejected with `empty_message` before sox is started.
pub fn preview(
    sampling_frequency: u32,
    wave: &NoteWave,
    empty_message: &str,
    target: SoxTarget,
) -> Result<(), PreviewError> {
    if wave.is_empty() {
        warn!("not previewing: {}", empty_message);
        return Err(PreviewError::Empty {
            message: empty_message.to_owned(),
        });
    }

    debug!(
        "sending {} samples at {} Hz to sox ({:?})",
        wave.len(),
        sampling_frequency,
        target
    );
    let mut bytes = vec![0u8; wave.byte_len()];
    wave.copy_bytes_to(&mut bytes);

    let mut sox = sox_command(sampling_frequency, target)
        .stdin(Stdio::piped())
        .spawn()
        .context(Io)?;
    let status = feed(&mut sox, &bytes)?;
    if status.success() {
        Ok(())
    } else {
        Err(PreviewError::Failed { status })
    }
}

/// Write `bytes` to the stdin of `child`, close it and wait for the child to exit.
/// The child is waited for even when writing fails.
fn feed(child: &mut Child, bytes: &[u8]) -> Result<ExitStatus, PreviewError> {
    let written = match child.stdin.take() {
        Some(mut audio_stream) => audio_stream.write_all(bytes),
        None => Ok(()),
    };
    // stdin is closed at this point, so the child sees the end of its input
    let status = child.wait().context(Io)?;
    written.context(Io)?;
    Ok(status)
}
