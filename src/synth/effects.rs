// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Chorus and echo, the stages that duplicate the dry signal.

/// Thickens the sound by adding detuned copies of the note.
#[derive(Debug, Clone, PartialEq)]
pub struct ChorusParams {
    /// Detune of the outer copies in semitones.
    pub pitch_change: f32,
}

impl Default for ChorusParams {
    fn default() -> Self {
        Self { pitch_change: 0.05 }
    }
}

/// One run of the synthesis loop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ChorusPass {
    /// Pitch offset of this pass in semitones.
    pub semitones: f32,
    /// Factor applied to every sample of this pass.
    pub gain: f32,
}

impl ChorusPass {
    /// The plain, undetuned note.
    pub const SINGLE: ChorusPass = ChorusPass {
        semitones: 0.0,
        gain: 1.0,
    };
}

impl ChorusParams {
    /// The passes making up the chorus. Without any detune the three copies
    /// would be identical, so they are folded into a single pass.
    ///
    /// ```
    /// # use note_forge::synth::effects::*;
    /// let passes = ChorusParams { pitch_change: 0.5 }.passes();
    /// let offsets: Vec<f32> = passes.iter().map(|p| p.semitones).collect();
    /// assert_eq!(offsets, vec![-0.5, 0.0, 0.5]);
    /// assert_eq!(ChorusParams { pitch_change: 0.0 }.passes(), vec![ChorusPass::SINGLE]);
    /// ```
    pub fn passes(&self) -> Vec<ChorusPass> {
        if self.pitch_change == 0.0 {
            return vec![ChorusPass::SINGLE];
        }
        (-1..=1)
            .map(|j| ChorusPass {
                semitones: j as f32 * self.pitch_change,
                gain: 1.0 / 3.0,
            })
            .collect()
    }
}

/// Delayed repetitions of the note that fade out linearly.
#[derive(Debug, Clone, PartialEq)]
pub struct EchoParams {
    pub repeat_count: u32,
    /// Seconds between two repetitions.
    pub delay: f32,
}

impl Default for EchoParams {
    fn default() -> Self {
        Self {
            repeat_count: 10,
            delay: 0.1,
        }
    }
}

/// A single delayed copy, relative to the sample it is derived from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EchoTap {
    pub offset: usize,
    pub volume: f32,
}

/// The echo taps of one note and the tail they need after the release.
#[derive(Debug, Clone, PartialEq)]
pub struct EchoTaps {
    taps: Vec<EchoTap>,
    tail_samples: usize,
}

impl EchoTaps {
    pub fn none() -> Self {
        Self {
            taps: Vec::new(),
            tail_samples: 0,
        }
    }

    pub fn taps(&self) -> &[EchoTap] {
        &self.taps
    }

    /// Extra samples required after the release to hold the last repetition.
    pub fn tail_samples(&self) -> usize {
        self.tail_samples
    }
}

impl EchoParams {
    /// Resolve the repetitions into sample offsets.
    ///
    /// Tap `k` lands `round(k * delay * f) + 1` samples after its source and is
    /// scaled by `1 - k / (R + 1)`.
    ///
    /// ```
    /// # use note_forge::synth::effects::*;
    /// let echo = EchoParams { repeat_count: 3, delay: 0.25 };
    /// let taps = echo.taps(8);
    /// let offsets: Vec<usize> = taps.taps().iter().map(|t| t.offset).collect();
    /// let volumes: Vec<f32> = taps.taps().iter().map(|t| t.volume).collect();
    /// assert_eq!(offsets, vec![3, 5, 7]);
    /// assert_eq!(volumes, vec![0.75, 0.5, 0.25]);
    /// assert_eq!(taps.tail_samples(), 6);
    /// ```
    pub fn taps(&self, sampling_frequency: u32) -> EchoTaps {
        let rate = sampling_frequency as f32;
        let repeats = self.repeat_count as f32;
        EchoTaps {
            taps: (1..=self.repeat_count)
                .map(|k| EchoTap {
                    offset: (k as f32 * self.delay * rate).round() as usize + 1,
                    volume: 1.0 - k as f32 / (repeats + 1.0),
                })
                .collect(),
            tail_samples: (repeats * self.delay * rate).ceil() as usize,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chorus_gains_sum_to_one() {
        let passes = ChorusParams::default().passes();
        assert_eq!(passes.len(), 3);
        let total: f32 = passes.iter().map(|p| p.gain).sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(passes[1].semitones, 0.0);
    }

    #[test]
    fn no_repeats() {
        let taps = EchoParams {
            repeat_count: 0,
            delay: 0.3,
        }
        .taps(44100);
        assert_eq!(taps, EchoTaps::none());
    }

    #[test]
    fn tail_covers_last_tap() {
        let echo = EchoParams::default();
        let taps = echo.taps(44100);
        assert_eq!(taps.taps().len(), 10);
        assert_eq!(taps.tail_samples(), 44100);
        let last = taps.taps()[9];
        assert_eq!(last.offset, taps.tail_samples() + 1);
        assert!((last.volume - 1.0 / 11.0).abs() < 1e-6);
    }
}
