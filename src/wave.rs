// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This is the namespace for all parts dealing with data in sampled waves.

use std::ops;

/// The fully rendered samples of a single note, in mono.
///
/// Samples are nominally in the range [-1, 1], the sample rate is the one of the
/// request that produced the wave.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteWave {
    samples: Vec<f32>,
}

impl NoteWave {
    /// A silent wave of the given length.
    pub fn silent(sample_count: usize) -> Self {
        Self {
            samples: vec![0.0; sample_count],
        }
    }

    /// Size of the wave in samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Size of the wave in bytes when written as `f32` samples.
    pub fn byte_len(&self) -> usize {
        self.len() * std::mem::size_of::<f32>()
    }

    /// Duration of the wave in seconds at the given sample rate.
    ///
    /// ```
    /// # use note_forge::wave::*;
    /// assert_eq!(NoteWave::silent(4000).duration(8000), 0.5);
    /// ```
    pub fn duration(&self, sampling_frequency: u32) -> f64 {
        self.len() as f64 / sampling_frequency as f64
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.samples.iter()
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Largest absolute sample value, zero for an empty wave.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Copy the `f32` samples to little endian bytes.
    ///
    /// Returns the number of samples that were actually copied.
    /// Might be less than the number of samples if the output buffer was not large enough.
    pub fn copy_bytes_to(&self, bytes: &mut [u8]) -> usize {
        let mut processed = 0;
        for (sample, target) in self.samples.iter().zip(bytes.chunks_exact_mut(4)) {
            target.copy_from_slice(&sample.to_le_bytes());
            processed += 1;
        }
        processed
    }
}

impl From<Vec<f32>> for NoteWave {
    fn from(samples: Vec<f32>) -> Self {
        Self { samples }
    }
}

impl ops::Index<usize> for NoteWave {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.samples[index]
    }
}

impl ops::IndexMut<usize> for NoteWave {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.samples[index]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn byte_copy() {
        let wave = NoteWave::from(vec![0.5, -1.0, 0.25]);
        let mut bytes = vec![0u8; wave.byte_len()];
        assert_eq!(wave.copy_bytes_to(&mut bytes), 3);
        assert_eq!(&bytes[4..8], &(-1.0f32).to_le_bytes());

        // a buffer that is too small only receives the samples that fit
        let mut short = vec![0u8; 6];
        assert_eq!(wave.copy_bytes_to(&mut short), 1);
    }

    #[test]
    fn peak() {
        assert_eq!(NoteWave::silent(0).peak(), 0.0);
        assert_eq!(NoteWave::from(vec![0.5, -0.75, 0.25]).peak(), 0.75);
    }
}
