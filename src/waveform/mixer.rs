// note-forge -- procedural note synthesis for chiptune instruments
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Layering several waveforms into one composite shape.

use super::{Phase, WaveformSpec};
use crate::noise::NoiseSource;

/// One layer of a composite waveform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedWaveform {
    pub waveform: WaveformSpec,
    /// Relative contribution, must not be negative.
    pub weight: f32,
}

impl WeightedWaveform {
    pub fn new(waveform: WaveformSpec, weight: f32) -> Self {
        Self { waveform, weight }
    }
}

/// A normalized weighted average of several waveforms.
///
/// Mixing never leaves the amplitude range of the layers, no matter how many
/// layers are added.
///
/// # Example
///
/// ```
/// use note_forge::waveform::*;
///
/// let mut mixer = WaveformMixer::new();
/// mixer.push(WeightedWaveform::new(WaveformSpec::new(WaveformKind::Square), 3.0));
/// mixer.push(WeightedWaveform::new(WaveformSpec::new(WaveformKind::Sawtooth), 1.0));
/// // 3/4 of a square at +1 and 1/4 of a saw at +0.5
/// assert_eq!(mixer.amplitude(0.25), 0.875);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveformMixer {
    layers: Vec<WeightedWaveform>,
}

impl WaveformMixer {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append a layer, keeping the insertion order.
    pub fn push(&mut self, layer: WeightedWaveform) {
        self.layers.push(layer);
    }

    pub fn remove(&mut self, index: usize) -> Option<WeightedWaveform> {
        if index < self.layers.len() {
            Some(self.layers.remove(index))
        } else {
            None
        }
    }

    pub fn layers(&self) -> &[WeightedWaveform] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [WeightedWaveform] {
        &mut self.layers
    }

    pub fn total_weight(&self) -> f32 {
        self.layers.iter().map(|layer| layer.weight).sum()
    }

    /// Clean amplitude at `phase`, zero if all weights are zero.
    pub fn amplitude(&self, phase: f32) -> f32 {
        self.weighted(|_, waveform| waveform.amplitude(phase))
    }

    /// Amplitude at `phase` with each layer roughened by its own noise amount.
    pub fn amplitude_with_noise(&self, phase: f32, noise: &mut NoiseSource) -> f32 {
        self.weighted(|_, waveform| waveform.amplitude_with_noise(phase, noise))
    }

    /// Mix the layers where every layer has advanced to its own phase.
    ///
    /// `phases` holds one entry per layer and already includes the phase offsets.
    /// Only layers with an audible noise amount draw from `noise`.
    pub fn sample_layers(&self, phases: &[Phase], noise: &mut NoiseSource) -> f32 {
        debug_assert_eq!(phases.len(), self.layers.len());
        self.weighted(|index, waveform| {
            let clean = waveform.kind.amplitude(phases[index].offset());
            if waveform.is_noisy() {
                super::blend_noise(clean, waveform.noise, noise)
            } else {
                clean
            }
        })
    }

    fn weighted<F: FnMut(usize, &WaveformSpec) -> f32>(&self, mut component: F) -> f32 {
        let total_weight = self.total_weight();
        if total_weight == 0.0 {
            return 0.0;
        }
        self.layers
            .iter()
            .enumerate()
            .map(|(index, layer)| component(index, &layer.waveform) * layer.weight / total_weight)
            .sum()
    }
}

impl std::iter::FromIterator<WeightedWaveform> for WaveformMixer {
    fn from_iter<I: IntoIterator<Item = WeightedWaveform>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}
