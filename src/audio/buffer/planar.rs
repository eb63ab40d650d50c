// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use super::traits::{SampleContainer, SampleProvider};

/// An owned buffer in planar format: all samples for channel 0, then all samples
/// for channel 1, etc. Every channel is contiguous, so all range operations take
/// the slice fast path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_count: usize,
}

impl AudioBuffer {
    /// Creates a silent buffer with the given dimensions.
    pub fn new(channel_count: usize, sample_count: usize) -> Self {
        Self {
            channels: vec![vec![0.0; sample_count]; channel_count],
            sample_count,
        }
    }

    /// Creates a buffer from planar channel data. All channels must have the same length.
    pub fn from_planar(channels: Vec<Vec<f32>>) -> Self {
        let sample_count = channels.first().map(|c| c.len()).unwrap_or(0);
        assert!(
            channels.iter().all(|c| c.len() == sample_count),
            "all channels must have the same length"
        );
        Self {
            channels,
            sample_count,
        }
    }

    /// Creates a buffer from interleaved samples (L, R, L, R, ...). Trailing samples
    /// that do not make up a whole frame are dropped.
    pub fn from_interleaved(interleaved: &[f32], channel_count: usize) -> Self {
        if channel_count == 0 {
            return Self::default();
        }
        let sample_count = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(sample_count); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (channel, sample) in channels.iter_mut().zip(frame) {
                channel.push(*sample);
            }
        }
        Self {
            channels,
            sample_count,
        }
    }

    /// Copies any sample provider into a new planar buffer.
    pub fn from_provider(src: &dyn SampleProvider) -> Self {
        let mut buffer = Self::new(src.channel_count(), src.sample_count());
        buffer.set_samples_from(src);
        buffer
    }

    /// Resizes the buffer. Existing samples inside the new dimensions are kept and
    /// new space is silent.
    pub fn resize(&mut self, channel_count: usize, sample_count: usize) {
        self.channels.resize_with(channel_count, Vec::new);
        for channel in self.channels.iter_mut() {
            channel.resize(sample_count, 0.0);
        }
        self.sample_count = sample_count;
    }

    /// Gets the samples of one channel.
    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.channels[channel]
    }

    /// Gets the mutable samples of one channel.
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        &mut self.channels[channel]
    }

    /// Returns the samples interleaved frame by frame.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut interleaved = Vec::with_capacity(self.sample_count * self.channels.len());
        for frame in 0..self.sample_count {
            for channel in &self.channels {
                interleaved.push(channel[frame]);
            }
        }
        interleaved
    }
}

impl SampleProvider for AudioBuffer {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn sample_count(&self) -> usize {
        self.sample_count
    }

    fn sample(&self, channel: usize, position: usize) -> f32 {
        debug_assert!(position < self.sample_count);
        self.channels[channel][position]
    }

    fn is_continuous(&self) -> bool {
        true
    }

    fn read_slice(&self, channel: usize, start: usize) -> Option<&[f32]> {
        self.channels.get(channel).and_then(|c| c.get(start..))
    }
}

impl SampleContainer for AudioBuffer {
    fn set_sample(&mut self, channel: usize, position: usize, value: f32) {
        debug_assert!(position < self.sample_count);
        self.channels[channel][position] = value;
    }

    fn write_slice(&mut self, channel: usize, start: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(channel).and_then(|c| c.get_mut(start..))
    }
}
