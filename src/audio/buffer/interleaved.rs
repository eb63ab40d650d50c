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

/// A view over a borrowed interleaved block (L, R, L, R, ...), which is the layout
/// an output device callback hands over. Only a mono view is continuous; anything
/// wider goes through the per-sample paths.
pub struct InterleavedBuffer<'a> {
    data: &'a mut [f32],
    channel_count: usize,
    sample_count: usize,
}

impl<'a> InterleavedBuffer<'a> {
    /// Wraps `data` as `channel_count` interleaved channels. Trailing samples that
    /// do not make up a whole frame are not addressable.
    pub fn new(data: &'a mut [f32], channel_count: usize) -> Self {
        let sample_count = if channel_count == 0 {
            0
        } else {
            data.len() / channel_count
        };
        Self {
            data,
            channel_count,
            sample_count,
        }
    }

    /// The underlying interleaved samples.
    pub fn data(&self) -> &[f32] {
        &self.data[..]
    }

    #[inline]
    fn index(&self, channel: usize, position: usize) -> usize {
        debug_assert!(channel < self.channel_count && position < self.sample_count);
        position * self.channel_count + channel
    }
}

impl SampleProvider for InterleavedBuffer<'_> {
    fn channel_count(&self) -> usize {
        self.channel_count
    }

    fn sample_count(&self) -> usize {
        self.sample_count
    }

    fn sample(&self, channel: usize, position: usize) -> f32 {
        self.data[self.index(channel, position)]
    }

    fn is_continuous(&self) -> bool {
        self.channel_count == 1
    }

    fn read_slice(&self, channel: usize, start: usize) -> Option<&[f32]> {
        if self.channel_count == 1 && channel == 0 {
            self.data.get(start..self.sample_count)
        } else {
            None
        }
    }
}

impl SampleContainer for InterleavedBuffer<'_> {
    fn set_sample(&mut self, channel: usize, position: usize, value: f32) {
        let index = self.index(channel, position);
        self.data[index] = value;
    }

    fn write_slice(&mut self, channel: usize, start: usize) -> Option<&mut [f32]> {
        if self.channel_count == 1 && channel == 0 {
            let end = self.sample_count;
            self.data.get_mut(start..end)
        } else {
            None
        }
    }
}
