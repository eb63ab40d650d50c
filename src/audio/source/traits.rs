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
use std::sync::Arc;

use super::error::SourceError;
use crate::audio::buffer::{SampleContainer, SampleProvider};
use crate::audio::stream::StreamState;

/// The length reported by sources that never run out of samples.
pub const UNBOUNDED_LENGTH: i64 = i64::MAX;

/// A set of channels that must be written as silence. Channels 64 and above can't
/// be masked individually and are only covered by `ALL`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelMask(u64);

impl ChannelMask {
    pub const NONE: ChannelMask = ChannelMask(0);
    pub const ALL: ChannelMask = ChannelMask(u64::MAX);

    /// Creates a mask from raw bits, bit `i` silencing channel `i`.
    pub const fn from_bits(bits: u64) -> Self {
        ChannelMask(bits)
    }

    /// Creates a mask silencing the given channels.
    pub fn from_channels(channels: &[usize]) -> Self {
        channels
            .iter()
            .fold(Self::NONE, |mask, channel| mask.with(*channel))
    }

    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Returns this mask with `channel` added.
    pub fn with(self, channel: usize) -> Self {
        if channel < 64 {
            ChannelMask(self.0 | (1 << channel))
        } else {
            self
        }
    }

    /// Whether `channel` is silenced.
    pub fn contains(&self, channel: usize) -> bool {
        if self.is_all() {
            return true;
        }
        channel < 64 && self.0 & (1 << channel) != 0
    }

    pub fn is_all(&self) -> bool {
        self.0 == u64::MAX
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// A single block read: `length` samples per channel written into `buffer`
/// starting at `start`.
pub struct ReadRequest<'a> {
    pub buffer: &'a mut dyn SampleContainer,
    pub start: usize,
    pub length: usize,
    pub silent: ChannelMask,
}

impl<'a> ReadRequest<'a> {
    /// Creates a request for `[start, start + length)` of every channel. Panics if
    /// the range doesn't fit the buffer.
    #[track_caller]
    pub fn new(buffer: &'a mut dyn SampleContainer, start: usize, length: usize) -> Self {
        assert!(
            start
                .checked_add(length)
                .is_some_and(|end| end <= buffer.sample_count()),
            "read range {}+{} out of range (sample count {})",
            start,
            length,
            buffer.sample_count()
        );
        Self {
            buffer,
            start,
            length,
            silent: ChannelMask::NONE,
        }
    }

    /// Creates a request covering the whole buffer.
    pub fn whole(buffer: &'a mut dyn SampleContainer) -> Self {
        let length = buffer.sample_count();
        Self::new(buffer, 0, length)
    }

    /// Sets the channels that must be written as silence.
    pub fn with_silent(mut self, silent: ChannelMask) -> Self {
        self.silent = silent;
        self
    }

    /// Borrows a sub-range of this request, relative to its start, with the same mask.
    pub fn sub(&mut self, offset: usize, length: usize) -> ReadRequest<'_> {
        ReadRequest::new(&mut *self.buffer, self.start + offset, length).with_silent(self.silent)
    }

    pub fn channel_count(&self) -> usize {
        self.buffer.channel_count()
    }

    /// Zeroes the requested range on every channel.
    pub fn clear(&mut self) {
        for channel in 0..self.buffer.channel_count() {
            self.buffer.clear_range(channel, self.start, self.length);
        }
    }

    /// Zeroes the requested range on the masked channels.
    pub fn clear_silent_channels(&mut self) {
        if self.silent.is_empty() {
            return;
        }
        for channel in 0..self.buffer.channel_count() {
            if self.silent.contains(channel) {
                self.buffer.clear_range(channel, self.start, self.length);
            }
        }
    }
}

/// A node in the source graph. Sources are pulled by a single real-time reader
/// while a control thread mutates them, so every method takes `&self` and each
/// implementation guards its own state.
pub trait AudioSource: Send + Sync {
    /// Opens the source for blocks of up to `buffer_size` samples. Opening an open
    /// source closes it first.
    fn open(&self, buffer_size: usize, sample_rate: f64) -> Result<(), SourceError>;

    /// Closes the source. Closing a closed source does nothing.
    fn close(&self);

    /// The current stream parameters.
    fn stream_state(&self) -> StreamState;

    fn is_open(&self) -> bool {
        self.stream_state().is_open()
    }

    /// Writes exactly `request.length` samples to every channel of the request and
    /// returns how many of them were produced rather than padded with silence.
    fn read(&self, request: ReadRequest<'_>) -> usize;
}

/// A source with a read cursor that can be moved.
///
/// Every read advances the cursor by the requested length, even when the source
/// ran out of content. Wrappers push a new position to all of their children
/// before returning from `set_next_read_position`.
pub trait PositionableSource: AudioSource {
    /// Total addressable samples, `UNBOUNDED_LENGTH` for endless sources.
    fn length(&self) -> i64;

    /// Position of the next sample a read will produce.
    fn next_read_position(&self) -> i64;

    fn set_next_read_position(&self, position: i64);
}

/// The pointer identity of a shared source, used to detect duplicates.
pub(crate) fn source_id<S: ?Sized>(source: &Arc<S>) -> usize {
    Arc::as_ptr(source) as *const () as usize
}
