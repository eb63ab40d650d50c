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

use parking_lot::Mutex;

use super::error::SourceError;
use super::traits::{AudioSource, PositionableSource, ReadRequest};
use crate::audio::buffer::{SampleContainer, SampleProvider};
use crate::audio::stream::StreamState;

/// Shared, read-only sample content.
pub type SharedSamples = Arc<dyn SampleProvider + Send + Sync>;

struct State {
    buffer: SharedSamples,
    stream: StreamState,
    position: i64,
}

/// A positionable source that plays back a block of samples held in memory.
/// Reading past either end of the content produces silence.
pub struct MemorySource {
    state: Mutex<State>,
}

impl MemorySource {
    /// Creates a new memory source over the given content.
    pub fn new(buffer: SharedSamples) -> Self {
        Self {
            state: Mutex::new(State {
                buffer,
                stream: StreamState::default(),
                position: 0,
            }),
        }
    }

    /// The content being played back.
    pub fn buffer(&self) -> SharedSamples {
        self.state.lock().buffer.clone()
    }

    /// Replaces the content and rewinds to the beginning.
    pub fn set_buffer(&self, buffer: SharedSamples) -> SharedSamples {
        let mut state = self.state.lock();
        state.position = 0;
        std::mem::replace(&mut state.buffer, buffer)
    }
}

impl AudioSource for MemorySource {
    fn open(&self, buffer_size: usize, sample_rate: f64) -> Result<(), SourceError> {
        self.state.lock().stream.open(buffer_size, sample_rate);
        Ok(())
    }

    fn close(&self) {
        self.state.lock().stream.close();
    }

    fn stream_state(&self) -> StreamState {
        self.state.lock().stream
    }

    fn read(&self, mut request: ReadRequest<'_>) -> usize {
        let mut state = self.state.lock();
        request.clear();

        let total = state.buffer.sample_count() as i64;
        let window_start = state.position;
        let window_end = window_start.saturating_add(request.length as i64);
        state.position = window_end;

        let from = window_start.max(0);
        let to = window_end.min(total);
        if from >= to {
            return 0;
        }

        let offset = (from - window_start) as usize;
        let count = (to - from) as usize;
        let channels = request
            .buffer
            .channel_count()
            .min(state.buffer.channel_count());
        for channel in 0..channels {
            if request.silent.contains(channel) {
                continue;
            }
            request.buffer.set_sample_range(
                channel,
                request.start + offset,
                count,
                &*state.buffer,
                channel,
                from as usize,
            );
        }
        count
    }
}

impl PositionableSource for MemorySource {
    fn length(&self) -> i64 {
        self.state.lock().buffer.sample_count() as i64
    }

    fn next_read_position(&self) -> i64 {
        self.state.lock().position
    }

    fn set_next_read_position(&self, position: i64) {
        self.state.lock().position = position;
    }
}
