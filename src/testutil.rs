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
use std::time::Duration;

use parking_lot::Mutex;

use crate::audio::buffer::{AudioBuffer, SampleContainer, SampleProvider};
use crate::audio::source::{
    AudioSource, MemorySource, PositionableSource, ReadRequest, SourceError,
};
use crate::audio::stream::StreamState;

/// A mono memory source whose sample `i` is `i as f32`, so a read shows which
/// content positions ended up where.
pub fn ramp_source(length: usize) -> Arc<MemorySource> {
    let samples = (0..length).map(|i| i as f32).collect();
    Arc::new(MemorySource::new(Arc::new(AudioBuffer::from_planar(vec![
        samples,
    ]))))
}

/// A memory source holding `value` on every channel for `length` samples.
pub fn constant_source(channels: usize, length: usize, value: f32) -> Arc<MemorySource> {
    Arc::new(MemorySource::new(Arc::new(AudioBuffer::from_planar(vec![
        vec![value; length];
        channels
    ]))))
}

/// Reads one block of `length` samples from `source` into a fresh buffer.
pub fn read_block(source: &dyn AudioSource, channels: usize, length: usize) -> (AudioBuffer, usize) {
    let mut buffer = AudioBuffer::new(channels, length);
    let produced = source.read(ReadRequest::whole(&mut buffer));
    (buffer, produced)
}

/// A read observed by a mock source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordedRead {
    pub position: i64,
    pub start: usize,
    pub length: usize,
    pub all_silent: bool,
}

#[derive(Default)]
struct MockState {
    stream: StreamState,
    position: i64,
    fail_open: bool,
    opens: usize,
    closes: usize,
    reads: Vec<RecordedRead>,
    seeks: Vec<i64>,
    read_delay: Duration,
}

/// A positionable source with a fixed value and length that records every call and
/// can be told to fail when opened.
pub struct MockSource {
    value: f32,
    length: i64,
    state: Mutex<MockState>,
}

impl MockSource {
    pub fn new(value: f32, length: i64) -> Self {
        Self {
            value,
            length,
            state: Mutex::new(MockState::default()),
        }
    }

    /// A mock that refuses to open.
    pub fn failing() -> Self {
        let mock = Self::new(0.0, 0);
        mock.set_fail_open(true);
        mock
    }

    pub fn set_fail_open(&self, fail_open: bool) {
        self.state.lock().fail_open = fail_open;
    }

    /// Makes every read sleep for `delay` first, with no lock held.
    pub fn set_read_delay(&self, delay: Duration) {
        self.state.lock().read_delay = delay;
    }

    pub fn opens(&self) -> usize {
        self.state.lock().opens
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    pub fn reads(&self) -> Vec<RecordedRead> {
        self.state.lock().reads.clone()
    }

    pub fn seeks(&self) -> Vec<i64> {
        self.state.lock().seeks.clone()
    }
}

impl AudioSource for MockSource {
    fn open(&self, buffer_size: usize, sample_rate: f64) -> Result<(), SourceError> {
        let mut state = self.state.lock();
        if state.fail_open {
            return Err(SourceError::OpenFailed("mock refused to open".to_string()));
        }
        state.opens += 1;
        state.stream.open(buffer_size, sample_rate);
        Ok(())
    }

    fn close(&self) {
        let mut state = self.state.lock();
        state.closes += 1;
        state.stream.close();
    }

    fn stream_state(&self) -> StreamState {
        self.state.lock().stream
    }

    fn read(&self, mut request: ReadRequest<'_>) -> usize {
        let delay = self.state.lock().read_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut state = self.state.lock();
        let position = state.position;
        state.reads.push(RecordedRead {
            position,
            start: request.start,
            length: request.length,
            all_silent: request.silent.is_all(),
        });
        state.position += request.length as i64;

        request.clear();
        let from = position.max(0);
        let to = (position + request.length as i64).min(self.length);
        if from >= to {
            return 0;
        }
        let offset = (from - position) as usize;
        for channel in 0..request.buffer.channel_count() {
            if request.silent.contains(channel) {
                continue;
            }
            for i in 0..(to - from) as usize {
                request
                    .buffer
                    .set_sample(channel, request.start + offset + i, self.value);
            }
        }
        (to - from) as usize
    }
}

impl PositionableSource for MockSource {
    fn length(&self) -> i64 {
        self.length
    }

    fn next_read_position(&self) -> i64 {
        self.state.lock().position
    }

    fn set_next_read_position(&self, position: i64) {
        let mut state = self.state.lock();
        state.position = position;
        state.seeks.push(position);
    }
}
