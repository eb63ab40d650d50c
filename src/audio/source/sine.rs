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
use std::f64::consts::PI;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::SourceError;
use super::traits::{AudioSource, PositionableSource, ReadRequest, UNBOUNDED_LENGTH};
use crate::audio::buffer::{SampleContainer, SampleProvider};
use crate::audio::stream::StreamState;

/// The integral of the frequency (Hz) over time, measured in samples. The phase of
/// sample `x` is `2π · phase(x) / sample_rate`.
pub type PhaseFn = Arc<dyn Fn(i64) -> f64 + Send + Sync>;

struct State {
    phase: PhaseFn,
    amplitude: f32,
    stream: StreamState,
    position: i64,
}

/// An endless sine generator. Every unmasked channel receives the same signal.
pub struct SineWaveSource {
    state: Mutex<State>,
}

impl SineWaveSource {
    /// Creates a generator with a fixed frequency in Hz.
    pub fn new(frequency: f64) -> Self {
        Self::with_phase(fixed_frequency(frequency))
    }

    /// Creates a generator whose frequency changes over time.
    pub fn with_phase(phase: PhaseFn) -> Self {
        Self {
            state: Mutex::new(State {
                phase,
                amplitude: 1.0,
                stream: StreamState::default(),
                position: 0,
            }),
        }
    }

    pub fn set_frequency(&self, frequency: f64) {
        self.state.lock().phase = fixed_frequency(frequency);
    }

    pub fn set_phase(&self, phase: PhaseFn) {
        self.state.lock().phase = phase;
    }

    pub fn phase(&self) -> PhaseFn {
        self.state.lock().phase.clone()
    }

    /// Sets the peak amplitude as a linear gain.
    pub fn set_amplitude(&self, amplitude: f32) {
        self.state.lock().amplitude = amplitude;
    }

    pub fn amplitude(&self) -> f32 {
        self.state.lock().amplitude
    }
}

fn fixed_frequency(frequency: f64) -> PhaseFn {
    Arc::new(move |position| frequency * position as f64)
}

impl AudioSource for SineWaveSource {
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
        let position = state.position;
        state.position = position.saturating_add(request.length as i64);

        let sample_rate = state.stream.sample_rate();
        if !state.stream.is_open() || sample_rate <= 0.0 {
            request.clear();
            return 0;
        }

        request.clear_silent_channels();
        if request.silent.is_all() {
            return request.length;
        }

        let channels = request.buffer.channel_count();
        for i in 0..request.length {
            let phase = (state.phase)(position + i as i64);
            let sample = (2.0 * PI * phase / sample_rate).sin() as f32 * state.amplitude;
            for channel in 0..channels {
                if !request.silent.contains(channel) {
                    request.buffer.set_sample(channel, request.start + i, sample);
                }
            }
        }
        request.length
    }
}

impl PositionableSource for SineWaveSource {
    fn length(&self) -> i64 {
        UNBOUNDED_LENGTH
    }

    fn next_read_position(&self) -> i64 {
        self.state.lock().position
    }

    fn set_next_read_position(&self, position: i64) {
        self.state.lock().position = position;
    }
}
