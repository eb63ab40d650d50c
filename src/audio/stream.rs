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
use std::fmt;

/// The negotiated stream parameters of a source. A closed stream always reports a
/// buffer size and sample rate of zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StreamState {
    buffer_size: usize,
    sample_rate: f64,
    is_open: bool,
}

impl StreamState {
    /// Opens the stream. An already open stream is closed first.
    pub fn open(&mut self, buffer_size: usize, sample_rate: f64) {
        self.close();
        self.buffer_size = buffer_size;
        self.sample_rate = sample_rate.max(0.0);
        self.is_open = true;
    }

    /// Closes the stream and resets the negotiated parameters.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// The maximum block size a reader will request while open.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// The sample rate negotiated at open.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open {
            write!(f, "open ({} samples @ {}Hz)", self.buffer_size, self.sample_rate)
        } else {
            write!(f, "closed")
        }
    }
}
