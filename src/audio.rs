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
use std::{error::Error, fmt};

pub mod buffer;
pub mod clip;
pub mod decibels;
pub mod mixer;
pub mod render;
pub mod source;
pub mod stream;

pub use buffer::{AudioBuffer, InterleavedBuffer, SampleContainer, SampleProvider};
pub use clip::{AudioClip, AudioClipSeries, Clip, ClipError, ClipSeries};
pub use mixer::{Mixer, MixerSource, PositionableMixerSource, SourceKey};
pub use source::{
    AudioSource, ChannelMask, MemorySource, PositionableSource, ReadRequest, SineWaveSource,
    SourceError, TransportSource,
};
pub use stream::StreamState;

/// An output that pulls samples from a source graph.
pub trait Device: fmt::Display + Send + Sync {
    /// Opens the source, pulls `length` samples from it block by block and closes it.
    fn play(&self, source: &dyn AudioSource, length: usize) -> Result<(), Box<dyn Error>>;
}
