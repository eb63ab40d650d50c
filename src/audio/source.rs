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
pub mod error;
pub mod memory;
pub mod sine;
pub mod traits;
pub mod transport;

#[cfg(test)]
mod tests;

pub use error::SourceError;
pub use memory::{MemorySource, SharedSamples};
pub use sine::{PhaseFn, SineWaveSource};
pub use traits::{
    AudioSource, ChannelMask, PositionableSource, ReadRequest, UNBOUNDED_LENGTH,
};
pub use transport::{PlaybackStatus, TransportSource};
