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

/// Error types for clip placement.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClipError {
    #[error("Clip [{position}, {end}) overlaps an existing clip")]
    Overlap { position: i64, end: i64 },

    #[error("Invalid clip length {0}")]
    InvalidLength(i64),

    #[error("Invalid clip position {0}")]
    InvalidPosition(i64),

    #[error("Clip at {position} with length {length} overflows the timeline")]
    RangeOverflow { position: i64, length: i64 },

    #[error("No clip at position {0}")]
    NotFound(i64),
}
