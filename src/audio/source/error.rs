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
use crate::audio::clip::ClipError;

/// Error types for source graph operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source failed to open: {0}")]
    OpenFailed(String),

    #[error("Source is already part of this mixer")]
    DuplicateSource,

    #[error("A mixer cannot be added to itself")]
    SelfReference,

    #[error("Unknown source handle")]
    UnknownHandle,

    #[error("Clip error: {0}")]
    Clip(#[from] ClipError),
}
