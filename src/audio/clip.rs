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
use std::sync::Arc;

pub mod audio;
pub mod error;
pub mod series;


pub use audio::{AudioClip, AudioClipSeries};
pub use error::ClipError;
pub use series::ClipSeries;

/// A segment of content placed on the timeline. The clip covers the half-open
/// interval `[position, position + length)` and plays its content starting at
/// `content_start`.
pub struct Clip<T: ?Sized> {
    position: i64,
    content: Arc<T>,
    content_start: i64,
    length: i64,
}

impl<T: ?Sized> Clip<T> {
    pub fn new(position: i64, content: Arc<T>, content_start: i64, length: i64) -> Self {
        Self {
            position,
            content,
            content_start,
            length,
        }
    }

    /// First timeline position covered by the clip.
    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn content(&self) -> &Arc<T> {
        &self.content
    }

    /// Position within the content that plays at the clip's start.
    pub fn content_start(&self) -> i64 {
        self.content_start
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    /// First timeline position after the clip.
    pub fn end_position(&self) -> i64 {
        self.position + self.length
    }

    pub fn contains(&self, position: i64) -> bool {
        position >= self.position && position < self.end_position()
    }

    fn with_range(&self, position: i64, length: i64) -> Self {
        Self {
            position,
            content: self.content.clone(),
            content_start: self.content_start,
            length,
        }
    }
}

impl<T: ?Sized> Clone for Clip<T> {
    fn clone(&self) -> Self {
        self.with_range(self.position, self.length)
    }
}

impl<T: ?Sized> fmt::Debug for Clip<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("position", &self.position)
            .field("content_start", &self.content_start)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
