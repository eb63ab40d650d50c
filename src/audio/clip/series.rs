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
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use super::error::ClipError;
use super::Clip;
use crate::audio::source::traits::source_id;

/// Clips on a timeline with pairwise disjoint intervals.
///
/// Because no two clips overlap, ordering clips by start position also orders them
/// by end position, so a map keyed by start works as an interval index: the clips
/// overlapping `[start, end)` are the last clip starting before `start` (if it
/// reaches past `start`) followed by every clip starting inside the range. End
/// positions are kept in a counted multiset so the effective length is the last
/// key. A secondary index maps content to the positions of clips that use it.
pub struct ClipSeries<T: ?Sized> {
    clips: BTreeMap<i64, Clip<T>>,
    ends: BTreeMap<i64, usize>,
    by_content: HashMap<usize, BTreeSet<i64>>,
}

impl<T: ?Sized> Default for ClipSeries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> ClipSeries<T> {
    pub fn new() -> Self {
        Self {
            clips: BTreeMap::new(),
            ends: BTreeMap::new(),
            by_content: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Adds a clip. Fails without changing anything if the clip is empty, starts
    /// before 0, runs off the end of the timeline or overlaps an existing clip.
    pub fn add_clip(&mut self, clip: Clip<T>) -> Result<(), ClipError> {
        let end = check_range(clip.position, clip.length)?;
        if self.overlapping(clip.position, end).next().is_some() {
            return Err(ClipError::Overlap {
                position: clip.position,
                end,
            });
        }
        self.insert(clip);
        Ok(())
    }

    /// The clip covering `position`.
    pub fn find_clip_at(&self, position: i64) -> Option<&Clip<T>> {
        self.clips
            .range(..=position)
            .next_back()
            .map(|(_, clip)| clip)
            .filter(|clip| clip.contains(position))
    }

    /// The earliest clip playing `content`.
    pub fn find_clip_by_content(&self, content: &Arc<T>) -> Option<&Clip<T>> {
        self.by_content
            .get(&source_id(content))
            .and_then(|positions| positions.first())
            .and_then(|position| self.clips.get(position))
    }

    /// Whether any clip plays `content`.
    pub fn contains_content(&self, content: &Arc<T>) -> bool {
        self.by_content.contains_key(&source_id(content))
    }

    /// Removes the clip covering `position`.
    pub fn remove_clip_at(&mut self, position: i64) -> Option<Clip<T>> {
        let start = self.find_clip_at(position)?.position;
        self.take(start)
    }

    /// Removes every clip, returning them in timeline order.
    pub fn clear_clips(&mut self) -> Vec<Clip<T>> {
        self.ends.clear();
        self.by_content.clear();
        std::mem::take(&mut self.clips).into_values().collect()
    }

    /// Moves and resizes the clip covering `at`. The content and content start are
    /// kept. Fails without changing anything if the new range is invalid or overlaps
    /// another clip.
    pub fn set_clip_range(&mut self, at: i64, position: i64, length: i64) -> Result<(), ClipError> {
        let start = self
            .find_clip_at(at)
            .ok_or(ClipError::NotFound(at))?
            .position;
        let end = check_range(position, length)?;
        if self
            .overlapping(position, end)
            .any(|clip| clip.position != start)
        {
            return Err(ClipError::Overlap { position, end });
        }
        if let Some(clip) = self.take(start) {
            self.insert(clip.with_range(position, length));
        }
        Ok(())
    }

    /// Changes where in its content the clip covering `at` starts playing.
    pub fn set_clip_content_start(&mut self, at: i64, content_start: i64) -> Result<(), ClipError> {
        let start = self
            .find_clip_at(at)
            .ok_or(ClipError::NotFound(at))?
            .position;
        if let Some(clip) = self.clips.get_mut(&start) {
            clip.content_start = content_start;
        }
        Ok(())
    }

    /// The end of the last clip, 0 when empty.
    pub fn effective_length(&self) -> i64 {
        self.ends.keys().next_back().copied().unwrap_or(0)
    }

    /// Every clip in timeline order.
    pub fn clips(&self) -> impl Iterator<Item = &Clip<T>> + '_ {
        self.clips.values()
    }

    /// The clips intersecting `[start, end)` in timeline order.
    pub fn overlapping(&self, start: i64, end: i64) -> impl Iterator<Item = &Clip<T>> + '_ {
        let (before, inside) = if end <= start {
            (None, None)
        } else {
            let before = self
                .clips
                .range(..start)
                .next_back()
                .map(|(_, clip)| clip)
                .filter(|clip| clip.end_position() > start);
            (before, Some(self.clips.range(start..end).map(|(_, clip)| clip)))
        };
        before.into_iter().chain(inside.into_iter().flatten())
    }

    fn insert(&mut self, clip: Clip<T>) {
        *self.ends.entry(clip.end_position()).or_insert(0) += 1;
        self.by_content
            .entry(source_id(&clip.content))
            .or_default()
            .insert(clip.position);
        self.clips.insert(clip.position, clip);
    }

    fn take(&mut self, start: i64) -> Option<Clip<T>> {
        let clip = self.clips.remove(&start)?;
        let end = clip.end_position();
        if let Some(count) = self.ends.get_mut(&end) {
            *count -= 1;
            if *count == 0 {
                self.ends.remove(&end);
            }
        }
        let id = source_id(&clip.content);
        if let Some(positions) = self.by_content.get_mut(&id) {
            positions.remove(&start);
            if positions.is_empty() {
                self.by_content.remove(&id);
            }
        }
        Some(clip)
    }
}

fn check_range(position: i64, length: i64) -> Result<i64, ClipError> {
    if length <= 0 {
        return Err(ClipError::InvalidLength(length));
    }
    if position < 0 {
        return Err(ClipError::InvalidPosition(position));
    }
    position
        .checked_add(length)
        .ok_or(ClipError::RangeOverflow { position, length })
}
