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
use tracing::{debug, warn};

use super::{Clip, ClipSeries};
use crate::audio::source::{
    AudioSource, PositionableSource, ReadRequest, SourceError, UNBOUNDED_LENGTH,
};
use crate::audio::stream::StreamState;

/// A clip whose content is a positionable source.
pub type AudioClip = Clip<dyn PositionableSource>;

struct State {
    series: ClipSeries<dyn PositionableSource>,
    stream: StreamState,
    position: i64,
}

/// One content read gathered for a block.
struct ClipRead {
    content: Arc<dyn PositionableSource>,
    content_position: i64,
    offset: usize,
    length: usize,
}

/// Plays clips of positionable content placed on a timeline. Positions outside
/// every clip are silent.
///
/// Reads gather the visible part of every clip under the state lock, then seek
/// and read each content with the lock released.
pub struct AudioClipSeries {
    state: Mutex<State>,
    dispatch: Mutex<Vec<ClipRead>>,
}

impl Default for AudioClipSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClipSeries {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                series: ClipSeries::new(),
                stream: StreamState::default(),
                position: 0,
            }),
            dispatch: Mutex::new(Vec::new()),
        }
    }

    /// Places a clip. When the series is open the content is opened as well, and if
    /// that fails the clip is taken back out.
    pub fn add_clip(&self, clip: AudioClip) -> Result<(), SourceError> {
        let mut state = self.state.lock();
        let position = clip.position();
        let content = clip.content().clone();
        state.series.add_clip(clip)?;

        if state.stream.is_open() {
            let stream = state.stream;
            if let Err(e) = content.open(stream.buffer_size(), stream.sample_rate()) {
                warn!(
                    position,
                    err = e.to_string(),
                    "Clip content failed to open, removing clip"
                );
                state.series.remove_clip_at(position);
                return Err(e);
            }
        }
        debug!(
            position,
            clips = state.series.len(),
            "Added clip"
        );
        Ok(())
    }

    pub fn find_clip_at(&self, position: i64) -> Option<AudioClip> {
        self.state.lock().series.find_clip_at(position).cloned()
    }

    pub fn find_clip_by_content(&self, content: &Arc<dyn PositionableSource>) -> Option<AudioClip> {
        self.state
            .lock()
            .series
            .find_clip_by_content(content)
            .cloned()
    }

    /// Removes the clip covering `position`. Its content is closed unless another
    /// clip still plays it.
    pub fn remove_clip_at(&self, position: i64) -> Option<AudioClip> {
        let mut state = self.state.lock();
        let clip = state.series.remove_clip_at(position)?;
        if !state.series.contains_content(clip.content()) {
            clip.content().close();
        }
        debug!(position = clip.position(), "Removed clip");
        Some(clip)
    }

    /// Removes every clip and closes their content.
    pub fn clear_clips(&self) {
        let mut state = self.state.lock();
        let clips = state.series.clear_clips();
        for clip in &clips {
            clip.content().close();
        }
        debug!(removed = clips.len(), "Cleared clips");
    }

    /// Moves and resizes the clip covering `at`.
    pub fn set_clip_range(&self, at: i64, position: i64, length: i64) -> Result<(), SourceError> {
        Ok(self.state.lock().series.set_clip_range(at, position, length)?)
    }

    /// Changes where in its content the clip covering `at` starts playing.
    pub fn set_clip_content_start(&self, at: i64, content_start: i64) -> Result<(), SourceError> {
        Ok(self
            .state
            .lock()
            .series
            .set_clip_content_start(at, content_start)?)
    }

    /// Every clip in timeline order.
    pub fn clips(&self) -> Vec<AudioClip> {
        self.state.lock().series.clips().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().series.is_empty()
    }

    /// The end of the last clip, 0 when empty.
    pub fn effective_length(&self) -> i64 {
        self.state.lock().series.effective_length()
    }
}

impl AudioSource for AudioClipSeries {
    fn open(&self, buffer_size: usize, sample_rate: f64) -> Result<(), SourceError> {
        let mut state = self.state.lock();
        state.stream.close();
        for clip in state.series.clips() {
            if let Err(e) = clip.content().open(buffer_size, sample_rate) {
                warn!(
                    position = clip.position(),
                    err = e.to_string(),
                    "Clip content failed to open"
                );
                return Err(e);
            }
        }
        state.stream.open(buffer_size, sample_rate);
        debug!(buffer_size, sample_rate, clips = state.series.len(), "Clip series opened");
        Ok(())
    }

    fn close(&self) {
        let mut state = self.state.lock();
        for clip in state.series.clips() {
            clip.content().close();
        }
        state.stream.close();
    }

    fn stream_state(&self) -> StreamState {
        self.state.lock().stream
    }

    fn read(&self, mut request: ReadRequest<'_>) -> usize {
        let mut reads = self.dispatch.lock();
        {
            let mut state = self.state.lock();
            let window_start = state.position;
            let window_end = window_start.saturating_add(request.length as i64);
            state.position = window_end;

            for clip in state.series.overlapping(window_start, window_end) {
                let head_cut = (window_start - clip.position()).max(0);
                let tail_cut = (clip.end_position() - window_end).max(0);
                let visible = clip.length() - head_cut - tail_cut;
                if visible <= 0 {
                    continue;
                }
                reads.push(ClipRead {
                    content: clip.content().clone(),
                    content_position: clip.content_start() + head_cut,
                    offset: (clip.position() - window_start).max(0) as usize,
                    length: visible as usize,
                });
            }
        }

        request.clear();
        for read in reads.drain(..) {
            read.content.set_next_read_position(read.content_position);
            read.content.read(request.sub(read.offset, read.length));
        }
        request.length
    }
}

impl PositionableSource for AudioClipSeries {
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
