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
use std::ops::Range;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::error::SourceError;
use super::traits::{AudioSource, PositionableSource, ReadRequest};
use crate::audio::stream::StreamState;

/// Playback status of a transport. The "about to" states are requests made by the
/// control thread that take effect at the start of the next block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    Paused,
    AboutToPlay,
    Playing,
    AboutToPause,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::AboutToPlay => "about to play",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::AboutToPause => "about to pause",
        };
        write!(f, "{}", name)
    }
}

struct Status {
    playback: PlaybackStatus,
    buffering: usize,
    loop_range: Option<Range<i64>>,
}

/// One contiguous read of the source within a block.
struct Chunk {
    offset: usize,
    length: usize,
    seek_after: Option<i64>,
}

struct Playhead {
    source: Option<Arc<dyn PositionableSource>>,
    owned: bool,
    stream: StreamState,
    position: i64,
}

/// Drives a positionable source as a timeline: playing, pausing, seeking and looping.
///
/// A transport is not itself positionable. While paused or buffering it produces
/// silence and holds its playhead.
///
/// Locks are taken dispatch, then playhead, then status. Only `dispatch` is held
/// while the source is read.
pub struct TransportSource {
    playhead: Mutex<Playhead>,
    status: Mutex<Status>,
    dispatch: Mutex<Vec<Chunk>>,
}

impl Default for TransportSource {
    fn default() -> Self {
        Self {
            playhead: Mutex::new(Playhead {
                source: None,
                owned: false,
                stream: StreamState::default(),
                position: 0,
            }),
            status: Mutex::new(Status {
                playback: PlaybackStatus::Paused,
                buffering: 0,
                loop_range: None,
            }),
            dispatch: Mutex::new(Vec::new()),
        }
    }
}

impl TransportSource {
    /// Creates a paused transport over `source`.
    pub fn new(source: Arc<dyn PositionableSource>, owned: bool) -> Self {
        let transport = Self::default();
        {
            let mut playhead = transport.playhead.lock();
            source.set_next_read_position(0);
            playhead.source = Some(source);
            playhead.owned = owned;
        }
        transport
    }

    /// Replaces the source. The previous source is closed if the transport owned it,
    /// and the new one is opened if the transport is open. On failure the previous
    /// source is kept.
    pub fn set_source(
        &self,
        source: Option<Arc<dyn PositionableSource>>,
        owned: bool,
    ) -> Result<(), SourceError> {
        let mut playhead = self.playhead.lock();
        if let Some(source) = &source {
            if playhead.stream.is_open() {
                source.open(playhead.stream.buffer_size(), playhead.stream.sample_rate())?;
            }
            source.set_next_read_position(playhead.position);
        }
        let previous = std::mem::replace(&mut playhead.source, source);
        let previous_owned = std::mem::replace(&mut playhead.owned, owned);
        if let Some(previous) = previous {
            if previous_owned {
                previous.close();
            }
        }
        debug!(has_source = playhead.source.is_some(), "Transport source replaced.");
        Ok(())
    }

    pub fn source(&self) -> Option<Arc<dyn PositionableSource>> {
        self.playhead.lock().source.clone()
    }

    /// Requests playback from the next block.
    pub fn play(&self) {
        let mut status = self.status.lock();
        status.playback = match status.playback {
            PlaybackStatus::Paused => PlaybackStatus::AboutToPlay,
            PlaybackStatus::AboutToPause => PlaybackStatus::Playing,
            other => other,
        };
    }

    /// Requests a pause from the next block.
    pub fn pause(&self) {
        let mut status = self.status.lock();
        status.playback = match status.playback {
            PlaybackStatus::Playing => PlaybackStatus::AboutToPause,
            PlaybackStatus::AboutToPlay => PlaybackStatus::Paused,
            other => other,
        };
    }

    pub fn playback_status(&self) -> PlaybackStatus {
        self.status.lock().playback
    }

    /// Whether playback is running or has been requested.
    pub fn is_playing(&self) -> bool {
        matches!(
            self.status.lock().playback,
            PlaybackStatus::Playing | PlaybackStatus::AboutToPlay
        )
    }

    /// The playhead position.
    pub fn position(&self) -> i64 {
        self.playhead.lock().position
    }

    /// Moves the playhead and seeks the source to match.
    pub fn set_position(&self, position: i64) {
        let mut playhead = self.playhead.lock();
        playhead.position = position;
        if let Some(source) = &playhead.source {
            source.set_next_read_position(position);
        }
    }

    /// The source's length, 0 without a source.
    pub fn length(&self) -> i64 {
        self.playhead
            .lock()
            .source
            .as_ref()
            .map(|source| source.length())
            .unwrap_or(0)
    }

    pub fn loop_range(&self) -> Option<Range<i64>> {
        self.status.lock().loop_range.clone()
    }

    /// Sets the looping range. An empty range disables looping.
    pub fn set_loop_range(&self, range: Option<Range<i64>>) {
        self.status.lock().loop_range = range.filter(|r| r.start < r.end);
    }

    /// Holds playback while content is being prepared. Each call must be matched by
    /// `release_buffering`.
    pub fn acquire_buffering(&self) {
        self.status.lock().buffering += 1;
    }

    pub fn release_buffering(&self) {
        let mut status = self.status.lock();
        assert!(status.buffering > 0, "buffering released more times than acquired");
        status.buffering -= 1;
    }

    pub fn is_buffering(&self) -> bool {
        self.status.lock().buffering > 0
    }
}

impl AudioSource for TransportSource {
    fn open(&self, buffer_size: usize, sample_rate: f64) -> Result<(), SourceError> {
        let mut playhead = self.playhead.lock();
        playhead.stream.close();
        if let Some(source) = &playhead.source {
            source.open(buffer_size, sample_rate)?;
            source.set_next_read_position(playhead.position);
        }
        playhead.stream.open(buffer_size, sample_rate);
        debug!(buffer_size, sample_rate, "Transport opened.");
        Ok(())
    }

    fn close(&self) {
        let mut playhead = self.playhead.lock();
        if let Some(source) = &playhead.source {
            source.close();
        }
        playhead.stream.close();
    }

    fn stream_state(&self) -> StreamState {
        self.playhead.lock().stream
    }

    fn read(&self, mut request: ReadRequest<'_>) -> usize {
        let mut chunks = self.dispatch.lock();
        request.clear();
        let length = request.length;

        // The playhead is advanced here and the source is read after the lock is
        // released, so control calls never wait on a graph read.
        let (source, looping) = {
            let mut playhead = self.playhead.lock();
            let loop_range = {
                let mut status = self.status.lock();
                status.playback = match status.playback {
                    PlaybackStatus::AboutToPlay => PlaybackStatus::Playing,
                    PlaybackStatus::AboutToPause => PlaybackStatus::Paused,
                    other => other,
                };
                if status.playback != PlaybackStatus::Playing || status.buffering > 0 {
                    return length;
                }
                status.loop_range.clone()
            };

            let Some(source) = playhead.source.clone() else {
                playhead.position += length as i64;
                return length;
            };

            match loop_range {
                Some(range) if playhead.position >= range.start && playhead.position < range.end => {
                    let mut position = playhead.position;
                    let mut done = 0;
                    while done < length {
                        let chunk = ((range.end - position) as usize).min(length - done);
                        position += chunk as i64;
                        let wrap = position >= range.end;
                        if wrap {
                            position = range.start;
                        }
                        chunks.push(Chunk {
                            offset: done,
                            length: chunk,
                            seek_after: wrap.then_some(range.start),
                        });
                        done += chunk;
                    }
                    playhead.position = position;
                    (source, true)
                }
                _ => {
                    playhead.position += length as i64;
                    chunks.push(Chunk {
                        offset: 0,
                        length,
                        seek_after: None,
                    });
                    (source, false)
                }
            }
        };

        let mut produced = 0;
        for chunk in chunks.drain(..) {
            produced += source.read(request.sub(chunk.offset, chunk.length));
            if let Some(position) = chunk.seek_after {
                source.set_next_read_position(position);
            }
        }
        if looping {
            length
        } else {
            produced
        }
    }
}

impl Drop for TransportSource {
    fn drop(&mut self) {
        let playhead = self.playhead.get_mut();
        if playhead.owned {
            if let Some(source) = &playhead.source {
                source.close();
            }
        }
    }
}
