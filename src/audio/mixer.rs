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
// The mixer sums an ordered list of inputs into one block, applying gain, pan,
// solo, per-channel silencing, optional stereo-pair routing and level metering.
//
// Two locks guard a mixer. `control` holds the list and the settings and is only
// ever held briefly. `render` holds the scratch space used while reading the
// inputs and is held for the whole of a read, so a child read never happens under
// `control`. When both are needed they are taken render first.
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::audio::buffer::{AudioBuffer, SampleContainer, SampleProvider};
use crate::audio::source::traits::source_id;
use crate::audio::source::{
    AudioSource, ChannelMask, PositionableSource, ReadRequest, SourceError, UNBOUNDED_LENGTH,
};
use crate::audio::stream::StreamState;

pub mod list;

use list::SourceList;
pub use list::SourceKey;

/// What a mixer needs from its inputs beyond plain reading.
pub trait MixerInput: AudioSource {
    /// Moves the input's cursor to the mixer's position.
    fn sync_position(&self, _position: i64) {}

    /// Number of samples the input can produce, counted from position 0.
    fn input_length(&self) -> i64 {
        UNBOUNDED_LENGTH
    }
}

impl MixerInput for dyn AudioSource {}

impl MixerInput for dyn PositionableSource {
    fn sync_position(&self, position: i64) {
        self.set_next_read_position(position);
    }

    fn input_length(&self) -> i64 {
        self.length()
    }
}

/// A mixer over sources that only stream.
pub type MixerSource = Mixer<dyn AudioSource>;

/// A mixer over positionable sources. It is positionable itself: seeks are pushed
/// to every input and its length is the shortest input's.
pub type PositionableMixerSource = Mixer<dyn PositionableSource>;

struct Control<S: ?Sized> {
    sources: SourceList<S>,
    stream: StreamState,
    position: i64,
    gain: f32,
    pan: f32,
    silent: ChannelMask,
    route_channels: bool,
}

struct MixInput<S: ?Sized> {
    source: Arc<S>,
    muted: bool,
}

struct Render<S: ?Sized> {
    scratch: AudioBuffer,
    inputs: Vec<MixInput<S>>,
}

enum Placement {
    Front,
    Back,
    Before(SourceKey),
}

/// Mixes an ordered list of sources.
pub struct Mixer<S: ?Sized + MixerInput> {
    control: Mutex<Control<S>>,
    render: Mutex<Render<S>>,
    meter: Mutex<Vec<f32>>,
}

impl<S: ?Sized + MixerInput> Default for Mixer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized + MixerInput> Mixer<S> {
    /// Creates an empty, closed mixer with unity gain and centered pan.
    pub fn new() -> Self {
        Self {
            control: Mutex::new(Control {
                sources: SourceList::new(),
                stream: StreamState::default(),
                position: 0,
                gain: 1.0,
                pan: 0.0,
                silent: ChannelMask::NONE,
                route_channels: false,
            }),
            render: Mutex::new(Render {
                scratch: AudioBuffer::default(),
                inputs: Vec::new(),
            }),
            meter: Mutex::new(Vec::new()),
        }
    }

    /// Appends a source to the end of the list.
    pub fn add_source(&self, source: Arc<S>, owned: bool) -> Result<SourceKey, SourceError> {
        self.insert(Placement::Back, source, owned)
    }

    /// Appends a source to the end of the list.
    pub fn append_source(&self, source: Arc<S>, owned: bool) -> Result<SourceKey, SourceError> {
        self.insert(Placement::Back, source, owned)
    }

    /// Inserts a source at the front of the list.
    pub fn prepend_source(&self, source: Arc<S>, owned: bool) -> Result<SourceKey, SourceError> {
        self.insert(Placement::Front, source, owned)
    }

    /// Inserts a source before `before`, or at the end when `before` is None.
    pub fn insert_source(
        &self,
        before: Option<SourceKey>,
        source: Arc<S>,
        owned: bool,
    ) -> Result<SourceKey, SourceError> {
        match before {
            Some(key) => self.insert(Placement::Before(key), source, owned),
            None => self.insert(Placement::Back, source, owned),
        }
    }

    fn insert(
        &self,
        placement: Placement,
        source: Arc<S>,
        owned: bool,
    ) -> Result<SourceKey, SourceError> {
        if source_id(&source) == self as *const Self as *const () as usize {
            return Err(SourceError::SelfReference);
        }

        let mut control = self.control.lock();
        if control.sources.find(&source).is_some() {
            return Err(SourceError::DuplicateSource);
        }
        let before = match placement {
            Placement::Back => None,
            Placement::Front => control.sources.first(),
            Placement::Before(key) => {
                if !control.sources.contains(key) {
                    return Err(SourceError::UnknownHandle);
                }
                Some(key)
            }
        };

        if control.stream.is_open() {
            let stream = control.stream;
            if let Err(e) = source.open(stream.buffer_size(), stream.sample_rate()) {
                warn!(err = e.to_string(), "Mixer source failed to open, not adding it");
                return Err(e);
            }
            source.sync_position(control.position);
        }

        let key = control.sources.insert_before(before, source, owned);
        debug!(sources = control.sources.len(), owned, "Added mixer source");
        Ok(key)
    }

    /// Removes a source, closing it if the mixer owns it. Returns false if the
    /// source isn't in the list.
    pub fn remove_source(&self, source: &Arc<S>) -> bool {
        let entry = {
            let mut control = self.control.lock();
            match control.sources.find(source) {
                Some(key) => control.sources.remove(key),
                None => None,
            }
        };
        match entry {
            Some(entry) => {
                if entry.owned {
                    entry.source.close();
                }
                debug!(owned = entry.owned, "Removed mixer source");
                true
            }
            None => false,
        }
    }

    /// Removes the entry behind `key` and hands back its source, closing it first if
    /// the mixer owns it.
    pub fn erase_source(&self, key: SourceKey) -> Option<Arc<S>> {
        let entry = self.control.lock().sources.remove(key)?;
        if entry.owned {
            entry.source.close();
        }
        debug!(owned = entry.owned, "Erased mixer source");
        Some(entry.source)
    }

    /// Closes and forgets every source.
    pub fn remove_all_sources(&self) {
        let entries = self.control.lock().sources.drain();
        for entry in &entries {
            entry.source.close();
        }
        debug!(removed = entries.len(), "Removed all mixer sources");
    }

    /// Moves `target` right before `before`, or to the end when `before` is None.
    pub fn move_source(&self, before: Option<SourceKey>, target: SourceKey) -> bool {
        self.control.lock().sources.move_before(target, before)
    }

    /// Exchanges the positions of two entries.
    pub fn swap_sources(&self, a: SourceKey, b: SourceKey) -> bool {
        self.control.lock().sources.swap(a, b)
    }

    /// All sources in list order.
    pub fn sources(&self) -> Vec<Arc<S>> {
        self.control
            .lock()
            .sources
            .iter()
            .map(|(_, entry)| entry.source.clone())
            .collect()
    }

    pub fn source_count(&self) -> usize {
        self.control.lock().sources.len()
    }

    pub fn source(&self, key: SourceKey) -> Option<Arc<S>> {
        self.control
            .lock()
            .sources
            .get(key)
            .map(|entry| entry.source.clone())
    }

    pub fn first_source(&self) -> Option<SourceKey> {
        self.control.lock().sources.first()
    }

    pub fn last_source(&self) -> Option<SourceKey> {
        self.control.lock().sources.last()
    }

    pub fn next_source(&self, key: SourceKey) -> Option<SourceKey> {
        self.control.lock().sources.next(key)
    }

    pub fn previous_source(&self, key: SourceKey) -> Option<SourceKey> {
        self.control.lock().sources.prev(key)
    }

    pub fn find_source(&self, source: &Arc<S>) -> Option<SourceKey> {
        self.control.lock().sources.find(source)
    }

    /// Solos or unsolos a source. While any source is soloed, the others are muted.
    pub fn set_source_solo(&self, source: &Arc<S>, solo: bool) -> bool {
        let mut control = self.control.lock();
        match control.sources.find(source) {
            Some(key) => control.sources.set_solo(key, solo),
            None => false,
        }
    }

    pub fn is_source_solo(&self, source: &Arc<S>) -> bool {
        let control = self.control.lock();
        control
            .sources
            .find(source)
            .and_then(|key| control.sources.get(key))
            .is_some_and(|entry| entry.solo)
    }

    /// Whether any source is soloed.
    pub fn has_solo(&self) -> bool {
        self.control.lock().sources.solo_count() > 0
    }

    /// Sets the output gain as a linear factor.
    pub fn set_gain(&self, gain: f32) {
        self.control.lock().gain = gain;
    }

    pub fn gain(&self) -> f32 {
        self.control.lock().gain
    }

    /// Sets the pan, clamped to [-1, 1]. Negative values pan left.
    pub fn set_pan(&self, pan: f32) {
        self.control.lock().pan = pan.clamp(-1.0, 1.0);
    }

    pub fn pan(&self) -> f32 {
        self.control.lock().pan
    }

    /// Sets the channels that are passed to every input as silent and left out of
    /// the mix.
    pub fn set_silent_flags(&self, silent: ChannelMask) {
        self.control.lock().silent = silent;
    }

    pub fn silent_flags(&self) -> ChannelMask {
        self.control.lock().silent
    }

    /// When enabled, input `k` is mixed into the stereo pair `(2k, 2k + 1)` instead
    /// of being summed channel by channel.
    pub fn set_route_channels(&self, route_channels: bool) {
        self.control.lock().route_channels = route_channels;
    }

    pub fn route_channels(&self) -> bool {
        self.control.lock().route_channels
    }

    /// Sets how many channels the level meter reports.
    pub fn set_level_meter_channel_count(&self, count: usize) {
        self.meter.lock().resize(count, 0.0);
    }

    pub fn level_meter_channel_count(&self) -> usize {
        self.meter.lock().len()
    }

    /// Peak magnitude per metered channel of the last block read.
    pub fn level_meter(&self) -> Vec<f32> {
        self.meter.lock().clone()
    }
}

impl<S: ?Sized + MixerInput> AudioSource for Mixer<S> {
    fn open(&self, buffer_size: usize, sample_rate: f64) -> Result<(), SourceError> {
        let mut render = self.render.lock();
        let mut control = self.control.lock();
        control.stream.close();

        for (_, entry) in control.sources.iter() {
            if let Err(e) = entry.source.open(buffer_size, sample_rate) {
                warn!(err = e.to_string(), "Mixer source failed to open");
                return Err(e);
            }
        }
        let position = control.position;
        for (_, entry) in control.sources.iter() {
            entry.source.sync_position(position);
        }

        control.stream.open(buffer_size, sample_rate);
        render.scratch = AudioBuffer::new(2, buffer_size);
        debug!(
            buffer_size,
            sample_rate,
            sources = control.sources.len(),
            "Mixer opened"
        );
        Ok(())
    }

    fn close(&self) {
        let mut render = self.render.lock();
        let mut control = self.control.lock();
        for (_, entry) in control.sources.iter() {
            entry.source.close();
        }
        control.stream.close();
        render.scratch = AudioBuffer::default();
        render.inputs = Vec::new();
        debug!("Mixer closed");
    }

    fn stream_state(&self) -> StreamState {
        self.control.lock().stream
    }

    fn read(&self, mut request: ReadRequest<'_>) -> usize {
        let mut guard = self.render.lock();
        let render = &mut *guard;

        let (gain, pan, silent, route_channels, position) = {
            let mut control = self.control.lock();
            let muting = control.sources.solo_count() > 0;
            render
                .inputs
                .extend(control.sources.iter().map(|(_, entry)| MixInput {
                    source: entry.source.clone(),
                    muted: muting && !entry.solo,
                }));
            let position = control.position;
            control.position = position.saturating_add(request.length as i64);
            (
                control.gain,
                control.pan,
                control.silent,
                control.route_channels,
                position,
            )
        };

        request.clear();
        let length = request.length;
        let channels = request.channel_count();

        let shortest = render
            .inputs
            .iter()
            .map(|input| input.source.input_length())
            .min()
            .unwrap_or(0);
        let mix_length = shortest.saturating_sub(position).clamp(0, length as i64) as usize;

        let scratch_channels = channels.max(2);
        if render.scratch.channel_count() < scratch_channels
            || render.scratch.sample_count() < length
        {
            let grown_channels = render.scratch.channel_count().max(scratch_channels);
            let grown_samples = render.scratch.sample_count().max(length);
            render.scratch.resize(grown_channels, grown_samples);
        }

        let gain_left = gain * (1.0 - pan).min(1.0);
        let gain_right = gain * (1.0 + pan).min(1.0);
        let pairs = channels / 2;
        let mut produced = 0;

        for (k, input) in render.inputs.iter().enumerate() {
            if route_channels && k >= pairs {
                // Unrouted inputs still move with the timeline.
                input.source.sync_position(position.saturating_add(length as i64));
                continue;
            }

            let mask = if input.muted { ChannelMask::ALL } else { silent };
            let mut scratch = ReadRequest::new(&mut render.scratch, 0, length).with_silent(mask);
            scratch.clear();
            produced = produced.max(input.source.read(scratch));
            if input.muted {
                continue;
            }

            if route_channels {
                let left = 2 * k;
                request.buffer.add_sample_range(
                    left,
                    request.start,
                    mix_length,
                    &render.scratch,
                    0,
                    0,
                    gain_left,
                );
                request.buffer.add_sample_range(
                    left + 1,
                    request.start,
                    mix_length,
                    &render.scratch,
                    1,
                    0,
                    gain_right,
                );
            } else {
                for channel in 0..channels {
                    if silent.contains(channel) {
                        continue;
                    }
                    let channel_gain = match channel {
                        0 => gain_left,
                        1 => gain_right,
                        _ => gain,
                    };
                    request.buffer.add_sample_range(
                        channel,
                        request.start,
                        mix_length,
                        &render.scratch,
                        channel,
                        0,
                        channel_gain,
                    );
                }
            }
        }
        // Channels past the last routed pair were cleared above and stay silent.
        render.inputs.clear();

        let mut meter = self.meter.lock();
        for (channel, level) in meter.iter_mut().enumerate() {
            *level = if channel < channels {
                request.buffer.magnitude_range(channel, request.start, length)
            } else {
                0.0
            };
        }

        produced.min(mix_length)
    }
}

impl PositionableSource for Mixer<dyn PositionableSource> {
    fn length(&self) -> i64 {
        self.control
            .lock()
            .sources
            .iter()
            .map(|(_, entry)| entry.source.length())
            .min()
            .unwrap_or(0)
    }

    fn next_read_position(&self) -> i64 {
        self.control.lock().position
    }

    fn set_next_read_position(&self, position: i64) {
        let mut control = self.control.lock();
        control.position = position;
        for (_, entry) in control.sources.iter() {
            entry.source.set_next_read_position(position);
        }
    }
}

impl<S: ?Sized + MixerInput> Drop for Mixer<S> {
    fn drop(&mut self) {
        for entry in self.control.get_mut().sources.drain() {
            if entry.owned {
                entry.source.close();
            }
        }
    }
}
