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
use std::error::Error;
use std::sync::Arc;

use tracing::{debug, info};

use crate::audio::decibels::decibels_to_gain;
use crate::audio::{
    AudioBuffer, AudioClip, AudioClipSeries, ChannelMask, Device, MemorySource,
    PositionableMixerSource, PositionableSource, SineWaveSource, SourceError, TransportSource,
};
use crate::config::{self, SourceKind};

/// One track of a built project: its mixer and the clip series feeding it.
pub struct TrackNode {
    name: String,
    mixer: Arc<PositionableMixerSource>,
    clips: Arc<AudioClipSeries>,
}

impl TrackNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The track mixer carrying gain, pan, solo and mute.
    pub fn mixer(&self) -> &Arc<PositionableMixerSource> {
        &self.mixer
    }

    pub fn clips(&self) -> &Arc<AudioClipSeries> {
        &self.clips
    }
}

/// The source graph of a project, driven through a transport:
///
/// transport -> project mixer -> track mixer -> clip series -> clip content
pub struct ProjectGraph {
    mixer: Arc<PositionableMixerSource>,
    tracks: Vec<TrackNode>,
    transport: TransportSource,
    duration: i64,
}

impl ProjectGraph {
    /// Builds the graph for a project. Overlapping clips on a track fail the build.
    pub fn build(project: &config::Project) -> Result<ProjectGraph, SourceError> {
        let mixer = Arc::new(PositionableMixerSource::new());
        mixer.set_gain(decibels_to_gain(project.gain_db()));
        mixer.set_pan(project.pan());

        let mut tracks = Vec::with_capacity(project.tracks().len());
        for track in project.tracks() {
            let node = build_track(track)?;
            let input: Arc<dyn PositionableSource> = node.mixer.clone();
            mixer.add_source(input.clone(), true)?;
            if track.solo() {
                mixer.set_source_solo(&input, true);
            }
            tracks.push(node);
        }

        let end = tracks
            .iter()
            .map(|track| track.clips.effective_length())
            .max()
            .unwrap_or(0);
        let duration = project.duration().unwrap_or(end);

        let graph_root: Arc<dyn PositionableSource> = mixer.clone();
        let transport = TransportSource::new(graph_root, false);
        transport.set_loop_range(project.loop_range());

        info!(
            project = project.name(),
            tracks = tracks.len(),
            duration,
            "Built project graph"
        );
        Ok(ProjectGraph {
            mixer,
            tracks,
            transport,
            duration,
        })
    }

    pub fn mixer(&self) -> &Arc<PositionableMixerSource> {
        &self.mixer
    }

    pub fn tracks(&self) -> &[TrackNode] {
        &self.tracks
    }

    pub fn track(&self, name: &str) -> Option<&TrackNode> {
        self.tracks.iter().find(|track| track.name == name)
    }

    /// The transport playing the project mixer.
    pub fn transport(&self) -> &TransportSource {
        &self.transport
    }

    /// The number of samples a render covers when no duration is given.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Resolves an optional start and duration into the span to render. Without a
    /// duration the span runs from `start` to the end of the project.
    pub fn render_span(
        &self,
        start: Option<i64>,
        duration: Option<i64>,
    ) -> Result<(i64, usize), Box<dyn Error>> {
        let start = start.unwrap_or(0);
        if start < 0 {
            return Err(format!("start must not be negative, got {}", start).into());
        }
        let length = match duration {
            Some(duration) if duration < 0 => {
                return Err(format!("duration must not be negative, got {}", duration).into());
            }
            Some(duration) => duration,
            None if start > self.duration => {
                return Err(format!(
                    "start {} is past the end of the project ({} samples)",
                    start, self.duration
                )
                .into());
            }
            None => self.duration - start,
        };
        Ok((start, length as usize))
    }

    /// Plays `length` samples from `start` through the device.
    pub fn render(
        &self,
        device: &dyn Device,
        start: i64,
        length: usize,
    ) -> Result<(), Box<dyn Error>> {
        info!(device = device.to_string(), start, length, "Rendering");
        self.transport.set_position(start);
        self.transport.play();
        let result = device.play(&self.transport, length);
        self.transport.pause();
        result
    }
}

fn build_track(track: &config::Track) -> Result<TrackNode, SourceError> {
    let clips = Arc::new(AudioClipSeries::new());
    for clip in track.clips() {
        let content: Arc<dyn PositionableSource> = match clip.source() {
            SourceKind::Sine => {
                let sine = SineWaveSource::new(clip.frequency());
                sine.set_amplitude(decibels_to_gain(clip.amplitude_db()));
                Arc::new(sine)
            }
            SourceKind::Silence => Arc::new(MemorySource::new(Arc::new(AudioBuffer::default()))),
        };
        clips.add_clip(AudioClip::new(
            clip.position(),
            content,
            clip.start(),
            clip.length(),
        ))?;
    }

    let mixer = Arc::new(PositionableMixerSource::new());
    mixer.set_gain(decibels_to_gain(track.gain_db()));
    mixer.set_pan(track.pan());
    if track.mute() {
        mixer.set_silent_flags(ChannelMask::ALL);
    }
    let input: Arc<dyn PositionableSource> = clips.clone();
    mixer.add_source(input, true)?;

    debug!(
        track = track.name(),
        clips = clips.len(),
        end = clips.effective_length(),
        "Built track"
    );
    Ok(TrackNode {
        name: track.name().to_string(),
        mixer,
        clips,
    })
}
