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
use std::collections::HashSet;
use std::io::Write;
use std::ops::Range;
use std::path::Path;

use config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::track::{Clip, Track};
use super::ConfigError;

const DEFAULT_SAMPLE_RATE: u32 = 48000;
const DEFAULT_BUFFER_SIZE: usize = 512;
const DEFAULT_CHANNELS: u16 = 2;

/// A loop region on the project timeline, in samples.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopRange {
    start: i64,
    end: i64,
}

impl LoopRange {
    pub fn new(start: i64, end: i64) -> LoopRange {
        LoopRange { start, end }
    }
}

/// A project: the stream format it renders at, its master gain and pan, and its
/// tracks.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Project {
    /// The name of the project.
    name: String,
    /// The sample rate in Hz. Defaults to 48000.
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate: Option<u32>,
    /// The number of samples pulled per block. Defaults to 512.
    #[serde(skip_serializing_if = "Option::is_none")]
    buffer_size: Option<usize>,
    /// The number of output channels. Defaults to 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    channels: Option<u16>,
    /// The master gain in decibels.
    #[serde(skip_serializing_if = "Option::is_none")]
    gain_db: Option<f32>,
    /// The master pan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pan: Option<f32>,
    /// How many samples to render. Defaults to the end of the last clip.
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<i64>,
    /// An optional loop region.
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    loop_range: Option<LoopRange>,
    /// The tracks in the project.
    #[serde(default)]
    tracks: Vec<Track>,
}

impl Project {
    pub fn new(name: &str, tracks: Vec<Track>) -> Project {
        Project {
            name: name.to_string(),
            sample_rate: None,
            buffer_size: None,
            channels: None,
            gain_db: None,
            pan: None,
            duration: None,
            loop_range: None,
            tracks,
        }
    }

    /// A small project with a few tones, written out by `template`.
    pub fn example() -> Project {
        let mut project = Project::new(
            "example",
            vec![
                Track::new(
                    "bass",
                    vec![
                        Clip::sine(0, 48000, 110.0).with_amplitude_db(-6.0),
                        Clip::sine(48000, 48000, 82.41).with_amplitude_db(-6.0),
                    ],
                )
                .with_pan(-0.25),
                Track::new(
                    "lead",
                    vec![
                        Clip::sine(24000, 24000, 440.0).with_amplitude_db(-12.0),
                        Clip::silence(48000, 12000),
                        Clip::sine(60000, 36000, 659.25)
                            .with_start(12000)
                            .with_amplitude_db(-12.0),
                    ],
                )
                .with_pan(0.25)
                .with_gain_db(-3.0),
            ],
        );
        project.sample_rate = Some(DEFAULT_SAMPLE_RATE);
        project.buffer_size = Some(DEFAULT_BUFFER_SIZE);
        project.channels = Some(DEFAULT_CHANNELS);
        project.gain_db = Some(-1.0);
        project
    }

    /// Deserializes and validates a project file.
    pub fn deserialize(path: &Path) -> Result<Project, ConfigError> {
        let project = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Project>()?;
        project.validate()?;

        debug!(
            path = path.display().to_string(),
            name = project.name(),
            tracks = project.tracks.len(),
            "Loaded project"
        );
        Ok(project)
    }

    /// Serialize and save a project to a file at given path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let serialized = serde_yml::to_string(self)?;
        info!(path = path.display().to_string(), "Saving project");
        debug!(serialized);

        let mut file = std::fs::File::create(path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }

    /// Checks everything that can be checked without building the graph.
    /// Overlapping clips are caught when the clips are added to their series.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate() == 0 {
            return Err(ConfigError::Invalid(
                "sample rate must be positive".to_string(),
            ));
        }
        if self.buffer_size() == 0 {
            return Err(ConfigError::Invalid(
                "buffer size must be positive".to_string(),
            ));
        }
        if self.channels() == 0 || self.channels() > 64 {
            return Err(ConfigError::Invalid(format!(
                "channels must be within [1, 64], got {}",
                self.channels()
            )));
        }
        if !(-1.0..=1.0).contains(&self.pan()) {
            return Err(ConfigError::Invalid(format!(
                "pan must be within [-1, 1], got {}",
                self.pan()
            )));
        }
        if let Some(duration) = self.duration {
            if duration < 0 {
                return Err(ConfigError::Invalid(format!(
                    "duration must not be negative, got {}",
                    duration
                )));
            }
        }
        if let Some(range) = self.loop_range {
            if range.start < 0 || range.start >= range.end {
                return Err(ConfigError::Invalid(format!(
                    "loop must satisfy 0 <= start < end, got {}..{}",
                    range.start, range.end
                )));
            }
        }

        let mut names = HashSet::new();
        for track in self.tracks.iter() {
            track.validate()?;
            if !names.insert(track.name()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate track name {}",
                    track.name()
                )));
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE)
    }

    pub fn channels(&self) -> u16 {
        self.channels.unwrap_or(DEFAULT_CHANNELS)
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db.unwrap_or(0.0)
    }

    pub fn pan(&self) -> f32 {
        self.pan.unwrap_or(0.0)
    }

    /// The explicit render duration, if any.
    pub fn duration(&self) -> Option<i64> {
        self.duration
    }

    pub fn loop_range(&self) -> Option<Range<i64>> {
        self.loop_range.map(|range| range.start..range.end)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn set_duration(&mut self, duration: Option<i64>) {
        self.duration = duration;
    }

    pub fn set_loop_range(&mut self, loop_range: Option<LoopRange>) {
        self.loop_range = loop_range;
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::fs;

    use super::{LoopRange, Project};
    use crate::config::{Clip, ConfigError, SourceKind, Track};

    #[test]
    fn test_deserialize() -> Result<(), Box<dyn Error>> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("project.yaml");
        fs::write(
            &path,
            r#"
name: demo
sample_rate: 44100
channels: 1
gain_db: -6.0
loop:
  start: 100
  end: 200
tracks:
  - name: tone
    pan: -0.5
    solo: true
    clips:
      - position: 0
        length: 1000
        source: sine
        frequency: 440
      - position: 1000
        start: 50
        length: 500
        source: silence
  - name: empty
    mute: true
"#,
        )?;

        let project = Project::deserialize(&path)?;
        assert_eq!(project.name(), "demo");
        assert_eq!(project.sample_rate(), 44100);
        assert_eq!(project.buffer_size(), 512);
        assert_eq!(project.channels(), 1);
        assert_eq!(project.gain_db(), -6.0);
        assert_eq!(project.pan(), 0.0);
        assert_eq!(project.duration(), None);
        assert_eq!(project.loop_range(), Some(100..200));

        let tracks = project.tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].name(), "tone");
        assert_eq!(tracks[0].pan(), -0.5);
        assert!(tracks[0].solo());
        assert!(!tracks[0].mute());
        assert_eq!(tracks[0].gain_db(), 0.0);

        let clips = tracks[0].clips();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[0].source(), SourceKind::Sine);
        assert_eq!(clips[0].frequency(), 440.0);
        assert_eq!(clips[0].amplitude_db(), 0.0);
        assert_eq!(clips[0].start(), 0);
        assert_eq!(clips[1].source(), SourceKind::Silence);
        assert_eq!(clips[1].position(), 1000);
        assert_eq!(clips[1].start(), 50);
        assert_eq!(clips[1].length(), 500);

        assert!(tracks[1].mute());
        assert!(tracks[1].clips().is_empty());
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> Result<(), Box<dyn Error>> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("example.yaml");

        let mut project = Project::example();
        project.set_duration(Some(96000));
        project.set_loop_range(Some(LoopRange::new(0, 48000)));
        project.save(&path)?;

        assert_eq!(Project::deserialize(&path)?, project);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let result = Project::deserialize(std::path::Path::new("/nonexistent/project.yaml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_validate() {
        let valid = Project::new("ok", vec![Track::new("a", vec![Clip::sine(0, 10, 1.0)])]);
        assert!(valid.validate().is_ok());

        let invalid = [
            Project::new("pan", vec![Track::new("a", vec![]).with_pan(1.5)]),
            Project::new("nameless", vec![Track::new("", vec![])]),
            Project::new("dupes", vec![Track::new("a", vec![]), Track::new("a", vec![])]),
            Project::new("length", vec![Track::new("a", vec![Clip::sine(0, 0, 1.0)])]),
            Project::new("position", vec![Track::new("a", vec![Clip::silence(-1, 10)])]),
            Project::new(
                "start",
                vec![Track::new("a", vec![Clip::silence(0, 10).with_start(-5)])],
            ),
            Project::new("frequency", vec![Track::new("a", vec![Clip::sine(0, 10, 0.0)])]),
        ];
        for project in invalid.iter() {
            assert!(
                matches!(project.validate(), Err(ConfigError::Invalid(_))),
                "{} should be invalid",
                project.name()
            );
        }

        let mut looped = valid.clone();
        looped.set_loop_range(Some(LoopRange::new(10, 10)));
        assert!(looped.validate().is_err());

        let mut negative = valid;
        negative.set_duration(Some(-1));
        assert!(negative.validate().is_err());
    }
}
