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

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// The kind of content a clip plays.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A sine tone. Requires a frequency.
    Sine,
    /// Nothing at all.
    Silence,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Sine => write!(f, "sine"),
            SourceKind::Silence => write!(f, "silence"),
        }
    }
}

/// A clip on a track's timeline, in samples.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Clip {
    /// Where the clip starts on the track.
    position: i64,
    /// Where playback starts inside the content. Defaults to 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<i64>,
    /// How long the clip plays for.
    length: i64,
    /// What the clip plays.
    source: SourceKind,
    /// The frequency of a sine clip in Hz.
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency: Option<f64>,
    /// The amplitude of a sine clip in decibels. Defaults to 0 dB.
    #[serde(skip_serializing_if = "Option::is_none")]
    amplitude_db: Option<f32>,
}

impl Clip {
    /// Creates a sine clip.
    pub fn sine(position: i64, length: i64, frequency: f64) -> Clip {
        Clip {
            position,
            start: None,
            length,
            source: SourceKind::Sine,
            frequency: Some(frequency),
            amplitude_db: None,
        }
    }

    /// Creates a silent clip.
    pub fn silence(position: i64, length: i64) -> Clip {
        Clip {
            position,
            start: None,
            length,
            source: SourceKind::Silence,
            frequency: None,
            amplitude_db: None,
        }
    }

    pub fn with_start(mut self, start: i64) -> Clip {
        self.start = Some(start);
        self
    }

    pub fn with_amplitude_db(mut self, amplitude_db: f32) -> Clip {
        self.amplitude_db = Some(amplitude_db);
        self
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn start(&self) -> i64 {
        self.start.unwrap_or(0)
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// The sine frequency, or 0 for clips without one.
    pub fn frequency(&self) -> f64 {
        self.frequency.unwrap_or(0.0)
    }

    pub fn amplitude_db(&self) -> f32 {
        self.amplitude_db.unwrap_or(0.0)
    }

    fn validate(&self, track: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| {
            Err(ConfigError::Invalid(format!(
                "track {}, clip at {}: {}",
                track, self.position, reason
            )))
        };

        if self.position < 0 {
            return invalid("position must not be negative".to_string());
        }
        if self.length <= 0 {
            return invalid(format!("length must be positive, got {}", self.length));
        }
        if self.start() < 0 {
            return invalid("start must not be negative".to_string());
        }
        if self.source == SourceKind::Sine {
            match self.frequency {
                Some(frequency) if frequency.is_finite() && frequency > 0.0 => {}
                Some(frequency) => {
                    return invalid(format!("frequency must be positive, got {}", frequency))
                }
                None => return invalid("sine clips need a frequency".to_string()),
            }
        }
        Ok(())
    }
}

/// A track: a named timeline of clips with its own gain, pan, solo and mute.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Track {
    /// The name of the track.
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    gain_db: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pan: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    solo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mute: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    clips: Vec<Clip>,
}

impl Track {
    pub fn new(name: &str, clips: Vec<Clip>) -> Track {
        Track {
            name: name.to_string(),
            gain_db: None,
            pan: None,
            solo: None,
            mute: None,
            clips,
        }
    }

    pub fn with_gain_db(mut self, gain_db: f32) -> Track {
        self.gain_db = Some(gain_db);
        self
    }

    pub fn with_pan(mut self, pan: f32) -> Track {
        self.pan = Some(pan);
        self
    }

    pub fn with_solo(mut self, solo: bool) -> Track {
        self.solo = Some(solo);
        self
    }

    pub fn with_mute(mut self, mute: bool) -> Track {
        self.mute = Some(mute);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db.unwrap_or(0.0)
    }

    pub fn pan(&self) -> f32 {
        self.pan.unwrap_or(0.0)
    }

    pub fn solo(&self) -> bool {
        self.solo.unwrap_or(false)
    }

    pub fn mute(&self) -> bool {
        self.mute.unwrap_or(false)
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("tracks need a name".to_string()));
        }
        if !(-1.0..=1.0).contains(&self.pan()) {
            return Err(ConfigError::Invalid(format!(
                "track {}: pan must be within [-1, 1], got {}",
                self.name,
                self.pan()
            )));
        }
        self.clips
            .iter()
            .try_for_each(|clip| clip.validate(&self.name))
    }
}
