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
use std::{error::Error, fmt, path::PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, info};

use super::buffer::{InterleavedBuffer, SampleProvider};
use super::source::{AudioSource, ReadRequest};

/// A device that renders a source graph into a 32-bit float WAV file instead of
/// an audio interface. Blocks are pulled into an interleaved buffer, the same
/// shape a hardware callback would hand over.
pub struct WavDevice {
    path: PathBuf,
    sample_rate: u32,
    channels: u16,
    buffer_size: usize,
}

impl WavDevice {
    pub fn new(path: PathBuf, sample_rate: u32, channels: u16, buffer_size: usize) -> Self {
        Self {
            path,
            sample_rate,
            channels,
            buffer_size: buffer_size.max(1),
        }
    }

    /// The file the device writes to.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl fmt::Display for WavDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channels={}, SampleRate={}, BufferSize={})",
            self.path.display(),
            self.channels,
            self.sample_rate,
            self.buffer_size
        )
    }
}

impl super::Device for WavDevice {
    fn play(&self, source: &dyn AudioSource, length: usize) -> Result<(), Box<dyn Error>> {
        let channels = usize::from(self.channels);
        if channels == 0 {
            return Err("a device needs at least one channel".into());
        }

        source.open(self.buffer_size, f64::from(self.sample_rate))?;
        let result = self.pull(source, channels, length);
        source.close();
        result
    }
}

impl WavDevice {
    fn pull(
        &self,
        source: &dyn AudioSource,
        channels: usize,
        length: usize,
    ) -> Result<(), Box<dyn Error>> {
        let mut writer = WavWriter::create(
            &self.path,
            WavSpec {
                channels: self.channels,
                sample_rate: self.sample_rate,
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            },
        )?;

        let mut block = vec![0.0f32; self.buffer_size * channels];
        let mut peaks = vec![0.0f32; channels];
        let mut remaining = length;
        while remaining > 0 {
            let frames = remaining.min(self.buffer_size);
            let mut view = InterleavedBuffer::new(&mut block[..frames * channels], channels);
            source.read(ReadRequest::whole(&mut view));

            for (channel, peak) in peaks.iter_mut().enumerate() {
                *peak = peak.max(view.magnitude(channel));
            }
            for sample in view.data() {
                writer.write_sample(*sample)?;
            }
            remaining -= frames;
        }
        writer.finalize()?;

        debug!(device = self.to_string(), "Finished pulling source");
        info!(
            path = self.path.display().to_string(),
            samples = length,
            peaks = format!("{:?}", peaks),
            "Rendered"
        );
        Ok(())
    }
}
