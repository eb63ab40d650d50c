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
use super::kernels;

/// Panics unless `[start, start + length)` lies within `channel` of a buffer with the
/// given dimensions. Range violations are programmer errors, never recoverable.
#[inline]
#[track_caller]
pub(crate) fn check_range(
    channel: usize,
    start: usize,
    length: usize,
    channel_count: usize,
    sample_count: usize,
) {
    assert!(
        channel < channel_count,
        "channel {} out of range (channel count {})",
        channel,
        channel_count
    );
    assert!(
        start
            .checked_add(length)
            .is_some_and(|end| end <= sample_count),
        "sample range {}+{} out of range (sample count {})",
        start,
        length,
        sample_count
    );
}

/// Read-only access to a rectangular block of samples indexed by (channel, position).
///
/// Implementations that store each channel contiguously should report
/// `is_continuous()` and hand out slices from `read_slice`, which lets the
/// aggregate queries below run over slices instead of going sample by sample.
/// Both paths produce identical results.
pub trait SampleProvider {
    /// Number of channels.
    fn channel_count(&self) -> usize;

    /// Number of samples per channel.
    fn sample_count(&self) -> usize;

    /// Gets a single sample.
    fn sample(&self, channel: usize, position: usize) -> f32;

    /// Whether each channel is stored contiguously.
    fn is_continuous(&self) -> bool {
        false
    }

    /// Contiguous samples of `channel` from `start` to the end of the buffer.
    /// Returns None when the storage is not continuous.
    fn read_slice(&self, _channel: usize, _start: usize) -> Option<&[f32]> {
        None
    }

    /// Largest absolute sample value within the range.
    fn magnitude_range(&self, channel: usize, start: usize, length: usize) -> f32 {
        check_range(channel, start, length, self.channel_count(), self.sample_count());
        match self.read_slice(channel, start) {
            Some(samples) => kernels::peak(&samples[..length]),
            None => (start..start + length)
                .fold(0.0f32, |m, i| m.max(self.sample(channel, i).abs())),
        }
    }

    /// Largest absolute sample value of the whole channel.
    fn magnitude(&self, channel: usize) -> f32 {
        self.magnitude_range(channel, 0, self.sample_count())
    }

    /// Smallest and largest sample values within the range, `(0, 0)` when empty.
    fn find_min_max_range(&self, channel: usize, start: usize, length: usize) -> (f32, f32) {
        check_range(channel, start, length, self.channel_count(), self.sample_count());
        if let Some(samples) = self.read_slice(channel, start) {
            return kernels::min_max(&samples[..length]);
        }
        if length == 0 {
            return (0.0, 0.0);
        }
        (start..start + length).fold((f32::MAX, f32::MIN), |(lo, hi), i| {
            let s = self.sample(channel, i);
            (lo.min(s), hi.max(s))
        })
    }

    /// Smallest and largest sample values of the whole channel.
    fn find_min_max(&self, channel: usize) -> (f32, f32) {
        self.find_min_max_range(channel, 0, self.sample_count())
    }

    /// Root mean square of the range, 0 when empty.
    fn rms_range(&self, channel: usize, start: usize, length: usize) -> f32 {
        check_range(channel, start, length, self.channel_count(), self.sample_count());
        if length == 0 {
            return 0.0;
        }
        let sum = match self.read_slice(channel, start) {
            Some(samples) => kernels::sum_of_squares(&samples[..length]),
            None => (start..start + length).fold(0.0f32, |sum, i| {
                let s = self.sample(channel, i);
                sum + s * s
            }),
        };
        (sum / length as f32).sqrt()
    }

    /// Root mean square of the whole channel.
    fn rms(&self, channel: usize) -> f32 {
        self.rms_range(channel, 0, self.sample_count())
    }
}

/// Read-write access to a block of samples.
///
/// The range operations check both the source and destination ranges before
/// touching any memory and panic when either is out of bounds. The whole-buffer
/// variants operate on the overlap of the two buffers' dimensions.
pub trait SampleContainer: SampleProvider {
    /// Sets a single sample.
    fn set_sample(&mut self, channel: usize, position: usize, value: f32);

    /// Mutable contiguous samples of `channel` from `start` to the end of the buffer.
    /// Returns None when the storage is not continuous.
    fn write_slice(&mut self, _channel: usize, _start: usize) -> Option<&mut [f32]> {
        None
    }

    /// Copies `length` samples from `src` into this buffer.
    fn set_sample_range(
        &mut self,
        dest_channel: usize,
        dest_start: usize,
        length: usize,
        src: &dyn SampleProvider,
        src_channel: usize,
        src_start: usize,
    ) {
        check_range(dest_channel, dest_start, length, self.channel_count(), self.sample_count());
        check_range(src_channel, src_start, length, src.channel_count(), src.sample_count());
        if let Some(from) = src.read_slice(src_channel, src_start) {
            if let Some(to) = self.write_slice(dest_channel, dest_start) {
                kernels::copy(&mut to[..length], &from[..length]);
                return;
            }
        }
        for i in 0..length {
            let value = src.sample(src_channel, src_start + i);
            self.set_sample(dest_channel, dest_start + i, value);
        }
    }

    /// Copies the overlapping region of `src` into this buffer.
    fn set_samples_from(&mut self, src: &dyn SampleProvider) {
        let channels = self.channel_count().min(src.channel_count());
        let samples = self.sample_count().min(src.sample_count());
        for channel in 0..channels {
            self.set_sample_range(channel, 0, samples, src, channel, 0);
        }
    }

    /// Accumulates `length` samples of `src`, scaled by `gain`, into this buffer.
    #[allow(clippy::too_many_arguments)]
    fn add_sample_range(
        &mut self,
        dest_channel: usize,
        dest_start: usize,
        length: usize,
        src: &dyn SampleProvider,
        src_channel: usize,
        src_start: usize,
        gain: f32,
    ) {
        check_range(dest_channel, dest_start, length, self.channel_count(), self.sample_count());
        check_range(src_channel, src_start, length, src.channel_count(), src.sample_count());
        if let Some(from) = src.read_slice(src_channel, src_start) {
            if let Some(to) = self.write_slice(dest_channel, dest_start) {
                kernels::add_scaled(&mut to[..length], &from[..length], gain);
                return;
            }
        }
        for i in 0..length {
            let value =
                self.sample(dest_channel, dest_start + i) + src.sample(src_channel, src_start + i) * gain;
            self.set_sample(dest_channel, dest_start + i, value);
        }
    }

    /// Accumulates the overlapping region of `src`, scaled by `gain`, into this buffer.
    fn add_samples_from(&mut self, src: &dyn SampleProvider, gain: f32) {
        let channels = self.channel_count().min(src.channel_count());
        let samples = self.sample_count().min(src.sample_count());
        for channel in 0..channels {
            self.add_sample_range(channel, 0, samples, src, channel, 0, gain);
        }
    }

    /// Multiplies a range of one channel by `gain`.
    fn gain_sample_range(&mut self, channel: usize, start: usize, length: usize, gain: f32) {
        check_range(channel, start, length, self.channel_count(), self.sample_count());
        if let Some(to) = self.write_slice(channel, start) {
            kernels::scale(&mut to[..length], gain);
            return;
        }
        for i in 0..length {
            let value = self.sample(channel, start + i) * gain;
            self.set_sample(channel, start + i, value);
        }
    }

    /// Multiplies one whole channel by `gain`.
    fn gain_channel(&mut self, channel: usize, gain: f32) {
        self.gain_sample_range(channel, 0, self.sample_count(), gain);
    }

    /// Multiplies every channel by `gain`.
    fn apply_gain(&mut self, gain: f32) {
        let samples = self.sample_count();
        for channel in 0..self.channel_count() {
            self.gain_sample_range(channel, 0, samples, gain);
        }
    }

    /// Zeroes a range of one channel.
    fn clear_range(&mut self, channel: usize, start: usize, length: usize) {
        check_range(channel, start, length, self.channel_count(), self.sample_count());
        if let Some(to) = self.write_slice(channel, start) {
            kernels::clear(&mut to[..length]);
            return;
        }
        for i in 0..length {
            self.set_sample(channel, start + i, 0.0);
        }
    }

    /// Zeroes one whole channel.
    fn clear_channel(&mut self, channel: usize) {
        self.clear_range(channel, 0, self.sample_count());
    }

    /// Zeroes every channel.
    fn clear(&mut self) {
        let samples = self.sample_count();
        for channel in 0..self.channel_count() {
            self.clear_range(channel, 0, samples);
        }
    }
}
