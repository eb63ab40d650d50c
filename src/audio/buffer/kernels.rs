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
// Slice kernels used by the continuous-storage fast paths of the buffer traits.
//
// Every kernel performs the same floating point operations, in the same order, as
// the per-sample fallbacks in traits.rs. The fast and slow paths must agree bit for
// bit, so nothing here may reassociate sums or fuse multiply-adds.

/// Zeroes the destination slice.
#[inline]
pub fn clear(dest: &mut [f32]) {
    dest.fill(0.0);
}

/// Copies `src` into `dest`. Both slices must have the same length.
#[inline]
pub fn copy(dest: &mut [f32], src: &[f32]) {
    dest.copy_from_slice(src);
}

/// Accumulates `src * gain` into `dest`.
#[inline]
pub fn add_scaled(dest: &mut [f32], src: &[f32], gain: f32) {
    debug_assert_eq!(dest.len(), src.len());
    for (d, s) in dest.iter_mut().zip(src) {
        *d += *s * gain;
    }
}

/// Multiplies every sample by `gain`.
#[inline]
pub fn scale(dest: &mut [f32], gain: f32) {
    for d in dest.iter_mut() {
        *d *= gain;
    }
}

/// Largest absolute sample value, 0 for an empty slice.
#[inline]
pub fn peak(src: &[f32]) -> f32 {
    src.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

/// Smallest and largest sample values, `(0, 0)` for an empty slice.
#[inline]
pub fn min_max(src: &[f32]) -> (f32, f32) {
    if src.is_empty() {
        return (0.0, 0.0);
    }
    src.iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), s| (lo.min(*s), hi.max(*s)))
}

/// Sum of squared samples, accumulated front to back.
#[inline]
pub fn sum_of_squares(src: &[f32]) -> f32 {
    src.iter().fold(0.0f32, |sum, s| sum + s * s)
}
