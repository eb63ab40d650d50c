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
// Conversions between linear gain and decibels. Levels at or below the floor are
// treated as silence.

/// Decibel level treated as minus infinity.
pub const MINUS_INFINITY_DB: f32 = -96.0;

/// Converts decibels to a linear gain, 0 at or below `MINUS_INFINITY_DB`.
pub fn decibels_to_gain(decibels: f32) -> f32 {
    decibels_to_gain_with_floor(decibels, MINUS_INFINITY_DB)
}

pub fn decibels_to_gain_with_floor(decibels: f32, floor: f32) -> f32 {
    if decibels > floor {
        10.0f32.powf(decibels * 0.05)
    } else {
        0.0
    }
}

/// Converts a linear gain to decibels, never going below `MINUS_INFINITY_DB`.
pub fn gain_to_decibels(gain: f32) -> f32 {
    gain_to_decibels_with_floor(gain, MINUS_INFINITY_DB)
}

pub fn gain_to_decibels_with_floor(gain: f32, floor: f32) -> f32 {
    if gain > 0.0 {
        floor.max(gain.log10() * 20.0)
    } else {
        floor
    }
}

/// Formats a level such as "+1.5 dB", "-6.0 dB" or "-INF dB". A precision of 0
/// truncates to whole decibels.
pub fn format_decibels(decibels: f32, precision: usize) -> String {
    if decibels <= MINUS_INFINITY_DB {
        return "-INF dB".to_string();
    }
    let sign = if decibels >= 0.0 { "+" } else { "" };
    if precision == 0 {
        format!("{}{} dB", sign, decibels as i32)
    } else {
        format!("{}{:.*} dB", sign, precision, decibels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decibels_to_gain() {
        assert_eq!(decibels_to_gain(0.0), 1.0);
        assert!((decibels_to_gain(-6.0) - 0.501_187).abs() < 1e-5);
        assert!((decibels_to_gain(20.0) - 10.0).abs() < 1e-4);
        assert_eq!(decibels_to_gain(-96.0), 0.0);
        assert_eq!(decibels_to_gain(-200.0), 0.0);
        assert!((decibels_to_gain_with_floor(-100.0, -120.0) - 1e-5).abs() < 1e-9);
    }

    #[test]
    fn test_gain_to_decibels() {
        assert_eq!(gain_to_decibels(1.0), 0.0);
        assert!((gain_to_decibels(0.5) + 6.0206).abs() < 1e-3);
        assert_eq!(gain_to_decibels(0.0), MINUS_INFINITY_DB);
        assert_eq!(gain_to_decibels(-1.0), MINUS_INFINITY_DB);
        assert_eq!(gain_to_decibels(1e-9), MINUS_INFINITY_DB);
        assert_eq!(gain_to_decibels_with_floor(0.0, -60.0), -60.0);
    }

    #[test]
    fn test_format_decibels() {
        assert_eq!(format_decibels(0.0, 1), "+0.0 dB");
        assert_eq!(format_decibels(-6.02, 1), "-6.0 dB");
        assert_eq!(format_decibels(3.75, 2), "+3.75 dB");
        assert_eq!(format_decibels(-12.9, 0), "-12 dB");
        assert_eq!(format_decibels(-96.0, 1), "-INF dB");
    }
}
