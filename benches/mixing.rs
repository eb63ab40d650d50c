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

use cliptrack::audio::{
    AudioBuffer, AudioClip, AudioClipSeries, AudioSource, MixerSource, PositionableSource,
    ReadRequest, SineWaveSource,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const BUFFER_SIZE: usize = 512;
const SAMPLE_RATE: f64 = 48000.0;

fn benchmark_mixer(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixer");

    for sources in [1, 8, 32] {
        let mixer = MixerSource::new();
        for i in 0..sources {
            let sine: Arc<dyn AudioSource> = Arc::new(SineWaveSource::new(110.0 * (i + 1) as f64));
            mixer.add_source(sine, true).unwrap();
        }
        mixer.set_pan(0.3);
        mixer.set_level_meter_channel_count(2);
        mixer.open(BUFFER_SIZE, SAMPLE_RATE).unwrap();

        let mut block = AudioBuffer::new(2, BUFFER_SIZE);
        group.bench_with_input(BenchmarkId::new("sines", sources), &sources, |b, _| {
            b.iter(|| black_box(mixer.read(ReadRequest::whole(&mut block))))
        });
        mixer.close();
    }

    group.finish();
}

fn benchmark_clip_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("clip_series");

    // Clips shorter than a block force the series to split every read.
    for clip_length in [64i64, 256, 4096] {
        let series = AudioClipSeries::new();
        let mut position = 0;
        while position < 48000 {
            let content: Arc<dyn PositionableSource> = Arc::new(SineWaveSource::new(440.0));
            series
                .add_clip(AudioClip::new(position, content, 0, clip_length))
                .unwrap();
            position += clip_length;
        }
        series.open(BUFFER_SIZE, SAMPLE_RATE).unwrap();

        let mut block = AudioBuffer::new(2, BUFFER_SIZE);
        group.bench_with_input(
            BenchmarkId::new("clip_length", clip_length),
            &clip_length,
            |b, _| {
                b.iter(|| {
                    if series.next_read_position() >= 48000 {
                        series.set_next_read_position(0);
                    }
                    black_box(series.read(ReadRequest::whole(&mut block)))
                })
            },
        );
        series.close();
    }

    group.finish();
}

criterion_group!(benches, benchmark_mixer, benchmark_clip_series);
criterion_main!(benches);
