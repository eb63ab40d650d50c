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
use std::thread;
use std::time::{Duration, Instant};

use crate::audio::buffer::{AudioBuffer, SampleProvider};
use crate::audio::source::{
    AudioSource, ChannelMask, MemorySource, PlaybackStatus, PositionableSource, ReadRequest,
    SineWaveSource, TransportSource, UNBOUNDED_LENGTH,
};
use crate::testutil::{constant_source, ramp_source, read_block, MockSource};

fn assert_close(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < 1e-6, "sample {}: {} != {}", i, a, e);
    }
}

#[test]
fn test_channel_mask() {
    let mask = ChannelMask::from_channels(&[0, 3]);
    assert!(mask.contains(0));
    assert!(!mask.contains(1));
    assert!(mask.contains(3));
    assert!(!mask.contains(100));
    assert_eq!(mask.bits(), 0b1001);
    assert!(ChannelMask::ALL.contains(100));
    assert!(ChannelMask::NONE.is_empty());
    assert_eq!(ChannelMask::NONE.with(64), ChannelMask::NONE);
}

#[test]
#[should_panic(expected = "out of range")]
fn test_read_request_checks_range() {
    let mut buffer = AudioBuffer::new(1, 8);
    let _ = ReadRequest::new(&mut buffer, 6, 4);
}

#[test]
fn test_memory_source_reads_and_pads() {
    let source = ramp_source(10);
    source.open(4, 48000.0).unwrap();
    assert_eq!(source.length(), 10);

    let (block, produced) = read_block(&*source, 1, 4);
    assert_eq!(produced, 4);
    assert_eq!(block.channel(0), &[0.0, 1.0, 2.0, 3.0]);
    assert_eq!(source.next_read_position(), 4);

    source.set_next_read_position(8);
    let (block, produced) = read_block(&*source, 1, 4);
    assert_eq!(produced, 2);
    assert_eq!(block.channel(0), &[8.0, 9.0, 0.0, 0.0]);
    assert_eq!(source.next_read_position(), 12);

    let (block, produced) = read_block(&*source, 1, 4);
    assert_eq!(produced, 0);
    assert_eq!(block.channel(0), &[0.0; 4]);
    assert_eq!(source.next_read_position(), 16);

    source.set_next_read_position(-2);
    let (block, produced) = read_block(&*source, 1, 4);
    assert_eq!(produced, 2);
    assert_eq!(block.channel(0), &[0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_memory_source_writes_into_offset_range() {
    let source = ramp_source(10);
    let mut buffer = AudioBuffer::from_planar(vec![vec![-1.0; 6]]);
    let produced = source.read(ReadRequest::new(&mut buffer, 2, 3));
    assert_eq!(produced, 3);
    assert_eq!(buffer.channel(0), &[-1.0, -1.0, 0.0, 1.0, 2.0, -1.0]);
}

#[test]
fn test_memory_source_honours_silent_channels() {
    let source = constant_source(2, 8, 0.5);
    let mut buffer = AudioBuffer::from_planar(vec![vec![1.0; 4], vec![1.0; 4], vec![1.0; 4]]);
    let produced = source.read(
        ReadRequest::whole(&mut buffer).with_silent(ChannelMask::from_channels(&[1])),
    );
    assert_eq!(produced, 4);
    assert_eq!(buffer.channel(0), &[0.5; 4]);
    assert_eq!(buffer.channel(1), &[0.0; 4]);
    // Content only has two channels.
    assert_eq!(buffer.channel(2), &[0.0; 4]);
}

#[test]
fn test_memory_source_set_buffer_rewinds() {
    let source = MemorySource::new(Arc::new(AudioBuffer::new(1, 4)));
    source.set_next_read_position(3);
    let previous = source.set_buffer(Arc::new(AudioBuffer::new(2, 16)));
    assert_eq!(previous.sample_count(), 4);
    assert_eq!(source.next_read_position(), 0);
    assert_eq!(source.length(), 16);
    assert_eq!(source.buffer().channel_count(), 2);
}

#[test]
fn test_sine_wave_source() {
    let source = SineWaveSource::new(12000.0);
    assert_eq!(source.length(), UNBOUNDED_LENGTH);

    // Closed sources have no sample rate and produce nothing.
    let (block, produced) = read_block(&source, 1, 4);
    assert_eq!(produced, 0);
    assert_eq!(block.channel(0), &[0.0; 4]);
    assert_eq!(source.next_read_position(), 4);

    source.open(16, 48000.0).unwrap();
    source.set_next_read_position(0);
    let (block, produced) = read_block(&source, 2, 8);
    assert_eq!(produced, 8);
    let expected = [0.0, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0];
    assert_close(block.channel(0), &expected);
    assert_close(block.channel(1), &expected);

    source.set_amplitude(0.5);
    source.set_next_read_position(1);
    let mut buffer = AudioBuffer::new(2, 2);
    let produced =
        source.read(ReadRequest::whole(&mut buffer).with_silent(ChannelMask::from_channels(&[0])));
    assert_eq!(produced, 2);
    assert_close(buffer.channel(0), &[0.0, 0.0]);
    assert_close(buffer.channel(1), &[0.5, 0.0]);
}

#[test]
fn test_sine_wave_source_with_phase_function() {
    let source = SineWaveSource::with_phase(Arc::new(|position| 12000.0 * position as f64));
    source.open(4, 48000.0).unwrap();
    let (block, _) = read_block(&source, 1, 4);
    assert_close(block.channel(0), &[0.0, 1.0, 0.0, -1.0]);
    assert_eq!((source.phase())(2), 24000.0);
}

#[test]
fn test_transport_play_and_pause() {
    let transport = TransportSource::new(ramp_source(100), true);
    transport.open(8, 48000.0).unwrap();
    assert_eq!(transport.length(), 100);
    assert_eq!(transport.playback_status(), PlaybackStatus::Paused);

    let (block, produced) = read_block(&transport, 1, 4);
    assert_eq!(produced, 4);
    assert_eq!(block.channel(0), &[0.0; 4]);
    assert_eq!(transport.position(), 0);

    transport.play();
    assert_eq!(transport.playback_status(), PlaybackStatus::AboutToPlay);
    assert!(transport.is_playing());
    let (block, _) = read_block(&transport, 1, 4);
    assert_eq!(block.channel(0), &[0.0, 1.0, 2.0, 3.0]);
    assert_eq!(transport.playback_status(), PlaybackStatus::Playing);
    assert_eq!(transport.position(), 4);

    transport.pause();
    assert_eq!(transport.playback_status(), PlaybackStatus::AboutToPause);
    let (block, _) = read_block(&transport, 1, 4);
    assert_eq!(block.channel(0), &[0.0; 4]);
    assert_eq!(transport.playback_status(), PlaybackStatus::Paused);
    assert_eq!(transport.position(), 4);

    transport.play();
    transport.pause();
    assert_eq!(transport.playback_status(), PlaybackStatus::Paused);
}

#[test]
fn test_transport_seek_propagates() {
    let source = ramp_source(100);
    let transport = TransportSource::new(source.clone(), false);
    transport.set_position(40);
    assert_eq!(source.next_read_position(), 40);
    transport.play();
    let (block, _) = read_block(&transport, 1, 2);
    assert_eq!(block.channel(0), &[40.0, 41.0]);
}

#[test]
fn test_transport_loops() {
    let transport = TransportSource::new(ramp_source(100), true);
    transport.set_loop_range(Some(2..6));
    assert_eq!(transport.loop_range(), Some(2..6));
    transport.set_position(2);
    transport.play();

    let (block, produced) = read_block(&transport, 1, 10);
    assert_eq!(produced, 10);
    assert_eq!(
        block.channel(0),
        &[2.0, 3.0, 4.0, 5.0, 2.0, 3.0, 4.0, 5.0, 2.0, 3.0]
    );
    assert_eq!(transport.position(), 4);

    transport.set_loop_range(Some(5..5));
    assert_eq!(transport.loop_range(), None);
}

#[test]
fn test_transport_buffering_holds_playhead() {
    let transport = TransportSource::new(ramp_source(100), true);
    transport.play();
    transport.acquire_buffering();
    transport.acquire_buffering();
    assert!(transport.is_buffering());

    let (block, _) = read_block(&transport, 1, 4);
    assert_eq!(block.channel(0), &[0.0; 4]);
    assert_eq!(transport.position(), 0);

    transport.release_buffering();
    let (block, _) = read_block(&transport, 1, 4);
    assert_eq!(block.channel(0), &[0.0; 4]);

    transport.release_buffering();
    let (block, _) = read_block(&transport, 1, 4);
    assert_eq!(block.channel(0), &[0.0, 1.0, 2.0, 3.0]);
}

#[test]
#[should_panic(expected = "buffering released")]
fn test_transport_unbalanced_release_panics() {
    let transport = TransportSource::default();
    transport.release_buffering();
}

#[test]
fn test_transport_source_replacement() {
    let transport = TransportSource::default();
    transport.open(64, 44100.0).unwrap();
    transport.set_position(10);

    let first = Arc::new(MockSource::new(1.0, 100));
    let first_handle: Arc<dyn PositionableSource> = first.clone();
    transport.set_source(Some(first_handle), true).unwrap();
    assert_eq!(first.opens(), 1);
    assert_eq!(first.seeks(), vec![10]);
    assert_eq!(first.stream_state().buffer_size(), 64);

    let failing: Arc<dyn PositionableSource> = Arc::new(MockSource::failing());
    assert!(transport.set_source(Some(failing), true).is_err());
    assert!(transport.source().is_some());
    assert_eq!(first.closes(), 0);

    transport.set_source(None, false).unwrap();
    assert_eq!(first.closes(), 1);
    assert!(transport.source().is_none());
    assert_eq!(transport.length(), 0);
}

#[test]
fn test_transport_control_calls_do_not_wait_on_reads() {
    let source = Arc::new(MockSource::new(1.0, 1000));
    source.set_read_delay(Duration::from_millis(300));
    let handle: Arc<dyn PositionableSource> = source.clone();
    let transport = TransportSource::new(handle, false);
    transport.play();

    thread::scope(|scope| {
        let reader = scope.spawn(|| read_block(&transport, 1, 16));
        thread::sleep(Duration::from_millis(50));

        let started = Instant::now();
        let position = transport.position();
        transport.length();
        let waited = started.elapsed();
        assert!(
            waited < Duration::from_millis(150),
            "position() waited {:?} on a read",
            waited
        );
        assert!(position == 0 || position == 16);

        let (block, produced) = reader.join().unwrap();
        assert_eq!(produced, 16);
        assert_eq!(block.channel(0), &[1.0; 16]);
    });
    assert_eq!(transport.position(), 16);
}
