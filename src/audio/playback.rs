use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::analyzer::AnalysisRing;
use super::decode::{decode_track_bytes, fetch_track_bytes, DecodedTrack};
use crate::error::PlayerError;

const OUTPUT_CHANNELS: u16 = 2;

/// Read-only view of a session's playback position.
#[derive(Clone)]
pub struct SessionClock {
    frames_played: Arc<AtomicU64>,
    total_frames: u64,
    sample_rate: u32,
}

impl SessionClock {
    fn new(frames_played: Arc<AtomicU64>, total_frames: u64, sample_rate: u32) -> Self {
        Self {
            frames_played,
            total_frames,
            sample_rate,
        }
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.frames_played.load(Ordering::Relaxed) as f32 / self.sample_rate as f32
    }

    pub fn duration_secs(&self) -> f32 {
        self.total_frames as f32 / self.sample_rate as f32
    }

    pub fn ended(&self) -> bool {
        self.frames_played.load(Ordering::Relaxed) >= self.total_frames
    }
}

/// One live playback instance. At most one exists at a time; dropping it
/// halts the output stream and releases the decoded buffer.
struct Session {
    _stream: cpal::Stream,
    clock: SessionClock,
    loop_enabled: Arc<AtomicBool>,
    sample_rate: u32,
    uri: String,
}

/// Owns the single active audio session and feeds the analyser from the
/// output callback. All lifecycle mutation happens on the caller's thread;
/// the callback only copies frames out and pushes mono samples in.
pub struct PlaybackController {
    analyser_ring: Arc<Mutex<AnalysisRing>>,
    session: Option<Session>,
}

impl PlaybackController {
    pub fn new(analyser_ring: Arc<Mutex<AnalysisRing>>) -> Self {
        Self {
            analyser_ring,
            session: None,
        }
    }

    /// Fetch, decode, and start playing a track from time zero with loop
    /// disabled. Any existing session is fully torn down first, so a decode
    /// can never complete into a session that is no longer current.
    pub fn play(&mut self, uri: &str) -> Result<(), PlayerError> {
        self.stop();

        let bytes = fetch_track_bytes(uri)?;
        let track = decode_track_bytes(uri, bytes)?;

        let session = self.start_session(uri, track)?;
        log::info!(
            "Playing '{}' ({:.1}s @ {} Hz)",
            uri,
            session.clock.duration_secs(),
            session.sample_rate
        );
        self.session = Some(session);
        Ok(())
    }

    /// Tear the active session down: disable loop, halt the stream, release
    /// the decoded buffer. No-op when nothing is playing.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            session.loop_enabled.store(false, Ordering::Relaxed);
            log::info!("Stopped '{}'", session.uri);
            // Dropping the stream disconnects the signal chain and releases
            // the sample buffer held by the callback.
            drop(session);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.session.is_some()
    }

    pub fn clock(&self) -> Option<SessionClock> {
        self.session.as_ref().map(|s| s.clock.clone())
    }

    /// Half the track's sample rate: the top of the analysable frequency
    /// range, used for the label strip.
    pub fn max_frequency_hz(&self) -> Option<f32> {
        self.session.as_ref().map(|s| s.sample_rate as f32 / 2.0)
    }

    fn start_session(&self, uri: &str, track: DecodedTrack) -> Result<Session, PlayerError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PlayerError::Capability("no audio output device found".into()))?;

        let config = cpal::StreamConfig {
            channels: OUTPUT_CHANNELS,
            sample_rate: cpal::SampleRate(track.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let total_frames = track.frames();
        let sample_rate = track.sample_rate;
        let src_channels = track.channels;
        let samples = Arc::new(track.samples);

        let frames_played = Arc::new(AtomicU64::new(0));
        let loop_enabled = Arc::new(AtomicBool::new(false));

        let ring = Arc::clone(&self.analyser_ring);
        let cb_samples = Arc::clone(&samples);
        let cb_frames = Arc::clone(&frames_played);
        let cb_loop = Arc::clone(&loop_enabled);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut ring = ring.lock().unwrap();
                    let mut frame = cb_frames.load(Ordering::Relaxed);

                    for out in data.chunks_exact_mut(OUTPUT_CHANNELS as usize) {
                        if frame >= total_frames {
                            if cb_loop.load(Ordering::Relaxed) {
                                frame = 0;
                            } else {
                                out.fill(0.0);
                                continue;
                            }
                        }

                        let base = frame as usize * src_channels;
                        let src = &cb_samples[base..base + src_channels];
                        let (left, right) = if src_channels == 1 {
                            (src[0], src[0])
                        } else {
                            (src[0], src[1])
                        };
                        out[0] = left;
                        out[1] = right;

                        let mono = src.iter().sum::<f32>() / src_channels as f32;
                        ring.push(mono);

                        frame += 1;
                    }

                    cb_frames.store(frame, Ordering::Relaxed);
                },
                |err| log::error!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| PlayerError::Capability(format!("failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| PlayerError::Capability(format!("failed to start output stream: {}", e)))?;

        Ok(Session {
            _stream: stream,
            clock: SessionClock::new(frames_played, total_frames, sample_rate),
            loop_enabled,
            sample_rate,
            uri: uri.to_string(),
        })
    }
}
