mod audio;
mod cli;
mod config;
mod encode;
mod error;
mod playlist;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

use audio::analyzer::SampleAnalyzer;
use audio::playback::PlaybackController;
use cli::Cli;
use config::SurfacesConfig;
use encode::ffmpeg::FfmpegEncoder;
use error::PlayerError;
use playlist::{Playlist, Track};
use render::color::{ColorScale, Rgba};
use render::surface::Surface;
use render::text::{load_font_from_url, TextOverlay};
use render::views::{draw_frequency_labels, draw_spectrogram, draw_spectrum, draw_waveform};

/// Cadence of the elapsed/duration refresh and end-of-track check.
const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Sleep between tick polls; the analyser gates actual work on fresh audio.
const IDLE_SLEEP: Duration = Duration::from_millis(5);

/// The four output surfaces, stacked vertically when recording.
struct Canvases {
    waveform: Surface,
    spectrum: Surface,
    spectrogram: Surface,
    labels: Surface,
}

impl Canvases {
    fn new(width: u32, cfg: &SurfacesConfig) -> Self {
        Self {
            waveform: Surface::new(width, cfg.waveform_height, Rgba::BLACK),
            spectrum: Surface::new(width, cfg.spectrum_height, Rgba::BLACK),
            spectrogram: Surface::new(width, cfg.spectrogram_height, Rgba::BLACK),
            labels: Surface::new(width, cfg.label_height, Rgba::BLACK),
        }
    }

    fn clear_all(&mut self) {
        self.waveform.clear(Rgba::BLACK);
        self.spectrum.clear(Rgba::BLACK);
        self.spectrogram.clear(Rgba::BLACK);
        self.labels.clear(Rgba::BLACK);
    }

    fn total_height(&self) -> u32 {
        self.waveform.height()
            + self.spectrum.height()
            + self.spectrogram.height()
            + self.labels.height()
    }

    fn composite(&self, frame: &mut [u8]) {
        let width = self.waveform.width();
        let mut y = 0;
        for surface in [&self.waveform, &self.spectrum, &self.spectrogram, &self.labels] {
            surface.blit_into(frame, width, y);
            y += surface.height();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect audioscope.toml /
    // the user config dir.
    let config_path = cli.config.clone().or_else(|| {
        let local = std::path::PathBuf::from("audioscope.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("audioscope").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    let cfg = match config_path {
        Some(ref path) => match config::load_config(path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}; using defaults", path.display());
                config::Config::default()
            }
        },
        None => config::Config::default(),
    };

    let playlist_path = cli.playlist.as_ref().context("Playlist file is required")?;
    let mut playlist = Playlist::load(playlist_path)?;
    playlist.set_shuffle(cli.shuffle);
    log::info!(
        "Loaded {} tracks from {} ({} mode)",
        playlist.len(),
        playlist_path.display(),
        if playlist.shuffle_enabled() { "shuffle" } else { "sequential" }
    );
    for (i, track) in playlist.tracks().iter().enumerate() {
        log::info!("  [{:2}] {}", i, track.title());
    }

    let scale = ColorScale::from_names(&cfg.colors.anchors, 0.0, 255.0)?;
    let mut analyzer = SampleAnalyzer::new(cfg.analysis.transform_size);
    let width = analyzer.bin_count() as u32;
    let mut canvases = Canvases::new(width, &cfg.surfaces);

    let overlay = load_overlay(&cli, cfg.colors.font_size);
    if overlay.is_none() {
        log::info!("No label font configured; frequency labels render tick marks only");
    }

    let mut controller = PlaybackController::new(analyzer.ring());

    let mut recorder: Option<FfmpegEncoder> = None;
    let mut frame_buf = vec![0u8; (width * canvases.total_height() * 4) as usize];

    // Position the playlist cursor on the first track.
    match cli.track {
        Some(index) => {
            playlist.select(index)?;
        }
        None => {
            playlist.advance();
        }
    }

    let progress = ProgressBar::new(1);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut consecutive_failures = 0usize;
    let mut last_poll = Instant::now();

    'player: loop {
        // Make sure the current selection is playing.
        while !controller.is_playing() {
            let track = playlist.current().cloned().context("playlist cursor unset")?;
            match start_track(&mut controller, &mut analyzer, &mut canvases, &track, overlay.as_ref()) {
                Ok(()) => {
                    consecutive_failures = 0;
                    let clock = controller.clock().context("session missing after play")?;
                    progress.set_length(clock.duration_secs().ceil().max(1.0) as u64);
                    progress.set_position(0);
                    progress.set_message(format!("{}  00:00 / {}", track.title(), format_clock(clock.duration_secs())));

                    if recorder.is_none() {
                        if let Some(path) = cli.record.as_ref() {
                            let sample_rate =
                                (controller.max_frequency_hz().unwrap_or(22050.0) * 2.0) as u32;
                            let framerate = format!("{}/{}", sample_rate, analyzer.bin_count());
                            recorder = Some(FfmpegEncoder::new(
                                path,
                                width,
                                canvases.total_height(),
                                &framerate,
                            )?);
                        }
                    }
                }
                Err(e @ PlayerError::Capability(_)) => {
                    // No audio backend: playback stays disabled.
                    return Err(e.into());
                }
                Err(e) => {
                    log::error!("{}", e);
                    consecutive_failures += 1;
                    if consecutive_failures >= playlist.len() {
                        anyhow::bail!("no playable tracks in playlist");
                    }
                    let advanced = playlist.advance();
                    if advanced.wrapped && !cli.repeat {
                        break 'player;
                    }
                }
            }
        }

        // Processing tick: one snapshot per hop of fresh audio.
        if let Some(snapshot) = analyzer.try_snapshot() {
            draw_waveform(&snapshot.time_domain, &mut canvases.waveform, &scale);
            draw_spectrum(&snapshot.frequency, &mut canvases.spectrum, &scale);
            draw_spectrogram(&snapshot.frequency, &mut canvases.spectrogram, &scale);

            if let Some(encoder) = recorder.as_mut() {
                canvases.composite(&mut frame_buf);
                encoder.write_frame(&frame_buf)?;
            }
        }

        // Coarse poll: time display and end-of-track auto-advance.
        if last_poll.elapsed() >= POLL_INTERVAL {
            last_poll = Instant::now();
            if let Some(clock) = controller.clock() {
                progress.set_position(clock.elapsed_secs() as u64);
                if let Some(track) = playlist.current() {
                    progress.set_message(format!(
                        "{}  {} / {}",
                        track.title(),
                        format_clock(clock.elapsed_secs()),
                        format_clock(clock.duration_secs())
                    ));
                }

                if clock.ended() {
                    controller.stop();
                    let advanced = playlist.advance();
                    if advanced.wrapped && !cli.repeat {
                        break 'player;
                    }
                }
            }
        }

        std::thread::sleep(IDLE_SLEEP);
    }

    controller.stop();
    canvases.clear_all();
    progress.finish_and_clear();

    if let Some(encoder) = recorder {
        encoder.finish()?;
    }

    log::info!("Playlist finished");
    Ok(())
}

/// Tear down, clear, and start the given track; the label strip is redrawn
/// per track because its range depends on the track's sample rate.
fn start_track(
    controller: &mut PlaybackController,
    analyzer: &mut SampleAnalyzer,
    canvases: &mut Canvases,
    track: &Track,
    overlay: Option<&TextOverlay>,
) -> std::result::Result<(), PlayerError> {
    controller.stop();
    analyzer.reset();
    canvases.clear_all();

    controller.play(&track.uri)?;

    let max_hz = controller.max_frequency_hz().unwrap_or(0.0);
    draw_frequency_labels(&mut canvases.labels, 0.0, max_hz, overlay);
    Ok(())
}

fn load_overlay(cli: &Cli, font_size: f32) -> Option<TextOverlay> {
    if let Some(url) = cli.font_url.as_deref() {
        match load_font_from_url(url).and_then(|bytes| TextOverlay::from_bytes(&bytes, font_size)) {
            Ok(overlay) => return Some(overlay),
            Err(err) => log::warn!("Failed to load font from URL: {}", err),
        }
    }
    if let Some(path) = cli.font.as_deref() {
        match TextOverlay::from_file(path, font_size) {
            Ok(overlay) => return Some(overlay),
            Err(err) => log::warn!("Failed to load font file: {}", err),
        }
    }
    None
}

/// `MM:SS`, or `HH:MM:SS` from one hour up.
fn format_clock(secs: f32) -> String {
    let total = secs.max(0.0) as u64;
    if total >= 3600 {
        format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    } else {
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(61.4), "01:01");
        assert_eq!(format_clock(3599.0), "59:59");
        assert_eq!(format_clock(3661.0), "01:01:01");
        assert_eq!(format_clock(-5.0), "00:00");
    }

    #[test]
    fn composite_stacks_surfaces_in_order() {
        let cfg = SurfacesConfig {
            waveform_height: 2,
            spectrum_height: 1,
            spectrogram_height: 1,
            label_height: 1,
        };
        let mut canvases = Canvases::new(4, &cfg);
        canvases.spectrum.clear(Rgba::WHITE);

        let mut frame = vec![0u8; (4 * canvases.total_height() * 4) as usize];
        canvases.composite(&mut frame);

        let stride = 4 * 4;
        // Rows 0-1 are the (black) waveform, row 2 the white spectrum.
        assert_eq!(frame[0], 0);
        assert_eq!(frame[2 * stride], 255);
        assert_eq!(frame[3 * stride], 0);
    }
}
