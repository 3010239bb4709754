use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "audioscope",
    about = "Audio player with real-time waveform, spectrum, and spectrogram visualizations"
)]
pub struct Cli {
    /// Playlist file: a JSON array of track URIs (paths or http(s) URLs)
    pub playlist: Option<PathBuf>,

    /// Config file (default: audioscope.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pick the next track at random instead of in playlist order
    #[arg(long)]
    pub shuffle: bool,

    /// Start from this playlist index instead of the first track
    #[arg(long, value_name = "INDEX")]
    pub track: Option<usize>,

    /// Keep playing after the playlist wraps around
    #[arg(long)]
    pub repeat: bool,

    /// Record the visualization to a video file (requires ffmpeg)
    #[arg(long, value_name = "FILE")]
    pub record: Option<PathBuf>,

    /// TTF/OTF font for the frequency labels
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Download the label font from a URL
    #[arg(long)]
    pub font_url: Option<String>,
}
