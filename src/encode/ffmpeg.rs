use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Pipes raw RGBA frames to an ffmpeg child process, producing a video of
/// the visualization session. Video only: the session may span several
/// tracks, so there is no single audio stream to mux.
pub struct FfmpegEncoder {
    child: Child,
}

impl FfmpegEncoder {
    /// `framerate` is an ffmpeg rate expression; the tick cadence is one
    /// frame per analysis hop, i.e. `sample_rate/hop` frames per second.
    pub fn new(output_path: &Path, width: u32, height: u32, framerate: &str) -> Result<Self> {
        let args = vec![
            "-y".to_string(),
            "-f".into(), "rawvideo".into(),
            "-pixel_format".into(), "rgba".into(),
            "-video_size".into(), format!("{}x{}", width, height),
            "-framerate".into(), framerate.to_string(),
            "-i".into(), "pipe:0".into(),
            "-c:v".into(), "libx264".into(),
            "-pix_fmt".into(), "yuv420p".into(),
            "-crf".into(), "18".into(),
            "-preset".into(), "medium".into(),
            output_path.to_str().context("non-UTF8 output path")?.to_string(),
        ];

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "Recording visualization: {}x{} @ {} fps -> {}",
            width,
            height,
            framerate,
            output_path.display()
        );

        Ok(Self { child })
    }

    pub fn write_frame(&mut self, rgba_pixels: &[u8]) -> Result<()> {
        let stdin = self.child.stdin.as_mut().context("ffmpeg stdin not available")?;
        stdin
            .write_all(rgba_pixels)
            .context("Failed to write frame to ffmpeg")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        // Closing stdin signals EOF.
        drop(self.child.stdin.take());

        let output = self.child.wait_with_output().context("Failed to wait for ffmpeg")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg exited with error:\n{}", stderr);
        }

        log::info!("Recording complete");
        Ok(())
    }
}
