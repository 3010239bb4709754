use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::PlayerError;

/// One fully decoded track, ready for the output device.
#[derive(Debug)]
pub struct DecodedTrack {
    /// Interleaved f32 samples.
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl DecodedTrack {
    pub fn frames(&self) -> u64 {
        (self.samples.len() / self.channels) as u64
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }
}

/// Retrieve the raw bytes behind a track URI: a single GET for http(s)
/// URIs, a filesystem read otherwise.
pub fn fetch_track_bytes(uri: &str) -> Result<Vec<u8>, PlayerError> {
    let fetch_err = |reason: String| PlayerError::Fetch {
        uri: uri.to_string(),
        reason,
    };

    if uri.starts_with("http://") || uri.starts_with("https://") {
        let response = reqwest::blocking::get(uri).map_err(|e| fetch_err(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP {}", response.status())));
        }
        let bytes = response.bytes().map_err(|e| fetch_err(e.to_string()))?;
        Ok(bytes.to_vec())
    } else {
        std::fs::read(uri).map_err(|e| fetch_err(e.to_string()))
    }
}

/// Decode a fetched byte buffer into interleaved f32 samples.
pub fn decode_track_bytes(uri: &str, bytes: Vec<u8>) -> Result<DecodedTrack, PlayerError> {
    let decode_err = |reason: String| PlayerError::Decode {
        uri: uri.to_string(),
        reason,
    };

    let cursor = std::io::Cursor::new(bytes);
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension_of(uri) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_err(format!("unrecognized audio format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| decode_err("no audio tracks found".into()))?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| decode_err("unknown sample rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_err(format!("no decoder for codec: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(decode_err(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Skip over corrupt packets; a partially damaged file still plays.
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(decode_err(e.to_string())),
        };

        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    if samples.is_empty() {
        return Err(decode_err("no audio samples decoded".into()));
    }

    let track = DecodedTrack {
        samples,
        channels,
        sample_rate,
    };

    log::info!(
        "Decoded '{}': {} frames, {} ch, {} Hz, {:.1}s",
        uri,
        track.frames(),
        track.channels,
        track.sample_rate,
        track.duration_secs()
    );

    Ok(track)
}

fn extension_of(uri: &str) -> Option<&str> {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let name = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 4 {
        return None;
    }
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(sample_rate: u32, samples: &[f32]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_wav_fixture() {
        let samples: Vec<f32> = (0..4410)
            .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / 44100.0).sin() * 0.5)
            .collect();
        let bytes = wav_bytes(44100, &samples);

        let track = decode_track_bytes("tone.wav", bytes).unwrap();
        assert_eq!(track.sample_rate, 44100);
        assert_eq!(track.channels, 1);
        assert_eq!(track.frames(), 4410);
        assert!((track.duration_secs() - 0.1).abs() < 1e-3);
    }

    #[test]
    fn garbage_bytes_report_decode_error() {
        let err = decode_track_bytes("junk.mp3", vec![0xde, 0xad, 0xbe, 0xef]).unwrap_err();
        assert!(matches!(err, PlayerError::Decode { .. }));
    }

    #[test]
    fn missing_file_reports_fetch_error() {
        let err = fetch_track_bytes("/no/such/file.mp3").unwrap_err();
        assert!(matches!(err, PlayerError::Fetch { .. }));
    }

    #[test]
    fn fetch_reads_local_files() {
        let path = std::env::temp_dir().join("audioscope_fetch_test.bin");
        std::fs::write(&path, b"abc").unwrap();
        let bytes = fetch_track_bytes(path.to_str().unwrap()).unwrap();
        assert_eq!(bytes, b"abc");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn extension_extraction_handles_urls() {
        assert_eq!(extension_of("https://host/a/track.mp3?q=1"), Some("mp3"));
        assert_eq!(extension_of("media/song.flac"), Some("flac"));
        assert_eq!(extension_of("noextension"), None);
    }
}
