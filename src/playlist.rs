use std::path::Path;

use crate::error::PlayerError;

/// One playlist entry: a URI naming an audio resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub uri: String,
}

impl Track {
    /// Display title: the URI basename with its extension trimmed.
    pub fn title(&self) -> &str {
        let name = self.uri.rsplit('/').next().unwrap_or(&self.uri);
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }
}

/// The playlist plus the "currently playing" cursor. The track list is
/// immutable after loading; only the cursor and the shuffle flag change.
pub struct Playlist {
    tracks: Vec<Track>,
    current_index: Option<usize>,
    shuffle: bool,
}

/// Outcome of an `advance` call.
pub struct Advance {
    pub index: usize,
    /// True when sequential mode wrapped from the last track back to 0.
    pub wrapped: bool,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Result<Self, PlayerError> {
        if tracks.is_empty() {
            return Err(PlayerError::Configuration("playlist is empty".into()));
        }
        Ok(Self {
            tracks,
            current_index: None,
            shuffle: false,
        })
    }

    /// Load the playlist from a JSON document: a flat ordered array of URI
    /// strings. Anything else is a fatal configuration error.
    pub fn load(path: &Path) -> Result<Self, PlayerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlayerError::Configuration(format!("cannot read playlist {}: {}", path.display(), e))
        })?;
        let uris: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            PlayerError::Configuration(format!("invalid playlist {}: {}", path.display(), e))
        })?;
        Self::new(uris.into_iter().map(|uri| Track { uri }).collect())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
    }

    /// Pick the next track. Shuffle mode draws a uniformly random index and
    /// may repeat the current track; sequential mode steps forward and
    /// wraps to 0 after the last track.
    pub fn advance(&mut self) -> Advance {
        let len = self.tracks.len();
        let (index, wrapped) = if self.shuffle {
            ((rand::random::<f32>() * len as f32) as usize % len, false)
        } else {
            match self.current_index {
                Some(i) if i + 1 >= len => (0, true),
                Some(i) => (i + 1, false),
                None => (0, false),
            }
        };
        self.current_index = Some(index);
        Advance { index, wrapped }
    }

    /// User-initiated selection of an explicit index.
    pub fn select(&mut self, index: usize) -> Result<&Track, PlayerError> {
        if index >= self.tracks.len() {
            return Err(PlayerError::Configuration(format!(
                "track index {} out of range (playlist has {} tracks)",
                index,
                self.tracks.len()
            )));
        }
        self.current_index = Some(index);
        Ok(&self.tracks[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(n: usize, shuffle: bool) -> Playlist {
        let tracks = (0..n)
            .map(|i| Track {
                uri: format!("media/track{}.mp3", i),
            })
            .collect();
        let mut p = Playlist::new(tracks).unwrap();
        p.set_shuffle(shuffle);
        p
    }

    #[test]
    fn sequential_advance_steps_and_wraps() {
        let mut p = playlist(3, false);
        assert_eq!(p.advance().index, 0);
        assert_eq!(p.advance().index, 1);
        assert_eq!(p.advance().index, 2);

        let a = p.advance();
        assert_eq!(a.index, 0);
        assert!(a.wrapped);
    }

    #[test]
    fn last_index_advances_to_zero() {
        let mut p = playlist(5, false);
        p.select(4).unwrap();
        assert_eq!(p.advance().index, 0);
    }

    #[test]
    fn two_track_playlist_advances_from_one_to_zero() {
        let mut p = Playlist::new(vec![
            Track { uri: "a.mp3".into() },
            Track { uri: "b.mp3".into() },
        ])
        .unwrap();
        p.select(1).unwrap();
        let a = p.advance();
        assert_eq!(a.index, 0);
        assert_eq!(p.current().unwrap().uri, "a.mp3");
    }

    #[test]
    fn shuffle_stays_in_range() {
        let mut p = playlist(7, true);
        for _ in 0..200 {
            let a = p.advance();
            assert!(a.index < 7);
            assert!(!a.wrapped);
        }
    }

    #[test]
    fn shuffle_of_single_track_always_returns_zero() {
        let mut p = playlist(1, true);
        for _ in 0..20 {
            assert_eq!(p.advance().index, 0);
        }
    }

    #[test]
    fn select_rejects_out_of_range() {
        let mut p = playlist(2, false);
        assert!(p.select(2).is_err());
        assert!(p.current().is_none());
    }

    #[test]
    fn empty_playlist_is_a_configuration_error() {
        assert!(matches!(
            Playlist::new(vec![]),
            Err(PlayerError::Configuration(_))
        ));
    }

    #[test]
    fn titles_trim_directory_and_extension() {
        let t = Track {
            uri: "https://host/music/My Song.mp3".into(),
        };
        assert_eq!(t.title(), "My Song");
        let bare = Track { uri: "noext".into() };
        assert_eq!(bare.title(), "noext");
    }

    #[test]
    fn load_rejects_invalid_json() {
        let path = std::env::temp_dir().join("audioscope_bad_playlist.json");
        std::fs::write(&path, "{\"not\": \"a list\"}").unwrap();
        assert!(matches!(
            Playlist::load(&path),
            Err(PlayerError::Configuration(_))
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_reads_uri_array() {
        let path = std::env::temp_dir().join("audioscope_playlist.json");
        std::fs::write(&path, "[\"a.mp3\", \"b.ogg\"]").unwrap();
        let p = Playlist::load(&path).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.tracks()[1].uri, "b.ogg");
        let _ = std::fs::remove_file(&path);
    }
}
