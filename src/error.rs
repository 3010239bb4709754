use thiserror::Error;

/// Error kinds surfaced by the playback and configuration layers.
///
/// None of these are retried automatically; each leaves the player idle with
/// no dangling session.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Bad or missing playlist/configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No usable audio output backend. Playback stays disabled.
    #[error("audio output unavailable: {0}")]
    Capability(String),

    /// Retrieving the track bytes failed. The sequencer is unaffected;
    /// re-selecting the track retries.
    #[error("failed to fetch '{uri}': {reason}")]
    Fetch { uri: String, reason: String },

    /// The fetched bytes could not be decoded as audio.
    #[error("failed to decode '{uri}': {reason}")]
    Decode { uri: String, reason: String },
}
