use serde::Serialize;
use ts::{StreamInventory, StreamKind, TsError, probe_streams};

/// A segment either lacks a required stream or cannot be opened at all
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No {0} stream found in .ts segment")]
    MissingStream(StreamKind),

    #[error("Failed to open segment as MPEG-TS: {0}")]
    Container(#[from] TsError),
}

impl ValidationError {
    /// Missing streams fail a check; container errors are reported as errors
    pub fn is_assertion(&self) -> bool {
        matches!(self, ValidationError::MissingStream(_))
    }
}

/// A declared elementary stream, as shown in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    pub pid: u16,
    pub kind: &'static str,
    pub codec: &'static str,
    pub stream_type: u8,
}

/// Video/audio flags accumulated over the declared streams of a segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamPresence {
    pub video: bool,
    pub audio: bool,
    pub streams: Vec<StreamSummary>,
}

impl StreamPresence {
    fn from_inventory(inventory: &StreamInventory) -> Self {
        let mut presence = StreamPresence::default();
        for stream in inventory.streams() {
            let kind = stream.kind();
            match kind {
                StreamKind::Video => presence.video = true,
                StreamKind::Audio => presence.audio = true,
                _ => {}
            }
            presence.streams.push(StreamSummary {
                pid: stream.elementary_pid,
                kind: kind.as_str(),
                codec: stream.stream_type.codec_name(),
                stream_type: stream.stream_type.value(),
            });
        }
        presence
    }

    /// Require a video stream, then an audio stream
    pub fn check(&self) -> Result<(), ValidationError> {
        if !self.video {
            return Err(ValidationError::MissingStream(StreamKind::Video));
        }
        if !self.audio {
            return Err(ValidationError::MissingStream(StreamKind::Audio));
        }
        Ok(())
    }
}

/// Enumerate the streams a segment declares without judging them
pub fn inspect(data: &[u8]) -> Result<StreamPresence, ValidationError> {
    let inventory = probe_streams(data)?;
    Ok(StreamPresence::from_inventory(&inventory))
}

/// Open a segment and require at least one video and one audio stream.
///
/// Codecs, durations and bitrates are not checked and no frame is decoded.
pub fn validate(data: &[u8]) -> Result<StreamPresence, ValidationError> {
    let presence = inspect(data)?;
    presence.check()?;
    Ok(presence)
}
