use bytes::Bytes;
use std::time::Duration;

/// One access unit handed to the muxer.
///
/// `time` is the decode time relative to the start of the session and
/// `composition_time` the offset from decode to presentation time (video
/// only, zero when frames are not reordered).
#[derive(Debug, Clone)]
pub struct Packet {
    pub data: Bytes,
    pub time: Duration,
    pub composition_time: Duration,
    pub is_key: bool,
}

impl Packet {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            time: Duration::ZERO,
            composition_time: Duration::ZERO,
            is_key: false,
        }
    }

    pub fn with_time(mut self, time: Duration) -> Self {
        self.time = time;
        self
    }

    pub fn with_composition_time(mut self, composition_time: Duration) -> Self {
        self.composition_time = composition_time;
        self
    }

    pub fn with_key_flag(mut self, is_key: bool) -> Self {
        self.is_key = is_key;
        self
    }

    /// Presentation time, i.e. decode time plus composition offset.
    pub fn presentation_time(&self) -> Duration {
        self.time + self.composition_time
    }
}
