use crate::codec::aac::AacCodecData;
use crate::codec::h264::H264CodecData;
use crate::error::{MuxError, Result};
use std::fmt;

/// Codec tags a media source can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecType {
    H264,
    H265,
    AAC,
    OPUS,
}

impl CodecType {
    /// Media type this codec belongs to.
    pub fn media_type(&self) -> MediaType {
        match self {
            CodecType::H264 | CodecType::H265 => MediaType::Video,
            CodecType::AAC | CodecType::OPUS => MediaType::Audio,
        }
    }
}

/// The two logical channels a session can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Audio,
    Video,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Audio => f.write_str("audio"),
            MediaType::Video => f.write_str("video"),
        }
    }
}

/// Decoder configuration attached to a stream.
///
/// The set is closed: only H.264 and AAC can be carried by the muxer, so a
/// value of this type is always muxable. Each variant holds exactly what its
/// framing path needs.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecData {
    H264(H264CodecData),
    Aac(AacCodecData),
}

impl CodecData {
    /// Builds codec data from a codec tag and its decoder configuration.
    ///
    /// `extra_data` is an AVCDecoderConfigurationRecord for H.264 and an
    /// AudioSpecificConfig for AAC.
    pub fn new(codec_type: CodecType, extra_data: &[u8]) -> Result<Self> {
        match codec_type {
            CodecType::H264 => Ok(CodecData::H264(
                H264CodecData::from_decoder_config_record(extra_data)?,
            )),
            CodecType::AAC => Ok(CodecData::Aac(AacCodecData::from_config_bytes(extra_data)?)),
            other => Err(MuxError::UnsupportedCodecType(other)),
        }
    }

    pub fn codec_type(&self) -> CodecType {
        match self {
            CodecData::H264(_) => CodecType::H264,
            CodecData::Aac(_) => CodecType::AAC,
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.codec_type().media_type()
    }
}

impl From<H264CodecData> for CodecData {
    fn from(codec: H264CodecData) -> Self {
        CodecData::H264(codec)
    }
}

impl From<AacCodecData> for CodecData {
    fn from(codec: AacCodecData) -> Self {
        CodecData::Aac(codec)
    }
}

mod packet;
pub use packet::*;
