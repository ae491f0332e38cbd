use bytes::Bytes;

use super::types::{AacConfig, ADTSHeader, ProfileType, AAC_FRAME_SAMPLES, ADTS_HEADER_LENGTH};
use crate::error::{MuxError, Result};
use crate::utils::BitReader;
use log::{debug, warn};

/// Explicit SBR (HE-AAC) and PS (HE-AAC v2) object types.
const OBJECT_TYPE_SBR: u32 = 5;
const OBJECT_TYPE_PS: u32 = 29;

/// Decoder configuration of an AAC stream.
#[derive(Debug, Clone, PartialEq)]
pub struct AacCodecData {
    config: AacConfig,
    config_bytes: Bytes,
}

impl AacCodecData {
    /// Parses an AudioSpecificConfig (ISO/IEC 14496-3, 1.6.2.1).
    pub fn from_config_bytes(data: &[u8]) -> Result<Self> {
        let config = parse_audio_specific_config(data)?;
        Ok(Self {
            config,
            config_bytes: Bytes::copy_from_slice(data),
        })
    }

    /// Builds codec data from already known parameters.
    pub fn from_config(config: AacConfig) -> Self {
        // objectType(5) samplingFrequencyIndex(4) channelConfiguration(4) GASpecificConfig(3)
        let packed = (config.object_type as u16 & 0x1f) << 11
            | (config.sample_rate_index as u16 & 0xf) << 7
            | (config.channel_configuration as u16 & 0xf) << 3;
        Self {
            config,
            config_bytes: Bytes::copy_from_slice(&packed.to_be_bytes()),
        }
    }

    pub fn config(&self) -> &AacConfig {
        &self.config
    }

    pub fn config_bytes(&self) -> &[u8] {
        &self.config_bytes
    }
}

/// Parses an AudioSpecificConfig into the fields an ADTS header carries.
///
/// For explicitly signalled HE-AAC (v1 and v2) the extension sampling rate
/// is skipped and the underlying object type is kept, so the ADTS header
/// describes the core stream at its core sampling rate.
pub fn parse_audio_specific_config(data: &[u8]) -> Result<AacConfig> {
    let mut reader = BitReader::new(data);

    let mut object_type = read_object_type(&mut reader)?;
    let sample_rate_index = read_sample_rate_index(&mut reader)?;

    let channel_configuration = reader.read_bits(4)? as u8;
    if channel_configuration > 7 {
        return Err(MuxError::Codec(format!(
            "invalid channel configuration {}",
            channel_configuration
        )));
    }

    if object_type == OBJECT_TYPE_SBR || object_type == OBJECT_TYPE_PS {
        let extension_index = read_sample_rate_index(&mut reader)?;
        let core_type = read_object_type(&mut reader)?;
        debug!(
            "HE-AAC config (object type {}): core object type {}, extension rate index {}",
            object_type, core_type, extension_index
        );
        object_type = core_type;
    }

    if object_type == 0 || object_type > 4 {
        warn!(
            "audio object type {} has no ADTS profile, header will be approximate",
            object_type
        );
    }

    Ok(AacConfig {
        object_type: object_type as u8,
        sample_rate_index,
        channel_configuration,
    })
}

fn read_object_type(reader: &mut BitReader) -> Result<u32> {
    let object_type = reader.read_bits(5)?;
    if object_type == 31 {
        return Ok(32 + reader.read_bits(6)?);
    }
    Ok(object_type)
}

fn read_sample_rate_index(reader: &mut BitReader) -> Result<u8> {
    let index = reader.read_bits(4)? as u8;
    if index != 0xf {
        return Ok(index);
    }

    let rate = reader.read_bits(24)?;
    AacConfig::sample_rate_index_of(rate).ok_or_else(|| {
        MuxError::Codec(format!("sample rate {} cannot be signalled in ADTS", rate))
    })
}

/// Fills a 7-byte ADTS header for a raw frame of `payload_len` bytes
/// carrying `samples` samples.
pub fn fill_adts_header(
    buf: &mut [u8; ADTS_HEADER_LENGTH],
    config: &AacConfig,
    samples: usize,
    payload_len: usize,
) {
    let blocks = (samples / AAC_FRAME_SAMPLES).max(1) - 1;
    let header = ADTSHeader {
        sync_word: 0xFFF,
        id: 0,
        layer: 0,
        protection_absent: true,
        profile: config.profile(),
        sample_rate_index: config.sample_rate_index,
        private_bit: false,
        channel_configuration: config.channel_configuration,
        original_copy: false,
        home: false,
        copyright_id_bit: false,
        copyright_id_start: false,
        frame_length: (payload_len + ADTS_HEADER_LENGTH) as u16,
        buffer_fullness: 0x7FF, // variable bit rate
        number_of_raw_blocks: blocks as u8,
    };
    header.write_to(buf);
}

pub fn parse_adts_header(data: &[u8]) -> Result<ADTSHeader> {
    if data.len() < ADTS_HEADER_LENGTH {
        return Err(MuxError::Parser("ADTS header too short".into()));
    }

    let mut reader = BitReader::new(data);

    let sync_word = reader.read_bits(12)?;
    if sync_word != 0xFFF {
        return Err(MuxError::Parser("Invalid ADTS sync word".into()));
    }

    Ok(ADTSHeader {
        sync_word,
        id: reader.read_bits(1)? as u8,
        layer: reader.read_bits(2)? as u8,
        protection_absent: reader.read_bit()?,
        profile: ProfileType::from(reader.read_bits(2)? as u8),
        sample_rate_index: reader.read_bits(4)? as u8,
        private_bit: reader.read_bit()?,
        channel_configuration: reader.read_bits(3)? as u8,
        original_copy: reader.read_bit()?,
        home: reader.read_bit()?,
        copyright_id_bit: reader.read_bit()?,
        copyright_id_start: reader.read_bit()?,
        frame_length: reader.read_bits(13)? as u16,
        buffer_fullness: reader.read_bits(11)? as u16,
        number_of_raw_blocks: reader.read_bits(2)? as u8,
    })
}
