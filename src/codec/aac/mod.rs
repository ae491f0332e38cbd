//! AAC decoder configuration parsing and ADTS framing.

mod parser;
mod types;

pub use parser::{fill_adts_header, parse_adts_header, parse_audio_specific_config, AacCodecData};
pub use types::{AacConfig, ADTSHeader, ProfileType, AAC_FRAME_SAMPLES, ADTS_HEADER_LENGTH};
