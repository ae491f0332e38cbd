use crate::av::{CodecType, MediaType};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MuxError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec {codec_type:?} is not supported for the {media_type} stream")]
    UnsupportedCodec {
        media_type: MediaType,
        codec_type: CodecType,
    },

    #[error("codec type {0:?} is not supported")]
    UnsupportedCodecType(CodecType),

    #[error("PMT too large: {0} bytes do not fit in a single packet")]
    TableTooLarge(usize),

    #[error("no {0} stream registered")]
    StreamNotRegistered(MediaType),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("parser error: {0}")]
    Parser(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, MuxError>;
