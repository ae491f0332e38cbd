pub mod aac;
pub mod h264;

pub use aac::AacCodecData;
pub use h264::H264CodecData;
