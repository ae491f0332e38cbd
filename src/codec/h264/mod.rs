//! # H.264/AVC Bitstream Helpers
//!
//! What the TS muxer needs from an H.264 stream:
//!
//! - Splitting an access unit into NAL units (AVCC or Annex-B framing)
//! - Reading SPS/PPS out of an AVCDecoderConfigurationRecord
//! - The access unit delimiter and start code used to rebuild Annex-B
//!
//! ## Example: Splitting an access unit
//!
//! ```rust
//! use tsmux::codec::h264::{split_nalus, NALUnit, NALUnitType, NaluFormat};
//!
//! let data = [0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x00, 0x00, 0x01, 0x06, 0x05];
//! let (nalus, format) = split_nalus(&data);
//!
//! assert_eq!(format, NaluFormat::AnnexB);
//! assert_eq!(NALUnit::parse(nalus[0]).unwrap().unit_type(), NALUnitType::CodedSliceIDR);
//! assert_eq!(NALUnit::parse(nalus[1]).unwrap().unit_type(), NALUnitType::SEI);
//! ```

/// NAL unit splitting and decoder configuration parsing
pub mod parser;
/// NAL unit types and Annex-B byte constants
pub mod types;

#[doc(inline)]
pub use parser::*;
#[doc(inline)]
pub use types::*;
