//! # MPEG Transport Stream (TS) muxing
//!
//! Packages H.264 and AAC access units into a single-program transport
//! stream:
//!
//! - PAT/PMT construction with MPEG-2 CRC32
//! - PES framing with PTS/DTS, ADTS headers for AAC and access unit
//!   delimiters plus parameter sets for H.264
//! - Per-PID packetization with continuity counters, PCR and stuffing
//! - Continuity padding so output written to successive sinks joins up
//!
//! ## Example Usage
//!
//! ```rust
//! use tsmux::av::{CodecData, MediaType, Packet};
//! use tsmux::codec::h264::H264CodecData;
//! use tsmux::format::ts::{TSMuxer, TSPacketParser, PID_VIDEO, TS_PACKET_SIZE};
//!
//! # fn main() -> tsmux::Result<()> {
//! let sps = vec![0x67, 0x64, 0x00, 0x1f, 0xac, 0xd9];
//! let pps = vec![0x68, 0xeb, 0xe3, 0xcb];
//! let video = CodecData::from(H264CodecData::from_sps_pps(sps, pps)?);
//!
//! let mut muxer = TSMuxer::new(Vec::new());
//! muxer.write_header(None, Some(&video))?;
//!
//! let idr = Packet::new(vec![0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x84]).with_key_flag(true);
//! muxer.write_packet(&idr, MediaType::Video)?;
//! muxer.write_trailer()?;
//!
//! let output = muxer.into_inner();
//! assert_eq!(output.len() % TS_PACKET_SIZE, 0);
//!
//! let parser = TSPacketParser::new();
//! assert_eq!(parser.pes_packets(&output, PID_VIDEO)?.len(), 1);
//! # Ok(())
//! # }
//! ```

/// TS muxer implementation for creating MPEG-TS packets
pub mod muxer;

/// Low-level TS packet parsing, used to inspect muxer output
pub mod parser;

/// PES header encoding
pub mod pes;

/// Core TS types and constants
pub mod types;

/// Per-PID packetizer
pub mod writer;

pub use muxer::{TSMuxer, TIMESTAMP_BIAS};
pub use parser::{PsiSection, TSPacketParser};
pub use pes::{fill_pes_header, PESHeader};
pub use types::{
    TSHeader,
    PID_AUDIO,
    PID_PAT,
    PID_PMT,
    PID_VIDEO,
    STREAM_TYPE_AAC,
    STREAM_TYPE_H264,
    TS_PACKET_SIZE,
};
pub use writer::{TSWriter, WriteFlags};
