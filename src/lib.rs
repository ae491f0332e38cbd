#![doc(html_root_url = "https://docs.rs/tsmux/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::missing_crate_level_docs)]

//! # tsmux - H.264/AAC MPEG-TS muxer
//!
//! `tsmux` packages H.264 video and AAC audio access units into an MPEG
//! transport stream suitable for segment-based delivery such as HLS.
//!
//! ## Features
//!
//! - Single-program PAT/PMT generation
//! - PES framing with PTS/DTS, PCR on the video PID
//! - H.264 in Annex-B or AVCC framing, with access unit delimiters and
//!   SPS/PPS replay on key frames
//! - AAC with generated ADTS headers
//! - Continuity counter padding for segment concatenation
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! tsmux = "0.1.0"
//! ```
//!
//! ### Muxing a stream
//!
//! ```rust
//! use std::time::Duration;
//! use tsmux::av::{CodecData, CodecType, MediaType, Packet};
//! use tsmux::format::ts::TSMuxer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // AudioSpecificConfig: AAC LC, 44.1 kHz, stereo
//! let audio = CodecData::new(CodecType::AAC, &[0x12, 0x10])?;
//!
//! let mut muxer = TSMuxer::new(Vec::new());
//! muxer.set_pad_continuity(true);
//! muxer.write_header(Some(&audio), None)?;
//!
//! for i in 0..10u64 {
//!     let frame = Packet::new(vec![0u8; 300]).with_time(Duration::from_millis(i * 23));
//!     muxer.write_packet(&frame, MediaType::Audio)?;
//! }
//! muxer.write_trailer()?;
//!
//! // PAT, PMT and audio padded to a multiple of 16 packets
//! assert_eq!(muxer.into_inner().len(), (2 + 32) * 188);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - `av`: Codec descriptors, media types and access units
//! - `codec`: H.264 and AAC helpers (NALU splitting, decoder
//!   configuration parsing, ADTS headers)
//! - `format`: The MPEG-TS muxer and its building blocks
//! - `error`: Error type and `Result` alias
//! - `utils`: Bit reader, CRC32/MPEG-2 and a shared in-memory sink
//! - `config`: Process-wide muxer defaults

/// Audio/Video base types
pub mod av;

/// Codec helpers for H.264 and AAC
pub mod codec;

/// Error types and utilities
pub mod error;

/// Media format implementations
pub mod format;

/// Common utilities and helper functions
pub mod utils;

/// Configuration module
pub mod config;

pub use error::{MuxError, Result};
