//! # Utility Functions and Types
//!
//! Helpers shared by the codec and container code:
//!
//! - Bit-level reading of codec configuration records
//! - MPEG-2 CRC32 for PSI sections
//! - An in-memory shared sink
//!
//! ```rust
//! use tsmux::utils::BitReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = vec![0b10110011u8];
//! let mut reader = BitReader::new(&data);
//!
//! let value = reader.read_bits(3)?;
//! assert_eq!(value, 0b101);
//! # Ok(())
//! # }
//! ```

/// Bitstream reading utilities
pub mod bits;

/// CRC calculation
pub mod crc;

/// Cloneable in-memory sink
pub mod shared_buffer;

pub use bits::BitReader;
pub use crc::{Crc32Mpeg2, CRC32};
pub use shared_buffer::SharedBuffer;
