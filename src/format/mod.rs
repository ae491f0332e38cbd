//! Container formats.
//!
//! Only MPEG-TS output is implemented.

pub mod ts;

pub use self::ts::TSMuxer;
