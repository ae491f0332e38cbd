use super::types::{time_to_pts, MAX_PES_HEADER_SIZE};
use bytes::{BufMut, BytesMut};
use std::time::Duration;

/// Packetized Elementary Stream (PES) header.
///
/// Only the fields the muxer sets are modelled: the optional fields after
/// PTS/DTS (ESCR, ES rate, trick mode, CRC, extension) are never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PESHeader {
    /// Stream identifier indicating content type (video/audio)
    pub stream_id: u8,
    /// Length of the elementary stream data following the header, or
    /// `None` for an unbounded (video) PES packet
    pub payload_length: Option<usize>,
    /// Data alignment indicator
    pub data_alignment: bool,
    /// Presentation Time Stamp in 90 kHz ticks (33 bits)
    pub pts: Option<u64>,
    /// Decoding Time Stamp in 90 kHz ticks (33 bits)
    pub dts: Option<u64>,
}

impl PESHeader {
    pub fn new(stream_id: u8) -> Self {
        Self {
            stream_id,
            payload_length: None,
            data_alignment: false,
            pts: None,
            dts: None,
        }
    }

    pub fn with_payload_length(mut self, len: usize) -> Self {
        self.payload_length = Some(len);
        self
    }

    pub fn with_pts(mut self, pts: Duration) -> Self {
        self.pts = Some(time_to_pts(pts));
        self
    }

    /// A DTS is only written together with a PTS.
    pub fn with_dts(mut self, dts: Duration) -> Self {
        self.dts = Some(time_to_pts(dts));
        self
    }

    /// PES_header_data_length: the bytes taken by the optional fields.
    pub fn header_data_length(&self) -> usize {
        match (self.pts, self.dts) {
            (Some(_), Some(_)) => 10,
            (Some(_), None) => 5,
            _ => 0,
        }
    }

    /// Total encoded size of the header.
    pub fn len(&self) -> usize {
        9 + self.header_data_length()
    }

    /// Value of the 16-bit PES_packet_length field: every byte after it,
    /// or 0 when the packet is unbounded or too long to be declared.
    pub fn packet_length(&self) -> u16 {
        self.payload_length
            .map(|len| 3 + self.header_data_length() + len)
            .filter(|&len| len <= u16::MAX as usize)
            .unwrap_or(0) as u16
    }

    /// Appends the encoded header to `buf`.
    pub fn write_to(&self, buf: &mut BytesMut) {
        // packet_start_code_prefix
        buf.put_slice(&[0x00, 0x00, 0x01]);
        buf.put_u8(self.stream_id);
        buf.put_u16(self.packet_length());

        // '10', scrambling 00, priority 0, alignment, copyright 0, original 1
        let mut flags = 0x81u8;
        if self.data_alignment {
            flags |= 0x04;
        }
        buf.put_u8(flags);

        let pts_dts_flags = match (self.pts, self.dts) {
            (Some(_), Some(_)) => 0xC0,
            (Some(_), None) => 0x80,
            _ => 0x00,
        };
        buf.put_u8(pts_dts_flags);
        buf.put_u8(self.header_data_length() as u8);

        if let Some(pts) = self.pts {
            match self.dts {
                Some(dts) => {
                    write_timestamp(buf, 0x30, pts);
                    write_timestamp(buf, 0x10, dts);
                }
                None => write_timestamp(buf, 0x20, pts),
            }
        }
    }
}

/// Writes a PES header into the reusable buffer `buf` and returns its length.
///
/// `data_len` is the length of the elementary stream data that follows, or
/// `None` for an unbounded packet.
pub fn fill_pes_header(
    buf: &mut BytesMut,
    stream_id: u8,
    data_len: Option<usize>,
    pts: Duration,
    dts: Option<Duration>,
) -> usize {
    let mut header = PESHeader::new(stream_id).with_pts(pts);
    header.payload_length = data_len;
    if let Some(dts) = dts {
        header = header.with_dts(dts);
    }

    buf.clear();
    header.write_to(buf);
    debug_assert!(buf.len() <= MAX_PES_HEADER_SIZE);
    buf.len()
}

/// Writes a 33-bit timestamp as '4-bit marker' + 3 + '1' + 15 + '1' + 15 + '1'.
fn write_timestamp(buf: &mut BytesMut, marker: u8, ts: u64) {
    let ts = ts & 0x1FFFFFFFF;

    buf.put_u8(marker | ((ts >> 29) & 0x0E) as u8 | 0x01);
    buf.put_u16((((ts >> 14) & 0xFFFE) | 0x01) as u16);
    buf.put_u16((((ts << 1) & 0xFFFE) | 0x01) as u16);
}

/// Reads a 33-bit timestamp written by `write_timestamp`.
pub fn read_timestamp(data: &[u8]) -> u64 {
    ((data[0] as u64 >> 1) & 0x07) << 30
        | (data[1] as u64) << 22
        | ((data[2] as u64) >> 1) << 15
        | (data[3] as u64) << 7
        | (data[4] as u64) >> 1
}
