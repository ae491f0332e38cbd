use crate::error::Result;
use crate::utils::CRC32;
use bytes::{BufMut, BytesMut};
use std::time::Duration;

// Stream IDs
pub const STREAM_ID_H264: u8 = 0xe0;
pub const STREAM_ID_AAC: u8 = 0xc0;

// PIDs
pub const PID_PAT: u16 = 0x0000;
pub const PID_PMT: u16 = 0x1000;
pub const PID_VIDEO: u16 = 0x0100;
pub const PID_AUDIO: u16 = 0x0101;

// Table IDs
pub const TABLE_ID_PAT: u8 = 0x00;
pub const TABLE_ID_PMT: u8 = 0x02;
pub const TABLE_EXT_PAT: u16 = 1;
pub const TABLE_EXT_PMT: u16 = 1;
pub const PROGRAM_NUMBER: u16 = 1;

// Elementary Stream Types
pub const STREAM_TYPE_H264: u8 = 0x1b;
pub const STREAM_TYPE_AAC: u8 = 0x0f;

// Constants
pub const TS_PACKET_SIZE: usize = 188;
pub const TS_HEADER_SIZE: usize = 4;
pub const TS_PAYLOAD_SIZE: usize = TS_PACKET_SIZE - TS_HEADER_SIZE;
/// Pointer field, table id, section length, table extension, version,
/// section number and last section number.
pub const PSI_HEADER_LENGTH: usize = 9;
pub const PSI_CRC_LENGTH: usize = 4;
/// Fixed part plus PTS and DTS.
pub const MAX_PES_HEADER_SIZE: usize = 19;
pub const PTS_HZ: u64 = 90_000;
pub const PCR_HZ: u64 = 27_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PATEntry {
    pub program_number: u16,
    pub network_pid: u16,
    pub program_map_pid: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PAT {
    pub entries: Vec<PATEntry>,
}

impl PAT {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The single-program table every session announces.
    pub fn single_program(program_map_pid: u16) -> Self {
        Self {
            entries: vec![PATEntry {
                program_number: PROGRAM_NUMBER,
                network_pid: 0,
                program_map_pid,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len() * 4
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write_to(&self, buf: &mut BytesMut) -> Result<()> {
        for entry in &self.entries {
            buf.put_u16(entry.program_number);
            if entry.program_number == 0 {
                buf.put_u16(entry.network_pid & 0x1fff | 7 << 13);
            } else {
                buf.put_u16(entry.program_map_pid & 0x1fff | 7 << 13);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub tag: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementaryStreamInfo {
    pub stream_type: u8,
    pub elementary_pid: u16,
    pub descriptors: Vec<Descriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PMT {
    pub pcr_pid: u16,
    pub program_descriptors: Vec<Descriptor>,
    pub elementary_stream_infos: Vec<ElementaryStreamInfo>,
}

impl PMT {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let mut n = 4; // PCRPID + program info length

        for desc in &self.program_descriptors {
            n += 2 + desc.data.len();
        }

        for info in &self.elementary_stream_infos {
            n += 5; // stream_type + elementary_pid + ES info length
            for desc in &info.descriptors {
                n += 2 + desc.data.len();
            }
        }

        n
    }

    pub fn is_empty(&self) -> bool {
        self.elementary_stream_infos.is_empty()
    }

    pub fn write_to(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u16(self.pcr_pid & 0x1fff | 7 << 13);

        let prog_desc_len = descriptors_len(&self.program_descriptors);
        buf.put_u16((prog_desc_len as u16) & 0x3ff | 0xf << 12);
        write_descriptors(buf, &self.program_descriptors);

        for info in &self.elementary_stream_infos {
            buf.put_u8(info.stream_type);
            buf.put_u16(info.elementary_pid & 0x1fff | 7 << 13);

            let es_desc_len = descriptors_len(&info.descriptors);
            buf.put_u16((es_desc_len as u16) & 0x3ff | 0xf << 12);
            write_descriptors(buf, &info.descriptors);
        }

        Ok(())
    }
}

fn descriptors_len(descriptors: &[Descriptor]) -> usize {
    descriptors.iter().map(|d| 2 + d.data.len()).sum()
}

fn write_descriptors(buf: &mut BytesMut, descriptors: &[Descriptor]) {
    for desc in descriptors {
        buf.put_u8(desc.tag);
        buf.put_u8(desc.data.len() as u8);
        buf.put_slice(&desc.data);
    }
}

/// Completes a PSI section in `buf`.
///
/// `buf` must hold `PSI_HEADER_LENGTH` reserved bytes followed by
/// `data_len` bytes of table payload. The header is written over the
/// reserved bytes and the CRC32 appended, leaving the full pointer field +
/// section in `buf`.
pub fn fill_psi(buf: &mut BytesMut, table_id: u8, table_ext: u16, data_len: usize) {
    debug_assert_eq!(buf.len(), PSI_HEADER_LENGTH + data_len);

    // table extension, version, section numbers, payload, CRC
    let section_length = 5 + data_len + PSI_CRC_LENGTH;

    buf[0] = 0; // pointer field
    buf[1] = table_id;
    // section_syntax_indicator=1, '0', reserved=11
    buf[2..4].copy_from_slice(&(0xB000 | section_length as u16 & 0x3ff).to_be_bytes());
    buf[4..6].copy_from_slice(&table_ext.to_be_bytes());
    buf[6] = 0xC1; // reserved=11, version 0, current_next_indicator=1
    buf[7] = 0; // section_number
    buf[8] = 0; // last_section_number

    let crc = CRC32.calculate(&buf[1..]);
    buf.put_u32(crc);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptationField {
    pub length: usize,
    pub discontinuity: bool,
    pub random_access: bool,
    pub es_priority: bool,
    pub pcr_flag: bool,
    pub opcr_flag: bool,
    pub splicing_point_flag: bool,
    pub private_data_flag: bool,
    pub extension_flag: bool,
    pub pcr: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TSHeader {
    pub sync_byte: u8, // Always 0x47
    pub transport_error: bool,
    pub payload_unit_start: bool,
    pub transport_priority: bool,
    pub pid: u16,
    pub scrambling_control: u8,
    pub adaptation_field_exists: bool,
    pub contains_payload: bool,
    pub continuity_counter: u8,
}

impl Default for TSHeader {
    fn default() -> Self {
        Self {
            sync_byte: 0x47,
            transport_error: false,
            payload_unit_start: false,
            transport_priority: false,
            pid: 0,
            scrambling_control: 0,
            adaptation_field_exists: false,
            contains_payload: true,
            continuity_counter: 0,
        }
    }
}

impl TSHeader {
    pub fn write_to(&self, buf: &mut [u8]) {
        buf[0] = self.sync_byte;

        let mut b1 = 0u8;
        if self.transport_error {
            b1 |= 0x80;
        }
        if self.payload_unit_start {
            b1 |= 0x40;
        }
        if self.transport_priority {
            b1 |= 0x20;
        }
        b1 |= ((self.pid >> 8) & 0x1f) as u8;
        buf[1] = b1;

        buf[2] = (self.pid & 0xff) as u8;

        let mut b3 = self.scrambling_control << 6;
        if self.adaptation_field_exists {
            b3 |= 0x20;
        }
        if self.contains_payload {
            b3 |= 0x10;
        }
        b3 |= self.continuity_counter & 0x0f;
        buf[3] = b3;
    }
}

// Time conversion utilities

/// Converts a PCR in 27 MHz ticks to a time.
pub fn pcr_to_time(pcr: u64) -> Duration {
    Duration::from_nanos((pcr as u128 * 1_000_000_000 / PCR_HZ as u128) as u64)
}

/// 27 MHz ticks, wrapped to the 33-bit base the field can carry.
pub fn time_to_pcr(time: Duration) -> u64 {
    let ts = (time.as_nanos() * PCR_HZ as u128 / 1_000_000_000) as u64;
    ts % ((1 << 33) * 300)
}

/// Packs 27 MHz ticks into the 6-byte adaptation field layout:
/// 33-bit base, 6 reserved bits, 9-bit extension.
pub fn encode_pcr(pcr: u64) -> [u8; 6] {
    let base = (pcr / 300) & 0x1_FFFF_FFFF;
    let ext = pcr % 300;
    let packed = base << 15 | 0x3f << 9 | ext;
    let bytes = packed.to_be_bytes();
    [bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]]
}

/// Reads a PCR written by [`encode_pcr`] back as 27 MHz ticks.
pub fn decode_pcr(data: &[u8]) -> u64 {
    let base = (data[0] as u64) << 25
        | (data[1] as u64) << 17
        | (data[2] as u64) << 9
        | (data[3] as u64) << 1
        | (data[4] as u64) >> 7;
    let ext = ((data[4] & 0x01) as u64) << 8 | data[5] as u64;
    base * 300 + ext
}

pub fn pts_to_time(pts: u64) -> Duration {
    Duration::from_nanos((pts as u128 * 1_000_000_000 / PTS_HZ as u128) as u64)
}

/// 90 kHz ticks, wrapped to 33 bits.
pub fn time_to_pts(time: Duration) -> u64 {
    (time.as_nanos() * PTS_HZ as u128 / 1_000_000_000) as u64 & 0x1_FFFF_FFFF
}
