use super::pes::{read_timestamp, PESHeader};
use super::types::*;
use crate::error::{MuxError, Result};
use crate::utils::CRC32;

/// A PSI section with its header fields split out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsiSection<'a> {
    pub table_id: u8,
    pub table_ext: u16,
    pub version: u8,
    /// Table payload between the section header and the CRC.
    pub data: &'a [u8],
}

/// Reads back transport packets, PSI sections and PES headers.
///
/// Used to verify muxer output; it is not a demuxer and makes no attempt to
/// resynchronise on damaged input.
#[derive(Debug, Default)]
pub struct TSPacketParser;

impl TSPacketParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_header(&self, data: &[u8]) -> Result<TSHeader> {
        if data.len() < TS_HEADER_SIZE {
            return Err(MuxError::InvalidData("TS packet too short".into()));
        }

        if data[0] != 0x47 {
            return Err(MuxError::InvalidData("Invalid sync byte".into()));
        }

        Ok(TSHeader {
            sync_byte: data[0],
            transport_error: (data[1] & 0x80) != 0,
            payload_unit_start: (data[1] & 0x40) != 0,
            transport_priority: (data[1] & 0x20) != 0,
            pid: (((data[1] & 0x1F) as u16) << 8) | data[2] as u16,
            scrambling_control: (data[3] >> 6) & 0x03,
            adaptation_field_exists: (data[3] & 0x20) != 0,
            contains_payload: (data[3] & 0x10) != 0,
            continuity_counter: data[3] & 0x0F,
        })
    }

    pub fn parse_adaptation_field(&self, packet: &[u8]) -> Result<Option<AdaptationField>> {
        let header = self.parse_header(packet)?;
        if !header.adaptation_field_exists {
            return Ok(None);
        }

        let length = *packet
            .get(TS_HEADER_SIZE)
            .ok_or_else(|| MuxError::InvalidData("Adaptation field missing".into()))?
            as usize;
        if packet.len() < TS_HEADER_SIZE + 1 + length {
            return Err(MuxError::InvalidData("Adaptation field too short".into()));
        }
        if length == 0 {
            return Ok(None);
        }

        let flags = packet[TS_HEADER_SIZE + 1];
        let mut field = AdaptationField {
            length,
            discontinuity: (flags & 0x80) != 0,
            random_access: (flags & 0x40) != 0,
            es_priority: (flags & 0x20) != 0,
            pcr_flag: (flags & 0x10) != 0,
            opcr_flag: (flags & 0x08) != 0,
            splicing_point_flag: (flags & 0x04) != 0,
            private_data_flag: (flags & 0x02) != 0,
            extension_flag: (flags & 0x01) != 0,
            pcr: None,
        };

        if field.pcr_flag {
            let pos = TS_HEADER_SIZE + 2;
            if length < 7 {
                return Err(MuxError::InvalidData("PCR data too short".into()));
            }
            field.pcr = Some(decode_pcr(&packet[pos..pos + 6]));
        }

        Ok(Some(field))
    }

    /// The payload bytes of a packet, after any adaptation field.
    pub fn payload<'a>(&self, packet: &'a [u8]) -> Result<&'a [u8]> {
        let header = self.parse_header(packet)?;
        if packet.len() != TS_PACKET_SIZE {
            return Err(MuxError::InvalidData(format!(
                "TS packet is {} bytes",
                packet.len()
            )));
        }
        if !header.contains_payload {
            return Ok(&[]);
        }

        let mut pos = TS_HEADER_SIZE;
        if header.adaptation_field_exists {
            pos += 1 + packet[pos] as usize;
        }
        packet
            .get(pos..)
            .ok_or_else(|| MuxError::InvalidData("Adaptation field overruns packet".into()))
    }

    /// Parses the section starting at the pointer field of a PSI payload
    /// and checks its CRC.
    pub fn parse_psi<'a>(&self, payload: &'a [u8]) -> Result<PsiSection<'a>> {
        let pointer = *payload
            .first()
            .ok_or_else(|| MuxError::InvalidData("PSI payload empty".into()))?
            as usize;
        let section = payload
            .get(1 + pointer..)
            .ok_or_else(|| MuxError::InvalidData("PSI pointer field out of range".into()))?;
        if section.len() < 3 {
            return Err(MuxError::InvalidData("PSI section too short".into()));
        }

        let section_length = (((section[1] & 0x0F) as usize) << 8) | section[2] as usize;
        let end = 3 + section_length;
        if section_length < 5 + PSI_CRC_LENGTH || section.len() < end {
            return Err(MuxError::InvalidData("PSI section truncated".into()));
        }
        if CRC32.calculate(&section[..end]) != 0 {
            return Err(MuxError::InvalidData("PSI section CRC mismatch".into()));
        }

        Ok(PsiSection {
            table_id: section[0],
            table_ext: ((section[3] as u16) << 8) | section[4] as u16,
            version: (section[5] >> 1) & 0x1F,
            data: &section[8..end - PSI_CRC_LENGTH],
        })
    }

    pub fn parse_pat(&self, data: &[u8]) -> Result<PAT> {
        let mut pat = PAT::new();

        for entry in data.chunks_exact(4) {
            let program_number = ((entry[0] as u16) << 8) | entry[1] as u16;
            let pid = (((entry[2] & 0x1F) as u16) << 8) | entry[3] as u16;
            pat.entries.push(PATEntry {
                program_number,
                network_pid: if program_number == 0 { pid } else { 0 },
                program_map_pid: if program_number != 0 { pid } else { 0 },
            });
        }

        Ok(pat)
    }

    pub fn parse_pmt(&self, data: &[u8]) -> Result<PMT> {
        let mut pmt = PMT::new();
        if data.len() < 4 {
            return Err(MuxError::InvalidData("PMT too short".into()));
        }

        pmt.pcr_pid = ((data[0] as u16 & 0x1F) << 8) | data[1] as u16;
        let program_info_length = ((data[2] as usize & 0x0F) << 8) | data[3] as usize;
        let mut pos = 4;

        let program_info = data
            .get(pos..pos + program_info_length)
            .ok_or_else(|| MuxError::InvalidData("Program info data too short".into()))?;
        pmt.program_descriptors = self.parse_descriptors(program_info)?;
        pos += program_info_length;

        while pos + 5 <= data.len() {
            let stream_type = data[pos];
            let elementary_pid = ((data[pos + 1] as u16 & 0x1F) << 8) | data[pos + 2] as u16;
            let es_info_length = ((data[pos + 3] as usize & 0x0F) << 8) | data[pos + 4] as usize;
            pos += 5;

            let es_info = data
                .get(pos..pos + es_info_length)
                .ok_or_else(|| MuxError::InvalidData("ES info data too short".into()))?;
            pos += es_info_length;

            pmt.elementary_stream_infos.push(ElementaryStreamInfo {
                stream_type,
                elementary_pid,
                descriptors: self.parse_descriptors(es_info)?,
            });
        }

        Ok(pmt)
    }

    fn parse_descriptors(&self, data: &[u8]) -> Result<Vec<Descriptor>> {
        let mut descriptors = Vec::new();
        let mut pos = 0;

        while pos + 2 <= data.len() {
            let tag = data[pos];
            let length = data[pos + 1] as usize;
            pos += 2;

            let body = data
                .get(pos..pos + length)
                .ok_or_else(|| MuxError::InvalidData("Descriptor data too short".into()))?;
            descriptors.push(Descriptor {
                tag,
                data: body.to_vec(),
            });
            pos += length;
        }

        Ok(descriptors)
    }

    /// Parses a PES header, returning it with its encoded length.
    ///
    /// `payload_length` is derived from PES_packet_length; it is `None` for
    /// unbounded packets.
    pub fn parse_pes_header(&self, data: &[u8]) -> Result<(PESHeader, usize)> {
        if data.len() < 9 || data[..3] != [0x00, 0x00, 0x01] {
            return Err(MuxError::InvalidData("missing PES start code".into()));
        }

        let packet_length = ((data[4] as usize) << 8) | data[5] as usize;
        let pts_dts_flags = data[7] & 0xC0;
        let header_data_length = data[8] as usize;
        let header_len = 9 + header_data_length;
        if data.len() < header_len {
            return Err(MuxError::InvalidData("PES header truncated".into()));
        }

        let mut header = PESHeader::new(data[3]);
        header.data_alignment = (data[6] & 0x04) != 0;
        if packet_length > 0 {
            header.payload_length = Some(packet_length.saturating_sub(3 + header_data_length));
        }
        match pts_dts_flags {
            0x80 if header_data_length >= 5 => {
                header.pts = Some(read_timestamp(&data[9..14]));
            }
            0xC0 if header_data_length >= 10 => {
                header.pts = Some(read_timestamp(&data[9..14]));
                header.dts = Some(read_timestamp(&data[14..19]));
            }
            0x00 => {}
            _ => return Err(MuxError::InvalidData("bad PTS/DTS flags".into())),
        }

        Ok((header, header_len))
    }

    /// Collects the complete PES packets carried on `pid` in a stream of
    /// transport packets, in order.
    pub fn pes_packets(&self, stream: &[u8], pid: u16) -> Result<Vec<Vec<u8>>> {
        let mut packets: Vec<Vec<u8>> = Vec::new();

        for packet in stream.chunks(TS_PACKET_SIZE) {
            let header = self.parse_header(packet)?;
            if header.pid != pid {
                continue;
            }
            let payload = self.payload(packet)?;
            if header.payload_unit_start {
                packets.push(payload.to_vec());
            } else if let Some(current) = packets.last_mut() {
                current.extend_from_slice(payload);
            }
        }

        Ok(packets)
    }
}
