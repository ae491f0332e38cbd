use bytes::Bytes;
use std::ops::Range;

use super::types::{NALUnit, NALUnitType, NaluFormat};
use crate::error::{MuxError, Result};

/// SPS and PPS of an H.264 stream, replayed in front of every key frame.
#[derive(Debug, Clone, PartialEq)]
pub struct H264CodecData {
    sps: Bytes,
    pps: Bytes,
}

impl H264CodecData {
    pub fn from_sps_pps(sps: impl Into<Bytes>, pps: impl Into<Bytes>) -> Result<Self> {
        let sps = sps.into();
        let pps = pps.into();

        match NALUnit::parse(&sps).map(|nalu| nalu.unit_type()) {
            Some(NALUnitType::SPS) => {}
            _ => return Err(MuxError::Codec("not an SPS NAL unit".into())),
        }
        match NALUnit::parse(&pps).map(|nalu| nalu.unit_type()) {
            Some(NALUnitType::PPS) => {}
            _ => return Err(MuxError::Codec("not a PPS NAL unit".into())),
        }
        if sps.len() < 4 {
            return Err(MuxError::Codec("SPS too short".into()));
        }

        Ok(Self { sps, pps })
    }

    /// Parses an AVCDecoderConfigurationRecord (ISO/IEC 14496-15) and keeps
    /// its first SPS and PPS.
    pub fn from_decoder_config_record(record: &[u8]) -> Result<Self> {
        if record.len() < 7 {
            return Err(MuxError::Codec("AVC decoder config record too short".into()));
        }
        if record[0] != 1 {
            return Err(MuxError::Codec(format!(
                "unsupported AVC decoder config record version {}",
                record[0]
            )));
        }

        let mut pos = 5;
        let sps_count = record[pos] & 0x1f;
        pos += 1;
        let mut sps = None;
        for _ in 0..sps_count {
            let nalu = read_length_prefixed(record, &mut pos)?;
            sps.get_or_insert(nalu);
        }

        let pps_count = *record
            .get(pos)
            .ok_or_else(|| MuxError::Codec("AVC decoder config record truncated".into()))?;
        pos += 1;
        let mut pps = None;
        for _ in 0..pps_count {
            let nalu = read_length_prefixed(record, &mut pos)?;
            pps.get_or_insert(nalu);
        }

        match (sps, pps) {
            (Some(sps), Some(pps)) => Self::from_sps_pps(
                Bytes::copy_from_slice(sps),
                Bytes::copy_from_slice(pps),
            ),
            _ => Err(MuxError::Codec(
                "AVC decoder config record carries no SPS/PPS".into(),
            )),
        }
    }

    pub fn sps(&self) -> &[u8] {
        &self.sps
    }

    pub fn pps(&self) -> &[u8] {
        &self.pps
    }

    pub fn profile_idc(&self) -> u8 {
        self.sps[1]
    }

    pub fn level_idc(&self) -> u8 {
        self.sps[3]
    }
}

fn read_length_prefixed<'a>(data: &'a [u8], pos: &mut usize) -> Result<&'a [u8]> {
    let truncated = || MuxError::Codec("AVC decoder config record truncated".into());

    let header = data.get(*pos..*pos + 2).ok_or_else(truncated)?;
    let len = u16::from_be_bytes([header[0], header[1]]) as usize;
    *pos += 2;

    let nalu = data.get(*pos..*pos + len).ok_or_else(truncated)?;
    *pos += len;
    Ok(nalu)
}

/// Splits an access unit into NALUs.
///
/// Length-prefixed (AVCC) framing is tried first, then Annex-B start codes;
/// anything else is treated as one raw NALU. `ranges` is cleared and filled
/// with the byte range of every NALU in `data`, start codes and length
/// prefixes excluded.
pub fn split_nalu_ranges(data: &[u8], ranges: &mut Vec<Range<usize>>) -> NaluFormat {
    ranges.clear();

    if data.len() >= 4 {
        let val4 = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if val4 <= data.len() {
            if split_avcc(data, ranges) {
                return NaluFormat::Avcc;
            }
            ranges.clear();
        }

        if data[..3] == [0, 0, 1] || val4 == 1 {
            split_annexb(data, ranges);
            return NaluFormat::AnnexB;
        }
    }

    ranges.push(0..data.len());
    NaluFormat::Raw
}

/// Convenience wrapper around [`split_nalu_ranges`] returning slices.
pub fn split_nalus(data: &[u8]) -> (Vec<&[u8]>, NaluFormat) {
    let mut ranges = Vec::new();
    let format = split_nalu_ranges(data, &mut ranges);
    (ranges.into_iter().map(|range| &data[range]).collect(), format)
}

fn split_avcc(data: &[u8], ranges: &mut Vec<Range<usize>>) -> bool {
    let mut pos = 0;
    while data.len() - pos >= 4 {
        let len =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;
        if len > data.len() - pos {
            return false;
        }
        ranges.push(pos..pos + len);
        pos += len;
    }
    pos == data.len()
}

fn split_annexb(data: &[u8], ranges: &mut Vec<Range<usize>>) {
    let mut start: Option<usize> = None;
    let mut i = 0;

    while i + 3 <= data.len() {
        if data[i..i + 3] != [0, 0, 1] {
            i += 1;
            continue;
        }

        if let Some(s) = start {
            // the zero of a 4-byte start code is not part of the previous NALU
            let mut end = i;
            if end > s && data[end - 1] == 0 {
                end -= 1;
            }
            if end > s {
                ranges.push(s..end);
            }
        }
        i += 3;
        start = Some(i);
    }

    if let Some(s) = start {
        if s < data.len() {
            ranges.push(s..data.len());
        }
    }
}
