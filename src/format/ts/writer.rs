use super::types::{encode_pcr, time_to_pcr, TSHeader, TS_HEADER_SIZE, TS_PACKET_SIZE};
use crate::error::Result;
use std::io::Write;
use std::time::Duration;

/// How a run of packets handed to [`TSWriter::write_packets`] is flagged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteFlags {
    /// Set payload_unit_start_indicator on the first packet.
    pub unit_start: bool,
    /// Set random_access_indicator on the first packet.
    pub random_access: bool,
    /// PSI section: pad the tail with 0xff inside the payload instead of
    /// adaptation field stuffing.
    pub psi: bool,
}

impl WriteFlags {
    /// A stuffing packet: no payload, no flags.
    pub const STUFFING: Self = Self {
        unit_start: false,
        random_access: false,
        psi: false,
    };

    pub const PSI: Self = Self {
        unit_start: true,
        random_access: false,
        psi: true,
    };

    /// Start of a new PES packet.
    pub fn unit_start() -> Self {
        Self {
            unit_start: true,
            ..Self::default()
        }
    }

    pub fn with_random_access(mut self, random_access: bool) -> Self {
        self.random_access = random_access;
        self
    }
}

/// Packetizer for one PID.
///
/// Fragments a scatter list into 188-byte transport packets and owns the
/// PID's continuity counter, which advances by one on every packet written.
#[derive(Debug, Clone)]
pub struct TSWriter {
    pid: u16,
    continuity_counter: u8,
    carries_pcr: bool,
    packets_written: u64,
    packet: [u8; TS_PACKET_SIZE],
}

impl TSWriter {
    pub fn new(pid: u16) -> Self {
        Self {
            pid: pid & 0x1fff,
            continuity_counter: 0,
            carries_pcr: false,
            packets_written: 0,
            packet: [0xff; TS_PACKET_SIZE],
        }
    }

    /// Marks this PID as the program's PCR source.
    pub fn with_pcr(mut self) -> Self {
        self.carries_pcr = true;
        self
    }

    pub fn pid(&self) -> u16 {
        self.pid
    }

    /// Counter value the next packet will carry.
    pub fn continuity_counter(&self) -> u8 {
        self.continuity_counter
    }

    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    /// Writes `datav` as one run of packets and returns how many were written.
    ///
    /// `pcr` is stamped into the first packet's adaptation field when this
    /// PID carries the PCR. An empty `datav` produces a single stuffing
    /// packet that carries only an adaptation field.
    pub fn write_packets<'a, W, I>(
        &mut self,
        w: &mut W,
        datav: I,
        pcr: Option<Duration>,
        flags: WriteFlags,
    ) -> Result<usize>
    where
        W: Write + ?Sized,
        I: IntoIterator<Item = &'a [u8]>,
        I::IntoIter: Clone,
    {
        let mut chunks = datav.into_iter();
        let total: usize = chunks.clone().map(<[u8]>::len).sum();
        let mut current: &[u8] = &[];
        let mut written = 0;
        let mut count = 0;

        loop {
            let first = count == 0;
            let pcr = pcr.filter(|_| first && self.carries_pcr);
            let random_access = first && flags.random_access;

            // adaptation field length, flags byte included, length byte excluded
            let mut af_len = if pcr.is_some() || random_access {
                Some(1 + if pcr.is_some() { 6 } else { 0 })
            } else {
                None
            };

            let remaining = total - written;
            let capacity = TS_PACKET_SIZE - TS_HEADER_SIZE - af_len.map_or(0, |len| len + 1);
            let payload_len = remaining.min(capacity);
            if payload_len < capacity && !flags.psi {
                let stuffing = capacity - payload_len;
                af_len = Some(match af_len {
                    Some(len) => len + stuffing,
                    None => stuffing - 1,
                });
            }

            let header = TSHeader {
                payload_unit_start: first && flags.unit_start,
                pid: self.pid,
                adaptation_field_exists: af_len.is_some(),
                contains_payload: payload_len > 0,
                continuity_counter: self.continuity_counter,
                ..TSHeader::default()
            };
            header.write_to(&mut self.packet[..TS_HEADER_SIZE]);

            let mut pos = TS_HEADER_SIZE;
            if let Some(len) = af_len {
                self.packet[pos] = len as u8;
                pos += 1;
                let end = pos + len;
                if len > 0 {
                    let mut af_flags = 0u8;
                    if random_access {
                        af_flags |= 0x40;
                    }
                    if pcr.is_some() {
                        af_flags |= 0x10;
                    }
                    self.packet[pos] = af_flags;
                    pos += 1;
                    if let Some(pcr) = pcr {
                        self.packet[pos..pos + 6].copy_from_slice(&encode_pcr(time_to_pcr(pcr)));
                        pos += 6;
                    }
                    self.packet[pos..end].fill(0xff);
                }
                pos = end;
            }

            let mut filled = 0;
            while filled < payload_len {
                if current.is_empty() {
                    match chunks.next() {
                        Some(chunk) => current = chunk,
                        None => break,
                    }
                    continue;
                }
                let n = current.len().min(payload_len - filled);
                self.packet[pos + filled..pos + filled + n].copy_from_slice(&current[..n]);
                current = &current[n..];
                filled += n;
            }
            debug_assert_eq!(filled, payload_len);
            self.packet[pos + filled..].fill(0xff);

            w.write_all(&self.packet)?;
            self.continuity_counter = (self.continuity_counter + 1) & 0x0f;
            self.packets_written += 1;
            written += payload_len;
            count += 1;

            if written >= total {
                break;
            }
        }

        Ok(count)
    }

    /// Writes one stuffing packet, advancing the continuity counter.
    ///
    /// The packet carries a 183-byte adaptation field and no payload.
    /// ISO/IEC 13818-1 does not advance the counter on payload-less
    /// packets, so a strict demuxer reports a discontinuity on each one.
    /// Advancing it anyway is what lets `write_trailer` padding bring the
    /// next payload packet back to counter 0 at a segment boundary.
    pub fn write_stuffing<W: Write + ?Sized>(&mut self, w: &mut W) -> Result<()> {
        self.write_packets(w, std::iter::empty(), None, WriteFlags::STUFFING)?;
        Ok(())
    }
}
