use super::pes::fill_pes_header;
use super::types::*;
use super::writer::{TSWriter, WriteFlags};
use crate::av::{CodecData, MediaType, Packet};
use crate::codec::aac::{fill_adts_header, AacCodecData, AAC_FRAME_SAMPLES, ADTS_HEADER_LENGTH};
use crate::codec::h264::{split_nalu_ranges, H264CodecData, AUD_BYTES, START_CODE_BYTES};
use crate::config::{muxer_config, MuxerConfig};
use crate::error::{MuxError, Result};
use bytes::{BufMut, BytesMut};
use log::{debug, trace, warn};
use std::io::Write;
use std::ops::Range;
use std::time::Duration;

/// Added to every PTS, DTS and PCR so that sources whose first timestamps
/// sit slightly below zero (B-frame reordering, audio priming) still map to
/// positive 90 kHz values.
pub const TIMESTAMP_BIAS: Duration = Duration::from_secs(1);

/// Largest raw AAC frame an ADTS header can describe.
const MAX_ADTS_PAYLOAD: usize = 0x1FFF - ADTS_HEADER_LENGTH;

/// A registered elementary stream: its codec and its PID's packetizer.
#[derive(Debug)]
struct Stream<C> {
    codec: C,
    writer: TSWriter,
}

impl<C> Stream<C> {
    fn new(codec: C, writer: TSWriter) -> Self {
        Self { codec, writer }
    }

    fn pid(&self) -> u16 {
        self.writer.pid()
    }
}

/// Single-program MPEG-TS muxer for one H.264 and one AAC stream.
///
/// A session is `write_header`, any number of `write_packet` calls and a
/// `write_trailer`. Every access unit becomes one PES packet written to the
/// sink as a run of 188-byte transport packets.
///
/// ```rust
/// use std::time::Duration;
/// use tsmux::av::{CodecData, MediaType, Packet};
/// use tsmux::codec::aac::{AacCodecData, AacConfig};
/// use tsmux::format::ts::{TSMuxer, TS_PACKET_SIZE};
///
/// # fn main() -> tsmux::Result<()> {
/// let audio = CodecData::from(AacCodecData::from_config(AacConfig::default()));
/// let mut muxer = TSMuxer::new(Vec::new());
///
/// muxer.write_header(Some(&audio), None)?;
/// let frame = Packet::new(vec![0u8; 200]).with_time(Duration::from_millis(23));
/// muxer.write_packet(&frame, MediaType::Audio)?;
/// muxer.write_trailer()?;
///
/// let output = muxer.into_inner();
/// assert_eq!(output.len() % TS_PACKET_SIZE, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TSMuxer<W: Write> {
    writer: W,
    audio: Option<Stream<AacCodecData>>,
    video: Option<Stream<H264CodecData>>,
    pad_continuity: bool,

    pat_writer: TSWriter,
    pmt_writer: TSWriter,

    // scratch space, reused across calls
    psi: BytesMut,
    pes_header: BytesMut,
    adts_header: [u8; ADTS_HEADER_LENGTH],
    nalus: Vec<Range<usize>>,
}

impl<W: Write> TSMuxer<W> {
    /// Creates a muxer using the process-wide configuration.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, muxer_config())
    }

    pub fn with_config(writer: W, config: MuxerConfig) -> Self {
        Self {
            writer,
            audio: None,
            video: None,
            pad_continuity: config.pad_continuity,
            pat_writer: TSWriter::new(PID_PAT),
            pmt_writer: TSWriter::new(PID_PMT),
            psi: BytesMut::with_capacity(TS_PAYLOAD_SIZE),
            pes_header: BytesMut::with_capacity(MAX_PES_HEADER_SIZE),
            adts_header: [0; ADTS_HEADER_LENGTH],
            nalus: Vec::new(),
        }
    }

    /// Replaces the sink, returning the previous one.
    ///
    /// Continuity counters carry over, so with padding enabled the output of
    /// consecutive sinks concatenates into a valid stream.
    pub fn set_writer(&mut self, writer: W) -> W {
        std::mem::replace(&mut self.writer, writer)
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// When enabled, `write_trailer` pads every stream with stuffing
    /// packets until its continuity counter is back at zero.
    pub fn set_pad_continuity(&mut self, pad: bool) {
        self.pad_continuity = pad;
    }

    pub fn pad_continuity(&self) -> bool {
        self.pad_continuity
    }

    /// Continuity counter the next packet of a stream will carry, or `None`
    /// if no such stream is registered.
    pub fn continuity_counter(&self, media_type: MediaType) -> Option<u8> {
        match media_type {
            MediaType::Audio => self.audio.as_ref().map(|s| s.writer.continuity_counter()),
            MediaType::Video => self.video.as_ref().map(|s| s.writer.continuity_counter()),
        }
    }

    /// Registers the session's streams and writes PAT and PMT.
    ///
    /// The audio slot takes only AAC and the video slot only H.264. A
    /// mismatch fails that slot with `UnsupportedCodec`; the other slot is
    /// still registered but no tables are written.
    pub fn write_header(
        &mut self,
        audio: Option<&CodecData>,
        video: Option<&CodecData>,
    ) -> Result<()> {
        self.audio = None;
        self.video = None;
        let mut result = Ok(());

        match audio {
            Some(CodecData::Aac(codec)) => {
                debug!(
                    "registered audio stream on PID {:#x}: {:?}",
                    PID_AUDIO,
                    codec.config()
                );
                self.audio = Some(Stream::new(codec.clone(), TSWriter::new(PID_AUDIO)));
            }
            Some(other) => {
                warn!("rejecting {:?} on the audio stream", other.codec_type());
                result = Err(MuxError::UnsupportedCodec {
                    media_type: MediaType::Audio,
                    codec_type: other.codec_type(),
                });
            }
            None => {}
        }

        match video {
            Some(CodecData::H264(codec)) => {
                debug!(
                    "registered video stream on PID {:#x}: profile {} level {}",
                    PID_VIDEO,
                    codec.profile_idc(),
                    codec.level_idc()
                );
                self.video = Some(Stream::new(
                    codec.clone(),
                    TSWriter::new(PID_VIDEO).with_pcr(),
                ));
            }
            Some(other) => {
                warn!("rejecting {:?} on the video stream", other.codec_type());
                if result.is_ok() {
                    result = Err(MuxError::UnsupportedCodec {
                        media_type: MediaType::Video,
                        codec_type: other.codec_type(),
                    });
                }
            }
            None => {}
        }

        result?;
        self.write_pat_pmt()
    }

    fn build_pmt(&self) -> PMT {
        let mut pmt = PMT::new();
        pmt.pcr_pid = PID_VIDEO;

        if let Some(audio) = &self.audio {
            pmt.elementary_stream_infos.push(ElementaryStreamInfo {
                stream_type: STREAM_TYPE_AAC,
                elementary_pid: audio.pid(),
                descriptors: Vec::new(),
            });
        }
        if let Some(video) = &self.video {
            pmt.elementary_stream_infos.push(ElementaryStreamInfo {
                stream_type: STREAM_TYPE_H264,
                elementary_pid: video.pid(),
                descriptors: Vec::new(),
            });
        }

        pmt
    }

    /// Encodes `pmt` as a complete section into the PSI scratch buffer.
    fn encode_pmt(&mut self, pmt: &PMT) -> Result<()> {
        check_pmt_size(pmt)?;

        self.psi.clear();
        self.psi.put_bytes(0, PSI_HEADER_LENGTH);
        pmt.write_to(&mut self.psi)?;
        fill_psi(&mut self.psi, TABLE_ID_PMT, TABLE_EXT_PMT, pmt.len());
        Ok(())
    }

    fn write_pat_pmt(&mut self) -> Result<()> {
        // an oversized PMT must fail before the PAT goes out
        let pmt = self.build_pmt();
        check_pmt_size(&pmt)?;

        let pat = PAT::single_program(PID_PMT);
        self.psi.clear();
        self.psi.put_bytes(0, PSI_HEADER_LENGTH);
        pat.write_to(&mut self.psi)?;
        fill_psi(&mut self.psi, TABLE_ID_PAT, TABLE_EXT_PAT, pat.len());
        self.pat_writer
            .write_packets(&mut self.writer, [&self.psi[..]], None, WriteFlags::PSI)?;

        self.encode_pmt(&pmt)?;
        self.pmt_writer
            .write_packets(&mut self.writer, [&self.psi[..]], None, WriteFlags::PSI)?;

        debug!(
            "wrote PAT and PMT with {} elementary stream(s)",
            pmt.elementary_stream_infos.len()
        );
        Ok(())
    }

    /// Writes one access unit as a PES packet on the stream for `media_type`.
    pub fn write_packet(&mut self, pkt: &Packet, media_type: MediaType) -> Result<()> {
        match media_type {
            MediaType::Audio => self.write_audio(pkt),
            MediaType::Video => self.write_video(pkt),
        }
    }

    fn write_audio(&mut self, pkt: &Packet) -> Result<()> {
        let stream = self
            .audio
            .as_mut()
            .ok_or(MuxError::StreamNotRegistered(MediaType::Audio))?;

        let raw = &pkt.data[..];
        if raw.len() > MAX_ADTS_PAYLOAD {
            return Err(MuxError::InvalidData(format!(
                "AAC frame of {} bytes does not fit an ADTS header",
                raw.len()
            )));
        }

        let time = pkt.time + TIMESTAMP_BIAS;
        fill_pes_header(
            &mut self.pes_header,
            STREAM_ID_AAC,
            Some(ADTS_HEADER_LENGTH + raw.len()),
            time,
            None,
        );
        fill_adts_header(
            &mut self.adts_header,
            stream.codec.config(),
            AAC_FRAME_SAMPLES,
            raw.len(),
        );

        let n = stream.writer.write_packets(
            &mut self.writer,
            [&self.pes_header[..], &self.adts_header[..], raw],
            None,
            WriteFlags::unit_start(),
        )?;
        trace!("audio frame at {:?}: {} bytes in {} packets", pkt.time, raw.len(), n);
        Ok(())
    }

    fn write_video(&mut self, pkt: &Packet) -> Result<()> {
        let stream = self
            .video
            .as_mut()
            .ok_or(MuxError::StreamNotRegistered(MediaType::Video))?;

        let time = pkt.time + TIMESTAMP_BIAS;
        fill_pes_header(
            &mut self.pes_header,
            STREAM_ID_H264,
            None,
            pkt.presentation_time() + TIMESTAMP_BIAS,
            Some(time),
        );

        let data = &pkt.data[..];
        split_nalu_ranges(data, &mut self.nalus);

        // SPS and PPS go in front of the payload of every key frame
        let params = if pkt.is_key { 2 } else { 0 };
        let nalus = [stream.codec.sps(), stream.codec.pps()]
            .into_iter()
            .take(params)
            .chain(self.nalus.iter().map(|range| &data[range.clone()]))
            .filter(|nalu| !nalu.is_empty());
        // AUD before the first NALU, a start code before each of the others
        let datav = std::iter::once(&self.pes_header[..]).chain(
            nalus.enumerate().flat_map(|(i, nalu)| {
                let prefix = if i == 0 { AUD_BYTES } else { START_CODE_BYTES };
                [prefix, nalu]
            }),
        );

        let n = stream.writer.write_packets(
            &mut self.writer,
            datav,
            Some(time),
            WriteFlags::unit_start().with_random_access(pkt.is_key),
        )?;
        trace!(
            "video frame at {:?} (key: {}): {} NALUs in {} packets",
            pkt.time,
            pkt.is_key,
            self.nalus.len() + params,
            n
        );
        Ok(())
    }

    /// Ends the session: pads the streams if enabled and flushes the sink.
    pub fn write_trailer(&mut self) -> Result<()> {
        if self.pad_continuity {
            if let Some(audio) = self.audio.as_mut() {
                pad_stream(&mut audio.writer, &mut self.writer, MediaType::Audio)?;
            }
            if let Some(video) = self.video.as_mut() {
                pad_stream(&mut video.writer, &mut self.writer, MediaType::Video)?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }
}

/// PSI header, table and CRC must fit in one packet's payload.
fn check_pmt_size(pmt: &PMT) -> Result<()> {
    let size = PSI_HEADER_LENGTH + pmt.len() + PSI_CRC_LENGTH;
    if size > TS_PAYLOAD_SIZE {
        return Err(MuxError::TableTooLarge(size));
    }
    Ok(())
}

/// Writes stuffing packets until the next counter value is zero.
fn pad_stream<W: Write + ?Sized>(
    tsw: &mut TSWriter,
    w: &mut W,
    media_type: MediaType,
) -> Result<()> {
    let mut count = 0;
    while tsw.continuity_counter() != 0 {
        tsw.write_stuffing(w)?;
        count += 1;
    }
    debug!("padded {} stream with {} stuffing packets", media_type, count);
    Ok(())
}
