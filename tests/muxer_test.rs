use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use std::collections::HashMap;
use std::time::Duration;
use tsmux::av::{CodecData, CodecType, MediaType, Packet};
use tsmux::codec::aac::{parse_adts_header, ProfileType, ADTS_HEADER_LENGTH};
use tsmux::codec::h264::{H264CodecData, AUD_BYTES, START_CODE_BYTES};
use tsmux::config::MuxerConfig;
use tsmux::format::ts::{
    TSMuxer, TSPacketParser, PID_AUDIO, PID_PAT, PID_PMT, PID_VIDEO, STREAM_TYPE_AAC,
    STREAM_TYPE_H264, TS_PACKET_SIZE,
};
use tsmux::utils::SharedBuffer;
use tsmux::MuxError;

const SPS: &[u8] = &[0x67, 0x64, 0x00, 0x1f, 0xac, 0xd9, 0x40, 0x50];
const PPS: &[u8] = &[0x68, 0xeb, 0xe3, 0xcb, 0x22, 0xc0];

fn audio_codec() -> CodecData {
    CodecData::new(CodecType::AAC, &[0x12, 0x10]).unwrap()
}

fn video_codec() -> CodecData {
    H264CodecData::from_sps_pps(SPS, PPS).unwrap().into()
}

fn new_muxer<W: std::io::Write>(writer: W, pad_continuity: bool) -> TSMuxer<W> {
    TSMuxer::with_config(writer, MuxerConfig { pad_continuity })
}

fn video_frame(i: u32, len: usize) -> Packet {
    let mut data = vec![0x00, 0x00, 0x00, 0x01, if i % 30 == 0 { 0x65 } else { 0x41 }];
    data.resize(5 + len, 0xab);
    Packet::new(data)
        .with_time(Duration::from_millis(40) * i)
        .with_key_flag(i % 30 == 0)
}

fn audio_frame(i: u32, len: usize) -> Packet {
    Packet::new(vec![0x21; len]).with_time(Duration::from_millis(23) * i)
}

/// Continuity counters per PID, in stream order.
fn counters(stream: &[u8]) -> HashMap<u16, Vec<u8>> {
    let parser = TSPacketParser::new();
    let mut counters: HashMap<u16, Vec<u8>> = HashMap::new();
    for packet in stream.chunks(TS_PACKET_SIZE) {
        let header = parser.parse_header(packet).unwrap();
        counters
            .entry(header.pid)
            .or_default()
            .push(header.continuity_counter);
    }
    counters
}

fn assert_continuous(counters: &[u8]) {
    for (i, &cc) in counters.iter().enumerate() {
        assert_eq!(cc, (i % 16) as u8, "counter skipped at packet {}", i);
    }
}

#[test]
fn test_header_emits_pat_then_pmt() {
    let mut muxer = new_muxer(Vec::new(), false);
    muxer
        .write_header(Some(&audio_codec()), Some(&video_codec()))
        .unwrap();
    let out = muxer.into_inner();

    assert_eq!(out.len(), 2 * TS_PACKET_SIZE);
    let parser = TSPacketParser::new();

    let pat_packet = &out[..TS_PACKET_SIZE];
    let header = parser.parse_header(pat_packet).unwrap();
    assert_eq!(header.pid, PID_PAT);
    assert!(header.payload_unit_start);
    let section = parser.parse_psi(parser.payload(pat_packet).unwrap()).unwrap();
    let pat = parser.parse_pat(section.data).unwrap();
    assert_eq!(pat.entries.len(), 1);
    assert_eq!(pat.entries[0].program_number, 1);
    assert_eq!(pat.entries[0].program_map_pid, PID_PMT);

    let pmt_packet = &out[TS_PACKET_SIZE..];
    assert_eq!(parser.parse_header(pmt_packet).unwrap().pid, PID_PMT);
    let section = parser.parse_psi(parser.payload(pmt_packet).unwrap()).unwrap();
    let pmt = parser.parse_pmt(section.data).unwrap();
    assert_eq!(pmt.pcr_pid, PID_VIDEO);
    let streams: Vec<_> = pmt
        .elementary_stream_infos
        .iter()
        .map(|info| (info.stream_type, info.elementary_pid))
        .collect();
    assert_eq!(
        streams,
        vec![(STREAM_TYPE_AAC, PID_AUDIO), (STREAM_TYPE_H264, PID_VIDEO)]
    );
}

#[test]
fn test_pmt_lists_only_registered_streams() {
    let parser = TSPacketParser::new();

    for (audio, video, expected) in [
        (true, false, vec![(STREAM_TYPE_AAC, PID_AUDIO)]),
        (false, true, vec![(STREAM_TYPE_H264, PID_VIDEO)]),
        (false, false, vec![]),
    ] {
        let audio_codec = audio_codec();
        let video_codec = video_codec();
        let mut muxer = new_muxer(Vec::new(), false);
        muxer
            .write_header(
                Some(&audio_codec).filter(|_| audio),
                Some(&video_codec).filter(|_| video),
            )
            .unwrap();
        let out = muxer.into_inner();

        let pmt_packet = &out[TS_PACKET_SIZE..2 * TS_PACKET_SIZE];
        let section = parser.parse_psi(parser.payload(pmt_packet).unwrap()).unwrap();
        let pmt = parser.parse_pmt(section.data).unwrap();
        let streams: Vec<_> = pmt
            .elementary_stream_infos
            .iter()
            .map(|info| (info.stream_type, info.elementary_pid))
            .collect();
        assert_eq!(streams, expected);
    }
}

#[test]
fn test_counters_increment_per_packet() {
    let mut muxer = new_muxer(Vec::new(), false);
    muxer
        .write_header(Some(&audio_codec()), Some(&video_codec()))
        .unwrap();
    for i in 0..60 {
        muxer
            .write_packet(&video_frame(i, 300 + i as usize * 97), MediaType::Video)
            .unwrap();
        muxer
            .write_packet(&audio_frame(i, 200 + i as usize * 3), MediaType::Audio)
            .unwrap();
    }
    let out = muxer.into_inner();

    let counters = counters(&out);
    assert_eq!(counters[&PID_PAT], vec![0]);
    assert_eq!(counters[&PID_PMT], vec![0]);
    assert_continuous(&counters[&PID_VIDEO]);
    assert_continuous(&counters[&PID_AUDIO]);
}

#[test]
fn test_key_frame_nalu_order() {
    let mut muxer = new_muxer(Vec::new(), false);
    muxer.write_header(None, Some(&video_codec())).unwrap();

    let key = Packet::new(vec![0x00, 0x00, 0x01, 0x06, 0x05, 0x00, 0x00, 0x01, 0x65, 0x88])
        .with_key_flag(true);
    let delta = Packet::new(vec![0x00, 0x00, 0x01, 0x41, 0x9a]).with_time(Duration::from_millis(40));
    muxer.write_packet(&key, MediaType::Video).unwrap();
    muxer.write_packet(&delta, MediaType::Video).unwrap();
    let out = muxer.into_inner();

    let parser = TSPacketParser::new();
    let pes = parser.pes_packets(&out, PID_VIDEO).unwrap();
    assert_eq!(pes.len(), 2);

    let (_, header_len) = parser.parse_pes_header(&pes[0]).unwrap();
    let expected = [
        AUD_BYTES,
        SPS,
        START_CODE_BYTES,
        PPS,
        START_CODE_BYTES,
        &[0x06, 0x05],
        START_CODE_BYTES,
        &[0x65, 0x88],
    ]
    .concat();
    assert_eq!(&pes[0][header_len..], &expected[..]);

    let (header, header_len) = parser.parse_pes_header(&pes[1]).unwrap();
    assert_eq!(header.dts, Some(93_600));
    assert_eq!(&pes[1][header_len..], &[AUD_BYTES, &[0x41, 0x9a]].concat()[..]);
}

#[test]
fn test_audio_pes_length_and_timestamps() {
    let mut muxer = new_muxer(Vec::new(), false);
    muxer.write_header(Some(&audio_codec()), None).unwrap();
    for i in 0..4 {
        muxer
            .write_packet(&audio_frame(i, 100 + 150 * i as usize), MediaType::Audio)
            .unwrap();
    }
    let out = muxer.into_inner();

    let parser = TSPacketParser::new();
    let pes = parser.pes_packets(&out, PID_AUDIO).unwrap();
    assert_eq!(pes.len(), 4);

    for (i, unit) in pes.iter().enumerate() {
        let raw_len = 100 + 150 * i;
        let (header, header_len) = parser.parse_pes_header(unit).unwrap();
        assert_eq!(header.payload_length, Some(ADTS_HEADER_LENGTH + raw_len));
        assert_eq!(header.pts, Some(90_000 + 23 * 90 * i as u64));
        assert_eq!(header.dts, None);

        let adts = parse_adts_header(&unit[header_len..]).unwrap();
        assert_eq!(adts.frame_length as usize, ADTS_HEADER_LENGTH + raw_len);
        assert_eq!(adts.sample_rate(), Some(44_100));
        assert_eq!(unit.len(), header_len + ADTS_HEADER_LENGTH + raw_len);
    }
}

#[test]
fn test_he_aac_is_framed_as_lc() {
    // HE-AAC: SBR over an AAC LC core at 22.05 kHz, stereo
    let codec = CodecData::new(CodecType::AAC, &[0x2B, 0x92, 0x08, 0x00]).unwrap();
    let mut muxer = new_muxer(Vec::new(), false);
    muxer.write_header(Some(&codec), None).unwrap();
    muxer
        .write_packet(&audio_frame(0, 10), MediaType::Audio)
        .unwrap();
    let out = muxer.into_inner();

    let parser = TSPacketParser::new();
    let pes = parser.pes_packets(&out, PID_AUDIO).unwrap();
    let (_, header_len) = parser.parse_pes_header(&pes[0]).unwrap();
    let adts = parse_adts_header(&pes[0][header_len..]).unwrap();
    assert_eq!(adts.profile, ProfileType::LC);
    assert_eq!(adts.sample_rate_index, 7);
    assert_eq!(adts.channel_configuration, 2);
    assert_eq!(adts.frame_length as usize, ADTS_HEADER_LENGTH + 10);
}

#[test]
fn test_unregistered_video_emits_nothing() {
    let mut muxer = new_muxer(Vec::new(), false);
    muxer.write_header(Some(&audio_codec()), None).unwrap();
    let before = muxer.get_ref().len();

    let result = muxer.write_packet(&video_frame(0, 100), MediaType::Video);

    assert!(matches!(
        result,
        Err(MuxError::StreamNotRegistered(MediaType::Video))
    ));
    assert_eq!(muxer.get_ref().len(), before);
}

#[test]
fn test_unsupported_codec_type() {
    let result = CodecData::new(CodecType::H265, &[]);
    assert!(matches!(
        result,
        Err(MuxError::UnsupportedCodecType(CodecType::H265))
    ));
}

#[test]
fn test_audio_codec_in_video_slot() {
    let mut muxer = new_muxer(Vec::new(), false);
    let result = muxer.write_header(None, Some(&audio_codec()));

    assert!(matches!(
        result,
        Err(MuxError::UnsupportedCodec {
            media_type: MediaType::Video,
            codec_type: CodecType::AAC,
        })
    ));
    assert!(muxer.get_ref().is_empty());
}

#[test]
fn test_padded_segments_concatenate() {
    let mut muxer = new_muxer(Vec::new(), true);
    muxer
        .write_header(Some(&audio_codec()), Some(&video_codec()))
        .unwrap();

    let mut segments = Vec::new();
    for segment in 0..3u32 {
        for i in segment * 20..(segment + 1) * 20 {
            muxer
                .write_packet(&video_frame(i, 500 + i as usize * 11), MediaType::Video)
                .unwrap();
            muxer
                .write_packet(&audio_frame(i, 180), MediaType::Audio)
                .unwrap();
        }
        muxer.write_trailer().unwrap();
        assert_eq!(muxer.continuity_counter(MediaType::Audio), Some(0));
        assert_eq!(muxer.continuity_counter(MediaType::Video), Some(0));
        segments.push(muxer.set_writer(Vec::new()));
    }

    for segment in &segments {
        assert_eq!(segment.len() % TS_PACKET_SIZE, 0);
        let counters = counters(segment);
        assert_eq!(counters[&PID_AUDIO].len() % 16, 0);
        assert_eq!(counters[&PID_VIDEO].len() % 16, 0);
    }

    let joined = segments.concat();
    let counters = counters(&joined);
    assert_continuous(&counters[&PID_VIDEO]);
    assert_continuous(&counters[&PID_AUDIO]);
}

#[test]
fn test_shared_buffer_sink() {
    let sink = SharedBuffer::new();
    let mut muxer = new_muxer(sink.clone(), false);
    muxer
        .write_header(Some(&audio_codec()), Some(&video_codec()))
        .unwrap();
    let header = sink.take();
    assert_eq!(header.len(), 2 * TS_PACKET_SIZE);

    muxer
        .write_packet(&video_frame(0, 1000), MediaType::Video)
        .unwrap();
    muxer.write_trailer().unwrap();

    let body = sink.take();
    assert!(sink.is_empty());
    let parser = TSPacketParser::new();
    let af = parser.parse_adaptation_field(&body[..TS_PACKET_SIZE]).unwrap().unwrap();
    assert!(af.random_access);
    assert_eq!(af.pcr, Some(90_000 * 300));
    assert_eq!(parser.pes_packets(&body, PID_VIDEO).unwrap().len(), 1);
}

#[test]
fn test_sink_errors_propagate() {
    struct FailingWriter;

    impl std::io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let mut muxer = new_muxer(FailingWriter, false);
    let result = muxer.write_header(Some(&audio_codec()), None);
    assert!(matches!(result, Err(MuxError::Io(_))));
}

#[test]
fn test_sink_error_mid_packet_propagates() {
    /// Accepts `remaining` bytes, then fails every write.
    struct ShortWriter {
        remaining: usize,
    }

    impl std::io::Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.remaining == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "full"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    // room for PAT, PMT and the first packet of the frame
    let sink = ShortWriter {
        remaining: 3 * TS_PACKET_SIZE,
    };
    let mut muxer = new_muxer(sink, false);
    muxer.write_header(None, Some(&video_codec())).unwrap();

    let result = muxer.write_packet(&video_frame(0, 1000), MediaType::Video);
    assert!(matches!(result, Err(MuxError::Io(_))));
    assert_eq!(muxer.get_ref().remaining, 0);
}

#[quickcheck]
fn prop_nalus_are_framed_in_order(nalus: Vec<Vec<u8>>, is_key: bool) -> bool {
    // length-prefixed input so that arbitrary NALU bytes survive splitting
    let mut data = Vec::new();
    for nalu in &nalus {
        data.extend_from_slice(&(nalu.len() as u32).to_be_bytes());
        data.extend_from_slice(nalu);
    }

    let mut muxer = new_muxer(Vec::new(), false);
    muxer.write_header(None, Some(&video_codec())).unwrap();
    muxer
        .write_packet(&Packet::new(data).with_key_flag(is_key), MediaType::Video)
        .unwrap();
    let out = muxer.into_inner();

    let mut expected_nalus: Vec<&[u8]> = Vec::new();
    if is_key {
        expected_nalus.push(SPS);
        expected_nalus.push(PPS);
    }
    expected_nalus.extend(nalus.iter().map(Vec::as_slice).filter(|n| !n.is_empty()));

    let mut expected = Vec::new();
    for (i, nalu) in expected_nalus.iter().enumerate() {
        expected.extend_from_slice(if i == 0 { AUD_BYTES } else { START_CODE_BYTES });
        expected.extend_from_slice(nalu);
    }

    let parser = TSPacketParser::new();
    let pes = parser.pes_packets(&out, PID_VIDEO).unwrap();
    let (_, header_len) = parser.parse_pes_header(&pes[0]).unwrap();
    pes.len() == 1 && pes[0][header_len..] == expected[..]
}

#[quickcheck]
fn prop_padding_wraps_counters(sizes: Vec<u16>) -> bool {
    let mut muxer = new_muxer(Vec::new(), true);
    muxer
        .write_header(Some(&audio_codec()), Some(&video_codec()))
        .unwrap();

    for (i, &size) in sizes.iter().enumerate() {
        let size = size as usize % 4000;
        let media_type = if i % 2 == 0 {
            MediaType::Video
        } else {
            MediaType::Audio
        };
        let pkt = Packet::new(vec![0x41; size]).with_time(Duration::from_millis(i as u64 * 20));
        muxer.write_packet(&pkt, media_type).unwrap();
    }
    muxer.write_trailer().unwrap();

    let counters = counters(muxer.get_ref());
    let emitted = |pid| counters.get(&pid).map_or(0, Vec::len);
    emitted(PID_AUDIO) % 16 == 0
        && emitted(PID_VIDEO) % 16 == 0
        && counters.values().all(|cc| {
            cc.iter().enumerate().all(|(i, &c)| c == (i % 16) as u8)
        })
}
