use std::fs::{self, File};
use std::io::BufWriter;
use std::time::Duration;
use tsmux::av::{CodecData, CodecType, MediaType, Packet};
use tsmux::codec::h264::H264CodecData;
use tsmux::format::ts::{TSMuxer, TSPacketParser, PID_AUDIO, PID_VIDEO, TS_PACKET_SIZE};

const SPS: &[u8] = &[0x67, 0x64, 0x00, 0x1f, 0xac, 0xd9, 0x40, 0x50];
const PPS: &[u8] = &[0x68, 0xeb, 0xe3, 0xcb, 0x22, 0xc0];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: write two TS segments from dummy video and audio streams
    fs::create_dir_all("output")?;

    let video = CodecData::from(H264CodecData::from_sps_pps(SPS, PPS)?);
    // AAC LC, 44.1 kHz, stereo
    let audio = CodecData::new(CodecType::AAC, &[0x12, 0x10])?;

    let first = BufWriter::new(File::create("output/segment0.ts")?);
    let mut muxer = TSMuxer::new(first);
    muxer.set_pad_continuity(true);
    muxer.write_header(Some(&audio), Some(&video))?;

    let frame_duration = Duration::from_millis(40);
    let audio_duration = Duration::from_nanos(1024 * 1_000_000_000 / 44_100);
    let mut audio_time = Duration::ZERO;

    for i in 0..100u32 {
        let time = frame_duration * i;

        // start the second segment on a key frame
        if i == 50 {
            muxer.write_trailer()?;
            let next = BufWriter::new(File::create("output/segment1.ts")?);
            drop(muxer.set_writer(next));
        }

        // Annex-B access unit with a single slice
        let mut data = vec![0x00, 0x00, 0x00, 0x01];
        data.push(if i % 25 == 0 { 0x65 } else { 0x41 });
        data.extend(std::iter::repeat(0xab).take(600 + (i as usize % 7) * 100));
        let video_packet = Packet::new(data)
            .with_time(time)
            .with_key_flag(i % 25 == 0);
        muxer.write_packet(&video_packet, MediaType::Video)?;

        while audio_time < time + frame_duration {
            let audio_packet = Packet::new(vec![0x21u8; 371]).with_time(audio_time);
            muxer.write_packet(&audio_packet, MediaType::Audio)?;
            audio_time += audio_duration;
        }
    }
    muxer.write_trailer()?;
    drop(muxer);

    // Read the segments back
    let parser = TSPacketParser::new();
    for name in ["output/segment0.ts", "output/segment1.ts"] {
        let data = fs::read(name)?;
        let video_units = parser.pes_packets(&data, PID_VIDEO)?.len();
        let audio_units = parser.pes_packets(&data, PID_AUDIO)?.len();
        println!(
            "{}: {} packets, {} video and {} audio PES packets",
            name,
            data.len() / TS_PACKET_SIZE,
            video_units,
            audio_units
        );
    }

    Ok(())
}
