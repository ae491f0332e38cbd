/// Length of an ADTS header without CRC.
pub const ADTS_HEADER_LENGTH: usize = 7;

/// Samples carried by one AAC frame.
pub const AAC_FRAME_SAMPLES: usize = 1024;

const SAMPLE_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// The ADTS profile field, i.e. the audio object type minus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileType {
    Main = 0,
    LC = 1,
    SSR = 2,
    LTP = 3,
}

impl From<u8> for ProfileType {
    fn from(value: u8) -> Self {
        match value & 0x3 {
            0 => ProfileType::Main,
            1 => ProfileType::LC,
            2 => ProfileType::SSR,
            _ => ProfileType::LTP,
        }
    }
}

/// The fields of an AudioSpecificConfig that an ADTS header can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AacConfig {
    pub object_type: u8,
    pub sample_rate_index: u8,
    pub channel_configuration: u8,
}

impl Default for AacConfig {
    fn default() -> Self {
        Self {
            object_type: 2,           // AAC-LC
            sample_rate_index: 4,     // 44100 Hz
            channel_configuration: 2, // Stereo
        }
    }
}

impl AacConfig {
    pub fn profile(&self) -> ProfileType {
        ProfileType::from(self.object_type.saturating_sub(1))
    }

    pub fn sample_rate(&self) -> Option<u32> {
        SAMPLE_RATES.get(self.sample_rate_index as usize).copied()
    }

    /// Index of `rate` in the MPEG-4 sampling frequency table.
    pub fn sample_rate_index_of(rate: u32) -> Option<u8> {
        SAMPLE_RATES.iter().position(|&r| r == rate).map(|i| i as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ADTSHeader {
    pub sync_word: u32,             // 12 bits
    pub id: u8,                     // 1 bit, 0=MPEG-4, 1=MPEG-2
    pub layer: u8,                  // 2 bits
    pub protection_absent: bool,    // 1 bit
    pub profile: ProfileType,       // 2 bits
    pub sample_rate_index: u8,      // 4 bits
    pub private_bit: bool,          // 1 bit
    pub channel_configuration: u8,  // 3 bits
    pub original_copy: bool,        // 1 bit
    pub home: bool,                 // 1 bit
    pub copyright_id_bit: bool,     // 1 bit
    pub copyright_id_start: bool,   // 1 bit
    pub frame_length: u16,          // 13 bits, header included
    pub buffer_fullness: u16,       // 11 bits
    pub number_of_raw_blocks: u8,   // 2 bits, frames minus one
}

impl ADTSHeader {
    pub fn sync_word_valid(&self) -> bool {
        self.sync_word == 0xFFF
    }

    pub fn sample_rate(&self) -> Option<u32> {
        SAMPLE_RATES.get(self.sample_rate_index as usize).copied()
    }

    /// Packs the header into its 7-byte wire form.
    pub fn write_to(&self, buf: &mut [u8; ADTS_HEADER_LENGTH]) {
        let frame_length = self.frame_length & 0x1fff;

        buf[0] = (self.sync_word >> 4) as u8;
        buf[1] = ((self.sync_word & 0xf) as u8) << 4
            | (self.id & 0x1) << 3
            | (self.layer & 0x3) << 1
            | self.protection_absent as u8;
        buf[2] = (self.profile as u8) << 6
            | (self.sample_rate_index & 0xf) << 2
            | (self.private_bit as u8) << 1
            | (self.channel_configuration >> 2) & 0x1;
        buf[3] = (self.channel_configuration & 0x3) << 6
            | (self.original_copy as u8) << 5
            | (self.home as u8) << 4
            | (self.copyright_id_bit as u8) << 3
            | (self.copyright_id_start as u8) << 2
            | (frame_length >> 11) as u8;
        buf[4] = (frame_length >> 3) as u8;
        buf[5] = ((frame_length & 0x7) as u8) << 5 | ((self.buffer_fullness >> 6) & 0x1f) as u8;
        buf[6] = ((self.buffer_fullness & 0x3f) as u8) << 2 | (self.number_of_raw_blocks & 0x3);
    }
}
