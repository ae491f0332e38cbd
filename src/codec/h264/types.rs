/// Access unit delimiter NALU (primary_pic_type = 7, any slice type)
/// followed by the start code of the NALU that comes after it.
pub const AUD_BYTES: &[u8] = &[0x00, 0x00, 0x00, 0x01, 0x09, 0xf0, 0x00, 0x00, 0x00, 0x01];

/// Annex-B start code placed in front of every NALU after the first.
pub const START_CODE_BYTES: &[u8] = &[0x00, 0x00, 0x01];

/// How a payload handed to the splitter was framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaluFormat {
    /// A single NALU without any framing.
    Raw,
    /// 4-byte big-endian length prefixes.
    Avcc,
    /// 3- or 4-byte start codes.
    AnnexB,
}

/// Header fields of a single NALU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NALUnit {
    pub nal_type: u8,
    pub nal_ref_idc: u8,
}

impl NALUnit {
    /// Reads the NALU header byte. `None` for an empty slice.
    pub fn parse(data: &[u8]) -> Option<Self> {
        data.first().map(|header| Self {
            nal_type: header & 0x1F,
            nal_ref_idc: (header >> 5) & 0x03,
        })
    }

    pub fn unit_type(&self) -> NALUnitType {
        NALUnitType::from(self.nal_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NALUnitType {
    Unspecified = 0,
    CodedSliceNonIDR = 1,
    CodedSliceDataPartitionA = 2,
    CodedSliceDataPartitionB = 3,
    CodedSliceDataPartitionC = 4,
    CodedSliceIDR = 5,
    SEI = 6,
    SPS = 7,
    PPS = 8,
    AccessUnitDelimiter = 9,
    EndOfSequence = 10,
    EndOfStream = 11,
    FillerData = 12,
}

impl From<u8> for NALUnitType {
    fn from(value: u8) -> Self {
        match value {
            1 => NALUnitType::CodedSliceNonIDR,
            2 => NALUnitType::CodedSliceDataPartitionA,
            3 => NALUnitType::CodedSliceDataPartitionB,
            4 => NALUnitType::CodedSliceDataPartitionC,
            5 => NALUnitType::CodedSliceIDR,
            6 => NALUnitType::SEI,
            7 => NALUnitType::SPS,
            8 => NALUnitType::PPS,
            9 => NALUnitType::AccessUnitDelimiter,
            10 => NALUnitType::EndOfSequence,
            11 => NALUnitType::EndOfStream,
            12 => NALUnitType::FillerData,
            _ => NALUnitType::Unspecified,
        }
    }
}
