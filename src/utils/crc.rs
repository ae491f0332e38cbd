/// CRC32 used by MPEG-2 TS PSI sections (ITU-T H.222.0 / ISO/IEC 13818-1).
///
/// Polynomial 0x04C11DB7, initial value 0xFFFFFFFF, no reflection, no final
/// XOR. Running the checksum over a whole section including its trailing CRC
/// yields zero.
const CRC32_MPEG2: u32 = 0x04C11DB7;

pub struct Crc32Mpeg2 {
    table: [u32; 256],
}

impl Crc32Mpeg2 {
    pub const fn new() -> Self {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = (i as u32) << 24;
            let mut bit = 0;
            while bit < 8 {
                crc = if (crc & 0x80000000) != 0 {
                    (crc << 1) ^ CRC32_MPEG2
                } else {
                    crc << 1
                };
                bit += 1;
            }
            table[i] = crc;
            i += 1;
        }
        Self { table }
    }

    /// Checksum of `data`.
    ///
    /// ```
    /// use tsmux::utils::Crc32Mpeg2;
    ///
    /// let crc = Crc32Mpeg2::new();
    /// assert_eq!(crc.calculate(&[0x01, 0x01]), 0xD66FB816);
    /// ```
    pub fn calculate(&self, data: &[u8]) -> u32 {
        data.iter().fold(0xFFFFFFFF, |crc, &byte| {
            let index = ((crc >> 24) ^ byte as u32) & 0xFF;
            (crc << 8) ^ self.table[index as usize]
        })
    }
}

impl Default for Crc32Mpeg2 {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared table; building one is cheap but there is no reason to do it per section.
pub static CRC32: Crc32Mpeg2 = Crc32Mpeg2::new();
