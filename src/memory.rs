use crate::error::LoadError;
use log::debug;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the machine's address space.
///
/// Byte and word access wraps at the top of memory, so a program can never
/// read or write outside it. Bulk writes do not wrap; they either fit or fail.
pub trait MemoryMap {
    /// size of the address space in bytes
    fn size(&self) -> usize;

    /// get a r/o slice of the underlying memory, if the whole range exists
    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]>;

    /// get a r/w slice of the underlying memory, if the whole range exists
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Option<&mut [u8]>;

    /// read one byte; the address wraps
    fn read_byte(&self, addr: u16) -> u8;

    /// write one byte; the address wraps
    fn write_byte(&mut self, addr: u16, value: u8);

    /// get a big-endian two-byte word (instruction fetch)
    fn get_word(&self, addr: u16) -> u16 {
        (self.read_byte(addr) as u16) << 8 | self.read_byte(addr.wrapping_add(1)) as u16
    }

    /// write a chunk of bytes starting at `addr`
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), LoadError> {
        let capacity = self.size().saturating_sub(addr as usize);
        let bytes = self
            .get_rw_slice(addr, data.len())
            .ok_or(LoadError::ProgramTooLarge {
                len: data.len(),
                capacity,
            })?;
        bytes.copy_from_slice(data);
        Ok(())
    }

    /// write unknown len of data into memory at a particular address
    ///
    /// the reader is drained before anything is written, so a read error
    /// leaves memory untouched
    fn write_any(&mut self, reader: &mut impl io::Read, addr: u16) -> Result<usize, LoadError> {
        let mut buf = Vec::new();
        let len = reader.read_to_end(&mut buf)?;
        self.write(&buf, addr)?;
        Ok(len)
    }
}

/// Defines the CHIP-8 standard memory map, 4K configuration:
///   0x0000-0x01ff  interpreter (font at 0x0050)
///   0x0200-0x0fff  program
///
/// the stack, registers and display live outside addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Option<&[u8]> {
        let a = addr as usize;
        self.bytes.get(a..a.checked_add(len)?)
    }

    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Option<&mut [u8]> {
        let a = addr as usize;
        self.bytes.get_mut(a..a.checked_add(len)?)
    }

    fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize & ADDRESS_MASK]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize & ADDRESS_MASK] = value;
    }
}

/// how much RAM we have
pub const RAM_SIZE_BYTES: usize = 4096;
const ADDRESS_MASK: usize = RAM_SIZE_BYTES - 1;

/// where the program is loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit sprites live, and how tall each one is
pub const FONT_ADDR: u16 = 0x050;
pub const FONT_GLYPH_BYTES: u16 = 5;

impl Chip8MemoryMap {
    /// zeroed memory with the font baked in
    pub fn new() -> Self {
        let mut bytes = vec![0u8; RAM_SIZE_BYTES].into_boxed_slice();
        let font = FONT_ADDR as usize;
        bytes[font..font + CHIP8_FONT.len()].copy_from_slice(&CHIP8_FONT);
        Chip8MemoryMap {
            bytes,
            program_addr: PROGRAM_ADDR,
            font_addr: FONT_ADDR,
        }
    }

    /// load a CHIP-8 program at 0x200 from any byte source
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, LoadError> {
        let len = self.write_any(reader, self.program_addr)?;
        debug!("loaded {} bytes at 0x{:03x}", len, self.program_addr);
        Ok(len)
    }

    /// address of the sprite for the low nibble of `digit`
    pub fn glyph_addr(&self, digit: u8) -> u16 {
        self.font_addr + (digit & 0x0f) as u16 * FONT_GLYPH_BYTES
    }

    /// the whole address space, for debuggers and tests
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenReader;

    impl io::Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed from 0x200 because before that we bake in the font
        assert_eq!(m.bytes[0x200..], [0; 0xe00]);
        assert_eq!(m.bytes[..0x50], [0; 0x50]);
    }

    #[test]
    fn test_font_installed() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.get_ro_slice(0x50, 5), Some(&[0xF0, 0x90, 0x90, 0x90, 0xF0][..]));
        assert_eq!(m.get_ro_slice(m.glyph_addr(0xf), 5), Some(&[0xF0, 0x80, 0xF0, 0x80, 0x80][..]));
        assert_eq!(m.read_byte(0xa0), 0);
    }

    #[test]
    fn test_glyph_addr_uses_low_nibble() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.glyph_addr(0x0), 0x50);
        assert_eq!(m.glyph_addr(0xa), 0x50 + 50);
        assert_eq!(m.glyph_addr(0x1a), 0x50 + 50);
    }

    #[test]
    fn test_write_any_data_ok() -> Result<(), LoadError> {
        let mut dst = Chip8MemoryMap::new();
        let mut src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(dst.write_any(&mut src, 0x300)?, 8);
        assert_eq!(dst.bytes[0x2f8..0x308], [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]);
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<(), LoadError> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x200)?;
        assert_eq!(m.get_word(0x204), 0x0405);
        Ok(())
    }

    #[test]
    fn test_byte_access_wraps() {
        let mut m = Chip8MemoryMap::new();
        m.write_byte(0x1000, 0xab);
        assert_eq!(m.read_byte(0x0000), 0xab);
        m.write_byte(0x0fff, 0xcd);
        assert_eq!(m.get_word(0x0fff), 0xcdab);
    }

    #[test]
    fn test_write_too_much_rejected() {
        let mut dst = Chip8MemoryMap::new();
        let mut src: &[u8] = &[0xff; 8];
        let err = dst.write_any(&mut src, 4089).unwrap_err();
        assert!(matches!(err, LoadError::ProgramTooLarge { len: 8, capacity: 7 }));
        assert_eq!(dst.bytes[4089..], [0; 7]);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), LoadError> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        dst.load_program(&mut prog)?;
        assert_eq!(dst.get_ro_slice(0x200, 2), Some(&[0x00, 0xe0][..]));
        Ok(())
    }

    #[test]
    fn test_program_fills_memory_exactly() -> Result<(), LoadError> {
        let mut dst = Chip8MemoryMap::new();
        let prog = vec![0x12; RAM_SIZE_BYTES - PROGRAM_ADDR as usize];
        assert_eq!(dst.load_program(&mut prog.as_slice())?, 0xe00);
        assert_eq!(dst.read_byte(0xfff), 0x12);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let prog = vec![0x12; RAM_SIZE_BYTES - PROGRAM_ADDR as usize + 1];
        let err = dst.load_program(&mut prog.as_slice()).unwrap_err();
        assert!(matches!(err, LoadError::ProgramTooLarge { len: 0xe01, capacity: 0xe00 }));
        // nothing partially written
        assert_eq!(dst.bytes[0x200..], [0; 0xe00]);
    }

    #[test]
    fn test_unreadable_source() {
        let mut dst = Chip8MemoryMap::new();
        let err = dst.load_program(&mut BrokenReader).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_empty_program_ok() -> Result<(), LoadError> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[];
        assert_eq!(dst.load_program(&mut prog)?, 0);
        Ok(())
    }
}
