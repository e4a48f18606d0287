//! Decoding of the 35 two-byte CHIP-8 instructions.
//!
//! Field names follow the usual nibble notation: `x` and `y` are register
//! indices (bits 8-11 and 4-7), `n` the low nibble, `nn` the low byte and
//! `nnn` the low twelve bits.
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 0NNN machine code routine; nothing to run it on, so ignored
    System(u16),
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipIfEqual { x: u8, nn: u8 },
    /// 4XNN
    SkipIfNotEqual { x: u8, nn: u8 },
    /// 5XY0
    SkipIfRegistersEqual { x: u8, y: u8 },
    /// 6XNN
    Load { x: u8, nn: u8 },
    /// 7XNN
    AddImmediate { x: u8, nn: u8 },
    /// 8XY0
    Move { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    Add { x: u8, y: u8 },
    /// 8XY5
    Sub { x: u8, y: u8 },
    /// 8XY6
    ShiftRight { x: u8, y: u8 },
    /// 8XY7
    SubReversed { x: u8, y: u8 },
    /// 8XYE
    ShiftLeft { x: u8, y: u8 },
    /// 9XY0
    SkipIfRegistersNotEqual { x: u8, y: u8 },
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset(u16),
    /// CXNN
    Random { x: u8, nn: u8 },
    /// DXYN
    Draw { x: u8, y: u8, n: u8 },
    /// EX9E
    SkipIfKeyPressed { x: u8 },
    /// EXA1
    SkipIfKeyNotPressed { x: u8 },
    /// FX07
    GetDelay { x: u8 },
    /// FX0A
    WaitKey { x: u8 },
    /// FX15
    SetDelay { x: u8 },
    /// FX18
    SetSound { x: u8 },
    /// FX1E
    AddIndex { x: u8 },
    /// FX29
    LoadGlyph { x: u8 },
    /// FX33
    StoreBcd { x: u8 },
    /// FX55
    StoreRegisters { x: u8 },
    /// FX65
    LoadRegisters { x: u8 },
    /// anything else; executes as a no-op
    Unknown(u16),
}

impl Instruction {
    pub fn decode(word: u16) -> Self {
        use Instruction::*;

        let x = ((word >> 8) & 0xf) as u8;
        let y = ((word >> 4) & 0xf) as u8;
        let n = (word & 0xf) as u8;
        let nn = (word & 0xff) as u8;
        let nnn = word & 0x0fff;

        match (word >> 12, n) {
            (0x0, _) => match word {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => System(nnn),
            },
            (0x1, _) => Jump(nnn),
            (0x2, _) => Call(nnn),
            (0x3, _) => SkipIfEqual { x, nn },
            (0x4, _) => SkipIfNotEqual { x, nn },
            (0x5, 0x0) => SkipIfRegistersEqual { x, y },
            (0x6, _) => Load { x, nn },
            (0x7, _) => AddImmediate { x, nn },
            (0x8, 0x0) => Move { x, y },
            (0x8, 0x1) => Or { x, y },
            (0x8, 0x2) => And { x, y },
            (0x8, 0x3) => Xor { x, y },
            (0x8, 0x4) => Add { x, y },
            (0x8, 0x5) => Sub { x, y },
            (0x8, 0x6) => ShiftRight { x, y },
            (0x8, 0x7) => SubReversed { x, y },
            (0x8, 0xe) => ShiftLeft { x, y },
            (0x9, 0x0) => SkipIfRegistersNotEqual { x, y },
            (0xa, _) => LoadIndex(nnn),
            (0xb, _) => JumpOffset(nnn),
            (0xc, _) => Random { x, nn },
            (0xd, _) => Draw { x, y, n },
            (0xe, _) => match nn {
                0x9e => SkipIfKeyPressed { x },
                0xa1 => SkipIfKeyNotPressed { x },
                _ => Unknown(word),
            },
            (0xf, _) => match nn {
                0x07 => GetDelay { x },
                0x0a => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1e => AddIndex { x },
                0x29 => LoadGlyph { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegisters { x },
                0x65 => LoadRegisters { x },
                _ => Unknown(word),
            },
            _ => Unknown(word),
        }
    }
}

/// disassembly, in the Cowgod mnemonic style
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            System(nnn) => write!(f, "SYS  0x{:03x}", nnn),
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(nnn) => write!(f, "JP   0x{:03x}", nnn),
            Call(nnn) => write!(f, "CALL 0x{:03x}", nnn),
            SkipIfEqual { x, nn } => write!(f, "SE   V{:X}, 0x{:02x}", x, nn),
            SkipIfNotEqual { x, nn } => write!(f, "SNE  V{:X}, 0x{:02x}", x, nn),
            SkipIfRegistersEqual { x, y } => write!(f, "SE   V{:X}, V{:X}", x, y),
            Load { x, nn } => write!(f, "LD   V{:X}, 0x{:02x}", x, nn),
            AddImmediate { x, nn } => write!(f, "ADD  V{:X}, 0x{:02x}", x, nn),
            Move { x, y } => write!(f, "LD   V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR   V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND  V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR  V{:X}, V{:X}", x, y),
            Add { x, y } => write!(f, "ADD  V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB  V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR  V{:X}, V{:X}", x, y),
            SubReversed { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL  V{:X}, V{:X}", x, y),
            SkipIfRegistersNotEqual { x, y } => write!(f, "SNE  V{:X}, V{:X}", x, y),
            LoadIndex(nnn) => write!(f, "LD   I, 0x{:03x}", nnn),
            JumpOffset(nnn) => write!(f, "JP   V0, 0x{:03x}", nnn),
            Random { x, nn } => write!(f, "RND  V{:X}, 0x{:02x}", x, nn),
            Draw { x, y, n } => write!(f, "DRW  V{:X}, V{:X}, {}", x, y, n),
            SkipIfKeyPressed { x } => write!(f, "SKP  V{:X}", x),
            SkipIfKeyNotPressed { x } => write!(f, "SKNP V{:X}", x),
            GetDelay { x } => write!(f, "LD   V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD   V{:X}, K", x),
            SetDelay { x } => write!(f, "LD   DT, V{:X}", x),
            SetSound { x } => write!(f, "LD   ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD  I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD   F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD   B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD   [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD   V{:X}, [I]", x),
            Unknown(word) => write!(f, "DW   0x{:04x}", word),
        }
    }
}
