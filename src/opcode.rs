/// Bit fields of a raw 16-bit opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionData {
    pub op_code: u16,
    pub instruction: u16,
    pub x: u8,
    pub y: u8,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
}

impl From<u16> for InstructionData {
    fn from(op_code: u16) -> Self {
        Self {
            op_code,
            instruction: op_code & 0xF000,
            x: ((op_code >> 8) & 0xF) as u8,
            y: ((op_code >> 4) & 0xF) as u8,
            n: (op_code & 0xF) as u8,
            nn: (op_code & 0xFF) as u8,
            nnn: op_code & 0xFFF,
        }
    }
}

/// Every instruction the interpreter executes. Anything else decodes to
/// [`Instruction::Unknown`] and is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump { nnn: u16 },
    /// 2nnn
    Call { nnn: u16 },
    /// 3xnn
    SkipIfEqual { x: u8, nn: u8 },
    /// 4xnn
    SkipIfNotEqual { x: u8, nn: u8 },
    /// 5xy0
    SkipIfRegistersEqual { x: u8, y: u8 },
    /// 6xnn
    Load { x: u8, nn: u8 },
    /// 7xnn
    Add { x: u8, nn: u8 },
    /// 8xy0
    Copy { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddWithCarry { x: u8, y: u8 },
    /// 8xy5
    Sub { x: u8, y: u8 },
    /// 8xy6
    ShiftRight { x: u8, y: u8 },
    /// 8xy7
    SubReversed { x: u8, y: u8 },
    /// 8xyE
    ShiftLeft { x: u8, y: u8 },
    /// 9xy0
    SkipIfRegistersNotEqual { x: u8, y: u8 },
    /// Annn
    LoadIndex { nnn: u16 },
    /// Bnnn
    JumpOffset { nnn: u16 },
    /// Cxnn
    Random { x: u8, nn: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipIfKey { x: u8 },
    /// ExA1
    SkipIfNotKey { x: u8 },
    /// Fx07
    ReadDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddIndex { x: u8 },
    /// Fx29
    FontChar { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegisters { x: u8 },
    /// Fx65
    LoadRegisters { x: u8 },
    Unknown(u16),
}

impl Instruction {
    pub fn decode(op_code: u16) -> Self {
        let InstructionData {
            instruction,
            x,
            y,
            n,
            nn,
            nnn,
            ..
        } = InstructionData::from(op_code);

        match (instruction, n) {
            (0x0000, _) => match op_code {
                0x00E0 => Self::ClearScreen,
                0x00EE => Self::Return,
                _ => Self::Unknown(op_code),
            },
            (0x1000, _) => Self::Jump { nnn },
            (0x2000, _) => Self::Call { nnn },
            (0x3000, _) => Self::SkipIfEqual { x, nn },
            (0x4000, _) => Self::SkipIfNotEqual { x, nn },
            (0x5000, 0x0) => Self::SkipIfRegistersEqual { x, y },
            (0x6000, _) => Self::Load { x, nn },
            (0x7000, _) => Self::Add { x, nn },
            (0x8000, 0x0) => Self::Copy { x, y },
            (0x8000, 0x1) => Self::Or { x, y },
            (0x8000, 0x2) => Self::And { x, y },
            (0x8000, 0x3) => Self::Xor { x, y },
            (0x8000, 0x4) => Self::AddWithCarry { x, y },
            (0x8000, 0x5) => Self::Sub { x, y },
            (0x8000, 0x6) => Self::ShiftRight { x, y },
            (0x8000, 0x7) => Self::SubReversed { x, y },
            (0x8000, 0xE) => Self::ShiftLeft { x, y },
            (0x9000, 0x0) => Self::SkipIfRegistersNotEqual { x, y },
            (0xA000, _) => Self::LoadIndex { nnn },
            (0xB000, _) => Self::JumpOffset { nnn },
            (0xC000, _) => Self::Random { x, nn },
            (0xD000, _) => Self::Draw { x, y, n },
            (0xE000, _) => match nn {
                0x9E => Self::SkipIfKey { x },
                0xA1 => Self::SkipIfNotKey { x },
                _ => Self::Unknown(op_code),
            },
            (0xF000, _) => match nn {
                0x07 => Self::ReadDelay { x },
                0x0A => Self::WaitKey { x },
                0x15 => Self::SetDelay { x },
                0x18 => Self::SetSound { x },
                0x1E => Self::AddIndex { x },
                0x29 => Self::FontChar { x },
                0x33 => Self::StoreBcd { x },
                0x55 => Self::StoreRegisters { x },
                0x65 => Self::LoadRegisters { x },
                _ => Self::Unknown(op_code),
            },
            _ => Self::Unknown(op_code),
        }
    }
}
