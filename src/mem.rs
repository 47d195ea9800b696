use std::{
    fs::File,
    io::{
        self,
        Read,
    },
    path::Path,
};

use thiserror::Error;

use crate::constants;

#[rustfmt::skip]
pub const FONT: [u8; 80] = [
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
    0xF0, 0x80, 0xF0, 0x80, 0x80  // F
];

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamError {
    #[error("invalid address {0:#05x}")]
    InvalidAddress(usize),
}

/// Flat 4 KiB address space. The font lives at [`constants::FONT_OFFSET`] and
/// programs are loaded at [`constants::MEMORY_OFFSET`].
#[derive(Clone)]
pub struct Ram {
    memory: [u8; constants::TOTAL_RAM],
}

impl Ram {
    /// Zeroed memory with the font table copied in.
    pub fn new() -> Self {
        let mut memory = [0; constants::TOTAL_RAM];
        memory[constants::FONT_OFFSET..constants::FONT_OFFSET + FONT.len()].copy_from_slice(&FONT);

        Self { memory }
    }

    pub fn load_program(&mut self, program: &[u8]) -> Result<(), RomError> {
        if program.len() > constants::AVAILABLE_RAM {
            return Err(RomError::OutOfMemory {
                rom_size: program.len(),
                ram_size: constants::AVAILABLE_RAM,
            });
        }
        self.memory[constants::MEMORY_OFFSET..constants::MEMORY_OFFSET + program.len()].copy_from_slice(program);

        Ok(())
    }

    pub fn op_code(&self, pc: &ProgramCounter) -> Result<u16, RamError> {
        let pc = pc.inner() as usize;
        let high = self.get(pc)? as u16;
        let low = self.get(pc + 1)? as u16;
        Ok((high << 8) | low)
    }

    pub fn get<T: Into<usize>>(&self, index: T) -> Result<u8, RamError> {
        let idx = index.into();
        self.memory.get(idx).ok_or(RamError::InvalidAddress(idx)).copied()
    }

    pub fn get_mut<T: Into<usize>>(&mut self, index: T) -> Result<&mut u8, RamError> {
        let idx = index.into();
        self.memory.get_mut(idx).ok_or(RamError::InvalidAddress(idx))
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

/// General purpose registers V0..VF. VF doubles as the flag register.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Register {
    registers: [u8; constants::REGISTER_COUNT],
}

impl Register {
    pub const FLAG: u8 = 0xF;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, x: u8) -> u8 {
        self.registers[usize::from(x & 0xF)]
    }

    pub fn set(&mut self, x: u8, val: u8) {
        self.registers[usize::from(x & 0xF)] = val;
    }

    pub fn get_mut(&mut self, x: u8) -> &mut u8 {
        &mut self.registers[usize::from(x & 0xF)]
    }

    /// Writes `val` to Vx and then `flag` to VF. With x == 0xF the flag wins.
    pub fn set_with_flag(&mut self, x: u8, val: u8, flag: bool) {
        self.set(x, val);
        self.set(Self::FLAG, flag as u8);
    }

    pub fn cmp_registers(&self, x: u8, y: u8) -> bool {
        self.get(x) == self.get(y)
    }
}

#[derive(Error, Debug)]
pub enum RomError {
    #[error("loading rom failed {0}")]
    IoError(#[from] io::Error),

    #[error("out of memory {rom_size:?} > {ram_size:?}")]
    OutOfMemory { rom_size: usize, ram_size: usize },
}

/// A program image that is known to fit in program space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let mut file = File::open(path.as_ref())?;
        let mut data = vec![];

        file.read_to_end(&mut data)?;

        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RomError> {
        if data.len() > constants::AVAILABLE_RAM {
            Err(RomError::OutOfMemory {
                rom_size: data.len(),
                ram_size: constants::AVAILABLE_RAM,
            })?
        }

        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    #[error("stack overflow, all {} slots in use", constants::STACK_SIZE)]
    Overflow,

    #[error("stack underflow, return without call")]
    Underflow,
}

/// Return address stack with a fixed number of slots.
#[derive(Debug, Default, Clone)]
pub struct AddressStack {
    slots: [u16; constants::STACK_SIZE],
    sp: usize,
}

impl AddressStack {
    pub fn pop(&mut self) -> Result<u16, StackError> {
        if self.sp == 0 {
            return Err(StackError::Underflow);
        }
        self.sp -= 1;
        Ok(self.slots[self.sp])
    }

    pub fn push(&mut self, val: u16) -> Result<(), StackError> {
        if self.sp >= constants::STACK_SIZE {
            return Err(StackError::Overflow);
        }
        self.slots[self.sp] = val;
        self.sp += 1;
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.sp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(u16);

impl ProgramCounter {
    pub fn new() -> Self {
        Self(constants::MEMORY_OFFSET as u16)
    }

    pub fn inner(&self) -> u16 {
        self.0
    }

    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(2);
    }

    pub fn decrement(&mut self) {
        self.0 = self.0.wrapping_sub(2);
    }

    pub fn jump(&mut self, address: u16) {
        self.0 = address;
    }
}

impl Default for ProgramCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_is_copied_to_offset() {
        let ram = Ram::new();
        assert_eq!(ram.get(constants::FONT_OFFSET).unwrap(), 0xF0);
        assert_eq!(ram.get(constants::FONT_OFFSET + 79).unwrap(), 0x80);
        assert_eq!(ram.get(constants::FONT_OFFSET - 1).unwrap(), 0);
        assert_eq!(ram.get(constants::FONT_OFFSET + 80).unwrap(), 0);
    }

    #[test]
    fn op_code_is_big_endian() {
        let mut ram = Ram::new();
        ram.load_program(&[0xA3, 0x05]).unwrap();
        assert_eq!(ram.op_code(&ProgramCounter::new()).unwrap(), 0xA305);
    }

    #[test]
    fn op_code_past_end_is_invalid() {
        let ram = Ram::new();
        let mut pc = ProgramCounter::new();
        pc.jump(0xFFF);
        assert_eq!(ram.op_code(&pc), Err(RamError::InvalidAddress(0x1000)));
    }

    #[test]
    fn oversized_program_is_rejected() {
        let mut ram = Ram::new();
        let too_big = vec![0xAA; constants::AVAILABLE_RAM + 1];
        assert!(matches!(
            ram.load_program(&too_big),
            Err(RomError::OutOfMemory { rom_size, .. }) if rom_size == constants::AVAILABLE_RAM + 1
        ));
        assert_eq!(ram.get(constants::MEMORY_OFFSET).unwrap(), 0);
    }

    #[test]
    fn rom_size_limits() {
        assert!(Rom::from_bytes(vec![0; constants::AVAILABLE_RAM]).is_ok());
        assert!(Rom::from_bytes(vec![0; constants::AVAILABLE_RAM + 1]).is_err());
        assert!(Rom::from_bytes(vec![]).unwrap().is_empty());
    }

    #[test]
    fn flag_write_wins_over_vf_destination() {
        let mut register = Register::new();
        register.set_with_flag(0xF, 0x42, true);
        assert_eq!(register.get(0xF), 1);
        register.set_with_flag(0x3, 0x42, false);
        assert_eq!(register.get(0x3), 0x42);
        assert_eq!(register.get(0xF), 0);
    }

    #[test]
    fn stack_holds_sixteen_addresses() {
        let mut stack = AddressStack::default();
        for addr in 0..16u16 {
            stack.push(0x200 + addr * 2).unwrap();
        }
        assert_eq!(stack.push(0x300), Err(StackError::Overflow));
        assert_eq!(stack.depth(), 16);
        assert_eq!(stack.pop(), Ok(0x21E));
    }

    #[test]
    fn empty_stack_underflows() {
        let mut stack = AddressStack::default();
        assert_eq!(stack.pop(), Err(StackError::Underflow));
    }
}
