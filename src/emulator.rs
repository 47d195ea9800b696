use log::{
    debug,
    trace,
};
use rand::{
    rngs::StdRng,
    SeedableRng,
};
use thiserror::Error;

use crate::{
    display::Display,
    input::KeyPad,
    mem::{
        AddressStack,
        ProgramCounter,
        Ram,
        RamError,
        Register,
        RomError,
    },
    opcode::Instruction,
    process::{
        self,
        ProcessingError,
    },
    rng::RandomSource,
    timers::Timers,
};

/// A fault that ends the session. Carries the address and opcode that raised it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmulatorError {
    #[error("fault at {pc:#05x} executing {op_code:#06x}: {source}")]
    Fault {
        pc: u16,
        op_code: u16,
        source: ProcessingError,
    },

    #[error("fetch failed at {pc:#05x}: {source}")]
    Fetch { pc: u16, source: RamError },
}

/// The CHIP-8 machine state and the interpreter that drives it.
pub struct Emulator {
    memory: Ram,
    pc: ProgramCounter,
    stack: AddressStack,
    register: Register,
    index_register: u16,
    timers: Timers,
    display: Display,
    keypad: KeyPad,
    rng: Box<dyn RandomSource>,
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_rng(Box::new(StdRng::from_entropy()))
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn with_rng(rng: Box<dyn RandomSource>) -> Self {
        Self {
            memory: Ram::new(),
            pc: ProgramCounter::new(),
            stack: AddressStack::default(),
            register: Register::new(),
            index_register: 0,
            timers: Timers::default(),
            display: Display::new(),
            keypad: KeyPad::new(),
            rng,
        }
    }

    /// Back to power-on state: zeroed memory with the font, pc at 0x200.
    /// The keypad latch belongs to the host and is left alone.
    pub fn reset(&mut self) {
        self.memory = Ram::new();
        self.pc = ProgramCounter::new();
        self.stack = AddressStack::default();
        self.register = Register::new();
        self.index_register = 0;
        self.timers = Timers::default();
        self.display.clear();
        debug!("emulator reset");
    }

    pub fn load(&mut self, program: &[u8]) -> Result<(), RomError> {
        self.memory.load_program(program)?;
        debug!("loaded {} byte program", program.len());
        Ok(())
    }

    /// Fetches, decodes and executes exactly one instruction.
    pub fn cycle(&mut self) -> Result<(), EmulatorError> {
        let pc = self.pc.inner();
        let op_code = self
            .memory
            .op_code(&self.pc)
            .map_err(|source| EmulatorError::Fetch { pc, source })?;
        self.pc.increment();

        let instruction = Instruction::decode(op_code);
        trace!("{:#05x}: {:#06x} {:?}", pc, op_code, instruction);

        self.execute(instruction)
            .map_err(|source| EmulatorError::Fault { pc, op_code, source })
    }

    /// Decrements the delay and sound timers. Call at a fixed rate, normally 60 Hz.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    #[rustfmt::skip]
    fn execute(&mut self, instruction: Instruction) -> Result<(), ProcessingError> {
        match instruction {
            Instruction::ClearScreen                      => process::op_00E0(&mut self.display),
            Instruction::Return                           => process::op_00EE(&mut self.pc, &mut self.stack)?,
            Instruction::Jump { nnn }                     => process::op_1NNN(&mut self.pc, nnn),
            Instruction::Call { nnn }                     => process::op_2NNN(&mut self.stack, &mut self.pc, nnn)?,
            Instruction::SkipIfEqual { x, nn }            => process::op_3XNN(&self.register, x, nn, &mut self.pc),
            Instruction::SkipIfNotEqual { x, nn }         => process::op_4XNN(&self.register, x, nn, &mut self.pc),
            Instruction::SkipIfRegistersEqual { x, y }    => process::op_5XY0(&self.register, x, y, &mut self.pc),
            Instruction::Load { x, nn }                   => process::op_6XNN(&mut self.register, x, nn),
            Instruction::Add { x, nn }                    => process::op_7XNN(&mut self.register, x, nn),
            Instruction::Copy { x, y }                    => process::op_8XY0(&mut self.register, x, y),
            Instruction::Or { x, y }                      => process::op_8XY1(&mut self.register, x, y),
            Instruction::And { x, y }                     => process::op_8XY2(&mut self.register, x, y),
            Instruction::Xor { x, y }                     => process::op_8XY3(&mut self.register, x, y),
            Instruction::AddWithCarry { x, y }            => process::op_8XY4(&mut self.register, x, y),
            Instruction::Sub { x, y }                     => process::op_8XY5(&mut self.register, x, y),
            Instruction::ShiftRight { x, .. }             => process::op_8XY6(&mut self.register, x),
            Instruction::SubReversed { x, y }             => process::op_8XY7(&mut self.register, x, y),
            Instruction::ShiftLeft { x, .. }              => process::op_8XYE(&mut self.register, x),
            Instruction::SkipIfRegistersNotEqual { x, y } => process::op_9XY0(&self.register, x, y, &mut self.pc),
            Instruction::LoadIndex { nnn }                => process::op_ANNN(&mut self.index_register, nnn),
            Instruction::JumpOffset { nnn }               => process::op_BNNN(&self.register, &mut self.pc, nnn),
            Instruction::Random { x, nn }                 => process::op_CXNN(&mut self.register, self.rng.as_mut(), x, nn),
            Instruction::Draw { x, y, n }                 => process::op_DXYN(&self.memory, &mut self.register, &mut self.display, self.index_register, x, y, n)?,
            Instruction::SkipIfKey { x }                  => process::op_EX9E(&self.register, &self.keypad, &mut self.pc, x),
            Instruction::SkipIfNotKey { x }               => process::op_EXA1(&self.register, &self.keypad, &mut self.pc, x),
            Instruction::ReadDelay { x }                  => process::op_FX07(&mut self.register, x, &self.timers),
            Instruction::WaitKey { x }                    => process::op_FX0A(&mut self.register, &mut self.pc, &self.keypad, x),
            Instruction::SetDelay { x }                   => process::op_FX15(&self.register, x, &mut self.timers),
            Instruction::SetSound { x }                   => process::op_FX18(&self.register, x, &mut self.timers),
            Instruction::AddIndex { x }                   => process::op_FX1E(&self.register, x, &mut self.index_register),
            Instruction::FontChar { x }                   => process::op_FX29(&self.register, &mut self.index_register, x),
            Instruction::StoreBcd { x }                   => process::op_FX33(&self.register, &mut self.memory, x, self.index_register)?,
            Instruction::StoreRegisters { x }             => process::op_FX55(&self.register, &mut self.memory, self.index_register, x)?,
            Instruction::LoadRegisters { x }              => process::op_FX65(&mut self.register, &self.memory, self.index_register, x)?,
            Instruction::Unknown(op_code)                 => trace!("skipping unknown opcode {:#06x}", op_code),
        }

        Ok(())
    }

    pub fn keypad(&self) -> &KeyPad {
        &self.keypad
    }

    pub fn keypad_mut(&mut self) -> &mut KeyPad {
        &mut self.keypad
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn pc(&self) -> u16 {
        self.pc.inner()
    }

    pub fn index_register(&self) -> u16 {
        self.index_register
    }

    pub fn register(&self, x: u8) -> u8 {
        self.register.get(x)
    }

    pub fn delay_timer(&self) -> u8 {
        self.timers.delay
    }

    pub fn sound_timer(&self) -> u8 {
        self.timers.sound
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn read_memory(&self, address: u16) -> Result<u8, RamError> {
        self.memory.get(address)
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
