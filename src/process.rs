#![allow(non_snake_case)]
use thiserror::Error;

use crate::{
    constants,
    display::Display,
    input::KeyPad,
    mem::{
        AddressStack,
        ProgramCounter,
        Ram,
        RamError,
        Register,
        StackError,
    },
    rng::RandomSource,
    timers::Timers,
};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("call stack fault: {source}")]
    Stack {
        #[from]
        source: StackError,
    },

    #[error("invalid memory address {source}")]
    AddressOutOfBounds {
        #[from]
        source: RamError,
    },
}

pub fn op_00E0(display: &mut Display) {
    display.clear();
}

pub fn op_00EE(pc: &mut ProgramCounter, stack: &mut AddressStack) -> Result<(), ProcessingError> {
    pc.jump(stack.pop()?);
    Ok(())
}

pub fn op_1NNN(pc: &mut ProgramCounter, nnn: u16) {
    pc.jump(nnn);
}

pub fn op_2NNN(stack: &mut AddressStack, pc: &mut ProgramCounter, nnn: u16) -> Result<(), ProcessingError> {
    stack.push(pc.inner())?;
    pc.jump(nnn);
    Ok(())
}

pub fn op_3XNN(register: &Register, x: u8, nn: u8, pc: &mut ProgramCounter) {
    if register.get(x) == nn {
        pc.increment();
    }
}

pub fn op_4XNN(register: &Register, x: u8, nn: u8, pc: &mut ProgramCounter) {
    if register.get(x) != nn {
        pc.increment();
    }
}

pub fn op_5XY0(register: &Register, x: u8, y: u8, pc: &mut ProgramCounter) {
    if register.cmp_registers(x, y) {
        pc.increment();
    }
}

pub fn op_6XNN(register: &mut Register, x: u8, nn: u8) {
    register.set(x, nn);
}

pub fn op_7XNN(register: &mut Register, x: u8, nn: u8) {
    register.set(x, register.get(x).wrapping_add(nn));
}

pub fn op_8XY0(register: &mut Register, x: u8, y: u8) {
    register.set(x, register.get(y));
}

pub fn op_8XY1(register: &mut Register, x: u8, y: u8) {
    *register.get_mut(x) |= register.get(y);
}

pub fn op_8XY2(register: &mut Register, x: u8, y: u8) {
    *register.get_mut(x) &= register.get(y);
}

pub fn op_8XY3(register: &mut Register, x: u8, y: u8) {
    *register.get_mut(x) ^= register.get(y);
}

pub fn op_8XY4(register: &mut Register, x: u8, y: u8) {
    let (val, carry) = register.get(x).overflowing_add(register.get(y));
    register.set_with_flag(x, val, carry);
}

pub fn op_8XY5(register: &mut Register, x: u8, y: u8) {
    let (vx, vy) = (register.get(x), register.get(y));
    register.set_with_flag(x, vx.wrapping_sub(vy), vx >= vy);
}

pub fn op_8XY6(register: &mut Register, x: u8) {
    let vx = register.get(x);
    register.set_with_flag(x, vx >> 1, vx & 1 == 1);
}

pub fn op_8XY7(register: &mut Register, x: u8, y: u8) {
    let (vx, vy) = (register.get(x), register.get(y));
    register.set_with_flag(x, vy.wrapping_sub(vx), vy >= vx);
}

pub fn op_8XYE(register: &mut Register, x: u8) {
    let vx = register.get(x);
    register.set_with_flag(x, vx << 1, (vx >> 7) & 1 == 1);
}

pub fn op_9XY0(register: &Register, x: u8, y: u8, pc: &mut ProgramCounter) {
    if !register.cmp_registers(x, y) {
        pc.increment();
    }
}

pub fn op_ANNN(index_register: &mut u16, nnn: u16) {
    *index_register = nnn;
}

pub fn op_BNNN(register: &Register, pc: &mut ProgramCounter, nnn: u16) {
    pc.jump(nnn + register.get(0) as u16);
}

pub fn op_CXNN(register: &mut Register, rng: &mut dyn RandomSource, x: u8, nn: u8) {
    register.set(x, rng.random_byte() & nn);
}

/// Draws `n` rows of the sprite at I. Rows below the screen end the draw,
/// columns past the right edge are skipped one pixel at a time.
pub fn op_DXYN(
    memory: &Ram,
    register: &mut Register,
    display: &mut Display,
    index_register: u16,
    x: u8,
    y: u8,
    n: u8,
) -> Result<(), ProcessingError> {
    let start_x = register.get(x) as usize;
    let start_y = register.get(y) as usize;
    register.set(Register::FLAG, 0);

    let mut collision = false;
    for row in 0..n as usize {
        let screen_y = start_y + row;
        if screen_y >= Display::HEIGHT {
            break;
        }

        let sprite = memory.get(index_register as usize + row)?;
        for bit in 0..8 {
            let screen_x = start_x + bit;
            if screen_x >= Display::WIDTH {
                continue;
            }
            if (sprite >> (7 - bit)) & 1 == 0 {
                continue;
            }
            collision |= display.flip(screen_x, screen_y);
        }
    }

    register.set(Register::FLAG, collision as u8);
    Ok(())
}

pub fn op_EX9E(register: &Register, keypad: &KeyPad, pc: &mut ProgramCounter, x: u8) {
    if keypad.is_key_pressed(register.get(x)) {
        pc.increment();
    }
}

pub fn op_EXA1(register: &Register, keypad: &KeyPad, pc: &mut ProgramCounter, x: u8) {
    if !keypad.is_key_pressed(register.get(x)) {
        pc.increment();
    }
}

pub fn op_FX07(register: &mut Register, x: u8, timers: &Timers) {
    register.set(x, timers.delay);
}

/// Re-executes itself by rewinding the pc until a key is held.
pub fn op_FX0A(register: &mut Register, pc: &mut ProgramCounter, keypad: &KeyPad, x: u8) {
    match keypad.first_pressed() {
        Some(key) => register.set(x, key),
        None => pc.decrement(),
    }
}

pub fn op_FX15(register: &Register, x: u8, timers: &mut Timers) {
    timers.delay = register.get(x);
}

pub fn op_FX18(register: &Register, x: u8, timers: &mut Timers) {
    timers.sound = register.get(x);
}

/// No masking to 12 bits. Out of range values fault on the next access through I.
pub fn op_FX1E(register: &Register, x: u8, index_register: &mut u16) {
    *index_register = index_register.wrapping_add(register.get(x) as u16);
}

pub fn op_FX29(register: &Register, index_register: &mut u16, x: u8) {
    let font_char = register.get(x) as u16;
    *index_register = constants::FONT_OFFSET as u16 + font_char * constants::FONT_GLYPH_SIZE as u16;
}

pub fn op_FX33(register: &Register, memory: &mut Ram, x: u8, index_register: u16) -> Result<(), ProcessingError> {
    let mut val = register.get(x);

    for i in (0..3).rev() {
        *memory.get_mut(index_register as usize + i)? = val % 10;
        val /= 10;
    }

    Ok(())
}

pub fn op_FX55(register: &Register, memory: &mut Ram, index_register: u16, x: u8) -> Result<(), ProcessingError> {
    for i in 0..=x {
        *memory.get_mut(index_register as usize + i as usize)? = register.get(i);
    }
    Ok(())
}

pub fn op_FX65(register: &mut Register, memory: &Ram, index_register: u16, x: u8) -> Result<(), ProcessingError> {
    for i in 0..=x {
        register.set(i, memory.get(index_register as usize + i as usize)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_with_carry_into_vf() {
        let mut register = Register::new();
        register.set(0xF, 0xFF);
        register.set(0x1, 0x02);
        op_8XY4(&mut register, 0xF, 0x1);
        assert_eq!(register.get(0xF), 1);
    }

    #[test]
    fn sub_without_borrow_sets_flag() {
        let mut register = Register::new();
        register.set(0x0, 5);
        register.set(0x1, 5);
        op_8XY5(&mut register, 0x0, 0x1);
        assert_eq!(register.get(0x0), 0);
        assert_eq!(register.get(0xF), 1);

        op_8XY5(&mut register, 0x0, 0x1);
        assert_eq!(register.get(0x0), 0xFB);
        assert_eq!(register.get(0xF), 0);
    }

    #[test]
    fn reversed_sub() {
        let mut register = Register::new();
        register.set(0x2, 3);
        register.set(0x3, 10);
        op_8XY7(&mut register, 0x2, 0x3);
        assert_eq!(register.get(0x2), 7);
        assert_eq!(register.get(0xF), 1);
    }

    #[test]
    fn copy_and_bitwise_ops() {
        let mut register = Register::new();
        register.set(0x1, 0x0C);
        register.set(0x2, 0x0A);
        register.set(0xF, 0x55);

        op_8XY1(&mut register, 0x1, 0x2);
        assert_eq!(register.get(0x1), 0x0E);
        op_8XY2(&mut register, 0x1, 0x2);
        assert_eq!(register.get(0x1), 0x0A);
        op_8XY3(&mut register, 0x1, 0x2);
        assert_eq!(register.get(0x1), 0x00);

        register.set(0x3, 0x99);
        op_8XY0(&mut register, 0x1, 0x3);
        assert_eq!(register.get(0x1), 0x99);
        assert_eq!(register.get(0x3), 0x99);

        // no flag effect
        assert_eq!(register.get(0xF), 0x55);
    }

    #[test]
    fn reversed_sub_with_borrow() {
        let mut register = Register::new();
        register.set(0x2, 10);
        register.set(0x3, 3);
        op_8XY7(&mut register, 0x2, 0x3);
        assert_eq!(register.get(0x2), 0xF9);
        assert_eq!(register.get(0xF), 0);

        register.set(0xF, 0x20);
        register.set(0x4, 0x10);
        op_8XY7(&mut register, 0xF, 0x4);
        assert_eq!(register.get(0xF), 0);
    }

    #[test]
    fn shifts_of_vf_keep_the_flag() {
        let mut register = Register::new();
        register.set(0xF, 0b0000_0011);
        op_8XY6(&mut register, 0xF);
        assert_eq!(register.get(0xF), 1);

        register.set(0xF, 0b0100_0000);
        op_8XYE(&mut register, 0xF);
        assert_eq!(register.get(0xF), 0);

        register.set(0xF, 0b1000_0000);
        op_8XYE(&mut register, 0xF);
        assert_eq!(register.get(0xF), 1);
    }

    #[test]
    fn shifts_report_dropped_bit() {
        let mut register = Register::new();
        register.set(0x4, 0b1000_0001);
        op_8XY6(&mut register, 0x4);
        assert_eq!(register.get(0x4), 0b0100_0000);
        assert_eq!(register.get(0xF), 1);

        register.set(0x4, 0b1000_0001);
        op_8XYE(&mut register, 0x4);
        assert_eq!(register.get(0x4), 0b0000_0010);
        assert_eq!(register.get(0xF), 1);

        op_8XYE(&mut register, 0x4);
        assert_eq!(register.get(0xF), 0);
    }

    #[test]
    fn bcd_digits() {
        let mut register = Register::new();
        let mut memory = Ram::new();
        register.set(0x7, 254);
        op_FX33(&register, &mut memory, 0x7, 0x300).unwrap();
        assert_eq!(memory.get(0x300usize).unwrap(), 2);
        assert_eq!(memory.get(0x301usize).unwrap(), 5);
        assert_eq!(memory.get(0x302usize).unwrap(), 4);
    }

    #[test]
    fn bcd_past_end_faults() {
        let register = Register::new();
        let mut memory = Ram::new();
        assert_eq!(
            op_FX33(&register, &mut memory, 0x0, 0xFFE),
            Err(ProcessingError::AddressOutOfBounds {
                source: RamError::InvalidAddress(0x1000)
            })
        );
    }

    #[test]
    fn font_char_address() {
        let mut register = Register::new();
        let mut index = 0;
        register.set(0x1, 0xA);
        op_FX29(&register, &mut index, 0x1);
        assert_eq!(index, 0x50 + 0xA * 5);
    }

    #[test]
    fn sprite_clips_right_edge_per_pixel() {
        let mut memory = Ram::new();
        let mut register = Register::new();
        let mut display = Display::new();
        memory.load_program(&[0xFF]).unwrap();
        register.set(0x0, 60);
        register.set(0x1, 0);

        op_DXYN(&memory, &mut register, &mut display, 0x200, 0x0, 0x1, 1).unwrap();

        assert_eq!(display.lit_count(), 4);
        assert!(display.pixel(63, 0));
        assert!(!display.pixel(0, 1));
    }

    #[test]
    fn sprite_stops_at_bottom_edge() {
        let mut memory = Ram::new();
        let mut register = Register::new();
        let mut display = Display::new();
        memory.load_program(&[0x80, 0x80, 0x80, 0x80]).unwrap();
        register.set(0x1, 30);

        op_DXYN(&memory, &mut register, &mut display, 0x200, 0x0, 0x1, 4).unwrap();

        assert_eq!(display.lit_count(), 2);
        assert!(!display.pixel(0, 0));
    }

    #[test]
    fn clipped_rows_are_not_read() {
        let memory = Ram::new();
        let mut register = Register::new();
        let mut display = Display::new();
        register.set(0x1, 31);

        // only the first row is on screen, so the read at 0x1000 never happens
        assert!(op_DXYN(&memory, &mut register, &mut display, 0xFFF, 0x0, 0x1, 2).is_ok());
    }
}
