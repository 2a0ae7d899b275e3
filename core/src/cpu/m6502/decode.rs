//! Opcode decoding for the documented NMOS 6502 instruction set.

/// Operand addressing modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

/// Instruction mnemonics.
#[rustfmt::skip]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

impl Op {
    /// Read instructions that take one extra cycle when an indexed address
    /// crosses a page boundary. Stores and read-modify-write ops always pay
    /// the worst case, which is already part of their base cycle count.
    pub fn has_page_penalty(self) -> bool {
        matches!(
            self,
            Op::Adc
                | Op::And
                | Op::Cmp
                | Op::Eor
                | Op::Lda
                | Op::Ldx
                | Op::Ldy
                | Op::Ora
                | Op::Sbc
        )
    }
}

/// A decoded opcode: operation, addressing mode and base cycle count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub mode: Mode,
    pub cycles: u8,
}

const fn ins(op: Op, mode: Mode, cycles: u8) -> Option<Instruction> {
    Some(Instruction { op, mode, cycles })
}

/// Decode an opcode byte. Returns `None` for undocumented opcodes.
pub fn decode(opcode: u8) -> Option<Instruction> {
    use Mode::*;
    use Op::*;

    match opcode {
        // ---- Loads / stores ----
        0xA9 => ins(Lda, Immediate, 2),
        0xA5 => ins(Lda, ZeroPage, 3),
        0xB5 => ins(Lda, ZeroPageX, 4),
        0xAD => ins(Lda, Absolute, 4),
        0xBD => ins(Lda, AbsoluteX, 4),
        0xB9 => ins(Lda, AbsoluteY, 4),
        0xA1 => ins(Lda, IndirectX, 6),
        0xB1 => ins(Lda, IndirectY, 5),

        0xA2 => ins(Ldx, Immediate, 2),
        0xA6 => ins(Ldx, ZeroPage, 3),
        0xB6 => ins(Ldx, ZeroPageY, 4),
        0xAE => ins(Ldx, Absolute, 4),
        0xBE => ins(Ldx, AbsoluteY, 4),

        0xA0 => ins(Ldy, Immediate, 2),
        0xA4 => ins(Ldy, ZeroPage, 3),
        0xB4 => ins(Ldy, ZeroPageX, 4),
        0xAC => ins(Ldy, Absolute, 4),
        0xBC => ins(Ldy, AbsoluteX, 4),

        0x85 => ins(Sta, ZeroPage, 3),
        0x95 => ins(Sta, ZeroPageX, 4),
        0x8D => ins(Sta, Absolute, 4),
        0x9D => ins(Sta, AbsoluteX, 5),
        0x99 => ins(Sta, AbsoluteY, 5),
        0x81 => ins(Sta, IndirectX, 6),
        0x91 => ins(Sta, IndirectY, 6),

        0x86 => ins(Stx, ZeroPage, 3),
        0x96 => ins(Stx, ZeroPageY, 4),
        0x8E => ins(Stx, Absolute, 4),

        0x84 => ins(Sty, ZeroPage, 3),
        0x94 => ins(Sty, ZeroPageX, 4),
        0x8C => ins(Sty, Absolute, 4),

        // ---- Transfers ----
        0xAA => ins(Tax, Implied, 2),
        0xA8 => ins(Tay, Implied, 2),
        0xBA => ins(Tsx, Implied, 2),
        0x8A => ins(Txa, Implied, 2),
        0x9A => ins(Txs, Implied, 2),
        0x98 => ins(Tya, Implied, 2),

        // ---- Stack ----
        0x48 => ins(Pha, Implied, 3),
        0x08 => ins(Php, Implied, 3),
        0x68 => ins(Pla, Implied, 4),
        0x28 => ins(Plp, Implied, 4),

        // ---- Arithmetic / logic ----
        0x69 => ins(Adc, Immediate, 2),
        0x65 => ins(Adc, ZeroPage, 3),
        0x75 => ins(Adc, ZeroPageX, 4),
        0x6D => ins(Adc, Absolute, 4),
        0x7D => ins(Adc, AbsoluteX, 4),
        0x79 => ins(Adc, AbsoluteY, 4),
        0x61 => ins(Adc, IndirectX, 6),
        0x71 => ins(Adc, IndirectY, 5),

        0xE9 => ins(Sbc, Immediate, 2),
        0xE5 => ins(Sbc, ZeroPage, 3),
        0xF5 => ins(Sbc, ZeroPageX, 4),
        0xED => ins(Sbc, Absolute, 4),
        0xFD => ins(Sbc, AbsoluteX, 4),
        0xF9 => ins(Sbc, AbsoluteY, 4),
        0xE1 => ins(Sbc, IndirectX, 6),
        0xF1 => ins(Sbc, IndirectY, 5),

        0x29 => ins(And, Immediate, 2),
        0x25 => ins(And, ZeroPage, 3),
        0x35 => ins(And, ZeroPageX, 4),
        0x2D => ins(And, Absolute, 4),
        0x3D => ins(And, AbsoluteX, 4),
        0x39 => ins(And, AbsoluteY, 4),
        0x21 => ins(And, IndirectX, 6),
        0x31 => ins(And, IndirectY, 5),

        0x09 => ins(Ora, Immediate, 2),
        0x05 => ins(Ora, ZeroPage, 3),
        0x15 => ins(Ora, ZeroPageX, 4),
        0x0D => ins(Ora, Absolute, 4),
        0x1D => ins(Ora, AbsoluteX, 4),
        0x19 => ins(Ora, AbsoluteY, 4),
        0x01 => ins(Ora, IndirectX, 6),
        0x11 => ins(Ora, IndirectY, 5),

        0x49 => ins(Eor, Immediate, 2),
        0x45 => ins(Eor, ZeroPage, 3),
        0x55 => ins(Eor, ZeroPageX, 4),
        0x4D => ins(Eor, Absolute, 4),
        0x5D => ins(Eor, AbsoluteX, 4),
        0x59 => ins(Eor, AbsoluteY, 4),
        0x41 => ins(Eor, IndirectX, 6),
        0x51 => ins(Eor, IndirectY, 5),

        0xC9 => ins(Cmp, Immediate, 2),
        0xC5 => ins(Cmp, ZeroPage, 3),
        0xD5 => ins(Cmp, ZeroPageX, 4),
        0xCD => ins(Cmp, Absolute, 4),
        0xDD => ins(Cmp, AbsoluteX, 4),
        0xD9 => ins(Cmp, AbsoluteY, 4),
        0xC1 => ins(Cmp, IndirectX, 6),
        0xD1 => ins(Cmp, IndirectY, 5),

        0xE0 => ins(Cpx, Immediate, 2),
        0xE4 => ins(Cpx, ZeroPage, 3),
        0xEC => ins(Cpx, Absolute, 4),

        0xC0 => ins(Cpy, Immediate, 2),
        0xC4 => ins(Cpy, ZeroPage, 3),
        0xCC => ins(Cpy, Absolute, 4),

        0x24 => ins(Bit, ZeroPage, 3),
        0x2C => ins(Bit, Absolute, 4),

        // ---- Increment / decrement ----
        0xE6 => ins(Inc, ZeroPage, 5),
        0xF6 => ins(Inc, ZeroPageX, 6),
        0xEE => ins(Inc, Absolute, 6),
        0xFE => ins(Inc, AbsoluteX, 7),
        0xC6 => ins(Dec, ZeroPage, 5),
        0xD6 => ins(Dec, ZeroPageX, 6),
        0xCE => ins(Dec, Absolute, 6),
        0xDE => ins(Dec, AbsoluteX, 7),
        0xE8 => ins(Inx, Implied, 2),
        0xC8 => ins(Iny, Implied, 2),
        0xCA => ins(Dex, Implied, 2),
        0x88 => ins(Dey, Implied, 2),

        // ---- Shifts / rotates ----
        0x0A => ins(Asl, Accumulator, 2),
        0x06 => ins(Asl, ZeroPage, 5),
        0x16 => ins(Asl, ZeroPageX, 6),
        0x0E => ins(Asl, Absolute, 6),
        0x1E => ins(Asl, AbsoluteX, 7),

        0x4A => ins(Lsr, Accumulator, 2),
        0x46 => ins(Lsr, ZeroPage, 5),
        0x56 => ins(Lsr, ZeroPageX, 6),
        0x4E => ins(Lsr, Absolute, 6),
        0x5E => ins(Lsr, AbsoluteX, 7),

        0x2A => ins(Rol, Accumulator, 2),
        0x26 => ins(Rol, ZeroPage, 5),
        0x36 => ins(Rol, ZeroPageX, 6),
        0x2E => ins(Rol, Absolute, 6),
        0x3E => ins(Rol, AbsoluteX, 7),

        0x6A => ins(Ror, Accumulator, 2),
        0x66 => ins(Ror, ZeroPage, 5),
        0x76 => ins(Ror, ZeroPageX, 6),
        0x6E => ins(Ror, Absolute, 6),
        0x7E => ins(Ror, AbsoluteX, 7),

        // ---- Jumps / calls ----
        0x4C => ins(Jmp, Absolute, 3),
        0x6C => ins(Jmp, Indirect, 5),
        0x20 => ins(Jsr, Absolute, 6),
        0x60 => ins(Rts, Implied, 6),
        0x40 => ins(Rti, Implied, 6),
        0x00 => ins(Brk, Implied, 7),

        // ---- Branches (base 2, +1 taken, +1 page crossed) ----
        0x90 => ins(Bcc, Relative, 2),
        0xB0 => ins(Bcs, Relative, 2),
        0xF0 => ins(Beq, Relative, 2),
        0xD0 => ins(Bne, Relative, 2),
        0x30 => ins(Bmi, Relative, 2),
        0x10 => ins(Bpl, Relative, 2),
        0x50 => ins(Bvc, Relative, 2),
        0x70 => ins(Bvs, Relative, 2),

        // ---- Flags ----
        0x18 => ins(Clc, Implied, 2),
        0x38 => ins(Sec, Implied, 2),
        0x58 => ins(Cli, Implied, 2),
        0x78 => ins(Sei, Implied, 2),
        0xB8 => ins(Clv, Implied, 2),
        0xD8 => ins(Cld, Implied, 2),
        0xF8 => ins(Sed, Implied, 2),

        0xEA => ins(Nop, Implied, 2),

        _ => None,
    }
}
