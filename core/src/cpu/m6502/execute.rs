use super::decode::{Instruction, Mode, Op};
use super::{M6502, StatusFlag};
use crate::core::{Bus, BusMaster};

/// Where an instruction's operand lives once the addressing mode is resolved.
enum Operand {
    None,
    Accumulator,
    Memory { addr: u16, page_crossed: bool },
    Branch(i8),
}

#[inline]
fn crosses_page(base: u16, addr: u16) -> bool {
    base & 0xFF00 != addr & 0xFF00
}

impl M6502 {
    fn resolve<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        mode: Mode,
    ) -> Operand {
        let at = |addr: u16| Operand::Memory {
            addr,
            page_crossed: false,
        };
        match mode {
            Mode::Implied => Operand::None,
            Mode::Accumulator => Operand::Accumulator,
            Mode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                at(addr)
            }
            Mode::ZeroPage => at(self.fetch(bus, master) as u16),
            Mode::ZeroPageX => at(self.fetch(bus, master).wrapping_add(self.x) as u16),
            Mode::ZeroPageY => at(self.fetch(bus, master).wrapping_add(self.y) as u16),
            Mode::Absolute => at(self.fetch_word(bus, master)),
            Mode::AbsoluteX | Mode::AbsoluteY => {
                let index = if mode == Mode::AbsoluteX { self.x } else { self.y };
                let base = self.fetch_word(bus, master);
                let addr = base.wrapping_add(index as u16);
                Operand::Memory {
                    addr,
                    page_crossed: crosses_page(base, addr),
                }
            }
            Mode::Indirect => {
                // The high byte is fetched without carrying into the pointer's
                // page: JMP ($10FF) reads $10FF and $1000.
                let ptr = self.fetch_word(bus, master);
                let lo = bus.read(master, ptr) as u16;
                let hi = bus.read(master, (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)) as u16;
                at((hi << 8) | lo)
            }
            Mode::IndirectX => {
                let zp = self.fetch(bus, master).wrapping_add(self.x);
                at(self.read_zp_word(bus, master, zp))
            }
            Mode::IndirectY => {
                let zp = self.fetch(bus, master);
                let base = self.read_zp_word(bus, master, zp);
                let addr = base.wrapping_add(self.y as u16);
                Operand::Memory {
                    addr,
                    page_crossed: crosses_page(base, addr),
                }
            }
            Mode::Relative => Operand::Branch(self.fetch(bus, master) as i8),
        }
    }

    fn read_zp_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        zp: u8,
    ) -> u16 {
        let lo = bus.read(master, zp as u16) as u16;
        let hi = bus.read(master, zp.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }

    /// Execute a decoded instruction whose opcode byte has already been
    /// fetched. Returns the cycles taken including page and branch penalties.
    pub(crate) fn execute<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        instruction: Instruction,
    ) -> u32 {
        let mut cycles = instruction.cycles as u32;
        let operand = self.resolve(bus, master, instruction.mode);

        let addr = match operand {
            Operand::Memory { addr, page_crossed } => {
                if page_crossed && instruction.op.has_page_penalty() {
                    cycles += 1;
                }
                addr
            }
            Operand::Branch(offset) => {
                if self.branch_taken(instruction.op) {
                    let target = self.pc.wrapping_add(offset as i16 as u16);
                    cycles += if crosses_page(self.pc, target) { 2 } else { 1 };
                    self.pc = target;
                }
                return cycles;
            }
            Operand::Accumulator => {
                self.a = match instruction.op {
                    Op::Asl => self.perform_asl(self.a),
                    Op::Lsr => self.perform_lsr(self.a),
                    Op::Rol => self.perform_rol(self.a),
                    Op::Ror => self.perform_ror(self.a),
                    _ => self.a,
                };
                return cycles;
            }
            Operand::None => {
                self.execute_implied(bus, master, instruction.op);
                return cycles;
            }
        };

        match instruction.op {
            // ---- Loads / stores ----
            Op::Lda => {
                self.a = bus.read(master, addr);
                self.set_nz(self.a);
            }
            Op::Ldx => {
                self.x = bus.read(master, addr);
                self.set_nz(self.x);
            }
            Op::Ldy => {
                self.y = bus.read(master, addr);
                self.set_nz(self.y);
            }
            Op::Sta => bus.write(master, addr, self.a),
            Op::Stx => bus.write(master, addr, self.x),
            Op::Sty => bus.write(master, addr, self.y),

            // ---- ALU ----
            Op::Adc => {
                let m = bus.read(master, addr);
                self.perform_adc(m);
            }
            Op::Sbc => {
                let m = bus.read(master, addr);
                self.perform_sbc(m);
            }
            Op::And => {
                self.a &= bus.read(master, addr);
                self.set_nz(self.a);
            }
            Op::Ora => {
                self.a |= bus.read(master, addr);
                self.set_nz(self.a);
            }
            Op::Eor => {
                self.a ^= bus.read(master, addr);
                self.set_nz(self.a);
            }
            Op::Cmp => {
                let m = bus.read(master, addr);
                self.perform_compare(self.a, m);
            }
            Op::Cpx => {
                let m = bus.read(master, addr);
                self.perform_compare(self.x, m);
            }
            Op::Cpy => {
                let m = bus.read(master, addr);
                self.perform_compare(self.y, m);
            }
            Op::Bit => {
                let m = bus.read(master, addr);
                self.perform_bit(m);
            }

            // ---- Read-modify-write ----
            Op::Asl | Op::Lsr | Op::Rol | Op::Ror | Op::Inc | Op::Dec => {
                let value = bus.read(master, addr);
                let result = match instruction.op {
                    Op::Asl => self.perform_asl(value),
                    Op::Lsr => self.perform_lsr(value),
                    Op::Rol => self.perform_rol(value),
                    Op::Ror => self.perform_ror(value),
                    Op::Inc => {
                        let r = value.wrapping_add(1);
                        self.set_nz(r);
                        r
                    }
                    _ => {
                        let r = value.wrapping_sub(1);
                        self.set_nz(r);
                        r
                    }
                };
                bus.write(master, addr, result);
            }

            // ---- Jumps ----
            Op::Jmp => self.pc = addr,
            Op::Jsr => {
                let ret = self.pc.wrapping_sub(1);
                self.push(bus, master, (ret >> 8) as u8);
                self.push(bus, master, ret as u8);
                self.pc = addr;
            }

            _ => {}
        }
        cycles
    }

    fn branch_taken(&self, op: Op) -> bool {
        match op {
            Op::Bcc => !self.flag(StatusFlag::C),
            Op::Bcs => self.flag(StatusFlag::C),
            Op::Bne => !self.flag(StatusFlag::Z),
            Op::Beq => self.flag(StatusFlag::Z),
            Op::Bpl => !self.flag(StatusFlag::N),
            Op::Bmi => self.flag(StatusFlag::N),
            Op::Bvc => !self.flag(StatusFlag::V),
            Op::Bvs => self.flag(StatusFlag::V),
            _ => false,
        }
    }

    fn execute_implied<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        op: Op,
    ) {
        match op {
            // ---- Transfers ----
            Op::Tax => {
                self.x = self.a;
                self.set_nz(self.x);
            }
            Op::Tay => {
                self.y = self.a;
                self.set_nz(self.y);
            }
            Op::Txa => {
                self.a = self.x;
                self.set_nz(self.a);
            }
            Op::Tya => {
                self.a = self.y;
                self.set_nz(self.a);
            }
            Op::Tsx => {
                self.x = self.sp;
                self.set_nz(self.x);
            }
            Op::Txs => self.sp = self.x,

            // ---- Register increments ----
            Op::Inx => {
                self.x = self.x.wrapping_add(1);
                self.set_nz(self.x);
            }
            Op::Iny => {
                self.y = self.y.wrapping_add(1);
                self.set_nz(self.y);
            }
            Op::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.set_nz(self.x);
            }
            Op::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.set_nz(self.y);
            }

            // ---- Flags ----
            Op::Clc => self.set_flag(StatusFlag::C, false),
            Op::Sec => self.set_flag(StatusFlag::C, true),
            Op::Cli => self.set_flag(StatusFlag::I, false),
            Op::Sei => self.set_flag(StatusFlag::I, true),
            Op::Cld => self.set_flag(StatusFlag::D, false),
            Op::Sed => self.set_flag(StatusFlag::D, true),
            Op::Clv => self.set_flag(StatusFlag::V, false),

            // ---- Stack ----
            Op::Pha => self.push(bus, master, self.a),
            Op::Php => {
                let p = self.p | StatusFlag::B as u8 | StatusFlag::U as u8;
                self.push(bus, master, p);
            }
            Op::Pla => {
                self.a = self.pull(bus, master);
                self.set_nz(self.a);
            }
            Op::Plp => self.pull_status(bus, master),

            // ---- Control flow ----
            Op::Rts => {
                let lo = self.pull(bus, master) as u16;
                let hi = self.pull(bus, master) as u16;
                self.pc = ((hi << 8) | lo).wrapping_add(1);
            }
            Op::Rti => {
                self.pull_status(bus, master);
                let lo = self.pull(bus, master) as u16;
                let hi = self.pull(bus, master) as u16;
                self.pc = (hi << 8) | lo;
            }
            Op::Brk => {
                // BRK skips a padding byte.
                let ret = self.pc.wrapping_add(1);
                self.push(bus, master, (ret >> 8) as u8);
                self.push(bus, master, ret as u8);
                let p = self.p | StatusFlag::B as u8 | StatusFlag::U as u8;
                self.push(bus, master, p);
                self.set_flag(StatusFlag::I, true);
                let lo = bus.read(master, 0xFFFE) as u16;
                let hi = bus.read(master, 0xFFFF) as u16;
                self.pc = (hi << 8) | lo;
            }
            _ => {}
        }
    }

    fn pull_status<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        let p = self.pull(bus, master);
        self.p = (p & !(StatusFlag::B as u8)) | StatusFlag::U as u8;
    }
}
