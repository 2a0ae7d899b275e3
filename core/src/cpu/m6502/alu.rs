use super::{M6502, StatusFlag};

impl M6502 {
    // ---- Flag helpers ----

    /// Set N, Z flags from result (for loads, transfers, logical ops).
    #[inline]
    pub(crate) fn set_nz(&mut self, result: u8) {
        self.set_flag(StatusFlag::N, result & 0x80 != 0);
        self.set_flag(StatusFlag::Z, result == 0);
    }

    #[inline]
    fn carry_in(&self) -> u8 {
        self.p & (StatusFlag::C as u8)
    }

    // ---- Arithmetic ----

    /// ADC (Add with Carry). Sets N, Z, C, V. Handles BCD mode.
    /// BCD: N,V from the intermediate sum; Z from the binary sum (NMOS quirk).
    pub(crate) fn perform_adc(&mut self, operand: u8) {
        let a = self.a;
        let c = self.carry_in();

        if self.flag(StatusFlag::D) {
            let mut al = (a & 0x0F) as u16 + (operand & 0x0F) as u16 + c as u16;
            if al >= 0x0A {
                al = ((al + 0x06) & 0x0F) + 0x10;
            }
            let mut sum = (a as u16 & 0xF0) + (operand as u16 & 0xF0) + al;

            self.set_flag(StatusFlag::N, sum & 0x80 != 0);
            self.set_flag(
                StatusFlag::V,
                (!(a as u16 ^ operand as u16) & (a as u16 ^ sum)) & 0x80 != 0,
            );

            if sum >= 0xA0 {
                sum += 0x60;
            }
            self.set_flag(StatusFlag::C, sum >= 0x100);

            let binary = a as u16 + operand as u16 + c as u16;
            self.set_flag(StatusFlag::Z, binary & 0xFF == 0);

            self.a = sum as u8;
        } else {
            let sum = a as u16 + operand as u16 + c as u16;
            let result = sum as u8;
            self.set_flag(StatusFlag::C, sum > 0xFF);
            self.set_flag(StatusFlag::V, (!(a ^ operand) & (a ^ result)) & 0x80 != 0);
            self.a = result;
            self.set_nz(result);
        }
    }

    /// SBC (Subtract with Borrow). All flags come from the binary result,
    /// even in BCD mode; only A receives the decimal correction.
    pub(crate) fn perform_sbc(&mut self, operand: u8) {
        let a = self.a;
        let c = self.carry_in();

        let diff = a as u16 + (operand ^ 0xFF) as u16 + c as u16;
        let result = diff as u8;

        self.set_flag(StatusFlag::C, diff > 0xFF);
        self.set_flag(StatusFlag::V, ((a ^ operand) & (a ^ result)) & 0x80 != 0);
        self.set_nz(result);

        if self.flag(StatusFlag::D) {
            let borrow = 1 - c as i16;
            let mut lo = (a & 0x0F) as i16 - (operand & 0x0F) as i16 - borrow;
            let lo_borrow = lo < 0;
            if lo_borrow {
                lo -= 6;
            }
            let mut hi = (a >> 4) as i16 - (operand >> 4) as i16 - lo_borrow as i16;
            if hi < 0 {
                hi -= 6;
            }
            self.a = ((hi as u8 & 0x0F) << 4) | (lo as u8 & 0x0F);
        } else {
            self.a = result;
        }
    }

    /// CMP/CPX/CPY. Sets N, Z, C; no register changes.
    pub(crate) fn perform_compare(&mut self, register: u8, operand: u8) {
        self.set_flag(StatusFlag::C, register >= operand);
        self.set_nz(register.wrapping_sub(operand));
    }

    /// BIT. N = M bit 7, V = M bit 6, Z = (A & M) == 0.
    pub(crate) fn perform_bit(&mut self, operand: u8) {
        self.set_flag(StatusFlag::N, operand & 0x80 != 0);
        self.set_flag(StatusFlag::V, operand & 0x40 != 0);
        self.set_flag(StatusFlag::Z, self.a & operand == 0);
    }

    // ---- Shifts (return the new value; N, Z, C updated) ----

    pub(crate) fn perform_asl(&mut self, value: u8) -> u8 {
        let result = value << 1;
        self.set_flag(StatusFlag::C, value & 0x80 != 0);
        self.set_nz(result);
        result
    }

    pub(crate) fn perform_lsr(&mut self, value: u8) -> u8 {
        let result = value >> 1;
        self.set_flag(StatusFlag::C, value & 0x01 != 0);
        self.set_nz(result);
        result
    }

    pub(crate) fn perform_rol(&mut self, value: u8) -> u8 {
        let result = (value << 1) | self.carry_in();
        self.set_flag(StatusFlag::C, value & 0x80 != 0);
        self.set_nz(result);
        result
    }

    pub(crate) fn perform_ror(&mut self, value: u8) -> u8 {
        let result = (value >> 1) | (self.carry_in() << 7);
        self.set_flag(StatusFlag::C, value & 0x01 != 0);
        self.set_nz(result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_with(a: u8, p: u8) -> M6502 {
        let mut cpu = M6502::new();
        cpu.a = a;
        cpu.p = p | StatusFlag::U as u8;
        cpu
    }

    #[test]
    fn adc_binary_overflow() {
        let mut cpu = cpu_with(0x7F, 0);
        cpu.perform_adc(0x01);
        assert_eq!(cpu.a, 0x80);
        assert!(cpu.flag(StatusFlag::V));
        assert!(cpu.flag(StatusFlag::N));
        assert!(!cpu.flag(StatusFlag::C));
    }

    #[test]
    fn adc_decimal_carries_into_next_digit() {
        let mut cpu = cpu_with(0x09, StatusFlag::D as u8);
        cpu.perform_adc(0x01);
        assert_eq!(cpu.a, 0x10);
        assert!(!cpu.flag(StatusFlag::C));

        let mut cpu = cpu_with(0x99, StatusFlag::D as u8);
        cpu.perform_adc(0x01);
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.flag(StatusFlag::C));
    }

    #[test]
    fn sbc_decimal_borrows() {
        let mut cpu = cpu_with(0x10, StatusFlag::D as u8 | StatusFlag::C as u8);
        cpu.perform_sbc(0x01);
        assert_eq!(cpu.a, 0x09);
        assert!(cpu.flag(StatusFlag::C));
    }

    #[test]
    fn rotate_through_carry() {
        let mut cpu = cpu_with(0, StatusFlag::C as u8);
        assert_eq!(cpu.perform_rol(0x80), 0x01);
        assert!(cpu.flag(StatusFlag::C));
        assert_eq!(cpu.perform_ror(0x00), 0x80);
        assert!(!cpu.flag(StatusFlag::C));
    }
}
