use ale_core::core::BusMaster;
use ale_core::cpu::m6502::{M6502, StatusFlag};
mod common;
use common::TestBus;

/// Helper: run `n` instructions, returning the total cycle count.
fn run(cpu: &mut M6502, bus: &mut TestBus, n: usize) -> u32 {
    (0..n).map(|_| cpu.step(bus, BusMaster::Cpu(0))).sum()
}

fn flag(cpu: &M6502, f: StatusFlag) -> bool {
    cpu.p & (f as u8) != 0
}

// =============================================================================
// ADC / SBC
// =============================================================================

#[test]
fn test_adc_immediate_with_carry_in() {
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x38, 0xA9, 0x02, 0x69, 0x03]); // SEC; LDA #$02; ADC #$03
    assert_eq!(run(&mut cpu, &mut bus, 3), 6);
    assert_eq!(cpu.a, 0x06);
    assert!(!flag(&cpu, StatusFlag::C));
}

#[test]
fn test_adc_decimal_score_counter() {
    // SED; CLC; LDA #$98; ADC #$03 → $01 with carry (98 + 3 = 101)
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xF8, 0x18, 0xA9, 0x98, 0x69, 0x03]);
    run(&mut cpu, &mut bus, 4);
    assert_eq!(cpu.a, 0x01);
    assert!(flag(&cpu, StatusFlag::C));
}

#[test]
fn test_sbc_binary_borrow() {
    // SEC; LDA #$00; SBC #$01 → $FF, borrow (C clear), N set
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x38, 0xA9, 0x00, 0xE9, 0x01]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.a, 0xFF);
    assert!(!flag(&cpu, StatusFlag::C));
    assert!(flag(&cpu, StatusFlag::N));
}

// =============================================================================
// Logic / compare / BIT
// =============================================================================

#[test]
fn test_logic_ops_set_nz() {
    // LDA #$F0; AND #$0F → 0 (Z); ORA #$81 → $81 (N); EOR #$FF → $7E
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xA9, 0xF0, 0x29, 0x0F]);
    run(&mut cpu, &mut bus, 2);
    assert!(flag(&cpu, StatusFlag::Z));

    bus.load(4, &[0x09, 0x81, 0x49, 0xFF]);
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.a, 0x81);
    assert!(flag(&cpu, StatusFlag::N));
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.a, 0x7E);
    assert!(!flag(&cpu, StatusFlag::N));
}

#[test]
fn test_cmp_sets_carry_when_greater_or_equal() {
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xA2, 0x10, 0xE0, 0x10, 0xE0, 0x11]); // LDX #$10; CPX #$10; CPX #$11
    run(&mut cpu, &mut bus, 2);
    assert!(flag(&cpu, StatusFlag::C));
    assert!(flag(&cpu, StatusFlag::Z));
    run(&mut cpu, &mut bus, 1);
    assert!(!flag(&cpu, StatusFlag::C));
    assert!(flag(&cpu, StatusFlag::N));
}

#[test]
fn test_bit_copies_high_bits() {
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    bus.memory[0x40] = 0xC0;
    bus.load(0, &[0xA9, 0x01, 0x24, 0x40]); // LDA #$01; BIT $40
    assert_eq!(run(&mut cpu, &mut bus, 2), 5);
    assert!(flag(&cpu, StatusFlag::N));
    assert!(flag(&cpu, StatusFlag::V));
    assert!(flag(&cpu, StatusFlag::Z));
}

// =============================================================================
// Read-modify-write
// =============================================================================

#[test]
fn test_inc_dec_memory() {
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    bus.memory[0x80] = 0xFF;
    bus.load(0, &[0xE6, 0x80, 0xC6, 0x81]); // INC $80; DEC $81
    assert_eq!(run(&mut cpu, &mut bus, 2), 10);
    assert_eq!(bus.memory[0x80], 0x00);
    assert_eq!(bus.memory[0x81], 0xFF);
    assert!(flag(&cpu, StatusFlag::N));
}

#[test]
fn test_asl_accumulator_and_memory() {
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    bus.memory[0x90] = 0x41;
    bus.load(0, &[0xA9, 0x81, 0x0A, 0x06, 0x90]); // LDA #$81; ASL A; ASL $90
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.a, 0x02);
    assert!(flag(&cpu, StatusFlag::C));
    run(&mut cpu, &mut bus, 1);
    assert_eq!(bus.memory[0x90], 0x82);
    assert!(!flag(&cpu, StatusFlag::C));
}

#[test]
fn test_indexed_store_wraps_in_zero_page() {
    // LDX #$7F; LDA #$AA; STA $81,X → $00 (zero page wrap)
    let mut cpu = M6502::new();
    let mut bus = TestBus::new();
    bus.load(0x200, &[0xA2, 0x7F, 0xA9, 0xAA, 0x95, 0x81]);
    cpu.pc = 0x200;
    run(&mut cpu, &mut bus, 3);
    assert_eq!(bus.memory[0x00], 0xAA);
    assert_eq!(bus.memory[0x100], 0x00);
}
