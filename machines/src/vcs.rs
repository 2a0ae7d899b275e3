use ale_core::cpu::m6502::M6502;
use ale_core::cpu::state::M6502State;
use ale_core::device::riot::{Riot, RiotState};
use ale_core::device::tia::{self, Tia, TiaState};
use ale_core::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cartridge::Cartridge;

// ---------------------------------------------------------------------------
// Input button IDs
// ---------------------------------------------------------------------------
pub const INPUT_P0_UP: u8 = 0;
pub const INPUT_P0_DOWN: u8 = 1;
pub const INPUT_P0_LEFT: u8 = 2;
pub const INPUT_P0_RIGHT: u8 = 3;
pub const INPUT_P0_FIRE: u8 = 4;
pub const INPUT_P1_UP: u8 = 5;
pub const INPUT_P1_DOWN: u8 = 6;
pub const INPUT_P1_LEFT: u8 = 7;
pub const INPUT_P1_RIGHT: u8 = 8;
pub const INPUT_P1_FIRE: u8 = 9;
pub const INPUT_RESET: u8 = 10;
pub const INPUT_SELECT: u8 = 11;
/// Held = left difficulty switch in position A.
pub const INPUT_P0_DIFFICULTY_A: u8 = 12;
/// Held = right difficulty switch in position A.
pub const INPUT_P1_DIFFICULTY_A: u8 = 13;

const VCS_INPUT_MAP: &[InputButton] = &[
    InputButton { id: INPUT_P0_UP, name: "P0 Up" },
    InputButton { id: INPUT_P0_DOWN, name: "P0 Down" },
    InputButton { id: INPUT_P0_LEFT, name: "P0 Left" },
    InputButton { id: INPUT_P0_RIGHT, name: "P0 Right" },
    InputButton { id: INPUT_P0_FIRE, name: "P0 Fire" },
    InputButton { id: INPUT_P1_UP, name: "P1 Up" },
    InputButton { id: INPUT_P1_DOWN, name: "P1 Down" },
    InputButton { id: INPUT_P1_LEFT, name: "P1 Left" },
    InputButton { id: INPUT_P1_RIGHT, name: "P1 Right" },
    InputButton { id: INPUT_P1_FIRE, name: "P1 Fire" },
    InputButton { id: INPUT_RESET, name: "Reset" },
    InputButton { id: INPUT_SELECT, name: "Select" },
    InputButton { id: INPUT_P0_DIFFICULTY_A, name: "P0 Difficulty A" },
    InputButton { id: INPUT_P1_DIFFICULTY_A, name: "P1 Difficulty A" },
];

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
// CPU clock: 3.58 MHz / 3 ≈ 1.19 MHz
// 76 CPU cycles per scanline, 262 scanlines per NTSC frame
/// Frame budget in CPU cycles. A frame also ends early on a VSYNC write.
pub const CYCLES_PER_FRAME: u32 = 76 * 262;

/// SWCHB pins with no switch held: reset/select released, both
/// difficulties in position B, unused pins pulled high.
const SWCHB_IDLE: u8 = 0x3F;

/// Home video game console built around a 6507 (13-bit 6502).
///
/// Hardware: 6507 CPU, a television interface chip reduced to a rectangle
/// blitter (see [`Tia`]) and a 6532 RIOT for RAM, switches and timer.
/// Video: 160x210, one palette index per pixel.
///
/// Memory map (13-bit bus, mirrors everywhere):
///   A12=1               Cartridge ROM (2 KiB images mirrored twice)
///   A12=0 A7=0          TIA registers
///   A12=0 A7=1 A9=0     RIOT RAM, 128 bytes ($80-$FF, stack at $180-$1FF)
///   A12=0 A7=1 A9=1     RIOT I/O and timer ($280-$297)
pub struct VcsSystem {
    cpu: M6502,
    board: Board,
    frames: u64,
}

/// Everything on the bus except the CPU.
struct Board {
    rom: Vec<u8>,
    tia: Tia,
    riot: Riot,
}

/// Serialized form of the complete console.
#[derive(Serialize, Deserialize)]
struct VcsState {
    cpu: M6502State,
    tia: TiaState,
    riot: RiotState,
    frames: u64,
}

impl Bus for Board {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, master: BusMaster, addr: u16) -> u8 {
        let addr = addr & 0x1FFF;
        if addr & 0x1000 != 0 {
            // ROM sizes are powers of two; smaller images mirror.
            self.rom[addr as usize & (self.rom.len() - 1)]
        } else if addr & 0x0080 == 0 {
            self.tia.read(addr as u8)
        } else if addr & 0x0200 == 0 {
            self.riot.read_ram(addr)
        } else if master == BusMaster::Debug {
            self.riot.peek(addr)
        } else {
            self.riot.read(addr)
        }
    }

    fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        let addr = addr & 0x1FFF;
        if addr & 0x1000 != 0 {
            // ROM is not writable
        } else if addr & 0x0080 == 0 {
            self.tia.write(addr as u8, data);
        } else if addr & 0x0200 == 0 {
            self.riot.write_ram(addr, data);
        } else {
            self.riot.write(addr, data);
        }
    }
}

impl VcsSystem {
    /// Insert `cartridge` and power the console on.
    pub fn new(cartridge: &Cartridge) -> Self {
        let mut sys = Self {
            cpu: M6502::new(),
            board: Board {
                rom: cartridge.rom().to_vec(),
                tia: Tia::new(),
                riot: Riot::new(),
            },
            frames: 0,
        };
        sys.reset();
        sys
    }

    /// Frames emulated since power-on.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_jammed(&self) -> bool {
        self.cpu.is_sleeping()
    }

    /// Run one instruction and advance the timer to match.
    fn step(&mut self) -> u32 {
        let cycles = self.cpu.step(&mut self.board, BusMaster::Cpu(0));
        self.board.riot.tick_many(cycles);
        cycles
    }
}

impl Bus for VcsSystem {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, master: BusMaster, addr: u16) -> u8 {
        self.board.read(master, addr)
    }

    fn write(&mut self, master: BusMaster, addr: u16, data: u8) {
        self.board.write(master, addr, data);
    }
}

impl Machine for VcsSystem {
    fn display_size(&self) -> (u32, u32) {
        (tia::SCREEN_WIDTH as u32, tia::SCREEN_HEIGHT as u32)
    }

    fn run_frame(&mut self) {
        let was_jammed = self.cpu.is_sleeping();
        let mut cycles = 0;
        while cycles < CYCLES_PER_FRAME {
            cycles += self.step();
            if self.board.tia.take_vsync() {
                break;
            }
        }
        if !was_jammed && self.cpu.is_sleeping() {
            log::warn!(
                "CPU jammed on undefined opcode at ${:04X} (frame {})",
                self.cpu.pc,
                self.frames
            );
        }
        self.frames += 1;
    }

    fn frame_buffer(&self) -> &[u8] {
        self.board.tia.frame()
    }

    fn ram(&self) -> &[u8] {
        self.board.riot.ram()
    }

    fn set_input(&mut self, button: u8, pressed: bool) {
        let riot = &mut self.board.riot;
        let mut swcha = riot.port_a();
        let mut swchb = riot.port_b();
        match button {
            // SWCHA joysticks (active-low): P0 in the high nibble, P1 in the low
            INPUT_P0_RIGHT => set_bit_active_low(&mut swcha, 7, pressed),
            INPUT_P0_LEFT => set_bit_active_low(&mut swcha, 6, pressed),
            INPUT_P0_DOWN => set_bit_active_low(&mut swcha, 5, pressed),
            INPUT_P0_UP => set_bit_active_low(&mut swcha, 4, pressed),
            INPUT_P1_RIGHT => set_bit_active_low(&mut swcha, 3, pressed),
            INPUT_P1_LEFT => set_bit_active_low(&mut swcha, 2, pressed),
            INPUT_P1_DOWN => set_bit_active_low(&mut swcha, 1, pressed),
            INPUT_P1_UP => set_bit_active_low(&mut swcha, 0, pressed),

            // Fire buttons are TIA inputs
            INPUT_P0_FIRE => self.board.tia.set_fire(0, pressed),
            INPUT_P1_FIRE => self.board.tia.set_fire(1, pressed),

            // SWCHB console switches
            INPUT_RESET => set_bit_active_low(&mut swchb, 0, pressed),
            INPUT_SELECT => set_bit_active_low(&mut swchb, 1, pressed),
            INPUT_P0_DIFFICULTY_A => set_bit_active_high(&mut swchb, 6, pressed),
            INPUT_P1_DIFFICULTY_A => set_bit_active_high(&mut swchb, 7, pressed),
            _ => {}
        }
        riot.set_port_a(swcha);
        riot.set_port_b(swchb);
    }

    fn release_all_inputs(&mut self) {
        self.board.riot.set_port_a(0xFF);
        self.board.riot.set_port_b(SWCHB_IDLE);
        self.board.tia.set_fire(0, false);
        self.board.tia.set_fire(1, false);
    }

    fn input_map(&self) -> &[InputButton] {
        VCS_INPUT_MAP
    }

    fn reset(&mut self) {
        self.board.tia = Tia::new();
        self.board.riot = Riot::new();
        self.release_all_inputs();
        self.cpu.reset_from_vector(&mut self.board, BusMaster::Cpu(0));
    }

    fn save_state(&self) -> Result<Vec<u8>, StateError> {
        let state = VcsState {
            cpu: self.cpu.snapshot(),
            tia: self.board.tia.snapshot(),
            riot: self.board.riot.snapshot(),
            frames: self.frames,
        };
        postcard::to_allocvec(&state).map_err(|e| StateError::Encode(e.to_string()))
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        let (state, rest): (VcsState, _) =
            postcard::take_from_bytes(data).map_err(|e| StateError::Decode(e.to_string()))?;
        if !rest.is_empty() {
            return Err(StateError::Decode(format!(
                "{} trailing bytes after machine state",
                rest.len()
            )));
        }
        Tia::validate(&state.tia)?;
        Riot::validate(&state.riot)?;

        self.cpu.restore(&state.cpu);
        self.board.tia.restore(&state.tia);
        self.board.riot.restore(&state.riot);
        self.frames = state.frames;
        Ok(())
    }
}

fn set_bit_active_low(reg: &mut u8, bit: u8, pressed: bool) {
    if pressed {
        *reg &= !(1 << bit);
    } else {
        *reg |= 1 << bit;
    }
}

fn set_bit_active_high(reg: &mut u8, bit: u8, pressed: bool) {
    set_bit_active_low(reg, bit, !pressed);
}
