/// Describes a single input button that a machine accepts.
pub struct InputButton {
    /// Machine-defined button identifier, passed to `set_input()`.
    pub id: u8,
    /// Human-readable name for display/configuration (e.g., "P0 Left", "Reset").
    pub name: &'static str,
}

/// Errors raised while restoring a machine from serialized state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The payload could not be decoded at all.
    #[error("machine state payload is unreadable: {0}")]
    Decode(String),

    /// The payload decoded but a component has the wrong shape.
    #[error("machine state field `{field}`: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Serializing the live state failed.
    #[error("machine state could not be serialized: {0}")]
    Encode(String),
}

/// Machine-agnostic interface for the emulated console.
///
/// The session layer drives a machine exclusively through this trait: it never
/// touches CPU registers or chip internals directly. A machine must be fully
/// deterministic: the same state plus the same inputs produce the same frame.
pub trait Machine: Send {
    /// Native display resolution as (width, height) in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Run one frame of emulation.
    fn run_frame(&mut self);

    /// The most recently completed frame as palette indices, row-major,
    /// `width * height` bytes.
    fn frame_buffer(&self) -> &[u8];

    /// The console's working memory.
    fn ram(&self) -> &[u8];

    /// Handle an input event. `button` is a machine-defined ID from `input_map()`.
    /// The state is latched until changed, so `run_frame()` sees held buttons.
    fn set_input(&mut self, button: u8, pressed: bool);

    /// Release every button and switch latched through `set_input()`.
    fn release_all_inputs(&mut self);

    /// Get the list of input buttons this machine accepts.
    fn input_map(&self) -> &[InputButton];

    /// Power-cycle the machine: CPU, RAM, chips and inputs return to their
    /// power-on state. The inserted cartridge is kept.
    fn reset(&mut self);

    /// Serialize the complete mutable machine state.
    fn save_state(&self) -> Result<Vec<u8>, StateError>;

    /// Replace the machine state with a payload from `save_state()`.
    ///
    /// The payload is validated in full before anything is modified; on error
    /// the machine is left untouched.
    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError>;
}
