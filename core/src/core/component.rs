/// Anything that advances by discrete time units (timers, video chips).
pub trait Component {
    /// Advance one clock cycle in this component's clock domain.
    /// Returns true if a "significant event" occurred (e.g., timer underflow, frame ready).
    fn tick(&mut self) -> bool;

    /// Advance `cycles` clock cycles. Returns true if any tick reported an event.
    fn tick_many(&mut self, cycles: u32) -> bool {
        let mut event = false;
        for _ in 0..cycles {
            event |= self.tick();
        }
        event
    }
}
