//! Input latches shared between the event pump and the dispatcher.
//!
//! The frontend's event pump writes latest-wins latches here; the
//! dispatcher consumes them through the POLL/GET operations and the
//! blocking-read protocol. Everything stays on one thread, so these are
//! plain fields.

/// Keyboard and mouse state, plus the blocking-read flag.
#[derive(Debug, Default)]
pub struct InputState {
    /// Most recently pressed key byte. Meaningful while `key_available`.
    pub last_key: u8,
    /// A key has been latched and not yet consumed by GET_KEY/READ_CHAR.
    pub key_available: bool,
    /// Mouse position in logical pixels.
    pub mouse_x: u16,
    pub mouse_y: u16,
    /// Button mask from the latest mouse event.
    pub mouse_buttons: u8,
    /// A mouse event has been latched and not yet consumed by GET_MOUSE_B.
    pub mouse_event: bool,
    /// A READ_CHAR is parked on the engine waiting for a key.
    pub waiting_for_input: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches a key press, replacing any unconsumed one.
    pub fn latch_key(&mut self, key: u8) {
        self.last_key = key;
        self.key_available = true;
    }

    /// Latches a mouse move or button change.
    pub fn latch_mouse(&mut self, x: u16, y: u16, buttons: u8) {
        self.mouse_x = x;
        self.mouse_y = y;
        self.mouse_buttons = buttons;
        self.mouse_event = true;
    }

    /// Consumes the latched key.
    pub fn take_key(&mut self) -> u8 {
        self.key_available = false;
        self.last_key
    }
}
