//! Host-I/O dispatcher for the KXN virtual machine.
//!
//! Implements [`kxn_vm::Host`]: the engine reaches this crate only through
//! opcode `IO`, handing over an 8-bit operation id. Operands travel on the
//! engine's operand stack in both directions. Backend specifics (windowing,
//! real input devices) stay behind the [`Frontend`] trait; the dispatcher
//! itself owns the framebuffer, the input latches and the console sink.

pub mod console;
pub mod frontend;
pub mod input;
pub mod screen;

pub use console::Console;
pub use frontend::{ConsoleFrontend, Frontend, Step, Stub};
pub use input::InputState;
pub use screen::Screen;

use kxn_vm::{Host, IoFault, Vm};
use log::warn;

/// Host I/O operation ids, as encoded in `IO` immediates.
pub mod ops {
    pub const EXIT: u8 = 0x00;
    pub const PRINT_CHAR: u8 = 0x01;
    pub const READ_CHAR: u8 = 0x02;
    pub const DRAW_PIXEL: u8 = 0x10;
    pub const DRAW_LINE: u8 = 0x11;
    pub const FILL_RECT: u8 = 0x12;
    pub const REFRESH: u8 = 0x13;
    pub const POLL_KEY: u8 = 0x20;
    pub const GET_KEY: u8 = 0x21;
    pub const POLL_MOUSE: u8 = 0x22;
    pub const GET_MOUSE_X: u8 = 0x23;
    pub const GET_MOUSE_Y: u8 = 0x24;
    pub const GET_MOUSE_B: u8 = 0x25;
}

/// The host side of the machine: devices plus a frontend.
pub struct Platform<F> {
    screen: Screen,
    input: InputState,
    console: Console,
    frontend: F,
}

impl<F: Frontend> Platform<F> {
    /// A platform writing characters to stdout.
    pub fn new(frontend: F) -> Self {
        Self::with_console(frontend, Console::stdout())
    }

    /// A platform with an explicit console sink, for capturing output.
    pub fn with_console(frontend: F, console: Console) -> Self {
        Self {
            screen: Screen::new(),
            input: InputState::new(),
            console,
            frontend,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    /// The blocking-read protocol. On the first visit with no key latched,
    /// park the engine: flag waiting-for-input and rewind `PC` over the
    /// two-byte `IO` instruction so the same instruction re-enters once the
    /// pump latches a key.
    fn read_char(&mut self, vm: &mut Vm) {
        if self.input.key_available {
            let key = self.input.take_key();
            vm.push(key);
            self.input.waiting_for_input = false;
        } else {
            self.input.waiting_for_input = true;
            vm.set_pc(vm.pc().wrapping_sub(2));
        }
    }
}

impl<F: Frontend> Host for Platform<F> {
    fn process_events(&mut self, _vm: &mut Vm) -> bool {
        self.frontend.pump(&mut self.input)
    }

    fn is_waiting_for_input(&self) -> bool {
        self.input.waiting_for_input && !self.input.key_available
    }

    fn handle_io(&mut self, vm: &mut Vm, op: u8) -> Result<(), IoFault> {
        match op {
            ops::EXIT => vm.halt(),
            ops::PRINT_CHAR => {
                let c = vm.pop();
                self.console.put(c)?;
            }
            ops::READ_CHAR => self.read_char(vm),
            ops::DRAW_PIXEL => {
                let color = vm.pop();
                let y = vm.pop();
                let x = vm.pop();
                self.screen.draw_pixel(x, y, color);
            }
            ops::DRAW_LINE => {
                let color = vm.pop();
                let y2 = vm.pop();
                let x2 = vm.pop();
                let y1 = vm.pop();
                let x1 = vm.pop();
                self.screen.draw_line(x1, y1, x2, y2, color);
            }
            ops::FILL_RECT => {
                let color = vm.pop();
                let h = vm.pop();
                let w = vm.pop();
                let y = vm.pop();
                let x = vm.pop();
                self.screen.fill_rect(x, y, w, h, color);
            }
            ops::REFRESH => self.frontend.present(self.screen.frame()),
            ops::POLL_KEY => vm.push(self.input.key_available as u8),
            ops::GET_KEY => {
                let key = self.input.take_key();
                vm.push(key);
            }
            ops::POLL_MOUSE => vm.push(self.input.mouse_event as u8),
            ops::GET_MOUSE_X => {
                let [lo, hi] = self.input.mouse_x.to_le_bytes();
                vm.push(lo);
                vm.push(hi);
            }
            ops::GET_MOUSE_Y => {
                let [lo, hi] = self.input.mouse_y.to_le_bytes();
                vm.push(lo);
                vm.push(hi);
            }
            ops::GET_MOUSE_B => {
                vm.push(self.input.mouse_buttons);
                self.input.mouse_event = false;
            }
            unknown => {
                warn!("unknown host i/o operation 0x{unknown:02x}");
                return Err(IoFault::InvalidOperation(unknown));
            }
        }
        Ok(())
    }
}
