//! The backend boundary.
//!
//! A [`Frontend`] is whatever sits between the dispatcher and the outside
//! world: it pumps events into the input latches and receives finished
//! frames on REFRESH. Windowing frontends live outside this crate; the two
//! here cover terminal use and tests.

use std::collections::VecDeque;
use std::io::Read;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::input::InputState;
use crate::screen::{HEIGHT, WIDTH};

/// Event pump and display surface for a [`crate::Platform`].
pub trait Frontend {
    /// Pumps pending backend events into the latches. Returning `false`
    /// requests shutdown (window close, stdin gone while a read blocks).
    fn pump(&mut self, input: &mut InputState) -> bool;

    /// Receives the framebuffer on REFRESH, row-major `WIDTH` x `HEIGHT`.
    fn present(&mut self, frame: &[u32]);
}

/// Terminal frontend: keys come from a stdin reader thread, frames are
/// dropped.
///
/// The reader thread keeps the engine loop itself single-threaded and
/// non-blocking; bytes cross over an mpsc channel and are latched here.
pub struct ConsoleFrontend {
    keys: Receiver<u8>,
    disconnected: bool,
}

impl ConsoleFrontend {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for byte in stdin.lock().bytes() {
                let Ok(byte) = byte else { break };
                if tx.send(byte).is_err() {
                    break;
                }
            }
        });
        Self {
            keys: rx,
            disconnected: false,
        }
    }
}

impl Default for ConsoleFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for ConsoleFrontend {
    fn pump(&mut self, input: &mut InputState) -> bool {
        match self.keys.try_recv() {
            Ok(key) => input.latch_key(key),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => self.disconnected = true,
        }
        if input.waiting_for_input && !input.key_available {
            // Blocked on a read: with stdin gone there is nothing left to
            // wait for, otherwise yield the CPU briefly.
            if self.disconnected {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }

    fn present(&mut self, _frame: &[u32]) {
        // No display surface; drawing programs still run.
    }
}

/// One scripted pump step for the [`Stub`] frontend.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Pump with nothing to report.
    Idle,
    /// Latch a key press.
    Key(u8),
    /// Latch a mouse event.
    Mouse { x: u16, y: u16, buttons: u8 },
    /// Request shutdown.
    Shutdown,
}

/// Headless test frontend: replays a script of pump steps and captures
/// every presented frame.
#[derive(Default)]
pub struct Stub {
    steps: VecDeque<Step>,
    /// Frames handed over by REFRESH, in order.
    pub frames: Vec<Vec<u32>>,
}

impl Stub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push_back(step);
    }
}

impl Frontend for Stub {
    fn pump(&mut self, input: &mut InputState) -> bool {
        match self.steps.pop_front() {
            Some(Step::Key(k)) => input.latch_key(k),
            Some(Step::Mouse { x, y, buttons }) => {
                input.latch_mouse(x, y, buttons)
            }
            Some(Step::Shutdown) => return false,
            Some(Step::Idle) | None => {}
        }
        true
    }

    fn present(&mut self, frame: &[u32]) {
        debug_assert_eq!(frame.len(), WIDTH * HEIGHT);
        self.frames.push(frame.to_vec());
    }
}
