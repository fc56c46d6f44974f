//! End-to-end images run against a minimal recording host.

use kxn_vm::{Fault, Host, IoFault, Vm, STACK_TOP};

/// Host for engine-level tests: op 0x00 exits, op 0x01 collects console
/// bytes, anything else is rejected. Records the top of stack as seen at
/// each dispatch.
struct RecordingHost {
    stdout: Vec<u8>,
    tops: Vec<Option<u8>>,
}

impl RecordingHost {
    fn new() -> Self {
        Self {
            stdout: Vec::new(),
            tops: Vec::new(),
        }
    }
}

impl Host for RecordingHost {
    fn process_events(&mut self, _vm: &mut Vm) -> bool {
        true
    }

    fn is_waiting_for_input(&self) -> bool {
        false
    }

    fn handle_io(&mut self, vm: &mut Vm, op: u8) -> Result<(), IoFault> {
        self.tops.push(vm.peek());
        match op {
            0x00 => {
                vm.halt();
                Ok(())
            }
            0x01 => {
                let c = vm.pop();
                self.stdout.push(c);
                Ok(())
            }
            other => Err(IoFault::InvalidOperation(other)),
        }
    }
}

fn run(image: &[u8]) -> (Vm, RecordingHost, Option<Fault>) {
    let mut vm = Vm::new();
    vm.load(image).unwrap();
    let mut host = RecordingHost::new();
    let fault = vm.run(&mut host);
    (vm, host, fault)
}

#[test]
fn minimal_halt() {
    let (vm, _, fault) = run(&[0x01]);
    assert_eq!(fault, Some(Fault::Halt));
    assert_eq!(vm.pc(), 1);
    assert_eq!(vm.sp(), STACK_TOP);
}

#[test]
fn add_two_numbers() {
    // PUSH 5; PUSH 7; ADD; IO EXIT
    let (_, host, fault) = run(&[0x02, 0x05, 0x02, 0x07, 0x06, 0x21, 0x00]);
    assert_eq!(fault, Some(Fault::Halt));
    assert_eq!(host.tops, vec![Some(12)]);
}

#[test]
fn loop_counts_to_ten() {
    // Counter lives at 0x0100; loop until LOAD == 10.
    #[rustfmt::skip]
    let image = [
        0x02, 0x00,             // 0000: PUSH 0
        0x19, 0x00, 0x01,       // 0002: STORE 0x0100
        0x18, 0x00, 0x01,       // 0005: LOAD 0x0100      <- loop
        0x02, 0x0A,             // 0008: PUSH 10
        0x15,                   // 000A: LT
        0x1D, 0x1A, 0x00,       // 000B: JZ 0x001A
        0x18, 0x00, 0x01,       // 000E: LOAD 0x0100
        0x02, 0x01,             // 0011: PUSH 1
        0x06,                   // 0013: ADD
        0x19, 0x00, 0x01,       // 0014: STORE 0x0100
        0x1C, 0x05, 0x00,       // 0017: JMP 0x0005
        0x01,                   // 001A: HALT
    ];
    let (vm, _, fault) = run(&image);
    assert_eq!(fault, Some(Fault::Halt));
    assert_eq!(vm.mem()[0x0100], 10);
    assert_eq!(vm.sp(), STACK_TOP);
}

#[test]
fn print_a() {
    // PUSH 'A'; IO PRINT_CHAR; HALT
    let (_, host, fault) = run(&[0x02, 0x41, 0x21, 0x01, 0x01]);
    assert_eq!(fault, Some(Fault::Halt));
    assert_eq!(host.stdout, b"A");
}

#[test]
fn subroutine_round_trip() {
    // The routine parks the return address in scratch memory while its
    // result is on the stack, so CALL and RET stay true inverses.
    #[rustfmt::skip]
    let image = [
        0x1F, 0x07, 0x00,       // 0000: CALL 0x0007
        0x19, 0x00, 0x02,       // 0003: STORE 0x0200
        0x01,                   // 0006: HALT
        0x19, 0x10, 0x02,       // 0007: STORE 0x0210 (return hi)
        0x19, 0x11, 0x02,       // 000A: STORE 0x0211 (return lo)
        0x02, 0x2A,             // 000D: PUSH 42
        0x18, 0x11, 0x02,       // 000F: LOAD 0x0211
        0x18, 0x10, 0x02,       // 0012: LOAD 0x0210
        0x20,                   // 0015: RET
    ];
    let (vm, _, fault) = run(&image);
    assert_eq!(fault, Some(Fault::Halt));
    assert_eq!(vm.mem()[0x0200], 42);
    assert_eq!(vm.sp(), STACK_TOP);
    assert_eq!(vm.pc(), 7);
}

#[test]
fn division_by_zero_faults() {
    // PUSH 5; PUSH 0; DIV; HALT is never reached.
    let (vm, _, fault) = run(&[0x02, 0x05, 0x02, 0x00, 0x09, 0x01]);
    assert_eq!(fault, Some(Fault::DivisionByZero));
    assert!(vm.pc() < 6);
}

#[test]
fn unbounded_pushing_overflows() {
    // PUSH 1; JMP 0 fills the stack until the push at SP == 0 faults.
    let (vm, _, fault) = run(&[0x02, 0x01, 0x1C, 0x00, 0x00]);
    assert_eq!(fault, Some(Fault::StackOverflow));
    assert_eq!(vm.sp(), 0);
}

#[test]
fn load_of_last_byte_succeeds() {
    // LOAD 0xFFFF; HALT
    let (_, _, fault) = run(&[0x18, 0xFF, 0xFF, 0x01]);
    assert_eq!(fault, Some(Fault::Halt));
}

#[test]
fn operand_read_straddling_end_faults() {
    // A LOAD placed at 0xFFFE puts its 16-bit operand across the end of
    // memory.
    let mut image = vec![0u8; 65536];
    image[0xFFFE] = 0x18;
    let mut vm = Vm::new();
    vm.load(&image).unwrap();
    vm.set_pc(0xFFFE);
    let mut host = RecordingHost::new();
    let fault = vm.step(&mut host);
    assert_eq!(fault, Some(Fault::InvalidAddress(0xFFFF)));
}
