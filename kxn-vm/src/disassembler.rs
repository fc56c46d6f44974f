//! Byte-code disassembler.
//!
//! Walks an image through the opcode table and hands one record per
//! decoded instruction to a callback. Bytes that do not decode, and
//! operands truncated by the end of the image, still produce records so
//! that partial or data-bearing images can be dumped.

use crate::Opcode;

/// One decoded instruction, or one undecodable byte.
pub struct DisassembledInstr {
    /// Image offset of the opcode byte.
    pub addr: u16,
    /// `None` for a byte outside the opcode table.
    pub opcode: Option<Opcode>,
    /// Canonical mnemonic, or `".byte"` for raw data.
    pub mnemonic: &'static str,
    /// Immediate operand value, if the opcode carries one and the image
    /// held all of its bytes.
    pub operand: Option<u16>,
    /// Raw encoding, opcode byte first.
    pub raw_bytes: [u8; 3],
    /// How many of `raw_bytes` are meaningful.
    pub raw_len: usize,
}

/// Decodes `image` from offset 0, invoking `callback` per instruction.
pub fn disassemble<F>(image: &[u8], mut callback: F)
where
    F: FnMut(DisassembledInstr),
{
    let mut i = 0usize;
    while i < image.len() {
        let byte = image[i];
        let addr = i as u16;
        let Ok(op) = Opcode::try_from(byte) else {
            callback(DisassembledInstr {
                addr,
                opcode: None,
                mnemonic: ".byte",
                operand: Some(u16::from(byte)),
                raw_bytes: [byte, 0, 0],
                raw_len: 1,
            });
            i += 1;
            continue;
        };

        let want = op.operand_len();
        let have = (image.len() - i - 1).min(want);
        let mut raw = [byte, 0, 0];
        raw[1..1 + have].copy_from_slice(&image[i + 1..i + 1 + have]);

        let operand = if have < want {
            // Truncated by the end of the image.
            None
        } else {
            match want {
                1 => Some(u16::from(raw[1])),
                2 => Some(u16::from_le_bytes([raw[1], raw[2]])),
                _ => None,
            }
        };

        callback(DisassembledInstr {
            addr,
            opcode: Some(op),
            mnemonic: op.mnemonic(),
            operand,
            raw_bytes: raw,
            raw_len: 1 + have,
        });
        i += 1 + have;
    }
}

/// Collects the whole image into `(addr, mnemonic, operand)` rows.
pub fn disassemble_to_vec(
    image: &[u8],
) -> Vec<(u16, &'static str, Option<u16>)> {
    let mut out = Vec::new();
    disassemble(image, |instr| {
        out.push((instr.addr, instr.mnemonic, instr.operand));
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_operand_lengths() {
        // PUSH 5; LOAD 0x0102; RET
        let rows =
            disassemble_to_vec(&[0x02, 0x05, 0x18, 0x02, 0x01, 0x20]);
        assert_eq!(
            rows,
            vec![
                (0, "PUSH", Some(5)),
                (2, "LOAD", Some(0x0102)),
                (5, "RET", None),
            ]
        );
    }

    #[test]
    fn raw_bytes_survive() {
        let rows = disassemble_to_vec(&[0xFE, 0x00]);
        assert_eq!(
            rows,
            vec![(0, ".byte", Some(0xFE)), (1, "NOP", None)]
        );
    }

    #[test]
    fn truncated_operand_is_reported() {
        let mut last = None;
        disassemble(&[0x1C, 0x34], |instr| last = Some(instr.raw_len));
        // JMP wants two operand bytes but only one remains.
        assert_eq!(last, Some(2));
    }
}
