//! # KXN assembler
//!
//! Assembles the line-oriented KXN mnemonic language into machine images
//! for the KXN virtual machine.
//!
//! One statement per line. `;` starts a comment, a leading token ending in
//! `:` binds a label to the current output position, mnemonics are
//! case-insensitive, and numeric operands are decimal or `0x`-prefixed hex.
//! An operand starting with a letter or underscore is a label reference,
//! emitted as a placeholder and patched in pass two.
//!
//! ## Example
//!
//! ```rust
//! let source = r#"
//!     ; count up to ten at 0x0100
//!         PUSH 0
//!         STORE 0x0100
//!     loop:
//!         LOAD 0x0100
//!         PUSH 10
//!         LT
//!         JZ done
//!         LOAD 0x0100
//!         PUSH 1
//!         ADD
//!         STORE 0x0100
//!         JMP loop
//!     done:
//!         HALT
//! "#;
//!
//! let assembly = kxn_asm::assemble(source).unwrap();
//! assert!(!assembly.has_errors());
//! assert_eq!(assembly.image[0], 0x02); // PUSH
//! ```

pub mod assembler;
pub mod error;
pub mod image;

pub use assembler::{Assembler, Assembly, Diagnostic, Severity};
pub use error::{AsmError, Result};
pub use image::Image;

use std::path::Path;

/// Assembles source text in one call.
pub fn assemble(source: &str) -> Result<Assembly> {
    Assembler::new().assemble(source)
}

/// Assembles a source file.
pub fn assemble_file<P: AsRef<Path>>(path: P) -> Result<Assembly> {
    let source = std::fs::read_to_string(path)?;
    assemble(&source)
}

/// Assembles a source file and writes the image file.
///
/// Best-effort: the image file is produced even when the assembly carries
/// error diagnostics, so callers must still check [`Assembly::has_errors`].
pub fn assemble_file_to_image<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<Assembly> {
    let assembly = assemble_file(input)?;
    std::fs::write(output, &assembly.image)?;
    Ok(assembly)
}
