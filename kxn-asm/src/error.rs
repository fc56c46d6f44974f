use thiserror::Error;

/// Hard failures that abort an assembly run.
///
/// Per-line problems (unknown mnemonics, bad operands, unresolved labels)
/// are not errors of this type; they are collected as
/// [`crate::Diagnostic`]s so assembly can continue best-effort.
#[derive(Error, Debug)]
pub enum AsmError {
    #[error("image too large: {size} bytes (maximum 65536)")]
    ImageTooLarge { size: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for assembler operations.
pub type Result<T> = std::result::Result<T, AsmError>;
