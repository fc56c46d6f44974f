//! Two-pass assembler.
//!
//! Pass one walks the source line by line, binding label definitions to the
//! current output position and emitting code with zeroed placeholders for
//! label operands. Pass two patches every recorded reference from the
//! symbol table. All state is scoped to one [`Assembler`] value per run.

use std::collections::HashMap;
use std::fmt;

use kxn_vm::Opcode;

use crate::error::Result;
use crate::image::Image;

/// Longest accepted label name.
pub const MAX_LABEL_LEN: usize = 63;

/// How bad a [`Diagnostic`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Assembly continues and the result is usable.
    Warning,
    /// Assembly continues best-effort, but the run must report failure.
    Error,
}

/// One per-line problem found during assembly.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub line: usize,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{severity}: line {}: {}", self.line, self.message)
    }
}

/// The product of one assembly run.
pub struct Assembly {
    /// Image bytes, complete even when diagnostics carry errors.
    pub image: Vec<u8>,
    /// Everything worth telling the user, in source order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    /// True when any diagnostic is error-severity; callers should then
    /// treat the run as failed even though the image bytes exist.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// A label operand emitted as a placeholder, waiting for pass two.
struct Reference {
    label: String,
    /// Position of the placeholder's low byte.
    at: u16,
    line: usize,
}

/// The assembler state for a single run.
pub struct Assembler {
    symbols: HashMap<String, u16>,
    references: Vec<Reference>,
    diagnostics: Vec<Diagnostic>,
    line: usize,
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            references: Vec::new(),
            diagnostics: Vec::new(),
            line: 0,
        }
    }

    /// Assembles a whole source text into an [`Assembly`].
    pub fn assemble(&mut self, source: &str) -> Result<Assembly> {
        self.symbols.clear();
        self.references.clear();
        self.diagnostics.clear();

        let mut image = Image::new();
        for (index, raw) in source.lines().enumerate() {
            self.line = index + 1;
            self.statement(raw, &mut image)?;
        }
        self.patch(&mut image);

        self.diagnostics.sort_by_key(|d| d.line);
        Ok(Assembly {
            image: image.into_bytes(),
            diagnostics: std::mem::take(&mut self.diagnostics),
        })
    }

    /// Resolved address of a label, once assembly has run.
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }

    fn warning(&mut self, message: String) {
        self.diagnostics.push(Diagnostic {
            line: self.line,
            severity: Severity::Warning,
            message,
        });
    }

    fn error(&mut self, message: String) {
        self.diagnostics.push(Diagnostic {
            line: self.line,
            severity: Severity::Error,
            message,
        });
    }

    /// Handles one source line: optional label definition, then at most
    /// one instruction. `;` starts a comment anywhere.
    fn statement(&mut self, raw: &str, image: &mut Image) -> Result<()> {
        let mut line = raw.split(';').next().unwrap_or("").trim();
        if line.is_empty() {
            return Ok(());
        }

        let first = line.split_whitespace().next().unwrap_or("");
        if let Some(name) = first.strip_suffix(':') {
            self.define_label(name, image.position() as u16);
            line = line[first.len()..].trim_start();
            if line.is_empty() {
                return Ok(());
            }
        }

        self.instruction(line, image)
    }

    fn define_label(&mut self, name: &str, address: u16) {
        if !is_valid_label(name) {
            self.error(format!("invalid label name '{name}'"));
            return;
        }
        if self.symbols.contains_key(name) {
            self.error(format!("duplicate label '{name}'"));
            return;
        }
        self.symbols.insert(name.to_string(), address);
    }

    fn instruction(&mut self, line: &str, image: &mut Image) -> Result<()> {
        let mut tokens = line.split_whitespace();
        let Some(mnemonic) = tokens.next() else {
            return Ok(());
        };

        // SYS is the legacy spelling of IO.
        let op = if mnemonic.eq_ignore_ascii_case("SYS") {
            Some(Opcode::Io)
        } else {
            Opcode::from_mnemonic(mnemonic)
        };
        let Some(op) = op else {
            self.warning(format!("unknown instruction '{mnemonic}'"));
            return Ok(());
        };

        image.write_byte(op as u8)?;
        match op.operand_len() {
            0 => Ok(()),
            1 => self.byte_operand(op, tokens.next(), image),
            _ => self.word_operand(op, tokens.next(), image),
        }
    }

    fn byte_operand(
        &mut self,
        op: Opcode,
        token: Option<&str>,
        image: &mut Image,
    ) -> Result<()> {
        let value = match token {
            None => {
                self.error(format!(
                    "{} needs an 8-bit operand",
                    op.mnemonic()
                ));
                0
            }
            Some(token) => match parse_number(token) {
                Some(v) if v <= 0xFF => v as u8,
                Some(v) => {
                    self.error(format!(
                        "operand {v} does not fit in 8 bits"
                    ));
                    0
                }
                None => {
                    self.error(format!("invalid operand '{token}'"));
                    0
                }
            },
        };
        image.write_byte(value)
    }

    fn word_operand(
        &mut self,
        op: Opcode,
        token: Option<&str>,
        image: &mut Image,
    ) -> Result<()> {
        let Some(token) = token else {
            self.error(format!("{} needs a 16-bit operand", op.mnemonic()));
            return image.write_word(0);
        };

        if token
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            // Label reference: emit a placeholder and patch in pass two.
            if is_valid_label(token) {
                self.references.push(Reference {
                    label: token.to_string(),
                    at: image.position() as u16,
                    line: self.line,
                });
            } else {
                self.error(format!("invalid label reference '{token}'"));
            }
            return image.write_word(0);
        }

        let value = match parse_number(token) {
            Some(v) if v <= 0xFFFF => v as u16,
            Some(v) => {
                self.error(format!("operand {v} does not fit in 16 bits"));
                0
            }
            None => {
                self.error(format!("invalid operand '{token}'"));
                0
            }
        };
        image.write_word(value)
    }

    /// Pass two: resolve every placeholder. Unresolved labels become error
    /// diagnostics and leave their placeholders in the output.
    fn patch(&mut self, image: &mut Image) {
        let references = std::mem::take(&mut self.references);
        for r in references {
            match self.symbols.get(&r.label) {
                Some(&address) => image.patch_word_at(r.at, address),
                None => self.diagnostics.push(Diagnostic {
                    line: r.line,
                    severity: Severity::Error,
                    message: format!("undefined label '{}'", r.label),
                }),
            }
        }
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

fn is_valid_label(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_LABEL_LEN {
        return false;
    }
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Numeric literal: `0x` prefix for hex, decimal otherwise.
fn parse_number(token: &str) -> Option<u32> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else {
        token.parse().ok()
    }
}
