//! Writer for the .uprof wire layout.
//!
//! The layout is the only format a trace is ever written back in. Mostly
//! useful for building fixtures and for replaying a decoded token stream.

use std::io::{self, Write};

const CYCLE_TAG: u32 = 1;
const FRAME_END: u32 = 3;
const END_MARKER: u32 = 0;

/// Builder for a complete trace
#[derive(Debug, Clone, Default)]
pub struct TraceWriter {
    usecs_per_cycle: f64,
    functions: Vec<(u32, Vec<u8>)>,
    tokens: Vec<u32>,
}

impl TraceWriter {
    pub fn new(usecs_per_cycle: f64) -> Self {
        Self {
            usecs_per_cycle,
            ..Default::default()
        }
    }

    /// Declare a function in the header
    pub fn function(mut self, pointer: u32, name: impl AsRef<[u8]>) -> Self {
        self.functions.push((pointer, name.as_ref().to_vec()));
        self
    }

    pub fn enter(self, pointer: u32) -> Self {
        self.token(pointer)
    }

    /// Cycle count token; the low two bits are replaced by the tag
    pub fn cycles(self, delta: u32) -> Self {
        self.token((delta & !3) | CYCLE_TAG)
    }

    pub fn frame_end(self) -> Self {
        self.token(FRAME_END)
    }

    /// Append a raw token
    pub fn token(mut self, raw: u32) -> Self {
        self.tokens.push(raw);
        self
    }

    /// Serialize header and tokens followed by the end marker
    pub fn finish(self) -> Vec<u8> {
        self.token(END_MARKER).into_bytes()
    }

    /// Serialize header and tokens as is, without an end marker
    pub fn into_bytes(self) -> Vec<u8> {
        let mut bytes = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut bytes);
        bytes
    }

    pub fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_all(&self.usecs_per_cycle.to_le_bytes())?;
        writer.write_all(&(self.functions.len() as u32).to_le_bytes())?;
        for (pointer, name) in &self.functions {
            writer.write_all(&pointer.to_le_bytes())?;
            writer.write_all(&(name.len() as u32).to_le_bytes())?;
            writer.write_all(name)?;
        }
        for token in &self.tokens {
            writer.write_all(&token.to_le_bytes())?;
        }
        writer.flush()
    }
}
