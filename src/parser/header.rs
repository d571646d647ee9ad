//! Trace header reader.
//!
//! File format (all little-endian):
//!
//! ```text
//! f64                usecs per cycle
//! u32                function count N
//! N times:
//!   u32              function pointer
//!   u32              name length L
//!   u8[L]            name, single-byte chars, no terminator
//! u32[...]           tokens
//! ```

use super::progress::Progress;
use super::registry::{FunctionId, FunctionRegistry};
use crate::utils::error::{HeaderField, ParseError};
use log::debug;
use std::io::{self, Read};

/// Forward-only little-endian reader that tracks its byte offset
pub struct ByteCursor<R> {
    reader: R,
    offset: u64,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Number of bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.reader.read_exact(&mut buf)?;
        self.offset += 4;
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_f64(&mut self) -> io::Result<f64> {
        let mut buf = [0u8; 8];
        self.reader.read_exact(&mut buf)?;
        self.offset += 8;
        Ok(f64::from_le_bytes(buf))
    }

    /// Read exactly `len` bytes without trusting `len` for the allocation
    pub fn read_bytes(&mut self, len: u32) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        (&mut self.reader).take(u64::from(len)).read_to_end(&mut buf)?;
        self.offset += buf.len() as u64;
        if buf.len() < len as usize {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        Ok(buf)
    }
}

/// Scalar header data; the declared functions go straight into the registry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHeader {
    pub usecs_per_cycle: f64,
    pub function_count: u32,
}

/// Read the header and declare every function in `registry`
///
/// Functions declared before a failure stay registered.
///
/// # Errors
/// * `ParseError::MalformedHeader` - a header field is truncated
/// * `ParseError::DuplicateFunction` / `ParseError::ReservedFunctionId`
pub fn read_header<R: Read>(
    cursor: &mut ByteCursor<R>,
    registry: &mut FunctionRegistry,
    progress: &mut Progress<'_>,
    total_len: Option<u64>,
) -> Result<TraceHeader, ParseError> {
    let usecs_per_cycle = read_field(cursor, HeaderField::UsecsPerCycle, |c| c.read_f64())?;
    let function_count = read_field(cursor, HeaderField::FunctionCount, |c| c.read_u32())?;
    debug!(
        "Header: {} usecs per cycle, {} functions",
        usecs_per_cycle, function_count
    );

    for _ in 0..function_count {
        let pointer = read_field(cursor, HeaderField::FunctionPointer, |c| c.read_u32())?;
        let length = read_field(cursor, HeaderField::NameLength, |c| c.read_u32())?;
        let name = read_field(cursor, HeaderField::FunctionName, |c| c.read_bytes(length))?;

        registry.declare(FunctionId(pointer), decode_name(&name))?;
        progress.stream_position(cursor.offset(), total_len);
    }

    Ok(TraceHeader {
        usecs_per_cycle,
        function_count,
    })
}

/// Names are single-byte characters, mapped one byte to one char
pub fn decode_name(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn read_field<R: Read, T>(
    cursor: &mut ByteCursor<R>,
    field: HeaderField,
    read: impl FnOnce(&mut ByteCursor<R>) -> io::Result<T>,
) -> Result<T, ParseError> {
    let offset = cursor.offset();
    read(cursor).map_err(|_| ParseError::MalformedHeader { field, offset })
}
