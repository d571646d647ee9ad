//! Raw 32 bit token classification.
//!
//! Function pointers are always 4 byte aligned and never NULL, which frees
//! the two low bits for tagging:
//!
//! ```text
//! value == 0        end of stream
//! low bits == 11    end of frame
//! low bits == 00    function enter (value is the function id)
//! low bits == 01    cycle count (value itself is the delta, tag included)
//! ```

use super::registry::FunctionId;

/// Classified token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    EndMarker,
    FrameEnd,
    FunctionEnter(FunctionId),
    /// Cycle delta. Not shifted: the tag bit stays in the value, trading a
    /// little noise for the full 32 bit range.
    CycleCount(u32),
    /// Low bits == 10, reserved
    Unrecognized(u32),
}

/// One 32 bit unit of the token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token(pub u32);

impl Token {
    pub fn is_end_marker(self) -> bool {
        self.0 == 0
    }

    pub fn is_frame_end(self) -> bool {
        self.0 & 3 == 3
    }

    pub fn is_function(self) -> bool {
        self.0 != 0 && self.0 & 3 == 0
    }

    pub fn is_cycle_count(self) -> bool {
        self.0 & 3 == 1
    }

    /// Classify the token, checking end marker first
    pub fn kind(self) -> TokenKind {
        if self.is_end_marker() {
            TokenKind::EndMarker
        } else if self.is_frame_end() {
            TokenKind::FrameEnd
        } else if self.is_function() {
            TokenKind::FunctionEnter(FunctionId(self.0))
        } else if self.is_cycle_count() {
            TokenKind::CycleCount(self.0)
        } else {
            TokenKind::Unrecognized(self.0)
        }
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
