// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types.

use std::io;

use thiserror::Error;

use crate::{FunctionCode, RegisterKind};

/// Error type for resolving _Modbus_ address strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Wrong number of fields or an unparsable numeric component.
    #[error("malformed address header: {header:?}")]
    MalformedHeader { header: String },

    /// A write was requested for a register type that is read-only.
    #[error("cannot write to read-only {0}")]
    ReadOnlyRegister(RegisterKind),
}

/// Error type for building and parsing _Modbus_ frames.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The function code is not one of the supported codes.
    #[error("unsupported function code: 0x{:02X}", .0.value())]
    UnsupportedFunctionCode(FunctionCode),

    /// The data payload is missing, empty or has the wrong size.
    #[error("invalid data length for function code 0x{:02X}: {len} byte(s)", .function.value())]
    InvalidDataLength { function: FunctionCode, len: usize },

    /// Not enough bytes for a complete frame.
    #[error("frame too short: {actual} byte(s), at least {expected} required")]
    FrameTooShort { expected: usize, actual: usize },

    /// The trailing CRC does not match the frame contents.
    #[error("CRC mismatch: expected 0x{expected:04X}, actual 0x{actual:04X}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    /// A typed accessor was invoked for an incompatible response.
    #[error("response with function code 0x{:02X} does not carry {expected}", .function.value())]
    WrongResponseKind {
        function: FunctionCode,
        expected: &'static str,
    },

    /// I/O error of an underlying stream.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Specialized [`std::result::Result`] type for frame codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
