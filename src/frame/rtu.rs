// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

use crate::{bytes::Bytes, Result};

/// An RTU request, ready to be written to a serial line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtuRequestFrame {
    pub(crate) station: Station,
    pub(crate) function_code: FunctionCode,
    /// Station, PDU and CRC.
    pub(crate) frame: Bytes,
}

impl RtuRequestFrame {
    #[must_use]
    pub const fn station(&self) -> Station {
        self.station
    }

    #[must_use]
    pub const fn function_code(&self) -> FunctionCode {
        self.function_code
    }

    /// The complete frame including the trailing CRC.
    #[must_use]
    pub fn frame(&self) -> &Bytes {
        &self.frame
    }
}

impl WireFrame for RtuRequestFrame {
    fn as_bytes(&self) -> &[u8] {
        &self.frame
    }
}

/// A parsed RTU response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtuResponseFrame {
    pub(crate) station: Station,
    pub(crate) function_code: FunctionCode,
    pub(crate) payload: Bytes,
    pub(crate) exception: Option<ExceptionCode>,
    pub(crate) raw: Bytes,
}

impl RtuResponseFrame {
    #[must_use]
    pub const fn station(&self) -> Station {
        self.station
    }

    #[must_use]
    pub const fn function_code(&self) -> FunctionCode {
        self.function_code
    }

    /// The function code dependent payload without envelope and CRC.
    ///
    /// - reads (0x01-0x04): the data bytes following the byte count
    /// - writes (0x05, 0x06, 0x0F, 0x10): the echoed address and value/quantity
    /// - anything else: empty
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The exception code of an exception response.
    #[must_use]
    pub const fn exception(&self) -> Option<ExceptionCode> {
        self.exception
    }
}

impl WireFrame for RtuResponseFrame {
    fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

impl ReadResponse for RtuResponseFrame {
    fn function_code(&self) -> FunctionCode {
        self.function_code
    }

    fn payload(&self) -> Result<&[u8]> {
        Ok(&self.payload)
    }
}

/// A raw RTU frame with verified length and CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtuPacket<'a> {
    pub(crate) raw: &'a [u8],
}

impl<'a> RtuPacket<'a> {
    #[must_use]
    pub fn station(&self) -> Station {
        Station(self.raw[0])
    }

    #[must_use]
    pub fn function_code(&self) -> FunctionCode {
        FunctionCode::new(self.raw[1])
    }

    /// Function code and data, without station and CRC.
    #[must_use]
    pub fn pdu(&self) -> &'a [u8] {
        &self.raw[1..self.raw.len() - 2]
    }

    /// The data following the function code, without CRC.
    #[must_use]
    pub fn body(&self) -> &'a [u8] {
        &self.raw[2..self.raw.len() - 2]
    }
}
