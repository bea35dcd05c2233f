// SPDX-FileCopyrightText: Copyright (c) 2017-2023 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::*;

use crate::{bytes::Bytes, codec::response_payload, Result};

pub type TransactionId = u16;
pub type ProtocolId = u16;

/// The protocol identifier of Modbus in the MBAP header.
pub const PROTOCOL_ID: ProtocolId = 0x0000;

/// A Modbus TCP request, ready to be written to a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpRequestFrame {
    pub(crate) transaction_id: TransactionId,
    pub(crate) station: Station,
    pub(crate) function_code: FunctionCode,
    pub(crate) register_address_display: String,
    /// MBAP header and PDU.
    pub(crate) frame: Bytes,
}

impl TcpRequestFrame {
    #[must_use]
    pub const fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    #[must_use]
    pub const fn station(&self) -> Station {
        self.station
    }

    #[must_use]
    pub const fn function_code(&self) -> FunctionCode {
        self.function_code
    }

    /// The 1-based logical form of the requested address, e.g. `40001`.
    ///
    /// Only meant for diagnostics, it is not part of the frame.
    #[must_use]
    pub fn register_address_display(&self) -> &str {
        &self.register_address_display
    }

    #[must_use]
    pub fn frame(&self) -> &Bytes {
        &self.frame
    }
}

impl WireFrame for TcpRequestFrame {
    fn as_bytes(&self) -> &[u8] {
        &self.frame
    }
}

/// A Modbus TCP response, either built by a server or received by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpResponseFrame {
    pub(crate) transaction_id: TransactionId,
    pub(crate) protocol_id: ProtocolId,
    pub(crate) station: Station,
    pub(crate) function_code: FunctionCode,
    /// PDU without the function code.
    pub(crate) data: Bytes,
    pub(crate) frame: Bytes,
}

impl TcpResponseFrame {
    #[must_use]
    pub const fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    #[must_use]
    pub const fn protocol_id(&self) -> ProtocolId {
        self.protocol_id
    }

    #[must_use]
    pub const fn station(&self) -> Station {
        self.station
    }

    #[must_use]
    pub const fn function_code(&self) -> FunctionCode {
        self.function_code
    }

    /// Everything following the function code, e.g. byte count and
    /// register values of a read response.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    #[must_use]
    pub fn frame(&self) -> &Bytes {
        &self.frame
    }

    /// The exception code of an exception response.
    #[must_use]
    pub fn exception(&self) -> Option<ExceptionCode> {
        if !self.function_code.is_exception() {
            return None;
        }
        self.data.first().map(|code| ExceptionCode::new(*code))
    }
}

impl WireFrame for TcpResponseFrame {
    fn as_bytes(&self) -> &[u8] {
        &self.frame
    }
}

impl ReadResponse for TcpResponseFrame {
    fn function_code(&self) -> FunctionCode {
        self.function_code
    }

    fn payload(&self) -> Result<&[u8]> {
        // Offset of the data within the frame: MBAP header and function code
        response_payload(self.function_code, &self.data, 8)
    }
}

/// The fixed fields at the start of a Modbus TCP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeaderFields {
    pub transaction_id: TransactionId,
    pub protocol_id: ProtocolId,
    /// Number of bytes following the length field.
    pub length: u16,
    pub station: Station,
    pub function_code: FunctionCode,
    pub address: Address,
    pub quantity: Quantity,
}
