// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Function code dispatch shared by the RTU and TCP codecs.
//!
//! Each concern has exactly one table keyed by function code:
//! the request PDU layout, the rule for extracting the payload of a
//! response and the prediction of the response PDU length.

use crate::{
    bytes::{BufMut as _, BytesMut},
    error::CodecError,
    frame::{Address, FunctionCode, Quantity},
    Result,
};

#[cfg(feature = "rtu")]
pub(crate) mod rtu;

#[cfg(feature = "tcp")]
pub(crate) mod tcp;

/// Maximum request/response PDU size.
///
/// As defined by the protocol for both RTU and TCP.
pub(crate) const MAX_PDU_SIZE: usize = 253;

#[cfg(feature = "tcp")]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn u16_len(len: usize) -> u16 {
    // This type conversion should always be safe, because either
    // the caller is responsible to pass a valid usize or the
    // possible values are limited by the protocol.
    debug_assert!(len <= u16::MAX.into());
    len as u16
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn u8_len(len: usize) -> u8 {
    // See above.
    debug_assert!(len <= u8::MAX.into());
    len as u8
}

/// Shape of the PDU that follows the function code of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestLayout {
    /// Starting address and quantity (0x01-0x04).
    ReadRange,
    /// Address and coil state (0x05).
    SingleCoil,
    /// Address and register value (0x06).
    SingleRegister,
    /// Address, quantity, byte count and packed coils (0x0F).
    MultipleCoils,
    /// Address, quantity, byte count and register values (0x10).
    MultipleRegisters,
}

impl RequestLayout {
    pub(crate) fn of(function: FunctionCode) -> Result<Self> {
        use FunctionCode::*;
        let layout = match function {
            ReadCoils | ReadDiscreteInputs | ReadHoldingRegisters | ReadInputRegisters => {
                Self::ReadRange
            }
            WriteSingleCoil => Self::SingleCoil,
            WriteSingleRegister => Self::SingleRegister,
            WriteMultipleCoils => Self::MultipleCoils,
            WriteMultipleRegisters => Self::MultipleRegisters,
            Custom(_) => return Err(CodecError::UnsupportedFunctionCode(function)),
        };
        Ok(layout)
    }
}

/// Location of the payload within a response PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PayloadRule {
    /// A byte count followed by that many data bytes (0x01-0x04).
    ByteCounted,
    /// Echoed address and value or quantity, 4 bytes (0x05, 0x06, 0x0F, 0x10).
    Echo,
    /// Nothing is extracted.
    Opaque,
}

impl PayloadRule {
    pub(crate) const fn of(function: FunctionCode) -> Self {
        use FunctionCode::*;
        match function {
            ReadCoils | ReadDiscreteInputs | ReadHoldingRegisters | ReadInputRegisters => {
                Self::ByteCounted
            }
            WriteSingleCoil | WriteSingleRegister | WriteMultipleCoils
            | WriteMultipleRegisters => Self::Echo,
            Custom(_) => Self::Opaque,
        }
    }
}

/// Size of the echoed part of write responses.
const ECHO_LEN: usize = 4;

/// Extract the payload from the body of a response PDU, i.e. everything
/// following the function code.
///
/// `offset` is the number of frame bytes preceding `body` and is only used
/// for reporting a truncated frame.
pub(crate) fn response_payload(
    function: FunctionCode,
    body: &[u8],
    offset: usize,
) -> Result<&[u8]> {
    let range = match PayloadRule::of(function) {
        PayloadRule::ByteCounted => {
            let Some(byte_count) = body.first() else {
                return Err(CodecError::FrameTooShort {
                    expected: offset + 1,
                    actual: offset,
                });
            };
            1..1 + usize::from(*byte_count)
        }
        PayloadRule::Echo => 0..ECHO_LEN,
        PayloadRule::Opaque => 0..0,
    };
    if body.len() < range.end {
        return Err(CodecError::FrameTooShort {
            expected: offset + range.end,
            actual: offset + body.len(),
        });
    }
    Ok(&body[range])
}

/// Predict the length of a response PDU from its first bytes.
///
/// `Ok(None)` means that more bytes are needed.
#[cfg(feature = "rtu")]
pub(crate) fn response_pdu_len(pdu: &[u8]) -> Result<Option<usize>> {
    let Some(fn_code) = pdu.first() else {
        return Ok(None);
    };
    let function = FunctionCode::new(*fn_code);
    let len = match PayloadRule::of(function) {
        PayloadRule::ByteCounted => pdu.get(1).map(|byte_count| 2 + usize::from(*byte_count)),
        PayloadRule::Echo => Some(1 + ECHO_LEN),
        // Function code with high bit and exception code
        PayloadRule::Opaque if function.is_exception() => Some(2),
        PayloadRule::Opaque => return Err(CodecError::UnsupportedFunctionCode(function)),
    };
    Ok(len)
}

pub(crate) fn put_address_quantity(buf: &mut BytesMut, address: Address, quantity: Quantity) {
    buf.put_u16(address);
    buf.put_u16(quantity);
}

#[cfg(feature = "rtu")]
pub(crate) fn packed_coils_size(quantity: Quantity) -> usize {
    (usize::from(quantity) + 7) / 8
}

/// Refuse data that cannot be carried by a single PDU.
pub(crate) fn check_pdu_size(
    function: FunctionCode,
    pdu_len: usize,
    data_len: usize,
) -> Result<()> {
    if pdu_len > MAX_PDU_SIZE {
        return Err(CodecError::InvalidDataLength {
            function,
            len: data_len,
        });
    }
    Ok(())
}
