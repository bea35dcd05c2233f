// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use byteorder::{BigEndian, ByteOrder as _};

use super::FunctionCode;
use crate::{error::CodecError, Result};

/// Typed access to the payload of a read response.
///
/// Implemented by the response frames of both transports. The payload is
/// the data part of the response without byte count, envelope or checksum.
pub trait ReadResponse {
    /// The function code echoed by the response.
    fn function_code(&self) -> FunctionCode;

    /// The function code dependent payload.
    ///
    /// # Errors
    ///
    /// [`CodecError::FrameTooShort`] if the response is truncated.
    fn payload(&self) -> Result<&[u8]>;

    /// Expand the payload of a coil or discrete input read into single bits.
    ///
    /// Each byte yields 8 values, least significant bit first. The response
    /// carries no quantity, so trailing padding bits are included.
    ///
    /// # Errors
    ///
    /// [`CodecError::WrongResponseKind`] for any other function code or the
    /// error of [`ReadResponse::payload()`].
    fn as_bit_array(&self) -> Result<Vec<bool>> {
        match self.function_code() {
            FunctionCode::ReadCoils | FunctionCode::ReadDiscreteInputs => {
                Ok(unpack_bits(self.payload()?))
            }
            function => Err(CodecError::WrongResponseKind {
                function,
                expected: "bits",
            }),
        }
    }

    /// Pair the payload of a register read into big-endian 16 bit words.
    ///
    /// # Errors
    ///
    /// [`CodecError::WrongResponseKind`] for any other function code and
    /// [`CodecError::InvalidDataLength`] if the payload has an odd length.
    fn as_register_array(&self) -> Result<Vec<u16>> {
        match self.function_code() {
            function @ (FunctionCode::ReadHoldingRegisters | FunctionCode::ReadInputRegisters) => {
                let payload = self.payload()?;
                if payload.len() % 2 != 0 {
                    return Err(CodecError::InvalidDataLength {
                        function,
                        len: payload.len(),
                    });
                }
                Ok(payload.chunks_exact(2).map(BigEndian::read_u16).collect())
            }
            function => Err(CodecError::WrongResponseKind {
                function,
                expected: "registers",
            }),
        }
    }
}

fn unpack_bits(bytes: &[u8]) -> Vec<bool> {
    let mut res = Vec::with_capacity(bytes.len() * 8);
    for byte in bytes {
        for i in 0..8 {
            res.push((byte >> i) & 0b1 > 0);
        }
    }
    res
}
