// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use tokio_util::codec::{Decoder, Encoder};

use super::*;

use crate::{
    bytes::{BufMut as _, Bytes, BytesMut},
    frame::{
        rtu::{RtuPacket, RtuRequestFrame, RtuResponseFrame},
        ExceptionCode,
    },
    Station,
};

/// Station, function code and CRC.
pub(crate) const MIN_ADU_LEN: usize = 1 + 1 + 2;

const CRC_LEN: usize = 2;

/// Calculate the Modbus CRC16 of `data`.
///
/// Returns the low byte first, which is the order of the CRC on the wire.
#[must_use]
pub fn crc16(data: &[u8]) -> (u8, u8) {
    let [lo, hi] = calc_crc(data).to_le_bytes();
    (lo, hi)
}

/// Check the trailing two CRC bytes of a complete frame.
#[must_use]
pub fn validate_crc(frame: &[u8]) -> bool {
    split_crc(frame).map_or(false, |(data, crc)| calc_crc(data) == crc)
}

fn split_crc(frame: &[u8]) -> Option<(&[u8], u16)> {
    let data_len = frame.len().checked_sub(CRC_LEN)?;
    let (data, crc) = frame.split_at(data_len);
    Some((data, u16::from_le_bytes([crc[0], crc[1]])))
}

fn calc_crc(data: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in data {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            // Moving `crc >>= 1` out of the branches as clippy suggests would
            // change the condition, so the lint stays allowed.
            #[allow(clippy::branches_sharing_code)]
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

fn coil_value(length_or_value: u16) -> u16 {
    // A value of 0 selects 0xFF00.
    if length_or_value == 0 {
        0xFF00
    } else {
        0x0000
    }
}

/// Build an RTU request frame.
///
/// `length_or_value` is the quantity for reads and multiple writes and the
/// value for single writes. For a single coil write `0` encodes `0xFF00`
/// and every other value encodes `0x0000`.
///
/// `data` carries the packed coils of 0x0F and the big-endian register
/// values of 0x10 and is ignored otherwise.
///
/// # Errors
///
/// [`CodecError::UnsupportedFunctionCode`] for function codes other than
/// 0x01-0x06, 0x0F and 0x10, [`CodecError::InvalidDataLength`] if `data`
/// does not match the quantity of a multiple write.
pub fn build_request(
    station: Station,
    function_code: FunctionCode,
    address: Address,
    length_or_value: u16,
    data: Option<&[u8]>,
) -> Result<RtuRequestFrame> {
    let layout = RequestLayout::of(function_code)?;
    let data = data.unwrap_or_default();
    let invalid_data = || CodecError::InvalidDataLength {
        function: function_code,
        len: data.len(),
    };

    let mut buf = BytesMut::with_capacity(MIN_ADU_LEN + 5 + data.len());
    buf.put_u8(station.into());
    buf.put_u8(function_code.value());
    match layout {
        RequestLayout::ReadRange => put_address_quantity(&mut buf, address, length_or_value),
        RequestLayout::SingleCoil => {
            buf.put_u16(address);
            buf.put_u16(coil_value(length_or_value));
        }
        RequestLayout::SingleRegister => {
            buf.put_u16(address);
            buf.put_u16(length_or_value);
        }
        RequestLayout::MultipleCoils => {
            let byte_count = packed_coils_size(length_or_value);
            if data.is_empty() || data.len() != byte_count {
                return Err(invalid_data());
            }
            check_pdu_size(function_code, 6 + byte_count, data.len())?;
            put_address_quantity(&mut buf, address, length_or_value);
            buf.put_u8(u8_len(byte_count));
            buf.put_slice(data);
        }
        RequestLayout::MultipleRegisters => {
            if data.is_empty() || data.len() != usize::from(length_or_value) * 2 {
                return Err(invalid_data());
            }
            check_pdu_size(function_code, 6 + data.len(), data.len())?;
            put_address_quantity(&mut buf, address, length_or_value);
            buf.put_u8(u8_len(data.len()));
            buf.put_slice(data);
        }
    }
    let (crc_lo, crc_hi) = crc16(&buf);
    buf.put_u8(crc_lo);
    buf.put_u8(crc_hi);

    let frame = buf.freeze();
    log::debug!(
        "Built RTU request for station {station}, function {function_code}: {:02X?}",
        &frame[..]
    );
    Ok(RtuRequestFrame {
        station,
        function_code,
        frame,
    })
}

impl<'a> RtuPacket<'a> {
    /// Verify the length and CRC of a raw RTU frame.
    ///
    /// # Errors
    ///
    /// [`CodecError::FrameTooShort`] for less than 4 bytes,
    /// [`CodecError::ChecksumMismatch`] if the CRC does not match.
    pub fn new(raw: &'a [u8]) -> Result<Self> {
        if raw.len() < MIN_ADU_LEN {
            return Err(CodecError::FrameTooShort {
                expected: MIN_ADU_LEN,
                actual: raw.len(),
            });
        }
        if let Some((data, actual)) = split_crc(raw) {
            let expected = calc_crc(data);
            if expected != actual {
                log::warn!("Dropping RTU frame with invalid CRC: {raw:02X?}");
                return Err(CodecError::ChecksumMismatch { expected, actual });
            }
        }
        Ok(Self { raw })
    }
}

/// Parse a complete RTU response frame.
///
/// Responses with a function code other than 0x01-0x06, 0x0F and 0x10 are
/// accepted with an empty payload. Their typed accessors fail.
///
/// # Errors
///
/// [`CodecError::FrameTooShort`] if the frame is shorter than its function
/// code requires and [`CodecError::ChecksumMismatch`] for a corrupted frame.
pub fn parse_response(raw: &[u8]) -> Result<RtuResponseFrame> {
    let packet = RtuPacket::new(raw)?;
    let function_code = packet.function_code();
    // Station and function code precede the body
    let payload = response_payload(function_code, packet.body(), 2)?;
    let exception = if function_code.is_exception() {
        packet.body().first().map(|code| ExceptionCode::new(*code))
    } else {
        None
    };
    let rsp = RtuResponseFrame {
        station: packet.station(),
        function_code,
        payload: Bytes::copy_from_slice(payload),
        exception,
        raw: Bytes::copy_from_slice(raw),
    };
    log::debug!(
        "Parsed RTU response from station {}, function {}",
        rsp.station,
        rsp.function_code
    );
    Ok(rsp)
}

/// Predict the size of a response ADU.
fn response_adu_len(buf: &[u8]) -> Result<Option<usize>> {
    if buf.len() < 2 {
        // incomplete frame
        return Ok(None);
    }
    let pdu_len = response_pdu_len(&buf[1..])?;
    Ok(pdu_len.map(|pdu_len| 1 + pdu_len + CRC_LEN))
}

/// Splits a serial byte stream into response frames and writes requests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClientCodec;

impl Decoder for ClientCodec {
    type Item = RtuResponseFrame;
    type Error = CodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<RtuResponseFrame>> {
        let Some(adu_len) = response_adu_len(buf)? else {
            return Ok(None);
        };
        if buf.len() < adu_len {
            // incomplete frame
            return Ok(None);
        }
        let adu = buf.split_to(adu_len);
        parse_response(&adu).map(Some)
    }
}

impl Encoder<RtuRequestFrame> for ClientCodec {
    type Error = CodecError;

    fn encode(&mut self, request: RtuRequestFrame, buf: &mut BytesMut) -> Result<()> {
        buf.extend_from_slice(&request.frame);
        Ok(())
    }
}
