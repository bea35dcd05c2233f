// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use byteorder::{BigEndian, ByteOrder as _};
use tokio_util::codec::{Decoder, Encoder};

use super::*;

use crate::{
    bytes::{BufMut as _, Bytes, BytesMut},
    frame::tcp::{
        ProtocolId, TcpHeaderFields, TcpRequestFrame, TcpResponseFrame, TransactionId,
        PROTOCOL_ID,
    },
    Station,
};

/// Transaction id, protocol id, length and unit id.
const HEADER_LEN: usize = 7;

/// MBAP header, function code, starting address and quantity.
const MIN_REQUEST_LEN: usize = 12;

/// MBAP header and function code.
const MIN_RESPONSE_LEN: usize = HEADER_LEN + 1;

/// Build a Modbus TCP request frame.
///
/// `length` is the quantity for reads and writes of multiple coils. The
/// value of a single write is taken from the first two bytes of `data` and
/// the quantity of a multiple register write is derived from `data`.
///
/// # Errors
///
/// [`CodecError::UnsupportedFunctionCode`] for function codes other than
/// 0x01-0x06, 0x0F and 0x10, [`CodecError::InvalidDataLength`] if `data`
/// is missing or does not fit the function code.
pub fn build_request(
    transaction_id: TransactionId,
    station: Station,
    function_code: FunctionCode,
    address: Address,
    length: Quantity,
    data: Option<&[u8]>,
) -> Result<TcpRequestFrame> {
    let layout = RequestLayout::of(function_code)?;
    let data = data.unwrap_or_default();
    let invalid_data = || CodecError::InvalidDataLength {
        function: function_code,
        len: data.len(),
    };

    let mut pdu = BytesMut::with_capacity(6 + data.len());
    pdu.put_u8(function_code.value());
    match layout {
        RequestLayout::ReadRange => put_address_quantity(&mut pdu, address, length),
        RequestLayout::SingleCoil | RequestLayout::SingleRegister => {
            let Some(value) = data.get(..2) else {
                return Err(invalid_data());
            };
            pdu.put_u16(address);
            pdu.put_slice(value);
        }
        RequestLayout::MultipleCoils => {
            if data.is_empty() {
                return Err(invalid_data());
            }
            check_pdu_size(function_code, 6 + data.len(), data.len())?;
            put_address_quantity(&mut pdu, address, length);
            pdu.put_u8(u8_len(data.len()));
            pdu.put_slice(data);
        }
        RequestLayout::MultipleRegisters => {
            if data.is_empty() || data.len() % 2 != 0 {
                return Err(invalid_data());
            }
            check_pdu_size(function_code, 6 + data.len(), data.len())?;
            put_address_quantity(&mut pdu, address, u16_len(data.len() / 2));
            pdu.put_u8(u8_len(data.len()));
            pdu.put_slice(data);
        }
    }

    let mut buf = BytesMut::with_capacity(HEADER_LEN - 1 + pdu.len());
    put_header(&mut buf, transaction_id, PROTOCOL_ID, station, pdu.len());
    buf.put_slice(&pdu);
    let frame = buf.freeze();
    log::debug!(
        "Built TCP request #{transaction_id} for station {station}, \
         function {function_code}: {:02X?}",
        &frame[..]
    );
    Ok(TcpRequestFrame {
        transaction_id,
        station,
        function_code,
        register_address_display: function_code.display_address(address),
        frame,
    })
}

/// Build a Modbus TCP response frame as sent by a server.
///
/// `data` is everything following the function code, e.g. the byte count
/// and register values of a read response.
///
/// # Errors
///
/// [`CodecError::InvalidDataLength`] if function code and `data` exceed
/// the 253 bytes of a PDU.
pub fn build_response(
    transaction_id: TransactionId,
    protocol_id: ProtocolId,
    station: Station,
    function_code: FunctionCode,
    data: &[u8],
) -> Result<TcpResponseFrame> {
    check_pdu_size(function_code, 1 + data.len(), data.len())?;
    let mut buf = BytesMut::with_capacity(MIN_RESPONSE_LEN + data.len());
    put_header(&mut buf, transaction_id, protocol_id, station, 1 + data.len());
    buf.put_u8(function_code.value());
    buf.put_slice(data);
    let frame = buf.freeze();
    log::debug!(
        "Built TCP response #{transaction_id} for station {station}, function {function_code}"
    );
    Ok(TcpResponseFrame {
        transaction_id,
        protocol_id,
        station,
        function_code,
        data: frame.slice(MIN_RESPONSE_LEN..),
        frame,
    })
}

/// The MBAP header, whose length field counts the unit id and the PDU.
fn put_header(
    buf: &mut BytesMut,
    transaction_id: TransactionId,
    protocol_id: ProtocolId,
    station: Station,
    pdu_len: usize,
) {
    buf.put_u16(transaction_id);
    buf.put_u16(protocol_id);
    buf.put_u16(u16_len(pdu_len + 1));
    buf.put_u8(station.into());
}

/// Parse the fixed fields of a Modbus TCP request.
///
/// # Errors
///
/// [`CodecError::FrameTooShort`] for less than 12 bytes.
pub fn parse_packet(raw: &[u8]) -> Result<TcpHeaderFields> {
    if raw.len() < MIN_REQUEST_LEN {
        return Err(CodecError::FrameTooShort {
            expected: MIN_REQUEST_LEN,
            actual: raw.len(),
        });
    }
    Ok(TcpHeaderFields {
        transaction_id: BigEndian::read_u16(&raw[0..2]),
        protocol_id: BigEndian::read_u16(&raw[2..4]),
        length: BigEndian::read_u16(&raw[4..6]),
        station: Station(raw[6]),
        function_code: FunctionCode::new(raw[7]),
        address: BigEndian::read_u16(&raw[8..10]),
        quantity: BigEndian::read_u16(&raw[10..12]),
    })
}

/// Number of bytes of a complete frame according to its MBAP header.
fn frame_len(raw: &[u8]) -> Option<usize> {
    raw.get(4..6)
        .map(|len| HEADER_LEN - 1 + usize::from(BigEndian::read_u16(len)))
}

/// Parse a Modbus TCP response frame as received by a client.
///
/// Bytes beyond the length announced in the MBAP header are ignored.
///
/// # Errors
///
/// [`CodecError::FrameTooShort`] if the header is incomplete, announces
/// less than unit id and function code, or announces more bytes than given.
pub fn parse_response(raw: &[u8]) -> Result<TcpResponseFrame> {
    let too_short = |expected| CodecError::FrameTooShort {
        expected,
        actual: raw.len(),
    };
    let len = frame_len(raw).ok_or_else(|| too_short(MIN_RESPONSE_LEN))?;
    if len < MIN_RESPONSE_LEN {
        return Err(too_short(MIN_RESPONSE_LEN));
    }
    if raw.len() < len {
        return Err(too_short(len));
    }
    let frame = Bytes::copy_from_slice(&raw[..len]);
    let protocol_id = BigEndian::read_u16(&frame[2..4]);
    if protocol_id != PROTOCOL_ID {
        log::warn!("Unexpected protocol id 0x{protocol_id:04X} in TCP response");
    }
    let rsp = TcpResponseFrame {
        transaction_id: BigEndian::read_u16(&frame[0..2]),
        protocol_id,
        station: Station(frame[6]),
        function_code: FunctionCode::new(frame[7]),
        data: frame.slice(MIN_RESPONSE_LEN..),
        frame,
    };
    log::debug!(
        "Parsed TCP response #{} from station {}, function {}",
        rsp.transaction_id,
        rsp.station,
        rsp.function_code
    );
    Ok(rsp)
}

/// Splits a TCP byte stream into response frames and writes requests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClientCodec;

impl Decoder for ClientCodec {
    type Item = TcpResponseFrame;
    type Error = CodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<TcpResponseFrame>> {
        if buf.len() < HEADER_LEN {
            return Ok(None);
        }
        let Some(len) = frame_len(buf) else {
            return Ok(None);
        };
        if buf.len() < len {
            return Ok(None);
        }
        let frame = buf.split_to(len);
        parse_response(&frame).map(Some)
    }
}

impl Encoder<TcpRequestFrame> for ClientCodec {
    type Error = CodecError;

    fn encode(&mut self, request: TcpRequestFrame, buf: &mut BytesMut) -> Result<()> {
        buf.extend_from_slice(&request.frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::frame::{ExceptionCode, ReadResponse as _, WireFrame as _};

    use super::*;

    mod build_request {
        use super::*;

        fn build(fn_code: u8, address: u16, length: u16, data: Option<&[u8]>) -> TcpRequestFrame {
            build_request(0x1234, Station(0x11), FunctionCode::new(fn_code), address, length, data)
                .unwrap()
        }

        #[test]
        fn read_holding_registers() {
            let req = build_request(
                1,
                Station(1),
                FunctionCode::ReadHoldingRegisters,
                0,
                2,
                None,
            )
            .unwrap();
            assert_eq!(
                req.as_bytes(),
                &[0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x03, 0x00, 0x00, 0x00, 0x02]
            );
            assert_eq!(req.transaction_id(), 1);
            assert_eq!(req.station(), Station(1));
            assert_eq!(req.register_address_display(), "40001");
        }

        #[test]
        fn read_requests() {
            for (fn_code, display) in [
                (0x01, "20"),
                (0x02, "10020"),
                (0x03, "40020"),
                (0x04, "30020"),
            ] {
                let req = build(fn_code, 19, 0x0025, None);
                assert_eq!(
                    req.as_bytes(),
                    &[0x12, 0x34, 0x00, 0x00, 0x00, 0x06, 0x11, fn_code, 0x00, 0x13, 0x00, 0x25]
                );
                assert_eq!(req.register_address_display(), display);
            }
        }

        #[test]
        fn write_single_coil() {
            let req = build(0x05, 0x00AC, 0, Some(&[0xFF, 0x00]));
            assert_eq!(
                req.as_bytes(),
                &[0x12, 0x34, 0x00, 0x00, 0x00, 0x06, 0x11, 0x05, 0x00, 0xAC, 0xFF, 0x00]
            );
            assert_eq!(req.register_address_display(), "173");
        }

        #[test]
        fn write_single_register() {
            let req = build(0x06, 0x0001, 0, Some(&[0x00, 0x03, 0x99]));
            assert_eq!(
                req.as_bytes(),
                &[0x12, 0x34, 0x00, 0x00, 0x00, 0x06, 0x11, 0x06, 0x00, 0x01, 0x00, 0x03]
            );
        }

        #[test]
        fn single_write_without_value() {
            for fn_code in [0x05, 0x06] {
                for data in [None, Some(&[][..]), Some(&[0x01][..])] {
                    let err = build_request(1, Station(1), FunctionCode::new(fn_code), 0, 1, data)
                        .unwrap_err();
                    assert!(matches!(err, CodecError::InvalidDataLength { .. }));
                }
            }
        }

        #[test]
        fn write_multiple_coils() {
            let req = build(0x0F, 0x0013, 10, Some(&[0xCD, 0x01]));
            assert_eq!(
                req.as_bytes(),
                &[
                    0x12, 0x34, 0x00, 0x00, 0x00, 0x09, 0x11, 0x0F, 0x00, 0x13, 0x00, 0x0A, 0x02,
                    0xCD, 0x01
                ]
            );
        }

        #[test]
        fn write_multiple_coils_without_data() {
            for data in [None, Some(&[][..])] {
                let err = build_request(1, Station(1), FunctionCode::WriteMultipleCoils, 0, 8, data)
                    .unwrap_err();
                assert!(matches!(err, CodecError::InvalidDataLength { len: 0, .. }));
            }
        }

        #[test]
        fn write_multiple_registers() {
            // The quantity is derived from the data.
            let req = build(0x10, 0x0001, 99, Some(&[0x00, 0x0A, 0x01, 0x02]));
            assert_eq!(
                req.as_bytes(),
                &[
                    0x12, 0x34, 0x00, 0x00, 0x00, 0x0B, 0x11, 0x10, 0x00, 0x01, 0x00, 0x02, 0x04,
                    0x00, 0x0A, 0x01, 0x02
                ]
            );
            assert_eq!(req.register_address_display(), "40002");
        }

        #[test]
        fn write_multiple_registers_with_invalid_data() {
            for data in [None, Some(&[][..]), Some(&[0x00, 0x0A, 0x01][..])] {
                let err =
                    build_request(1, Station(1), FunctionCode::WriteMultipleRegisters, 0, 2, data)
                        .unwrap_err();
                assert!(matches!(err, CodecError::InvalidDataLength { .. }));
            }
        }

        #[test]
        fn unsupported_function_code() {
            for fn_code in [0x00, 0x07, 0x11, 0x16, 0x17, 0x2B] {
                let err = build_request(1, Station(1), FunctionCode::new(fn_code), 0, 1, None)
                    .unwrap_err();
                assert!(matches!(err, CodecError::UnsupportedFunctionCode(_)));
            }
        }

        #[test]
        fn transaction_id_wraps_into_header() {
            let req = build_request(u16::MAX, Station(1), FunctionCode::ReadCoils, 0, 1, None)
                .unwrap();
            assert_eq!(req.as_bytes()[..2], [0xFF, 0xFF]);
        }
    }

    mod build_response {
        use super::*;

        #[test]
        fn read_holding_registers() {
            let rsp = build_response(
                7,
                0,
                Station(1),
                FunctionCode::ReadHoldingRegisters,
                &[0x04, 0x00, 0x0A, 0x01, 0x02],
            )
            .unwrap();
            assert_eq!(
                rsp.as_bytes(),
                &[0x00, 0x07, 0x00, 0x00, 0x00, 0x07, 0x01, 0x03, 0x04, 0x00, 0x0A, 0x01, 0x02]
            );
            assert_eq!(rsp.transaction_id(), 7);
            assert_eq!(rsp.protocol_id(), 0);
            assert_eq!(rsp.data().as_ref(), &[0x04, 0x00, 0x0A, 0x01, 0x02]);
            assert_eq!(rsp.as_register_array().unwrap(), vec![0x000A, 0x0102]);
        }

        #[test]
        fn exception() {
            let rsp =
                build_response(1, 0, Station(1), FunctionCode::new(0x83), &[0x02]).unwrap();
            assert_eq!(
                rsp.as_bytes(),
                &[0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x01, 0x83, 0x02]
            );
            assert_eq!(rsp.exception(), Some(ExceptionCode::IllegalDataAddress));
        }

        #[test]
        fn keeps_protocol_id() {
            let rsp = build_response(
                1,
                0x0102,
                Station(1),
                FunctionCode::ReadCoils,
                &[0x01, 0x05],
            )
            .unwrap();
            assert_eq!(rsp.as_bytes()[2..4], [0x01, 0x02]);
            assert_eq!(
                rsp.as_bit_array().unwrap(),
                vec![true, false, true, false, false, false, false, false]
            );
        }

        #[test]
        fn refuse_oversized_data() {
            // Function code and 252 bytes fill a PDU
            let data = vec![0; 252];
            let rsp = build_response(1, 0, Station(1), FunctionCode::ReadHoldingRegisters, &data)
                .unwrap();
            assert_eq!(rsp.as_bytes().len(), 7 + 253);
            assert_eq!(rsp.as_bytes()[4..6], [0x00, 0xFE]);

            for len in [253, 300, 70_000] {
                let data = vec![0; len];
                let err =
                    build_response(1, 0, Station(1), FunctionCode::ReadHoldingRegisters, &data)
                        .unwrap_err();
                let CodecError::InvalidDataLength { len: actual, .. } = &err else {
                    panic!("unexpected error: {err}");
                };
                assert_eq!(*actual, len);
            }
        }
    }

    mod parse_packet {
        use super::*;

        #[test]
        fn read_request() {
            let raw = [
                0x00, 0x11, 0x00, 0x00, 0x00, 0x06, 0x66, 0x04, 0x00, 0x23, 0x00, 0x05,
            ];
            let fields = parse_packet(&raw).unwrap();
            assert_eq!(
                fields,
                TcpHeaderFields {
                    transaction_id: 0x11,
                    protocol_id: 0,
                    length: 6,
                    station: Station(0x66),
                    function_code: FunctionCode::ReadInputRegisters,
                    address: 0x23,
                    quantity: 5,
                }
            );
        }

        #[test]
        fn built_request() {
            let req = build_request(
                0xABCD,
                Station(3),
                FunctionCode::WriteMultipleRegisters,
                0x0100,
                0,
                Some(&[0x00, 0x01, 0x00, 0x02, 0x00, 0x03]),
            )
            .unwrap();
            let fields = parse_packet(req.as_bytes()).unwrap();
            assert_eq!(fields.transaction_id, 0xABCD);
            assert_eq!(fields.length, 13);
            assert_eq!(fields.station, Station(3));
            assert_eq!(fields.function_code, FunctionCode::WriteMultipleRegisters);
            assert_eq!(fields.address, 0x0100);
            assert_eq!(fields.quantity, 3);
        }

        #[test]
        fn too_short() {
            let raw = [0x00, 0x11, 0x00, 0x00, 0x00, 0x06, 0x66, 0x04, 0x00, 0x23, 0x00];
            assert!(matches!(
                parse_packet(&raw),
                Err(CodecError::FrameTooShort {
                    expected: 12,
                    actual: 11
                })
            ));
        }
    }

    mod parse_response {
        use super::*;

        #[test]
        fn read_input_registers() {
            let raw = [
                0x00, 0x05, 0x00, 0x00, 0x00, 0x05, 0x01, 0x04, 0x02, 0x12, 0x34,
            ];
            let rsp = parse_response(&raw).unwrap();
            assert_eq!(rsp.transaction_id(), 5);
            assert_eq!(rsp.station(), Station(1));
            assert_eq!(rsp.function_code(), FunctionCode::ReadInputRegisters);
            assert_eq!(rsp.data().as_ref(), &[0x02, 0x12, 0x34]);
            assert_eq!(rsp.as_register_array().unwrap(), vec![0x1234]);
        }

        #[test]
        fn ignores_trailing_bytes() {
            let raw = [
                0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x06, 0x00, 0x01, 0x00, 0x03, 0xEE,
            ];
            let rsp = parse_response(&raw).unwrap();
            assert_eq!(rsp.as_bytes().len(), 12);
            assert_eq!(rsp.data().as_ref(), &[0x00, 0x01, 0x00, 0x03]);
        }

        #[test]
        fn truncated() {
            assert!(matches!(
                parse_response(&[0x00, 0x01, 0x00, 0x00, 0x00]),
                Err(CodecError::FrameTooShort { .. })
            ));
            // Length announces more than available
            assert!(matches!(
                parse_response(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x05, 0x01, 0x03, 0x02]),
                Err(CodecError::FrameTooShort {
                    expected: 11,
                    actual: 9
                })
            ));
            // Length without function code
            assert!(matches!(
                parse_response(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x01, 0x03]),
                Err(CodecError::FrameTooShort { expected: 8, .. })
            ));
        }

        #[test]
        fn truncated_payload() {
            // Byte count exceeds the data
            let raw = [0x00, 0x01, 0x00, 0x00, 0x00, 0x04, 0x01, 0x03, 0x04, 0x00];
            let rsp = parse_response(&raw).unwrap();
            assert!(matches!(
                rsp.as_register_array(),
                Err(CodecError::FrameTooShort {
                    expected: 13,
                    actual: 10
                })
            ));
        }

        #[test]
        fn round_trip_with_build_response() {
            let built = build_response(
                0x0102,
                0,
                Station(0xFF),
                FunctionCode::ReadDiscreteInputs,
                &[0x02, 0x01, 0x80],
            )
            .unwrap();
            let parsed = parse_response(built.as_bytes()).unwrap();
            assert_eq!(parsed, built);
        }
    }

    mod client_codec {
        use super::*;

        #[test]
        fn decode_header_fragment() {
            let mut codec = ClientCodec;
            let mut buf = BytesMut::from(&[0x00, 0x11, 0x00, 0x00, 0x00, 0x00][..]);
            let res = codec.decode(&mut buf).unwrap();
            assert!(res.is_none());
            assert_eq!(buf.len(), 6);
        }

        #[test]
        fn decode_partly_received_message() {
            let mut codec = ClientCodec;
            let mut buf = BytesMut::from(
                &[
                    0x00, // transaction id HI
                    0x11, // transaction id LO
                    0x00, // protocol id HI
                    0x00, // protocol id LO
                    0x00, // length HI
                    0x03, // length LO
                    0x66, // unit id
                    0x02,
                ][..],
            );
            let res = codec.decode(&mut buf).unwrap();
            assert!(res.is_none());
            assert_eq!(buf.len(), 8);
        }

        #[test]
        fn decode_exception_message() {
            let mut codec = ClientCodec;
            let mut buf = BytesMut::from(
                &[
                    0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x66, 0x82, // exception = 0x80 + 0x02
                    0x03, 0x00,
                ][..],
            );
            let rsp = codec.decode(&mut buf).unwrap().unwrap();
            assert_eq!(buf.len(), 1);
            assert_eq!(rsp.station(), Station(0x66));
            assert_eq!(rsp.exception(), Some(ExceptionCode::IllegalDataValue));
        }

        #[test]
        fn encode_read_request() {
            let mut codec = ClientCodec;
            let mut buf = BytesMut::new();
            let req = build_request(0, Station(0), FunctionCode::ReadInputRegisters, 0x23, 5, None)
                .unwrap();
            codec.encode(req.clone(), &mut buf).unwrap();
            assert_eq!(&buf[..7], &[0x00, 0x00, 0x00, 0x00, 0x00, 0x06, 0x00]);
            assert_eq!(&buf[..], &req.frame()[..]);
        }
    }
}
