// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! _Modbus_ TCP frames with MBAP header.

pub use crate::{
    codec::tcp::{build_request, build_response, parse_packet, parse_response, ClientCodec},
    frame::tcp::{
        ProtocolId, TcpHeaderFields, TcpRequestFrame, TcpResponseFrame, TransactionId,
        PROTOCOL_ID,
    },
};
