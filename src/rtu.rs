// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! _Modbus_ RTU frames for serial lines.

pub use crate::{
    codec::rtu::{build_request, crc16, parse_response, validate_crc, ClientCodec},
    frame::rtu::{RtuPacket, RtuRequestFrame, RtuResponseFrame},
};
