// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

pub type StationId = u8;

/// A single byte for addressing Modbus devices.
///
/// Called _slave address_ on serial lines and _unit identifier_ in the
/// MBAP header of Modbus TCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Station(pub StationId);

impl From<StationId> for Station {
    fn from(from: StationId) -> Self {
        Station(from)
    }
}

impl From<Station> for StationId {
    fn from(from: Station) -> Self {
        from.0
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:0>2X}", self.0)
    }
}
