// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of human-readable address strings.
//!
//! Two notations are accepted, selected by the number of `;` separated
//! fields:
//!
//! - *standard*: `station;function_code;address`, e.g. `1;0x03;40001`
//! - *enhanced*: `station;address`, e.g. `1;40001`, where the function
//!   code is inferred from the register type and the intended access.
//!
//! The address field is either a logical address with a register type
//! prefix (`1` coil, `2` discrete input, `3` input register, `4` holding
//! register) followed by the 1-based register number, or a plain 0-based
//! protocol address.

use std::str::FromStr;

use crate::{
    error::AddressError,
    frame::{Address, DataKind, FunctionCode, RegisterKind},
    Station,
};

/// A resolved request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressHeader {
    pub station: Station,
    pub function_code: FunctionCode,
    /// Always the 0-based protocol address.
    pub address: Address,
}

impl AddressHeader {
    #[must_use]
    pub const fn new(station: Station, function_code: FunctionCode, address: Address) -> Self {
        Self {
            station,
            function_code,
            address,
        }
    }

    /// Resolve an address string.
    ///
    /// `data_kind` and `is_write` are only considered when the function
    /// code has to be inferred (enhanced notation).
    ///
    /// # Errors
    ///
    /// [`AddressError::MalformedHeader`] for a wrong number of fields or an
    /// unparsable component, [`AddressError::ReadOnlyRegister`] for a write
    /// to a discrete input or input register.
    pub fn resolve(
        header: &str,
        data_kind: DataKind,
        is_write: bool,
    ) -> Result<Self, AddressError> {
        let fields: Vec<&str> = header.split(';').collect();
        let resolved = match fields.as_slice() {
            [station, function_code, address] => {
                let station = parse_byte(station).ok_or_else(|| malformed(header))?;
                let function_code = parse_byte(function_code).ok_or_else(|| malformed(header))?;
                let (_, address) = parse_address(address).ok_or_else(|| malformed(header))?;
                Self::new(station.into(), FunctionCode::new(function_code), address)
            }
            [station, address] => {
                let station = parse_byte(station).ok_or_else(|| malformed(header))?;
                let (kind, address) = parse_address(address).ok_or_else(|| malformed(header))?;
                let kind = kind.unwrap_or(RegisterKind::HoldingRegister);
                let function_code = infer_function_code(kind, data_kind, is_write)?;
                Self::new(station.into(), function_code, address)
            }
            _ => return Err(malformed(header)),
        };
        log::trace!("Resolved {header:?} into {resolved:?}");
        Ok(resolved)
    }

    /// Resolve an address string, discarding the reason of a failure.
    #[must_use]
    pub fn parse(header: &str, data_kind: DataKind, is_write: bool) -> Option<Self> {
        Self::resolve(header, data_kind, is_write).ok()
    }
}

/// Resolves the address for reading a single register value.
impl FromStr for AddressHeader {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s, DataKind::UInt16, false)
    }
}

fn malformed(header: &str) -> AddressError {
    AddressError::MalformedHeader {
        header: header.to_owned(),
    }
}

/// Decimal or `0x` prefixed hexadecimal byte.
fn parse_byte(field: &str) -> Option<u8> {
    match field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
            u8::from_str_radix(hex, 16).ok()
        }
        Some(_) => None,
        None => parse_digits(field),
    }
}

/// Only ASCII digits, no sign.
fn parse_digits<T: FromStr>(field: &str) -> Option<T> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// A logical address with register type, or else a plain protocol address.
fn parse_address(field: &str) -> Option<(Option<RegisterKind>, Address)> {
    if let Some((kind, address)) = parse_logical_address(field) {
        return Some((Some(kind), address));
    }
    parse_digits(field).map(|address| (None, address))
}

fn parse_logical_address(field: &str) -> Option<(RegisterKind, Address)> {
    let mut chars = field.chars();
    let kind = RegisterKind::from_prefix(chars.next()?)?;
    let number: u32 = parse_digits(chars.as_str())?;
    if !(1..=u32::from(u16::MAX)).contains(&number) {
        return None;
    }
    let address = Address::try_from(number - 1).ok()?;
    Some((kind, address))
}

fn infer_function_code(
    kind: RegisterKind,
    data_kind: DataKind,
    is_write: bool,
) -> Result<FunctionCode, AddressError> {
    if !is_write {
        return Ok(kind.read_function_code());
    }
    if !kind.is_writable() {
        return Err(AddressError::ReadOnlyRegister(kind));
    }
    let function_code = match kind {
        RegisterKind::Coil => FunctionCode::WriteSingleCoil,
        _ if data_kind.is_wide() => FunctionCode::WriteMultipleRegisters,
        _ => FunctionCode::WriteSingleRegister,
    };
    Ok(function_code)
}
