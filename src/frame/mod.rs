// SPDX-FileCopyrightText: Copyright (c) 2017-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#[cfg(feature = "rtu")]
pub(crate) mod rtu;

#[cfg(feature = "tcp")]
pub(crate) mod tcp;

mod data;

pub use self::data::ReadResponse;

use std::fmt;

#[cfg(any(feature = "rtu", feature = "tcp"))]
use crate::Station;

/// A Modbus function code.
///
/// Only the eight codes for reading and writing coils, discrete inputs and
/// registers are supported by the frame codecs. Every other byte value is
/// kept as [`FunctionCode::Custom`] so that it can still be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCode {
    /// 01 (0x01) Read Coils.
    ReadCoils,

    /// 02 (0x02) Read Discrete Inputs
    ReadDiscreteInputs,

    /// 03 (0x03) Read Holding Registers
    ReadHoldingRegisters,

    /// 04 (0x04) Read Input Registers
    ReadInputRegisters,

    /// 05 (0x05) Write Single Coil
    WriteSingleCoil,

    /// 06 (0x06) Write Single Register
    WriteSingleRegister,

    /// 15 (0x0F) Write Multiple Coils
    WriteMultipleCoils,

    /// 16 (0x10) Write Multiple Registers
    WriteMultipleRegisters,

    /// Any other function code, including exception responses.
    Custom(u8),
}

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x02 => Self::ReadDiscreteInputs,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x05 => Self::WriteSingleCoil,
            0x06 => Self::WriteSingleRegister,
            0x0F => Self::WriteMultipleCoils,
            0x10 => Self::WriteMultipleRegisters,
            code => Self::Custom(code),
        }
    }

    /// Gets the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::ReadDiscreteInputs => 0x02,
            Self::ReadHoldingRegisters => 0x03,
            Self::ReadInputRegisters => 0x04,
            Self::WriteSingleCoil => 0x05,
            Self::WriteSingleRegister => 0x06,
            Self::WriteMultipleCoils => 0x0F,
            Self::WriteMultipleRegisters => 0x10,
            Self::Custom(code) => code,
        }
    }

    /// `true` for the function codes both frame codecs can build.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Exception responses echo the function code with the high bit set.
    #[must_use]
    pub const fn is_exception(self) -> bool {
        self.value() >= 0x80
    }

    /// The register table a function code operates on.
    #[must_use]
    pub const fn register_kind(self) -> Option<RegisterKind> {
        match self {
            Self::ReadCoils | Self::WriteSingleCoil | Self::WriteMultipleCoils => {
                Some(RegisterKind::Coil)
            }
            Self::ReadDiscreteInputs => Some(RegisterKind::DiscreteInput),
            Self::ReadHoldingRegisters
            | Self::WriteSingleRegister
            | Self::WriteMultipleRegisters => Some(RegisterKind::HoldingRegister),
            Self::ReadInputRegisters => Some(RegisterKind::InputRegister),
            Self::Custom(_) => None,
        }
    }

    /// Render a protocol address in the 1-based logical notation of the
    /// register table addressed by this function code, e.g. `40001` for
    /// holding register `0`.
    ///
    /// Unknown function codes render the plain protocol address.
    #[must_use]
    pub fn display_address(self, address: Address) -> String {
        match self.register_kind() {
            Some(kind) => kind.display_address(address).to_string(),
            None => address.to_string(),
        }
    }
}

impl From<u8> for FunctionCode {
    fn from(from: u8) -> Self {
        Self::new(from)
    }
}

impl From<FunctionCode> for u8 {
    fn from(from: FunctionCode) -> Self {
        from.value()
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value().fmt(f)
    }
}

/// A Modbus protocol address is represented by 16 bit from `0` to `65535`.
///
/// This *protocol address* uses 0-based indexing, while the *logical
/// address* shown to users (e.g. `40001`) uses 1-based indexing with a
/// register type prefix.
pub type Address = u16;

/// Number of items to process.
pub type Quantity = u16;

/// The four Modbus data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterKind {
    /// Single bit, read/write.
    Coil,
    /// Single bit, read-only.
    DiscreteInput,
    /// 16 bit, read/write.
    HoldingRegister,
    /// 16 bit, read-only.
    InputRegister,
}

impl RegisterKind {
    /// Select the register table from the leading digit of a logical address.
    #[must_use]
    pub const fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '1' => Some(Self::Coil),
            '2' => Some(Self::DiscreteInput),
            '3' => Some(Self::InputRegister),
            '4' => Some(Self::HoldingRegister),
            _ => None,
        }
    }

    #[must_use]
    pub const fn read_function_code(self) -> FunctionCode {
        match self {
            Self::Coil => FunctionCode::ReadCoils,
            Self::DiscreteInput => FunctionCode::ReadDiscreteInputs,
            Self::HoldingRegister => FunctionCode::ReadHoldingRegisters,
            Self::InputRegister => FunctionCode::ReadInputRegisters,
        }
    }

    /// Discrete inputs and input registers are read-only.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Coil | Self::HoldingRegister)
    }

    /// The 1-based logical address of a 0-based protocol address.
    #[must_use]
    pub const fn display_address(self, address: Address) -> u32 {
        let offset = match self {
            Self::Coil => 1,
            Self::DiscreteInput => 10_001,
            Self::InputRegister => 30_001,
            Self::HoldingRegister => 40_001,
        };
        address as u32 + offset
    }
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Coil => "coil",
            Self::DiscreteInput => "discrete input",
            Self::HoldingRegister => "holding register",
            Self::InputRegister => "input register",
        };
        f.write_str(name)
    }
}

/// The value type a caller intends to read or write.
///
/// Only relevant when the function code of a write is inferred: values
/// that fit into a single register use the single-register write, all
/// wider types use a multiple-register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Bool,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
}

impl DataKind {
    /// Number of 16 bit registers occupied by a value of this type.
    #[must_use]
    pub const fn register_count(self) -> Quantity {
        match self {
            Self::Bool | Self::Int16 | Self::UInt16 => 1,
            Self::Int32 | Self::UInt32 | Self::Float => 2,
            Self::Int64 | Self::UInt64 | Self::Double => 4,
        }
    }

    /// `true` if a value spans more than one register.
    #[must_use]
    pub const fn is_wide(self) -> bool {
        self.register_count() > 1
    }
}

/// A server (slave) exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionCode {
    /// 0x01
    IllegalFunction,
    /// 0x02
    IllegalDataAddress,
    /// 0x03
    IllegalDataValue,
    /// 0x04
    ServerDeviceFailure,
    /// 0x05
    Acknowledge,
    /// 0x06
    ServerDeviceBusy,
    /// 0x08
    MemoryParityError,
    /// 0x0A
    GatewayPathUnavailable,
    /// 0x0B
    GatewayTargetDevice,
    /// None of the above.
    Custom(u8),
}

impl ExceptionCode {
    /// Create a new [`ExceptionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        use ExceptionCode::*;

        match value {
            0x01 => IllegalFunction,
            0x02 => IllegalDataAddress,
            0x03 => IllegalDataValue,
            0x04 => ServerDeviceFailure,
            0x05 => Acknowledge,
            0x06 => ServerDeviceBusy,
            0x08 => MemoryParityError,
            0x0A => GatewayPathUnavailable,
            0x0B => GatewayTargetDevice,
            other => Custom(other),
        }
    }

    fn description(self) -> &'static str {
        use ExceptionCode::*;

        match self {
            IllegalFunction => "Illegal function",
            IllegalDataAddress => "Illegal data address",
            IllegalDataValue => "Illegal data value",
            ServerDeviceFailure => "Server device failure",
            Acknowledge => "Acknowledge",
            ServerDeviceBusy => "Server device busy",
            MemoryParityError => "Memory parity error",
            GatewayPathUnavailable => "Gateway path unavailable",
            GatewayTargetDevice => "Gateway target device failed to respond",
            Custom(_) => "Custom",
        }
    }
}

impl From<ExceptionCode> for u8 {
    fn from(from: ExceptionCode) -> Self {
        use ExceptionCode::*;

        match from {
            IllegalFunction => 0x01,
            IllegalDataAddress => 0x02,
            IllegalDataValue => 0x03,
            ServerDeviceFailure => 0x04,
            Acknowledge => 0x05,
            ServerDeviceBusy => 0x06,
            MemoryParityError => 0x08,
            GatewayPathUnavailable => 0x0A,
            GatewayTargetDevice => 0x0B,
            Custom(code) => code,
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Access to the encoded bytes of a frame.
///
/// This is the only operation all frame kinds have in common.
pub trait WireFrame {
    /// The complete frame as sent or received on the wire.
    fn as_bytes(&self) -> &[u8];
}

/// Any frame produced or consumed by the codecs.
#[cfg(any(feature = "rtu", feature = "tcp"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    #[cfg(feature = "rtu")]
    RtuRequest(rtu::RtuRequestFrame),
    #[cfg(feature = "rtu")]
    RtuResponse(rtu::RtuResponseFrame),
    #[cfg(feature = "tcp")]
    TcpRequest(tcp::TcpRequestFrame),
    #[cfg(feature = "tcp")]
    TcpResponse(tcp::TcpResponseFrame),
}

#[cfg(any(feature = "rtu", feature = "tcp"))]
impl Frame {
    #[must_use]
    pub fn station(&self) -> Station {
        match self {
            #[cfg(feature = "rtu")]
            Self::RtuRequest(frame) => frame.station(),
            #[cfg(feature = "rtu")]
            Self::RtuResponse(frame) => frame.station(),
            #[cfg(feature = "tcp")]
            Self::TcpRequest(frame) => frame.station(),
            #[cfg(feature = "tcp")]
            Self::TcpResponse(frame) => frame.station(),
        }
    }

    #[must_use]
    pub fn function_code(&self) -> FunctionCode {
        match self {
            #[cfg(feature = "rtu")]
            Self::RtuRequest(frame) => frame.function_code(),
            #[cfg(feature = "rtu")]
            Self::RtuResponse(frame) => frame.function_code(),
            #[cfg(feature = "tcp")]
            Self::TcpRequest(frame) => frame.function_code(),
            #[cfg(feature = "tcp")]
            Self::TcpResponse(frame) => frame.function_code(),
        }
    }
}

#[cfg(any(feature = "rtu", feature = "tcp"))]
impl WireFrame for Frame {
    fn as_bytes(&self) -> &[u8] {
        match self {
            #[cfg(feature = "rtu")]
            Self::RtuRequest(frame) => frame.as_bytes(),
            #[cfg(feature = "rtu")]
            Self::RtuResponse(frame) => frame.as_bytes(),
            #[cfg(feature = "tcp")]
            Self::TcpRequest(frame) => frame.as_bytes(),
            #[cfg(feature = "tcp")]
            Self::TcpResponse(frame) => frame.as_bytes(),
        }
    }
}

#[cfg(feature = "rtu")]
impl From<rtu::RtuRequestFrame> for Frame {
    fn from(from: rtu::RtuRequestFrame) -> Self {
        Self::RtuRequest(from)
    }
}

#[cfg(feature = "rtu")]
impl From<rtu::RtuResponseFrame> for Frame {
    fn from(from: rtu::RtuResponseFrame) -> Self {
        Self::RtuResponse(from)
    }
}

#[cfg(feature = "tcp")]
impl From<tcp::TcpRequestFrame> for Frame {
    fn from(from: tcp::TcpRequestFrame) -> Self {
        Self::TcpRequest(from)
    }
}

#[cfg(feature = "tcp")]
impl From<tcp::TcpResponseFrame> for Frame {
    fn from(from: tcp::TcpResponseFrame) -> Self {
        Self::TcpResponse(from)
    }
}
