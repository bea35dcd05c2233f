//! A pure [Rust](https://www.rust-lang.org)
//! [Modbus](https://en.wikipedia.org/wiki/Modbus) frame codec
//! for RTU and TCP.
//!
//! The crate does no I/O on its own. It turns textual address headers like
//! `1;3;40001` into station, function code and protocol address, builds
//! request frames from them and parses the response frames that come back.
//! Stream framing for [tokio-util](https://docs.rs/tokio-util) is provided
//! by the `ClientCodec` of each transport.
//!
//! ## Installation
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! modbus-frame = "*"
//! ```
//!
//! The transports are selected by the features `rtu` and `tcp`, both are
//! enabled by default.
//!
//! ## Example
//!
//! ```
//! # #[cfg(feature = "rtu")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use modbus_frame::prelude::*;
//!
//! let header = AddressHeader::resolve("1;40001", DataKind::UInt16, false)?;
//! let (station, function_code, address) = (header.station, header.function_code, header.address);
//! let request = rtu::build_request(station, function_code, address, 2, None)?;
//! assert_eq!(request.as_bytes(), &[0x01, 0x03, 0x00, 0x00, 0x00, 0x02, 0xC4, 0x0B]);
//!
//! let response = rtu::parse_response(&[0x01, 0x03, 0x04, 0x00, 0x20, 0x00, 0x00, 0xFB, 0xF9])?;
//! assert_eq!(response.as_register_array()?, vec![0x0020, 0x0000]);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "rtu"))]
//! # fn main() {}
//! ```

pub use bytes;

pub mod prelude;

#[cfg(feature = "rtu")]
pub mod rtu;

#[cfg(feature = "tcp")]
pub mod tcp;

mod address;
pub use self::address::AddressHeader;

#[cfg(any(feature = "rtu", feature = "tcp"))]
mod codec;

mod error;
pub use self::error::{AddressError, CodecError, Result};

mod frame;
#[cfg(any(feature = "rtu", feature = "tcp"))]
pub use self::frame::Frame;
pub use self::frame::{
    Address, DataKind, ExceptionCode, FunctionCode, Quantity, ReadResponse, RegisterKind,
    WireFrame,
};

mod station;
pub use self::station::{Station, StationId};
