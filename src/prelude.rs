// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types and traits

///////////////////////////////////////////////////////////////////
/// Modules
///////////////////////////////////////////////////////////////////
#[cfg(feature = "rtu")]
pub use crate::rtu;

#[cfg(feature = "tcp")]
pub use crate::tcp;

///////////////////////////////////////////////////////////////////
/// Types
///////////////////////////////////////////////////////////////////
pub use crate::{AddressHeader, DataKind, FunctionCode, RegisterKind};
pub use crate::{AddressError, CodecError, ExceptionCode};
pub use crate::{Station, StationId};

#[cfg(any(feature = "rtu", feature = "tcp"))]
pub use crate::Frame;

///////////////////////////////////////////////////////////////////
/// Traits
///////////////////////////////////////////////////////////////////
pub use crate::{ReadResponse, WireFrame};
