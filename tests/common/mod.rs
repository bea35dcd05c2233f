// SPDX-FileCopyrightText: Copyright (c) 2017-2024 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Big-endian register values as sent on the wire.
pub fn register_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|value| value.to_be_bytes()).collect()
}
