// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented framing: read bytes, split on `\n`, retain any trailing
//! partial line in the caller's buffer. This module owns only the
//! buffer-splitting; socket I/O lives in `crate::transport`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("connection closed")]
    Closed,
    #[error("line is not valid UTF-8")]
    NotUtf8,
}

/// Pull one complete `\n`-terminated line out of `buf`, if any, removing
/// it (and the newline) from the front of `buf`. Returns `None` when the
/// buffer holds only a partial line.
pub fn read_line(buf: &mut Vec<u8>) -> Result<Option<String>, ReadError> {
    let Some(pos) = buf.iter().position(|&b| b == b'\n') else {
        return Ok(None);
    };
    let line_bytes: Vec<u8> = buf.drain(..=pos).collect();
    let line = &line_bytes[..line_bytes.len() - 1];
    String::from_utf8(line.to_vec())
        .map(Some)
        .map_err(|_| ReadError::NotUtf8)
}
