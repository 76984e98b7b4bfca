// buffered-source
// Copyright (c) 2026 The buffered-source Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by this crate.
#[derive(Debug)]
pub enum Error {
    /// An IO error occurred while reading or seeking the underlying stream.
    IoError(io::Error),
    /// The source was exhausted before the requested amount of data became available.
    InsufficientData(&'static str),
    /// The buffer cannot hold enough context for the operation to make progress.
    BufferTooSmall(&'static str),
    /// A configuration invariant of a source was violated.
    InvariantViolation(&'static str),
    /// Buffered data could not be decoded.
    DecodeError(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::IoError(ref err) => {
                write!(f, "io error: {}", err)
            }
            Error::InsufficientData(msg) => {
                write!(f, "insufficient data: {}", msg)
            }
            Error::BufferTooSmall(msg) => {
                write!(f, "buffer too small: {}", msg)
            }
            Error::InvariantViolation(msg) => {
                write!(f, "invariant violation: {}", msg)
            }
            Error::DecodeError(msg) => {
                write!(f, "decode error: {}", msg)
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::IoError(err) => err,
            Error::InsufficientData(_) => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            _ => io::Error::new(io::ErrorKind::Other, err),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create an insufficient data error.
pub fn insufficient_data_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::InsufficientData(desc))
}

/// Convenience function to create a buffer too small error.
pub fn buffer_too_small_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::BufferTooSmall(desc))
}

/// Convenience function to create an invariant violation error.
pub fn invariant_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::InvariantViolation(desc))
}

/// Convenience function to create a decode error.
pub fn decode_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::DecodeError(desc))
}
