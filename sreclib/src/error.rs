//! The `error` module defines the [`SrecError`] enum that describes the errors
//! that can occur when parsing S-record files or assembling their data records
//! into an image. It carries the two pieces of information a user needs:
//! 1. What kind of error was encountered (via [`SrecErrorKind`]).
//! 2. Where it happened, e.g. at which line of the S-record file decoding failed.

use crate::record::RecordKind;
use std::error::Error;
use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum SrecError {
    ParseRecordError(SrecErrorKind, usize),
    AssembleError(SrecErrorKind),
}

impl fmt::Display for SrecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseRecordError(base_err, line) => {
                write!(
                    f,
                    "Error encountered during record parsing at line #{line} of the S-record file:\n{base_err}",
                )
            }
            Self::AssembleError(base_err) => {
                write!(
                    f,
                    "Error encountered during image assembly:\n{base_err}",
                )
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SrecErrorKind {
    /// Record is shorter than the smallest decodable `S<type><count>`
    RecordTruncated,
    /// Record does not start with one of the nine valid type tags
    UnknownRecordType,
    /// Record contains non-hexadecimal characters past the type tag
    RecordInvalidHexCharacters,
    /// Record's declared byte count does not match the characters present
    ByteCountMismatch(usize, usize),
    /// Record's declared byte count cannot cover the address and checksum
    ByteCountInvalidForKind(RecordKind, usize, usize),
    /// Record checksum mismatch
    ChecksumMismatch(u8, u8),
    /// Record address falls below the configured base offset
    AddressUnderflow(u32, u32),
    /// Encountered second start address record
    DuplicateStartAddress,
    /// Count record disagrees with the number of data records seen
    RecordCountMismatch(usize, usize),
}

impl fmt::Display for SrecErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordTruncated => {
                write!(f, "Truncated record")
            }
            Self::UnknownRecordType => {
                write!(f, "Unknown record type")
            }
            Self::RecordInvalidHexCharacters => {
                write!(f, "Record contains invalid hex digit(s)")
            }
            Self::ByteCountMismatch(declared, actual) => {
                write!(
                    f,
                    "Byte count mismatch - declared: {declared} bytes, found: {actual}"
                )
            }
            Self::ByteCountInvalidForKind(kind, minimum, actual) => {
                write!(
                    f,
                    "For record type {} minimum byte count is {minimum}, found {actual}",
                    kind.tag()
                )
            }
            Self::ChecksumMismatch(calculated, declared) => {
                write!(
                    f,
                    "Invalid record checksum - expected: 0x{calculated:02X}, found: 0x{declared:02X}"
                )
            }
            Self::AddressUnderflow(address, offset) => {
                write!(
                    f,
                    "Record address 0x{address:X} underflows base offset 0x{offset:X}"
                )
            }
            Self::DuplicateStartAddress => {
                write!(f, "Encountered second start address record")
            }
            Self::RecordCountMismatch(declared, actual) => {
                write!(
                    f,
                    "Record count mismatch - declared: {declared}, found: {actual} data records"
                )
            }
        }
    }
}

impl Error for SrecError {}
impl Error for SrecErrorKind {}
