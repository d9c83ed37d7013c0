//! The `record` module defines [`Record`], [`RecordKind`] and [`Purpose`],
//! which represent a single decoded S-record line.

use crate::error::SrecErrorKind;
use std::fmt;

mod layout {
    /// Offset of the first byte-count digit.
    pub const COUNT_POS: usize = 2;
    /// Offset of the first address digit.
    pub const FIELDS_POS: usize = 4;
}

/// Semantic role of a record, derived solely from its type tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Purpose {
    Header,
    Data,
    Count,
    StartAddress,
}

/// The nine standard S-record type tags. `S4` is reserved and rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    S0,
    S1,
    S2,
    S3,
    S5,
    S6,
    S7,
    S8,
    S9,
}

impl RecordKind {
    fn parse(tag: &[u8]) -> Result<Self, SrecErrorKind> {
        match tag {
            b"S0" => Ok(Self::S0),
            b"S1" => Ok(Self::S1),
            b"S2" => Ok(Self::S2),
            b"S3" => Ok(Self::S3),
            b"S5" => Ok(Self::S5),
            b"S6" => Ok(Self::S6),
            b"S7" => Ok(Self::S7),
            b"S8" => Ok(Self::S8),
            b"S9" => Ok(Self::S9),
            _ => Err(SrecErrorKind::UnknownRecordType),
        }
    }

    /// Width of the address field in bytes.
    #[must_use]
    pub const fn address_len(self) -> usize {
        match self {
            Self::S0 | Self::S1 | Self::S5 | Self::S9 => 2,
            Self::S2 | Self::S6 | Self::S8 => 3,
            Self::S3 | Self::S7 => 4,
        }
    }

    /// Semantic role of records with this tag.
    #[must_use]
    pub const fn purpose(self) -> Purpose {
        match self {
            Self::S0 => Purpose::Header,
            Self::S1 | Self::S2 | Self::S3 => Purpose::Data,
            Self::S5 | Self::S6 => Purpose::Count,
            Self::S7 | Self::S8 | Self::S9 => Purpose::StartAddress,
        }
    }

    /// The two-character type tag, e.g. `"S1"`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::S0 => "S0",
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::S3 => "S3",
            Self::S5 => "S5",
            Self::S6 => "S6",
            Self::S7 => "S7",
            Self::S8 => "S8",
            Self::S9 => "S9",
        }
    }
}

/// One decoded S-record line.
///
/// An S-record is an ASCII string of the following structure:
/// `S | Type | Count | Address | Data | Checksum`, where `Count` covers the
/// address, data and checksum bytes, `Address` is 2, 3 or 4 big-endian bytes
/// depending on the type, and `Checksum` is the one's complement of the low
/// byte of the sum of the count, address and data bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: RecordKind,
    pub byte_count: u8,
    pub address: u32,
    pub data: Vec<u8>,
    pub checksum: u8,
}

impl Record {
    /// Decode a single line. Trailing whitespace (including `\r`) is ignored;
    /// a line that is empty after trimming yields `Ok(None)` and must be
    /// skipped silently by the caller.
    ///
    /// The input is raw bytes rather than `&str` so that a (mistakenly)
    /// binary input can still be decoded up to the offending line.
    ///
    /// # Errors
    /// Returns the specific [`SrecErrorKind`] describing the first field
    /// that failed validation.
    pub fn parse(line: &[u8]) -> Result<Option<Self>, SrecErrorKind> {
        let line = trim_end(line);
        if line.is_empty() {
            return Ok(None);
        }
        if line.len() < layout::FIELDS_POS {
            return Err(SrecErrorKind::RecordTruncated);
        }

        let kind = RecordKind::parse(&line[..layout::COUNT_POS])?;

        // Validate all characters past the tag are hexadecimal
        if !line[layout::COUNT_POS..]
            .iter()
            .all(u8::is_ascii_hexdigit)
        {
            return Err(SrecErrorKind::RecordInvalidHexCharacters);
        }

        let byte_count = hex_byte(line[2], line[3]);
        let declared = byte_count as usize;
        let payload_digits = line.len() - layout::FIELDS_POS;
        if payload_digits != declared * 2 {
            return Err(SrecErrorKind::ByteCountMismatch(declared, payload_digits / 2));
        }

        let address_len = kind.address_len();
        if declared < address_len + 1 {
            return Err(SrecErrorKind::ByteCountInvalidForKind(
                kind,
                address_len + 1,
                declared,
            ));
        }

        // Decode everything the count covers: address, data, checksum
        let mut bytes = Vec::with_capacity(declared);
        for pair in line[layout::FIELDS_POS..].chunks_exact(2) {
            bytes.push(hex_byte(pair[0], pair[1]));
        }

        let address = bytes[..address_len]
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
        let checksum = bytes[declared - 1];
        let data = bytes[address_len..declared - 1].to_vec();

        let record = Self {
            kind,
            byte_count,
            address,
            data,
            checksum,
        };
        let calculated = record.calculate_checksum();
        if calculated != checksum {
            return Err(SrecErrorKind::ChecksumMismatch(calculated, checksum));
        }

        Ok(Some(record))
    }

    /// Recompute the checksum from the decoded fields: one's complement of
    /// the low byte of the sum of the count, address and data bytes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn calculate_checksum(&self) -> u8 {
        let mut sum = self.byte_count;
        for shift in (0..self.kind.address_len()).rev() {
            sum = sum.wrapping_add((self.address >> (shift * 8)) as u8);
        }
        for &b in &self.data {
            sum = sum.wrapping_add(b);
        }
        !sum
    }
}

/// Renders the canonical uppercase-hex line the record was decoded from.
impl fmt::Display for Record {
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02X}", self.kind.tag(), self.byte_count)?;
        for shift in (0..self.kind.address_len()).rev() {
            write!(f, "{:02X}", (self.address >> (shift * 8)) as u8)?;
        }
        for b in &self.data {
            write!(f, "{b:02X}")?;
        }
        write!(f, "{:02X}", self.checksum)
    }
}

fn trim_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &line[..end]
}

/// Decode one hex digit pair. Both characters must already be validated
/// as ASCII hex digits.
fn hex_byte(hi: u8, lo: u8) -> u8 {
    (hex_val(hi) << 4) | hex_val(lo)
}

const fn hex_val(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns valid instances of Record
    fn get_valid_struct_records() -> [Record; 5] {
        [
            Record {
                kind: RecordKind::S0,
                byte_count: 0x0F,
                address: 0x0000,
                data: vec![
                    0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x20, 0x20, 0x20, 0x20, 0x20, 0x00, 0x00,
                ],
                checksum: 0x3C,
            },
            Record {
                kind: RecordKind::S1,
                byte_count: 0x11,
                address: 0x0038,
                data: vec![
                    0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x20, 0x77, 0x6F, 0x72, 0x6C, 0x64, 0x2E,
                    0x0A, 0x00,
                ],
                checksum: 0x42,
            },
            Record {
                kind: RecordKind::S2,
                byte_count: 0x0C,
                address: 0x01_0040,
                data: vec![0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7],
                checksum: 0x96,
            },
            Record {
                kind: RecordKind::S5,
                byte_count: 0x03,
                address: 0x0003,
                data: vec![],
                checksum: 0xF9,
            },
            Record {
                kind: RecordKind::S9,
                byte_count: 0x03,
                address: 0x0000,
                data: vec![],
                checksum: 0xFC,
            },
        ]
    }

    /// Returns valid record lines matching `get_valid_struct_records`
    fn get_valid_str_records() -> [&'static str; 5] {
        [
            "S00F000068656C6C6F202020202000003C",
            "S111003848656C6C6F20776F726C642E0A0042",
            "S20C010040A0A1A2A3A4A5A6A796",
            "S5030003F9",
            "S9030000FC",
        ]
    }

    /// Returns invalid record lines and corresponding errors
    fn get_invalid_str_records() -> [(&'static str, SrecErrorKind); 7] {
        [
            // Only the tag and nothing else
            ("S1", SrecErrorKind::RecordTruncated),
            // S4 is reserved
            ("S413000000", SrecErrorKind::UnknownRecordType),
            // Does not start with 'S'
            ("X1130000FF", SrecErrorKind::UnknownRecordType),
            // Char 'Z' is not a hex digit
            ("S105001122ZZ", SrecErrorKind::RecordInvalidHexCharacters),
            // Declared 5 bytes but only 4 present
            ("S10500001122", SrecErrorKind::ByteCountMismatch(5, 4)),
            // Count 2 cannot cover a 2-byte address plus checksum
            (
                "S1020000",
                SrecErrorKind::ByteCountInvalidForKind(RecordKind::S1, 3, 2),
            ),
            // Checksum wrong - should be 0xF9
            ("S5030003F8", SrecErrorKind::ChecksumMismatch(0xF9, 0xF8)),
        ]
    }

    #[test]
    fn test_address_len_lookup() {
        assert_eq!(RecordKind::S0.address_len(), 2);
        assert_eq!(RecordKind::S1.address_len(), 2);
        assert_eq!(RecordKind::S2.address_len(), 3);
        assert_eq!(RecordKind::S3.address_len(), 4);
        assert_eq!(RecordKind::S5.address_len(), 2);
        assert_eq!(RecordKind::S6.address_len(), 3);
        assert_eq!(RecordKind::S7.address_len(), 4);
        assert_eq!(RecordKind::S8.address_len(), 3);
        assert_eq!(RecordKind::S9.address_len(), 2);
    }

    #[test]
    fn test_purpose_lookup() {
        assert_eq!(RecordKind::S0.purpose(), Purpose::Header);
        assert_eq!(RecordKind::S1.purpose(), Purpose::Data);
        assert_eq!(RecordKind::S2.purpose(), Purpose::Data);
        assert_eq!(RecordKind::S3.purpose(), Purpose::Data);
        assert_eq!(RecordKind::S5.purpose(), Purpose::Count);
        assert_eq!(RecordKind::S6.purpose(), Purpose::Count);
        assert_eq!(RecordKind::S7.purpose(), Purpose::StartAddress);
        assert_eq!(RecordKind::S8.purpose(), Purpose::StartAddress);
        assert_eq!(RecordKind::S9.purpose(), Purpose::StartAddress);
    }

    #[test]
    fn test_parse_valid_records() {
        let lines = get_valid_str_records();
        let expected = get_valid_struct_records();
        for (line, record) in lines.iter().zip(expected.iter()) {
            assert_eq!(Record::parse(line.as_bytes()).unwrap().as_ref(), Some(record));
        }
    }

    #[test]
    fn test_parse_invalid_records() {
        let lines_and_errors = get_invalid_str_records();
        for (line, expected_error) in lines_and_errors {
            assert_eq!(Record::parse(line.as_bytes()).unwrap_err(), expected_error);
        }
    }

    #[test]
    fn test_parse_empty_lines() {
        assert_eq!(Record::parse(b"").unwrap(), None);
        assert_eq!(Record::parse(b"\r").unwrap(), None);
        assert_eq!(Record::parse(b"   \t").unwrap(), None);
    }

    #[test]
    fn test_parse_trims_crlf() {
        // Arrange
        let line = b"S9030000FC\r";

        // Act
        let record = Record::parse(line).unwrap();

        // Assert
        assert_eq!(record.map(|r| r.kind), Some(RecordKind::S9));
    }

    #[test]
    fn test_calculate_checksum_matches_declared() {
        let records = get_valid_struct_records();
        for record in records {
            assert_eq!(record.checksum, record.calculate_checksum());
        }
    }

    #[test]
    fn test_display_round_trips() {
        for line in get_valid_str_records() {
            let record = Record::parse(line.as_bytes()).unwrap().unwrap();
            assert_eq!(record.to_string(), line);
        }
    }

    #[test]
    fn test_any_single_digit_mutation_fails() {
        // Arrange. The type tag itself is not covered by the checksum, so
        // the mutation sweep starts at the count field.
        let line = b"S5030003F9";

        for pos in 2..line.len() {
            let mut mutated = line.to_vec();
            mutated[pos] = if mutated[pos] == b'0' { b'1' } else { b'0' };

            // Act
            let res = Record::parse(&mutated);

            // Assert
            assert!(res.is_err(), "mutation at {pos} was accepted");
            if pos >= 4 {
                // Address, data and checksum digits must fail the
                // checksum validation specifically
                assert!(
                    matches!(res, Err(SrecErrorKind::ChecksumMismatch(_, _))),
                    "mutation at {pos} failed with the wrong error"
                );
            }
        }
    }

    #[test]
    fn test_parse_big_addresses() {
        // Arrange
        let s3_line = "S31520000000DEADBEEFDEADBEEFDEADBEEFDEADBEEFEA";
        let s7_line = "S70520000000DA";

        // Act
        let s3 = Record::parse(s3_line.as_bytes()).unwrap().unwrap();
        let s7 = Record::parse(s7_line.as_bytes()).unwrap().unwrap();

        // Assert
        assert_eq!(s3.address, 0x2000_0000);
        assert_eq!(s3.data.len(), 16);
        assert_eq!(s7.address, 0x2000_0000);
        assert!(s7.data.is_empty());
    }
}
