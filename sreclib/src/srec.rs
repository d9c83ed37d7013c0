//! The `srec` module provides the [`Srec`] struct, a high-level API for
//! working with Motorola S-record files.
//!
//! It parses S-record text into an ordered record vector while capturing the
//! stream metadata (header payload, execution start address) and validating
//! record counts, and hands the records to the image assemblers: a flat
//! gap-filled buffer via [`Srec::to_image`] or lazy page-sized chunks via
//! [`Srec::pages`].

use crate::error::{SrecError, SrecErrorKind};
use crate::image::Image;
use crate::pages::Pages;
use crate::record::{Purpose, Record};
use log::debug;
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Srec {
    /// S-record file path
    pub filepath: PathBuf,
    /// S-record file size in bytes
    pub size: usize,
    /// Payload of the S0 header record, if the stream carries one
    pub header: Option<Vec<u8>>,
    /// Execution start address declared by an S7/S8/S9 record
    pub start_address: Option<u32>,
    /// Decoded records in stream order
    records: Vec<Record>,
}

impl Default for Srec {
    fn default() -> Self {
        Self::new()
    }
}

impl Srec {
    /// Creates an empty `Srec` struct instance.
    ///
    /// # Examples
    /// ```
    /// use sreclib::Srec;
    ///
    /// let srec = Srec::new();
    /// assert_eq!(srec.size, 0);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            filepath: PathBuf::new(),
            size: 0,
            header: None,
            start_address: None,
            records: Vec::new(),
        }
    }

    /// Clears loaded data from the `Srec` struct instance.
    ///
    /// # Examples
    /// ```
    /// use sreclib::Srec;
    ///
    /// let mut srec = Srec::from_srec("tests/fixtures/srec_valid_1.srec").unwrap();
    /// assert_ne!(srec.size, 0);
    ///
    /// srec.clear();
    /// assert_eq!(srec.size, 0);
    /// ```
    pub fn clear(&mut self) {
        self.filepath.clear();
        self.size = 0;
        self.header = None;
        self.start_address = None;
        self.records.clear();
    }

    /// Parse raw S-record text and fill the internal record vector.
    ///
    /// Parsing is fail-fast: the first malformed record aborts the run with
    /// its 1-based physical line number, so that no corrupt image can be
    /// assembled without warning. Blank lines are skipped (but counted, so
    /// reported line numbers match an editor's).
    ///
    /// # Errors
    /// - Returns an error if a record fails syntax or checksum validation
    /// - Returns an error if a count record disagrees with the number of
    ///   data records seen, or a second start address record is encountered
    pub fn parse(&mut self, raw_bytes: &[u8]) -> Result<(), SrecError> {
        let mut data_records: usize = 0;

        for (idx, line) in raw_bytes.split(|&b| b == b'\n').enumerate() {
            let line_no = idx + 1;

            let record = match Record::parse(line) {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(kind) => return Err(SrecError::ParseRecordError(kind, line_no)),
            };
            debug!("line {line_no}: {record}");

            match record.kind.purpose() {
                Purpose::Header => self.header = Some(record.data.clone()),
                Purpose::Data => data_records += 1,
                Purpose::Count => {
                    let declared = record.address as usize;
                    if declared != data_records {
                        return Err(SrecError::ParseRecordError(
                            SrecErrorKind::RecordCountMismatch(declared, data_records),
                            line_no,
                        ));
                    }
                }
                Purpose::StartAddress => {
                    if self.start_address.is_some() {
                        return Err(SrecError::ParseRecordError(
                            SrecErrorKind::DuplicateStartAddress,
                            line_no,
                        ));
                    }
                    self.start_address = Some(record.address);
                }
            }

            self.records.push(record);
        }
        Ok(())
    }

    /// Creates an `Srec` instance and fills it with data from the provided
    /// S-record file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    ///
    /// # Example
    /// ```
    /// use sreclib::Srec;
    ///
    /// let srec = Srec::from_srec("tests/fixtures/srec_valid_1.srec").unwrap();
    /// assert_eq!(srec.size, 230);
    /// ```
    pub fn from_srec<P: AsRef<Path>>(filepath: P) -> Result<Self, Box<dyn Error>> {
        let mut srec = Self::new();
        srec.load_srec(filepath)?;
        Ok(srec)
    }

    /// Fills an `Srec` instance with data from the provided S-record file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    ///
    /// # Example
    /// ```
    /// use sreclib::Srec;
    ///
    /// let mut srec = Srec::new();
    /// srec.load_srec("tests/fixtures/srec_valid_1.srec").unwrap();
    ///
    /// assert_eq!(srec.data_size(), 70);
    /// ```
    pub fn load_srec<P: AsRef<Path>>(&mut self, filepath: P) -> Result<(), Box<dyn Error>> {
        // Read the contents of the file
        let raw_bytes = std::fs::read(&filepath)?;

        // Clear provided Srec instance
        self.clear();

        // Compute the size (in bytes)
        self.size = raw_bytes.len();

        // Load filepath
        self.filepath = filepath.as_ref().to_path_buf();

        // Parse contents
        self.parse(&raw_bytes)?;

        Ok(())
    }

    /// Decoded records in stream order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn data_records(&self) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(|r| r.kind.purpose() == Purpose::Data)
    }

    /// Total number of data bytes across all data records.
    ///
    /// # Example
    /// ```
    /// use sreclib::Srec;
    ///
    /// let srec = Srec::from_srec("tests/fixtures/srec_valid_1.srec").unwrap();
    /// assert_eq!(srec.data_size(), 70);
    /// ```
    #[must_use]
    pub fn data_size(&self) -> usize {
        self.data_records().map(|r| r.data.len()).sum()
    }

    /// Smallest address any data record touches.
    ///
    /// # Example
    /// ```
    /// use sreclib::Srec;
    ///
    /// let srec = Srec::from_srec("tests/fixtures/srec_valid_1.srec").unwrap();
    /// assert_eq!(srec.get_min_addr(), Some(0));
    /// ```
    #[must_use]
    pub fn get_min_addr(&self) -> Option<u32> {
        self.data_records().map(|r| r.address).min()
    }

    /// Highest address any data record touches.
    ///
    /// # Example
    /// ```
    /// use sreclib::Srec;
    ///
    /// let srec = Srec::from_srec("tests/fixtures/srec_valid_1.srec").unwrap();
    /// assert_eq!(srec.get_max_addr(), Some(0x45));
    /// ```
    #[must_use]
    pub fn get_max_addr(&self) -> Option<u32> {
        self.data_records()
            .filter(|r| !r.data.is_empty())
            .map(|r| r.address + r.data.len() as u32 - 1)
            .max()
    }

    /// Assemble the data records into a flat [`Image`]. Gaps take
    /// `fill_byte`; `base_offset` is subtracted from every record address.
    ///
    /// # Errors
    /// Returns an error if a data record's address falls below `base_offset`.
    ///
    /// # Example
    /// ```
    /// use sreclib::Srec;
    ///
    /// let srec = Srec::from_srec("tests/fixtures/srec_valid_1.srec").unwrap();
    /// let image = srec.to_image(0xFF, 0).unwrap();
    ///
    /// assert_eq!(image.len(), 0x46);
    /// assert_eq!(image.bytes_written(), 70);
    /// ```
    pub fn to_image(&self, fill_byte: u8, base_offset: u32) -> Result<Image, SrecError> {
        Image::assemble(&self.records, fill_byte, base_offset)
    }

    /// Lazy iterator over page-sized chunks of the data records.
    /// A `page_size` of `0` selects [`DEFAULT_PAGE_SIZE`](crate::DEFAULT_PAGE_SIZE).
    ///
    /// # Example
    /// ```
    /// use sreclib::Srec;
    ///
    /// let srec = Srec::from_srec("tests/fixtures/srec_valid_1.srec").unwrap();
    /// let pages: Vec<_> = srec.pages(0).collect();
    ///
    /// assert_eq!(pages.len(), 1);
    /// assert_eq!(pages[0].address, 0);
    /// assert_eq!(pages[0].data.len(), 70);
    /// ```
    #[must_use]
    pub fn pages(&self, page_size: usize) -> Pages<'_, std::slice::Iter<'_, Record>> {
        Pages::new(&self.records, page_size)
    }

    /// Assemble and write the flat image to the specified path, creating
    /// parent directories as needed. Gaps are filled with `fill_byte`.
    ///
    /// # Errors
    /// Returns an error if assembly fails or the file cannot be written.
    ///
    /// # Example
    /// ```
    /// use sreclib::Srec;
    ///
    /// let srec = Srec::from_srec("tests/fixtures/srec_valid_1.srec").unwrap();
    /// srec.write_bin("build/ex1/srec.bin", 0xFF);
    ///
    /// assert_eq!(std::fs::metadata("build/ex1/srec.bin").unwrap().len(), 70);
    /// ```
    pub fn write_bin<P: AsRef<Path>>(
        &self,
        filepath: P,
        fill_byte: u8,
    ) -> Result<(), Box<dyn Error>> {
        let image = self.to_image(fill_byte, 0)?;
        image.write(filepath)?;
        Ok(())
    }
}
