//! CSV boundary: reading input rows and writing result rows.
//!
//! Column presence is checked once against the header when the reader is
//! opened. After that every row yields a [`SourceRow`] whose parse result is
//! per-row; only I/O and CSV framing errors stop the run.

use crate::{
    error::{
        ParseError,
        SourceError,
    },
    miner::NIBBLE_COUNT,
    pipeline::{
        RecordReport,
        RecordStatus,
    },
    record::{
        InputRecord,
        REQUIRED_COLUMNS,
        RawRecord,
    },
};
use csv::StringRecord;
use std::{
    fs::{
        File,
        OpenOptions,
    },
    io,
    path::Path,
};

/// Output header: `original_hash`, `0`..`f`, `time_microseconds`.
pub fn output_header() -> Vec<String> {
    let mut header = Vec::with_capacity(NIBBLE_COUNT + 2);
    header.push("original_hash".to_string());
    header.extend((0..NIBBLE_COUNT).map(|nibble| format!("{nibble:x}")));
    header.push("time_microseconds".to_string());
    header
}

/// One input row. `original_hash` is the raw `hash` cell so failed rows can
/// still be echoed to the output.
#[derive(Debug, Clone)]
pub struct SourceRow {
    pub row: usize,
    pub original_hash: String,
    pub record: Result<InputRecord, ParseError>,
}

/// Position of each required column in the input header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex([usize; REQUIRED_COLUMNS.len()]);

impl ColumnIndex {
    pub fn from_headers(headers: &StringRecord) -> Result<Self, SourceError> {
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        for (position, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *position = headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or(SourceError::MissingColumn(name))?;
        }
        Ok(Self(positions))
    }

    /// Borrow the required cells of `record`. A row shorter than the header
    /// fails on the first column it does not reach.
    fn raw<'a>(&self, row: usize, record: &'a StringRecord) -> Result<RawRecord<'a>, ParseError> {
        let mut cells = [""; REQUIRED_COLUMNS.len()];
        for ((cell, &position), field) in cells.iter_mut().zip(&self.0).zip(REQUIRED_COLUMNS) {
            *cell = record.get(position).ok_or_else(|| ParseError {
                row,
                field,
                value: String::new(),
                reason: "missing cell".to_string(),
            })?;
        }
        let [
            hash,
            nonce,
            to,
            gas_fee_cap,
            blob_gas_fee_cap,
            gas_tip_cap,
            r,
            s,
            v,
            blob_versioned_hashes,
        ] = cells;
        Ok(RawRecord {
            hash,
            nonce,
            to,
            gas_fee_cap,
            blob_gas_fee_cap,
            gas_tip_cap,
            r,
            s,
            v,
            blob_versioned_hashes,
        })
    }

    /// The `hash` cell as written, empty if the row does not reach it.
    fn hash_cell<'a>(&self, record: &'a StringRecord) -> &'a str {
        record.get(self.0[0]).unwrap_or_default()
    }
}

pub struct RecordReader<R> {
    reader: csv::Reader<R>,
    columns: ColumnIndex,
}

impl RecordReader<File> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Self::from_reader(File::open(path)?)
    }
}

impl<R: io::Read> RecordReader<R> {
    /// Wrap `input` and validate its header.
    pub fn from_reader(input: R) -> Result<Self, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);
        let columns = ColumnIndex::from_headers(reader.headers()?)?;
        Ok(Self { reader, columns })
    }

    pub fn columns(&self) -> ColumnIndex {
        self.columns
    }

    /// Read every remaining row. Rows are numbered from 1, header excluded.
    pub fn read_all(&mut self) -> Result<Vec<SourceRow>, SourceError> {
        let columns = self.columns;
        let mut rows = Vec::new();
        for (i, record) in self.reader.records().enumerate() {
            let record = record?;
            let row = i + 1;
            rows.push(SourceRow {
                row,
                original_hash: columns.hash_cell(&record).trim().to_string(),
                record: columns
                    .raw(row, &record)
                    .and_then(|raw| InputRecord::parse(row, &raw)),
            });
        }
        Ok(rows)
    }
}

pub struct ResultWriter<W: io::Write> {
    writer: csv::Writer<W>,
}

impl ResultWriter<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Self::new(File::create(path)?)
    }
}

impl<W: io::Write> ResultWriter<W> {
    /// Wrap `output` and write the header row.
    pub fn new(output: W) -> Result<Self, SourceError> {
        let mut writer = csv::Writer::from_writer(output);
        writer.write_record(output_header())?;
        Ok(Self { writer })
    }

    /// Write one result row. Unfilled nibble slots and the time of failed
    /// records are left empty.
    pub fn write_report(&mut self, report: &RecordReport) -> Result<(), SourceError> {
        self.writer.write_record(result_cells(report))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SourceError> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, SourceError> {
        self.writer
            .into_inner()
            .map_err(|e| SourceError::Io(e.into_error()))
    }
}

fn result_cells(report: &RecordReport) -> Vec<String> {
    let mut cells = Vec::with_capacity(NIBBLE_COUNT + 2);
    cells.push(report.original_hash.clone());

    match report.status.mined() {
        Some(mined) => {
            cells.extend(
                mined
                    .nibbles
                    .slots()
                    .iter()
                    .map(|slot| slot.map(|hit| hit.hash.to_string()).unwrap_or_default()),
            );
            cells.push(mined.elapsed.as_micros().to_string());
        }
        None => {
            debug_assert!(matches!(report.status, RecordStatus::Failed(_)));
            cells.extend(std::iter::repeat_n(String::new(), NIBBLE_COUNT + 1));
        }
    }

    cells
}

/// Append `record` to an input file, writing the header first if the file is
/// new or empty.
pub fn append_input_record(path: impl AsRef<Path>, record: &InputRecord) -> Result<(), SourceError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer.write_record(REQUIRED_COLUMNS)?;
    }
    writer.write_record(record.to_cells())?;
    writer.flush()?;
    Ok(())
}
