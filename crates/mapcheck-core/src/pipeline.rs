//! CSV in, annotated CSV out.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::verifier::{AnnotatedMapping, MappingRecord, MappingVerifier};
use crate::{Error, Result};

pub const INPUT_HEADER: [&str; 2] = ["source_code", "target_code"];

pub const OUTPUT_HEADER: [&str; 5] = [
    "source_code",
    "target_code",
    "source_display",
    "target_display",
    "mapping_valid",
];

const BOM: char = '\u{feff}';

/// Reader over the input mapping CSV. The header row is checked on
/// construction.
pub struct MappingReader<R> {
    inner: csv::Reader<R>,
}

impl<R: Read> MappingReader<R> {
    pub fn new(rdr: R) -> Result<Self> {
        let mut inner = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(rdr);

        let mut header = csv::StringRecord::new();
        inner.read_record(&mut header)?;
        let found: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, field)| {
                if i == 0 {
                    field.trim_start_matches(BOM).to_string()
                } else {
                    field.to_string()
                }
            })
            .collect();
        if found != INPUT_HEADER {
            return Err(Error::InvalidHeader { found });
        }

        Ok(Self { inner })
    }

    /// Remaining rows in file order. A row with the wrong number of fields is
    /// an error.
    pub fn records(&mut self) -> impl Iterator<Item = Result<MappingRecord>> + '_ {
        self.inner.records().map(|row| {
            let row = row?;
            Ok(MappingRecord {
                source_code: row[0].to_string(),
                target_code: row[1].to_string(),
            })
        })
    }
}

impl MappingReader<File> {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::new(file)
    }
}

/// Writer for the annotated CSV. Every row is flushed as soon as it is
/// written, so a failed run leaves all completed rows on disk.
pub struct AnnotatedWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> AnnotatedWriter<W> {
    pub fn new(wtr: W) -> Result<Self> {
        let mut inner = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(wtr);
        inner.write_record(OUTPUT_HEADER)?;
        inner.flush().map_err(csv::Error::from)?;
        Ok(Self { inner })
    }

    pub fn write(&mut self, row: &AnnotatedMapping) -> Result<()> {
        self.inner.write_record([
            row.source_code.as_str(),
            row.target_code.as_str(),
            row.source_display.as_deref().unwrap_or(""),
            row.target_display.as_deref().unwrap_or(""),
            bool_literal(row.mapping_valid),
        ])?;
        self.inner.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| Error::Csv(csv::Error::from(e.into_error())))
    }
}

fn bool_literal(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Verify every row of `reader` and write it to `writer`, strictly in order.
///
/// `on_row` is called with the 1-based row number before the row is looked
/// up. Returns the number of rows written.
pub async fn annotate<R, W, F>(
    verifier: &MappingVerifier,
    reader: &mut MappingReader<R>,
    writer: &mut AnnotatedWriter<W>,
    mut on_row: F,
) -> Result<usize>
where
    R: Read,
    W: Write,
    F: FnMut(usize, &MappingRecord),
{
    let mut count = 0;
    for record in reader.records() {
        let record = record?;
        count += 1;
        on_row(count, &record);
        let annotated = verifier.verify(&record).await?;
        writer.write(&annotated)?;
    }
    Ok(count)
}

/// File-based [`annotate`]. The input header is checked before the output
/// file is created, so a bad input never leaves an output file behind.
pub async fn annotate_files<F>(
    verifier: &MappingVerifier,
    input: &Path,
    output: &Path,
    on_row: F,
) -> Result<usize>
where
    F: FnMut(usize, &MappingRecord),
{
    let mut reader = MappingReader::from_path(input)?;
    let file = File::create(output).map_err(|e| Error::io(output, e))?;
    let mut writer = AnnotatedWriter::new(file)?;
    let count = annotate(verifier, &mut reader, &mut writer, on_row).await?;
    tracing::info!(rows = count, output = %output.display(), "annotation complete");
    Ok(count)
}
