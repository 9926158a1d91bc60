use crate::constants::INPUT_SEPARATOR;
use crate::errors::{AppError, AppResult};
use crate::source::SourceArchive;
use polars::prelude::*;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};
use zip::read::ZipFile;

/// Reads a whole archive entry as a single batch.
///
/// The entry is decoded as UTF-8 with malformed sequences replaced by U+FFFD,
/// then parsed as tab-separated values with a header row. Every column is read
/// as text.
///
/// # Errors
///
/// Returns `ParseError` for an entry without a header line.
pub fn read_whole<R: Read + Seek>(
    archive: &mut SourceArchive<R>,
    entry_name: &str,
) -> AppResult<DataFrame> {
    let mut chunks = read_chunks(archive, entry_name, usize::MAX)?;
    chunks.next().unwrap_or_else(|| Err(missing_header(entry_name)))
}

/// Error for an entry that has no header line to read columns from.
pub fn missing_header(entry_name: &str) -> AppError {
    AppError::ParseError(format!("Entry {entry_name} has no header row"))
}

/// Reads an archive entry lazily in batches of at most `chunk_size` rows.
///
/// Decoding rules are the same as [`read_whole`]. Each batch is built only when
/// the iterator is advanced and nothing is kept after it is yielded, so peak
/// memory is bounded by one chunk. The last batch may be smaller. A
/// header-only entry yields exactly one empty batch carrying the header columns.
pub fn read_chunks<'a, R: Read + Seek>(
    archive: &'a mut SourceArchive<R>,
    entry_name: &str,
    chunk_size: usize,
) -> AppResult<ChunkReader<ZipFile<'a>>> {
    let entry = archive.open_entry(entry_name)?;
    ChunkReader::new(entry, chunk_size)
}

/// Forward-only iterator of TSV batches over any byte stream.
pub struct ChunkReader<R> {
    lines: BufReader<R>,
    header: Option<String>,
    chunk_size: usize,
    buf: Vec<u8>,
    rows_read: usize,
    yielded: bool,
    exhausted: bool,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R, chunk_size: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::InvalidInput(
                "Chunk size must be greater than 0".into(),
            ));
        }

        let mut chunks = Self {
            lines: BufReader::new(reader),
            header: None,
            chunk_size,
            buf: Vec::new(),
            rows_read: 0,
            yielded: false,
            exhausted: false,
        };
        chunks.header = chunks.next_line()?;
        chunks.exhausted = chunks.header.is_none();
        Ok(chunks)
    }

    /// Data rows read so far, across every yielded batch.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Next non-empty line, without its line terminator.
    fn next_line(&mut self) -> AppResult<Option<String>> {
        loop {
            self.buf.clear();
            let read = self
                .lines
                .read_until(b'\n', &mut self.buf)
                .map_err(|e| AppError::IoError(format!("Failed to read entry: {e}")))?;
            if read == 0 {
                return Ok(None);
            }

            let line = String::from_utf8_lossy(&self.buf);
            let line = line.trim_end_matches(['\n', '\r']);
            // Separator-only lines are rows of missing values, not blank lines
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    fn next_batch(&mut self) -> AppResult<Option<DataFrame>> {
        let Some(header) = self.header.as_deref() else {
            return Ok(None);
        };
        let header = header.to_string();

        let mut rows = Vec::with_capacity(self.chunk_size.min(4096));
        while rows.len() < self.chunk_size {
            match self.next_line()? {
                Some(line) => rows.push(line),
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        if rows.is_empty() && self.yielded {
            return Ok(None);
        }

        self.rows_read += rows.len();
        self.yielded = true;
        parse_tsv(&header, &rows).map(Some)
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = AppResult<DataFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted && (self.yielded || self.header.is_none()) {
            return None;
        }

        match self.next_batch() {
            Ok(Some(df)) => Some(Ok(df)),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(e) => {
                self.exhausted = true;
                self.yielded = true;
                Some(Err(e))
            }
        }
    }
}

/// Parses one header line plus data lines into an all-text DataFrame.
fn parse_tsv(header: &str, rows: &[String]) -> AppResult<DataFrame> {
    if rows.is_empty() {
        return empty_with_header(header);
    }

    let mut text = String::with_capacity(
        header.len() + 1 + rows.iter().map(|r| r.len() + 1).sum::<usize>(),
    );
    text.push_str(header);
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }

    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|parse| parse.with_separator(INPUT_SEPARATOR));

    options
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()
        .map_err(|e| AppError::ParseError(format!("Failed to parse TSV batch: {e}")))
}

fn empty_with_header(header: &str) -> AppResult<DataFrame> {
    let columns = header
        .split(INPUT_SEPARATOR as char)
        .map(|name| Series::new(name.trim_matches('"'), Vec::<Option<String>>::new()))
        .collect::<Vec<_>>();

    DataFrame::new(columns)
        .map_err(|e| AppError::ParseError(format!("Failed to create DataFrame: {e}")))
}
