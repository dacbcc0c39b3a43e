//! Streaming reader over symbol files
//!
//! Lines are decoded lossily: exported maps are frequently Latin-1 or
//! Shift-JIS, and a stray byte must not cost the rest of the file. A UTF-8
//! byte order mark on the first line is dropped.

use super::parser::{parse_line, RecordKind, SymbolRecord};
use log::debug;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Line tallies gathered while streaming. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCounts {
    pub lines: u64,
    pub directives: u64,
    pub malformed: u64,
}

/// Iterator of parsed records; malformed lines are dropped and counted.
pub struct RecordStream<R> {
    reader: R,
    buf: Vec<u8>,
    counts: LineCounts,
}

impl<R: BufRead> RecordStream<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new(), counts: LineCounts::default() }
    }

    #[must_use]
    pub fn counts(&self) -> LineCounts {
        self.counts
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = io::Result<SymbolRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            self.counts.lines += 1;

            let text = String::from_utf8_lossy(&self.buf);
            let mut line: &str = &text;
            if self.counts.lines == 1 {
                line = line.strip_prefix('\u{feff}').unwrap_or(line);
            }
            match parse_line(line) {
                Some(record) => {
                    if record.kind == RecordKind::Directive {
                        self.counts.directives += 1;
                    }
                    return Some(Ok(record));
                }
                None => {
                    if !line.trim().is_empty() {
                        debug!("line {}: not a symbol line, dropped", self.counts.lines);
                    }
                    self.counts.malformed += 1;
                }
            }
        }
    }
}

/// Open a symbol file for streaming.
///
/// # Errors
/// Returns an error if the file cannot be opened.
pub fn open_symbol_file<P: AsRef<Path>>(path: P) -> io::Result<RecordStream<BufReader<File>>> {
    let file = File::open(path.as_ref())?;
    Ok(RecordStream::new(BufReader::new(file)))
}
