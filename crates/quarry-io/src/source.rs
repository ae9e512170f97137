use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ByteRecord, Trim};
use encoding_rs::WINDOWS_1252;

use crate::SourceError;

/// One record's raw, untyped fields.
pub type Fields = Vec<String>;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Pull-based reader over comma-delimited text.
///
/// Quoted fields may embed commas, doubled quotes and newlines. Unquoted fields are trimmed.
/// Records may have any number of fields. A single empty field produced by a trailing comma is
/// dropped. Bytes that are not valid UTF-8 are decoded as Windows-1252.
pub struct RowSource {
    reader: csv::Reader<Box<dyn Read + Send>>,
    record: ByteRecord,
    path: PathBuf,
    records_read: u64,
}

impl RowSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SourceError::io(path, e))?;
        Ok(Self::build(Box::new(BufReader::new(file)), path.to_path_buf()))
    }

    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self::build(Box::new(reader), PathBuf::from("<reader>"))
    }

    fn build(reader: Box<dyn Read + Send>, path: PathBuf) -> Self {
        let reader = csv::ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        Self {
            reader,
            record: ByteRecord::new(),
            path,
            records_read: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records returned so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Read the next record, or `Ok(None)` at end of input.
    pub fn next_record(&mut self) -> Result<Option<Fields>, SourceError> {
        self.record.clear();
        match self.reader.read_byte_record(&mut self.record) {
            Ok(false) => Ok(None),
            Ok(true) => {
                let first = self.records_read == 0;
                self.records_read += 1;
                Ok(Some(decode_record(&self.record, first)))
            }
            Err(err) => Err(SourceError::from_csv(
                &self.path,
                err,
                self.records_read + 1,
            )),
        }
    }
}

impl Iterator for RowSource {
    type Item = Fields;

    fn next(&mut self) -> Option<Fields> {
        match self.next_record() {
            Ok(fields) => fields,
            Err(err) => {
                log::warn!("stopping read: {err}");
                None
            }
        }
    }
}

/// First record of `path`, or `None` for an empty file.
pub fn open_header(path: impl AsRef<Path>) -> Result<Option<Fields>, SourceError> {
    RowSource::open(path)?.next_record()
}

fn decode_record(record: &ByteRecord, first: bool) -> Fields {
    let mut out: Fields = record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let field = if first && idx == 0 {
                field.strip_prefix(UTF8_BOM).unwrap_or(field)
            } else {
                field
            };
            decode_field(field).into_owned()
        })
        .collect();

    if out.len() > 1 && out.last().is_some_and(|f| f.is_empty()) {
        out.pop();
    }
    out
}

fn decode_field(field: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(field) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (cow, _, _) = WINDOWS_1252.decode(field);
            cow
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read_all(input: &'static [u8]) -> Vec<Fields> {
        RowSource::from_reader(input).collect()
    }

    #[test]
    fn quoted_fields_keep_delimiters_quotes_and_newlines() {
        let rows = read_all(b"a,\"b,c\",\"say \"\"hi\"\"\"\n\"multi\nline\",x\n");
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b,c".to_string(), "say \"hi\"".to_string()],
                vec!["multi\nline".to_string(), "x".to_string()],
            ]
        );
    }

    #[test]
    fn trailing_delimiter_is_suppressed_and_fields_trimmed() {
        let rows = read_all(b" a , b ,\r\nc\n");
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()]
            ]
        );
    }

    #[test]
    fn bom_is_stripped_and_latin1_decoded() {
        let rows = read_all(b"\xEF\xBB\xBFCountry Name,Caf\xE9\n");
        assert_eq!(
            rows,
            vec![vec!["Country Name".to_string(), "Caf\u{e9}".to_string()]]
        );
    }

    #[test]
    fn varying_field_counts_are_allowed() {
        let mut source = RowSource::from_reader(&b"1,2,3\n4\n5,6\n"[..]);
        let mut lens = Vec::new();
        while let Some(fields) = source.next_record().unwrap() {
            lens.push(fields.len());
        }
        assert_eq!(lens, vec![3, 1, 2]);
        assert_eq!(source.records_read(), 3);
    }
}
