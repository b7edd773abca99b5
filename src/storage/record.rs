//! NUL-framed field scanning
//!
//! Account files and the journal are both sequences of NUL-terminated byte
//! strings without any index. [`FieldReader`] streams such a file through an
//! owned buffer one read window at a time and hands out whole fields.
//! [`RecordReader`] builds on it to yield the (name, value) pairs of an
//! account, reporting the stage at which the framing broke.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use tracing::warn;

use crate::error::{PwmgrError, PwmgrResult};

/// Longest account or property name, in bytes
pub const MAX_NAME_LEN: usize = 255;

/// Where in the framing a scan failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStage {
    /// A name never found its terminator, or ran past the name limit
    Name,
    /// The file ended right after a name, leaving an odd number of fields
    MissingValue,
    /// A value never found its terminator
    Value,
    /// A journal entry ended inside its tag and timestamp prefix
    EntryHeader,
    /// A journal entry carries an unknown tag
    EntryKind,
    /// A journal string field never found its terminator
    EntryField,
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::Name => "name",
            Self::MissingValue => "missing value",
            Self::Value => "value",
            Self::EntryHeader => "entry header",
            Self::EntryKind => "entry kind",
            Self::EntryField => "entry field",
        };
        f.write_str(stage)
    }
}

/// Result of asking for the next field
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Field {
    Complete(Vec<u8>),
    /// Bytes were pending but the terminator (or enough bytes) never came
    Partial,
    /// Clean end of file on a field boundary
    End,
}

/// Streams NUL-terminated fields out of a reader
pub(crate) struct FieldReader<R> {
    inner: R,
    buf: Vec<u8>,
    /// Start of the unread bytes in `buf`
    pos: usize,
    window: usize,
}

impl<R: Read> FieldReader<R> {
    pub(crate) fn new(inner: R, window: usize) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(window),
            pos: 0,
            window: window.max(1),
        }
    }

    fn unread(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Drop consumed bytes, moving the unread tail to the front of the buffer.
    ///
    /// Afterwards `pos == 0` and `buf` holds exactly the unread bytes.
    fn compact(&mut self) {
        self.buf.drain(..self.pos);
        self.pos = 0;
    }

    /// Append up to one window of bytes; returns 0 at end of file
    fn fill(&mut self) -> io::Result<usize> {
        self.compact();
        let start = self.buf.len();
        self.buf.resize(start + self.window, 0);
        let read = loop {
            match self.inner.read(&mut self.buf[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e);
                }
            }
        };
        self.buf.truncate(start + read);
        Ok(read)
    }

    /// Next NUL-terminated field, without its terminator
    ///
    /// With a `limit`, a field longer than `limit` bytes is reported as
    /// [`Field::Partial`], whether or not its terminator is already buffered.
    pub(crate) fn next_field(&mut self, limit: Option<usize>) -> io::Result<Field> {
        loop {
            if let Some(len) = memchr::memchr(0, self.unread()) {
                if limit.is_some_and(|limit| len > limit) {
                    return Ok(Field::Partial);
                }
                let field = self.unread()[..len].to_vec();
                self.pos += len + 1;
                return Ok(Field::Complete(field));
            }
            if limit.is_some_and(|limit| self.unread().len() > limit) {
                return Ok(Field::Partial);
            }
            if self.fill()? == 0 {
                return Ok(if self.unread().is_empty() {
                    Field::End
                } else {
                    Field::Partial
                });
            }
        }
    }

    /// Exactly `len` raw bytes
    pub(crate) fn take(&mut self, len: usize) -> io::Result<Field> {
        while self.unread().len() < len {
            if self.fill()? == 0 {
                return Ok(if self.unread().is_empty() {
                    Field::End
                } else {
                    Field::Partial
                });
            }
        }
        let bytes = self.unread()[..len].to_vec();
        self.pos += len;
        Ok(Field::Complete(bytes))
    }
}

/// One (name, value) pair of an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
}

impl Property {
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn value_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }

    /// Serialized form: `name\0value\0`
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.name.len() + self.value.len() + 2);
        out.extend_from_slice(&self.name);
        out.push(0);
        out.extend_from_slice(&self.value);
        out.push(0);
        out
    }
}

/// Lazy sequence of the properties stored in one account file
///
/// The first corruption or read error is yielded as an `Err` item; after it
/// the iterator is exhausted. To start over, open the account again.
pub struct RecordReader<R = File> {
    fields: FieldReader<R>,
    file: PathBuf,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R, file: PathBuf, window: usize) -> Self {
        Self {
            fields: FieldReader::new(inner, window),
            file,
            done: false,
        }
    }

    fn corrupt(&self, stage: ScanStage) -> PwmgrError {
        warn!(file = %self.file.display(), %stage, "corrupt account file");
        PwmgrError::Corrupt {
            file: self.file.clone(),
            stage,
        }
    }

    fn read_error(&self, err: io::Error) -> PwmgrError {
        PwmgrError::Io(format!("Failed to read '{}': {}", self.file.display(), err))
    }

    fn read_pair(&mut self) -> PwmgrResult<Option<Property>> {
        let name = match self
            .fields
            .next_field(Some(MAX_NAME_LEN))
            .map_err(|e| self.read_error(e))?
        {
            Field::Complete(name) => name,
            Field::End => return Ok(None),
            Field::Partial => return Err(self.corrupt(ScanStage::Name)),
        };

        let value = match self.fields.next_field(None).map_err(|e| self.read_error(e))? {
            Field::Complete(value) => value,
            Field::End => return Err(self.corrupt(ScanStage::MissingValue)),
            Field::Partial => return Err(self.corrupt(ScanStage::Value)),
        };

        Ok(Some(Property { name, value }))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = PwmgrResult<Property>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_pair() {
            Ok(Some(property)) => Some(Ok(property)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8], window: usize) -> RecordReader<&[u8]> {
        RecordReader::new(bytes, PathBuf::from("acct"), window)
    }

    fn stage_of(result: Option<PwmgrResult<Property>>) -> ScanStage {
        match result {
            Some(Err(PwmgrError::Corrupt { stage, .. })) => stage,
            other => panic!("expected corruption, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_has_no_properties() {
        assert_eq!(reader(b"", 16).count(), 0);
    }

    #[test]
    fn test_pairs_in_order() {
        let props: Vec<_> = reader(b"user\0bob\0pass\0hunter2\0", 1024)
            .collect::<PwmgrResult<_>>()
            .unwrap();
        assert_eq!(
            props,
            vec![Property::new("user", "bob"), Property::new("pass", "hunter2")]
        );
    }

    #[test]
    fn test_fields_spanning_many_windows() {
        // Mirrors a file with values far longer than the read window
        let mut bytes = Vec::new();
        for (name, value) in [("a".repeat(20), "b".repeat(3000)), ("c".repeat(12), "d".repeat(600))] {
            bytes.extend(Property::new(name, value).encode());
        }

        let props: Vec<_> = reader(&bytes, 64).collect::<PwmgrResult<_>>().unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].value.len(), 3000);
        assert_eq!(props[1].name, b"cccccccccccc".to_vec());
        assert_eq!(props[1].value.len(), 600);
    }

    #[test]
    fn test_empty_value_is_valid() {
        let props: Vec<_> = reader(b"note\0\0", 8).collect::<PwmgrResult<_>>().unwrap();
        assert_eq!(props, vec![Property::new("note", "")]);
    }

    #[test]
    fn test_unterminated_name() {
        let mut records = reader(b"user\0bob\0pa", 4);
        assert!(records.next().unwrap().is_ok());
        assert_eq!(stage_of(records.next()), ScanStage::Name);
        assert!(records.next().is_none());
    }

    #[test]
    fn test_odd_field_count() {
        let mut records = reader(b"user\0bob\0pass\0", 1024);
        assert!(records.next().unwrap().is_ok());
        assert_eq!(stage_of(records.next()), ScanStage::MissingValue);
        assert!(records.next().is_none());
    }

    #[test]
    fn test_unterminated_value() {
        let mut records = reader(b"user\0bo", 1024);
        assert_eq!(stage_of(records.next()), ScanStage::Value);
    }

    #[test]
    fn test_overlong_name() {
        let bytes = vec![b'x'; MAX_NAME_LEN + 10];
        let mut records = reader(&bytes, 32);
        assert_eq!(stage_of(records.next()), ScanStage::Name);
    }

    #[test]
    fn test_overlong_name_regardless_of_window() {
        let mut bytes = vec![b'n'; 500];
        bytes.extend_from_slice(b"\0v\0");

        for window in [64, 1024] {
            let mut records = reader(&bytes, window);
            assert_eq!(stage_of(records.next()), ScanStage::Name, "window {window}");
        }
    }

    #[test]
    fn test_name_at_limit_is_accepted() {
        let name = "n".repeat(MAX_NAME_LEN);
        let bytes = Property::new(name.clone(), "v").encode();

        let props: Vec<_> = reader(&bytes, 1024).collect::<PwmgrResult<_>>().unwrap();
        assert_eq!(props, vec![Property::new(name, "v")]);
    }

    #[test]
    fn test_take_fixed_bytes() {
        let mut fields = FieldReader::new(&b"abcdef"[..], 2);
        assert_eq!(fields.take(4).unwrap(), Field::Complete(b"abcd".to_vec()));
        assert_eq!(fields.take(4).unwrap(), Field::Partial);

        let mut fields = FieldReader::new(&b""[..], 2);
        assert_eq!(fields.take(1).unwrap(), Field::End);
    }

    #[test]
    fn test_compact_keeps_unread_bytes() {
        let mut fields = FieldReader::new(&b"ab\0cd\0"[..], 3);
        assert_eq!(fields.next_field(None).unwrap(), Field::Complete(b"ab".to_vec()));
        fields.compact();
        assert_eq!(fields.pos, 0);
        assert_eq!(fields.next_field(None).unwrap(), Field::Complete(b"cd".to_vec()));
        assert_eq!(fields.next_field(None).unwrap(), Field::End);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(ScanStage::MissingValue.to_string(), "missing value");
        assert_eq!(ScanStage::EntryKind.to_string(), "entry kind");
    }
}
