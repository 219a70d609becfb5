//! TFRecord container files.
//!
//! Every record is framed as
//!
//! ```text
//! u64 length (little endian)
//! u32 masked crc32c of length
//! [u8; length] data
//! u32 masked crc32c of data
//! ```
use crate::example::Example;
use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

const MASK_DELTA: u32 = 0xa282_ead8;
const LENGTH_SIZE: usize = 8;

pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = crc32c::crc32c(data);
    ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

pub struct RecordWriter<W: Write> {
    writer: W,
    count: usize,
}

impl RecordWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| anyhow!("Could not create {}: {}", path.display(), e))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut length = [0; LENGTH_SIZE];
        LittleEndian::write_u64(&mut length, data.len() as u64);
        self.writer.write_all(&length)?;
        self.writer.write_u32::<LittleEndian>(masked_crc32c(&length))?;
        self.writer.write_all(data)?;
        self.writer.write_u32::<LittleEndian>(masked_crc32c(data))?;
        self.count += 1;
        Ok(())
    }

    /// Encodes and writes a single example. `convert` encodes in parallel and
    /// goes through `write` instead.
    #[allow(dead_code)]
    pub fn write_example(&mut self, example: &Example) -> Result<()> {
        self.write(&example.to_bytes())
    }

    /// Number of records written so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    #[allow(dead_code)]
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

pub struct RecordReader<R: Read> {
    reader: R,
    index: usize,
    failed: bool,
}

impl RecordReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|e| anyhow!("Could not open {}: {}", path.display(), e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            index: 0,
            failed: false,
        }
    }

    /// Reads the length header, `None` on a clean end of file.
    fn read_length(&mut self) -> Result<Option<[u8; LENGTH_SIZE]>> {
        let mut length = [0; LENGTH_SIZE];
        let mut filled = 0;
        while filled < LENGTH_SIZE {
            match self.reader.read(&mut length[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(anyhow!(
                        "Truncated length header in record {}",
                        self.index
                    ))
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(length))
    }

    fn read_record(&mut self) -> Result<Option<Vec<u8>>> {
        let length = match self.read_length()? {
            Some(length) => length,
            None => return Ok(None),
        };
        let index = self.index;
        let truncated = |e: std::io::Error| {
            if e.kind() == ErrorKind::UnexpectedEof {
                anyhow!("Truncated record {}", index)
            } else {
                e.into()
            }
        };

        let length_crc = self.reader.read_u32::<LittleEndian>().map_err(truncated)?;
        if length_crc != masked_crc32c(&length) {
            return Err(anyhow!("Corrupted length in record {}", index));
        }
        let size = LittleEndian::read_u64(&length);
        // grows with what is actually read, the header may claim any size
        let mut data = Vec::new();
        (&mut self.reader).take(size).read_to_end(&mut data)?;
        if data.len() as u64 != size {
            return Err(anyhow!("Truncated record {}", index));
        }
        let data_crc = self.reader.read_u32::<LittleEndian>().map_err(truncated)?;
        if data_crc != masked_crc32c(&data) {
            return Err(anyhow!("Corrupted data in record {}", index));
        }
        self.index += 1;
        Ok(Some(data))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let res = self.read_record().transpose();
        if let Some(Err(_)) = res {
            self.failed = true;
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::{int64_feature, Example};
    use std::io::Cursor;

    fn write_records(records: &[&[u8]]) -> Result<Vec<u8>> {
        let mut writer = RecordWriter::new(Vec::new());
        for record in records {
            writer.write(record)?;
        }
        assert_eq!(writer.count(), records.len());
        writer.into_inner()
    }

    #[test]
    fn masked_crc32c_test() {
        // values produced by tensorflow.core.lib.hash.crc32c
        assert_eq!(crc32c::crc32c(b"123456789"), 0xe306_9283);
        assert_eq!(masked_crc32c(b""), MASK_DELTA);
        assert_eq!(masked_crc32c(b"123456789"), 0xc78a_b0e5);
        // length header of an empty record
        assert_eq!(masked_crc32c(&[0; 8]), 0x0798_0329);
    }

    #[test]
    fn record_layout() -> Result<()> {
        let buf = write_records(&[b"abc"])?;
        assert_eq!(buf.len(), 8 + 4 + 3 + 4);
        assert_eq!(&buf[..8], &[3, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&buf[12..15], b"abc");
        let data_crc = LittleEndian::read_u32(&buf[15..]);
        assert_eq!(data_crc, masked_crc32c(b"abc"));
        Ok(())
    }

    #[test]
    fn read_written_records() -> Result<()> {
        let buf = write_records(&[b"first", b"", b"third record"])?;
        let records = RecordReader::new(Cursor::new(buf)).collect::<Result<Vec<Vec<u8>>>>()?;
        assert_eq!(
            records,
            vec![b"first".to_vec(), Vec::new(), b"third record".to_vec()]
        );
        Ok(())
    }

    #[test]
    fn empty_file_has_no_records() {
        assert_eq!(RecordReader::new(Cursor::new(Vec::new())).count(), 0);
    }

    #[test]
    fn truncated_record_is_an_error() -> Result<()> {
        let mut buf = write_records(&[b"first", b"second"])?;
        buf.truncate(buf.len() - 3);
        let mut reader = RecordReader::new(Cursor::new(buf));
        assert_eq!(reader.next().unwrap()?, b"first".to_vec());
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Truncated record 1");
        assert!(reader.next().is_none());
        Ok(())
    }

    #[test]
    fn oversized_length_is_an_error() -> Result<()> {
        let mut length = [0; LENGTH_SIZE];
        LittleEndian::write_u64(&mut length, u64::MAX);
        let mut buf = length.to_vec();
        buf.write_u32::<LittleEndian>(masked_crc32c(&length))?;
        buf.extend_from_slice(b"data");
        let mut reader = RecordReader::new(Cursor::new(buf));
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Truncated record 0");
        assert!(reader.next().is_none());
        Ok(())
    }

    #[test]
    fn truncated_length_is_an_error() -> Result<()> {
        let mut buf = write_records(&[b"first"])?;
        buf.extend_from_slice(&[1, 0, 0]);
        let mut reader = RecordReader::new(Cursor::new(buf));
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "Truncated length header in record 1");
        Ok(())
    }

    #[test]
    fn corrupted_data_is_detected() -> Result<()> {
        let mut buf = write_records(&[b"payload"])?;
        buf[13] ^= 0xff;
        let err = RecordReader::new(Cursor::new(buf))
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.to_string(), "Corrupted data in record 0");
        Ok(())
    }

    #[test]
    fn corrupted_length_is_detected() -> Result<()> {
        let mut buf = write_records(&[b"payload"])?;
        buf[0] = 42;
        let err = RecordReader::new(Cursor::new(buf))
            .next()
            .unwrap()
            .unwrap_err();
        assert_eq!(err.to_string(), "Corrupted length in record 0");
        Ok(())
    }

    #[test]
    fn write_and_read_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("test.record");
        let example = Example::from_features(vec![("image/height".to_string(), int64_feature(7))]);
        {
            let mut writer = RecordWriter::create(&path)?;
            writer.write_example(&example)?;
            writer.flush()?;
        }
        let records = RecordReader::open(&path)?.collect::<Result<Vec<Vec<u8>>>>()?;
        assert_eq!(records.len(), 1);
        assert_eq!(Example::from_bytes(&records[0])?.int64("image/height"), Some(7));
        Ok(())
    }
}
