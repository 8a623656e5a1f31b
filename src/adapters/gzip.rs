//! gzip framing for NDJSON streams.
//!
//! Readers accept multi-member gzip files; writers count the compressed bytes
//! that reach the underlying sink so callers can measure output size without
//! touching the filesystem.

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, BufReader, Read, Write};

/// Write adapter that counts bytes accepted by the inner writer.
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

pub type GzipWriter<W> = GzEncoder<CountingWriter<W>>;
pub type GzipReader<R> = BufReader<MultiGzDecoder<R>>;

pub fn reader<R: Read>(inner: R) -> GzipReader<R> {
    BufReader::new(MultiGzDecoder::new(inner))
}

pub fn writer<W: Write>(inner: W) -> GzipWriter<W> {
    GzEncoder::new(CountingWriter::new(inner), Compression::default())
}

/// 目前已寫到底層的壓縮位元組數（未 flush 的部分不算）
pub fn compressed_bytes<W: Write>(writer: &GzipWriter<W>) -> u64 {
    writer.get_ref().bytes_written()
}

/// 寫入 gzip trailer 並 flush，回傳底層 writer 與壓縮後總大小
pub fn finish<W: Write>(writer: GzipWriter<W>) -> io::Result<(W, u64)> {
    let mut counter = writer.finish()?;
    counter.flush()?;
    let total = counter.bytes_written();
    Ok((counter.into_inner(), total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;

    #[test]
    fn test_writer_counts_compressed_bytes() {
        let mut gz = writer(Vec::new());
        gz.write_all(b"{\"a\":1}\n{\"a\":2}\n").unwrap();
        gz.flush().unwrap();
        let flushed = compressed_bytes(&gz);
        assert!(flushed > 0);

        let (bytes, total) = finish(gz).unwrap();
        assert!(total >= flushed);
        assert_eq!(total, bytes.len() as u64);

        let lines: Vec<String> = reader(bytes.as_slice())
            .lines()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec!["{\"a\":1}", "{\"a\":2}"]);
    }

    #[test]
    fn test_reader_accepts_concatenated_members() {
        let mut joined = Vec::new();
        for line in ["{\"m\":1}\n", "{\"m\":2}\n"] {
            let mut gz = writer(Vec::new());
            gz.write_all(line.as_bytes()).unwrap();
            let (member, _) = finish(gz).unwrap();
            joined.extend(member);
        }

        let mut text = String::new();
        reader(joined.as_slice()).read_to_string(&mut text).unwrap();
        assert_eq!(text, "{\"m\":1}\n{\"m\":2}\n");
    }

    #[test]
    fn test_reader_rejects_plain_text() {
        let mut text = String::new();
        let result = reader(&b"not gzip at all\n"[..]).read_to_string(&mut text);
        assert!(result.is_err());
    }
}
