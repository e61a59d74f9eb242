use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;

use crate::error::Result;

/// Path that stands for stdin when reading and stdout when writing.
pub const STDIO_PATH: &str = "-";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
}

/// Opens `path` (or stdin for `-`) for buffered reading, transparently
/// decompressing gzip content. Compression is detected from the first two
/// bytes rather than the file name.
pub fn open_reader(path: impl AsRef<Path>) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    if is_stdio(path) {
        decode(BufReader::new(io::stdin()))
    } else {
        decode(BufReader::new(File::open(path)?))
    }
}

/// Wraps `reader` in a gzip decoder when its content starts with the gzip
/// magic bytes.
pub fn decode<R: BufRead + 'static>(mut reader: R) -> Result<Box<dyn BufRead>> {
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Creates `path` (or stdout for `-`) for buffered writing.
pub fn create_writer(path: impl AsRef<Path>) -> Result<Box<dyn Write>> {
    let path = path.as_ref();
    if is_stdio(path) {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}
