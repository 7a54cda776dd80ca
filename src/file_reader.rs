//! Line input for entry files and address lists
//!
//! [`open`] hands back a buffered reader for a path, decompressing `.gz`
//! files and reading stdin for `-`. [`read_line`] pulls one line at a time
//! as raw bytes with the terminator stripped, so a stray non-UTF-8 line in an
//! address list is reported per line instead of aborting the whole read.
//!
//! ```rust,no_run
//! use ipmap::file_reader;
//!
//! let mut reader = file_reader::open("access-ips.txt.gz")?;
//! let mut line = Vec::new();
//! while file_reader::read_line(&mut reader, &mut line)? {
//!     println!("{}", String::from_utf8_lossy(&line));
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, stdin, BufRead, BufReader};
use std::path::Path;

/// Buffer size for file reading (128KB)
const BUFFER_SIZE: usize = 128 * 1024;

/// Open a file with automatic gzip detection based on file extension
///
/// Files ending in `.gz` (case-insensitive) are decompressed on the fly.
/// The path `-` reads from stdin.
///
/// # Errors
///
/// Returns an error if the file cannot be opened. Invalid gzip data surfaces
/// later, as read errors.
pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();

    if path.to_str() == Some("-") {
        return Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, stdin())));
    }

    let file = File::open(path)?;
    Ok(from_file(file, is_gzip_path(path)))
}

/// Wrap an already-opened file, decompressing if `is_gzip` is set
pub fn from_file(file: File, is_gzip: bool) -> Box<dyn BufRead + Send> {
    if is_gzip {
        Box::new(BufReader::with_capacity(BUFFER_SIZE, GzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(BUFFER_SIZE, file))
    }
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Read the next line into `buf` without its line terminator
///
/// Handles `\n` and `\r\n` endings and does not require UTF-8. Returns
/// `Ok(false)` at end of input.
pub fn read_line<R: BufRead + ?Sized>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(true)
}
