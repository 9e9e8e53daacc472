//! Deep file comparison
//!
//! Metadata alone never declares two files equal: equal sizes always lead
//! to a content comparison. Differing sizes short-circuit to "different".

use crate::tree::hasher::{self, CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// How file content is compared once sizes match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompareStrategy {
    /// Chunked byte-by-byte comparison, stopping at the first difference
    #[default]
    Bytes,
    /// Compare BLAKE3 digests of both files
    Hash,
}

/// Whether `source` and `replica` hold identical content
///
/// `source_size` is the size already known from traversal.
pub fn files_identical(
    source: &Path,
    replica: &Path,
    source_size: u64,
    strategy: CompareStrategy,
) -> io::Result<bool> {
    let replica_size = std::fs::metadata(replica)?.len();
    if replica_size != source_size {
        return Ok(false);
    }

    match strategy {
        CompareStrategy::Bytes => contents_equal(File::open(source)?, File::open(replica)?),
        CompareStrategy::Hash => Ok(hasher::hash_file(source)? == hasher::hash_file(replica)?),
    }
}

/// Compare two readers chunk by chunk
pub fn contents_equal<A: Read, B: Read>(a: A, b: B) -> io::Result<bool> {
    let mut a = BufReader::with_capacity(CHUNK_SIZE, a);
    let mut b = BufReader::with_capacity(CHUNK_SIZE, b);
    let mut buf_a = vec![0u8; CHUNK_SIZE];
    let mut buf_b = vec![0u8; CHUNK_SIZE];

    loop {
        let read_a = read_full(&mut a, &mut buf_a)?;
        let read_b = read_full(&mut b, &mut buf_b)?;
        if read_a != read_b || buf_a[..read_a] != buf_b[..read_b] {
            return Ok(false);
        }
        if read_a == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; short only at end of input
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
