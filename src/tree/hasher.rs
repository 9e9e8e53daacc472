//! Content hashing using BLAKE3

use crate::types::Hash;
use blake3::Hasher;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

/// Read buffer size shared by hashing, comparison and copying
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Hash everything a reader yields, in fixed-size chunks
pub fn hash_reader<R: Read>(reader: R) -> io::Result<Hash> {
    copy_hashing(reader, &mut io::sink())
}

/// Copy every byte from `reader` to `writer`, hashing the stream on the way
pub fn copy_hashing<R: Read, W: Write>(mut reader: R, writer: &mut W) -> io::Result<Hash> {
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
        writer.write_all(&buffer[..read])?;
    }
    Ok(*hasher.finalize().as_bytes())
}

/// Stream a file through BLAKE3 without loading it into memory
pub fn hash_file(path: &Path) -> io::Result<Hash> {
    let file = File::open(path)?;
    hash_reader(BufReader::with_capacity(CHUNK_SIZE, file))
}

/// Hex rendering of a digest for log and error messages
pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}
