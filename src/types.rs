//! Shared primitive types

/// BLAKE3 digest of file content
pub type Hash = [u8; 32];
