//! Interned string table keyed by a 64-bit content hash.
//!
//! Everything downstream of the producers refers to names by hash. Two
//! distinct strings with the same hash share one entry and their statistics
//! merge; collisions are not detected.

use crate::utils::config::UNKNOWN_NAME;
use std::collections::HashMap;

// CRC-64/XZ (ECMA-182, reflected)
const CRC64_POLY: u64 = 0xC96C_5795_D787_0F42;
const CRC64_TABLE: [u64; 256] = build_crc64_table();

const fn build_crc64_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u64;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC64_POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the content hash of raw bytes
pub fn crc64(bytes: &[u8]) -> u64 {
    let crc = bytes.iter().fold(!0u64, |crc, &byte| {
        CRC64_TABLE[((crc ^ byte as u64) & 0xff) as usize] ^ (crc >> 8)
    });
    !crc
}

/// Hash to text table holding one copy of every interned name
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: HashMap<u64, String>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text` and return its hash
    ///
    /// **Public** - called by producers for every unit, include and symbol name
    ///
    /// A hash already present keeps its first stored text.
    pub fn store(&mut self, text: &str) -> u64 {
        let hash = crc64(text.as_bytes());
        self.strings
            .entry(hash)
            .or_insert_with(|| text.to_string());
        hash
    }

    pub fn get(&self, hash: u64) -> Option<&str> {
        self.strings.get(&hash).map(String::as_str)
    }

    /// Text for `hash`, or the placeholder name when it was never stored
    pub fn resolve(&self, hash: u64) -> &str {
        self.get(hash).unwrap_or(UNKNOWN_NAME)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Last path component of `path`, accepting both separator styles
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
