//! Content fingerprints and the legacy binary allow-list.
//!
//! A fingerprint is the SHA-256 of a file's raw bytes, decomposed into
//! four 64-bit words for compact literal representation. The allow-list
//! is a closed table of fingerprints for binaries that predate the
//! no-binaries policy; an XOR-of-all-words self-check makes the table
//! awkward to extend on purpose. Do not add entries.

use std::collections::HashSet;
use std::fmt;

use sha2::{Digest, Sha256};

/// A 256-bit content identity as four big-endian 64-bit words.
///
/// Equality and hashing are structural over the words only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u64; 4]);

impl Fingerprint {
    pub const fn new(a: u64, b: u64, c: u64, d: u64) -> Self {
        Self([a, b, c, d])
    }

    /// Fingerprint of a byte buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(digest.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            *word = u64::from_be_bytes(buf);
        }
        Self(words)
    }

    pub fn words(&self) -> [u64; 4] {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in self.0 {
            write!(f, "{:016x}", word)?;
        }
        Ok(())
    }
}

/// XOR of every word of every entry in the legacy table. The table is
/// closed; this constant changes iff the table does.
const LEGACY_CHECKSUM: u64 = 0x1e71b23c5079a1f2;

/// Fingerprints of binaries grandfathered in before the policy landed.
const LEGACY_ENTRIES: &[Fingerprint] = &[
    Fingerprint::new(0x113ca91aeb1a4d04, 0xf0fb5f6b164a39f5, 0x04eb880fd0abdc54, 0xb264648e8e5d74bf),
    Fingerprint::new(0x73a1c649c3a8c88d, 0xa7f6791e1a6fd615, 0x78168b249c8a8b02, 0x213cc2b8356d8077),
    Fingerprint::new(0xdcd6ac2d02c23475, 0x69d1138ab358675b, 0xcafc8b4c111aa953, 0x7c216f71aa6de0e8),
    Fingerprint::new(0x36e32bc36a0cf498, 0xb4e2ef22f793a3e4, 0xae215a3e99d9bb88, 0xa4a6a1d46204729a),
    Fingerprint::new(0xf99e9131a73a4308, 0xa1f36e1841b5702d, 0xf008131555776e7c, 0x7fa18990b18a101c),
    Fingerprint::new(0x9ff81f22983e6d47, 0x1776e8199b9bf951, 0xb9cf6d8eef01b059, 0xa99dc58f018685f4),
];

/// A closed set of pre-approved binary fingerprints.
#[derive(Debug, Clone)]
pub struct AllowList {
    entries: HashSet<Fingerprint>,
    checksum: u64,
}

impl AllowList {
    /// Build an allow-list from entries and their expected XOR checksum.
    pub fn new(entries: Vec<Fingerprint>, checksum: u64) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            checksum,
        }
    }

    /// The hard-coded legacy binary table.
    pub fn legacy() -> Self {
        Self::new(LEGACY_ENTRIES.to_vec(), LEGACY_CHECKSUM)
    }

    /// An empty allow-list (test configurations).
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.entries.contains(fingerprint)
    }

    /// Verify the XOR-of-all-words invariant. Run at startup; a mismatch
    /// means the table was edited without updating the checksum, which is
    /// the intended friction against adding entries.
    pub fn validate(&self) -> anyhow::Result<()> {
        let actual = self
            .entries
            .iter()
            .flat_map(|fp| fp.words())
            .fold(0u64, |acc, word| acc ^ word);
        if actual != self.checksum {
            anyhow::bail!(
                "binary allow-list self-check failed: XOR of entries is {:#018x}, expected {:#018x}; \
                 the allow-list is closed and must not be extended",
                actual,
                self.checksum
            );
        }
        Ok(())
    }
}
