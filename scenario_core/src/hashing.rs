use std::hash::{Hash, Hasher};

/// Deterministic FNV-1a 64-bit hasher.
///
/// `DefaultHasher` is randomly keyed per process; scenario fingerprints and
/// random stream seeds must be stable across runs.
#[derive(Debug, Clone)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut hasher = Self::new();
        hasher.write_u64(seed);
        hasher
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Derives a per-stream seed from a base seed and a stream token.
pub fn mix_seed(base_seed: u64, token: &str) -> u64 {
    let mut hasher = FnvHasher::with_seed(base_seed);
    token.hash(&mut hasher);
    hasher.finish()
}
