use crate::embeddings::Embedder;
use anyhow::Result;

/// Deterministic feature-hashing encoder. Needs no model files, so it backs
/// offline catalogs and tests.
pub struct HashEmbedder {
    dim: usize,
}

/// Smallest dimension the hash encoder accepts from configuration.
pub const MIN_DIM: usize = 8;

impl HashEmbedder {
    /// `dim` below [`MIN_DIM`] is raised to it. Configured dimensions are
    /// checked by [`crate::embeddings::create_embedder`] instead.
    pub fn new(dim: usize) -> Self {
        Self {
            dim: dim.max(MIN_DIM),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for token in tokenize(text) {
            let h = fnv1a_64(token.to_lowercase().as_bytes());
            let idx = (h as usize) % self.dim;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        normalize_l2(&mut v);
        v
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

// Skill lists use '+' and '#' ("c++", "c#"), keep them inside tokens.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .filter(|s| !s.is_empty())
}

fn normalize_l2(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

fn fnv1a_64(data: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x00000100000001b3;
    let mut hash = OFFSET;
    for b in data {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
