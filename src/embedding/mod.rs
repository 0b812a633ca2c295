//! Deterministic text embedding.
//!
//! `HashedEmbedder` is a hashed bag-of-words model: tokens are bucketed by
//! SHA-256 into a fixed-dimension count vector and L2-normalized. Vectors
//! are non-negative, so cosine similarity stays within [0, 1]. The same text
//! always produces the same vector, which keeps retrieval and evaluation
//! runs reproducible.

mod index;

pub use index::{EmbeddingIndex, InMemoryVectorIndex, SemanticHit};

use sha2::{Digest, Sha256};

/// Function words and domain boilerplate excluded from the bag of words.
const STOPWORDS: &[&str] = &[
    "about", "after", "all", "also", "and", "any", "are", "been", "but", "came", "can",
    "could", "did", "does", "film", "films", "for", "from", "genres", "had", "has",
    "have", "her", "him", "his", "how", "into", "its", "movie", "movies", "not", "off",
    "our", "out", "plot", "rated", "rating", "released", "she", "show", "some", "tell",
    "that", "the", "their", "them", "then", "they", "this", "those", "title", "very",
    "was", "were", "what", "when", "where", "which", "who", "whose", "why", "will",
    "with", "year", "you", "your",
];

const MIN_TOKEN_LEN: usize = 3;

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

pub struct HashedEmbedder {
    dim: usize,
}

impl HashedEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn bucket(&self, token: &str) -> usize {
        let digest = Sha256::digest(token.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(bytes) % self.dim as u64) as usize
    }
}

impl Embedder for HashedEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in tokenize(text) {
            vector[self.bucket(&token)] += 1.0;
        }
        l2_normalize(&mut vector);
        vector
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|t| t.to_lowercase())
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !STOPWORDS.contains(&t.as_str()))
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn embedding_is_deterministic() {
        let embedder = HashedEmbedder::new(128);
        let a = embedder.embed("a thief who enters dreams");
        let b = embedder.embed("a thief who enters dreams");
        assert_eq!(a, b);
    }

    #[test]
    fn nonempty_embedding_is_normalized() {
        let embedder = HashedEmbedder::new(128);
        let vector = embedder.embed("dinosaurs escape an island park");
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!(approx_eq(norm, 1.0));
    }

    #[test]
    fn stopword_only_text_embeds_to_zero() {
        let embedder = HashedEmbedder::new(64);
        let vector = embedder.embed("tell me about the movie");
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let v = vec![0.5, 0.5, 0.0];
        assert!(approx_eq(cosine_similarity(&v, &v), 1.0));
    }

    #[test]
    fn cosine_is_zero_for_disjoint_vectors() {
        assert!(approx_eq(
            cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]),
            0.0
        ));
        assert!(approx_eq(cosine_similarity(&[], &[]), 0.0));
        assert!(approx_eq(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0));
    }

    #[test]
    fn overlapping_texts_score_higher_than_unrelated() {
        let embedder = HashedEmbedder::new(256);
        let query = embedder.embed("hacker discovers reality is a simulation");
        let matrix = embedder.embed("a computer hacker discovers that reality is a simulation");
        let fish = embedder.embed("a clownfish crosses the ocean to find his son");

        let related = cosine_similarity(&query, &matrix);
        let unrelated = cosine_similarity(&query, &fish);
        assert!(related > unrelated);
        assert!(related > 0.5);
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let embedder = HashedEmbedder::new(256);
        let a = embedder.embed("toys come alive when humans leave");
        let b = embedder.embed("toys that come alive");
        let score = cosine_similarity(&a, &b);
        assert!((0.0..=1.0).contains(&score));
    }
}
