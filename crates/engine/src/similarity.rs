//! Cosine similarity index over count vectors.
//!
//! Holds the vectors of one fitted vocabulary and the dense N x N similarity
//! table between them. Row `i` belongs to corpus position `i`.
//!
//! ## Conventions
//! - `cosine(u, v)` is 0 when either vector has zero norm
//! - the diagonal is exactly 1.0 for non-zero vectors and 0.0 for zero vectors
//! - entries are clamped into [0, 1]
//!
//! ## Scaling
//! The table is dense `f32`: 4 * N^2 bytes. That is fine for the low
//! thousands of titles a batch-loaded catalog holds (3,000 titles is about
//! 36 MB) and is the limit to watch before growing the corpus further.

use crate::error::{EngineError, Result};
use crate::vectorizer::CountVector;
use rayon::prelude::*;
use tracing::debug;

/// Cosine similarity of two count vectors, 0 when either norm is 0
pub fn cosine(a: &CountVector, b: &CountVector) -> f32 {
    cosine_with_norms(a, a.norm(), b, b.norm())
}

fn cosine_with_norms(a: &CountVector, norm_a: f64, b: &CountVector, norm_b: f64) -> f32 {
    let denom = norm_a * norm_b;
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(0.0, 1.0) as f32
}

fn self_similarity(norm: f64) -> f32 {
    if norm > 0.0 { 1.0 } else { 0.0 }
}

/// Pairwise similarity table for one vocabulary
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    /// Vocabulary size every stored vector was built against
    dim: usize,
    vectors: Vec<CountVector>,
    norms: Vec<f64>,
    rows: Vec<Vec<f32>>,
}

impl SimilarityIndex {
    /// Compute the full table for `vectors`.
    ///
    /// Only the upper triangle is computed (rows in parallel); the lower
    /// triangle mirrors it.
    pub fn build(dim: usize, vectors: Vec<CountVector>) -> Result<Self> {
        if let Some(bad) = vectors.iter().find(|v| v.dim() != dim) {
            return Err(EngineError::VocabularyMismatch {
                expected: dim,
                found: bad.dim(),
            });
        }

        let norms: Vec<f64> = vectors.par_iter().map(CountVector::norm).collect();
        let n = vectors.len();

        // upper[i][k] = cosine(i, i + 1 + k)
        let upper: Vec<Vec<f32>> = (0..n)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..n)
                    .map(|j| cosine_with_norms(&vectors[i], norms[i], &vectors[j], norms[j]))
                    .collect()
            })
            .collect();

        let rows: Vec<Vec<f32>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .map(|j| match j.cmp(&i) {
                        std::cmp::Ordering::Less => upper[j][i - j - 1],
                        std::cmp::Ordering::Equal => self_similarity(norms[i]),
                        std::cmp::Ordering::Greater => upper[i][j - i - 1],
                    })
                    .collect()
            })
            .collect();

        debug!("Built {}x{} similarity table over {} dimensions", n, n, dim);

        Ok(Self {
            dim,
            vectors,
            norms,
            rows,
        })
    }

    /// Add one vector, computing only its row and column.
    ///
    /// The vector must come from the vocabulary the index was built with;
    /// anything else needs a full rebuild and is rejected with
    /// `VocabularyMismatch`. Returns the new position.
    pub fn insert(&mut self, vector: CountVector) -> Result<usize> {
        if vector.dim() != self.dim {
            return Err(EngineError::VocabularyMismatch {
                expected: self.dim,
                found: vector.dim(),
            });
        }

        let norm = vector.norm();
        let mut new_row: Vec<f32> = self
            .vectors
            .par_iter()
            .zip(self.norms.par_iter())
            .map(|(existing, &existing_norm)| cosine_with_norms(&vector, norm, existing, existing_norm))
            .collect();

        for (row, &value) in self.rows.iter_mut().zip(new_row.iter()) {
            row.push(value);
        }
        new_row.push(self_similarity(norm));

        self.rows.push(new_row);
        self.vectors.push(vector);
        self.norms.push(norm);

        Ok(self.rows.len() - 1)
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Vocabulary size of the indexed vectors
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Similarities of `position` to every position (itself included)
    pub fn similarity_row(&self, position: usize) -> Result<&[f32]> {
        self.rows
            .get(position)
            .map(Vec::as_slice)
            .ok_or_else(|| EngineError::position_not_found(position))
    }

    /// Similarity of two positions
    pub fn similarity(&self, a: usize, b: usize) -> Result<f32> {
        let row = self.similarity_row(a)?;
        row.get(b)
            .copied()
            .ok_or_else(|| EngineError::position_not_found(b))
    }

    /// Copy of the whole table
    pub fn full_matrix(&self) -> Vec<Vec<f32>> {
        self.rows.clone()
    }

    /// Stored vector at a position
    pub fn vector(&self, position: usize) -> Option<&CountVector> {
        self.vectors.get(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(dim: usize, entries: &[(usize, u32)]) -> CountVector {
        CountVector::from_entries(dim, entries.iter().copied())
    }

    fn create_test_vectors() -> Vec<CountVector> {
        vec![
            v(4, &[(0, 1), (1, 1)]),
            v(4, &[(0, 1), (2, 1)]),
            v(4, &[]),
            v(4, &[(3, 2)]),
        ]
    }

    #[test]
    fn test_cosine_basics() {
        let a = v(3, &[(0, 1), (1, 2)]);
        let b = v(3, &[(1, 1), (2, 3)]);

        assert!((cosine(&a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(cosine(&a, &b), cosine(&b, &a));
        assert_eq!(cosine(&a, &v(3, &[(2, 5)])), 0.0);
    }

    #[test]
    fn test_cosine_with_zero_vector() {
        let zero = CountVector::zeros(3);
        let a = v(3, &[(0, 4)]);

        assert_eq!(cosine(&zero, &a), 0.0);
        assert_eq!(cosine(&a, &zero), 0.0);
        assert_eq!(cosine(&zero, &zero), 0.0);
        assert!(!cosine(&zero, &zero).is_nan());
    }

    #[test]
    fn test_build_is_symmetric_with_fixed_diagonal() {
        let index = SimilarityIndex::build(4, create_test_vectors()).unwrap();
        let matrix = index.full_matrix();

        assert_eq!(matrix.len(), 4);
        for i in 0..4 {
            assert_eq!(matrix[i].len(), 4);
            for j in 0..4 {
                assert_eq!(matrix[i][j], matrix[j][i]);
                assert!((0.0..=1.0).contains(&matrix[i][j]));
            }
        }
        assert_eq!(matrix[0][0], 1.0);
        assert_eq!(matrix[1][1], 1.0);
        assert_eq!(matrix[2][2], 0.0);
        assert_eq!(matrix[3][3], 1.0);
        assert!((matrix[0][1] - 0.5).abs() < 1e-6);
        assert_eq!(matrix[0][3], 0.0);
    }

    #[test]
    fn test_build_matches_pairwise_cosine() {
        let vectors = create_test_vectors();
        let index = SimilarityIndex::build(4, vectors.clone()).unwrap();

        for i in 0..vectors.len() {
            for j in 0..vectors.len() {
                if i != j {
                    assert_eq!(index.similarity(i, j).unwrap(), cosine(&vectors[i], &vectors[j]));
                }
            }
        }
    }

    #[test]
    fn test_insert_matches_full_build() {
        let vectors = create_test_vectors();
        let extra = v(4, &[(0, 2), (3, 1)]);

        let mut incremental = SimilarityIndex::build(4, vectors.clone()).unwrap();
        let position = incremental.insert(extra.clone()).unwrap();

        let mut all = vectors;
        all.push(extra);
        let rebuilt = SimilarityIndex::build(4, all).unwrap();

        assert_eq!(position, 4);
        assert_eq!(incremental.len(), 5);
        assert_eq!(incremental.full_matrix(), rebuilt.full_matrix());
    }

    #[test]
    fn test_insert_rejects_other_vocabulary() {
        let mut index = SimilarityIndex::build(4, create_test_vectors()).unwrap();
        let result = index.insert(v(5, &[(4, 1)]));

        assert_eq!(
            result,
            Err(EngineError::VocabularyMismatch { expected: 4, found: 5 })
        );
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_build_rejects_mixed_dimensions() {
        let result = SimilarityIndex::build(4, vec![v(4, &[]), v(3, &[])]);
        assert!(matches!(result, Err(EngineError::VocabularyMismatch { .. })));
    }

    #[test]
    fn test_row_lookup_out_of_range() {
        let index = SimilarityIndex::build(4, create_test_vectors()).unwrap();
        assert_eq!(index.similarity_row(1).unwrap().len(), 4);
        assert!(matches!(
            index.similarity_row(9),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_empty_index() {
        let index = SimilarityIndex::build(0, Vec::new()).unwrap();
        assert!(index.is_empty());
        assert!(index.full_matrix().is_empty());
    }
}
