//! Flat (brute-force) vector index.
//!
//! Vectors are stored row-major in one contiguous buffer. Search scans every
//! row and ranks by squared Euclidean distance.
//!
//! The binary artifact layout (little-endian):
//!
//! | offset | size  | field                                   |
//! |--------|-------|-----------------------------------------|
//! | 0      | 4     | magic `DQFX`                            |
//! | 4      | 4     | format version (`u32`)                  |
//! | 8      | 4     | dimensions (`u32`)                      |
//! | 12     | 8     | vector count (`u64`)                    |
//! | 20     | 32    | SHA-256 of the companion chunk file     |
//! | 52     | 4·d·n | vectors, row-major `f32`                |

use docqa_core::{AppError, AppResult};

const MAGIC: &[u8; 4] = b"DQFX";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 52;

/// SHA-256 digest binding an index artifact to its chunk file.
pub type ChunkDigest = [u8; 32];

/// One search result: a row position and its squared distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub distance: f32,
}

/// Brute-force index over vectors of a single dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimensions: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from a batch of vectors.
    ///
    /// The dimension is fixed by the first vector. Fails on an empty batch,
    /// a zero-length vector, or any vector whose length differs from the first.
    pub fn build(vectors: &[Vec<f32>]) -> AppResult<Self> {
        let first = vectors
            .first()
            .ok_or_else(|| AppError::Knowledge("Cannot build an index from no vectors".to_string()))?;

        let dimensions = first.len();
        if dimensions == 0 {
            return Err(AppError::Knowledge(
                "Cannot build an index from zero-dimension vectors".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(dimensions * vectors.len());
        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimensions {
                return Err(AppError::Knowledge(format!(
                    "Vector {} has {} dimensions, expected {}",
                    position,
                    vector.len(),
                    dimensions
                )));
            }
            data.extend_from_slice(vector);
        }

        tracing::debug!(
            "Built flat index with {} vectors of dimension {}",
            vectors.len(),
            dimensions
        );

        Ok(Self { dimensions, data })
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimensions
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Return the `k` nearest rows by ascending squared Euclidean distance.
    ///
    /// Ties go to the lowest position and non-finite distances sort last.
    /// `k == 0` and a query of the wrong dimension both yield no hits.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        if k == 0 {
            return Vec::new();
        }

        if query.len() != self.dimensions {
            tracing::warn!(
                "Query has {} dimensions but index has {}; returning no results",
                query.len(),
                self.dimensions
            );
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .data
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, row)| SearchHit {
                position,
                distance: euclidean_distance_squared(query, row),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.distance
                .is_finite()
                .cmp(&a.distance.is_finite())
                .then_with(|| a.distance.total_cmp(&b.distance))
                .then_with(|| a.position.cmp(&b.position))
        });
        hits.truncate(k);

        hits
    }

    /// Encode the index as a binary artifact bound to `chunk_digest`.
    pub fn to_bytes(&self, chunk_digest: &ChunkDigest) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimensions as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend_from_slice(chunk_digest);
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Decode a binary artifact, returning the index and the chunk digest it
    /// was bound to.
    pub fn from_bytes(bytes: &[u8]) -> AppResult<(Self, ChunkDigest)> {
        if bytes.len() < HEADER_LEN {
            return Err(AppError::Knowledge(format!(
                "Index artifact too short: {} bytes",
                bytes.len()
            )));
        }

        if &bytes[0..4] != MAGIC {
            return Err(AppError::Knowledge(
                "Index artifact has an invalid magic header".to_string(),
            ));
        }

        let version = read_u32(&bytes[4..8]);
        if version != FORMAT_VERSION {
            return Err(AppError::Knowledge(format!(
                "Unsupported index format version {}",
                version
            )));
        }

        let dimensions = read_u32(&bytes[8..12]) as usize;
        let count = read_u64(&bytes[12..20]);

        if count == 0 {
            return Err(AppError::Knowledge("Index artifact holds no vectors".to_string()));
        }
        if dimensions == 0 {
            return Err(AppError::Knowledge(format!(
                "Index artifact declares {} vectors of zero dimensions",
                count
            )));
        }

        let expected_len = usize::try_from(count)
            .ok()
            .and_then(|n| n.checked_mul(dimensions))
            .and_then(|values| values.checked_mul(4))
            .and_then(|payload| payload.checked_add(HEADER_LEN))
            .ok_or_else(|| {
                AppError::Knowledge("Index artifact header declares an impossible size".to_string())
            })?;

        if bytes.len() != expected_len {
            return Err(AppError::Knowledge(format!(
                "Index artifact length {} does not match header (expected {})",
                bytes.len(),
                expected_len
            )));
        }

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[20..HEADER_LEN]);

        let data = bytes[HEADER_LEN..]
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok((Self { dimensions, data }, digest))
    }
}

fn read_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn read_u64(b: &[u8]) -> u64 {
    u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// Squared Euclidean distance between two equal-length vectors.
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatIndex {
        FlatIndex::build(&[
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 3.0],
            vec![1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_build_rejects_bad_batches() {
        assert!(FlatIndex::build(&[]).is_err());
        assert!(FlatIndex::build(&[vec![]]).is_err());

        let err = FlatIndex::build(&[vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(err.to_string().contains("expected 2"));
    }

    #[test]
    fn test_len_and_dimensions() {
        let index = sample_index();
        assert_eq!(index.len(), 4);
        assert_eq!(index.dimensions(), 2);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_search_orders_by_distance_then_position() {
        let index = sample_index();
        let hits = index.search(&[0.9, 0.0], 3);

        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![1, 3, 0]);
        assert!((hits[0].distance - 0.01).abs() < 1e-6);
        assert_eq!(hits[0].distance, hits[1].distance);
    }

    #[test]
    fn test_search_k_bounds() {
        let index = sample_index();
        assert!(index.search(&[0.0, 0.0], 0).is_empty());
        assert_eq!(index.search(&[0.0, 0.0], 100).len(), 4);
    }

    #[test]
    fn test_search_wrong_dimension_is_empty() {
        let index = sample_index();
        assert!(index.search(&[0.0, 0.0, 0.0], 2).is_empty());
    }

    #[test]
    fn test_search_non_finite_sorts_last() {
        let index = FlatIndex::build(&[vec![f32::NAN], vec![5.0], vec![f32::INFINITY], vec![1.0]])
            .unwrap();
        let positions: Vec<usize> = index.search(&[0.0], 4).iter().map(|h| h.position).collect();

        assert_eq!(&positions[..2], &[3, 1]);
        assert!(positions[2..].contains(&0));
        assert!(positions[2..].contains(&2));
    }

    #[test]
    fn test_search_is_deterministic() {
        let index = sample_index();
        let query = [0.4, 1.2];
        assert_eq!(index.search(&query, 4), index.search(&query, 4));
    }

    #[test]
    fn test_bytes_roundtrip_keeps_digest() {
        let index = sample_index();
        let digest = [7u8; 32];

        let bytes = index.to_bytes(&digest);
        assert_eq!(&bytes[0..4], b"DQFX");
        assert_eq!(bytes.len(), 52 + 4 * 2 * 4);

        let (decoded, decoded_digest) = FlatIndex::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, index);
        assert_eq!(decoded_digest, digest);
    }

    #[test]
    fn test_from_bytes_rejects_corruption() {
        let bytes = sample_index().to_bytes(&[0u8; 32]);

        assert!(FlatIndex::from_bytes(&bytes[..10]).is_err());
        assert!(FlatIndex::from_bytes(&bytes[..bytes.len() - 1]).is_err());

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(FlatIndex::from_bytes(&bad_magic).is_err());

        let mut bad_version = bytes.clone();
        bad_version[4] = 9;
        assert!(FlatIndex::from_bytes(&bad_version).is_err());

        let mut zero_dims = bytes.clone();
        zero_dims[8..12].copy_from_slice(&0u32.to_le_bytes());
        assert!(FlatIndex::from_bytes(&zero_dims).is_err());
    }

    #[test]
    fn test_euclidean_distance_squared() {
        assert_eq!(euclidean_distance_squared(&[1.0, 2.0], &[4.0, 6.0]), 25.0);
        assert_eq!(euclidean_distance_squared(&[], &[]), 0.0);
    }
}
