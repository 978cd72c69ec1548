//! OpenSubtitles-style content hashing.
//!
//! The hash XOR-folds the first and last 64 KiB of the file, interpreted as
//! little-endian `u64` words, and pairs the fold with the file size so two
//! files of different length never collide even if their sampled bytes match.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use subcast_domain::catalog::VideoHash;

use crate::error::{CatalogError, CatalogResult};

const CHUNK_SIZE: u64 = 64 * 1024;
const WORD_SIZE: u64 = 8;

/// Compute the OpenSubtitles-style hash of a local video file.
///
/// # Errors
///
/// Returns [`CatalogError::Hash`] if the file cannot be opened, is shorter
/// than one hash word, or cannot be read in full.
pub fn hash_file(path: &Path) -> CatalogResult<VideoHash> {
    let mut file = File::open(path).map_err(|err| CatalogError::Hash {
        reason: format!("failed to open {}: {err}", path.display()),
    })?;
    let size_bytes = file
        .metadata()
        .map_err(|err| CatalogError::Hash {
            reason: format!("failed to read metadata for {}: {err}", path.display()),
        })?
        .len();

    if size_bytes < WORD_SIZE {
        return Err(CatalogError::Hash {
            reason: format!(
                "{} is too small to hash ({size_bytes} bytes)",
                path.display()
            ),
        });
    }

    let sample_size = CHUNK_SIZE.min(size_bytes);
    let mut hash = size_bytes;

    hash = hash.wrapping_add(fold_words(&mut file, 0, sample_size)?);

    let tail_start = size_bytes.saturating_sub(sample_size);
    hash = hash.wrapping_add(fold_words(&mut file, tail_start, sample_size)?);

    Ok(VideoHash {
        hash,
        size_bytes,
    })
}

/// Read `len` bytes starting at `offset` and XOR-fold them as little-endian
/// `u64` words, ignoring any trailing bytes short of a full word.
fn fold_words(file: &mut File, offset: u64, len: u64) -> CatalogResult<u64> {
    file.seek(SeekFrom::Start(offset))
        .map_err(|err| CatalogError::Hash {
            reason: format!("seek failed at offset {offset}: {err}"),
        })?;

    #[allow(clippy::cast_possible_truncation)]
    let mut buf = vec![0_u8; len as usize];
    file.read_exact(&mut buf).map_err(|err| CatalogError::Hash {
        reason: format!("read failed at offset {offset}: {err}"),
    })?;

    let mut folded = 0_u64;
    for word in buf.chunks_exact(WORD_SIZE as usize) {
        let bytes: [u8; 8] = word.try_into().expect("chunks_exact yields 8-byte slices");
        folded = folded.wrapping_add(u64::from_le_bytes(bytes));
    }
    Ok(folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hashes_a_small_file_using_every_byte_twice() {
        let mut file = tempfile_with(&[1_u8; 16]);
        let hash = hash_file(file.path()).expect("hash succeeds");
        assert_eq!(hash.size_bytes, 16);

        let word = u64::from_le_bytes([1; 8]);
        let expected = 16_u64
            .wrapping_add(word)
            .wrapping_add(word);
        assert_eq!(hash.hash, expected);
    }

    #[test]
    fn rejects_files_shorter_than_one_word() {
        let file = tempfile_with(&[9_u8; 4]);
        let err = hash_file(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Hash { .. }));
    }

    #[test]
    fn large_file_samples_head_and_tail_independently() {
        let mut body = vec![0_u8; (CHUNK_SIZE * 3) as usize];
        body[0..8].copy_from_slice(&1_u64.to_le_bytes());
        let tail_start = body.len() - 8;
        body[tail_start..].copy_from_slice(&2_u64.to_le_bytes());
        let file = tempfile_with(&body);

        let hash = hash_file(file.path()).expect("hash succeeds");
        assert_eq!(hash.size_bytes, body.len() as u64);
    }

    fn tempfile_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(bytes).expect("write temp file");
        file.flush().expect("flush temp file");
        file
    }
}
