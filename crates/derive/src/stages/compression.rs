//! Channel compression schemes.
//!
//! The first byte of a channel selects the scheme. A zlib stream is recognized by the
//! compression method in the low nibble of its CMF byte (8 for deflate, 15 reserved); Brotli
//! channels carry a `0x01` version byte ahead of the stream.

use crate::{
    errors::CompressionError,
    params::{
        CHANNEL_VERSION_BROTLI, ZLIB_DEFLATE_COMPRESSION_METHOD, ZLIB_RESERVED_COMPRESSION_METHOD,
    },
};
use miniz_oxide::inflate::{decompress_to_vec_zlib_with_limit, TINFLStatus};
use std::io::Read;
use tracing::trace;

/// The size of the Brotli decompressor's internal buffer.
const BROTLI_BUFFER_SIZE: usize = 4096;

/// Decompresses channel data, failing if the output exceeds `max_size` bytes.
pub fn decompress(data: &[u8], max_size: u64) -> Result<Vec<u8>, CompressionError> {
    let Some(&first) = data.first() else {
        return Err(CompressionError::Empty);
    };

    let method = first & 0x0F;
    if method == ZLIB_DEFLATE_COMPRESSION_METHOD || method == ZLIB_RESERVED_COMPRESSION_METHOD {
        return decompress_zlib(data, max_size);
    }
    if first == CHANNEL_VERSION_BROTLI {
        return decompress_brotli(&data[1..], max_size);
    }
    Err(CompressionError::UnknownType(first))
}

fn decompress_zlib(data: &[u8], max_size: u64) -> Result<Vec<u8>, CompressionError> {
    let limit = usize::try_from(max_size).unwrap_or(usize::MAX);
    decompress_to_vec_zlib_with_limit(data, limit).map_err(|e| match e.status {
        TINFLStatus::HasMoreOutput => CompressionError::TooLarge(max_size),
        status => CompressionError::Zlib(format!("{status:?}")),
    })
}

fn decompress_brotli(data: &[u8], max_size: u64) -> Result<Vec<u8>, CompressionError> {
    trace!(target: "brotli", "Decompressing {} bytes", data.len());
    let mut output = Vec::new();
    brotli::Decompressor::new(data, BROTLI_BUFFER_SIZE)
        .take(max_size.saturating_add(1))
        .read_to_end(&mut output)
        .map_err(|e| CompressionError::Brotli(e.to_string()))?;
    if output.len() as u64 > max_size {
        return Err(CompressionError::TooLarge(max_size));
    }
    Ok(output)
}

/// Compresses data with zlib at the default level.
pub fn compress_zlib(data: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(data, 6)
}

/// Compresses data with Brotli and prefixes the Brotli version byte.
pub fn compress_brotli(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut output = vec![CHANNEL_VERSION_BROTLI];
    let mut reader = brotli::CompressorReader::new(data, BROTLI_BUFFER_SIZE, 9, 22);
    reader.read_to_end(&mut output).map_err(|e| CompressionError::Brotli(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn test_decompress_brotli() {
        let compressed = hex!("018b048075ed184249e9bc19675e");
        let decompressed = decompress(&compressed, 1_000).unwrap();
        assert_eq!(decompressed, hex!("75ed184249e9bc19675e"));
    }

    #[test]
    fn test_brotli_too_large() {
        let compressed = hex!("018b048075ed184249e9bc19675e");
        assert_eq!(decompress(&compressed, 9), Err(CompressionError::TooLarge(9)));
        assert!(decompress(&compressed, 10).is_ok());
    }

    #[test]
    fn test_zlib_roundtrip() {
        let data = b"a channel full of batches".repeat(10);
        let compressed = compress_zlib(&data);
        assert_eq!(compressed[0] & 0x0F, ZLIB_DEFLATE_COMPRESSION_METHOD);
        assert_eq!(decompress(&compressed, 1_000).unwrap(), data);
    }

    #[test]
    fn test_zlib_too_large() {
        let data = vec![0u8; 1_000];
        let compressed = compress_zlib(&data);
        assert_eq!(decompress(&compressed, 999), Err(CompressionError::TooLarge(999)));
        assert_eq!(decompress(&compressed, 2_000).unwrap(), data);
    }

    #[test]
    fn test_corrupt_zlib() {
        let err = decompress(&[0x78, 0x9c, 0xff, 0xff], 1_000).unwrap_err();
        assert!(matches!(err, CompressionError::Zlib(_)));
    }

    #[test]
    fn test_brotli_compress() {
        let data = b"brotli batches".repeat(8);
        let compressed = compress_brotli(&data).unwrap();
        assert_eq!(compressed[0], CHANNEL_VERSION_BROTLI);
        assert_eq!(decompress(&compressed, 1_000).unwrap(), data);
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(decompress(&[], 10), Err(CompressionError::Empty));
        assert_eq!(decompress(&[0x02, 0x00], 10), Err(CompressionError::UnknownType(0x02)));
    }
}
