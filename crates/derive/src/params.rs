//! This module contains the parameters and identifying types for the derivation pipeline.

/// Count the tagging info as 200 in terms of buffer size.
pub const FRAME_OVERHEAD: usize = 200;

/// The version of the derivation pipeline.
pub const DERIVATION_VERSION_0: u8 = 0;

/// [MAX_SPAN_BATCH_BYTES] is the maximum amount of bytes that will be needed
/// to decode every span batch field.
pub const MAX_SPAN_BATCH_BYTES: u64 = 10_000_000;

/// [CHANNEL_ID_LENGTH] is the length of the channel ID.
pub const CHANNEL_ID_LENGTH: usize = 16;

/// [ChannelId] is an opaque identifier for a channel.
pub type ChannelId = [u8; CHANNEL_ID_LENGTH];

/// The length of a frame carrying no data: channel id, frame number, data length and the
/// is-last flag.
pub const BASE_FRAME_LEN: usize = CHANNEL_ID_LENGTH + 2 + 4 + 1;

/// The zlib compression method (deflate) in the low nibble of a zlib CMF byte.
pub const ZLIB_DEFLATE_COMPRESSION_METHOD: u8 = 8;

/// The reserved zlib compression method in the low nibble of a zlib CMF byte.
pub const ZLIB_RESERVED_COMPRESSION_METHOD: u8 = 15;

/// The channel version byte announcing a Brotli compressed channel.
pub const CHANNEL_VERSION_BROTLI: u8 = 1;
