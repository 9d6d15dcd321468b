// magic identification bytes for metadata.bin
pub const MAGIC_HEADER: [u8; 4] = [109, 100, 114, 33]; // ascii "mdr!"

// bit-plane word layout
pub const WORD_BITS: usize = 64;

// default adaptive lossless-compression threshold, in bytes (spec default)
pub const DEFAULT_LOSSLESS_THRESHOLD: usize = 2000;

// default zstd compression level used by the level compressor
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

// supported array dimensionality
pub const SUPPORTED_RANK: usize = 3;
