use thiserror::Error;

/// Errors that can occur during TS parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TsError {
    #[error("Invalid packet size: expected 188 bytes, got {0}")]
    InvalidPacketSize(usize),

    #[error("Invalid sync byte: expected 0x47, got 0x{0:02x}")]
    InvalidSyncByte(u8),

    #[error("Insufficient data: expected at least {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Invalid table ID: expected {expected}, got {actual}")]
    InvalidTableId { expected: u8, actual: u8 },

    #[error("Invalid section length: {0}")]
    InvalidSectionLength(u16),

    #[error("CRC32 mismatch: expected 0x{expected:08x}, calculated 0x{calculated:08x}")]
    Crc32Mismatch { expected: u32, calculated: u32 },

    #[error("Section syntax indicator not set for table 0x{0:02x}")]
    MissingSectionSyntax(u8),

    #[error("Input is empty")]
    EmptyInput,

    #[error("No transport stream packets found in {0} bytes")]
    NoPackets(usize),

    #[error("Unsupported container format: {0}")]
    UnsupportedFormat(&'static str),

    #[error("No program association table found")]
    MissingPat,

    #[error("No program map table found for {0} announced program(s)")]
    MissingPmt(usize),
}
