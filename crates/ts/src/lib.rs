//! Transport Stream (TS) parser for PAT and PMT tables
//!
//! This crate reads MPEG-TS packets, reassembles the Program Association
//! Table (PAT) and Program Map Tables (PMT) and reports which elementary
//! streams a buffer declares. It does not demultiplex or decode PES payloads.

pub mod crc;
pub mod descriptor;
pub mod error;
pub mod packet;
pub mod pat;
pub mod pmt;
pub mod probe;
pub mod psi;

pub use error::TsError;
pub use packet::{PID_NULL, PID_PAT, SYNC_BYTE, TS_PACKET_SIZE, TsPacket};
pub use pat::{Pat, PatProgram};
pub use pmt::{ElementaryStream, Pmt, StreamKind, StreamType};
pub use probe::{ContainerFormat, Program, StreamInventory, detect_format, probe_streams};

/// Result type for TS parsing operations
pub type Result<T> = std::result::Result<T, TsError>;
