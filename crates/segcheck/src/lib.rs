//! # Segcheck engine
//!
//! Conformance checks for HLS streams: walks a master playlist down to its
//! media segments and verifies that every MPEG-TS segment declares at least
//! one video and one audio stream.
//!
//! ## Features
//!
//! - Line-level m3u8 reading, no tag interpretation
//! - Naive or RFC 3986 URI resolution
//! - One test case per segment, with ordered reports and optional concurrency
//! - Stream detection from PAT/PMT without decoding any frame

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod playlist;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod validator;

#[doc(hidden)]
pub mod testing;

pub use builder::CheckerConfigBuilder;
pub use client::create_client;
pub use config::CheckerConfig;
pub use error::CheckError;

pub use fetcher::{PlaylistFetcher, ResourceFetcher};
pub use playlist::{Playlist, parse};
pub use resolver::{SegmentCase, SegmentResolver, UrlResolution, resolve_uri};
pub use validator::{StreamPresence, StreamSummary, ValidationError, inspect, validate};

pub use report::{CaseOutcome, CaseReport, RunReport, Summary};
pub use runner::{CheckEvent, OnEvent, SegmentChecker};
