//! Backend logic for an interactive YouTube lookup tool: classify a
//! free-form query into a video / playlist / channel reference, resolve
//! the referenced content through the YouTube Data API, fabricate
//! illustrative download-link text via a generative-text API, and build
//! local command strings for third-party media tools.
//!
//! The UI layer is an external consumer: everything here is plain async
//! functions and plain data, keyed by caller-supplied API keys.

pub mod commands;
pub mod config;
pub mod direct;
pub mod resolver;
pub mod summary;

pub use commands::{Container, DownloadCommand, QualityCeiling};
pub use config::{ApiKeys, ConfigError};
pub use direct::{DirectLink, DirectLinkError, MediaResolver};
pub use resolver::{
    classify, ChannelRef, ContentResolver, DataApiClient, Reference, ResolveError,
    ResolvedContent, SearchHit,
};
pub use summary::{
    BatchItem, GeminiClient, GenerateError, QualityPreference, SummaryGenerator, SummaryResult,
};
