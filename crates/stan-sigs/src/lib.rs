//! stan-sigs: function signature comments embedded in the functions reference.
//!
//! The functions reference documents every signature twice: once as prose and
//! once as a machine-readable HTML comment such as
//! `<!-- real; normal_lpdf; (reals y | reals mu, reals sigma); -->`.
//! This crate finds those comments, turns them into [`SignatureRecord`]s and
//! builds the alphabetical index page that links back to them.
//!
//! The crate is shared by the `stan-docs` CLI and has no process-wide state:
//! every scan fills a caller-owned [`SignatureSet`].

pub mod extract;
pub mod index;
pub mod operators;
pub mod signature;
pub mod write;

pub use extract::{extract_dir, ExtractError, SignatureSet, SourcedSignature};
pub use index::FunctionIndex;
pub use signature::{parse_line, Arguments, LineParse, Reject, SignatureRecord, COMMENT_OPEN};
pub use write::{write_atomic, WriteError};
