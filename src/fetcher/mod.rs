//! Source fetchers: materialize one artifact into a destination path.
//!
//! Git sources are shallow-cloned via the `git` binary, http(s) sources are
//! streamed to disk via libcurl. Path sources are references and never
//! copied, so there is no fetcher for them.

pub mod git;
pub mod http;
