//! Small single-user time tracker. Projects, running timers and manual entries are kept in a
//! local key-value store, summarized into weekly reports and CSV exports, and optionally pushed
//! to a webhook whenever an entry changes.
//!

pub mod cli;
pub mod export;
pub mod report;
pub mod storage;
pub mod tracker;
pub mod utils;
pub mod webhook;
