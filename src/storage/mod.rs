//! Storage layer for keyseal
//!
//! Reads and writes key files and encrypted files with atomic writes and
//! automatic directory creation.

pub mod file_io;

pub use file_io::{
    load_envelope, load_key_record, save_envelope, save_key_record, stage_envelope,
    stage_key_record, KeyRecord, StagedFile,
};
