//! Infrastructure layer - SQLite storage

pub mod storage;
