//! Configuration module
//!
//! Settings come from a variable lookup, normally the process environment
//! after the binary has loaded any `.env` file. They say where the metadata
//! database and managed PDFs live, how many background threads run store
//! operations, and how many one-shot notices may queue up.

use std::path::PathBuf;

use crate::constants::{
    DATABASE_FILE_NAME, DEFAULT_BACKGROUND_THREADS, DEFAULT_NOTICE_CAPACITY, MANAGED_FILES_DIR,
};

const DEFAULT_DATA_DIR: &str = "./dscan-data";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Root directory for everything DScan persists.
    pub data_dir: PathBuf,
    /// SQLite database file holding document metadata.
    pub database_path: PathBuf,
    /// Directory holding the managed PDF files.
    pub storage_dir: PathBuf,
    /// Capacity of the one-shot notice queue; the oldest notice is dropped on overflow.
    pub notice_capacity: usize,
    /// Worker threads of the background executor running store operations.
    pub background_threads: usize,
    /// Initial theme preference.
    pub dark_mode: bool,
    /// `pretty` or `json`.
    pub log_format: String,
}

impl Config {
    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(
            lookup("DSCAN_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let database_path = lookup("DSCAN_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DATABASE_FILE_NAME));

        let storage_dir = lookup("DSCAN_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(MANAGED_FILES_DIR));

        let notice_capacity = lookup("DSCAN_NOTICE_CAPACITY")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_NOTICE_CAPACITY);

        let background_threads = lookup("DSCAN_BACKGROUND_THREADS")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_BACKGROUND_THREADS);

        let dark_mode = lookup("DSCAN_DARK_MODE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        let log_format = lookup("DSCAN_LOG_FORMAT").unwrap_or_else(|| "pretty".to_string());

        Self {
            data_dir,
            database_path,
            storage_dir,
            notice_capacity,
            background_threads,
            dark_mode,
            log_format,
        }
    }

    /// Configuration rooted at `data_dir` with every other setting at its default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            database_path: data_dir.join(DATABASE_FILE_NAME),
            storage_dir: data_dir.join(MANAGED_FILES_DIR),
            data_dir,
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
            background_threads: DEFAULT_BACKGROUND_THREADS,
            dark_mode: false,
            log_format: "pretty".to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.notice_capacity == 0 {
            return Err(anyhow::anyhow!(
                "DSCAN_NOTICE_CAPACITY must be greater than zero"
            ));
        }
        if self.background_threads == 0 {
            return Err(anyhow::anyhow!(
                "DSCAN_BACKGROUND_THREADS must be greater than zero"
            ));
        }
        if self.storage_dir == self.database_path {
            return Err(anyhow::anyhow!(
                "DSCAN_STORAGE_DIR and DSCAN_DATABASE_PATH must differ"
            ));
        }
        Ok(())
    }
}
