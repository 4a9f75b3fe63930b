//! Application-wide constants.

/// File name of the metadata database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "documents.db";

/// Directory (relative to the data directory) holding managed PDF files.
pub const MANAGED_FILES_DIR: &str = "pdfs";

/// Message used when an operation fails without a more specific description.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong!";

pub const MSG_INSERTED: &str = "Inserted document successfully";
pub const MSG_UPDATED: &str = "Updated document successfully";
pub const MSG_DELETED: &str = "Deleted document successfully";

/// Default capacity of the one-shot notice queue.
pub const DEFAULT_NOTICE_CAPACITY: usize = 16;

/// Default number of worker threads in the background executor.
pub const DEFAULT_BACKGROUND_THREADS: usize = 2;
