//! Document scanner seam.
//!
//! Capturing pages and producing a PDF is a platform concern. The app only
//! needs to know whether a scan finished and where its PDF landed.

use async_trait::async_trait;
use dscan_core::AppError;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A PDF was written to `pdf`, outside managed storage.
    Completed { pdf: PathBuf },
    /// The user backed out; nothing to import.
    Cancelled,
}

#[async_trait]
pub trait DocumentScanner: Send + Sync {
    async fn scan(&self) -> Result<ScanOutcome, AppError>;
}

/// Scanner that hands back an already existing PDF, e.g. one given on the command line.
#[derive(Debug, Clone)]
pub struct PathScanner {
    pdf: Option<PathBuf>,
}

impl PathScanner {
    pub fn new(pdf: impl Into<PathBuf>) -> Self {
        Self {
            pdf: Some(pdf.into()),
        }
    }

    /// A scanner whose every scan is cancelled.
    pub fn cancelled() -> Self {
        Self { pdf: None }
    }
}

#[async_trait]
impl DocumentScanner for PathScanner {
    async fn scan(&self) -> Result<ScanOutcome, AppError> {
        let Some(pdf) = &self.pdf else {
            return Ok(ScanOutcome::Cancelled);
        };
        if !tokio::fs::try_exists(pdf).await.unwrap_or(false) {
            return Err(AppError::NotFound(format!(
                "Scan result not found: {}",
                pdf.display()
            )));
        }
        Ok(ScanOutcome::Completed { pdf: pdf.clone() })
    }
}
