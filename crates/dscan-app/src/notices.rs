//! One-shot notices (success and error messages) for the display layer.
//!
//! Notices are delivered to a single observer, each at most once. The queue
//! is bounded; when it overflows the oldest undelivered notices are dropped
//! and the receiver logs how many were lost.

use dscan_core::Notice;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Create a notice queue holding at most `capacity` undelivered notices.
pub fn notice_channel(capacity: usize) -> (NoticeSender, NoticeReceiver) {
    let (tx, rx) = broadcast::channel(capacity.max(1));
    (NoticeSender { tx }, NoticeReceiver { rx })
}

#[derive(Clone)]
pub struct NoticeSender {
    tx: broadcast::Sender<Notice>,
}

impl NoticeSender {
    pub fn send(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("Notice dropped, nobody is listening");
        }
    }
}

/// The single consumer side of the notice queue. Deliberately not `Clone`.
pub struct NoticeReceiver {
    rx: broadcast::Receiver<Notice>,
}

impl NoticeReceiver {
    /// Wait for the next notice. Returns `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Notice> {
        loop {
            match self.rx.recv().await {
                Ok(notice) => return Some(notice),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notice queue overflowed, oldest notices dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next notice if one is already queued.
    pub fn try_recv(&mut self) -> Option<Notice> {
        loop {
            match self.rx.try_recv() {
                Ok(notice) => return Some(notice),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notice queue overflowed, oldest notices dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
