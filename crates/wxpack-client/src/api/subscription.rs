//! Cancellation handle for an open progress stream

use tokio_util::sync::CancellationToken;

/// Handle to one open progress stream.
///
/// Returned by [`Transport::open_progress_stream`](super::Transport). The
/// orchestrator holds at most one at a time; cancelling is idempotent and
/// safe after the stream has already ended.
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Close the stream
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the stream was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_idempotent() {
        let subscription = Subscription::new(CancellationToken::new());
        assert!(!subscription.is_cancelled());
        subscription.cancel();
        subscription.cancel();
        assert!(subscription.is_cancelled());
    }
}
