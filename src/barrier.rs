use tokio::sync::watch;

/// Counts the outcomes that are still owed. Work is registered before it is dispatched and
/// completed once per recorded outcome; [`CompletionBarrier::wait`] returns once nothing
/// is pending.
#[derive(Debug)]
pub struct CompletionBarrier {
    pending: watch::Sender<usize>,
}

impl Default for CompletionBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionBarrier {
    pub fn new() -> Self {
        let (pending, _) = watch::channel(0);
        Self { pending }
    }

    pub fn register(&self, n: usize) {
        self.pending.send_modify(|pending| *pending += n);
    }

    /// Marks one unit of work as done. Returns `false` (and changes nothing) if nothing was
    /// pending.
    pub fn complete(&self) -> bool {
        let done = self.pending.send_if_modified(|pending| match pending.checked_sub(1) {
            Some(left) => {
                *pending = left;
                true
            }
            None => false,
        });
        if !done {
            tracing::warn!("completion signalled with no pending work");
        }
        done
    }

    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Resolves when the pending count is zero. No timeout: every registered unit is
    /// expected to complete, bounded by the request timeout.
    pub async fn wait(&self) {
        let mut rx = self.pending.subscribe();
        // The sender lives in `self`, so the channel can't close while we wait.
        let _ = rx.wait_for(|pending| *pending == 0).await;
    }
}
