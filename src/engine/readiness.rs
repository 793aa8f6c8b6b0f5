/*!
 * Page readiness signal.
 *
 * The auto-translate decision runs once the markup is parsed, while
 * sub-resources may still be loading. The embedder owns the
 * [`ReadinessTrigger`] and fires it from its page-lifecycle hook; firing
 * consumes the trigger, so it can happen at most once per page load.
 */

use tokio::sync::oneshot;

/// Fired by the embedder when the page becomes interactive
#[derive(Debug)]
pub struct ReadinessTrigger {
    tx: oneshot::Sender<()>,
}

impl ReadinessTrigger {
    /// Signal that the markup has been parsed
    pub fn mark_interactive(self) {
        // The context may already be gone; nothing to do then
        let _ = self.tx.send(());
    }
}

/// Awaited by the context before running the decision sequence
#[derive(Debug)]
pub struct PageReadiness {
    rx: Option<oneshot::Receiver<()>>,
}

impl PageReadiness {
    /// Create a linked trigger / readiness pair
    pub fn channel() -> (ReadinessTrigger, PageReadiness) {
        let (tx, rx) = oneshot::channel();
        (ReadinessTrigger { tx }, PageReadiness { rx: Some(rx) })
    }

    /// Readiness for a page that is already past the interactive point
    pub fn already_interactive() -> Self {
        Self { rx: None }
    }

    /// Wait for the page; false if the trigger was dropped without firing
    pub async fn wait(self) -> bool {
        match self.rx {
            Some(rx) => rx.await.is_ok(),
            None => true,
        }
    }
}
