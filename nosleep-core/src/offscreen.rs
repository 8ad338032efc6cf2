// Singleton guard for the offscreen relay document
//
// Chrome allows one offscreen document per extension. Several triggers can
// ask for it before the first createDocument() resolves, so the pending
// creation is kept as a shared future that later callers await instead of
// creating again.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use std::cell::RefCell;
use std::rc::Rc;

/// Hosting API for the offscreen document.
#[async_trait(?Send)]
pub trait DocumentHost {
    /// Whether the document is already open
    async fn has_document(&self) -> Result<bool>;

    async fn create_document(&self) -> Result<()>;
}

type Creation = Shared<LocalBoxFuture<'static, Result<(), Rc<anyhow::Error>>>>;

pub struct OffscreenGuard<D: DocumentHost + 'static> {
    host: Rc<D>,
    creating: RefCell<Option<Creation>>,
}

impl<D: DocumentHost + 'static> OffscreenGuard<D> {
    pub fn new(host: D) -> Self {
        Self {
            host: Rc::new(host),
            creating: RefCell::new(None),
        }
    }

    pub fn host(&self) -> &D {
        &self.host
    }

    pub fn is_creating(&self) -> bool {
        self.creating.borrow().is_some()
    }

    pub async fn exists(&self) -> Result<bool> {
        self.host.has_document().await
    }

    /// Make sure the document exists, creating it at most once.
    ///
    /// A failed creation is reported to every caller that awaited it and
    /// clears the pending marker, so the next call tries again. A rejected
    /// creation while the document is open counts as success.
    pub async fn ensure(&self) -> Result<()> {
        if self.host.has_document().await? {
            return Ok(());
        }

        let creation = self.pending_or_start();
        let result = creation.clone().await;

        {
            let mut slot = self.creating.borrow_mut();
            if slot.as_ref().is_some_and(|c| c.ptr_eq(&creation)) {
                *slot = None;
            }
        }

        result.map_err(|e| anyhow!("Failed to create offscreen document: {:#}", e))
    }

    fn pending_or_start(&self) -> Creation {
        let mut slot = self.creating.borrow_mut();
        if let Some(pending) = slot.as_ref() {
            log::debug!("Offscreen document creation in flight, waiting");
            return pending.clone();
        }

        log::debug!("Creating offscreen document");
        let host = self.host.clone();
        let creation = async move {
            match host.create_document().await {
                Ok(()) => Ok(()),
                // Reached when our existence check resolved after an earlier
                // creation finished. Chrome rejects the duplicate.
                Err(e) => match host.has_document().await {
                    Ok(true) => {
                        log::debug!("Offscreen document already open: {:#}", e);
                        Ok(())
                    }
                    _ => Err(Rc::new(e)),
                },
            }
        }
        .boxed_local()
        .shared();
        *slot = Some(creation.clone());
        creation
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Pending on first poll, ready on the second
    pub(crate) struct YieldOnce(bool);

    impl YieldOnce {
        pub(crate) fn new() -> Self {
            Self(false)
        }
    }

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeDocumentHost {
        pub open: Cell<bool>,
        pub created: Cell<u32>,
        pub fail: Cell<bool>,
        /// Extra polls before each successive existence check answers
        pub check_delays: RefCell<VecDeque<u32>>,
    }

    #[async_trait(?Send)]
    impl DocumentHost for FakeDocumentHost {
        async fn has_document(&self) -> Result<bool> {
            // Answers with the state at the time of the call
            let open = self.open.get();
            let delay = self.check_delays.borrow_mut().pop_front().unwrap_or(0);
            for _ in 0..delay {
                YieldOnce::new().await;
            }
            Ok(open)
        }

        async fn create_document(&self) -> Result<()> {
            YieldOnce::new().await;
            if self.fail.get() || self.open.get() {
                anyhow::bail!("Only a single offscreen document may be created");
            }
            self.created.set(self.created.get() + 1);
            self.open.set(true);
            Ok(())
        }
    }

    #[test]
    fn test_concurrent_ensure_creates_once() {
        let guard = OffscreenGuard::new(FakeDocumentHost::default());

        let (a, b, c) = block_on(async { futures::join!(guard.ensure(), guard.ensure(), guard.ensure()) });
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(guard.host().created.get(), 1);
        assert!(!guard.is_creating());

        block_on(guard.ensure()).unwrap();
        assert_eq!(guard.host().created.get(), 1);
    }

    #[test]
    fn test_failure_reaches_all_waiters_then_retries() {
        let guard = OffscreenGuard::new(FakeDocumentHost::default());
        guard.host().fail.set(true);

        let (a, b) = block_on(async { futures::join!(guard.ensure(), guard.ensure()) });
        assert!(a.is_err());
        assert!(b.is_err());
        assert!(!guard.is_creating());
        assert!(format!("{:#}", a.unwrap_err()).contains("Only a single offscreen document"));

        guard.host().fail.set(false);
        block_on(guard.ensure()).unwrap();
        assert_eq!(guard.host().created.get(), 1);
    }

    #[test]
    fn test_late_existence_check_does_not_fail() {
        let guard = OffscreenGuard::new(FakeDocumentHost::default());
        // The second caller only learns "no document" after the first
        // creation has completed and cleared the marker
        *guard.host().check_delays.borrow_mut() = VecDeque::from([0, 4]);

        let (a, b) = block_on(async { futures::join!(guard.ensure(), guard.ensure()) });
        assert!(a.is_ok());
        assert!(b.is_ok(), "{:#}", b.unwrap_err());
        assert_eq!(guard.host().created.get(), 1);
        assert!(!guard.is_creating());
    }

    #[test]
    fn test_existing_document_is_reused() {
        let guard = OffscreenGuard::new(FakeDocumentHost::default());
        guard.host().open.set(true);

        block_on(guard.ensure()).unwrap();
        assert_eq!(guard.host().created.get(), 0);
    }
}
