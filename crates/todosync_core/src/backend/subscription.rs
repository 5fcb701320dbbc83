//! Scoped bundle of the three realtime subscriptions.
//!
//! # Invariants
//! - Either all three topics are subscribed or none are.
//! - Handles are released together, on `close` or on drop.

use super::{BackendResult, EventSink, RealtimeChannel, Subscription, Topic};
use log::{info, warn};

/// Create/update/delete subscriptions owned as one resource.
pub struct SubscriptionSet {
    handles: Vec<Box<dyn Subscription>>,
}

impl SubscriptionSet {
    /// Subscribes every topic to `sink`.
    ///
    /// # Errors
    /// - Returns the first subscribe failure. Handles acquired before the
    ///   failure are released before returning.
    pub fn acquire<C: RealtimeChannel + ?Sized>(
        channel: &C,
        sink: &EventSink,
    ) -> BackendResult<Self> {
        let mut set = Self {
            handles: Vec::with_capacity(Topic::ALL.len()),
        };
        for topic in Topic::ALL {
            match channel.subscribe(topic, sink.clone()) {
                Ok(handle) => set.handles.push(handle),
                Err(err) => {
                    warn!(
                        "event=subscribe module=realtime status=error topic={} error={}",
                        topic.field_name(),
                        err
                    );
                    // `set` drops here and releases the partial acquisition.
                    return Err(err);
                }
            }
        }
        info!(
            "event=subscribe module=realtime status=ok topics={}",
            set.handles.len()
        );
        Ok(set)
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.handles.iter().map(|handle| handle.topic()).collect()
    }

    pub fn is_active(&self) -> bool {
        !self.handles.is_empty()
    }

    /// Releases all handles now.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        let released = self.handles.len();
        for handle in self.handles.drain(..) {
            handle.unsubscribe();
        }
        info!("event=unsubscribe module=realtime status=ok topics={released}");
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for SubscriptionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionSet")
            .field("topics", &self.topics())
            .finish()
    }
}
