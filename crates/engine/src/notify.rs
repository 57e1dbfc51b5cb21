// SPDX-License-Identifier: MIT

//! Bridges `oj_adapters::NotifyAdapter` (which requires `Clone`, so it
//! can't be used as a trait object directly) into an object-safe
//! [`Notifier`] the orchestrator can hold without adding a fourth generic
//! parameter, the way [`crate::events::ObserverBridge`] does for
//! `EventSink`.

use async_trait::async_trait;
use oj_adapters::NotifyAdapter;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, message: &str);
}

pub struct NotifyBridge<N>(pub N);

#[async_trait]
impl<N: NotifyAdapter> Notifier for NotifyBridge<N> {
    async fn notify(&self, title: &str, message: &str) {
        if let Err(err) = self.0.notify(title, message).await {
            tracing::warn!(error = %err, "job notification failed");
        }
    }
}

pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _title: &str, _message: &str) {}
}
