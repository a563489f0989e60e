//! Low-stock alert dispatch.
//!
//! Delivery transports (SMTP, chat webhooks) are external; they plug in by
//! implementing [`LowStockNotifier`].

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockledger_core::{LocationId, ProductId};
use stockledger_inventory::BalanceEntry;

/// A single low-stock notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub recipient: String,
    pub subject: String,
    pub product_id: ProductId,
    pub product_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub qty: u64,
    pub threshold: u64,
}

impl LowStockAlert {
    pub fn new(entry: &BalanceEntry, recipient: impl Into<String>, threshold: u64) -> Self {
        Self {
            recipient: recipient.into(),
            subject: format!("Low Stock Alert: {}", entry.product_name),
            product_id: entry.product_id.clone(),
            product_name: entry.product_name.clone(),
            location_id: entry.location_id.clone(),
            location_name: entry.location_name.clone(),
            qty: entry.qty,
            threshold,
        }
    }

    /// Plain-text message body.
    pub fn body(&self) -> String {
        format!(
            "The following product is running low on stock:\n\
             Product: {} ({})\n\
             Location: {}\n\
             Current Quantity: {}\n\
             Please restock this item soon.",
            self.product_name, self.product_id, self.location_name, self.qty
        )
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("alert delivery failed: {0}")]
    Delivery(String),
}

/// Sink for low-stock alerts.
pub trait LowStockNotifier: Send + Sync {
    fn notify(&self, alert: &LowStockAlert) -> Result<(), NotifyError>;
}

impl<N> LowStockNotifier for Arc<N>
where
    N: LowStockNotifier + ?Sized,
{
    fn notify(&self, alert: &LowStockAlert) -> Result<(), NotifyError> {
        (**self).notify(alert)
    }
}

/// Writes alerts to the log at `warn` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl LowStockNotifier for TracingNotifier {
    fn notify(&self, alert: &LowStockAlert) -> Result<(), NotifyError> {
        tracing::warn!(
            recipient = %alert.recipient,
            product_id = %alert.product_id,
            location_id = %alert.location_id,
            qty = alert.qty,
            threshold = alert.threshold,
            "{}",
            alert.subject
        );
        Ok(())
    }
}

/// Collects alerts in memory.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    sent: Mutex<Vec<LowStockAlert>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<LowStockAlert> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }
}

impl LowStockNotifier for InMemoryNotifier {
    fn notify(&self, alert: &LowStockAlert) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .map_err(|_| NotifyError::Delivery("notifier lock poisoned".to_string()))?
            .push(alert.clone());
        Ok(())
    }
}
