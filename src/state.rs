//! Shared application state for the HTTP layer.
//!
//! Holds the loaded configuration and the in-memory report store. Uses
//! `RwLock` so concurrent print-view reads do not block each other.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::ReportPayload;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Bounded store of assembled reports, keyed by report id.
///
/// Insertion order is tracked so the oldest report is evicted first once
/// `capacity` is reached. Contents are lost on restart.
#[derive(Debug)]
pub struct ReportStore {
    capacity: usize,
    reports: HashMap<Uuid, Arc<ReportPayload>>,
    order: VecDeque<Uuid>,
}

impl ReportStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            reports: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Store a report and return its new id.
    pub fn insert(&mut self, payload: ReportPayload) -> Uuid {
        while self.order.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.reports.remove(&evicted);
                tracing::debug!(report_id = %evicted, "report evicted");
            }
        }
        let id = Uuid::new_v4();
        self.reports.insert(id, Arc::new(payload));
        self.order.push_back(id);
        tracing::info!(report_id = %id, stored = self.order.len(), "report stored");
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<ReportPayload>> {
        self.reports.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Shared by every handler through `Arc`.
pub struct AppState {
    pub config: AppConfig,
    reports: RwLock<ReportStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let reports = RwLock::new(ReportStore::new(config.report_capacity));
        Self { config, reports }
    }

    pub fn read_reports(&self) -> Result<RwLockReadGuard<'_, ReportStore>, CoreError> {
        self.reports.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_reports(&self) -> Result<RwLockWriteGuard<'_, ReportStore>, CoreError> {
        self.reports.write().map_err(|_| CoreError::LockPoisoned)
    }

    /// Store a report; the write lock is held only for the insert.
    pub fn store_report(&self, payload: ReportPayload) -> Result<Uuid, CoreError> {
        Ok(self.write_reports()?.insert(payload))
    }

    pub fn report(&self, id: &Uuid) -> Result<Option<Arc<ReportPayload>>, CoreError> {
        Ok(self.read_reports()?.get(id))
    }
}
