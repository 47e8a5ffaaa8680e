//! In-memory stores
//!
//! Suitable for tests and single-process deployments; contents are lost when
//! the process exits.

use super::{AuditLog, CacheRecord, VerdictStore};
use crate::error::Result;
use async_trait::async_trait;
use phishscan_core::AuditRecord;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory verdict store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, CacheRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VerdictStore for MemoryStore {
    async fn get(&self, url: &str) -> Result<Option<CacheRecord>> {
        Ok(self.records.read().await.get(url).cloned())
    }

    async fn put(&self, record: &CacheRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.url.clone(), record.clone());
        Ok(())
    }
}

/// In-memory audit log
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: RwLock<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn append(&self, record: &AuditRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn history(&self, user: &str) -> Result<Vec<AuditRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|record| record.user == user)
            .cloned()
            .collect())
    }
}
