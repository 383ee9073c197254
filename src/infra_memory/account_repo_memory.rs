use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

/// Account table keyed by lower-cased email.
pub struct MemoryAccountRepo {
    by_email: DashMap<String, AccountRecord>,
    next_id: AtomicI64,
}

impl MemoryAccountRepo {
    pub fn new() -> Self {
        MemoryAccountRepo {
            by_email: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryAccountRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AccountRepo for MemoryAccountRepo {
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<AccountRecord, AuthError> {
        match self.by_email.entry(email.to_lowercase()) {
            Entry::Occupied(_) => Err(AuthError::EmailTaken),
            Entry::Vacant(slot) => {
                let record = AccountRecord {
                    user_id: UserId(self.next_id.fetch_add(1, Ordering::Relaxed)),
                    name: name.to_string(),
                    email: email.to_string(),
                    password_hash: password_hash.to_string(),
                    created_at: Utc::now(),
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<AccountRecord>, AuthError> {
        Ok(self
            .by_email
            .get(&email.to_lowercase())
            .map(|r| r.value().clone()))
    }
}
