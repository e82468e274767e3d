use crate::domain_model::*;
use crate::domain_port::*;
use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, UserRecord>,
    /// Usernames inserted by a transaction that has not finished yet.
    reserved: HashMap<String, watch::Sender<bool>>,
    next_id: i64,
}

/// In-process `users` table with read-committed visibility and a unique key
/// on username. An insert that collides with another open transaction's
/// insert waits for that transaction to finish, then re-checks.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    state: Arc<Mutex<MemoryState>>,
    begun: Arc<AtomicUsize>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transactions opened so far.
    pub fn transactions_begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    pub fn get(&self, username: &str) -> Option<UserRecord> {
        self.lock().ok()?.users.get(username).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|state| state.users.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

#[async_trait::async_trait]
impl TxManager for MemoryUserStore {
    async fn begin<'t>(&'t self) -> anyhow::Result<Box<dyn StorageTx<'t> + 't>> {
        self.begun.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryTx {
            store: self,
            pending: Vec::new(),
        }))
    }
}

pub struct MemoryTx<'t> {
    store: &'t MemoryUserStore,
    pending: Vec<UserRecord>,
}

impl MemoryTx<'_> {
    fn finish(&mut self, commit: bool) -> anyhow::Result<()> {
        let mut state = self.store.lock()?;
        for record in self.pending.drain(..) {
            if let Some(done) = state.reserved.remove(&record.username) {
                done.send_replace(true);
            }
            if commit {
                state.users.insert(record.username.clone(), record);
            }
        }
        Ok(())
    }
}

impl Drop for MemoryTx<'_> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            let _ = self.finish(false);
        }
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryTx<'_> {
    async fn find_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        if let Some(own) = self.pending.iter().find(|r| r.username == username) {
            return Ok(Some(own.clone()));
        }
        Ok(self.store.lock()?.users.get(username).cloned())
    }

    async fn insert_user(
        &mut self,
        username: &str,
        password_hash: &str,
        signup_method: SignupMethod,
    ) -> Result<UserId, StoreError> {
        loop {
            let mut holder = {
                let mut state = self.store.lock()?;
                if state.users.contains_key(username)
                    || self.pending.iter().any(|r| r.username == username)
                {
                    return Err(StoreError::UniqueViolation);
                }

                match state.reserved.get(username) {
                    Some(done) => done.subscribe(),
                    None => {
                        state.next_id += 1;
                        let user_id = UserId(state.next_id);
                        let (done, _) = watch::channel(false);
                        state.reserved.insert(username.to_owned(), done);
                        self.pending.push(UserRecord {
                            user_id,
                            username: username.to_owned(),
                            password_hash: password_hash.to_owned(),
                            signup_method,
                        });
                        return Ok(user_id);
                    }
                }
            };

            // Sender dropped or flipped: either way the holder is done.
            let _ = holder.wait_for(|done| *done).await;
        }
    }
}

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx<'t> {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let mut tx = self;
        tx.finish(true)
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        let mut tx = self;
        tx.finish(false)
    }
}
