//! Bridge to the external discussion-thread protocol.
//!
//! Every post gets a thread root owned by another protocol. The ledger only
//! needs one thing from that protocol: create the root for a post and say
//! where it lives. [`ThreadBridge`] is that narrow seam; [`ThreadProgram`]
//! is an in-process implementation of the thread protocol's side.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use spling_core::address::thread_address;
use spling_core::{Address, CoreError, ProgramId};
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from the thread protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("thread protocol unavailable")]
    Unavailable,

    #[error("thread already exists at {0}")]
    AlreadyExists(Address),

    #[error("thread root at {got}, expected {expected}")]
    AddressMismatch { expected: Address, got: Address },

    #[error("thread derivation failed: {0}")]
    Derivation(CoreError),
}

/// Creates thread roots in the external protocol.
#[async_trait]
pub trait ThreadBridge: Send + Sync {
    /// Create the thread root for a post and return its address.
    ///
    /// Asking again for the same post returns the existing root.
    async fn materialize_thread_root(&self, post: &Address) -> Result<Address, BridgeError>;
}

#[async_trait]
impl<T: ThreadBridge + ?Sized> ThreadBridge for Arc<T> {
    async fn materialize_thread_root(&self, post: &Address) -> Result<Address, BridgeError> {
        (**self).materialize_thread_root(post).await
    }
}

/// A thread root held by [`ThreadProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadRoot {
    pub post: Address,
    pub bump: u8,
}

/// In-process thread protocol.
///
/// Derives each root under its own program id as
/// `["thread", post, "post_thread"]`. A second request for the same post
/// gets the existing root back; a root held by a different post is never
/// handed out. It can be taken offline to model an unreachable protocol.
pub struct ThreadProgram {
    program_id: ProgramId,
    threads: Mutex<BTreeMap<Address, ThreadRoot>>,
    online: AtomicBool,
}

impl ThreadProgram {
    pub fn new(program_id: ProgramId) -> Self {
        Self {
            program_id,
            threads: Mutex::new(BTreeMap::new()),
            online: AtomicBool::new(true),
        }
    }

    pub fn program_id(&self) -> ProgramId {
        self.program_id
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Look up a root by its address.
    pub async fn thread(&self, address: &Address) -> Option<ThreadRoot> {
        self.threads.lock().await.get(address).copied()
    }

    pub async fn thread_count(&self) -> usize {
        self.threads.lock().await.len()
    }
}

#[async_trait]
impl ThreadBridge for ThreadProgram {
    async fn materialize_thread_root(&self, post: &Address) -> Result<Address, BridgeError> {
        if !self.is_online() {
            return Err(BridgeError::Unavailable);
        }

        let (address, bump) =
            thread_address(&self.program_id, post).map_err(BridgeError::Derivation)?;

        let mut threads = self.threads.lock().await;
        match threads.get(&address) {
            Some(root) if root.post == *post => {
                tracing::debug!(%post, %address, "thread root already exists");
            }
            Some(_) => return Err(BridgeError::AlreadyExists(address)),
            None => {
                threads.insert(address, ThreadRoot { post: *post, bump });
            }
        }

        Ok(address)
    }
}
