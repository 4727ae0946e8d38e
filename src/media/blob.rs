use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::foundation::error::SafezoneResult;

/// Opaque URL-like handle to bytes held by the host (a browser object URL, a temp file...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobHandle(String);

impl BlobHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates and revokes blob handles.
///
/// The session revokes each handle it installed exactly once: on clear, on replacement, on
/// load failure and on teardown.
pub trait BlobStore {
    fn create(&self, bytes: Arc<Vec<u8>>, content_type: &str) -> SafezoneResult<BlobHandle>;
    fn revoke(&self, handle: &BlobHandle);
}

#[derive(Debug, Default)]
struct BlobState {
    next: u64,
    live: BTreeMap<BlobHandle, Arc<Vec<u8>>>,
    revocations: BTreeMap<BlobHandle, usize>,
}

/// Single-threaded blob store keeping bytes in memory and counting revocations.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    state: RefCell<BlobState>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self, handle: &BlobHandle) -> bool {
        self.state.borrow().live.contains_key(handle)
    }

    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn bytes(&self, handle: &BlobHandle) -> Option<Arc<Vec<u8>>> {
        self.state.borrow().live.get(handle).cloned()
    }

    /// How many times `handle` was revoked.
    pub fn revocations(&self, handle: &BlobHandle) -> usize {
        self.state
            .borrow()
            .revocations
            .get(handle)
            .copied()
            .unwrap_or(0)
    }
}

impl BlobStore for InMemoryBlobStore {
    fn create(&self, bytes: Arc<Vec<u8>>, content_type: &str) -> SafezoneResult<BlobHandle> {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        let handle = BlobHandle::new(format!("blob:safezone/{}", state.next));
        tracing::debug!(%handle, content_type, bytes = bytes.len(), "blob created");
        state.live.insert(handle.clone(), bytes);
        Ok(handle)
    }

    fn revoke(&self, handle: &BlobHandle) {
        let mut state = self.state.borrow_mut();
        if state.live.remove(handle).is_none() {
            tracing::warn!(%handle, "revoking unknown or already revoked blob");
        }
        *state.revocations.entry(handle.clone()).or_insert(0) += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/blob.rs"]
mod tests;
