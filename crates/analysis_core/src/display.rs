//! Display references: opaque handles standing in for viewable copies of file bytes.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc, Mutex,
    },
};

use anyhow::{anyhow, Result};
use shared::domain::{DisplayRef, FileRef};
use tracing::{debug, warn};

pub trait DisplayRefProvider: Send + Sync {
    fn acquire(&self, file: &FileRef) -> Result<DisplayRef>;
    fn release(&self, handle: DisplayRef);
}

/// Keeps acquired payloads in memory until released.
#[derive(Default)]
pub struct InMemoryDisplayRefs {
    next_id: AtomicI64,
    live: Mutex<HashMap<DisplayRef, Arc<Vec<u8>>>>,
}

impl InMemoryDisplayRefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, handle: DisplayRef) -> Option<Arc<Vec<u8>>> {
        self.live
            .lock()
            .ok()
            .and_then(|live| live.get(&handle).cloned())
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or_default()
    }
}

impl DisplayRefProvider for InMemoryDisplayRefs {
    fn acquire(&self, file: &FileRef) -> Result<DisplayRef> {
        if file.payload.is_empty() {
            return Err(anyhow!("file '{}' has no readable bytes", file.name));
        }
        let handle = DisplayRef(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mut live = self
            .live
            .lock()
            .map_err(|_| anyhow!("display reference table poisoned"))?;
        live.insert(handle, Arc::clone(&file.payload));
        debug!(handle = %handle, file_name = %file.name, "acquired display reference");
        Ok(handle)
    }

    fn release(&self, handle: DisplayRef) {
        let Ok(mut live) = self.live.lock() else {
            return;
        };
        if live.remove(&handle).is_none() {
            warn!(handle = %handle, "release of unknown display reference");
        } else {
            debug!(handle = %handle, "released display reference");
        }
    }
}
