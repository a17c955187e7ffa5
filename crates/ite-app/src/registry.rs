use std::collections::HashMap;

use async_trait::async_trait;
use ite_types::{SurfaceId, SurfaceMessage};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::surface::SurfaceHandle;

/// Delivers routed messages to page surfaces
#[async_trait]
pub trait SurfaceRouter: Send + Sync {
    /// `false` when the surface (or its controller) no longer exists
    async fn route(&self, surface: SurfaceId, message: SurfaceMessage) -> bool;

    /// Cancelled when the surface is closed
    async fn closed_token(&self, surface: SurfaceId) -> Option<CancellationToken>;
}

struct SurfaceEntry {
    url: String,
    closed: CancellationToken,
    controller: Option<SurfaceHandle>,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u32,
    active: Option<SurfaceId>,
    surfaces: HashMap<SurfaceId, SurfaceEntry>,
}

/// Open surfaces, the active one, and their injected controllers
#[derive(Default)]
pub struct SurfaceRegistry {
    inner: RwLock<RegistryInner>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn open(&self, url: impl Into<String>, activate: bool) -> SurfaceId {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = SurfaceId(inner.next_id);

        inner.surfaces.insert(
            id,
            SurfaceEntry {
                url: url.into(),
                closed: CancellationToken::new(),
                controller: None,
            },
        );
        if activate {
            inner.active = Some(id);
        }

        tracing::debug!("Opened {}", id);
        id
    }

    pub async fn activate(&self, id: SurfaceId) -> bool {
        let mut inner = self.inner.write().await;
        if !inner.surfaces.contains_key(&id) {
            return false;
        }
        inner.active = Some(id);
        true
    }

    /// The active surface and its URL
    pub async fn active(&self) -> Option<(SurfaceId, String)> {
        let inner = self.inner.read().await;
        let id = inner.active?;
        inner.surfaces.get(&id).map(|entry| (id, entry.url.clone()))
    }

    /// Close a surface; its controller stops and pending outcomes are dropped
    pub async fn close(&self, id: SurfaceId) -> bool {
        let mut inner = self.inner.write().await;
        let Some(entry) = inner.surfaces.remove(&id) else {
            return false;
        };
        if inner.active == Some(id) {
            inner.active = None;
        }
        entry.closed.cancel();

        tracing::debug!("Closed {}", id);
        true
    }

    pub async fn controller(&self, id: SurfaceId) -> Option<SurfaceHandle> {
        let inner = self.inner.read().await;
        inner.surfaces.get(&id)?.controller.clone()
    }

    /// Existing controller of `id`, or the one built by `spawn`.
    ///
    /// `spawn` runs under the registry lock, so a surface never gets two controllers.
    pub async fn controller_or_insert_with<F>(&self, id: SurfaceId, spawn: F) -> Option<SurfaceHandle>
    where
        F: FnOnce(CancellationToken) -> SurfaceHandle,
    {
        let mut inner = self.inner.write().await;
        let entry = inner.surfaces.get_mut(&id)?;

        if let Some(handle) = &entry.controller {
            return Some(handle.clone());
        }

        let handle = spawn(entry.closed.clone());
        entry.controller = Some(handle.clone());
        Some(handle)
    }
}

#[async_trait]
impl SurfaceRouter for SurfaceRegistry {
    async fn route(&self, surface: SurfaceId, message: SurfaceMessage) -> bool {
        // Do not hold the lock across the send
        let Some(handle) = self.controller(surface).await else {
            return false;
        };
        handle.send(message).await
    }

    async fn closed_token(&self, surface: SurfaceId) -> Option<CancellationToken> {
        let inner = self.inner.read().await;
        inner.surfaces.get(&surface).map(|entry| entry.closed.clone())
    }
}
