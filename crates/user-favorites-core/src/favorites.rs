// SPDX-License-Identifier: AGPL-3.0
// User Favorites Core - Shared favorites state
//
// Owns the process-wide favorite set. Views hold an Arc to it and watch
// for changes instead of reaching for a global.

use crate::storage::FavoritesStorage;
use crate::types::AppError;
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};
use tokio::sync::watch;

/// Lifecycle of the favorites manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoritesPhase {
    Uninitialized,
    Loading,
    Ready,
}

struct FavoritesState {
    phase: FavoritesPhase,
    ids: BTreeSet<u32>,
}

/// In-memory favorite set backed by [`FavoritesStorage`]
pub struct FavoritesManager {
    storage: FavoritesStorage,
    state: RwLock<FavoritesState>,
    changes: watch::Sender<BTreeSet<u32>>,
}

impl FavoritesManager {
    /// Create an uninitialized manager; call [`initialize`](Self::initialize) before toggling
    pub fn new(storage: FavoritesStorage) -> Self {
        let (changes, _) = watch::channel(BTreeSet::new());
        Self {
            storage,
            state: RwLock::new(FavoritesState {
                phase: FavoritesPhase::Uninitialized,
                ids: BTreeSet::new(),
            }),
            changes,
        }
    }

    /// Create a manager and load the stored favorites
    pub fn load(storage: FavoritesStorage) -> Self {
        let manager = Self::new(storage);
        manager.initialize();
        manager
    }

    /// Load the favorite set from storage and become ready.
    /// Does nothing if loading already started.
    pub fn initialize(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.phase != FavoritesPhase::Uninitialized {
                return;
            }
            state.phase = FavoritesPhase::Loading;
        }

        let ids = self.storage.load();
        tracing::info!("Loaded {} favorites", ids.len());

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.ids = ids.clone();
            state.phase = FavoritesPhase::Ready;
        }
        self.changes.send_replace(ids);
    }

    pub fn phase(&self) -> FavoritesPhase {
        self.state.read().unwrap_or_else(PoisonError::into_inner).phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == FavoritesPhase::Ready
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .ids
            .contains(&id)
    }

    /// Snapshot of the current favorite set
    pub fn favorites(&self) -> BTreeSet<u32> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .ids
            .clone()
    }

    /// Flip a favorite based on the state the caller last saw.
    ///
    /// The new state is `!assumed_current`, whatever the set actually holds.
    /// The in-memory set follows the new state even if storage fails.
    pub fn toggle(&self, id: u32, assumed_current: bool) -> Result<bool, AppError> {
        if !self.is_ready() {
            return Err(AppError::NotReady);
        }

        let new_state = !assumed_current;
        let persisted = if new_state {
            self.storage.add(id)
        } else {
            self.storage.remove(id)
        };
        if let Err(e) = persisted {
            tracing::error!("Error saving favorite {}: {}", id, e);
        }

        let ids = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if new_state {
                state.ids.insert(id);
            } else {
                state.ids.remove(&id);
            }
            state.ids.clone()
        };
        tracing::debug!("Favorite {} is now {}", id, new_state);
        self.changes.send_replace(ids);

        Ok(new_state)
    }

    /// Receiver that sees every published favorite set
    pub fn subscribe(&self) -> watch::Receiver<BTreeSet<u32>> {
        self.changes.subscribe()
    }
}
