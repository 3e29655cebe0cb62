// SPDX-License-Identifier: AGPL-3.0
// User Favorites Core - Shared logic for all frontends
//
// This crate provides:
// - User, DisplayUser, AppSettings and AppError types
// - SettingsStore for persistent settings
// - KeyStore backends and FavoritesStorage for persisted favorite ids
// - UserDirectory for reading the paginated remote directory
// - FavoritesManager holding the shared favorite set
// - DirectoryView and FavoritesView list view models
//
// Frontend-specific code lives in separate crates.

pub mod directory;
pub mod favorites;
pub mod settings;
pub mod storage;
pub mod types;
pub mod views;

// Re-export commonly used items
pub use directory::{fallback_users, HttpPageSource, PageSource, UserDirectory};
pub use favorites::{FavoritesManager, FavoritesPhase};
pub use settings::SettingsStore;
pub use storage::{
    open_key_store, FavoritesStorage, FileKeyStore, KeyStore, MemoryKeyStore, FAVORITES_KEY,
};
pub use types::{
    ApiUser, AppError, AppSettings, DisplayUser, User, UsersPage, DEFAULT_API_BASE_URL,
};
pub use views::{matches_query, DirectoryView, FavoritesView};

/// Platform directories for config and data files
pub(crate) fn project_dirs() -> Result<directories::ProjectDirs, AppError> {
    directories::ProjectDirs::from("com", "userfavorites", "app").ok_or_else(|| {
        AppError::StorageUnavailable("Could not determine config directory".to_string())
    })
}
