// SPDX-License-Identifier: AGPL-3.0
// User Favorites Core - Type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default remote directory endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://reqres.in/api";

/// A user record as served by the remote directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUser {
    pub id: u32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
}

/// One page of the remote directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersPage {
    pub data: Vec<ApiUser>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u32,
    pub total_pages: u32,
}

/// A user as the rest of the app sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

impl From<ApiUser> for User {
    fn from(user: ApiUser) -> Self {
        Self {
            id: user.id,
            name: format!("{} {}", user.first_name, user.last_name),
            email: user.email,
            avatar_url: user.avatar,
        }
    }
}

/// A user plus its derived favorite flag. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUser {
    pub user: User,
    pub is_favorite: bool,
}

impl DisplayUser {
    pub fn new(user: User, is_favorite: bool) -> Self {
        Self { user, is_favorite }
    }

    pub fn id(&self) -> u32 {
        self.user.id
    }

    pub fn name(&self) -> &str {
        &self.user.name
    }
}

/// Application settings (frontend-agnostic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Base URL of the remote user directory
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Where favorites are stored. None means the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Persist favorites across runs (false keeps them in memory only)
    #[serde(default = "default_persist_favorites")]
    pub persist_favorites: bool,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_persist_favorites() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            data_dir: None,
            persist_favorites: default_persist_favorites(),
        }
    }
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Favorites not loaded yet")]
    NotReady,
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileIo(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_status() {
            AppError::Http(err.to_string())
        } else if err.is_decode() {
            AppError::Serialization(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}
