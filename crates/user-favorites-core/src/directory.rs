// SPDX-License-Identifier: AGPL-3.0
// User Favorites Core - Remote user directory
//
// Fetches every page of the directory in order. Any failure replaces the
// whole result with a built-in sample set.

use crate::types::{AppError, User, UsersPage};
use reqwest::Client;
use std::future::Future;

/// Built-in users returned when the remote directory cannot be read
const FALLBACK_USERS: [(u32, &str, &str); 12] = [
    (1, "George", "Bluth"),
    (2, "Janet", "Weaver"),
    (3, "Emma", "Wong"),
    (4, "Eve", "Holt"),
    (5, "Charles", "Morris"),
    (6, "Tracey", "Ramos"),
    (7, "Michael", "Lawson"),
    (8, "Lindsay", "Ferguson"),
    (9, "Tobias", "Funke"),
    (10, "Byron", "Fields"),
    (11, "George", "Edwards"),
    (12, "Rachel", "Howell"),
];

/// The fixed fallback sequence, in id order
pub fn fallback_users() -> Vec<User> {
    FALLBACK_USERS
        .iter()
        .map(|(id, first, last)| User {
            id: *id,
            name: format!("{} {}", first, last),
            email: format!("{}.{}@reqres.in", first.to_lowercase(), last.to_lowercase()),
            avatar_url: format!("https://reqres.in/img/faces/{}-image.jpg", id),
        })
        .collect()
}

/// A source of directory pages, numbered from 1
pub trait PageSource: Send + Sync {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<UsersPage, AppError>> + Send;
}

/// Reads pages from `GET <base>/users?page=<n>`
pub struct HttpPageSource {
    client: Client,
    base_url: String,
}

impl HttpPageSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl PageSource for HttpPageSource {
    async fn fetch_page(&self, page: u32) -> Result<UsersPage, AppError> {
        let url = format!("{}/users", self.base_url);
        tracing::debug!("Fetching {} page {}", url, page);

        let page = self
            .client
            .get(&url)
            .query(&[("page", page)])
            .send()
            .await?
            .error_for_status()?
            .json::<UsersPage>()
            .await?;

        Ok(page)
    }
}

/// All-or-fallback reader over a [`PageSource`]
pub struct UserDirectory<S> {
    source: S,
}

impl<S: PageSource> UserDirectory<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Every user from every page, or the fallback set if anything fails
    pub async fn fetch_all(&self) -> Vec<User> {
        match self.try_fetch_all().await {
            Ok(users) => {
                tracing::info!("Fetched {} users", users.len());
                users
            }
            Err(e) => {
                tracing::error!("Error fetching users, using fallback set: {}", e);
                fallback_users()
            }
        }
    }

    async fn try_fetch_all(&self) -> Result<Vec<User>, AppError> {
        let first = self.source.fetch_page(1).await?;
        let total_pages = first.total_pages;
        let mut users: Vec<User> = first.data.into_iter().map(User::from).collect();

        for page in 2..=total_pages {
            let next = self.source.fetch_page(page).await?;
            users.extend(next.data.into_iter().map(User::from));
        }

        Ok(users)
    }
}
