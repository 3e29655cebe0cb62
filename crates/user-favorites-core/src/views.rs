// SPDX-License-Identifier: AGPL-3.0
// User Favorites Core - List view models
//
// Each view keeps its own copy of the directory and of the favorite set it
// last merged. A toggle from a view is reflected in that view right away
// through a local override; every view re-derives from the shared set once
// it consumes the next change notification, which drops all overrides.

use crate::directory::{PageSource, UserDirectory};
use crate::favorites::FavoritesManager;
use crate::types::{AppError, DisplayUser, User};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::watch;

/// State shared by both views: fetched users, merged favorites, overrides
struct UserList<S> {
    directory: Arc<UserDirectory<S>>,
    favorites: Arc<FavoritesManager>,
    changes: watch::Receiver<BTreeSet<u32>>,
    users: Vec<User>,
    shared: BTreeSet<u32>,
    overrides: HashMap<u32, bool>,
}

impl<S: PageSource> UserList<S> {
    fn new(directory: Arc<UserDirectory<S>>, favorites: Arc<FavoritesManager>) -> Self {
        let changes = favorites.subscribe();
        let shared = changes.borrow().clone();
        Self {
            directory,
            favorites,
            changes,
            users: Vec::new(),
            shared,
            overrides: HashMap::new(),
        }
    }

    async fn activate(&mut self) {
        self.users = self.directory.fetch_all().await;
        self.take_shared();
    }

    fn sync(&mut self) -> bool {
        match self.changes.has_changed() {
            Ok(true) => {
                self.take_shared();
                true
            }
            _ => false,
        }
    }

    async fn changed(&mut self) {
        if self.changes.changed().await.is_ok() {
            self.take_shared();
        }
    }

    fn take_shared(&mut self) {
        self.shared = self.changes.borrow_and_update().clone();
        self.overrides.clear();
    }

    fn is_favorite(&self, id: u32) -> bool {
        self.overrides
            .get(&id)
            .copied()
            .unwrap_or_else(|| self.shared.contains(&id))
    }

    fn toggle(&mut self, id: u32) -> Result<bool, AppError> {
        let assumed = self.is_favorite(id);
        let new_state = self.favorites.toggle(id, assumed)?;
        self.overrides.insert(id, new_state);
        Ok(new_state)
    }

    fn merged(&self) -> impl Iterator<Item = DisplayUser> + '_ {
        self.users
            .iter()
            .map(|user| DisplayUser::new(user.clone(), self.is_favorite(user.id)))
    }
}

/// Case-insensitive substring match on the user's name. Blank queries match everyone.
pub fn matches_query(user: &User, query: &str) -> bool {
    query.trim().is_empty() || user.name.to_lowercase().contains(&query.to_lowercase())
}

/// All users, filtered by a name search
pub struct DirectoryView<S> {
    list: UserList<S>,
    query: String,
    visible: Vec<DisplayUser>,
}

impl<S: PageSource> DirectoryView<S> {
    pub fn new(directory: Arc<UserDirectory<S>>, favorites: Arc<FavoritesManager>) -> Self {
        Self {
            list: UserList::new(directory, favorites),
            query: String::new(),
            visible: Vec::new(),
        }
    }

    /// Fetch the directory and rebuild the list. Call on mount and whenever the view is shown again.
    pub async fn activate(&mut self) {
        tracing::debug!("Loading users");
        self.list.activate().await;
        self.refilter();
    }

    /// Re-merge favorites if the shared set changed. Returns whether it did.
    pub fn sync(&mut self) -> bool {
        let changed = self.list.sync();
        if changed {
            self.refilter();
        }
        changed
    }

    /// Wait for the next change to the shared set, then re-merge
    pub async fn changed(&mut self) {
        self.list.changed().await;
        self.refilter();
    }

    /// Toggle a user's favorite flag from this view
    pub fn toggle(&mut self, id: u32) -> Result<bool, AppError> {
        tracing::info!("Toggling favorite for user {}", id);
        let new_state = self.list.toggle(id)?;
        self.refilter();
        Ok(new_state)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn visible(&self) -> &[DisplayUser] {
        &self.visible
    }

    fn refilter(&mut self) {
        let query = &self.query;
        self.visible = self
            .list
            .merged()
            .filter(|u| matches_query(&u.user, query))
            .collect();
    }
}

/// Only the users currently marked as favorites
pub struct FavoritesView<S> {
    list: UserList<S>,
    visible: Vec<DisplayUser>,
}

impl<S: PageSource> FavoritesView<S> {
    pub fn new(directory: Arc<UserDirectory<S>>, favorites: Arc<FavoritesManager>) -> Self {
        Self {
            list: UserList::new(directory, favorites),
            visible: Vec::new(),
        }
    }

    pub async fn activate(&mut self) {
        self.list.activate().await;
        self.refilter();
        tracing::debug!("Found {} favorite users", self.visible.len());
    }

    pub fn sync(&mut self) -> bool {
        let changed = self.list.sync();
        if changed {
            self.refilter();
        }
        changed
    }

    pub async fn changed(&mut self) {
        self.list.changed().await;
        self.refilter();
    }

    /// Toggle from the favorites list; unfavorited users drop out immediately
    pub fn toggle(&mut self, id: u32) -> Result<bool, AppError> {
        tracing::info!("Toggling favorite {} from favorites view", id);
        let new_state = self.list.toggle(id)?;
        self.refilter();
        Ok(new_state)
    }

    pub fn visible(&self) -> &[DisplayUser] {
        &self.visible
    }

    pub fn count(&self) -> usize {
        self.visible.len()
    }

    pub fn summary(&self) -> String {
        match self.count() {
            1 => "1 user favorited".to_string(),
            n => format!("{} users favorited", n),
        }
    }

    fn refilter(&mut self) {
        self.visible = self.list.merged().filter(|u| u.is_favorite).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::tests::{api_user, ScriptedSource};
    use crate::storage::{FavoritesStorage, KeyStore, MemoryKeyStore, FAVORITES_KEY};

    type Fixture = (
        Arc<UserDirectory<ScriptedSource>>,
        Arc<FavoritesManager>,
    );

    fn fixture(pages: Vec<Vec<crate::types::ApiUser>>, stored: &str) -> Fixture {
        let store = Arc::new(MemoryKeyStore::new());
        store.set(FAVORITES_KEY, stored).unwrap();
        let manager = FavoritesManager::load(FavoritesStorage::new(store));
        (
            Arc::new(UserDirectory::new(ScriptedSource::with_pages(pages))),
            Arc::new(manager),
        )
    }

    fn ids(users: &[DisplayUser]) -> Vec<u32> {
        users.iter().map(DisplayUser::id).collect()
    }

    fn ten_users_shuffled() -> Vec<Vec<crate::types::ApiUser>> {
        let order = [7, 2, 10, 4, 1, 9, 5, 3, 8, 6];
        vec![order
            .iter()
            .map(|id| api_user(*id, &format!("User{}", id), "Test"))
            .collect()]
    }

    #[test]
    fn test_matches_query() {
        let anna = User::from(api_user(1, "Anna", "Lee"));
        assert!(matches_query(&anna, "ann"));
        assert!(matches_query(&anna, "LEE"));
        assert!(matches_query(&anna, "   "));
        assert!(!matches_query(&anna, "bob"));
    }

    #[tokio::test]
    async fn test_name_filter() {
        let (directory, favorites) = fixture(
            vec![vec![api_user(1, "Anna", "Lee"), api_user(2, "Bob", "")]],
            "[]",
        );
        let mut view = DirectoryView::new(directory, favorites);
        view.activate().await;
        assert_eq!(view.visible().len(), 2);

        view.set_query("ann");
        assert_eq!(view.visible().len(), 1);
        assert_eq!(view.visible()[0].name(), "Anna Lee");

        view.set_query("");
        assert_eq!(view.visible().len(), 2);
    }

    #[tokio::test]
    async fn test_directory_merges_stored_favorites() {
        let (directory, favorites) = fixture(ten_users_shuffled(), "[2,5]");
        let mut view = DirectoryView::new(directory, favorites);
        view.activate().await;

        let flagged: Vec<u32> = view
            .visible()
            .iter()
            .filter(|u| u.is_favorite)
            .map(DisplayUser::id)
            .collect();
        assert_eq!(flagged, vec![2, 5]);
    }

    #[tokio::test]
    async fn test_favorites_view_filters_by_membership() {
        let (directory, favorites) = fixture(ten_users_shuffled(), "[2,5]");
        let mut view = FavoritesView::new(directory, favorites);
        view.activate().await;

        let mut shown = ids(view.visible());
        shown.sort_unstable();
        assert_eq!(shown, vec![2, 5]);
        assert_eq!(view.summary(), "2 users favorited");
    }

    #[tokio::test]
    async fn test_toggle_updates_own_view_immediately() {
        let (directory, favorites) = fixture(ten_users_shuffled(), "[]");
        let mut all = DirectoryView::new(directory.clone(), favorites.clone());
        let mut favs = FavoritesView::new(directory, favorites.clone());
        all.activate().await;
        favs.activate().await;
        assert_eq!(favs.count(), 0);

        assert!(all.toggle(3).unwrap());
        assert!(favorites.is_favorite(3));
        assert!(all.visible().iter().any(|u| u.id() == 3 && u.is_favorite));

        // The other view is stale until it consumes the notification
        assert_eq!(favs.count(), 0);
        assert!(favs.sync());
        assert_eq!(ids(favs.visible()), vec![3]);
        assert_eq!(favs.summary(), "1 user favorited");
        assert!(!favs.sync());
    }

    #[tokio::test]
    async fn test_override_holds_until_next_notification() {
        let (directory, favorites) = fixture(ten_users_shuffled(), "[]");
        let mut all = DirectoryView::new(directory.clone(), favorites.clone());
        let mut favs = FavoritesView::new(directory, favorites.clone());
        all.activate().await;
        favs.activate().await;

        all.toggle(4).unwrap();
        favs.sync();
        // Removed from the favorites view while the directory view has not synced
        assert!(!favs.toggle(4).unwrap());
        assert_eq!(favs.count(), 0);
        assert!(!favorites.is_favorite(4));

        let shown = |v: &DirectoryView<ScriptedSource>| {
            v.visible().iter().find(|u| u.id() == 4).map(|u| u.is_favorite)
        };
        assert_eq!(shown(&all), Some(true));
        assert!(all.sync());
        assert_eq!(shown(&all), Some(false));
    }

    #[tokio::test]
    async fn test_filter_still_applies_after_toggle() {
        let (directory, favorites) = fixture(
            vec![vec![api_user(1, "Anna", "Lee"), api_user(2, "Bob", "Stone")]],
            "[]",
        );
        let mut view = DirectoryView::new(directory, favorites);
        view.activate().await;
        view.set_query("bob");

        assert!(view.toggle(2).unwrap());
        assert_eq!(ids(view.visible()), vec![2]);
        assert!(view.visible()[0].is_favorite);
    }

    #[tokio::test]
    async fn test_changed_waits_for_notification() {
        let (directory, favorites) = fixture(ten_users_shuffled(), "[]");
        let mut favs = FavoritesView::new(directory, favorites.clone());
        favs.activate().await;

        favorites.toggle(8, false).unwrap();
        favs.changed().await;
        assert_eq!(ids(favs.visible()), vec![8]);
    }

    #[tokio::test]
    async fn test_view_picks_up_late_initialization() {
        let store = Arc::new(MemoryKeyStore::new());
        store.set(FAVORITES_KEY, "[1]").unwrap();
        let favorites = Arc::new(FavoritesManager::new(FavoritesStorage::new(store)));
        let directory = Arc::new(UserDirectory::new(ScriptedSource::with_pages(
            ten_users_shuffled(),
        )));

        let mut favs = FavoritesView::new(directory, favorites.clone());
        favs.activate().await;
        assert_eq!(favs.count(), 0);
        assert!(matches!(favs.toggle(1), Err(AppError::NotReady)));

        favorites.initialize();
        assert!(favs.sync());
        assert_eq!(ids(favs.visible()), vec![1]);
    }

    #[tokio::test]
    async fn test_fetch_failure_shows_fallback_users() {
        let store = Arc::new(MemoryKeyStore::new());
        let favorites = Arc::new(FavoritesManager::load(FavoritesStorage::new(store)));
        let directory = Arc::new(UserDirectory::new(ScriptedSource::default()));

        let mut view = DirectoryView::new(directory, favorites);
        view.activate().await;
        assert_eq!(view.visible().len(), 12);
        view.set_query("george");
        assert_eq!(ids(view.visible()), vec![1, 11]);
    }
}
