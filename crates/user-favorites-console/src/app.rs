// SPDX-License-Identifier: AGPL-3.0
// User Favorites Console - Application
//
// Two tabs over one shared favorite set, driven by line commands.

use std::fmt::Write as _;
use std::sync::Arc;
use user_favorites_core::{
    open_key_store, AppError, AppSettings, DirectoryView, DisplayUser, FavoritesManager,
    FavoritesStorage, FavoritesView, HttpPageSource, PageSource, UserDirectory,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    AllUsers,
    Favorites,
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show(Tab),
    Search(String),
    Toggle(u32),
    Refresh,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "all" => Ok(Self::Show(Tab::AllUsers)),
            "favorites" | "favs" => Ok(Self::Show(Tab::Favorites)),
            "search" => Ok(Self::Search(rest.to_string())),
            "fav" => rest
                .parse()
                .map(Self::Toggle)
                .map_err(|_| format!("Not a user id: {:?}", rest)),
            "refresh" => Ok(Self::Refresh),
            "help" | "" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

pub const HELP: &str = "\
Commands:
  all              show all users
  favorites        show favorite users
  search <text>    filter all users by name (empty clears)
  fav <id>         toggle a favorite in the current tab
  refresh          reload the current tab
  quit             exit";

pub struct App<S> {
    directory_view: DirectoryView<S>,
    favorites_view: FavoritesView<S>,
    tab: Tab,
}

impl App<HttpPageSource> {
    /// Wire storage, favorites and the HTTP directory from settings
    pub fn from_settings(settings: &AppSettings) -> Self {
        let storage = FavoritesStorage::new(open_key_store(settings));
        let favorites = Arc::new(FavoritesManager::load(storage));
        let directory = Arc::new(UserDirectory::new(HttpPageSource::new(
            settings.api_base_url.clone(),
        )));
        Self::new(directory, favorites)
    }
}

impl<S: PageSource> App<S> {
    pub fn new(directory: Arc<UserDirectory<S>>, favorites: Arc<FavoritesManager>) -> Self {
        Self {
            directory_view: DirectoryView::new(directory.clone(), favorites.clone()),
            favorites_view: FavoritesView::new(directory, favorites),
            tab: Tab::AllUsers,
        }
    }

    /// Mount the initial tab
    pub async fn start(&mut self) {
        self.activate_current().await;
    }

    /// Apply a command. Returns false once the app should exit.
    pub async fn handle(&mut self, command: Command) -> Result<bool, AppError> {
        match command {
            Command::Show(tab) => {
                self.tab = tab;
                self.activate_current().await;
            }
            Command::Search(query) => {
                self.directory_view.set_query(query);
                if self.tab != Tab::AllUsers {
                    self.tab = Tab::AllUsers;
                    self.activate_current().await;
                }
            }
            Command::Toggle(id) => {
                match self.tab {
                    Tab::AllUsers => self.directory_view.toggle(id)?,
                    Tab::Favorites => self.favorites_view.toggle(id)?,
                };
            }
            Command::Refresh => self.activate_current().await,
            Command::Help => {}
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Pick up favorite changes made from the other tab
    pub fn sync(&mut self) {
        match self.tab {
            Tab::AllUsers => self.directory_view.sync(),
            Tab::Favorites => self.favorites_view.sync(),
        };
    }

    async fn activate_current(&mut self) {
        match self.tab {
            Tab::AllUsers => self.directory_view.activate().await,
            Tab::Favorites => self.favorites_view.activate().await,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        match self.tab {
            Tab::AllUsers => {
                let _ = writeln!(out, "== All Users ==");
                if !self.directory_view.query().trim().is_empty() {
                    let _ = writeln!(out, "Search: {}", self.directory_view.query());
                }
                let users = self.directory_view.visible();
                if users.is_empty() {
                    let _ = writeln!(out, "No users found");
                }
                render_users(&mut out, users);
            }
            Tab::Favorites => {
                let _ = writeln!(out, "== Favorites ==");
                let _ = writeln!(out, "{}", self.favorites_view.summary());
                let users = self.favorites_view.visible();
                if users.is_empty() {
                    let _ = writeln!(out, "No favorites yet.");
                    let _ = writeln!(out, "Add some from the All Users tab!");
                }
                render_users(&mut out, users);
            }
        }
        out
    }
}

fn render_users(out: &mut String, users: &[DisplayUser]) {
    for user in users {
        let mark = if user.is_favorite { "*" } else { " " };
        let _ = writeln!(
            out,
            "[{}] {:>3}  {} <{}>",
            mark,
            user.id(),
            user.name(),
            user.user.email
        );
    }
}
