//! Page sizes for paginated lists.
//!
//! - `GAME_LIST_PAGE_SIZE` (default 20)
//! - `USER_LIST_PAGE_SIZE` (default 20)
//! - `PLAYLIST_PAGE_SIZE` (default 20)
//! - `LESSON_LIST_PAGE_SIZE` (default 5)

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListConfig {
    pub games_per_page: i64,
    pub users_per_page: i64,
    pub playlists_per_page: i64,
    pub lessons_per_page: i64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            games_per_page: 20,
            users_per_page: 20,
            playlists_per_page: 20,
            lessons_per_page: 5,
        }
    }
}

impl ListConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            games_per_page: env_or("GAME_LIST_PAGE_SIZE", defaults.games_per_page),
            users_per_page: env_or("USER_LIST_PAGE_SIZE", defaults.users_per_page),
            playlists_per_page: env_or("PLAYLIST_PAGE_SIZE", defaults.playlists_per_page),
            lessons_per_page: env_or("LESSON_LIST_PAGE_SIZE", defaults.lessons_per_page),
        }
    }
}
