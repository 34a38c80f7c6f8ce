pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    google_id TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL,
    name TEXT,
    picture_url TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_users_google_id ON users(google_id);

-- shows table (cached catalog metadata, keyed by the TMDb id)
CREATE TABLE IF NOT EXISTS shows (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    overview TEXT NOT NULL DEFAULT '',
    poster_path TEXT,
    backdrop_path TEXT,
    first_air_date TEXT,
    total_episodes INTEGER,
    total_seasons INTEGER,
    genres TEXT NOT NULL DEFAULT '',
    tmdb_rating REAL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- user_shows table
CREATE TABLE IF NOT EXISTS user_shows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    show_id INTEGER NOT NULL REFERENCES shows(id),
    status TEXT NOT NULL DEFAULT 'watching'
        CHECK (status IN ('watching', 'completed', 'dropped', 'paused')),
    favorite INTEGER NOT NULL DEFAULT 0,
    added_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(user_id, show_id)
);

CREATE INDEX IF NOT EXISTS idx_user_shows_user_added ON user_shows(user_id, added_at DESC);

-- episodes_watched table (show_id has no foreign key: marks may precede caching)
CREATE TABLE IF NOT EXISTS episodes_watched (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    show_id INTEGER NOT NULL,
    season INTEGER NOT NULL CHECK (season > 0),
    episode INTEGER NOT NULL CHECK (episode > 0),
    watched_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(user_id, show_id, season, episode)
);

CREATE INDEX IF NOT EXISTS idx_episodes_watched_user_show ON episodes_watched(user_id, show_id);
"#;
