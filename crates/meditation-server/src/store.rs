//! SQLite document store for the catalog, accounts, sessions, and preferences.
//!
//! Provides pooled connections and schema bootstrap.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use meditation_types::{MeditationItem, PreferencesUpdate, UserPreferences};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

const SCHEMA_VERSION: i32 = 1;

#[derive(Clone)]
pub struct Store {
    pool: Pool<SqliteConnectionManager>,
}

/// Stored account row, including the password hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl UserRecord {
    pub fn summary(&self) -> meditation_types::UserSummary {
        meditation_types::UserSummary {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Account insert payload.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Outcome of an account insert.
#[derive(Debug)]
pub enum InsertUser {
    Created(UserRecord),
    Duplicate,
}

fn map_meditation_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MeditationItem> {
    Ok(MeditationItem {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        duration: row.get(4)?,
        audio_url: row.get(5)?,
    })
}

type UserParts = (String, String, String, String);

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserParts> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn user_from_parts(parts: UserParts) -> UserRecord {
    let (id, username, email, password_hash) = parts;
    UserRecord {
        id,
        username,
        email,
        password_hash,
    }
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create store dir {:?}", parent))?;
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
            Ok(())
        });
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .context("create store pool")?;

        {
            let conn = pool.get().context("open store")?;
            init_schema(&conn)?;
        }

        Ok(Self { pool })
    }

    /// Insert the given items when the catalog table is empty.
    pub fn seed_catalog_if_empty(&self, items: &[MeditationItem]) -> Result<usize> {
        let mut conn = self.pool.get().context("open store")?;
        let tx = conn.transaction().context("begin seed tx")?;
        let count: i64 = tx
            .query_row("SELECT COUNT(*) FROM meditations", [], |row| row.get(0))
            .context("count meditations")?;
        if count > 0 {
            return Ok(0);
        }
        for item in items {
            tx.execute(
                "INSERT INTO meditations (id, title, description, category, duration, audio_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    item.id,
                    item.title,
                    item.description,
                    item.category,
                    item.duration,
                    item.audio_url
                ],
            )
            .with_context(|| format!("seed meditation {}", item.id))?;
        }
        tx.commit().context("commit seed tx")?;
        Ok(items.len())
    }

    /// List catalog items in id order, optionally filtered by exact category and duration.
    pub fn list_meditations(
        &self,
        category: Option<&str>,
        duration: Option<u32>,
    ) -> Result<Vec<MeditationItem>> {
        let conn = self.pool.get().context("open store")?;
        let mut stmt = conn
            .prepare(
                r#"
                SELECT id, title, description, category, duration, audio_url
                FROM meditations
                WHERE (?1 IS NULL OR category = ?1)
                  AND (?2 IS NULL OR duration = ?2)
                ORDER BY id
                "#,
            )
            .context("prepare list meditations")?;
        let rows = stmt
            .query_map(params![category, duration], map_meditation_row)
            .context("query meditations")?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row.context("read meditation row")?);
        }
        Ok(items)
    }

    pub fn meditation_by_id(&self, id: i64) -> Result<Option<MeditationItem>> {
        let conn = self.pool.get().context("open store")?;
        let item = conn
            .query_row(
                "SELECT id, title, description, category, duration, audio_url
                 FROM meditations WHERE id = ?1",
                params![id],
                map_meditation_row,
            )
            .optional()
            .context("lookup meditation")?;
        Ok(item)
    }

    pub fn insert_user(&self, user: &NewUser<'_>, now: DateTime<Utc>) -> Result<InsertUser> {
        let mut conn = self.pool.get().context("open store")?;
        let tx = conn.transaction().context("begin user tx")?;
        let exists: Option<String> = tx
            .query_row(
                "SELECT id FROM users WHERE email = ?1 OR username = ?2",
                params![user.email, user.username],
                |row| row.get(0),
            )
            .optional()
            .context("lookup existing user")?;
        if exists.is_some() {
            return Ok(InsertUser::Duplicate);
        }
        let inserted = tx.execute(
            "INSERT INTO users (id, username, email, password_hash, created_at_ms)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.username,
                user.email,
                user.password_hash,
                now.timestamp_millis()
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Ok(InsertUser::Duplicate);
            }
            Err(err) => return Err(err).context("insert user"),
        }
        tx.commit().context("commit user tx")?;
        Ok(InsertUser::Created(UserRecord {
            id: user.id.to_string(),
            username: user.username.to_string(),
            email: user.email.to_string(),
            password_hash: user.password_hash.to_string(),
        }))
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let conn = self.pool.get().context("open store")?;
        let parts = conn
            .query_row(
                "SELECT id, username, email, password_hash FROM users WHERE email = ?1",
                params![email],
                map_user_row,
            )
            .optional()
            .context("lookup user by email")?;
        Ok(parts.map(user_from_parts))
    }

    /// Record a session for `user_id`, keyed by the token digest.
    pub fn insert_session(
        &self,
        token_digest: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.pool.get().context("open store")?;
        conn.execute(
            "INSERT INTO sessions (token_digest, user_id, expires_at_ms) VALUES (?1, ?2, ?3)",
            params![token_digest, user_id, expires_at.timestamp_millis()],
        )
        .context("insert session")?;
        Ok(())
    }

    /// Resolve a live session to its user; expired sessions are removed.
    pub fn user_for_session(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserRecord>> {
        let conn = self.pool.get().context("open store")?;
        let row: Option<(i64, UserParts)> = conn
            .query_row(
                r#"
                SELECT s.expires_at_ms, u.id, u.username, u.email, u.password_hash
                FROM sessions s
                JOIN users u ON u.id = s.user_id
                WHERE s.token_digest = ?1
                "#,
                params![token_digest],
                |row| {
                    Ok((
                        row.get(0)?,
                        (row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?),
                    ))
                },
            )
            .optional()
            .context("lookup session")?;
        let Some((expires_ms, parts)) = row else {
            return Ok(None);
        };
        if expires_ms <= now.timestamp_millis() {
            conn.execute(
                "DELETE FROM sessions WHERE token_digest = ?1",
                params![token_digest],
            )
            .context("delete expired session")?;
            return Ok(None);
        }
        Ok(Some(user_from_parts(parts)))
    }

    /// Drop every expired session; returns the number removed.
    pub fn prune_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let conn = self.pool.get().context("open store")?;
        let removed = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at_ms <= ?1",
                params![now.timestamp_millis()],
            )
            .context("prune sessions")?;
        Ok(removed)
    }

    /// Fetch the user's preferences, creating the default document on first access.
    pub fn preferences_for_user(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserPreferences> {
        let mut conn = self.pool.get().context("open store")?;
        let tx = conn.transaction().context("begin preferences tx")?;
        ensure_preferences(&tx, user_id, now)?;
        let prefs = read_preferences(&tx, user_id)?;
        tx.commit().context("commit preferences tx")?;
        Ok(prefs)
    }

    /// Apply a partial update, creating the document first when absent.
    pub fn update_preferences(
        &self,
        user_id: &str,
        update: &PreferencesUpdate,
        now: DateTime<Utc>,
    ) -> Result<UserPreferences> {
        let now = millis_precision(now);
        let mut conn = self.pool.get().context("open store")?;
        let tx = conn.transaction().context("begin preferences tx")?;
        ensure_preferences(&tx, user_id, now)?;
        let mut prefs = read_preferences(&tx, user_id)?;
        prefs.apply(update);
        prefs.updated_at = now;
        write_preferences(&tx, &prefs)?;
        tx.commit().context("commit preferences tx")?;
        Ok(prefs)
    }

    /// Restore default preferences for the user (upsert).
    pub fn reset_preferences(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserPreferences> {
        let now = millis_precision(now);
        let mut conn = self.pool.get().context("open store")?;
        let tx = conn.transaction().context("begin preferences tx")?;
        ensure_preferences(&tx, user_id, now)?;
        let prefs = UserPreferences::defaults_for(user_id, now);
        write_preferences(&tx, &prefs)?;
        tx.commit().context("commit preferences tx")?;
        Ok(prefs)
    }

    #[cfg(test)]
    fn preferences_row_count(&self, user_id: &str) -> Result<i64> {
        let conn = self.pool.get().context("open store")?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM preferences WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Timestamps are stored as epoch milliseconds.
fn millis_precision(now: DateTime<Utc>) -> DateTime<Utc> {
    from_millis(now.timestamp_millis())
}

fn ensure_preferences(tx: &Transaction<'_>, user_id: &str, now: DateTime<Utc>) -> Result<()> {
    let defaults = UserPreferences::defaults_for(user_id, now);
    tx.execute(
        r#"
        INSERT OR IGNORE INTO preferences
            (user_id, favorite_themes, preferred_duration, best_time_of_day,
             notifications, theme, updated_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            defaults.user_id,
            serde_json::to_string(&defaults.favorite_themes).context("encode themes")?,
            defaults.preferred_duration.label(),
            defaults.best_time_of_day.label(),
            defaults.notifications,
            defaults.theme.label(),
            now.timestamp_millis()
        ],
    )
    .context("create default preferences")?;
    Ok(())
}

fn read_preferences(tx: &Transaction<'_>, user_id: &str) -> Result<UserPreferences> {
    let (themes_raw, duration, time_of_day, notifications, theme, updated_ms): (
        String,
        String,
        String,
        bool,
        String,
        i64,
    ) = tx
        .query_row(
            r#"
            SELECT favorite_themes, preferred_duration, best_time_of_day,
                   notifications, theme, updated_at_ms
            FROM preferences WHERE user_id = ?1
            "#,
            params![user_id],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            },
        )
        .context("read preferences")?;
    Ok(UserPreferences {
        user_id: user_id.to_string(),
        favorite_themes: serde_json::from_str(&themes_raw).context("decode favorite themes")?,
        preferred_duration: duration.parse().context("decode preferred duration")?,
        best_time_of_day: time_of_day.parse().context("decode best time of day")?,
        notifications,
        theme: theme.parse().context("decode theme")?,
        updated_at: from_millis(updated_ms),
    })
}

fn write_preferences(tx: &Transaction<'_>, prefs: &UserPreferences) -> Result<()> {
    tx.execute(
        r#"
        UPDATE preferences
        SET favorite_themes = ?2,
            preferred_duration = ?3,
            best_time_of_day = ?4,
            notifications = ?5,
            theme = ?6,
            updated_at_ms = ?7
        WHERE user_id = ?1
        "#,
        params![
            prefs.user_id,
            serde_json::to_string(&prefs.favorite_themes).context("encode themes")?,
            prefs.preferred_duration.label(),
            prefs.best_time_of_day.label(),
            prefs.notifications,
            prefs.theme.label(),
            prefs.updated_at.timestamp_millis()
        ],
    )
    .context("write preferences")?;
    Ok(())
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS meditations (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            duration INTEGER NOT NULL,
            audio_url TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS sessions (
            token_digest TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            expires_at_ms INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS preferences (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE,
            favorite_themes TEXT NOT NULL,
            preferred_duration TEXT NOT NULL,
            best_time_of_day TEXT NOT NULL,
            notifications INTEGER NOT NULL,
            theme TEXT NOT NULL,
            updated_at_ms INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_meditations_category ON meditations(category);
        CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
        "#,
    )
    .context("create store schema")?;

    let version_raw: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    if version_raw.is_none() {
        conn.execute(
            "INSERT INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )
        .context("insert schema version")?;
    }

    Ok(())
}
