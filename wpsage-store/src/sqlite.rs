//! SQLite implementation of the site seams.
//!
//! One connection serves option storage, snapshot accessors and caller
//! supplied queries. Access is serialized through a mutex; callers on an
//! async runtime should go through `spawn_blocking`.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
    sync::{Mutex, MutexGuard},
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rusqlite::{params, types::ValueRef, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, warn};
use wpsage_core::{
    GeneralInfo, MenuInfo, PluginInfo, PostSummary, QueryResult, QueryRow, SidebarInfo, ThemeInfo,
};

use crate::{ConfigStore, QueryBackend, SiteDataProvider, StoreError};

const SCHEMA: &str = include_str!("schema.sql");

/// Words kept when an excerpt is generated from post content.
const EXCERPT_WORDS: usize = 55;
const EXCERPT_MORE: &str = " [&hellip;]";

/// A site whose settings, content and structure live in one SQLite database.
#[derive(Debug)]
pub struct SqliteSite {
    conn: Mutex<Connection>,
}

impl SqliteSite {
    /// Open (or create) the site database at `path` and ensure the schema.
    ///
    /// # Errors
    /// Returns [`StoreError::Sqlite`] if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Create an empty site in memory.
    ///
    /// # Errors
    /// Returns [`StoreError::Sqlite`] if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, creating any missing tables.
    ///
    /// # Errors
    /// Returns [`StoreError::Sqlite`] if the schema cannot be created.
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

fn option(conn: &Connection, name: &str) -> Result<Option<String>, StoreError> {
    let value = conn
        .query_row("SELECT value FROM options WHERE name = ?1", params![name], |row| row.get(0))
        .optional()?;
    Ok(value)
}

fn option_or_empty(conn: &Connection, name: &str) -> Result<String, StoreError> {
    Ok(option(conn, name)?.unwrap_or_default())
}

fn non_empty_option(conn: &Connection, name: &str) -> Result<Option<String>, StoreError> {
    Ok(option(conn, name)?.filter(|v| !v.is_empty()))
}

/// Plugin paths listed in the `active_plugins` option (a JSON array).
fn active_plugins(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let raw = option_or_empty(conn, "active_plugins")?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).map_err(|e| StoreError::InvalidOption {
        name: "active_plugins".to_owned(),
        reason: e.to_string(),
    })
}

/// Build an excerpt from post content: tags stripped, first
/// [`EXCERPT_WORDS`] words kept.
#[must_use]
pub fn excerpt_from_content(content: &str) -> String {
    let mut text = String::with_capacity(content.len());
    let mut in_tag = false;
    for c in content.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > EXCERPT_WORDS {
        let mut excerpt = words[..EXCERPT_WORDS].join(" ");
        excerpt.push_str(EXCERPT_MORE);
        excerpt
    } else {
        words.join(" ")
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(STANDARD.encode(b)),
    }
}

impl ConfigStore for SqliteSite {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        option(&*self.conn()?, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn()?.execute(
            "INSERT INTO options (name, value) VALUES (?1, ?2) \
             ON CONFLICT(name) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

impl SiteDataProvider for SqliteSite {
    fn general_info(&self) -> Result<GeneralInfo, StoreError> {
        let conn = self.conn()?;
        Ok(GeneralInfo {
            site_title: option_or_empty(&conn, "blogname")?,
            tagline: option_or_empty(&conn, "blogdescription")?,
            wp_version: option_or_empty(&conn, "version")?,
            site_url: option_or_empty(&conn, "siteurl")?,
            home_url: option_or_empty(&conn, "home")?,
            admin_email: option_or_empty(&conn, "admin_email")?,
            language: option_or_empty(&conn, "language")?,
            timezone: option_or_empty(&conn, "timezone_string")?,
            date_format: option_or_empty(&conn, "date_format")?,
            time_format: option_or_empty(&conn, "time_format")?,
            posts_per_page: option_or_empty(&conn, "posts_per_page")?,
        })
    }

    fn theme_info(&self) -> Result<ThemeInfo, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM theme")?;
        let mut manifest = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        let mut take = |key: &str| manifest.remove(key).unwrap_or_default();
        Ok(ThemeInfo {
            name: take("name"),
            version: take("version"),
            author: take("author"),
            author_uri: take("author_uri"),
            template: take("template"),
            stylesheet: take("stylesheet"),
            screenshot: take("screenshot"),
            description: take("description"),
            tags: take("tags")
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect(),
        })
    }

    fn plugins(&self) -> Result<Vec<PluginInfo>, StoreError> {
        let conn = self.conn()?;
        let active = active_plugins(&conn).unwrap_or_else(|e| {
            warn!(error = %e, "treating all plugins as inactive");
            Vec::new()
        });
        let mut stmt = conn.prepare(
            "SELECT path, name, version, author, description FROM plugins ORDER BY name, path",
        )?;
        let plugins = stmt
            .query_map([], |row| {
                let path: String = row.get(0)?;
                Ok(PluginInfo {
                    name: row.get(1)?,
                    version: row.get(2)?,
                    author: row.get(3)?,
                    description: row.get(4)?,
                    is_active: active.contains(&path),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(plugins)
    }

    fn recent_posts(&self, limit: usize) -> Result<Vec<PostSummary>, StoreError> {
        let conn = self.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(
            "SELECT p.id, p.title, p.date, COALESCE(u.display_name, ''), p.excerpt, p.content \
             FROM posts p LEFT JOIN users u ON u.id = p.author_id \
             WHERE p.post_type = 'post' AND p.status = 'publish' \
             ORDER BY p.date DESC, p.id DESC LIMIT ?1",
        )?;
        let posts = stmt
            .query_map(params![limit], |row| {
                let excerpt: String = row.get(4)?;
                let content: String = row.get(5)?;
                Ok(PostSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    date: row.get(2)?,
                    author: row.get(3)?,
                    excerpt: if excerpt.is_empty() { excerpt_from_content(&content) } else { excerpt },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    fn menus(&self) -> Result<Vec<MenuInfo>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT location, menu_id FROM menu_locations")?;
        let locations = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let mut stmt = conn.prepare("SELECT id, name, slug FROM menus ORDER BY name, id")?;
        let menus = stmt
            .query_map([], |row| {
                Ok(MenuInfo {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                    locations: locations.clone(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(menus)
    }

    fn sidebars(&self) -> Result<Vec<SidebarInfo>, StoreError> {
        let conn = self.conn()?;
        let mut sidebars_stmt =
            conn.prepare("SELECT id, name FROM sidebars ORDER BY position, id")?;
        let sidebars = sidebars_stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        // Widget ids without a registered widget are skipped by the inner join.
        let mut widgets_stmt = conn.prepare(
            "SELECT w.name FROM sidebar_widgets sw JOIN widgets w ON w.id = sw.widget_id \
             WHERE sw.sidebar_id = ?1 ORDER BY sw.position, sw.widget_id",
        )?;
        sidebars
            .into_iter()
            .map(|(id, name)| -> Result<SidebarInfo, StoreError> {
                let widgets = widgets_stmt
                    .query_map(params![id], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(SidebarInfo { name, id, widgets })
            })
            .collect()
    }

    fn favicon_url(&self) -> Result<Option<String>, StoreError> {
        non_empty_option(&*self.conn()?, "site_icon_url")
    }

    fn site_logo_url(&self) -> Result<Option<String>, StoreError> {
        non_empty_option(&*self.conn()?, "custom_logo_url")
    }
}

impl QueryBackend for SqliteSite {
    fn run_query(&self, sql: &str) -> Result<QueryResult, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();

        if columns.is_empty() {
            let changed = stmt.execute([])?;
            debug!(changed, "statement executed");
            return Ok(Vec::new());
        }

        let mut rows = stmt.query([])?;
        let mut result = QueryResult::new();
        while let Some(row) = rows.next()? {
            let mut record = QueryRow::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                record.insert(name.clone(), to_json(row.get_ref(idx)?));
            }
            result.push(record);
        }
        debug!(columns = columns.len(), rows = result.len(), "query returned rows");
        Ok(result)
    }
}
