//! Seams between the gateway and the site it administers.
//!
//! The gateway only sees these traits. [`crate::SqliteSite`] implements all
//! three against one SQLite database.

use wpsage_core::{
    GeneralInfo, MenuInfo, PluginInfo, PostSummary, QueryResult, SidebarInfo, ThemeInfo,
};

use crate::StoreError;

/// Key/value settings storage.
pub trait ConfigStore: Send + Sync {
    /// Read an option. Returns `None` if the option was never set.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Create or overwrite an option.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Read-only accessors for each section of the site snapshot.
///
/// Accessors are independent: the caller may invoke them in any order and
/// treats each failure in isolation.
pub trait SiteDataProvider: Send + Sync {
    /// General site settings.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the settings cannot be read.
    fn general_info(&self) -> Result<GeneralInfo, StoreError>;

    /// Manifest of the active theme.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the theme manifest cannot be read.
    fn theme_info(&self) -> Result<ThemeInfo, StoreError>;

    /// Installed plugins with their activation state.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the plugin list cannot be read.
    fn plugins(&self) -> Result<Vec<PluginInfo>, StoreError>;

    /// Up to `limit` published posts, newest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] if posts cannot be read.
    fn recent_posts(&self, limit: usize) -> Result<Vec<PostSummary>, StoreError>;

    /// Navigation menus.
    ///
    /// # Errors
    /// Returns [`StoreError`] if menus cannot be read.
    fn menus(&self) -> Result<Vec<MenuInfo>, StoreError>;

    /// Registered sidebars with the widgets assigned to them.
    ///
    /// # Errors
    /// Returns [`StoreError`] if sidebars cannot be read.
    fn sidebars(&self) -> Result<Vec<SidebarInfo>, StoreError>;

    /// Site icon URL, `None` if no icon is set.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the option cannot be read.
    fn favicon_url(&self) -> Result<Option<String>, StoreError>;

    /// Custom logo URL, `None` if no logo is set.
    ///
    /// # Errors
    /// Returns [`StoreError`] if the option cannot be read.
    fn site_logo_url(&self) -> Result<Option<String>, StoreError>;
}

/// Generic query execution against the site's relational store.
pub trait QueryBackend: Send + Sync {
    /// Run one statement verbatim and return its rows.
    ///
    /// No filtering happens at this layer: DML and DDL run as given.
    ///
    /// # Errors
    /// Returns [`StoreError`] carrying the store's error text if the
    /// statement fails to prepare or execute.
    fn run_query(&self, sql: &str) -> Result<QueryResult, StoreError>;
}
