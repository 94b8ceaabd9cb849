//! The site introspection snapshot returned by `GET /site-info`.
//!
//! Every section implements [`Default`] so that a failing accessor degrades
//! to an empty section instead of a missing key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name reported in the `agent_name` field of every snapshot.
pub const AGENT_NAME: &str = "WPSage";

/// Maximum number of posts included in a snapshot.
pub const RECENT_POSTS_LIMIT: usize = 10;

/// Aggregated read-only view of site configuration and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub agent_name: String,
    pub general_info: GeneralInfo,
    pub theme_info: ThemeInfo,
    pub plugin_info: Vec<PluginInfo>,
    /// Published posts, newest first, at most [`RECENT_POSTS_LIMIT`].
    pub posts: Vec<PostSummary>,
    pub menus: Vec<MenuInfo>,
    pub widgets: Vec<SidebarInfo>,
    /// Site icon URL, or an empty string.
    pub favicon: String,
    /// Custom logo URL, or an empty string.
    pub site_logo: String,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            agent_name: AGENT_NAME.to_owned(),
            general_info: GeneralInfo::default(),
            theme_info: ThemeInfo::default(),
            plugin_info: Vec::new(),
            posts: Vec::new(),
            menus: Vec::new(),
            widgets: Vec::new(),
            favicon: String::new(),
            site_logo: String::new(),
        }
    }
}

/// General site settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralInfo {
    pub site_title: String,
    pub tagline: String,
    pub wp_version: String,
    pub site_url: String,
    pub home_url: String,
    pub admin_email: String,
    pub language: String,
    pub timezone: String,
    pub date_format: String,
    pub time_format: String,
    /// Stored as an option string, reported verbatim.
    pub posts_per_page: String,
}

/// Manifest of the active theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub name: String,
    pub version: String,
    pub author: String,
    pub author_uri: String,
    pub template: String,
    pub stylesheet: String,
    pub screenshot: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// One installed plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub author: String,
    pub description: String,
    pub is_active: bool,
}

/// A published post as listed in the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    #[serde(rename = "ID")]
    pub id: i64,
    pub title: String,
    pub date: String,
    /// Display name of the post author, empty if the user is gone.
    pub author: String,
    pub excerpt: String,
}

/// A navigation menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuInfo {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// Theme location to menu id, for all locations (not just this menu's).
    pub locations: BTreeMap<String, i64>,
}

/// A registered sidebar and the names of the widgets placed in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarInfo {
    pub name: String,
    pub id: String,
    pub widgets: Vec<String>,
}
