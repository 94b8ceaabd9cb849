//! Assembles the `/site-info` snapshot from independent section accessors.

use tracing::warn;
use wpsage_core::{Snapshot, AGENT_NAME, RECENT_POSTS_LIMIT};
use wpsage_store::{SiteDataProvider, StoreError};

fn section<T: Default>(name: &'static str, result: Result<T, StoreError>) -> T {
    result.unwrap_or_else(|e| {
        warn!(section = name, error = %e, "snapshot section unavailable; using empty value");
        T::default()
    })
}

/// Collect every snapshot section from `site`.
///
/// Never fails: a section whose accessor errors is replaced by its empty
/// value and the rest of the snapshot is still returned.
#[must_use]
pub fn collect_snapshot(site: &dyn SiteDataProvider) -> Snapshot {
    Snapshot {
        agent_name: AGENT_NAME.to_owned(),
        general_info: section("general_info", site.general_info()),
        theme_info: section("theme_info", site.theme_info()),
        plugin_info: section("plugin_info", site.plugins()),
        posts: section("posts", site.recent_posts(RECENT_POSTS_LIMIT)),
        menus: section("menus", site.menus()),
        widgets: section("widgets", site.sidebars()),
        favicon: section("favicon", site.favicon_url()).unwrap_or_default(),
        site_logo: section("site_logo", site.site_logo_url()).unwrap_or_default(),
    }
}
