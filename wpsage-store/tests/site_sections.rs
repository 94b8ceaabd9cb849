//! Integration test: snapshot accessors against a populated site database.

use wpsage_core::{ThemeInfo, RECENT_POSTS_LIMIT};
use wpsage_store::{ConfigStore, QueryBackend, SiteDataProvider, SqliteSite};

fn exec(site: &SqliteSite, sql: &str) {
    if let Err(e) = site.run_query(sql) {
        panic!("seed statement '{sql}' failed: {e}");
    }
}

fn populated_site() -> SqliteSite {
    let site = SqliteSite::open_in_memory().expect("in-memory site opens");
    for (name, value) in [
        ("blogname", "Example Site"),
        ("blogdescription", "Just another site"),
        ("version", "6.5.2"),
        ("siteurl", "https://example.test"),
        ("home", "https://example.test"),
        ("admin_email", "admin@example.test"),
        ("posts_per_page", "10"),
        ("active_plugins", r#"["akismet/akismet.php"]"#),
        ("site_icon_url", "https://example.test/icon.png"),
    ] {
        site.set(name, value).expect("option write succeeds");
    }
    exec(&site, "INSERT INTO users (id, display_name) VALUES (1, 'Ada')");
    for i in 1..=12 {
        exec(
            &site,
            &format!(
                "INSERT INTO posts (id, title, date, author_id, excerpt) \
                 VALUES ({i}, 'Post {i}', '2024-01-{i:02} 09:00:00', 1, 'Excerpt {i}')"
            ),
        );
    }
    exec(&site, "INSERT INTO posts (id, title, date, status) VALUES (99, 'Draft', '2030-01-01 00:00:00', 'draft')");
    exec(&site, "INSERT INTO posts (id, title, date, post_type) VALUES (98, 'About', '2030-01-01 00:00:00', 'page')");
    exec(&site, "INSERT INTO plugins (path, name, version) VALUES ('akismet/akismet.php', 'Akismet', '5.3')");
    exec(&site, "INSERT INTO plugins (path, name, version) VALUES ('hello.php', 'Hello Dolly', '1.7')");
    exec(&site, "INSERT INTO theme (key, value) VALUES ('name', 'Twenty Twenty-Four')");
    exec(&site, "INSERT INTO theme (key, value) VALUES ('tags', 'one-column, blog ,')");
    exec(&site, "INSERT INTO menus (id, name, slug) VALUES (4, 'Main', 'main')");
    exec(&site, "INSERT INTO menu_locations (location, menu_id) VALUES ('primary', 4)");
    exec(&site, "INSERT INTO sidebars (id, name, position) VALUES ('sidebar-1', 'Blog Sidebar', 0)");
    exec(&site, "INSERT INTO widgets (id, name) VALUES ('search-2', 'Search')");
    exec(&site, "INSERT INTO sidebar_widgets (sidebar_id, widget_id, position) VALUES ('sidebar-1', 'search-2', 0)");
    exec(&site, "INSERT INTO sidebar_widgets (sidebar_id, widget_id, position) VALUES ('sidebar-1', 'gone-3', 1)");
    site
}

#[test]
fn recent_posts_are_published_newest_first_and_capped() {
    let site = populated_site();
    let posts = site.recent_posts(RECENT_POSTS_LIMIT).expect("posts load");
    assert_eq!(posts.len(), RECENT_POSTS_LIMIT);
    assert_eq!(posts[0].id, 12, "newest post must come first");
    assert_eq!(posts[9].id, 3);
    assert!(posts.iter().all(|p| p.author == "Ada"));
    assert!(posts.iter().all(|p| p.id != 98 && p.id != 99), "drafts and pages excluded");
}

#[test]
fn plugins_report_activation_state() {
    let plugins = populated_site().plugins().expect("plugins load");
    assert_eq!(plugins.len(), 2);
    assert_eq!(plugins[0].name, "Akismet");
    assert!(plugins[0].is_active);
    assert!(!plugins[1].is_active);
}

#[test]
fn theme_menus_and_sidebars_are_assembled() {
    let site = populated_site();

    let theme = site.theme_info().expect("theme loads");
    assert_eq!(theme.name, "Twenty Twenty-Four");
    assert_eq!(theme.tags, ["one-column", "blog"]);

    let menus = site.menus().expect("menus load");
    assert_eq!(menus.len(), 1);
    assert_eq!(menus[0].locations.get("primary"), Some(&4));

    let sidebars = site.sidebars().expect("sidebars load");
    assert_eq!(sidebars.len(), 1);
    assert_eq!(sidebars[0].widgets, ["Search"], "unregistered widgets are skipped");
}

#[test]
fn general_info_and_media_come_from_options() {
    let site = populated_site();
    let info = site.general_info().expect("general info loads");
    assert_eq!(info.site_title, "Example Site");
    assert_eq!(info.posts_per_page, "10");
    assert_eq!(info.timezone, "", "unset options read as empty");

    assert_eq!(
        site.favicon_url().expect("favicon loads").as_deref(),
        Some("https://example.test/icon.png")
    );
    assert_eq!(site.site_logo_url().expect("logo loads"), None);
}

#[test]
fn empty_site_yields_empty_sections() {
    let site = SqliteSite::open_in_memory().expect("in-memory site opens");
    assert!(site.recent_posts(RECENT_POSTS_LIMIT).expect("posts").is_empty());
    assert!(site.plugins().expect("plugins").is_empty());
    assert!(site.menus().expect("menus").is_empty());
    assert!(site.sidebars().expect("sidebars").is_empty());
    assert_eq!(site.theme_info().expect("theme"), ThemeInfo::default());
}
