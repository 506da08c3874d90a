//! Page rendering from a templates directory.
//!
//! Stage 2 of the build. Templates are plain files loaded at runtime with
//! [MiniJinja](https://docs.rs/minijinja), so the site's look can change
//! without recompiling:
//!
//! ```text
//! templates/
//! ├── base.html     # Shared layout: head, header, socials, footer
//! ├── home.html     # {% extends "base.html" %}, lists `posts`
//! └── post.html     # {% extends "base.html" %}, shows `post`
//! ```
//!
//! ## Template Data
//!
//! | Variable | Pages | Contents |
//! |---|---|---|
//! | `site` | all | `title`, `base_url`, `author`, `year`, `socials[]` (`name`, `url`) |
//! | `dev_mode` | all | `true` under `serve` |
//! | `live_reload` | all | Reload `<script>` in dev mode, empty otherwise |
//! | `posts` | home | Post list, newest first |
//! | `post` | post | The single post |
//!
//! Each post exposes `title`, `date` (`2026-01-15`), `date_display`
//! (`January 15, 2026`), `summary`, `slug`, `draft`, `url` (`/posts/<slug>/`)
//! and `content`.
//!
//! ## Escaping
//!
//! Every value is HTML-escaped on output except `content` and `live_reload`,
//! which are trusted HTML produced by this crate. Referencing a variable that
//! does not exist is a render error rather than an empty string.
//!
//! The live-reload script itself is a fixed [Maud](https://maud.lambda.xyz/)
//! fragment, see [`live_reload_script`].

use crate::config::SiteConfig;
use crate::content::Post;
use maud::{Escaper, Markup, PreEscaped, html};
use minijinja::value::Value;
use minijinja::{AutoEscape, Environment, Output, State, UndefinedBehavior, context, path_loader};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Path of the live-reload event stream served by the dev server.
pub const LIVE_RELOAD_PATH: &str = "/_reload";

pub const BASE_TEMPLATE: &str = "base.html";
pub const HOME_TEMPLATE: &str = "home.html";
pub const POST_TEMPLATE: &str = "post.html";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("templates directory not found: {0}")]
    MissingDir(PathBuf),
    #[error("cannot load template {name}: {source}")]
    Load {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },
    #[error("cannot render {name}: {source}")]
    Render {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Per-build data shared by every page.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub site: &'a SiteConfig,
    pub dev_mode: bool,
}

/// Loaded templates, ready to render any number of pages.
///
/// Rendering has no hidden state: the same inputs always give the same HTML.
#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
}

/// Escape `& < > " '` but leave `/` alone so URLs stay readable in the
/// output.
fn html_formatter(out: &mut Output, state: &State, value: &Value) -> Result<(), minijinja::Error> {
    if matches!(state.auto_escape(), AutoEscape::Html) && !value.is_safe() {
        let mut escaped = String::new();
        match value.as_str() {
            Some(s) => Escaper::new(&mut escaped).write_str(s)?,
            None => write!(Escaper::new(&mut escaped), "{value}")?,
        }
        // maud leaves apostrophes alone; single-quoted attributes need them escaped.
        out.write_str(&escaped.replace('\'', "&#39;"))?;
        Ok(())
    } else {
        minijinja::escape_formatter(out, state, value)
    }
}

impl Renderer {
    /// Load `base.html`, `home.html` and `post.html` from `templates_dir`.
    ///
    /// Every template is parsed up front so a missing or malformed file fails
    /// here, not halfway through a build.
    pub fn load(templates_dir: &Path) -> Result<Self, RenderError> {
        if !templates_dir.is_dir() {
            return Err(RenderError::MissingDir(templates_dir.to_path_buf()));
        }

        let mut env = Environment::new();
        env.set_loader(path_loader(templates_dir));
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_formatter(html_formatter);

        for name in [BASE_TEMPLATE, HOME_TEMPLATE, POST_TEMPLATE] {
            env.get_template(name)
                .map_err(|source| RenderError::Load { name, source })?;
        }

        Ok(Self { env })
    }

    fn render(&self, name: &'static str, ctx: Value) -> Result<String, RenderError> {
        self.env
            .get_template(name)
            .and_then(|t| t.render(ctx))
            .map_err(|source| RenderError::Render { name, source })
    }

    /// Render the home page listing `posts` in the order given.
    pub fn render_home(&self, page: PageContext<'_>, posts: &[Post]) -> Result<String, RenderError> {
        let posts: Vec<Value> = posts.iter().map(post_value).collect();
        self.render(
            HOME_TEMPLATE,
            context! {
                site => site_value(page.site),
                dev_mode => page.dev_mode,
                live_reload => live_reload_value(page.dev_mode),
                posts => posts,
            },
        )
    }

    /// Render a single post page.
    pub fn render_post(&self, page: PageContext<'_>, post: &Post) -> Result<String, RenderError> {
        self.render(
            POST_TEMPLATE,
            context! {
                site => site_value(page.site),
                dev_mode => page.dev_mode,
                live_reload => live_reload_value(page.dev_mode),
                post => post_value(post),
            },
        )
    }
}

fn site_value(site: &SiteConfig) -> Value {
    context! {
        title => &site.title,
        base_url => &site.base_url,
        author => &site.author,
        year => site.year(),
        socials => &site.socials,
    }
}

fn post_value(post: &Post) -> Value {
    context! {
        title => &post.title,
        date => post.date.format("%Y-%m-%d").to_string(),
        date_display => post.date.format("%B %-d, %Y").to_string(),
        summary => &post.summary,
        slug => &post.slug,
        draft => post.draft,
        url => post.url_path(),
        content => Value::from_safe_string(post.html.clone()),
    }
}

fn live_reload_value(dev_mode: bool) -> Value {
    if dev_mode {
        Value::from_safe_string(live_reload_script().into_string())
    } else {
        Value::from_safe_string(String::new())
    }
}

/// Client script that reloads the page on every event from
/// [`LIVE_RELOAD_PATH`].
pub fn live_reload_script() -> Markup {
    let js = format!("new EventSource('{LIVE_RELOAD_PATH}').onmessage = () => location.reload();");
    html! {
        script { (PreEscaped(js)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Social;
    use crate::test_helpers::{fixture_config, sample_post, setup_fixtures};
    use std::fs;
    use tempfile::TempDir;

    fn fixture_renderer() -> (TempDir, Renderer) {
        let tmp = setup_fixtures();
        let renderer = Renderer::load(&tmp.path().join("templates")).unwrap();
        (tmp, renderer)
    }

    fn page(site: &SiteConfig, dev_mode: bool) -> PageContext<'_> {
        PageContext { site, dev_mode }
    }

    // =========================================================================
    // Home page
    // =========================================================================

    #[test]
    fn home_lists_posts_and_layout() {
        let (_tmp, renderer) = fixture_renderer();
        let site = fixture_config();
        let mut post = sample_post("2026-01-15-first-post", "First Post", "2026-01-15");
        post.summary = "A summary.".into();

        let html = renderer.render_home(page(&site, false), &[post]).unwrap();

        for check in [
            "Test Site",
            "First Post",
            "A summary.",
            "January 15, 2026",
            r#"href="/posts/2026-01-15-first-post/""#,
            "<header",
            "<main",
            "<article",
            "<svg",
            r#"aria-label="GitHub""#,
            r#"aria-label="LinkedIn""#,
            "theme.min.css",
            "2026 Test Author",
        ] {
            assert!(html.contains(check), "home HTML missing {check:?}");
        }
    }

    #[test]
    fn home_keeps_given_order() {
        let (_tmp, renderer) = fixture_renderer();
        let site = fixture_config();
        let posts = [
            sample_post("b", "Newer", "2026-02-01"),
            sample_post("a", "Older", "2026-01-01"),
        ];

        let html = renderer.render_home(page(&site, false), &posts).unwrap();
        let newer = html.find("Newer").unwrap();
        let older = html.find("Older").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn home_with_no_posts_renders() {
        let (_tmp, renderer) = fixture_renderer();
        let site = fixture_config();
        let html = renderer.render_home(page(&site, false), &[]).unwrap();
        assert!(html.contains("Nothing here yet."));
    }

    #[test]
    fn socials_come_from_config() {
        let (_tmp, renderer) = fixture_renderer();
        let mut site = fixture_config();
        site.socials = vec![Social {
            name: "Mastodon".into(),
            url: "https://mastodon.example/@test".into(),
        }];

        let html = renderer.render_home(page(&site, false), &[]).unwrap();
        assert!(html.contains(r#"aria-label="Mastodon""#));
        assert!(!html.contains(r#"aria-label="GitHub""#));
    }

    // =========================================================================
    // Post page
    // =========================================================================

    #[test]
    fn post_page_has_body_and_meta() {
        let (_tmp, renderer) = fixture_renderer();
        let site = fixture_config();
        let mut post = sample_post("2026-01-15-my-post", "My Post", "2026-01-15");
        post.html = "<p>Hello <strong>world</strong>.</p>".into();

        let html = renderer.render_post(page(&site, false), &post).unwrap();

        for check in [
            "My Post",
            "<p>Hello <strong>world</strong>.</p>",
            "og:title",
            "og:type",
            r#"<link rel="canonical" href="https://example.com/posts/2026-01-15-my-post/">"#,
            "<article",
            "<header",
        ] {
            assert!(html.contains(check), "post HTML missing {check:?}");
        }
    }

    #[test]
    fn text_fields_are_escaped_but_body_is_not() {
        let (_tmp, renderer) = fixture_renderer();
        let site = fixture_config();
        let mut post = sample_post("x", r#"Fish & Chips <"Reviewed">"#, "2026-01-20");
        post.html = "<p><em>trusted</em></p>".into();

        let html = renderer.render_post(page(&site, false), &post).unwrap();
        assert!(html.contains("Fish &amp; Chips &lt;&quot;Reviewed&quot;&gt;"));
        assert!(!html.contains("<\"Reviewed\">"));
        assert!(html.contains("<p><em>trusted</em></p>"));
    }

    #[test]
    fn apostrophe_cannot_leave_single_quoted_attribute() {
        let tmp = setup_fixtures();
        let templates = tmp.path().join("templates");
        fs::write(templates.join("post.html"), "<a title='{{ post.title }}'>").unwrap();
        let renderer = Renderer::load(&templates).unwrap();
        let site = fixture_config();
        let post = sample_post("x", "x' onmouseover='alert(1)", "2026-01-20");

        let html = renderer.render_post(page(&site, false), &post).unwrap();
        assert_eq!(html, "<a title='x&#39; onmouseover=&#39;alert(1)'>");
    }

    #[test]
    fn urls_keep_their_slashes() {
        let (_tmp, renderer) = fixture_renderer();
        let site = fixture_config();
        let post = sample_post("2026-01-15-a", "A", "2026-01-15");

        let html = renderer.render_post(page(&site, false), &post).unwrap();
        assert!(html.contains("https://example.com/posts/2026-01-15-a/"));
        assert!(!html.contains("&#x2f;"));
    }

    // =========================================================================
    // Dev mode
    // =========================================================================

    #[test]
    fn live_reload_only_in_dev_mode() {
        let (_tmp, renderer) = fixture_renderer();
        let site = fixture_config();
        let post = sample_post("p", "P", "2026-01-01");

        let prod = renderer.render_post(page(&site, false), &post).unwrap();
        assert!(!prod.contains("EventSource"));

        let dev = renderer.render_post(page(&site, true), &post).unwrap();
        assert!(dev.contains("<script>new EventSource('/_reload')"));
        assert!(dev.contains("location.reload()"));
    }

    #[test]
    fn live_reload_script_markup() {
        let script = live_reload_script().into_string();
        assert!(script.starts_with("<script>"));
        assert!(script.ends_with("</script>"));
        assert!(script.contains(LIVE_RELOAD_PATH));
    }

    // =========================================================================
    // Load and render errors
    // =========================================================================

    #[test]
    fn missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = Renderer::load(&tmp.path().join("templates"));
        assert!(matches!(result, Err(RenderError::MissingDir(_))));
    }

    #[test]
    fn missing_post_template_is_error() {
        let tmp = setup_fixtures();
        fs::remove_file(tmp.path().join("templates/post.html")).unwrap();

        let result = Renderer::load(&tmp.path().join("templates"));
        assert!(matches!(
            result,
            Err(RenderError::Load {
                name: "post.html",
                ..
            })
        ));
    }

    #[test]
    fn malformed_template_is_error() {
        let tmp = setup_fixtures();
        fs::write(tmp.path().join("templates/home.html"), "{% for post in posts %}").unwrap();

        let result = Renderer::load(&tmp.path().join("templates"));
        assert!(matches!(
            result,
            Err(RenderError::Load {
                name: "home.html",
                ..
            })
        ));
    }

    #[test]
    fn undefined_variable_is_render_error() {
        let tmp = setup_fixtures();
        fs::write(
            tmp.path().join("templates/post.html"),
            "{% extends \"base.html\" %}{% block content %}{{ post.author }}{% endblock %}",
        )
        .unwrap();
        let renderer = Renderer::load(&tmp.path().join("templates")).unwrap();
        let site = fixture_config();

        let result = renderer.render_post(page(&site, false), &sample_post("p", "P", "2026-01-01"));
        assert!(matches!(
            result,
            Err(RenderError::Render {
                name: "post.html",
                ..
            })
        ));
    }
}
