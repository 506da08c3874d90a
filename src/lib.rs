//! # Billie Muk
//!
//! A small static site generator for a personal blog. Markdown posts with
//! YAML front matter go in, a plain directory of HTML, CSS and images comes
//! out, ready for any static file host.
//!
//! # Architecture: One Pass, Eight Steps
//!
//! Every build starts from an empty output directory and runs the whole
//! pipeline. There is no cache and no incremental mode: a blog is small
//! enough that rebuilding everything is faster than deciding what changed.
//!
//! ```text
//! content/posts/*.md ──► content ──► Vec<Post> ──┬──► templates ──► dist/index.html
//!                                                │                  dist/posts/<slug>/index.html
//!                                                └──► seo ───────► dist/{sitemap,feed}.xml, robots.txt
//! static/**          ──► process ──────────────────────────────► dist/static/** (CSS minified)
//! content/images/**  ──► process + imaging ────────────────────► dist/images/** (≤ 1200px)
//! ```
//!
//! The [`server`] module wraps the same build in a watch loop and pushes a
//! reload to open browser tabs after each successful rebuild.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading and validation, project paths from an explicit root |
//! | [`naming`] | Slugs: filename → slug, title → slug |
//! | [`content`] | Front matter + Markdown parsing, posts directory scan, new-post scaffold |
//! | [`templates`] | Page rendering from runtime MiniJinja templates |
//! | [`process`] | Static asset mirroring with CSS minification, image tree processing |
//! | [`imaging`] | Pure-Rust image operations behind a backend trait |
//! | [`seo`] | Sitemap, robots and RSS feed |
//! | [`builder`] | The build orchestrator: step order, step-tagged errors |
//! | [`server`] | Dev server: static files, file watcher, live reload |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Runtime Templates
//!
//! Pages are rendered from `templates/*.html` with
//! [MiniJinja](https://docs.rs/minijinja), so the look of the site can change
//! without recompiling. Undefined variables are errors, and everything except
//! the pre-rendered post body is HTML-escaped.
//!
//! ## Drafts Never Leak
//!
//! `serve` renders drafts so they can be previewed, but the sitemap and feed
//! are always generated from published posts only.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for decode, resample and
//! encode. No system libraries are needed; the binary is self-contained.

pub mod builder;
pub mod config;
pub mod content;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod seo;
pub mod server;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_helpers;
