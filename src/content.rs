//! Post parsing: front matter, Markdown, and the posts directory scan.
//!
//! Stage 1 of the build. Each post is one Markdown file with a YAML front
//! matter block:
//!
//! ```text
//! ---
//! title: "Hello World"
//! date: 2026-01-15
//! summary: "Optional one-liner for the home page and feed."
//! draft: false
//! ---
//!
//! Body in **Markdown**.
//! ```
//!
//! | Field | Required | Default |
//! |---|---|---|
//! | `title` | yes | |
//! | `date` | yes, `YYYY-MM-DD` | |
//! | `summary` | no | empty |
//! | `draft` | no | `false` |
//!
//! Unknown keys are ignored so older posts keep building when fields are
//! retired. The slug is the filename without its extension (see
//! [`naming`](crate::naming)).
//!
//! ## Scanning
//!
//! [`parse_all_posts`] reads every `*.md` file directly inside the posts
//! directory in filename order, drops drafts unless asked not to, and sorts
//! newest first. Any single failure aborts the whole scan.

use crate::naming::{slug_from_path, slugify};
use chrono::NaiveDate;
use pulldown_cmark::{Options, Parser, html as md_html};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Date format used in front matter and file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no front matter found in {0}")]
    MissingFrontMatter(PathBuf),
    #[error("invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("front matter in {path} is missing required field `{field}`")]
    MissingField { path: PathBuf, field: &'static str },
    #[error("invalid date {value:?} in {path} (expected YYYY-MM-DD): {source}")]
    InvalidDate {
        path: PathBuf,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("title {0:?} produces an empty slug")]
    EmptySlug(String),
    #[error("post already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One article, parsed from a single source file.
///
/// Immutable once constructed; lives for the duration of one build.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub title: String,
    pub date: NaiveDate,
    /// Empty when the front matter has no summary.
    pub summary: String,
    pub draft: bool,
    /// Filename without extension; unique within a build.
    pub slug: String,
    /// Rendered body, a trusted HTML fragment.
    pub html: String,
}

impl Post {
    /// The metadata block this post was parsed from.
    pub fn front_matter(&self) -> FrontMatter {
        FrontMatter {
            title: self.title.clone(),
            date: self.date,
            summary: self.summary.clone(),
            draft: self.draft,
        }
    }

    /// Site-absolute URL of the rendered post page.
    pub fn url_path(&self) -> String {
        format!("/posts/{}/", self.slug)
    }
}

/// Typed post metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub date: NaiveDate,
    pub summary: String,
    pub draft: bool,
}

impl FrontMatter {
    /// Serialize as a fenced YAML block, strings double-quoted.
    ///
    /// Parsing the output yields an identical `FrontMatter`.
    pub fn format(&self) -> String {
        format!(
            "---\ntitle: {}\ndate: {}\nsummary: {}\ndraft: {}\n---\n",
            yaml_quote(&self.title),
            self.date.format(DATE_FORMAT),
            yaml_quote(&self.summary),
            self.draft,
        )
    }
}

/// Front matter as written by hand: every field optional so that missing
/// required fields get a precise error instead of a generic YAML one.
#[derive(Debug, Deserialize)]
struct RawFrontMatter {
    title: Option<String>,
    date: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    draft: Option<bool>,
}

/// Quote a string as a YAML double-quoted scalar.
fn yaml_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Split a source file into its YAML block and Markdown body.
///
/// The file must open with a `---` line; the block ends at the next line that
/// is exactly `---`. Returns `None` when either fence is missing.
fn split_front_matter(src: &str) -> Option<(&str, &str)> {
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);
    let rest = src.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Render a Markdown fragment to HTML.
///
/// CommonMark plus tables, strikethrough, footnotes and task lists.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut html, parser);
    html
}

/// Parse an in-memory source file. `path` is used for the slug and errors.
pub fn parse_post_source(path: &Path, src: &str) -> Result<Post, ContentError> {
    let (yaml, body) =
        split_front_matter(src).ok_or_else(|| ContentError::MissingFrontMatter(path.into()))?;

    let raw: RawFrontMatter =
        serde_yaml::from_str(yaml).map_err(|source| ContentError::FrontMatter {
            path: path.into(),
            source,
        })?;

    let title = raw.title.ok_or_else(|| ContentError::MissingField {
        path: path.into(),
        field: "title",
    })?;
    let date_str = raw.date.ok_or_else(|| ContentError::MissingField {
        path: path.into(),
        field: "date",
    })?;
    let date = NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT).map_err(|source| {
        ContentError::InvalidDate {
            path: path.into(),
            value: date_str.clone(),
            source,
        }
    })?;
    let slug = slug_from_path(path).ok_or_else(|| ContentError::MissingFrontMatter(path.into()))?;

    Ok(Post {
        title,
        date,
        summary: raw.summary.unwrap_or_default(),
        draft: raw.draft.unwrap_or(false),
        slug,
        html: render_markdown(body),
    })
}

/// Read and parse one post file.
pub fn parse_post(path: &Path) -> Result<Post, ContentError> {
    let src = fs::read_to_string(path).map_err(|source| ContentError::Read {
        path: path.into(),
        source,
    })?;
    parse_post_source(path, &src)
}

/// Parse every post in `dir`, newest first.
///
/// Drafts are dropped unless `include_drafts` is set. Posts sharing a date
/// keep filename order. The first unparseable file aborts the scan.
pub fn parse_all_posts(dir: &Path, include_drafts: bool) -> Result<Vec<Post>, ContentError> {
    let read_err = |source| ContentError::Read {
        path: dir.into(),
        source,
    };

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "md") {
            files.push(path);
        }
    }
    files.sort();

    let mut posts = Vec::with_capacity(files.len());
    for path in &files {
        let post = parse_post(path)?;
        if post.draft && !include_drafts {
            tracing::debug!(slug = %post.slug, "Skipping draft");
            continue;
        }
        tracing::debug!(slug = %post.slug, date = %post.date, "Parsed post");
        posts.push(post);
    }

    sort_newest_first(&mut posts);
    Ok(posts)
}

/// Stable sort by date, newest first.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Scaffold a new draft post named `<date>-<slug>.md` in `posts_dir`.
///
/// Creates the directory if needed and never overwrites an existing file.
/// Returns the path written.
pub fn new_post(posts_dir: &Path, title: &str, date: NaiveDate) -> Result<PathBuf, ContentError> {
    let slug = slugify(title);
    if slug.is_empty() {
        return Err(ContentError::EmptySlug(title.to_string()));
    }

    fs::create_dir_all(posts_dir).map_err(|source| ContentError::Write {
        path: posts_dir.into(),
        source,
    })?;

    let path = posts_dir.join(format!("{}-{}.md", date.format(DATE_FORMAT), slug));
    if path.exists() {
        return Err(ContentError::AlreadyExists(path));
    }

    let front_matter = FrontMatter {
        title: title.to_string(),
        date,
        summary: String::new(),
        draft: true,
    };
    let contents = format!("{}\n", front_matter.format());
    fs::write(&path, contents).map_err(|source| ContentError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Created post");
    Ok(path)
}
