//! Full site build: every stage in order, into a fresh output directory.
//!
//! ```text
//! 1. clean output     rm -rf dist/ && mkdir dist/
//! 2. parse posts      content/posts/*.md      →  Vec<Post>
//! 3. load templates   templates/*.html        →  Renderer
//! 4. render home      dist/index.html
//! 5. render posts     dist/posts/<slug>/index.html
//! 6. process static   static/**               →  dist/static/**
//! 7. process images   content/images/**       →  dist/images/**
//! 8. generate seo     dist/{sitemap.xml, robots.txt, feed.xml}
//! ```
//!
//! Each step is fatal. The first failure comes back as a [`BuildError`]
//! naming the step (and, through its source, the file). Whatever earlier
//! steps wrote stays on disk; the next build removes it.
//!
//! [`SiteBuilder`] bundles the inputs of one build so the dev server can
//! repeat it on every change.

use crate::config::{BuildOptions, ProjectPaths, SiteConfig};
use crate::content::{ContentError, parse_all_posts};
use crate::imaging::{ImageBackend, RustBackend};
use crate::process::{ImageReport, ProcessError, StaticReport, process_images, process_static};
use crate::seo;
use crate::server::Rebuild;
use crate::templates::{PageContext, RenderError, Renderer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// One stage of the build, used to tag errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStep {
    CleanOutput,
    ParsePosts,
    LoadTemplates,
    RenderHome,
    RenderPost(String),
    ProcessStatic,
    ProcessImages,
    GenerateSeo,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStep::CleanOutput => f.write_str("clean output"),
            BuildStep::ParsePosts => f.write_str("parse posts"),
            BuildStep::LoadTemplates => f.write_str("load templates"),
            BuildStep::RenderHome => f.write_str("render home"),
            BuildStep::RenderPost(slug) => write!(f, "render post {slug}"),
            BuildStep::ProcessStatic => f.write_str("process static"),
            BuildStep::ProcessImages => f.write_str("process images"),
            BuildStep::GenerateSeo => f.write_str("generate seo"),
        }
    }
}

/// What went wrong inside a step.
#[derive(Error, Debug)]
pub enum StepError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The first failing step of a build.
#[derive(Error, Debug)]
#[error("build failed at {step}: {source}")]
pub struct BuildError {
    pub step: BuildStep,
    #[source]
    pub source: StepError,
}

trait AtStep<T> {
    fn at(self, step: BuildStep) -> Result<T, BuildError>;
}

impl<T, E: Into<StepError>> AtStep<T> for Result<T, E> {
    fn at(self, step: BuildStep) -> Result<T, BuildError> {
        self.map_err(|e| BuildError {
            step,
            source: e.into(),
        })
    }
}

/// One post page written by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    pub title: String,
    pub slug: String,
    pub draft: bool,
}

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Post pages written, newest first, drafts included.
    pub posts: Vec<RenderedPost>,
    pub static_files: StaticReport,
    pub images: ImageReport,
    pub dist_dir: PathBuf,
    pub elapsed: Duration,
}

impl BuildSummary {
    pub fn drafts(&self) -> usize {
        self.posts.iter().filter(|p| p.draft).count()
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), StepError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StepError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| StepError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn clean_output(dist: &Path) -> Result<(), StepError> {
    if dist.exists() {
        fs::remove_dir_all(dist).map_err(|source| StepError::Write {
            path: dist.to_path_buf(),
            source,
        })?;
    }
    fs::create_dir_all(dist).map_err(|source| StepError::Write {
        path: dist.to_path_buf(),
        source,
    })
}

/// Build the site with the pure-Rust image backend.
pub fn build(
    paths: &ProjectPaths,
    site: &SiteConfig,
    options: BuildOptions,
) -> Result<BuildSummary, BuildError> {
    build_with_backend(paths, site, options, &RustBackend::new())
}

/// Build the site, encoding images with `backend`.
pub fn build_with_backend(
    paths: &ProjectPaths,
    site: &SiteConfig,
    options: BuildOptions,
    backend: &impl ImageBackend,
) -> Result<BuildSummary, BuildError> {
    let started = Instant::now();
    let dist = &paths.dist_dir;

    tracing::info!(dist = %dist.display(), "Cleaning output");
    clean_output(dist).at(BuildStep::CleanOutput)?;

    let posts =
        parse_all_posts(&paths.posts_dir, options.include_drafts).at(BuildStep::ParsePosts)?;
    tracing::info!(
        posts = posts.len(),
        drafts = posts.iter().filter(|p| p.draft).count(),
        "Parsed posts"
    );

    let renderer = Renderer::load(&paths.templates_dir).at(BuildStep::LoadTemplates)?;
    let page = PageContext {
        site,
        dev_mode: options.dev_mode,
    };

    let home = renderer.render_home(page, &posts).at(BuildStep::RenderHome)?;
    write_file(&dist.join("index.html"), &home).at(BuildStep::RenderHome)?;

    for post in &posts {
        let step = || BuildStep::RenderPost(post.slug.clone());
        let html = renderer.render_post(page, post).at(step())?;
        let path = dist.join("posts").join(&post.slug).join("index.html");
        write_file(&path, &html).at(step())?;
        tracing::debug!(slug = %post.slug, "Rendered post");
    }
    tracing::info!(pages = posts.len() + 1, "Rendered pages");

    let static_files =
        process_static(&paths.static_dir, &dist.join("static")).at(BuildStep::ProcessStatic)?;
    tracing::info!(
        minified = static_files.minified,
        copied = static_files.copied,
        "Processed static assets"
    );

    let images = process_images(backend, &paths.images_dir, &dist.join("images"))
        .at(BuildStep::ProcessImages)?;
    tracing::info!(
        resized = images.resized,
        reencoded = images.reencoded,
        copied = images.copied,
        "Processed images"
    );

    let docs = seo::generate(site, &posts);
    for (name, contents) in docs.files() {
        write_file(&dist.join(name), contents).at(BuildStep::GenerateSeo)?;
    }
    tracing::info!("Generated sitemap, robots and feed");

    Ok(BuildSummary {
        posts: posts
            .into_iter()
            .map(|p| RenderedPost {
                title: p.title,
                slug: p.slug,
                draft: p.draft,
            })
            .collect(),
        static_files,
        images,
        dist_dir: dist.clone(),
        elapsed: started.elapsed(),
    })
}

/// Everything needed to run the same build again.
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    pub paths: ProjectPaths,
    pub site: SiteConfig,
    pub options: BuildOptions,
}

impl SiteBuilder {
    pub fn new(paths: ProjectPaths, site: SiteConfig, options: BuildOptions) -> Self {
        Self {
            paths,
            site,
            options,
        }
    }

    pub fn build(&self) -> Result<BuildSummary, BuildError> {
        build(&self.paths, &self.site, self.options)
    }
}

impl Rebuild for SiteBuilder {
    type Error = BuildError;

    fn rebuild(&self) -> Result<(), BuildError> {
        self.build().map(|_| ())
    }
}
