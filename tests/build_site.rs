//! End-to-end build of the fixture site through the public API.
//!
//! Copies `fixtures/site/` into a temp root, adds a large JPEG, runs the
//! production build with the real image backend and checks the output tree.

use billiemuk::builder::{self, BuildStep};
use billiemuk::config::{self, BuildOptions, ProjectPaths};
use billiemuk::content;
use image::{ImageEncoder, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn copy_dir(src: &Path, dst: &Path) {
    fs::create_dir_all(dst).unwrap();
    for entry in fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

fn fixture_root() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir(&fixtures, tmp.path());
    tmp
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = fs::File::create(path).unwrap();
    image::codecs::jpeg::JpegEncoder::new_with_quality(file, 90)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

#[test]
fn production_build_of_fixture_site() {
    let tmp = fixture_root();
    let paths = ProjectPaths::new(tmp.path());
    fs::create_dir_all(&paths.images_dir).unwrap();
    write_jpeg(&paths.images_dir.join("hero.jpg"), 2400, 1600);

    let site = config::load_config(&paths.root).unwrap();
    assert_eq!(site.title, "Test Site");

    let summary = builder::build(&paths, &site, BuildOptions::production()).unwrap();
    assert_eq!(summary.posts.len(), 2);
    assert_eq!(summary.images.resized, 1);

    let dist = &paths.dist_dir;
    let home = fs::read_to_string(dist.join("index.html")).unwrap();
    assert!(home.contains("Hello World"));
    assert!(home.contains("Fish &amp; Chips &lt;Reviewed&gt;"));
    assert!(!home.contains("Work in Progress"));
    assert!(home.contains("&copy; 2026 Test Author"));

    let post = fs::read_to_string(dist.join("posts/2026-01-15-hello-world/index.html")).unwrap();
    assert!(post.contains("<strong>new</strong>"));
    assert!(post.contains(r#"<link rel="canonical" href="https://example.com/posts/2026-01-15-hello-world/">"#));

    let css = fs::read_to_string(dist.join("static/css/theme.min.css")).unwrap();
    assert!(!css.contains("/*"));
    assert!(css.contains(".post-card"));

    assert_eq!(
        image::image_dimensions(dist.join("images/hero.jpg")).unwrap(),
        (1200, 800)
    );

    let feed = fs::read_to_string(dist.join("feed.xml")).unwrap();
    assert_eq!(feed.matches("<item>").count(), 2);
    assert!(feed.contains("<title>Fish &amp; Chips &lt;Reviewed&gt;</title>"));

    let robots = fs::read_to_string(dist.join("robots.txt")).unwrap();
    assert!(robots.ends_with("Sitemap: https://example.com/sitemap.xml\n"));
}

#[test]
fn scaffolded_post_is_a_draft_until_published() {
    let tmp = fixture_root();
    let paths = ProjectPaths::new(tmp.path());
    let site = config::load_config(&paths.root).unwrap();
    let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

    let path = content::new_post(&paths.posts_dir, "Spring Notes", date).unwrap();
    assert!(path.ends_with("2026-03-01-spring-notes.md"));

    builder::build(&paths, &site, BuildOptions::production()).unwrap();
    assert!(!paths.dist_dir.join("posts/2026-03-01-spring-notes").exists());

    let source = fs::read_to_string(&path).unwrap().replace("draft: true", "draft: false");
    fs::write(&path, source).unwrap();

    builder::build(&paths, &site, BuildOptions::production()).unwrap();
    let page = fs::read_to_string(paths.dist_dir.join("posts/2026-03-01-spring-notes/index.html")).unwrap();
    assert!(page.contains("Spring Notes"));
}

#[test]
fn missing_posts_directory_fails_the_build() {
    let tmp = fixture_root();
    let paths = ProjectPaths::new(tmp.path());
    fs::remove_dir_all(&paths.posts_dir).unwrap();
    let site = config::load_config(&paths.root).unwrap();

    let err = builder::build(&paths, &site, BuildOptions::production()).unwrap_err();
    assert_eq!(err.step, BuildStep::ParsePosts);
}
