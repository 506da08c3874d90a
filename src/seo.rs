//! Sitemap, robots and RSS feed.
//!
//! Pure functions of the site configuration and the post list. Drafts are
//! always filtered out here, even when the build itself includes them, so a
//! dev build never advertises unfinished posts.
//!
//! | File | Format |
//! |---|---|
//! | `sitemap.xml` | sitemaps.org 0.9: the root URL plus one `<url>` per post with `<lastmod>` |
//! | `robots.txt` | Allow everything, point at the sitemap |
//! | `feed.xml` | RSS 2.0 with an Atom self link, one `<item>` per post |
//!
//! Free text (titles, summaries) and URLs are escaped with [`xml_escape`].

use crate::config::SiteConfig;
use crate::content::Post;

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ROBOTS_FILE: &str = "robots.txt";
pub const FEED_FILE: &str = "feed.xml";

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// The three generated documents, ready to be written to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoDocuments {
    pub sitemap: String,
    pub robots: String,
    pub feed: String,
}

impl SeoDocuments {
    /// `(file name, contents)` pairs in write order.
    pub fn files(&self) -> [(&'static str, &str); 3] {
        [
            (SITEMAP_FILE, &self.sitemap),
            (ROBOTS_FILE, &self.robots),
            (FEED_FILE, &self.feed),
        ]
    }
}

/// Escape the five XML special characters.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Posts that may appear in public documents, order preserved.
pub fn published(posts: &[Post]) -> impl Iterator<Item = &Post> {
    posts.iter().filter(|p| !p.draft)
}

fn post_url(site: &SiteConfig, post: &Post) -> String {
    xml_escape(&site.absolute_url(&post.url_path()))
}

pub fn sitemap(site: &SiteConfig, posts: &[Post]) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    out.push_str(&format!(
        "  <url><loc>{}</loc></url>\n",
        xml_escape(&site.absolute_url("/"))
    ));
    for post in published(posts) {
        out.push_str(&format!(
            "  <url><loc>{}</loc><lastmod>{}</lastmod></url>\n",
            post_url(site, post),
            post.date.format("%Y-%m-%d")
        ));
    }
    out.push_str("</urlset>\n");
    out
}

pub fn robots(site: &SiteConfig) -> String {
    format!(
        "User-agent: *\nAllow: /\nSitemap: {}\n",
        site.absolute_url(SITEMAP_FILE)
    )
}

pub fn feed(site: &SiteConfig, posts: &[Post]) -> String {
    let base = xml_escape(&site.base_url);
    let title = xml_escape(&site.title);

    let mut out = String::from(XML_DECL);
    out.push_str("<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n");
    out.push_str("<channel>\n");
    out.push_str(&format!("  <title>{title}</title>\n"));
    out.push_str(&format!("  <link>{base}</link>\n"));
    out.push_str(&format!("  <description>{title}</description>\n"));
    out.push_str(&format!(
        "  <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        xml_escape(&site.absolute_url(FEED_FILE))
    ));

    for post in published(posts) {
        let url = post_url(site, post);
        out.push_str("  <item>\n");
        out.push_str(&format!("    <title>{}</title>\n", xml_escape(&post.title)));
        out.push_str(&format!("    <link>{url}</link>\n"));
        out.push_str(&format!("    <guid>{url}</guid>\n"));
        out.push_str(&format!(
            "    <pubDate>{}</pubDate>\n",
            post.date.format("%a, %d %b %Y 00:00:00 +0000")
        ));
        if !post.summary.is_empty() {
            out.push_str(&format!(
                "    <description>{}</description>\n",
                xml_escape(&post.summary)
            ));
        }
        out.push_str("  </item>\n");
    }

    out.push_str("</channel>\n");
    out.push_str("</rss>\n");
    out
}

/// Generate all three documents.
pub fn generate(site: &SiteConfig, posts: &[Post]) -> SeoDocuments {
    SeoDocuments {
        sitemap: sitemap(site, posts),
        robots: robots(site),
        feed: feed(site, posts),
    }
}
