use billiemuk::builder::{self, SiteBuilder};
use billiemuk::config::{self, BuildOptions, ProjectPaths};
use billiemuk::server::{DevServer, parse_listen_addr};
use billiemuk::{content, output};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "billiemuk", version)]
#[command(about = "Static site generator for a Markdown blog")]
#[command(long_about = "\
Static site generator for a Markdown blog

Posts are Markdown files with YAML front matter. Templates, stylesheets and
images live next to them; everything is rendered into dist/.

Project structure:

  <root>/
  ├── config.toml                       # Site config (optional)
  ├── content/
  │   ├── posts/
  │   │   └── 2026-01-15-hello-world.md # Front matter + Markdown body
  │   └── images/                       # JPEG/PNG resized to 1200px wide
  ├── templates/                        # base.html, home.html, post.html
  └── static/                           # Copied, *.css minified to *.min.css

Run 'billiemuk gen-config' to generate a documented config.toml.")]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Project root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log build steps (otherwise RUST_LOG, default warn)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site once into dist/, drafts excluded
    Build,
    /// Build with drafts, serve dist/ and rebuild on every change
    Serve {
        /// Listen address, `:port` for all interfaces (default from config.toml)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Scaffold a new draft post dated today
    New {
        /// Post title
        title: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = ProjectPaths::new(cli.root.clone());

    match cli.command {
        Command::Build => {
            let site = config::load_config(&paths.root)?;
            let summary = builder::build(&paths, &site, BuildOptions::production())?;
            output::print_build_summary(&summary);
        }
        Command::Serve { addr } => {
            let site = config::load_config(&paths.root)?;
            let addr = addr.unwrap_or_else(|| site.server.addr.clone());
            let socket = parse_listen_addr(&addr)?;

            let dist = paths.dist_dir.clone();
            let watch = paths.watch_dirs();
            let site_builder = SiteBuilder::new(paths, site, BuildOptions::development());
            let server = DevServer::new(site_builder, dist.clone(), watch);

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async {
                server.initial_build().await?;
                output::print_serve_banner(&addr, &dist);
                server.serve(socket).await
            })?;
        }
        Command::New { title } => {
            let site = config::load_config(&paths.root)?;
            let today = chrono::Local::now().date_naive();
            let path = content::new_post(&paths.posts_dir, &title, today)?;
            output::print_new_post(&path, &site.server.addr);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
