use clap::{Parser, Subcommand};
use simple_press::client::{ContentSource, WordPressClient};
use simple_press::config::{self, SiteConfig};
use simple_press::{fetch, generate, output};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directive.
const LOG_ENV: &str = "SIMPLE_PRESS_LOG";

/// Exit status for an API request that failed.
const EXIT_FAILURE: i32 = 1;

/// Exit status for a slug that matched no published post.
const EXIT_NOT_FOUND: i32 = 2;

#[derive(Parser)]
#[command(name = "simple-press")]
#[command(about = "Static site generator for headless WordPress")]
#[command(long_about = "\
Static site generator for headless WordPress

WordPress is the data source. Posts, pages and categories are read from the
REST API and rendered into a static site: a home grid, a post archive, one
page per post and per WordPress page.

Site directory:

  site/
  ├── config.toml        # Site config (optional, overrides stock defaults)
  └── assets/            # Static files (favicon, robots.txt) → copied to output root

Card image resolution (first available wins):
  1. `thumbnail` custom field, image object with a `url`
  2. `thumbnail` custom field, URL string
  3. Featured media (`_embed`)
  4. First <img> in the post body

API URL resolution (first set wins):
  --api-url flag → WORDPRESS_API_URL → api_url in config.toml → http://localhost/wp-json/wp/v2

Run 'simple-press gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site directory (config.toml and assets/)
    #[arg(long, default_value = "site", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".simple-press-temp", global = true)]
    temp_dir: PathBuf,

    /// WordPress REST API base URL, e.g. https://example.org/wp-json/wp/v2
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch posts and pages from the API into a manifest
    Fetch,
    /// Produce the HTML site from a fetched manifest
    Generate,
    /// Run the full pipeline: fetch → generate
    Build,
    /// Fetch one post by slug and render its page
    Post {
        /// Post slug
        slug: String,
        /// Write the page here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the category taxonomy
    Categories,
    /// Validate the config and check that the API answers
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    match &cli.command {
        Command::Fetch => {
            let config = load_site_config(&cli)?;
            run_fetch(&config, &cli.temp_dir)?;
        }
        Command::Generate => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let manifest = generate::generate(&manifest_path, &cli.output, &cli.source)?;
            output::print_generate_output(&manifest);
        }
        Command::Build => {
            let config = load_site_config(&cli)?;

            println!("==> Stage 1: Fetching {}", config.api_url);
            let manifest_path = run_fetch(&config, &cli.temp_dir)?;

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let manifest = generate::generate(&manifest_path, &cli.output, &cli.source)?;
            output::print_generate_output(&manifest);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Post { slug, out } => {
            let config = load_site_config(&cli)?;
            let client = WordPressClient::from_config(&config)?;
            let item = match client.post_by_slug(slug) {
                Ok(Some(item)) => item,
                Ok(None) => {
                    eprintln!("Post not found: {slug}");
                    std::process::exit(EXIT_NOT_FOUND);
                }
                Err(e) => {
                    output::print_api_failure("post", &e.to_string());
                    std::process::exit(EXIT_FAILURE);
                }
            };
            let pages = client.pages().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "page fetch failed; rendering without nav pages");
                Vec::new()
            });
            let site = generate::Site::new(&config, &pages, current_year());
            let html = generate::render_post_page(&site, &item).into_string();
            match out {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(path, html)?;
                    println!("{} \u{2192} {}", item.plain_title(), path.display());
                }
                None => print!("{html}"),
            }
        }
        Command::Categories => {
            let config = load_site_config(&cli)?;
            let client = WordPressClient::from_config(&config)?;
            output::print_categories(&client.categories()?);
        }
        Command::Check => {
            let config = load_site_config(&cli)?;
            let client = WordPressClient::from_config(&config)?;
            let api = client
                .categories()
                .map(|categories| categories.len())
                .map_err(|e| e.to_string());
            output::print_check(&config, &api);
            if let Err(message) = api {
                output::print_api_failure("categories", &message);
                std::process::exit(EXIT_FAILURE);
            }
            println!("==> Config and API are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Route `tracing` to stderr so stdout stays clean for `post` output.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load `config.toml` from the site directory, then apply the API URL
/// overrides: `WORDPRESS_API_URL`, then `--api-url`.
fn load_site_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.source)?;
    config.apply_api_url_overrides(
        std::env::var(config::API_URL_ENV).ok(),
        cli.api_url.clone(),
    );
    config.validate()?;
    tracing::debug!(api_url = %config.api_url, "config loaded");
    Ok(config)
}

/// Run the fetch stage and write its manifest. Returns the manifest path.
fn run_fetch(config: &SiteConfig, temp_dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    init_thread_pool(&config.fetch);
    let client = WordPressClient::from_config(config)?;

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_fetch_event(&event) {
                println!("{}", line);
            }
        }
    });
    let manifest = fetch::fetch(&client, config, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    output::print_fetch_output(&manifest);

    std::fs::create_dir_all(temp_dir)?;
    let manifest_path = temp_dir.join("manifest.json");
    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(&manifest_path, json)?;
    Ok(manifest_path)
}

/// Initialize the rayon thread pool based on fetch config.
///
/// Caps at the number of available CPU cores; config can lower it, not raise it.
fn init_thread_pool(fetch: &config::FetchConfig) {
    let threads = config::effective_threads(fetch);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Local::now().year()
}
