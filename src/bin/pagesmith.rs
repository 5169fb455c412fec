use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use pagesmith::theme::ThemeFilter;
use pagesmith::{
    ComposeOutcome, DescriptorParser, MemoryThemeStore, PageRuntime, PagesmithError,
    RuntimeConfig, SubsetFilter,
};
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pagesmith", version)]
struct Cli {
    /// Directory of `<page_id>/page.yaml` descriptors.
    #[arg(long, global = true, env = "PAGESMITH_PAGES_DIR")]
    pages_dir: Option<PathBuf>,

    /// Theme store JSON snapshot.
    #[arg(long, global = true, env = "PAGESMITH_THEME_STORE")]
    theme_store: Option<PathBuf>,

    /// Theme auto-refresh interval in seconds.
    #[arg(long, global = true, env = "PAGESMITH_REFRESH_SECS")]
    refresh_secs: Option<u64>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a single descriptor file.
    Validate {
        descriptor: PathBuf,
    },
    /// List known routes and their validity.
    Routes,
    /// Compose a page and print its HTML.
    Compose {
        page: String,
        /// Only render components whose `props.group` matches.
        #[arg(long)]
        group: Option<String>,
    },
    /// List themes with their variations.
    Themes,
    /// Assign a theme (or variation) to a page and save the store.
    Apply {
        page: String,
        theme: String,
        /// Treat `theme` as a variation id.
        #[arg(long, default_value_t = false)]
        variation: bool,
    },
    /// Drop a page's theme assignment and save the store.
    Reset {
        page: String,
    },
    /// Print the stylesheet applied for a page.
    Css {
        page: String,
    },
    /// Apply the pages' themes and keep refreshing them every `--refresh-secs` until interrupted.
    Watch {
        #[arg(required = true)]
        pages: Vec<String>,
        /// Stop after this many seconds instead of waiting for Ctrl-C.
        #[arg(long)]
        for_secs: Option<u64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pagesmith=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = RuntimeConfig {
        pages_dir: cli.pages_dir,
        theme_store: cli.theme_store,
        auto_refresh: cli.refresh_secs.map(Duration::from_secs),
        ..RuntimeConfig::default()
    };
    match cli.cmd {
        Command::Validate { descriptor } => cmd_validate(&descriptor).await,
        Command::Routes => cmd_routes(&config).await,
        Command::Compose { page, group } => cmd_compose(&config, &page, group).await,
        Command::Themes => cmd_themes(&config).await,
        Command::Apply {
            page,
            theme,
            variation,
        } => cmd_apply(&config, &page, &theme, variation).await,
        Command::Reset { page } => cmd_reset(&config, &page).await,
        Command::Css { page } => cmd_css(&config, &page).await,
        Command::Watch { pages, for_secs } => cmd_watch(&config, &pages, for_secs).await,
    }
}

type Runtime = PageRuntime<MemoryThemeStore, pagesmith::DocumentTarget>;

async fn start(config: &RuntimeConfig) -> anyhow::Result<Runtime> {
    pagesmith::bootstrap(config)
        .await
        .context("start pagesmith runtime")
}

async fn save_store(config: &RuntimeConfig, rt: &Runtime) -> anyhow::Result<()> {
    let path = config
        .theme_store
        .as_deref()
        .context("theme store path is not set")?;
    rt.themes()
        .store()
        .save(path)
        .await
        .with_context(|| format!("save theme store '{}'", path.display()))
}

async fn cmd_validate(path: &Path) -> anyhow::Result<()> {
    let parser = DescriptorParser::new();
    let desc = parser
        .parse(path)
        .await
        .with_context(|| format!("parse descriptor '{}'", path.display()))?;
    let report = parser.validate(&desc);
    if report.is_valid() {
        println!("{}: ok", path.display());
        return Ok(());
    }
    for issue in &report.errors {
        println!("{}: {issue}", path.display());
    }
    anyhow::bail!("{} violation(s)", report.errors.len())
}

async fn cmd_routes(config: &RuntimeConfig) -> anyhow::Result<()> {
    let rt = start(config).await?;
    for route in rt.routes().get_all_routes() {
        println!(
            "{}\t{}\t{}\t{}",
            route.id,
            route.metadata.path,
            if route.is_valid() { "ok" } else { "disabled" },
            route.metadata.title
        );
    }
    Ok(())
}

async fn cmd_compose(
    config: &RuntimeConfig,
    page: &str,
    group: Option<String>,
) -> anyhow::Result<()> {
    let mut rt = start(config).await?;
    let filter = group.map(SubsetFilter::Group).unwrap_or_default();
    match rt.compose(page, filter).await {
        Ok(ComposeOutcome::Composed(tree)) => {
            print!("{}", tree.to_html());
            Ok(())
        }
        Ok(ComposeOutcome::NotFound { page_id, reason }) => {
            anyhow::bail!("page '{page_id}' not found ({reason:?})")
        }
        Err(e @ (PagesmithError::Parse(_) | PagesmithError::Validation(_))) => {
            Err(anyhow::Error::new(e).context(format!("page '{page}' is disabled")))
        }
        Err(e) => Err(e).context("compose page"),
    }
}

async fn cmd_themes(config: &RuntimeConfig) -> anyhow::Result<()> {
    let rt = start(config).await?;
    let themes = rt
        .themes()
        .get_all_themes(&ThemeFilter::all())
        .await
        .context("list themes")?;
    for listing in themes {
        let t = &listing.theme;
        println!(
            "{}\t{}\t{}{}",
            t.id,
            t.name,
            t.category.as_str(),
            if t.is_default { "\tdefault" } else { "" }
        );
        for v in &listing.variations {
            println!("  {}\t{}", v.id, v.name);
        }
    }
    Ok(())
}

async fn cmd_apply(
    config: &RuntimeConfig,
    page: &str,
    theme: &str,
    variation: bool,
) -> anyhow::Result<()> {
    let mut rt = start(config).await?;
    let applied = rt
        .apply_theme(page, theme, variation)
        .await
        .with_context(|| format!("apply '{theme}' to '{page}'"))?;
    save_store(config, &rt).await?;
    println!("{page}: {} ({} properties)", applied.name, applied.css_properties.len());
    Ok(())
}

async fn cmd_reset(config: &RuntimeConfig, page: &str) -> anyhow::Result<()> {
    let mut rt = start(config).await?;
    let theme = rt
        .reset_theme(page)
        .await
        .with_context(|| format!("reset '{page}'"))?;
    save_store(config, &rt).await?;
    println!("{page}: {}", theme.name);
    Ok(())
}

async fn cmd_css(config: &RuntimeConfig, page: &str) -> anyhow::Result<()> {
    let mut rt = start(config).await?;
    rt.page_theme(page)
        .await
        .with_context(|| format!("resolve theme of '{page}'"))?;
    print!("{}", rt.styles().target().stylesheet());
    Ok(())
}

async fn cmd_watch(
    config: &RuntimeConfig,
    pages: &[String],
    for_secs: Option<u64>,
) -> anyhow::Result<()> {
    let mut rt = start(config).await?;
    for page in pages {
        rt.page_theme(page)
            .await
            .with_context(|| format!("resolve theme of '{page}'"))?;
    }

    let interval = config.refresh_interval();
    let (tx, rx) = oneshot::channel();
    let stop = async move {
        let deadline = async {
            match for_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = deadline => {}
            _ = tokio::signal::ctrl_c() => {}
        }
        let _ = tx.send(());
    };
    tracing::info!(
        interval_secs = interval.as_secs(),
        pages = pages.len(),
        "watching page themes"
    );
    let (stats, ()) = tokio::join!(rt.run_auto_refresh(interval, rx), stop);
    tracing::info!(ticks = stats.ticks, failures = stats.failures, "watch stopped");
    print!("{}", rt.styles().target().stylesheet());
    Ok(())
}
