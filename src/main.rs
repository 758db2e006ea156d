//! repo-pages - history, diff and blame pages for a git repository
//!
//! # Usage
//! ```bash
//! repo-pages /path/to/repository serve          # Start server
//! repo-pages /path/to/repository serve --open   # Start and open browser
//! repo-pages . log --rev main --limit 20        # One page of history to stdout
//! repo-pages . diff --from v1.0 --to main --view stat
//! repo-pages . blame src/lib.rs
//! repo-pages . search parser --kind pickaxe
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repo_pages::git::{DiffView, SearchKind, WalkOrder};
use repo_pages::render::WriteSink;
use repo_pages::routes::{self, AppState};
use repo_pages::{EngineConfig, LogRequest, RequestContext};

/// repo-pages - Browse a git repository's history as HTML pages
#[derive(Parser)]
#[command(name = "repo-pages")]
#[command(about = "History, diff and blame pages for a git repository", long_about = None)]
struct Cli {
    /// Path to the git repository
    #[arg(value_name = "REPO_PATH", default_value = ".")]
    repo_path: PathBuf,

    #[command(flatten)]
    config: EngineConfig,

    /// Print view models as JSON instead of HTML (one-shot commands only)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the pages over HTTP
    Serve {
        /// Port to run the server on
        #[arg(short, long, default_value = "3001")]
        port: u16,

        /// Open browser automatically after starting
        #[arg(short, long)]
        open: bool,
    },
    /// One page of history
    Log {
        #[arg(long)]
        rev: Option<String>,
        #[arg(long)]
        path: Option<String>,
        #[arg(long, value_enum, default_value_t = WalkOrder::Time)]
        order: WalkOrder,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Diff between two revisions (`from` defaults to the first parent of `to`)
    Diff {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        path: Option<String>,
        #[arg(long, value_enum, default_value_t = DiffView::Unified)]
        view: DiffView,
    },
    /// Per-line attribution of a file
    Blame {
        path: String,
        #[arg(long)]
        rev: Option<String>,
    },
    /// Search commit messages, people or content changes
    Search {
        query: String,
        #[arg(long, value_enum, default_value_t = SearchKind::Message)]
        kind: SearchKind,
        #[arg(long)]
        rev: Option<String>,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// One-shot command as JSON view models.
fn print_models(ctx: &RequestContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve { .. } => anyhow::bail!("serve has no JSON output"),
        Commands::Log { rev, path, order, offset, limit } => {
            let start = ctx.repo.resolve_rev(rev.as_deref())?;
            let limit = ctx.config.clamp_limit(limit);
            print_json(&ctx.repo.walk(start, order, path.as_deref(), offset, limit)?)
        }
        Commands::Diff { from, to, path, view } => {
            let diff = ctx
                .repo
                .diff_revisions(from.as_deref(), to.as_deref(), path.as_deref(), ctx.config.context_lines)?
                .materialize(view)?;
            print_json(&diff)
        }
        Commands::Blame { path, rev } => print_json(&ctx.repo.blame_revision(&path, rev.as_deref())?),
        Commands::Search { query, kind, rev } => {
            let start = ctx.repo.resolve_rev(rev.as_deref())?;
            print_json(&ctx.repo.search(start, kind, &query, ctx.config.max_results)?)
        }
    }
}

/// One-shot command as HTML fragments on stdout.
fn print_page(ctx: &RequestContext, command: Commands) -> anyhow::Result<()> {
    let mut sink = WriteSink::new(io::stdout().lock());

    match command {
        Commands::Serve { .. } => anyhow::bail!("serve is not a one-shot command"),
        Commands::Log { rev, path, order, offset, limit } => {
            let req = LogRequest {
                rev: rev.as_deref(),
                path: path.as_deref(),
                order,
                offset,
                limit,
            };
            ctx.log_page(&mut sink, &req)?;
        }
        Commands::Diff { from, to, path, view } => {
            ctx.diff_page(&mut sink, from.as_deref(), to.as_deref(), path.as_deref(), view)?;
        }
        Commands::Blame { path, rev } => ctx.blame_page(&mut sink, &path, rev.as_deref())?,
        Commands::Search { query, kind, rev } => {
            ctx.search_page(&mut sink, rev.as_deref(), kind, &query)?;
        }
    }

    sink.into_inner().flush()?;
    Ok(())
}

async fn serve(repo_path: PathBuf, config: EngineConfig, port: u16, open: bool) -> anyhow::Result<()> {
    // Fail early if the path is not a repository; requests reopen it on their own
    if let Err(e) = RequestContext::open(&repo_path, config.clone()) {
        eprintln!("✗ Failed to open repository: {}", e);
        eprintln!("  Path: {}", repo_path.display());
        std::process::exit(1);
    }

    let canonical_path = std::fs::canonicalize(&repo_path).unwrap_or_else(|_| repo_path.clone());

    let state = Arc::new(AppState {
        repo_path: canonical_path.clone(),
        config,
    });

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to port {}: {}", port, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    let url = format!("http://127.0.0.1:{}", port);
    println!();
    println!("  ┌─────────────────────────────────────────────┐");
    println!("  │                 repo-pages                  │");
    println!("  └─────────────────────────────────────────────┘");
    println!();
    println!("  Repository: {}", canonical_path.display());
    println!("  Server:     {}", url);
    println!();
    println!("  Pages: /log /commit /diff /blame /search /refs");
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    if open {
        if let Err(e) = open::that(format!("{}/log", url)) {
            eprintln!("  Warning: Could not open browser: {}", e);
        }
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match cli.command {
        Commands::Serve { port, open } => serve(cli.repo_path, cli.config, port, open).await,
        command => {
            let ctx = match RequestContext::open(&cli.repo_path, cli.config) {
                Ok(ctx) => ctx,
                Err(e) => {
                    eprintln!("✗ {}", e);
                    std::process::exit(1);
                }
            };
            let json = cli.json;
            tokio::task::spawn_blocking(move || {
                if json {
                    print_models(&ctx, command)
                } else {
                    print_page(&ctx, command)
                }
            })
            .await?
        }
    }
}
