//! sourcenav binary - resolve positions through source maps from the
//! terminal.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sourcenav_core::{ActiveDocument, EditorHost, Navigator};

mod host;

use host::TerminalHost;

#[derive(Parser, Debug)]
#[command(name = "sourcenav")]
#[command(about = "Navigate between generated files and their original sources")]
struct Args {
    /// File to navigate from: a generated file with a sourceMappingURL
    /// directive, or an original source of an already-resolved map
    file: PathBuf,

    /// 1-based cursor line in FILE
    #[arg(short, long)]
    line: u32,

    /// 1-based cursor column in FILE
    #[arg(short, long, default_value = "1")]
    column: u32,

    /// Context lines to print around the destination
    #[arg(long, default_value = "2")]
    context: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sourcenav_cli=warn,sourcenav_core=warn,sourcenav_map=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let file = args.file.canonicalize().map_err(|error| {
        anyhow::anyhow!("can't open {}: {}", args.file.display(), error)
    })?;
    let text = tokio::fs::read_to_string(&file).await?;

    info!(file = %file.display(), line = args.line, column = args.column, "navigating");

    let active = ActiveDocument {
        path: file,
        text,
        line: args.line.saturating_sub(1),
        column: args.column.saturating_sub(1),
    };
    let host = Arc::new(TerminalHost::new(active, args.context));
    let navigator = Navigator::new(Arc::clone(&host) as Arc<dyn EditorHost>);

    navigator.navigate().await?;
    Ok(())
}
