//! cypher - run notebook-style Cypher cells against Neo4j.

use anyhow::{Context, Result};
use std::io::{IsTerminal, Read};
use std::sync::Arc;
use tracing::{error, info, warn};

use cypher_cells::cli::Cli;
use cypher_cells::config::Config;
use cypher_cells::connection::ConnectionManager;
use cypher_cells::db::{Connector, HttpConnector, MockConnector, MockGraphClient};
use cypher_cells::logging;
use cypher_cells::notebook::{split_cells, Notebook};
use cypher_cells::render::{self, Display, OutputFormat};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    match cli.log_path() {
        Some(path) => logging::init_file_logging(&path),
        None => logging::init_stderr_logging(),
    }

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Runs every cell; returns false if any cell displayed an error.
async fn run(cli: Cli) -> Result<bool> {
    let format = cli.parse_output_format().map_err(anyhow::Error::msg)?;
    if cli.has_no_input() {
        anyhow::bail!(
            "Nothing to run. Pass a SCRIPT (or - for stdin) or cells with -e. \
             Use --help for usage information."
        );
    }

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let default_connection = cli.resolve_connection(&config)?;

    let mut settings = config.magic.clone();
    if cli.write {
        settings.allow_write = true;
    }
    if cli.no_preflight {
        settings.preflight = false;
    }

    let connector: Arc<dyn Connector> = if cli.mock_db {
        info!("Using mock database");
        Arc::new(MockConnector::new(MockGraphClient::new()))
    } else {
        Arc::new(HttpConnector::new(settings.timeout_secs))
    };
    let manager = ConnectionManager::new(connector).with_default_config(default_connection);
    let mut notebook = Notebook::new(manager).with_settings(settings);

    let cells = collect_cells(&cli)?;
    info!("Running {} cell(s)", cells.len());

    let mut outputs = Vec::with_capacity(cells.len());
    for cell in &cells {
        outputs.push(notebook.run_cell(cell).await);
    }

    if let Err(e) = notebook.close().await {
        warn!("Failed to close connection: {}", e);
    }

    let ok = !outputs.iter().flatten().any(Display::is_error);
    let rendered = render_outputs(&outputs, format, &cli)?;

    match &cli.output_file {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write output file {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(ok)
}

/// Cells from the script, followed by `-e` cells.
fn collect_cells(cli: &Cli) -> Result<Vec<String>> {
    let mut cells = Vec::new();

    if let Some(script) = &cli.script {
        let content = if script == "-" {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        } else {
            std::fs::read_to_string(script)
                .with_context(|| format!("Failed to read script file {script}"))?
        };
        cells.extend(split_cells(&content));
    }

    cells.extend(cli.cells.iter().cloned());
    Ok(cells)
}

fn render_outputs(outputs: &[Vec<Display>], format: OutputFormat, cli: &Cli) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let color = cli.output_file.is_none() && std::io::stdout().is_terminal();
            let mut rendered = Vec::with_capacity(outputs.len());
            for displays in outputs.iter().filter(|d| !d.is_empty()) {
                rendered.push(render::render(displays, format, color)?);
            }
            Ok(rendered.join("\n"))
        }
        OutputFormat::Html | OutputFormat::Json => {
            let all: Vec<Display> = outputs.iter().flatten().cloned().collect();
            Ok(render::render(&all, format, false)?)
        }
    }
}
