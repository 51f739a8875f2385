use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use arazzo_canvas::openapi;
use arazzo_canvas::prelude::*;

/// Inspect, validate, and export workflows saved by an Arazzo canvas
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a stored workflow as Arazzo YAML
    Export {
        /// Directory the canvas records are stored in
        #[arg(long)]
        storage_dir: PathBuf,
        /// Source to export; defaults to the last selected one
        #[arg(long)]
        source: Option<String>,
        /// Write the YAML to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate a stored workflow, resolving steps against OpenAPI documents
    Validate {
        /// Directory the canvas records are stored in
        #[arg(long)]
        storage_dir: PathBuf,
        /// Source to validate; defaults to the last selected one
        #[arg(long)]
        source: Option<String>,
        /// OpenAPI documents (JSON or YAML) to resolve operationIds against
        #[arg(long = "document", value_name = "FILE")]
        documents: Vec<PathBuf>,
    },
    /// List the operations an OpenAPI document declares
    Operations {
        /// OpenAPI document (JSON or YAML)
        document: PathBuf,
        /// Only show operations whose id, path or summary matches this text
        #[arg(long)]
        filter: Option<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Export {
            storage_dir,
            source,
            out,
        } => run_export(&storage_dir, source.as_deref(), out),
        Command::Validate {
            storage_dir,
            source,
            documents,
        } => run_validate(&storage_dir, source.as_deref(), &documents),
        Command::Operations { document, filter } => run_operations(&document, filter.as_deref()),
    }
}

fn run_export(storage_dir: &Path, source: Option<&str>, out: Option<PathBuf>) {
    let mut store = open_store(storage_dir, source);
    let source_name = store.selected_source_id().unwrap_or_default().to_string();

    let yaml = store
        .export_to_yaml()
        .unwrap_or_else(|e| exit_with_error(&format!("Export failed: {}", e)));

    match out {
        Some(path) => {
            fs::write(&path, &yaml).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))
            });
            println!("Exported workflow for '{}' to {}", source_name, path.display());
        }
        None => print!("{}", yaml),
    }
}

fn run_validate(storage_dir: &Path, source: Option<&str>, documents: &[PathBuf]) {
    let mut store = open_store(storage_dir, source);
    let source_name = store.selected_source_id().unwrap_or_default().to_string();

    // Resolution only happens against documents given on the command line;
    // the CLI never fetches source URLs.
    for path in documents {
        let name = document_name(path);
        let text = fs::read_to_string(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read '{}': {}", path.display(), e))
        });
        let parsed = openapi::parse_text(&text, &name).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to parse '{}': {}", path.display(), e))
        });
        println!(
            "Loaded {} operation(s) from {}",
            parsed.operations.len(),
            path.display()
        );
        store.index_mut().insert_source(parsed);
    }

    let report = store.validate_workflow();
    if report.valid {
        println!(
            "Workflow for '{}' is valid ({} step(s))",
            source_name,
            store.main_workflow().steps.len()
        );
    } else {
        eprintln!(
            "Workflow for '{}' has {} problem(s):",
            source_name,
            report.errors.len()
        );
        for error in &report.errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(1);
    }
}

fn run_operations(document: &Path, filter: Option<&str>) {
    let name = document_name(document);
    let text = fs::read_to_string(document).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read '{}': {}", document.display(), e))
    });
    let parsed = openapi::parse_text(&text, &name).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to parse '{}': {}", document.display(), e))
    });

    let mut index = OperationIndex::new();
    index.insert_source(parsed);

    let query = filter.unwrap_or_default();
    let operations = index.matching_operations(query);
    if operations.is_empty() {
        if query.is_empty() {
            println!("No operations found in {}", document.display());
        } else {
            println!("No operations matching '{}'", query);
        }
        return;
    }

    println!("{} operation(s):", operations.len());
    for op in operations {
        match &op.summary {
            Some(summary) => {
                println!("  {:<7} {:<32} {}  ({})", op.method, op.path, op.operation_id, summary)
            }
            None => println!("  {:<7} {:<32} {}", op.method, op.path, op.operation_id),
        }
    }
}

/// Opens the stored session: backend, source list, selection, canvas.
fn open_store(storage_dir: &Path, source: Option<&str>) -> GraphStore {
    let backend = FileBackend::new(storage_dir).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to open storage at '{}': {}",
            storage_dir.display(),
            e
        ))
    });
    let mut store = GraphStore::new(backend);

    store.load_sources_from_storage();
    store.load_workflow_from_storage();

    if let Some(name) = source {
        let known = store
            .source_descriptions()
            .iter()
            .any(|candidate| candidate.name == name);
        if !known {
            exit_with_error(&format!(
                "Unknown source '{}'. Known sources: {}",
                name,
                known_sources(&store)
            ));
        }
        store.select_source(Some(name));
    }
    if store.selected_source_id().is_none() {
        exit_with_error(&format!(
            "No source selected. Pass --source. Known sources: {}",
            known_sources(&store)
        ));
    }
    store
}

fn known_sources(store: &GraphStore) -> String {
    let names: Vec<&str> = store
        .source_descriptions()
        .iter()
        .map(|source| source.name.as_str())
        .collect();
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

fn document_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document")
        .to_string()
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
