//! Treewalk - Command-line interface for the tree engine.
//!
//! A thin front end over the engine facade: count, delete, clean, copy,
//! and compare directory trees. Counters are printed as a human-readable
//! summary or as JSON with `--json`.

use clap::{Parser, Subcommand};
use engine::{ops, CopyOption, CounterKind, DeleteOption, PathCounters, WalkOptions};
use std::path::PathBuf;

/// Treewalk - count, delete, copy and compare directory trees
#[derive(Parser, Debug)]
#[command(name = "treewalk")]
#[command(version)]
#[command(about = "Count, delete, copy and compare directory trees")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print counters as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable diagnostic logging (filtered by RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    /// Use exact counters instead of fixed-width ones
    #[arg(long, global = true)]
    exact: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count files, directories, and bytes under a root
    Count {
        /// Root to walk
        root: PathBuf,

        /// Maximum directory levels below the root to visit
        #[arg(long, value_name = "DEPTH")]
        max_depth: Option<usize>,

        /// Follow symbolic links
        #[arg(long)]
        follow_links: bool,
    },

    /// Delete a file or directory tree
    Delete {
        /// File or directory to delete
        path: PathBuf,

        /// Bare name to shield from deletion (repeatable)
        #[arg(long, value_name = "NAME")]
        skip: Vec<String>,

        /// Clear read-only protection before deleting
        #[arg(long)]
        override_read_only: bool,
    },

    /// Delete the contents of a directory, keeping the directory
    Clean {
        /// Directory to empty
        path: PathBuf,

        /// Clear read-only protection before deleting
        #[arg(long)]
        override_read_only: bool,
    },

    /// Mirror-copy a directory tree
    Copy {
        /// Source directory
        src: PathBuf,

        /// Destination directory
        dst: PathBuf,

        /// Overwrite existing destination files
        #[arg(long)]
        replace_existing: bool,

        /// Preserve file modification times
        #[arg(long)]
        preserve_attributes: bool,

        /// Maximum directory levels below the root to visit
        #[arg(long, value_name = "DEPTH")]
        max_depth: Option<usize>,
    },

    /// Compare two directory trees
    Compare {
        /// Left tree
        left: PathBuf,

        /// Right tree
        right: PathBuf,

        /// Compare file bytes as well as tree shape
        #[arg(long)]
        content: bool,
    },
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        use tracing_subscriber::EnvFilter;
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let exit_code = match run_cli(&args) {
        Ok(code) => code,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            2
        }
    };

    std::process::exit(exit_code);
}

/// Main CLI logic - separated for testability. Returns the process exit
/// code: 0 for success, 1 for a compare mismatch.
fn run_cli(args: &Args) -> Result<i32, String> {
    let kind = if args.exact {
        CounterKind::Exact
    } else {
        CounterKind::Fixed
    };

    match &args.command {
        Command::Count {
            root,
            max_depth,
            follow_links,
        } => {
            let options = walk_options(*max_depth, *follow_links);
            let counters = ops::count(root, &options, kind)
                .map_err(|e| format!("Count failed: {}", e))?;
            print_counters(&counters, args.json)?;
            Ok(0)
        }

        Command::Delete {
            path,
            skip,
            override_read_only,
        } => {
            let skip: Vec<&str> = skip.iter().map(String::as_str).collect();
            let counters = ops::delete(path, &skip, &delete_options(*override_read_only), kind)
                .map_err(|e| format!("Delete failed: {}", e))?;
            print_counters(&counters, args.json)?;
            Ok(0)
        }

        Command::Clean {
            path,
            override_read_only,
        } => {
            let counters = ops::clean(path, &delete_options(*override_read_only), kind)
                .map_err(|e| format!("Clean failed: {}", e))?;
            print_counters(&counters, args.json)?;
            Ok(0)
        }

        Command::Copy {
            src,
            dst,
            replace_existing,
            preserve_attributes,
            max_depth,
        } => {
            let options = walk_options(*max_depth, false);
            let mut copy_options = Vec::new();
            if *replace_existing {
                copy_options.push(CopyOption::ReplaceExisting);
            }
            if *preserve_attributes {
                copy_options.push(CopyOption::CopyAttributes);
            }
            let counters = ops::copy_directory(src, dst, &options, &copy_options, kind)
                .map_err(|e| format!("Copy failed: {}", e))?;
            print_counters(&counters, args.json)?;
            Ok(0)
        }

        Command::Compare {
            left,
            right,
            content,
        } => {
            let options = WalkOptions::new();
            let equal = if *content {
                ops::content_equals(left, right, &options)
            } else {
                ops::shape_equals(left, right, &options)
            }
            .map_err(|e| format!("Compare failed: {}", e))?;

            if equal {
                println!("equal");
                Ok(0)
            } else {
                println!("different");
                Ok(1)
            }
        }
    }
}

fn walk_options(max_depth: Option<usize>, follow_links: bool) -> WalkOptions {
    let mut options = WalkOptions::new().follow_links(follow_links);
    if let Some(depth) = max_depth {
        options = options.max_depth(depth);
    }
    options
}

fn delete_options(override_read_only: bool) -> Vec<DeleteOption> {
    if override_read_only {
        vec![DeleteOption::OverrideReadOnly]
    } else {
        Vec::new()
    }
}

fn print_counters(counters: &PathCounters, json: bool) -> Result<(), String> {
    if json {
        let rendered = serde_json::to_string_pretty(&counters.snapshot())
            .map_err(|e| format!("Failed to encode counters: {}", e))?;
        println!("{}", rendered);
    } else {
        println!(
            "{} ({} total)",
            counters,
            format_bytes(counters.bytes.as_u64())
        );
    }
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}
