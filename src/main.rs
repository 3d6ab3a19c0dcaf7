//! gflx CLI - Command-line tool for GFPAK archives.
//!
//! This is the main entry point for the gflx command-line application.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use walkdir::WalkDir;

use gflx::prelude::*;

/// gflx - GFPAK archive tool
#[derive(Parser)]
#[command(name = "gflx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(flatten)]
    dictionary: DictionaryArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Name recovery options
#[derive(Args)]
struct DictionaryArgs {
    /// Wordlist used instead of the bundled one (one path per line)
    #[arg(long, global = true)]
    wordlist: Option<PathBuf>,

    /// Archive title for templated names (defaults to the file name)
    #[arg(long, global = true)]
    title: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of a GFPAK archive
    List {
        /// Path to the GFPAK file
        #[arg(short, long, env = "INPUT_GFPAK")]
        input: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,

        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract files from a GFPAK archive
    Extract {
        /// Path to the GFPAK file
        #[arg(short, long, env = "INPUT_GFPAK")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Filter pattern (glob-style)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Build a GFPAK archive from a directory tree
    Pack {
        /// Directory to pack
        #[arg(short, long)]
        input: PathBuf,

        /// Output GFPAK file
        #[arg(short, long)]
        output: PathBuf,

        /// Compression codec (none, zlib, lz4)
        #[arg(long, default_value = "lz4")]
        codec: Codec,

        /// Compression level
        #[arg(long, default_value_t = 9)]
        level: u16,
    },

    /// Add or replace a file in a GFPAK archive
    Add {
        /// Path to the GFPAK file
        #[arg(short, long, env = "INPUT_GFPAK")]
        input: PathBuf,

        /// File to add
        #[arg(long)]
        file: PathBuf,

        /// Logical path inside the archive
        #[arg(long)]
        path: String,

        /// Output GFPAK file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression codec (none, zlib, lz4)
        #[arg(long, default_value = "lz4")]
        codec: Codec,

        /// Compression level
        #[arg(long, default_value_t = 9)]
        level: u16,
    },

    /// Delete a file from a GFPAK archive
    Delete {
        /// Path to the GFPAK file
        #[arg(short, long, env = "INPUT_GFPAK")]
        input: PathBuf,

        /// Logical path of the entry to delete
        #[arg(long)]
        path: String,

        /// Output GFPAK file (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the hashes GFPAK stores for a logical path
    Hash {
        /// Logical path, e.g. bin/field/env/env_main.bin
        text: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .init();

    match cli.command {
        Commands::List {
            input,
            filter,
            detailed,
            json,
        } => {
            cmd_list(&input, &cli.dictionary, filter.as_deref(), detailed, json)?;
        }
        Commands::Extract {
            input,
            output,
            filter,
        } => {
            cmd_extract(&input, &output, &cli.dictionary, filter.as_deref())?;
        }
        Commands::Pack {
            input,
            output,
            codec,
            level,
        } => {
            cmd_pack(&input, &output, AddOptions { codec, level })?;
        }
        Commands::Add {
            input,
            file,
            path,
            output,
            codec,
            level,
        } => {
            let output = output.as_deref().unwrap_or(&input);
            cmd_add(&input, &cli.dictionary, &file, &path, output, AddOptions { codec, level })?;
        }
        Commands::Delete {
            input,
            path,
            output,
        } => {
            let output = output.as_deref().unwrap_or(&input);
            cmd_delete(&input, &cli.dictionary, &path, output)?;
        }
        Commands::Hash { text } => {
            cmd_hash(&text);
        }
    }

    Ok(())
}

fn open_archive(path: &Path, args: &DictionaryArgs) -> Result<GfpakArchive> {
    let config = match &args.wordlist {
        Some(wordlist) => DictionaryConfig::with_wordlist(
            fs::read_to_string(wordlist).context("Failed to read wordlist")?,
        ),
        None => DictionaryConfig::bundled(),
    };

    let title = args.title.clone().unwrap_or_else(|| {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string()
    });
    let dictionary = FilenameDictionary::new(config.title(title));

    let start = Instant::now();
    let archive =
        GfpakArchive::open_with(path, &dictionary).context("Failed to open GFPAK archive")?;
    info!(
        entries = archive.entry_count(),
        elapsed = ?start.elapsed(),
        "opened {}",
        path.display()
    );

    Ok(archive)
}

fn cmd_list(
    path: &Path,
    dictionary: &DictionaryArgs,
    filter: Option<&str>,
    detailed: bool,
    json: bool,
) -> Result<()> {
    let archive = open_archive(path, dictionary)?;
    let filter = filter.map(Pattern::new).transpose().context("Invalid filter")?;

    let infos: Vec<_> = archive
        .infos()
        .filter(|info| filter.as_ref().map_or(true, |p| glob_match(p, &info.name)))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for info in &infos {
        if detailed {
            println!(
                "{:>10} {:>10} {:<4} {:016X} {}",
                info.compressed_size.unwrap_or(0),
                info.decompressed_size,
                info.codec,
                info.path_hash,
                info.name
            );
        } else {
            println!("{}", info.name);
        }
    }

    println!("\nTotal: {} entries", infos.len());

    Ok(())
}

fn cmd_extract(
    path: &Path,
    output: &Path,
    dictionary: &DictionaryArgs,
    filter: Option<&str>,
) -> Result<()> {
    println!("Opening GFPAK archive: {}", path.display());

    let mut archive = open_archive(path, dictionary)?;
    let filter = filter.map(Pattern::new).transpose().context("Invalid filter")?;

    // Collect matching indices
    let indices: Vec<usize> = archive
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, e)| filter.as_ref().map_or(true, |p| glob_match(p, e.name())))
        .map(|(i, _)| i)
        .collect();

    println!("Extracting {} entries...", indices.len());

    let pb = ProgressBar::new(indices.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    for &idx in &indices {
        let name = archive.entries()[idx].name().to_string();
        let relative = Path::new(&name);

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            warn!(name = %name, "skipping entry with unsafe path");
            pb.inc(1);
            continue;
        }

        let output_path = output.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = archive
            .read(idx)
            .with_context(|| format!("Failed to read {name}"))?;
        fs::write(&output_path, data)?;
        if let Some(entry) = archive.get_mut(idx) {
            entry.release();
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("Extraction completed in {:?}", start.elapsed());

    Ok(())
}

fn cmd_pack(input: &Path, output: &Path, options: AddOptions) -> Result<()> {
    println!("Packing: {} -> {}", input.display(), output.display());

    let files: Vec<PathBuf> = WalkDir::new(input)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();

    let name = output
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("archive.gfpak");
    let mut archive = GfpakArchive::new(name);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    for file in &files {
        let relative = file.strip_prefix(input).unwrap_or(file);
        let logical = relative
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect::<Vec<_>>()
            .join("/");

        let data = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
        archive.add_file_with(&logical, data, options);
        pb.inc(1);
    }

    pb.finish_with_message("Done");

    archive.save(output).context("Failed to write GFPAK archive")?;
    println!(
        "Packed {} files into {} folders",
        archive.entry_count(),
        archive.folders().len()
    );

    Ok(())
}

fn cmd_add(
    input: &Path,
    dictionary: &DictionaryArgs,
    file: &Path,
    logical: &str,
    output: &Path,
    options: AddOptions,
) -> Result<()> {
    let mut archive = open_archive(input, dictionary)?;
    let data = fs::read(file).context("Failed to read input file")?;

    let before = archive.entry_count();
    let position = archive.add_file_with(logical, data, options);
    let action = if archive.entry_count() > before {
        "Added"
    } else {
        "Replaced"
    };

    archive.save(output).context("Failed to write GFPAK archive")?;
    println!("{action} {logical} (entry #{position})");

    Ok(())
}

fn cmd_delete(input: &Path, dictionary: &DictionaryArgs, logical: &str, output: &Path) -> Result<()> {
    let mut archive = open_archive(input, dictionary)?;

    let position = archive
        .find_index(logical)
        .or_else(|| {
            archive.find_index_by_hash(PathHashes::from_logical_path(logical).full_path)
        })
        .with_context(|| format!("No entry named {logical}"))?;

    let removed = archive.delete_file(position)?;
    archive.save(output).context("Failed to write GFPAK archive")?;
    println!("Deleted {}", removed.name());

    Ok(())
}

fn cmd_hash(text: &str) {
    let hashes = PathHashes::from_logical_path(text);

    println!("FNV-64a:   {:016X}", fnv::hash_str(text));
    println!("Directory: {:016X}", hashes.directory);
    println!("File:      {:016X}", hashes.file);
    println!("Full path: {:016X}", hashes.full_path);
}

/// Case-insensitive glob match where `*` also crosses `/`.
fn glob_match(pattern: &Pattern, name: &str) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };
    pattern.matches_with(name, options)
}
