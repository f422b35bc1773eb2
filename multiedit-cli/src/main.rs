use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

use multiedit::config::Config;
use multiedit::core::output::{OutputFormat, OutputWriter};

mod commands;

#[derive(Parser)]
#[command(name = "multiedit")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Apply ordered batches of edits to a single file",
    long_about = "Multi-edit applies literal, regex, insert or remove edits to one file in order. \
                  Each edit sees the result of the previous one, failed edits are reported \
                  without stopping the batch, and the file is written once at the end."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json); defaults to the configured format
    #[arg(short = 'f', long, global = true)]
    format: Option<OutputFormat>,

    /// Write a timestamped backup before modifying the file
    #[arg(short = 'b', long, global = true)]
    backup: bool,

    /// Show the result without writing the file
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSON edit request ({filePath, mode, edits, options}); '-' reads stdin
    Apply {
        /// Request file
        request: PathBuf,
    },

    /// Replace literal text, first occurrence per edit
    Replace {
        /// File to edit
        file: PathBuf,

        /// Text to search for (pairs with the --replace at the same position)
        #[arg(short = 's', long = "search", required = true)]
        searches: Vec<String>,

        /// Replacement text
        #[arg(short = 'r', long = "replace", required = true)]
        replacements: Vec<String>,
    },

    /// Replace regex matches ($1 / ${name} expand capture groups)
    Regex {
        /// File to edit
        file: PathBuf,

        /// Regex pattern (pairs with the --replacement at the same position)
        #[arg(short = 'e', long = "pattern", required = true)]
        patterns: Vec<String>,

        /// Replacement text
        #[arg(short = 'r', long = "replacement", required = true)]
        replacements: Vec<String>,

        /// Replace only the first match of each pattern
        #[arg(long)]
        first_only: bool,

        /// Match case-insensitively
        #[arg(short = 'i', long)]
        ignore_case: bool,
    },

    /// Insert a line next to an anchor or at a line index
    #[command(group(
        ArgGroup::new("target")
            .required(true)
            .args(["after", "before", "at_line"])
    ))]
    Insert {
        /// File to edit
        file: PathBuf,

        /// Insert below the first line containing this text
        #[arg(long)]
        after: Option<String>,

        /// Insert above the first line containing this text
        #[arg(long)]
        before: Option<String>,

        /// Insert at this 0-based line (past the end appends)
        #[arg(long)]
        at_line: Option<usize>,

        /// Line to insert
        #[arg(short = 'c', long)]
        code: String,
    },

    /// Remove every line matching a predicate
    Remove {
        /// File to edit
        file: PathBuf,

        /// Remove lines containing this text
        #[arg(long)]
        contains: Vec<String>,

        /// Remove lines whose trimmed text starts with this
        #[arg(long)]
        starts_with: Vec<String>,

        /// Remove lines whose trimmed text ends with this
        #[arg(long)]
        ends_with: Vec<String>,

        /// Remove lines equal to this text
        #[arg(long)]
        exact: Vec<String>,

        /// Remove the line at this 0-based index
        #[arg(long = "line")]
        lines: Vec<usize>,
    },

    /// Create a file from a JSON list of {name, content, position} sections
    Assemble {
        /// File to create
        file: PathBuf,

        /// Sections file
        sections: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "multiedit=debug"
    } else {
        "multiedit=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let output = OutputWriter::new(
        cli.format.unwrap_or(config.output.format),
        config.output.show_diff,
    );
    let options = config.edit_options(cli.backup, cli.dry_run);

    // Execute command
    let outcome = match cli.command {
        Commands::Apply { request } => commands::apply::run(request, options, &output),
        Commands::Replace {
            file,
            searches,
            replacements,
        } => commands::replace::run(file, searches, replacements, options, &output),
        Commands::Regex {
            file,
            patterns,
            replacements,
            first_only,
            ignore_case,
        } => commands::regex::run(
            file,
            patterns,
            replacements,
            first_only,
            ignore_case,
            options,
            &output,
        ),
        Commands::Insert {
            file,
            after,
            before,
            at_line,
            code,
        } => commands::insert::run(file, after, before, at_line, code, options, &output),
        Commands::Remove {
            file,
            contains,
            starts_with,
            ends_with,
            exact,
            lines,
        } => commands::remove::run(
            file,
            commands::remove::RemoveArgs {
                contains,
                starts_with,
                ends_with,
                exact,
                lines,
            },
            options,
            &output,
        ),
        Commands::Assemble { file, sections } => commands::assemble::run(file, sections, &output),
    };

    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            output.write_error(&format!("{:#}", e))?;
            std::process::exit(1);
        }
    }
}
