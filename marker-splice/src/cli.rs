//! Defines the command-line interfaces for the executables.

use clap::{Args, Parser, Subcommand};
use marker_splice_lib::{DEFAULT_SPLICE_MARKER, DEFAULT_SPLICE_TRAILER, DEFAULT_TRUNCATE_MARKER};
use std::path::PathBuf;

/// Chart template that receives the spliced `versions:` block.
pub const DEFAULT_TEMPLATE_PATH: &str = "deploy/charts/rig-operator/templates/crd.yaml";

/// Generated CRD whose `versions:` block is spliced into the template.
pub const DEFAULT_FRAGMENT_PATH: &str = "deploy/kustomize/crd/bases/rig.dev_capsules.yaml";

#[derive(Parser, Debug)]
#[command(
    name = "marker-splice",
    version,
    about = "Splice and truncate text files at literal marker strings."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Join the head of a template with the tail of a fragment at a shared marker.
    Splice(SpliceArgs),
    /// Cut a file at a marker, leaving it untouched when the marker is absent.
    #[command(alias = "cut")]
    Truncate(TruncateArgs),
    /// Apply a sequence of splice and truncate operations all-or-nothing.
    Apply(ApplyArgs),
}

/// Entry point of the `splice-template` executable.
#[derive(Parser, Debug)]
#[command(
    name = "splice-template",
    version,
    about = "Refresh the versions block of a chart template from a generated CRD."
)]
pub struct SpliceTemplateCli {
    #[command(flatten)]
    pub args: SpliceArgs,
}

/// Entry point of the `truncate-section` executable.
#[derive(Parser, Debug)]
#[command(
    name = "truncate-section",
    version,
    about = "Drop everything from the '## Config' heading onward, if present."
)]
pub struct TruncateSectionCli {
    #[command(flatten)]
    pub args: TruncateArgs,
}

/// Arguments for the `splice` command.
#[derive(Args, Debug)]
pub struct SpliceArgs {
    /// The file supplying the head of the result. It is overwritten unless --output is given.
    #[arg(long, value_name = "TEMPLATE_PATH", default_value = DEFAULT_TEMPLATE_PATH)]
    pub template: PathBuf,

    /// The file supplying the tail of the result.
    #[arg(long, value_name = "FRAGMENT_PATH", default_value = DEFAULT_FRAGMENT_PATH)]
    pub fragment: PathBuf,

    /// Literal marker shared by both files. [default: "\n  versions:\n"]
    #[arg(
        long,
        value_name = "TEXT",
        default_value = DEFAULT_SPLICE_MARKER,
        hide_default_value = true,
        allow_hyphen_values = true
    )]
    pub marker: String,

    /// Text appended after the spliced tail. [default: "{{- end }}\n"]
    #[arg(
        long,
        value_name = "TEXT",
        default_value = DEFAULT_SPLICE_TRAILER,
        hide_default_value = true,
        allow_hyphen_values = true
    )]
    pub trailer: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `truncate` command.
#[derive(Args, Debug)]
pub struct TruncateArgs {
    /// The file to cut. A missing or unreadable file is silently left alone.
    #[arg(value_name = "FILE_PATH")]
    pub file: PathBuf,

    /// Literal marker; it and everything after it are removed.
    #[arg(
        long,
        value_name = "TEXT",
        default_value = DEFAULT_TRUNCATE_MARKER,
        allow_hyphen_values = true
    )]
    pub marker: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the `apply` command.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to a JSON or YAML file containing the operations. Use '-' for stdin.
    #[arg(short = 'O', long, value_name = "PATH", conflicts_with = "operations")]
    pub operations_file: Option<PathBuf>,

    /// JSON string describing the operations inline.
    #[arg(long, value_name = "JSON_STRING", conflicts_with = "operations_file")]
    pub operations: Option<String>,

    /// Preview the result without writing any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Show a diff of the pending changes instead of writing files.
    #[arg(long)]
    pub diff: bool,
}

/// Output options shared by `splice` and `truncate`.
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Write the output to a new file instead of modifying the original.
    #[arg(short, long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Print the result to stdout without writing any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Show a diff of the pending change instead of writing files.
    #[arg(long)]
    pub diff: bool,
}
