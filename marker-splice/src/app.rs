use crate::cli::{
    ApplyArgs, Cli, Command, OutputArgs, SpliceArgs, SpliceTemplateCli, TruncateArgs,
    TruncateSectionCli,
};
use anyhow::{anyhow, Context};
use clap::Parser;
use marker_splice_lib::error::SpliceError;
use marker_splice_lib::transaction::{
    apply, parse_operations, PendingWrite, SpliceOperation, TruncateOutcome,
};
use marker_splice_lib::{splice_files, truncate_file};
use similar::TextDiff;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, NamedTempFile};

/// Runs the `marker-splice` executable.
pub fn run() -> anyhow::Result<()> {
    env_logger::init();

    let Cli { command } = Cli::parse();

    match command {
        Command::Splice(args) => process_splice(args),
        Command::Truncate(args) => process_truncate(args),
        Command::Apply(args) => process_apply(args),
    }
}

/// Runs the `splice-template` executable.
pub fn run_splice_template() -> anyhow::Result<()> {
    env_logger::init();

    let SpliceTemplateCli { args } = SpliceTemplateCli::parse();
    process_splice(args)
}

/// Runs the `truncate-section` executable.
pub fn run_truncate_section() -> anyhow::Result<()> {
    env_logger::init();

    let TruncateSectionCli { args } = TruncateSectionCli::parse();
    process_truncate(args)
}

fn process_splice(args: SpliceArgs) -> anyhow::Result<()> {
    let SpliceArgs {
        template,
        fragment,
        marker,
        trailer,
        output,
    } = args;

    let operation = SpliceOperation {
        template,
        fragment,
        marker,
        trailer,
        output: output.output.clone(),
        comment: None,
    };

    let write = splice_files(&operation)
        .map_err(map_splice_error)
        .with_context(|| {
            format!(
                "Failed to splice {} into {}",
                operation.fragment.display(),
                operation.template.display()
            )
        })?;

    finalize_output(OutputMode::from(&output), vec![write])
}

fn process_truncate(args: TruncateArgs) -> anyhow::Result<()> {
    let TruncateArgs {
        file,
        marker,
        output,
    } = args;

    let (outcome, write) = truncate_file(&file, &marker).map_err(map_splice_error)?;

    let Some(mut write) = write else {
        log::info!("{}: nothing to truncate ({outcome:?})", file.display());
        return Ok(());
    };

    if let TruncateOutcome::Truncated { removed_bytes } = outcome {
        log::info!("{}: removing {removed_bytes} bytes", file.display());
    }

    if let Some(path) = output.output.as_ref() {
        write.path = path.clone();
    }

    finalize_output(OutputMode::from(&output), vec![write])
}

fn process_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let ApplyArgs {
        operations_file,
        operations,
        dry_run,
        diff,
    } = args;

    let operations_data = match (operations_file, operations) {
        (Some(path), None) => {
            if path.to_string_lossy() == "-" {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .with_context(|| "Failed to read operations from stdin")?;
                buf
            } else {
                fs::read_to_string(&path).with_context(|| {
                    format!("Failed to read operations file: {}", path.display())
                })?
            }
        }
        (None, Some(inline)) => inline,
        (Some(_), Some(_)) => unreachable!("clap enforces mutual exclusivity"),
        (None, None) => {
            return Err(anyhow!(
                "Either --operations-file or --operations must be provided."
            ));
        }
    };

    let operations = parse_operations(&operations_data).map_err(map_splice_error)?;
    log::debug!("applying {} operations", operations.len());

    let writes = apply(operations).map_err(map_splice_error)?;

    let mode = if diff {
        OutputMode::Diff
    } else if dry_run {
        OutputMode::DryRun
    } else {
        OutputMode::Write
    };

    finalize_output(mode, writes)
}

fn finalize_output(mode: OutputMode, writes: Vec<PendingWrite>) -> anyhow::Result<()> {
    if mode == OutputMode::Write {
        return persist_all(writes);
    }

    let labelled = writes.len() > 1;
    let mut stdout = io::stdout().lock();

    for write in writes {
        if mode == OutputMode::DryRun {
            if labelled {
                writeln!(stdout, "==> {} <==", write.path.display())?;
            }
            stdout.write_all(write.rendered.as_bytes())?;
        } else {
            let label = write.path.display().to_string();
            let diff_output =
                TextDiff::from_lines(write.original.as_str(), write.rendered.as_str())
                    .unified_diff()
                    .header(&label, &label)
                    .to_string();

            stdout.write_all(diff_output.as_bytes())?;
        }
    }

    Ok(())
}

/// A write whose content is ready but not yet visible at its destination.
enum PreparedWrite {
    /// Replaces an existing file with a temporary file carrying its permissions.
    Replace {
        temp_file: NamedTempFile,
        path: PathBuf,
    },
    /// Creates a new file with the default permissions of the process.
    Create { path: PathBuf, content: String },
}

/// Writes every pending change in two phases: all temporary files are
/// prepared first, and destinations are only touched once every one of them
/// succeeded. Writes that would not change an existing file are skipped.
fn persist_all(writes: Vec<PendingWrite>) -> anyhow::Result<()> {
    let mut prepared = Vec::with_capacity(writes.len());

    for write in writes {
        if write.is_unchanged() && write.path.exists() {
            log::info!("{} is already up to date", write.path.display());
            continue;
        }
        prepared.push(prepare_write(write)?);
    }

    for write in prepared {
        commit_write(write)?;
    }

    Ok(())
}

fn prepare_write(write: PendingWrite) -> anyhow::Result<PreparedWrite> {
    let PendingWrite { path, rendered, .. } = write;

    let parent_dir = path
        .parent()
        .ok_or_else(|| anyhow!("Could not determine parent directory of {}", path.display()))?;
    let parent_dir = if parent_dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent_dir
    };

    let Ok(metadata) = fs::metadata(&path) else {
        if !parent_dir.is_dir() {
            return Err(anyhow!(
                "Failed to write to output file: {} (directory {} does not exist)",
                path.display(),
                parent_dir.display()
            ));
        }
        return Ok(PreparedWrite::Create {
            path,
            content: rendered,
        });
    };

    let mut temp_file = TempFileBuilder::new()
        .prefix(".marker-splice-")
        .suffix(".tmp")
        .tempfile_in(parent_dir)
        .with_context(|| {
            format!(
                "Failed to create temporary file in {}",
                parent_dir.display()
            )
        })?;

    temp_file
        .write_all(rendered.as_bytes())
        .with_context(|| "Failed to write to temporary file")?;

    temp_file
        .as_file()
        .set_permissions(metadata.permissions())
        .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;

    Ok(PreparedWrite::Replace { temp_file, path })
}

fn commit_write(write: PreparedWrite) -> anyhow::Result<()> {
    match write {
        PreparedWrite::Replace { temp_file, path } => {
            temp_file
                .persist(&path)
                .with_context(|| format!("Failed to replace original file {}", path.display()))?;
            log::debug!("replaced {}", path.display());
        }
        PreparedWrite::Create { path, content } => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
            log::debug!("wrote {} bytes to {}", content.len(), path.display());
        }
    }

    Ok(())
}

fn map_splice_error(err: SpliceError) -> anyhow::Error {
    match err {
        SpliceError::Io(message) => anyhow!(message),
        other => anyhow!(other),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputMode {
    Write,
    DryRun,
    Diff,
}

impl From<&OutputArgs> for OutputMode {
    fn from(args: &OutputArgs) -> Self {
        if args.diff {
            OutputMode::Diff
        } else if args.dry_run {
            OutputMode::DryRun
        } else {
            OutputMode::Write
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn diff_takes_precedence_over_dry_run() {
        let args = OutputArgs {
            output: None,
            dry_run: true,
            diff: true,
        };
        assert_eq!(OutputMode::from(&args), OutputMode::Diff);
    }

    fn pending(path: &Path, original: &str, rendered: &str) -> PendingWrite {
        PendingWrite {
            path: path.to_path_buf(),
            original: original.to_string(),
            rendered: rendered.to_string(),
        }
    }

    #[test]
    fn persist_replaces_existing_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("crd.yaml");
        target.write_str("old\n").unwrap();

        persist_all(vec![pending(target.path(), "old\n", "new\n")]).unwrap();

        target.assert("new\n");
    }

    #[test]
    fn persist_creates_new_output_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("out.md");

        persist_all(vec![pending(target.path(), "", "content")]).unwrap();

        target.assert("content");
    }

    #[cfg(unix)]
    #[test]
    fn new_output_file_gets_default_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("out.yaml");
        let reference = temp.child("reference.yaml");

        persist_all(vec![pending(target.path(), "", "x")]).unwrap();
        fs::write(reference.path(), "x").unwrap();

        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(target.path()), mode(reference.path()));
    }

    #[cfg(unix)]
    #[test]
    fn replaced_file_keeps_its_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("crd.yaml");
        target.write_str("old\n").unwrap();
        fs::set_permissions(target.path(), fs::Permissions::from_mode(0o640)).unwrap();

        persist_all(vec![pending(target.path(), "old\n", "new\n")]).unwrap();

        let mode = fs::metadata(target.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        target.assert("new\n");
    }

    #[cfg(unix)]
    #[test]
    fn unchanged_file_is_not_rewritten() {
        use std::os::unix::fs::MetadataExt;

        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("crd.yaml");
        target.write_str("same\n").unwrap();
        let inode = fs::metadata(target.path()).unwrap().ino();

        persist_all(vec![pending(target.path(), "same\n", "same\n")]).unwrap();

        assert_eq!(fs::metadata(target.path()).unwrap().ino(), inode);
    }

    #[test]
    fn failed_preparation_leaves_every_destination_untouched() {
        let temp = assert_fs::TempDir::new().unwrap();
        let first = temp.child("README.md");
        first.write_str("Intro\n## Config\n").unwrap();
        let second = temp.child("missing-dir/out.yaml");

        let err = persist_all(vec![
            pending(first.path(), "Intro\n## Config\n", "Intro\n"),
            pending(second.path(), "", "spliced\n"),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("does not exist"));
        first.assert("Intro\n## Config\n");
        second.assert(predicates::path::missing());

        let leftovers = fs::read_dir(temp.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with(".marker-splice-")
            })
            .count();
        assert_eq!(leftovers, 0);
    }
}
