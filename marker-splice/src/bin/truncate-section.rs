//! Truncates a file at its `## Config` heading, if it has one.

fn main() -> anyhow::Result<()> {
    marker_splice::app::run_truncate_section()
}
