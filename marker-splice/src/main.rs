//! The marker-splice command-line executable.

fn main() -> anyhow::Result<()> {
    marker_splice::app::run()
}
