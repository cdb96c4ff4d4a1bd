//! Splices the `versions:` block of a generated CRD into a chart template.

fn main() -> anyhow::Result<()> {
    marker_splice::app::run_splice_template()
}
