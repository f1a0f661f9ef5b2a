// Golden-master runner for the scenario catalog.
// Usage: golden run --compiler <program> [--testdata <dir>] [--filter <substring>]
//        GENERATE_GOLDEN_YAML=True golden run ...   (regenerate goldens)

use pipeline_golden::cli;
use pipeline_golden::golden::GoldenMode;

fn main() {
    // The mode is decided here, once, and threaded through explicitly.
    let mode = GoldenMode::from_env();
    std::process::exit(cli::run(mode));
}
