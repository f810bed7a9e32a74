//! Progress bars and summaries for the deploy CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{ActivationReport, CacheEvents, InstallReport, format_bytes, format_duration};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Creates a progress bar spanning the manifest precache.
pub fn make_install_bar(asset_count: u64) -> ProgressBar {
    let bar = ProgressBar::new(asset_count);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} assets - {msg}",
        )
        .expect("progress template is valid")
        .progress_chars("━━╌"),
    );
    bar
}

/// Cache lifecycle observer that drives the install progress bar.
pub struct ProgressEvents {
    bar: ProgressBar,
}

impl ProgressEvents {
    pub fn new(asset_count: usize) -> Self {
        Self {
            bar: make_install_bar(asset_count as u64),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl CacheEvents for ProgressEvents {
    fn on_asset_cached(&self, url: &str, bytes: u64) {
        self.bar.inc(1);
        self.bar.set_message(format!("{url} ({})", format_bytes(bytes)));
    }

    fn on_asset_failed(&self, url: &str, error: &str) {
        let _ = self
            .bar
            .println(format!("  {} {url}: {error}", style("✗").red()));
        self.bar.inc(1);
    }
}

/// Prints a summary of a completed warm install.
pub fn print_install_summary(report: &InstallReport) {
    println!("\n{SEPARATOR}");
    println!("Warm Install Summary");
    println!("{SEPARATOR}");
    println!("  Cache version:   {}", report.version);
    println!("  Assets cached:   {}", report.assets_cached);
    println!("  Total size:      {}", format_bytes(report.bytes_cached));
    println!("  Total time:      {}", format_duration(report.elapsed));
    println!("{SEPARATOR}");
}

/// Prints the eviction outcome of an activation pass.
pub fn print_activation_summary(report: &ActivationReport) {
    for key in &report.evicted {
        println!("  {} evicted stale bucket {key}", style("✓").green());
    }
    for key in &report.failed {
        println!(
            "  {} could not evict {key} (retried on next deploy)",
            style("!").yellow()
        );
    }
    println!("  Active cache version: {}", report.version);
}
