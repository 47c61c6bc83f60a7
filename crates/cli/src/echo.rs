use owo_colors::OwoColorize;
use pttcrawl_core::CrawlSummary;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "pttcrawl".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Crawl PTT boards into JSON files\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled value, indented under the current step
pub fn print_field(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print the crawl counters
pub fn print_summary(summary: &CrawlSummary, elapsed: std::time::Duration) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Crawl Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());

    if summary.pages > 0 {
        print_field("Pages", &format!("{} ({} skipped)", summary.pages, summary.pages_skipped));
    }
    print_field("Articles", &summary.articles.to_string());

    let failed = summary.failed.to_string();
    if summary.failed > 0 {
        eprintln!("  {} {}", "Failed:".dimmed(), failed.bright_red());
    } else {
        print_field("Failed", &failed);
    }

    if summary.entries_skipped + summary.links_skipped > 0 {
        print_field(
            "Skipped",
            &format!("{} entries, {} links", summary.entries_skipped, summary.links_skipped),
        );
    }
    eprintln!("  {} {:.2}s\n", "Elapsed:".dimmed(), elapsed.as_secs_f64());
}
