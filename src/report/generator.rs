//! Report generation.
//!
//! Renders a [`Report`] as Markdown, JSON, a standalone HTML page, or a
//! plain-text console summary.

use crate::analysis::empty_categories;
use crate::cli::OutputFormat;
use crate::models::{CategoryStat, OverallStat, Report, ReportMetadata, StatsReport};
use anyhow::Result;

/// Presentation options shared by all renderers.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Show underscores in category names as spaces.
    pub humanize_names: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            humanize_names: true,
        }
    }
}

impl RenderOptions {
    fn category_name(&self, stat: &CategoryStat) -> String {
        if self.humanize_names {
            stat.display_name()
        } else {
            stat.name.clone()
        }
    }
}

/// Render a report in the requested format.
pub fn render(report: &Report, format: OutputFormat, options: &RenderOptions) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(generate_markdown_report(report, options)),
        OutputFormat::Json => generate_json_report(report),
        OutputFormat::Html => Ok(generate_html_report(report, options)),
        OutputFormat::Text => Ok(generate_text_summary(report, options)),
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# Backlink Source Statistics\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_overall_section(&report.stats.overall));
    output.push_str(&generate_category_section(&report.stats, options));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Categories:** {}\n", metadata.category_count));
    if metadata.strict_ranges {
        section.push_str("- **Range checks:** enforced\n");
    }
    section.push('\n');

    section
}

fn generate_overall_section(overall: &OverallStat) -> String {
    let mut section = String::new();

    section.push_str("## Overall\n\n");
    section.push_str("| Total | Valid | Avg DA | Avg PA | Avg Spam |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        overall.total, overall.valid, overall.avg_da, overall.avg_pa, overall.avg_spam
    ));

    section
}

fn generate_category_section(stats: &StatsReport, options: &RenderOptions) -> String {
    let categories = &stats.categories;
    let mut section = String::new();

    section.push_str("## Websites by Category\n\n");

    if categories.is_empty() {
        section.push_str("The catalogue contains no categories.\n\n");
        return section;
    }

    section.push_str("| Category | Valid / Total | Avg DA | Avg PA | Avg Spam |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");

    for stat in categories {
        section.push_str(&format!(
            "| {} | {} / {} | {} | {} | {} |\n",
            escape_table_cell(&options.category_name(stat)),
            stat.valid,
            stat.total,
            stat.avg_da,
            stat.avg_pa,
            stat.avg_spam
        ));
    }
    section.push('\n');

    let hollow = empty_categories(stats);
    if !hollow.is_empty() {
        section.push_str("> **Note:** no valid sites in ");
        let names: Vec<_> = hollow.iter().map(|c| options.category_name(c)).collect();
        section.push_str(&names.join(", "));
        section.push_str(".\n\n");
    }

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by linkstats*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a standalone HTML page.
pub fn generate_html_report(report: &Report, options: &RenderOptions) -> String {
    let overall = &report.stats.overall;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>Website Count Check</title>\n");
    html.push_str(
        "<style>\n\
         body { font-family: sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }\n\
         table { width: 100%; border-collapse: collapse; margin-top: 10px; }\n\
         th, td { text-align: left; padding: 8px; border: 1px solid #ddd; }\n\
         thead tr { background-color: #f2f2f2; }\n\
         </style>\n",
    );
    html.push_str("</head>\n<body>\n");

    html.push_str("<h1>Website Count Check</h1>\n");
    html.push_str(&format!(
        "<p>Total websites in {}: <strong>{}</strong></p>\n",
        escape_html(&report.metadata.source),
        overall.total
    ));
    html.push_str(&format!(
        "<p>Valid websites (with metrics): <strong>{}</strong></p>\n",
        overall.valid
    ));

    html.push_str("<h2>Overall Metrics</h2>\n<ul>\n");
    html.push_str(&format!(
        "<li>Average Domain Authority: <strong>{}</strong></li>\n",
        overall.avg_da
    ));
    html.push_str(&format!(
        "<li>Average Page Authority: <strong>{}</strong></li>\n",
        overall.avg_pa
    ));
    html.push_str(&format!(
        "<li>Average Spam Score: <strong>{}</strong></li>\n",
        overall.avg_spam
    ));
    html.push_str("</ul>\n");

    html.push_str("<h2>Websites by Category</h2>\n<table>\n<thead>\n<tr>");
    for heading in ["Category", "Count", "Avg DA", "Avg PA", "Avg Spam"] {
        html.push_str(&format!("<th>{}</th>", heading));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for stat in &report.stats.categories {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{} / {}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&options.category_name(stat)),
            stat.valid,
            stat.total,
            stat.avg_da,
            stat.avg_pa,
            stat.avg_spam
        ));
    }

    html.push_str("</tbody>\n</table>\n");
    html.push_str(&format!(
        "<p><small>Generated {}</small></p>\n",
        report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</body>\n</html>\n");

    html
}

/// Generate a plain-text summary for the console.
pub fn generate_text_summary(report: &Report, options: &RenderOptions) -> String {
    let stats = &report.stats;
    let overall = &stats.overall;
    let mut lines = Vec::new();

    lines.push(format!("Total websites found: {}", overall.total));
    lines.push(format!("Valid websites found: {}", overall.valid));
    lines.push(format!(
        "Average DA: {} | Average PA: {} | Average Spam: {}",
        overall.avg_da, overall.avg_pa, overall.avg_spam
    ));

    if !stats.categories.is_empty() {
        lines.push(String::new());
        lines.push("By Category:".to_string());

        let width = stats
            .categories
            .iter()
            .map(|c| options.category_name(c).len())
            .max()
            .unwrap_or(0);

        for stat in &stats.categories {
            lines.push(format!(
                "- {:<width$}  {:>5} / {:<5}  DA {:>3}  PA {:>3}  Spam {}",
                options.category_name(stat),
                stat.valid,
                stat.total,
                stat.avg_da,
                stat.avg_pa,
                stat.avg_spam,
                width = width
            ));
        }
    }

    let empty = empty_categories(stats);
    if !empty.is_empty() {
        lines.push(String::new());
        lines.push(format!("{} categories have no valid sites", empty.len()));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Keep `|` inside a Markdown table cell from starting a new column.
fn escape_table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
