use crate::render::HistogramArtifact;
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};

pub fn format_table(artifact: &HistogramArtifact, show_summary: bool) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    table.set_titles(Row::new(vec![
        Cell::new("Bin").style_spec("bFc"),
        Cell::new(&format!("{} range", artifact.attribute)).style_spec("bFc"),
        Cell::new("Count").style_spec("bFc"),
        Cell::new("").style_spec("bFc"),
    ]));

    let max_count = artifact.histogram.max_count();
    for (i, bin) in artifact.histogram.bins.iter().enumerate() {
        table.add_row(Row::new(vec![
            Cell::new(&(i + 1).to_string()),
            Cell::new(&format_range(bin.lower, bin.upper)),
            Cell::new(&format_number(bin.count)),
            Cell::new(&bar(bin.count, max_count, 30)).style_spec("Fc"),
        ]));
    }

    if show_summary {
        table.add_empty_row();
        table.add_row(Row::new(vec![
            Cell::new("TOTAL").style_spec("bFy"),
            Cell::new("").style_spec("bFy"),
            Cell::new(&format_number(artifact.histogram.samples)).style_spec("bFy"),
            Cell::new("").style_spec("bFy"),
        ]));
    }

    table.to_string()
}

pub fn format_csv(artifact: &HistogramArtifact) -> String {
    let mut csv = String::new();
    csv.push_str("Lower,Upper,Count\n");

    for bin in &artifact.histogram.bins {
        csv.push_str(&format!("{},{},{}\n", bin.lower, bin.upper, bin.count));
    }

    csv
}

pub fn format_json(artifact: &HistogramArtifact) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(artifact)
}

pub fn format_markdown(artifact: &HistogramArtifact, show_summary: bool) -> String {
    let mut md = String::new();

    md.push_str(&format!("| Bin | {} range | Count |\n", artifact.attribute));
    md.push_str("|-----|-------|-------|\n");

    for (i, bin) in artifact.histogram.bins.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            i + 1,
            format_range(bin.lower, bin.upper),
            format_number(bin.count)
        ));
    }

    if show_summary {
        md.push_str(&format!(
            "| **TOTAL** | | **{}** |\n",
            format_number(artifact.histogram.samples)
        ));
    }

    md
}

pub fn format_range(lower: f64, upper: f64) -> String {
    format!("{:.2} – {:.2}", lower, upper)
}

pub fn format_number(num: u64) -> String {
    let num_str = num.to_string();
    let mut result = String::new();
    let mut count = 0;

    for ch in num_str.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

fn bar(count: u64, max_count: u64, width: usize) -> String {
    if max_count == 0 {
        return String::new();
    }
    let len = ((count as f64 / max_count as f64) * width as f64).round() as usize;
    "█".repeat(len)
}

pub fn print_summary(artifact: &HistogramArtifact) {
    let hist = &artifact.histogram;
    println!("\n{}", "=== Distribution Summary ===".bright_cyan().bold());

    println!("\n{}", "Overall Statistics:".yellow());
    println!("  Attribute: {}", artifact.attribute.to_string().bright_blue());
    println!("  Rows: {}", format_number(artifact.rows as u64).green());
    println!("  Samples: {}", format_number(hist.samples).green());
    if artifact.missing > 0 {
        println!("  Missing/non-numeric: {}", format_number(artifact.missing as u64).red());
    }

    if let (Some(min), Some(max), Some(mean)) = (hist.min, hist.max, hist.mean) {
        println!("\n{}", "Range:".yellow());
        println!("  Min: {}", format!("{:.2}", min).cyan());
        println!("  Max: {}", format!("{:.2}", max).cyan());
        println!("  Mean: {}", format!("{:.2}", mean).cyan().bold());
    }
}
