//! HTML results page.
//!
//! Produces a self-contained HTML file with the CSS inlined.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::path::Path;

use wordquiz_core::session::QuizSummary;

use crate::csv::CSV_HEADER;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate a results page for a finished quiz.
pub fn generate_html(summary: &QuizSummary, created_at: NaiveDateTime) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>英単語クイズ｜結果</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>英単語クイズ</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">難易度：{}｜出題形式：{}｜{}</p>\n",
        summary.difficulty.label_ja(),
        summary.direction.label_ja(),
        created_at.format("%Y-%m-%d %H:%M")
    ));
    html.push_str("</header>\n");

    // Score
    let pct = if summary.total > 0 {
        summary.score as f64 / summary.total as f64 * 100.0
    } else {
        0.0
    };
    html.push_str(&format!(
        "<section class=\"score\"><h2>あなたのスコア: {} / {}</h2>\n\
         <div class=\"bar\"><div class=\"fill\" style=\"width:{pct:.0}%\"></div></div>\n\
         </section>\n",
        summary.score, summary.total
    ));

    // Answer table, numbered from 1
    html.push_str("<table class=\"answers\">\n<thead><tr><th>#</th>");
    for column in CSV_HEADER {
        html.push_str(&format!("<th>{column}</th>"));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for (i, record) in summary.answers.iter().enumerate() {
        let class = if record.is_correct { "ok" } else { "ng" };
        html.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            i + 1,
            html_escape(&record.prompt_label),
            html_escape(&record.correct),
            html_escape(&record.user_answer),
            record.result_label(),
        ));
    }
    html.push_str("</tbody>\n</table>\n");

    html.push_str("</body>\n</html>\n");
    html
}

/// Write the results page to a file.
pub fn write_html_report(
    summary: &QuizSummary,
    path: &Path,
    created_at: NaiveDateTime,
) -> Result<()> {
    let html = generate_html(summary, created_at);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
body { font-family: -apple-system, "Hiragino Sans", "Noto Sans JP", sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #222; }
header h1 { margin-bottom: 0.2rem; }
.meta { color: #666; }
.score h2 { margin: 1.5rem 0 0.5rem; }
.bar { background: #eee; border-radius: 4px; height: 10px; overflow: hidden; }
.fill { background: #2e9d5b; height: 100%; }
table.answers { width: 100%; border-collapse: collapse; margin-top: 1.5rem; }
table.answers th, table.answers td { border-bottom: 1px solid #ddd; padding: 0.5rem; text-align: left; }
tr.ok td:last-child { color: #2e9d5b; }
tr.ng td:last-child { color: #c0392b; }
"#;
