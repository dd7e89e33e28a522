//! CSV export of the answer log.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use wordquiz_core::model::AnswerRecord;

/// Column headers, in fixed order: prompt, correct answer, user answer, result.
pub const CSV_HEADER: [&str; 4] = ["出題", "正解", "あなたの回答", "結果"];

/// Quote a field if it contains a delimiter, a quote, or a line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row(out: &mut String, fields: &[&str]) {
    let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Render the answer log as CSV: a header row, then one row per answer in
/// the order the answers were given.
pub fn export_csv(answers: &[AnswerRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, &CSV_HEADER);
    for record in answers {
        push_row(
            &mut out,
            &[
                record.prompt_label.as_str(),
                record.correct.as_str(),
                record.user_answer.as_str(),
                record.result_label(),
            ],
        );
    }
    out
}

/// Suggested download name, e.g. `quiz_result_20250101_0930.csv`.
///
/// Minute resolution; names sort by creation time.
pub fn export_filename(now: NaiveDateTime) -> String {
    format!("quiz_result_{}.csv", now.format("%Y%m%d_%H%M"))
}

/// Write the CSV into `dir` and return the path written.
///
/// A second export within the same minute gets a numeric suffix instead of
/// overwriting the first.
pub fn write_csv_report(
    answers: &[AnswerRecord],
    dir: &Path,
    now: NaiveDateTime,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let name = export_filename(now);
    let mut path = dir.join(&name);
    let stem = name.trim_end_matches(".csv");
    let mut n = 2;
    while path.exists() {
        path = dir.join(format!("{stem}_{n}.csv"));
        n += 1;
    }

    std::fs::write(&path, export_csv(answers))
        .with_context(|| format!("failed to write results to {}", path.display()))?;
    Ok(path)
}
