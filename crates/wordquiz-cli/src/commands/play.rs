//! The `wordquiz play` command: the interactive quiz shell.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use comfy_table::{Cell, Table};
use tracing::info;

use wordquiz_core::{
    Difficulty, Direction, GenerationError, Phase, Presenter, QuestionGenerator, QuizSession,
    QuizSummary, StartOutcome, TextGenerator,
};
use wordquiz_providers::config::load_config_from;
use wordquiz_providers::{create_provider, ProviderConfig, ProviderError};
use wordquiz_report::{write_csv_report, write_html_report};

/// Command-line options for `play`.
pub struct PlayOptions {
    pub difficulty: Option<Difficulty>,
    pub direction: Option<Direction>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub html: bool,
}

/// Reads answers from stdin and writes the quiz to stdout.
struct StdioPresenter {
    stdin: std::io::Stdin,
    stdout: std::io::Stdout,
}

impl StdioPresenter {
    fn new() -> Self {
        Self {
            stdin: std::io::stdin(),
            stdout: std::io::stdout(),
        }
    }
}

impl Presenter for StdioPresenter {
    fn show(&mut self, text: &str) -> Result<()> {
        writeln!(self.stdout, "{text}")?;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.stdout, "{prompt}")?;
        self.stdout.flush()?;

        let mut line = String::new();
        if self.stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

pub async fn execute(opts: PlayOptions) -> Result<()> {
    let config = load_config_from(opts.config.as_deref())?;
    let mut presenter = StdioPresenter::new();

    let provider_name = opts
        .provider
        .unwrap_or_else(|| config.default_provider.clone());
    let mut provider_config = config
        .providers
        .get(&provider_name)
        .cloned()
        .or_else(|| ProviderConfig::empty_for(&provider_name))
        .ok_or_else(|| anyhow!("unknown provider: {provider_name}"))?;

    if !provider_config.has_api_key() {
        match ask_api_key(&mut presenter, &provider_name)? {
            Some(key) => provider_config.set_api_key(&key),
            None => return Ok(()),
        }
    }

    let backend: Arc<dyn TextGenerator> = Arc::from(create_provider(&provider_config)?);
    let model = opts.model.unwrap_or_else(|| config.default_model.clone());
    info!(provider = %provider_name, %model, "starting quiz shell");
    let generator = QuestionGenerator::new(backend, config.generator_config(&model));

    let output_dir = opts.output.unwrap_or_else(|| config.output_dir.clone());
    let first_round = Selection {
        difficulty: opts.difficulty,
        direction: opts.direction,
    };

    run_quiz(
        &mut presenter,
        &generator,
        first_round,
        &output_dir,
        opts.html,
    )
    .await?;
    Ok(())
}

/// Ask until a non-blank key is given. `None` if input closes first.
fn ask_api_key(presenter: &mut dyn Presenter, provider: &str) -> Result<Option<String>> {
    presenter.show(&format!("No API key configured for {provider}."))?;
    loop {
        let Some(key) = presenter.ask("API key: ")? else {
            return Ok(None);
        };
        if key.trim().is_empty() {
            presenter.show("The API key must not be empty.")?;
            continue;
        }
        return Ok(Some(key));
    }
}

/// Choices already made for the next round.
#[derive(Debug, Clone, Copy, Default)]
struct Selection {
    difficulty: Option<Difficulty>,
    direction: Option<Direction>,
}

/// Drive one session until the user quits or input closes.
///
/// Returns the paths of every result file written.
async fn run_quiz(
    presenter: &mut dyn Presenter,
    generator: &QuestionGenerator,
    first_round: Selection,
    output_dir: &Path,
    html: bool,
) -> Result<Vec<PathBuf>> {
    let mut session = QuizSession::new();
    let mut pending = first_round;
    let mut written = Vec::new();

    loop {
        match session.phase() {
            Phase::Selecting => {
                let selection = std::mem::take(&mut pending);
                let Some(difficulty) = (match selection.difficulty {
                    Some(d) => Some(d),
                    None => choose_difficulty(presenter)?,
                }) else {
                    return Ok(written);
                };
                let Some(direction) = (match selection.direction {
                    Some(d) => Some(d),
                    None => choose_direction(presenter)?,
                }) else {
                    return Ok(written);
                };

                presenter.show(&format!(
                    "Generating questions ({} / {})...",
                    difficulty.label_ja(),
                    direction.label_ja()
                ))?;
                match session.start_quiz(generator, difficulty, direction).await? {
                    StartOutcome::Started { count } => {
                        presenter.show(&format!("{count} questions ready."))?;
                    }
                    StartOutcome::NoQuestions { cause } => {
                        let permanent = cause.as_ref().is_some_and(is_permanent);
                        let message = match cause {
                            Some(err) => format!("Could not generate questions: {err}"),
                            None => "The model returned no usable questions.".to_string(),
                        };
                        presenter.show(&message)?;
                        if permanent {
                            presenter.show("Check the API key and model name, then start again.")?;
                            return Ok(written);
                        }
                        if !confirm(presenter, "Try again? [Y/n] ", true)? {
                            return Ok(written);
                        }
                        pending = Selection {
                            difficulty: Some(difficulty),
                            direction: Some(direction),
                        };
                    }
                }
            }
            Phase::Answering => {
                let prompt = format!(
                    "\nQuestion {}/{}: {}\n> ",
                    session.question_number(),
                    session.total(),
                    session.current_prompt()?
                );
                let Some(answer) = presenter.ask(&prompt)? else {
                    return Ok(written);
                };
                let record = session.submit_answer(&answer)?;
                if record.is_correct {
                    presenter.show(record.result_label())?;
                } else {
                    presenter.show(&format!(
                        "{} (answer: {})",
                        record.result_label(),
                        record.correct
                    ))?;
                }
            }
            Phase::Finished => {
                let summary = session.summary()?;
                presenter.show(&render_summary(&summary))?;

                let now = chrono::Local::now().naive_local();
                match export_results(&summary, output_dir, now, html) {
                    Ok(paths) => {
                        for path in &paths {
                            presenter.show(&format!("Results saved to {}", path.display()))?;
                        }
                        written.extend(paths);
                    }
                    Err(e) => presenter.show(&format!("Could not save results: {e:#}"))?,
                }

                if !confirm(presenter, "Play again? [y/N] ", false)? {
                    return Ok(written);
                }
                session.restart();
            }
        }
    }
}

/// Whether retrying with the same settings cannot help.
fn is_permanent(err: &GenerationError) -> bool {
    match err {
        GenerationError::Backend(source) => source
            .downcast_ref::<ProviderError>()
            .is_some_and(ProviderError::is_permanent),
        GenerationError::EmptyResponse => false,
    }
}

/// Write the CSV, plus the HTML page when asked, and return the paths.
fn export_results(
    summary: &QuizSummary,
    output_dir: &Path,
    now: chrono::NaiveDateTime,
    html: bool,
) -> Result<Vec<PathBuf>> {
    let csv_path = write_csv_report(&summary.answers, output_dir, now)?;
    let mut paths = vec![csv_path.clone()];
    if html {
        let html_path = csv_path.with_extension("html");
        write_html_report(summary, &html_path, now)?;
        paths.push(html_path);
    }
    Ok(paths)
}

fn choose_difficulty(presenter: &mut dyn Presenter) -> Result<Option<Difficulty>> {
    let menu: Vec<String> = Difficulty::ALL
        .iter()
        .enumerate()
        .map(|(i, d)| format!("  {}. {} ({d})", i + 1, d.label_ja()))
        .collect();
    presenter.show(&format!("\n難易度を選んでください:\n{}", menu.join("\n")))?;
    choose(presenter, "Difficulty: ")
}

fn choose_direction(presenter: &mut dyn Presenter) -> Result<Option<Direction>> {
    let menu: Vec<String> = Direction::ALL
        .iter()
        .enumerate()
        .map(|(i, d)| format!("  {}. {} ({d})", i + 1, d.label_ja()))
        .collect();
    presenter.show(&format!("\n出題形式を選んでください:\n{}", menu.join("\n")))?;
    choose(presenter, "Direction: ")
}

/// Ask until the answer parses. `None` if input closes first.
fn choose<T>(presenter: &mut dyn Presenter, prompt: &str) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = String>,
{
    loop {
        let Some(line) = presenter.ask(prompt)? else {
            return Ok(None);
        };
        match line.parse::<T>() {
            Ok(value) => return Ok(Some(value)),
            Err(e) => presenter.show(&e)?,
        }
    }
}

/// Yes/no question. Blank input takes `default`; closed input means no.
fn confirm(presenter: &mut dyn Presenter, prompt: &str, default: bool) -> Result<bool> {
    let Some(line) = presenter.ask(prompt)? else {
        return Ok(false);
    };
    Ok(match line.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" | "はい" => true,
        _ => false,
    })
}

fn render_summary(summary: &QuizSummary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["#", "出題", "正解", "あなたの回答", "結果"]);
    for (i, record) in summary.answers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&record.prompt_label),
            Cell::new(&record.correct),
            Cell::new(&record.user_answer),
            Cell::new(record.result_label()),
        ]);
    }
    format!(
        "\n{table}\nあなたのスコア: {} / {}",
        summary.score, summary.total
    )
}
