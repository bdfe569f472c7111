//! Practice command handler

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::{GameConfig, GameSummary, PracticeHistory, SpellingGame, select_words};
use crate::cli::PracticeArgs;
use crate::config::{APP_NAME, Config};
use crate::gateway::{ContentGateway, HttpGateway};

const HISTORY_FILE_NAME: &str = "practice_history.json";

pub async fn run(args: PracticeArgs) -> Result<()> {
    if args.history {
        return show_history();
    }

    let config = Config::load()?;
    let user_id = config.require_user()?.to_string();
    let gateway = HttpGateway::new(&config.api)?;

    let game_config = GameConfig {
        word_count: args.count,
        difficulty: args.difficulty,
        ..Default::default()
    };

    let words = gateway.user_words(&user_id).await?;
    let selected = select_words(&words, &game_config);
    if selected.is_empty() {
        println!(
            "{}",
            "[WARN] No words available for practice. Save some words while reading first.".yellow()
        );
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "[Practice] {} words, {:?} difficulty. Type the word for each translation, ? for a hint.",
            selected.len(),
            game_config.difficulty
        )
        .green()
    );

    let mut game = SpellingGame::new(selected);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(word) = game.current() {
        println!();
        println!(
            "  [{}/{}] {}",
            game.position() + 1,
            game.len(),
            word.translation.bold()
        );

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let answer = line.trim();
        if answer.is_empty() {
            continue;
        }
        if answer == "?" {
            if let Some(hint) = game.hint() {
                println!("  {}", format!("Hint: {}", hint).cyan());
            }
            continue;
        }

        if let Some(detail) = game.submit(answer) {
            if detail.correct {
                println!("  {}", "Correct".green());
            } else {
                println!(
                    "  {} {}",
                    "Wrong:".red(),
                    format!("the answer is {}", detail.correct_answer).red()
                );
            }
        }
    }

    let finished = game.is_finished();
    let summary = game.finish();
    print_summary(&summary);

    if !finished || summary.results.is_empty() {
        println!("{}", "[Practice] Session ended early, results not saved".yellow());
        return Ok(());
    }

    if args.dry_run {
        println!("{}", "[Practice] Dry run, results not submitted".yellow());
    } else {
        match gateway
            .submit_practice(&user_id, &summary.results, &game_config.game_type)
            .await
        {
            Ok(()) => info!("Submitted {} practice results", summary.results.len()),
            Err(e) => {
                warn!("Error saving practice results: {}", e);
                println!("{}", format!("[WARN] Could not save results: {}", e).yellow());
            }
        }
    }

    if let Err(e) = record_history(&summary, &game_config.game_type) {
        warn!("Failed to update practice history: {:#}", e);
    }

    Ok(())
}

fn print_summary(summary: &GameSummary) {
    println!();
    println!(
        "{}",
        format!(
            "[Practice] Score {}% ({}/{}) in {}s",
            summary.score, summary.correct_answers, summary.total_questions, summary.time_spent
        )
        .green()
    );
    for detail in summary.details.iter().filter(|d| !d.correct) {
        println!(
            "  {} -> {} (you wrote {})",
            detail.word, detail.correct_answer, detail.user_answer
        );
    }
}

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_NAME).join(HISTORY_FILE_NAME))
}

fn load_history(path: &Path) -> Result<PracticeHistory> {
    if !path.exists() {
        return Ok(PracticeHistory::default());
    }
    let content = fs::read_to_string(path)
        .context(format!("Failed to read history: {}", path.display()))?;
    serde_json::from_str(&content).context("Failed to parse practice history")
}

fn record_history(summary: &GameSummary, game_type: &str) -> Result<()> {
    let path = history_path().context("Could not determine data directory")?;

    let mut history = load_history(&path)?;
    history.push(summary.session(game_type));

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("Failed to create data directory")?;
    }
    fs::write(&path, serde_json::to_string_pretty(&history)?)
        .context("Failed to write practice history")?;
    Ok(())
}

fn show_history() -> Result<()> {
    let path = history_path().context("Could not determine data directory")?;
    let history = load_history(&path)?;

    if history.sessions().is_empty() {
        println!("{}", "[Practice] No practice sessions yet".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("[Practice] Last {} sessions", history.sessions().len()).green()
    );
    for session in history.sessions() {
        let score = if session.word_count > 0 {
            session.correct_count * 100 / session.word_count
        } else {
            0
        };
        println!(
            "  {}  {:<10} {}/{} ({}%) in {}s",
            session.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            session.game_type,
            session.correct_count,
            session.word_count,
            score,
            session.total_time
        );
    }
    Ok(())
}
