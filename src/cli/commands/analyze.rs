//! Analyze command: run the pipeline and optionally open a Q&A session.

use crate::analysis::AnalysisSnapshot;
use crate::cli::Output;
use crate::config::Settings;
use crate::document::SourceKind;
use crate::error::{Result, SpeiderError};
use crate::pipeline::Pipeline;
use crate::rag::{ConversationTurn, RagEngine};
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

/// Run the analyze command.
pub async fn run_analyze(query: &str, interactive: bool, settings: Settings) -> Result<()> {
    let pipeline = Arc::new(Pipeline::from_settings(&settings));

    let pb = Output::progress_bar("Starting analysis...");
    let handle = pipeline.start(query)?;

    // Render pipeline progress until the background run finishes.
    while !handle.is_finished() {
        let status = pipeline.status();
        pb.set_position(status.progress as u64);
        pb.set_message(status.message);
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    pb.finish_and_clear();

    handle
        .await
        .map_err(|e| SpeiderError::Pipeline(format!("analysis task failed: {}", e)))??;

    let snapshot = pipeline
        .snapshot()
        .ok_or_else(|| SpeiderError::Pipeline("analysis produced no results".to_string()))?;
    render_snapshot(&snapshot);

    if interactive {
        let rag = RagEngine::new(
            pipeline.store(),
            pipeline.analyzer(),
            settings.rag.context_limit,
        );
        run_session(query, &rag).await?;
    }

    Ok(())
}

fn render_snapshot(snapshot: &AnalysisSnapshot) {
    Output::header(&format!("Analysis: {}", snapshot.query));
    Output::kv("Documents analyzed", &snapshot.total_documents.to_string());
    Output::kv(
        "Overall sentiment",
        &format!(
            "positive {:.2} / negative {:.2} / neutral {:.2}",
            snapshot.sentiment_distribution.positive,
            snapshot.sentiment_distribution.negative,
            snapshot.sentiment_distribution.neutral
        ),
    );

    Output::header("Summary");
    println!("{}", snapshot.summary);

    Output::header("Key Insights");
    for insight in &snapshot.insights {
        Output::list_item(insight);
    }

    for kind in SourceKind::ALL {
        let Some(analysis) = snapshot.sources.get(&kind) else {
            continue;
        };
        Output::header(&format!("{} sources", kind));
        Output::kv("Results", &analysis.total_results.to_string());
        Output::kv(
            "Sentiment",
            &format!(
                "positive {:.2} / negative {:.2} / neutral {:.2} (compound {:.2})",
                analysis.sentiment.positive,
                analysis.sentiment.negative,
                analysis.sentiment.neutral,
                analysis.sentiment.compound
            ),
        );
        if !analysis.key_themes.is_empty() {
            Output::kv("Key themes", &analysis.key_themes.join(", "));
        }
    }
    println!();
}

/// Interactive follow-up question loop.
async fn run_session(query: &str, rag: &RagEngine) -> Result<()> {
    println!("\n{}", style("Speider Q&A").bold().cyan());
    println!(
        "{}\n",
        style(
            "Ask follow-up questions, 'suggest' for ideas, 'history' to review, \
             'clear' to reset, 'exit' to quit."
        )
        .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            rag.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        if input.eq_ignore_ascii_case("history") {
            let turns = rag.history();
            if turns.is_empty() {
                Output::info("No questions asked yet.");
            } else {
                Output::header("Conversation history");
                for line in history_lines(&turns) {
                    Output::list_item(&line);
                }
                println!();
            }
            continue;
        }

        if input.eq_ignore_ascii_case("suggest") {
            Output::header("Suggested questions");
            for suggestion in rag.suggestions(query) {
                Output::list_item(&suggestion);
            }
            println!();
            continue;
        }

        match rag.ask(input).await {
            Ok(answer) => {
                println!(
                    "\n{} {}\n",
                    style("Speider:").cyan().bold(),
                    answer.answer
                );
                if !answer.sources.is_empty() {
                    println!(
                        "{}",
                        style(format!("Sources (confidence {:.2}):", answer.confidence)).dim()
                    );
                    for citation in &answer.sources {
                        Output::citation(
                            &citation.title,
                            &citation.source.to_string(),
                            citation.relevance_score,
                            &citation.snippet,
                            &citation.url,
                        );
                    }
                    println!();
                }
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}

/// One display line per conversation turn, oldest first.
fn history_lines(turns: &[ConversationTurn]) -> Vec<String> {
    const ANSWER_PREVIEW_CHARS: usize = 120;

    turns
        .iter()
        .map(|turn| {
            let preview: String = turn.answer.chars().take(ANSWER_PREVIEW_CHARS).collect();
            let suffix = if turn.answer.chars().count() > ANSWER_PREVIEW_CHARS {
                "..."
            } else {
                ""
            };
            format!(
                "[{}] Q: {} / A: {}{}",
                turn.asked_at.format("%H:%M:%S"),
                turn.question,
                preview,
                suffix
            )
        })
        .collect()
}
