//! Init command - first-run setup and credential checks.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Speider Setup");
    println!();
    println!("Welcome to Speider! Let's make sure everything is configured correctly.\n");

    // Step 1: OpenAI key for embeddings and generation
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    if std::env::var("OPENAI_API_KEY").is_err() {
        Output::warning("OPENAI_API_KEY environment variable is not set.");
        println!();
        println!("  Speider requires an OpenAI API key for embeddings and summaries.");
        println!(
            "  Get your API key from: {}",
            style("https://platform.openai.com/api-keys").underlined()
        );
        println!();
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style("export OPENAI_API_KEY='sk-...'").green());
        println!();

        if !prompt_continue("Continue without API key?")? {
            println!();
            Output::info("Setup cancelled. Set your API key and run 'speider init' again.");
            return Ok(());
        }
    } else {
        Output::success("OpenAI API key is configured!");
    }

    println!();

    // Step 2: Provider credentials. Missing ones are not fatal; the
    // affected source falls back to placeholder data during analysis.
    println!("{}", style("Step 2: Checking content providers").bold().cyan());
    println!();

    let providers = [
        ("YouTube", settings.sources.youtube_api_key.is_some(), "YOUTUBE_API_KEY"),
        ("NewsAPI", settings.sources.news_api_key.is_some(), "NEWS_API_KEY"),
        ("Twitter", settings.sources.social_bearer_token.is_some(), "SOCIAL_BEARER_TOKEN"),
    ];
    let mut missing = 0;
    for (name, configured, env_var) in providers {
        if configured {
            println!("  {} {} credentials found", style("✓").green(), style(name).bold());
        } else {
            missing += 1;
            println!("  {} {} - no credentials", style("✗").yellow(), style(name).bold());
            println!(
                "    {} set {} or add it to the config file",
                style("→").dim(),
                style(env_var).dim()
            );
        }
    }
    println!();
    if missing > 0 {
        Output::warning(
            "Sources without credentials will return placeholder data during analysis.",
        );
    } else {
        Output::success("All content providers are configured!");
    }

    println!();

    // Step 3: Config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!(
        "  {} Run your first analysis",
        style("speider analyze \"<topic>\"").cyan()
    );
    println!(
        "  {} Analyze and then ask follow-up questions",
        style("speider analyze \"<topic>\" --interactive").cyan()
    );
    println!();
    println!("For more help: {}", style("speider --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
