//! Promptlint CLI binary entry point.
//! Delegates to library modules for scanning and fixing and prints results.

use clap::Parser;
use promptlint::cli::{Cli, Commands};
use promptlint::llm::{api_key_from_env, HttpLlmClient, LlmTransport, NoopLlmClient};
use promptlint::rules::default_rules;
use promptlint::validator::Validator;
use promptlint::{config, output, scan, utils};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Rules => {
            // Listing needs no credentials; a noop transport stands in.
            let rules = default_rules(Some(Arc::new(NoopLlmClient)));
            for rule in &rules {
                println!("{:<20} {}", rule.rule_id(), rule.description());
            }
        }
        Commands::Scan {
            directory,
            fix,
            yes,
            output,
            extension,
            no_semantic,
        } => {
            let eff = config::resolve_effective(
                directory.as_deref(),
                extension.as_deref(),
                output.as_deref(),
                if fix { Some(true) } else { None },
                if no_semantic { Some(true) } else { None },
            );
            if eff.output != "json" && config::load_config(&eff.root).is_none() {
                eprintln!(
                    "{} {}",
                    utils::note_prefix(),
                    "No promptlint.toml found; using defaults."
                );
            }

            let dir = Path::new(&eff.dir);
            if !dir.is_dir() {
                eprintln!(
                    "{} {}",
                    utils::error_prefix(),
                    format!("Not a directory: {}", dir.to_string_lossy())
                );
                std::process::exit(2);
            }

            // Semantic rules need the transport up front; a missing key is a
            // startup error, not a first-use surprise.
            let transport: Option<Arc<dyn LlmTransport>> = if eff.semantic {
                let api_key = match api_key_from_env() {
                    Ok(k) => k,
                    Err(e) => {
                        eprintln!(
                            "{} {}",
                            utils::error_prefix(),
                            format!("{e} (pass --no-semantic to scan without semantic rules)")
                        );
                        std::process::exit(2);
                    }
                };
                match HttpLlmClient::new(api_key, eff.model.clone(), eff.max_tokens) {
                    Ok(client) => Some(Arc::new(client)),
                    Err(e) => {
                        eprintln!(
                            "{} {}",
                            utils::error_prefix(),
                            format!("failed to build transport: {e}")
                        );
                        std::process::exit(2);
                    }
                }
            } else {
                None
            };

            let validator = Validator::new(default_rules(transport));
            let (result, contents) = scan::run_scan(dir, &eff.extension, &validator);
            output::print_scan(&result, &eff.output);

            let mut fixes_applied = false;
            if eff.fix && !result.results.is_empty() {
                if yes || confirm("Apply the suggested fixes? [y/N] ") {
                    for report in &result.results {
                        let content = match contents.get(&report.file) {
                            Some(c) => c,
                            None => continue,
                        };
                        match validator.fix_file(Path::new(&report.file), content, &report.issues)
                        {
                            Ok(true) => println!("✏️  applied fixes to {}", report.file),
                            Ok(false) => println!("no changes: {}", report.file),
                            Err(e) => eprintln!(
                                "{} {}",
                                utils::warn_prefix(),
                                format!("could not write fixes to {}: {}", report.file, e)
                            ),
                        }
                    }
                    println!("Fixing process complete.");
                    fixes_applied = true;
                } else {
                    println!("Fixing process cancelled.");
                }
            }

            if result.summary.issues > 0 && !fixes_applied {
                std::process::exit(1);
            }
        }
    }
}

/// Ask a yes/no question on stderr and read the answer from stdin.
fn confirm(prompt: &str) -> bool {
    eprint!("{prompt}");
    std::io::stderr().flush().ok();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
