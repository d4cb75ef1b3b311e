use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use vidhi_agents::LegalAssistant;
use vidhi_core::templates::GREETING;
use vidhi_core::{ChatInput, KnowledgeStats};
use vidhi_observability::{init_tracing, AppMetrics};
use vidhi_storage::MemoryStore;

#[derive(Debug, Parser)]
#[command(name = "vidhi")]
#[command(about = "VidhiSaarthi legal assistant CLI")]
struct Cli {
    /// Directory with ipc.json / crpc.json / procedures.json; built-in tables otherwise.
    #[arg(long, env = "VIDHI_KB_ROOT")]
    kb_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat,
    Ask {
        #[arg(required = true)]
        query: Vec<String>,
    },
    Section {
        code: String,
        number: String,
    },
    Procedures,
    Kb {
        #[command(subcommand)]
        command: KbCommand,
    },
}

#[derive(Debug, Subcommand)]
enum KbCommand {
    /// Load and validate the directory given by --kb-root.
    Check,
}

#[derive(Debug, Serialize)]
struct KbReport {
    root: PathBuf,
    stats: KnowledgeStats,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("vidhi_cli");
    let cli = Cli::parse();

    let kb_root = cli.kb_root.as_deref();

    match cli.command {
        Command::Chat => run_chat(build_assistant(kb_root)?).await?,
        Command::Ask { query } => {
            println!("{}", build_assistant(kb_root)?.ask(&query.join(" ")));
        }
        Command::Section { code, number } => {
            let assistant = build_assistant(kb_root)?;
            let section = assistant
                .section(&code, &number)
                .with_context(|| format!("no {code} section {number} in the knowledge base"))?;
            println!("{}", serde_json::to_string_pretty(section)?);
        }
        Command::Procedures => {
            let procedures = build_assistant(kb_root)?.procedures();
            println!("{}", serde_json::to_string_pretty(&procedures)?);
        }
        Command::Kb { command } => match command {
            KbCommand::Check => {
                let report = check_knowledge_dir(kb_root)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        },
    }

    Ok(())
}

async fn run_chat(assistant: LegalAssistant<MemoryStore>) -> Result<()> {
    let mut session_id: Option<String> = None;

    println!("{GREETING}");
    println!("type 'clear' to reset the conversation, 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        if message.eq_ignore_ascii_case("clear") {
            if let Some(id) = session_id.as_deref() {
                assistant.clear(id).await?;
            }
            println!("\nChat cleared.\n\n{GREETING}\n");
            continue;
        }

        let reply = assistant
            .handle_chat(ChatInput {
                session_id: session_id.clone(),
                text: message.to_string(),
            })
            .await?;

        session_id = Some(reply.session_id);
        println!("\n{}\n", reply.reply_text);
    }

    Ok(())
}

fn check_knowledge_dir(kb_root: Option<&Path>) -> Result<KbReport> {
    let root = kb_root.ok_or_else(|| anyhow!("kb check needs --kb-root or VIDHI_KB_ROOT"))?;
    let knowledge = vidhi_knowledge::load_dir(root)
        .with_context(|| format!("knowledge directory {} failed validation", root.display()))?;

    Ok(KbReport {
        root: root.to_path_buf(),
        stats: knowledge.stats(),
    })
}

fn build_assistant(kb_root: Option<&Path>) -> Result<LegalAssistant<MemoryStore>> {
    let knowledge = vidhi_knowledge::load_or_builtin(kb_root)
        .with_context(|| match kb_root {
            Some(root) => format!("failed loading knowledge base from {}", root.display()),
            None => "failed loading built-in knowledge base".to_string(),
        })?;

    Ok(LegalAssistant::new(
        Arc::new(knowledge),
        Arc::new(MemoryStore::new()),
        AppMetrics::shared(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kb_check_requires_a_directory() {
        let err = check_knowledge_dir(None).unwrap_err();
        assert!(err.to_string().contains("--kb-root"));
    }

    #[test]
    fn kb_check_reports_the_checked_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("procedures.json"),
            r#"[{ "slug": "zero_fir", "title": "Zero FIR", "steps": ["Go to any police station"] }]"#,
        )
        .unwrap();

        let report = check_knowledge_dir(Some(dir.path())).unwrap();
        assert_eq!(report.root, dir.path());
        assert_eq!(report.stats.procedures, 1);
        assert_eq!(report.stats.ipc_sections, 5);
    }

    #[test]
    fn kb_check_surfaces_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("procedures.json"),
            r#"[{ "slug": "Bad Slug", "title": "Bad", "steps": ["x"] }]"#,
        )
        .unwrap();

        assert!(check_knowledge_dir(Some(dir.path())).is_err());
    }
}
