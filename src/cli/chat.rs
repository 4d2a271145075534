use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{ChatBot, ChatOutcome, GenerationParams, Message, Role, normalize_message};
use crate::core::AppConfig;

const HELP: &str = "Commands:
  exit, quit     End the chat
  clear          Clear the conversation history
  history        Show the conversation so far
  save [file]    Save the conversation as JSON
  help           Show this message";

// Longer messages are cut off when listing the history
const HISTORY_PREVIEW_CHARS: usize = 100;

#[derive(Debug, PartialEq)]
enum Input {
    Exit,
    Clear,
    History,
    Save(Option<String>),
    Help,
    Empty,
    Message(String),
}

fn parse_input(line: &str) -> Input {
    let Some(line) = normalize_message(line) else {
        return Input::Empty;
    };
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match (command.to_lowercase().as_str(), rest) {
        ("exit" | "quit", "") => Input::Exit,
        ("clear", "") => Input::Clear,
        ("history", "") => Input::History,
        ("help", "") => Input::Help,
        ("save", "") => Input::Save(None),
        ("save", file) => Input::Save(Some(file.to_string())),
        _ => Input::Message(line.to_string()),
    }
}

/// One line per turn, skipping the system message.
fn format_history(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.role() != Role::System)
        .enumerate()
        .map(|(i, m)| {
            let speaker = match m.role() {
                Role::User => "You",
                _ => "Bot",
            };
            let content = m.content();
            let preview = if content.chars().count() > HISTORY_PREVIEW_CHARS {
                let cut: String = content.chars().take(HISTORY_PREVIEW_CHARS).collect();
                format!("{}...", cut)
            } else {
                content.to_string()
            };
            format!("{}. {}: {}", i + 1, speaker, preview)
        })
        .collect()
}

fn default_save_path() -> PathBuf {
    PathBuf::from(format!(
        "conversation_{}.json",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

fn save_conversation(messages: &[Message], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(messages)?;
    fs::write(path, json)?;
    Ok(())
}

pub async fn run(
    config: AppConfig,
    documents: bool,
    temperature: Option<f64>,
    max_tokens: Option<f64>,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    if documents && !config.has_search() {
        println!("Document search isn't configured, answering without it.");
    }

    let chatbot = ChatBot::from_config(&config)?;
    let params = GenerationParams::resolve(temperature, max_tokens, documents);
    let session_id = chatbot.registry().get_or_create(None).id().to_string();

    println!(
        "Chatting with {} (document search: {}). Type 'help' for commands.",
        chatbot.model(),
        if chatbot.has_search() { "on" } else { "off" }
    );

    loop {
        let readline = rl.readline(">>> ");
        let line = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };
        let _ = rl.add_history_entry(line.as_str());

        match parse_input(&line) {
            Input::Exit => break,
            Input::Empty => println!("Type a message!"),
            Input::Help => println!("{}", HELP),
            Input::Clear => {
                chatbot.clear_session(&session_id).await;
                println!("History cleared.");
            }
            Input::History => {
                let messages = chatbot.session_messages(&session_id).unwrap_or_default();
                for line in format_history(&messages) {
                    println!("{}", line);
                }
            }
            Input::Save(file) => {
                let path = file.map(PathBuf::from).unwrap_or_else(default_save_path);
                let messages = chatbot.session_messages(&session_id).unwrap_or_default();
                match save_conversation(&messages, &path) {
                    Ok(()) => println!("Conversation saved to {}", path.display()),
                    Err(e) => println!("Failed to save conversation: {:#}", e),
                }
            }
            Input::Message(msg) => match chatbot.chat(&msg, Some(&session_id), params).await {
                ChatOutcome::Reply { completion, .. } => {
                    println!("{}", completion.text);
                    if let Some(sources) = completion.sources {
                        println!("Sources: {}", sources.join(", "));
                    }
                }
                ChatOutcome::Failure { error, .. } => println!("Error: {}", error),
            },
        }
    }

    Ok(())
}
