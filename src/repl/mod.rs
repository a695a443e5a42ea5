//! Interactive terminal client
//!
//! Talks to a running server through a [`ChatSession`]. Image replies are
//! decoded and written to disk as PNG files when an image directory is set.

pub mod colors;

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};

use crate::chat::{ChatMessage, ChatSession, ChatTransport};
use colors::ansi::*;

const THINKING: &str = "AI is thinking...";

/// REPL state
pub struct Repl<T> {
    editor: DefaultEditor,
    session: ChatSession<T>,
    image_dir: Option<PathBuf>,
    history_path: PathBuf,
}

impl<T: ChatTransport> Repl<T> {
    pub fn new(transport: T, image_dir: Option<PathBuf>) -> Result<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = crate::config::config_dir().join("chat_history");

        Ok(Self {
            editor,
            session: ChatSession::new(transport),
            image_dir,
            history_path,
        })
    }

    fn load_history(&mut self) {
        if self.history_path.exists() {
            let _ = self.editor.load_history(&self.history_path);
        }
    }

    fn save_history(&mut self) {
        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = self.editor.save_history(&self.history_path);
    }

    /// Run the REPL loop
    pub async fn run(&mut self) -> Result<()> {
        self.load_history();

        println!("Type your message (Ctrl+D to exit, /help for commands)");
        println!("  Prefix with /image to ask for a picture");
        println!();

        for message in self.session.messages() {
            println!("{}", render(message, self.image_dir.as_deref()));
        }

        loop {
            let line = match self.editor.readline(&colors::prompt()) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            self.editor.add_history_entry(trimmed)?;

            match trimmed {
                "/quit" | "/exit" => break,
                "/help" => {
                    print_help();
                    continue;
                }
                "/history" => {
                    for message in self.session.messages() {
                        println!("{}", summarize(message));
                    }
                    continue;
                }
                _ => {}
            }

            println!("{}", colors::status(THINKING));
            let appended = match self.session.send(trimmed).await {
                Ok(appended) => appended.to_vec(),
                Err(e) => {
                    println!("{}", colors::warning(&e.to_string()));
                    continue;
                }
            };

            for message in &appended {
                println!("{}", render(message, self.image_dir.as_deref()));
            }
        }

        println!("Goodbye!");
        self.save_history();
        Ok(())
    }
}

fn print_help() {
    println!("{}", colors::separator(40));
    println!("{}/image <prompt>{}  generate an image", BOLD, RESET);
    println!("{}/history{}         show the conversation so far", BOLD, RESET);
    println!("{}/quit{}            leave", BOLD, RESET);
    println!("{}", colors::separator(40));
}

/// One transcript line for display. Images are saved to `image_dir` when
/// set; otherwise, or if saving fails, they are summarised.
pub fn render(message: &ChatMessage, image_dir: Option<&Path>) -> String {
    let speaker = colors::speaker(message.sender);
    if let Some(uri) = &message.image {
        let Some(dir) = image_dir else {
            return format!("{} {}", speaker, colors::status(&image_summary(uri)));
        };
        return match save_image(uri, dir, message) {
            Ok(path) => format!("{} {}", speaker, colors::success(&format!("[image saved to {}]", path.display()))),
            Err(e) => format!("{} {}", speaker, colors::error(&format!("[image not saved: {}]", e))),
        };
    }

    format!("{} {}", speaker, message.text.as_deref().unwrap_or_default())
}

/// Plain one-line form without side effects, for `/history`
pub fn summarize(message: &ChatMessage) -> String {
    let body = match (&message.text, &message.image) {
        (Some(text), _) => text.clone(),
        (None, Some(uri)) => image_summary(uri),
        (None, None) => String::new(),
    };
    format!("{}{:>3}{} {}: {}", DIM, message.id.0, RESET, message.sender, body)
}

fn image_summary(uri: &str) -> String {
    format!("[image, {} bytes encoded]", uri.len())
}

/// Split a `data:<mime>;base64,<payload>` URI into mime type and bytes
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:").ok_or_else(|| anyhow!("not a data URI"))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| anyhow!("data URI is not base64 encoded"))?;
    let bytes = STANDARD.decode(payload.trim()).context("invalid base64 payload")?;
    Ok((mime.to_string(), bytes))
}

/// Write an image message to `dir` and return the file path
pub fn save_image(uri: &str, dir: &Path, message: &ChatMessage) -> Result<PathBuf> {
    let (_mime, bytes) = decode_data_uri(uri)?;
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("parley-{}-{}.png", stamp, message.id.0));
    std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
