//! Side effects triggered from transcript entries: clipboard copy and export.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{PlaygroundError, Result};
use crate::transcript::{ChatRole, Transcript};

pub const EXPORT_FILE_NAME: &str = "chat.json";

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The OS clipboard. Opened per copy, since some platforms drop the
/// connection when idle.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().map_err(PlaygroundError::side_effect)?;
        clipboard
            .set_text(text.to_string())
            .map_err(PlaygroundError::side_effect)
    }
}

/// Copies the assistant message at `index`. User messages and out-of-range
/// indices are refused before the clipboard is touched.
pub fn copy_message(
    transcript: &Transcript,
    index: usize,
    clipboard: &mut dyn Clipboard,
) -> Result<()> {
    let message = transcript
        .get(index)
        .filter(|m| m.role == ChatRole::Assistant)
        .ok_or_else(|| {
            PlaygroundError::SideEffect(format!("no assistant message at index {index}"))
        })?;

    match clipboard.set_text(&message.content) {
        Ok(()) => {
            info!(index, chars = message.content.chars().count(), "copied message");
            Ok(())
        }
        Err(err) => {
            warn!(index, "clipboard copy failed: {err}");
            Err(err)
        }
    }
}

/// Pretty JSON array of `{role, content}` records.
pub fn render_transcript(transcript: &Transcript) -> Result<String> {
    serde_json::to_string_pretty(transcript.messages()).map_err(PlaygroundError::side_effect)
}

/// Writes the transcript as it is right now to `<dir>/chat.json`.
pub fn export_transcript(transcript: &Transcript, dir: &Path) -> Result<PathBuf> {
    let json = render_transcript(transcript)?;
    let path = dir.join(EXPORT_FILE_NAME);

    let written = fs::create_dir_all(dir).and_then(|_| fs::write(&path, json));
    match written {
        Ok(()) => {
            info!(path = %path.display(), messages = transcript.len(), "transcript exported");
            Ok(path)
        }
        Err(err) => {
            warn!(path = %path.display(), "transcript export failed: {err}");
            Err(PlaygroundError::side_effect(err))
        }
    }
}
