use std::path::PathBuf;

use ratatui::widgets::ListState;
use tracing::{debug, info};

use crate::controller::ChatController;
use crate::generation::GenerationConfig;
use crate::output::{self, Clipboard};
use crate::prompt::TEMPLATES;
use crate::storage::KeyValueStore;
use crate::theme::{Theme, ThemeStore};
use crate::transcript::{ChatMessage, ChatRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Settings,
    Transcript,
    Prompt,
}

impl FocusPane {
    pub fn next(&self) -> FocusPane {
        match self {
            FocusPane::Settings => FocusPane::Prompt,
            FocusPane::Prompt => FocusPane::Transcript,
            FocusPane::Transcript => FocusPane::Settings,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Stores
    pub config: GenerationConfig,
    pub theme: ThemeStore<Box<dyn KeyValueStore>>,
    pub session: ChatController,

    // Transcript view
    pub transcript_state: ListState,

    // Template picker state
    pub show_template_picker: bool,
    pub template_picker_state: ListState,

    // Transient feedback from copy/export
    pub status: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub export_dir: PathBuf,
    clipboard: Box<dyn Clipboard>,
}

impl App {
    pub fn new(
        session: ChatController,
        theme: ThemeStore<Box<dyn KeyValueStore>>,
        clipboard: Box<dyn Clipboard>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Prompt,

            config: GenerationConfig::new(),
            theme,
            session,

            transcript_state: ListState::default(),

            show_template_picker: false,
            template_picker_state: ListState::default(),

            status: None,
            animation_frame: 0,

            export_dir,
            clipboard,
        }
    }

    pub fn submit_prompt(&mut self) {
        match self.session.submit(&self.config) {
            Ok(()) => {
                self.status = None;
                self.select_last_message();
            }
            Err(err) => debug!("submit rejected: {err}"),
        }
    }

    /// Called once the pending response has been recorded.
    pub fn on_resolution(&mut self) {
        self.animation_frame = 0;
        self.select_last_message();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme.toggle()
    }

    // Template picker
    pub fn open_template_picker(&mut self) {
        self.show_template_picker = true;
        self.template_picker_state.select(Some(0));
    }

    pub fn template_picker_nav_down(&mut self) {
        let len = TEMPLATES.len();
        if len > 0 {
            let i = self.template_picker_state.selected().unwrap_or(0);
            self.template_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn template_picker_nav_up(&mut self) {
        let i = self.template_picker_state.selected().unwrap_or(0);
        self.template_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_template(&mut self) {
        if let Some(template) = self
            .template_picker_state
            .selected()
            .and_then(|i| TEMPLATES.get(i))
        {
            self.session.prompt_mut().apply_template(template);
            info!(template = template.name, "template inserted");
        }
        self.show_template_picker = false;
        self.focus = FocusPane::Prompt;
        self.input_mode = InputMode::Editing;
    }

    // Transcript navigation
    pub fn transcript_nav_down(&mut self) {
        let len = self.session.transcript().len();
        if len > 0 {
            let i = self.transcript_state.selected().unwrap_or(0);
            self.transcript_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn transcript_nav_up(&mut self) {
        let i = self.transcript_state.selected().unwrap_or(0);
        self.transcript_state.select(Some(i.saturating_sub(1)));
    }

    fn select_last_message(&mut self) {
        let len = self.session.transcript().len();
        if len > 0 {
            self.transcript_state.select(Some(len - 1));
        }
    }

    pub fn selected_message(&self) -> Option<&ChatMessage> {
        self.transcript_state
            .selected()
            .and_then(|i| self.session.transcript().get(i))
    }

    pub fn selected_is_assistant(&self) -> bool {
        self.selected_message()
            .is_some_and(|m| m.role == ChatRole::Assistant)
    }

    // Side effects; failures are logged by `output` and otherwise dropped
    pub fn copy_selected(&mut self) {
        let Some(index) = self.transcript_state.selected() else {
            return;
        };
        if !self.selected_is_assistant() {
            return;
        }
        self.status = output::copy_message(self.session.transcript(), index, self.clipboard.as_mut())
            .ok()
            .map(|_| "Copied to clipboard".to_string());
    }

    pub fn export_transcript(&mut self) {
        self.status = output::export_transcript(self.session.transcript(), &self.export_dir)
            .ok()
            .map(|path| format!("Saved {}", path.display()));
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
