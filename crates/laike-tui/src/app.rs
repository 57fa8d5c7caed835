use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use laike_core::script;
use laike_core::{Config, ControlKind, Effect, FormField, GeminiClient, NavContext, Session, Timeline};
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Sidebar,
    Transcript,
    Input,
}

/// A widget control on a particular message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRef {
    pub message_id: String,
    pub index: usize,
}

impl ControlRef {
    pub fn new(message_id: impl Into<String>, index: usize) -> Self {
        Self { message_id: message_id.into(), index }
    }
}

/// Popup for the product form's text fields.
#[derive(Debug, Clone)]
pub struct FieldEditor {
    pub target: ControlRef,
    pub field: FormField,
    pub input: String,
    pub cursor: usize,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Chat panel
    pub session: Session,
    pub nav_state: ListState,
    pub selected_control: Option<ControlRef>,
    pub reveal_selection: bool, // scroll the selected control into view on next render

    // Composer
    pub input: String,
    pub input_cursor: usize, // char index into input

    // Transcript scrolling
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub follow_bottom: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // API key input state
    pub show_api_key_input: bool,
    pub api_key_input: String,
    pub api_key_input_cursor: usize,

    pub field_editor: Option<FieldEditor>,

    // Panel areas for mouse hit-testing (updated during render)
    pub sidebar_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    pub client: GeminiClient,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: &Config, events: UnboundedSender<AppEvent>) -> Self {
        let client = GeminiClient::new(config.resolve_api_key().as_deref())
            .with_base_url(config.base_url())
            .with_model(config.model());

        let session = Session::new(config.start_context());
        let mut nav_state = ListState::default();
        nav_state.select(Some(context_index(session.context())));

        info!(
            context = session.context().as_str(),
            model = client.model(),
            api_key = client.has_api_key(),
            "app started"
        );

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,
            session,
            nav_state,
            selected_control: None,
            reveal_selection: false,
            input: String::new(),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            follow_bottom: true,
            animation_frame: 0,
            show_api_key_input: false,
            api_key_input: String::new(),
            api_key_input_cursor: 0,
            field_editor: None,
            sidebar_area: None,
            chat_area: None,
            client,
            events,
        }
    }

    // Sidebar

    pub fn nav_down(&mut self) {
        let i = self.nav_state.selected().map_or(0, |i| (i + 1) % NavContext::all().len());
        self.nav_state.select(Some(i));
    }

    pub fn nav_up(&mut self) {
        let len = NavContext::all().len();
        let i = self.nav_state.selected().map_or(0, |i| (i + len - 1) % len);
        self.nav_state.select(Some(i));
    }

    pub fn nav_enter(&mut self) {
        if let Some(context) = self.nav_state.selected().and_then(|i| NavContext::all().get(i).copied()) {
            self.select_context(context);
        }
    }

    pub fn select_context(&mut self, context: NavContext) {
        let epoch = self.session.epoch();
        self.session.select_context(context);
        self.nav_state.select(Some(context_index(context)));
        if self.session.epoch() != epoch {
            self.selected_control = None;
            self.field_editor = None;
            self.chat_scroll = 0;
            self.follow_bottom = true;
        }
    }

    // Widget controls

    /// Every enabled control in the transcript, top to bottom.
    pub fn control_targets(&self) -> Vec<ControlRef> {
        let mut targets = Vec::new();
        for message in self.session.messages() {
            let Some(widget) = &message.widget else { continue };
            for (index, control) in widget.controls().iter().enumerate() {
                if control.enabled {
                    targets.push(ControlRef::new(message.id.clone(), index));
                }
            }
        }
        targets
    }

    /// Select the first enabled control of the newest widget that has one.
    pub fn focus_latest_control(&mut self) {
        let targets = self.control_targets();
        self.selected_control = targets
            .last()
            .map(|last| last.message_id.clone())
            .and_then(|id| targets.into_iter().find(|t| t.message_id == id));
        self.reveal_selection = true;
    }

    pub fn select_next_control(&mut self) {
        self.step_control(1);
    }

    pub fn select_prev_control(&mut self) {
        self.step_control(-1);
    }

    fn step_control(&mut self, delta: isize) {
        let targets = self.control_targets();
        if targets.is_empty() {
            self.selected_control = None;
            return;
        }
        let current = self
            .selected_control
            .as_ref()
            .and_then(|sel| targets.iter().position(|t| t == sel));
        let next = match current {
            Some(i) => (i as isize + delta).clamp(0, targets.len() as isize - 1) as usize,
            None if delta < 0 => targets.len() - 1,
            None => 0,
        };
        self.selected_control = targets.into_iter().nth(next);
        self.reveal_selection = true;
    }

    /// Keep the selection on an enabled control after widgets change.
    fn revalidate_selection(&mut self, previous: &ControlRef) {
        let targets = self.control_targets();
        if targets.contains(previous) {
            return;
        }
        // Nearest control after the one that went away, else the last one.
        let messages = self.session.messages();
        let order = |c: &ControlRef| {
            let pos = messages.iter().position(|m| m.id == c.message_id).unwrap_or(usize::MAX);
            (pos, c.index)
        };
        let anchor = order(previous);
        self.selected_control = targets
            .iter()
            .find(|t| order(t) > anchor)
            .or_else(|| targets.last())
            .cloned();
        self.reveal_selection = true;
    }

    pub fn activate_selected(&mut self) {
        let Some(target) = self.selected_control.clone() else { return };
        let kind = self
            .session
            .transcript()
            .get(&target.message_id)
            .and_then(|m| m.widget.as_ref())
            .and_then(|w| w.controls().get(target.index).map(|c| c.kind));

        match kind {
            Some(ControlKind::Field(field)) => self.open_field_editor(target, field),
            Some(_) => {
                let timeline = self.session.activate(&target.message_id, target.index);
                self.play(timeline);
                self.revalidate_selection(&target);
            }
            None => self.selected_control = None,
        }
    }

    /// Play a scripted timeline in the background; cues come back as events
    /// tagged with the current epoch.
    pub fn play(&self, timeline: Timeline) {
        if timeline.is_empty() {
            return;
        }
        let epoch = self.session.epoch();
        let tx = self.events.clone();
        tokio::spawn(script::play(timeline, move |effect| {
            tx.send(AppEvent::Cue { epoch, effect }).is_ok()
        }));
    }

    pub fn apply_cue(&mut self, epoch: u64, effect: Effect) {
        if self.session.apply(epoch, effect) {
            self.follow_bottom = true;
        }
    }

    // Free-form chat

    pub fn submit_input(&mut self) {
        let text = self.input.clone();
        if self.submit(&text) {
            self.input.clear();
            self.input_cursor = 0;
        }
    }

    /// Start a streamed turn. Returns false when the session refuses it
    /// (blank input or a reply still pending).
    pub fn submit(&mut self, text: &str) -> bool {
        let Some(turn) = self.session.begin_turn(text) else {
            return false;
        };
        self.follow_bottom = true;

        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let reply_id = turn.reply_id;
            client
                .stream_chat(&turn.history, &turn.message, |chunk| {
                    tx.send(AppEvent::Fragment {
                        reply_id: reply_id.clone(),
                        text: chunk.to_string(),
                    })
                    .is_ok()
                })
                .await;
            if tx.send(AppEvent::StreamDone { reply_id }).is_err() {
                debug!("event loop gone, dropping stream completion");
            }
        });
        true
    }

    /// Copy suggestion chip `index` (0-based) into the composer without sending.
    pub fn pick_suggestion(&mut self, index: usize) -> bool {
        if !self.session.show_suggestions() {
            return false;
        }
        let Some(text) = self.session.context().suggestions().get(index) else {
            return false;
        };
        self.input = text.to_string();
        self.input_cursor = self.input.chars().count();
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
        true
    }

    pub fn push_fragment(&mut self, reply_id: &str, text: &str) {
        if self.session.push_fragment(reply_id, text) {
            self.follow_bottom = true;
        }
    }

    pub fn finish_stream(&mut self, reply_id: &str) {
        self.session.finish_turn(reply_id);
    }

    pub fn tick_animation(&mut self) {
        if self.session.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Scrolling

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_bottom = false;
    }

    /// Render clamps the offset and re-enables following at the bottom.
    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    // API key popup

    pub fn open_api_key_input(&mut self) {
        self.show_api_key_input = true;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
    }

    pub fn close_api_key_input(&mut self) {
        self.show_api_key_input = false;
        self.api_key_input.clear();
        self.api_key_input_cursor = 0;
    }

    pub fn save_api_key_input(&mut self) {
        let key = self.api_key_input.trim().to_string();
        if !key.is_empty() {
            self.client.set_api_key(&key);
            match Config::save_api_key(&key) {
                Ok(()) => info!("API key saved"),
                Err(e) => warn!(error = %e, "failed to save API key"),
            }
        }
        self.close_api_key_input();
    }

    // Product form field popup

    pub fn open_field_editor(&mut self, target: ControlRef, field: FormField) {
        let current = self
            .session
            .transcript()
            .get(&target.message_id)
            .and_then(|m| m.widget.as_ref())
            .and_then(|w| w.field_value(field))
            .unwrap_or_default()
            .to_string();
        let cursor = current.chars().count();
        self.field_editor = Some(FieldEditor { target, field, input: current, cursor });
    }

    pub fn commit_field_editor(&mut self) {
        if let Some(editor) = self.field_editor.take() {
            self.session.set_field(&editor.target.message_id, editor.field, &editor.input);
        }
    }

    pub fn cancel_field_editor(&mut self) {
        self.field_editor = None;
    }
}

fn context_index(context: NavContext) -> usize {
    NavContext::all().iter().position(|c| *c == context).unwrap_or(0)
}
