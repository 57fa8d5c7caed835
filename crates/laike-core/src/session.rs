//! Chat panel state: the active context, its transcript, and what it is waiting on.
//!
//! The session never sleeps or spawns. Scripted follow-ups come back as a
//! [`Timeline`] which the front end plays and feeds into [`Session::apply`]
//! together with the epoch it was dispatched in; a context switch bumps the
//! epoch so that cues still in flight from the old context fall on the floor.

use tracing::{debug, info};

use crate::nav::NavContext;
use crate::script::{self, Effect, ScenarioFlags, Timeline};
use crate::state::{HistoryEntry, Message, Transcript};
use crate::widget::{FormField, WidgetAction};

/// A free-form turn that has been accepted and now needs a streamed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    /// Conversation before the new user message.
    pub history: Vec<HistoryEntry>,
    pub message: String,
    pub reply_id: String,
}

#[derive(Debug)]
pub struct Session {
    context: NavContext,
    transcript: Transcript,
    flags: ScenarioFlags,
    // Scripted "thinking" pause, driven by `Effect::Busy` cues.
    thinking: bool,
    // Reply currently being streamed for a free-form turn.
    streaming_reply: Option<String>,
    epoch: u64,
    // Never reset, so ids stay unique across context switches.
    next_id: u64,
}

impl Session {
    pub fn new(context: NavContext) -> Self {
        let mut session = Self {
            context,
            transcript: Transcript::new(),
            flags: ScenarioFlags::default(),
            thinking: false,
            streaming_reply: None,
            epoch: 0,
            next_id: 0,
        };
        session.transcript.push(script::greeting(context));
        session
    }

    pub fn context(&self) -> NavContext {
        self.context
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    /// True while a scripted pause or a streamed reply is in progress.
    pub fn is_busy(&self) -> bool {
        self.thinking || self.streaming_reply.is_some()
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    pub fn streaming_reply(&self) -> Option<&str> {
        self.streaming_reply.as_deref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn flags(&self) -> ScenarioFlags {
        self.flags
    }

    /// Suggestion chips are offered on the agent page until the chat gets going.
    pub fn show_suggestions(&self) -> bool {
        !self.context.suggestions().is_empty() && self.transcript.len() < 3
    }

    /// Switch to `context`: the transcript is discarded and reseeded with its
    /// greeting. Selecting the active context again changes nothing.
    pub fn select_context(&mut self, context: NavContext) {
        if context == self.context {
            return;
        }
        info!(from = self.context.as_str(), to = context.as_str(), "switching context");
        self.context = context;
        self.transcript.clear();
        self.transcript.push(script::greeting(context));
        self.flags = ScenarioFlags::default();
        self.thinking = false;
        self.streaming_reply = None;
        self.epoch += 1;
    }

    /// Activate control `control` of the widget on message `message_id` and
    /// dispatch whatever action it emits.
    pub fn activate(&mut self, message_id: &str, control: usize) -> Timeline {
        let action = self
            .transcript
            .get_mut(message_id)
            .and_then(|m| m.widget.as_mut())
            .and_then(|w| w.activate(control));
        match action {
            Some(action) => self.dispatch(&action),
            None => Timeline::new(),
        }
    }

    pub fn dispatch(&mut self, action: &WidgetAction) -> Timeline {
        script::dispatch(self.context, &mut self.flags, action)
    }

    /// Edit a product form field on message `message_id`.
    pub fn set_field(&mut self, message_id: &str, field: FormField, value: &str) -> bool {
        self.transcript
            .get_mut(message_id)
            .and_then(|m| m.widget.as_mut())
            .map(|w| w.set_field(field, value))
            .unwrap_or(false)
    }

    /// Apply one due cue. Cues from an earlier epoch are ignored.
    pub fn apply(&mut self, epoch: u64, effect: Effect) -> bool {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "dropping stale cue");
            return false;
        }
        match effect {
            Effect::User(text) => {
                let id = self.next_id();
                self.transcript.push(Message::user(id, text));
            }
            Effect::Busy(busy) => self.thinking = busy,
            Effect::Reply(mut message) => {
                // Replayed cards reuse their script id; keep transcript keys unique.
                if self.transcript.contains(&message.id) {
                    message.id = format!("{}-{}", message.id, self.next_id());
                }
                self.transcript.push(message);
            }
        }
        true
    }

    /// Start a free-form turn. Blank input, or input while a reply is still
    /// pending, is refused without touching the transcript.
    pub fn begin_turn(&mut self, input: &str) -> Option<PendingTurn> {
        if input.trim().is_empty() || self.is_busy() {
            return None;
        }

        let history = self.transcript.history();

        let user_id = self.next_id();
        self.transcript.push(Message::user(user_id, input));

        let reply_id = self.next_id();
        let mut reply = Message::assistant(reply_id.clone(), "");
        reply.streaming = true;
        self.transcript.push(reply);
        self.streaming_reply = Some(reply_id.clone());

        debug!(reply_id = %reply_id, history = history.len(), "turn started");
        Some(PendingTurn {
            history,
            message: input.to_string(),
            reply_id,
        })
    }

    /// Append a streamed fragment to the reply it belongs to.
    pub fn push_fragment(&mut self, reply_id: &str, text: &str) -> bool {
        match self.transcript.get_mut(reply_id) {
            Some(message) => {
                message.text.push_str(text);
                true
            }
            None => false,
        }
    }

    pub fn finish_turn(&mut self, reply_id: &str) {
        if let Some(message) = self.transcript.get_mut(reply_id) {
            message.streaming = false;
            debug!(reply_id, chars = message.text.chars().count(), "turn finished");
        }
        if self.streaming_reply.as_deref() == Some(reply_id) {
            self.streaming_reply = None;
        }
    }

    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("turn-{}", self.next_id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(NavContext::default())
    }
}
