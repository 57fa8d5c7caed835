//! Scenario scripts.
//!
//! Every navigation context has a hand-authored conversation. A widget action
//! is dispatched to the script of the active context, which answers with a
//! [`Timeline`] of cues: user lines, busy toggles and assistant replies, each
//! due at a fixed offset from the moment of dispatch.

mod agent;
mod assets;
mod diagnosis;
mod marketing;
mod products;

use std::time::Duration;

use tracing::debug;

use crate::nav::NavContext;
use crate::state::Message;
use crate::widget::WidgetAction;

#[derive(Debug, Clone)]
pub enum Effect {
    /// Append a user message.
    User(String),
    /// Mark the chat panel busy ("thinking") or idle.
    Busy(bool),
    /// Append an assistant message.
    Reply(Message),
}

#[derive(Debug, Clone)]
pub struct Cue {
    pub at: Duration,
    pub effect: Effect,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    cues: Vec<Cue>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, at_ms: u64, effect: Effect) -> Self {
        self.cues.push(Cue { at: Duration::from_millis(at_ms), effect });
        self
    }

    pub fn user(self, at_ms: u64, text: impl Into<String>) -> Self {
        self.push(at_ms, Effect::User(text.into()))
    }

    pub fn busy(self, at_ms: u64, busy: bool) -> Self {
        self.push(at_ms, Effect::Busy(busy))
    }

    pub fn reply(self, at_ms: u64, message: Message) -> Self {
        self.push(at_ms, Effect::Reply(message))
    }

    /// Busy from `start_ms` until `at_ms`, then the reply.
    pub fn thinking(self, start_ms: u64, at_ms: u64, message: Message) -> Self {
        self.busy(start_ms, true).busy(at_ms, false).reply(at_ms, message)
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Cues ordered by offset; cues sharing an offset keep their authored order.
    pub fn into_cues(mut self) -> Vec<Cue> {
        self.cues.sort_by_key(|c| c.at);
        self.cues
    }

    /// Ids of the assistant replies, in firing order.
    pub fn reply_ids(&self) -> Vec<&str> {
        let mut cues: Vec<&Cue> = self.cues.iter().collect();
        cues.sort_by_key(|c| c.at);
        cues.iter()
            .filter_map(|c| match &c.effect {
                Effect::Reply(m) => Some(m.id.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Follow-ups that may only fire once per visit to a context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScenarioFlags {
    pub agent_follow_up_triggered: bool,
    pub data_summary_requested: bool,
}

/// The message a context opens with.
pub fn greeting(context: NavContext) -> Message {
    match context {
        NavContext::Agent => agent::greeting(),
        NavContext::Products => products::greeting(),
        NavContext::Assets => assets::greeting(),
        NavContext::Marketing => marketing::greeting(),
        NavContext::Diagnosis => diagnosis::greeting(),
        NavContext::Settings => Message::assistant(
            "welcome-default",
            "您好！我是您的抖音来客智能经营顾问。我可以为您分析店铺数据、生成营销素材或提供推广建议。请问今天需要什么帮助？",
        ),
    }
}

/// Route a widget action to the script of `context`. Actions a script does not
/// expect yield an empty timeline.
pub fn dispatch(context: NavContext, flags: &mut ScenarioFlags, action: &WidgetAction) -> Timeline {
    let timeline = match context {
        NavContext::Agent => agent::handle(flags, action),
        NavContext::Products => products::handle(action),
        NavContext::Assets => assets::handle(flags, action),
        NavContext::Marketing => marketing::handle(action),
        NavContext::Diagnosis => diagnosis::handle(action),
        NavContext::Settings => Timeline::new(),
    };
    debug!(
        context = context.as_str(),
        action = action.action.as_str(),
        cues = timeline.len(),
        "dispatched widget action"
    );
    timeline
}

/// Play a timeline in real time, handing each effect to `deliver` when due.
/// Stops early when `deliver` returns false (receiver gone).
pub async fn play<F>(timeline: Timeline, mut deliver: F)
where
    F: FnMut(Effect) -> bool,
{
    let start = tokio::time::Instant::now();
    for cue in timeline.into_cues() {
        tokio::time::sleep_until(start + cue.at).await;
        if !deliver(cue.effect) {
            break;
        }
    }
}
