use super::{ScenarioFlags, Timeline};
use crate::state::Message;
use crate::widget::{Action, Widget, WidgetAction};

/// The agent opens with the weekly report card and no text of its own.
pub(super) fn greeting() -> Message {
    Message::assistant("welcome-agent", "").with_widget(Widget::weekly_report())
}

pub(super) fn handle(flags: &mut ScenarioFlags, action: &WidgetAction) -> Timeline {
    if action.action != Action::ReportExpanded || flags.agent_follow_up_triggered {
        return Timeline::new();
    }
    flags.agent_follow_up_triggered = true;
    Timeline::new().reply(
        800,
        Message::assistant(
            "agent-followup",
            "李老板，看到您的复购率是短板，且跨年季是巨大机会。对于下个月的经营，有什么新目标吗？",
        ),
    )
}
