use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use laike_core::cards;
use laike_core::widget::{Accent, DiagnosisIcon};
use laike_core::{Control, ControlKind, FormField, Message, NavContext, Role, Widget};
use crate::app::{App, FocusPane, InputMode};

const PRODUCT_TITLE: &str = "智能经营助手";
const BRAND: &str = "抖音来客";
const SHOP_NAME: &str = "甜心烘焙坊";
const SHOP_CERT: &str = "企业认证：餐饮/烘焙";
const DISCLAIMER: &str = "Agent生成内容仅供参考，请以实际经营数据为准。";
const ASSISTANT_NAME: &str = "来客 Agent";

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str, base: Style) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else { break };
        if end == 0 {
            // "****" is literal
            break;
        }
        if start > 0 {
            spans.push(Span::styled(rest[..start].to_string(), base));
        }
        spans.push(Span::styled(after[..end].to_string(), base.add_modifier(Modifier::BOLD)));
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), base));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

/// Rows `lines` occupy once wrapped to `width`.
fn wrapped_height(lines: &[Line<'static>], width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let rows = Paragraph::new(lines.to_vec())
        .wrap(Wrap { trim: false })
        .line_count(width);
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, chat_area] = Layout::horizontal([
        Constraint::Length(24),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_sidebar(app, frame, sidebar_area);
    render_chat(app, frame, chat_area);
    render_footer(app, frame, footer_area);

    if app.field_editor.is_some() {
        render_field_editor(app, frame, area);
    } else if app.show_api_key_input {
        render_api_key_input(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", PRODUCT_TITLE), Style::default().fg(Color::Cyan).bold()),
        Span::styled(" BETA ", Style::default().bg(Color::Blue).fg(Color::White)),
        Span::raw(" "),
        Span::styled(app.session.context().label(), Style::default().fg(Color::White)),
    ]);

    let key_status = if app.client.has_api_key() {
        Span::styled(format!("● {} ", app.client.model()), Style::default().fg(Color::Green))
    } else {
        Span::styled("○ 未配置 API Key (K) ", Style::default().fg(Color::Yellow))
    };
    let shop = Line::from(vec![
        key_status,
        Span::styled(format!(" {} ", SHOP_NAME), Style::default().fg(Color::White).bold()),
    ]);

    let style = Style::default().bg(Color::DarkGray);
    frame.render_widget(Paragraph::new(title).style(style), area);
    frame.render_widget(Paragraph::new(shop).style(style).alignment(Alignment::Right), area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let [nav_area, _, profile_area] = Layout::vertical([
        Constraint::Length(NavContext::all().len() as u16 + 2),
        Constraint::Min(0),
        Constraint::Length(4),
    ])
    .areas(area);

    app.sidebar_area = Some(nav_area);

    let focused = app.focus == FocusPane::Sidebar;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let active = app.session.context();

    let items: Vec<ListItem> = NavContext::all()
        .iter()
        .map(|context| {
            let (marker, style) = if *context == active {
                ("● ", Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default())
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(context.label(), style),
            ]))
        })
        .collect();

    let highlight = if focused {
        Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let nav = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(format!(" {} ", BRAND)),
        )
        .highlight_style(highlight);

    frame.render_stateful_widget(nav, nav_area, &mut app.nav_state);

    let profile = Paragraph::new(vec![
        Line::from(Span::styled(SHOP_NAME, Style::default().bold())),
        Line::from(Span::styled(SHOP_CERT, Style::default().fg(Color::DarkGray))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(profile, profile_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let chips = app.session.show_suggestions();
    let input_rows = app.input.split('\n').count().clamp(1, 4) as u16;

    let [transcript_area, chips_area, input_area, disclaimer_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(if chips { 2 } else { 0 }),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_transcript(app, frame, transcript_area);
    if chips {
        render_suggestions(app, frame, chips_area);
    }
    render_input(app, frame, input_area);

    let disclaimer = Paragraph::new(DISCLAIMER)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(disclaimer, disclaimer_area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let focused = app.focus == FocusPane::Transcript;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", app.session.context().label()));

    let inner = block.inner(area);
    app.chat_height = inner.height;

    let selected = if focused { app.selected_control.clone() } else { None };
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut selected_line = None;

    for message in app.session.messages() {
        let control = selected
            .as_ref()
            .filter(|s| s.message_id == message.id)
            .map(|s| s.index);
        if let Some(line) = push_message(&mut lines, message, control) {
            selected_line = Some(line);
        }
    }

    let streaming = app.session.messages().last().map_or(false, |m| m.streaming);
    if app.session.is_busy() && !streaming {
        lines.push(speaker_line(ASSISTANT_NAME, Color::Yellow, None));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat(app.animation_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("思考中{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let total = wrapped_height(&lines, inner.width);
    let max_scroll = total.saturating_sub(inner.height);
    if app.follow_bottom || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.follow_bottom = true;
    }

    if app.reveal_selection {
        app.reveal_selection = false;
        if let Some(line) = selected_line {
            let top = wrapped_height(&lines[..line], inner.width);
            if top < app.chat_scroll {
                app.chat_scroll = top;
            } else if top >= app.chat_scroll + inner.height {
                app.chat_scroll = (top + 1).saturating_sub(inner.height);
            }
            app.follow_bottom = app.chat_scroll >= max_scroll;
        }
    }

    let chat = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn speaker_line(name: &str, color: Color, time: Option<String>) -> Line<'static> {
    let mut spans = vec![Span::styled(
        name.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(time) = time {
        spans.push(Span::styled(format!("  {}", time), Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

/// Append one message; returns the line index of the selected control, if drawn.
fn push_message(
    lines: &mut Vec<Line<'static>>,
    message: &Message,
    selected: Option<usize>,
) -> Option<usize> {
    let (name, color) = match message.role {
        Role::User => ("你", Color::Cyan),
        Role::Assistant => (ASSISTANT_NAME, Color::Yellow),
    };
    lines.push(speaker_line(name, color, Some(message.time_label())));

    let mut body: Vec<Line<'static>> = message
        .text
        .lines()
        .map(|line| parse_markdown_line(line, Style::default()))
        .collect();
    if message.streaming {
        let cursor = Span::styled("▍", Style::default().fg(Color::Yellow));
        match body.last_mut() {
            Some(last) => last.spans.push(cursor),
            None => body.push(Line::from(cursor)),
        }
    }
    lines.extend(body);

    let mut selected_line = None;
    if let Some(widget) = &message.widget {
        let card = widget_card(widget, selected);
        let offset = lines.len();
        selected_line = card.selected_line.map(|l| offset + l);
        let rail = Span::styled("│ ", Style::default().fg(Color::DarkGray));
        for line in card.lines {
            let mut spans = vec![rail.clone()];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
    }

    lines.push(Line::default());
    selected_line
}

fn control_style(control: &Control, selected: bool) -> Style {
    if selected {
        Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else if control.active {
        Style::default().fg(Color::Green)
    } else if !control.enabled {
        Style::default().fg(Color::DarkGray)
    } else if control.primary {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn control_span(control: &Control, selected: bool) -> Span<'static> {
    let text = match control.kind {
        ControlKind::Button | ControlKind::Field(_) => format!("[ {} ]", control.label),
        ControlKind::Toggle => {
            format!("{} {}", if control.active { "[x]" } else { "[ ]" }, control.label)
        }
        ControlKind::Choice => {
            format!("{} {}", if control.active { "(•)" } else { "( )" }, control.label)
        }
    };
    Span::styled(text, control_style(control, selected))
}

fn accent_color(accent: Accent) -> Color {
    match accent {
        Accent::Red => Color::Red,
        Accent::Purple => Color::Magenta,
        Accent::Orange => Color::Rgb(255, 140, 0),
        Accent::Gray => Color::Gray,
        Accent::Blue => Color::Blue,
    }
}

/// Lines of a widget card, with the position of the selected control.
struct Card {
    lines: Vec<Line<'static>>,
    controls: Vec<Control>,
    selected: Option<usize>,
    selected_line: Option<usize>,
}

impl Card {
    fn new(widget: &Widget, selected: Option<usize>) -> Self {
        Self { lines: Vec::new(), controls: widget.controls(), selected, selected_line: None }
    }

    fn text(&mut self, text: impl Into<String>, style: Style) {
        self.lines.push(Line::from(Span::styled(text.into(), style)));
    }

    fn markdown(&mut self, text: &str) {
        self.lines.push(parse_markdown_line(text, Style::default()));
    }

    fn spans(&mut self, spans: Vec<Span<'static>>) {
        self.lines.push(Line::from(spans));
    }

    fn blank(&mut self) {
        self.lines.push(Line::default());
    }

    /// Controls `indices` side by side, after `prefix`.
    fn row(&mut self, prefix: Vec<Span<'static>>, indices: impl IntoIterator<Item = usize>) {
        let mut spans = prefix;
        for (n, i) in indices.into_iter().enumerate() {
            let Some(control) = self.controls.get(i) else { continue };
            if n > 0 {
                spans.push(Span::raw("  "));
            }
            let selected = self.selected == Some(i);
            if selected {
                self.selected_line = Some(self.lines.len());
            }
            spans.push(control_span(control, selected));
        }
        self.lines.push(Line::from(spans));
    }
}

fn muted() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn heading() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn widget_card(widget: &Widget, selected: Option<usize>) -> Card {
    let mut card = Card::new(widget, selected);

    match widget {
        Widget::DataBinding { .. } => {
            card.text("店铺数据同步", heading());
            card.row(vec![Span::styled("抖音账号  ", muted())], [0]);
            card.row(vec![Span::styled("美团商品  ", muted())], [1]);
        }
        Widget::MaterialSelection { .. } => {
            card.text("选择素材类型（可多选）", heading());
            card.row(Vec::new(), [0, 1]);
            card.row(Vec::new(), [2, 3]);
            card.row(Vec::new(), [4, 5]);
            card.row(Vec::new(), [6]);
        }
        Widget::UploadPrompt { sub, .. } => {
            card.row(vec![Span::raw("⬆ ")], [0]);
            card.text(sub.clone(), muted());
        }
        Widget::StyleSelection { styles } => {
            for (i, style) in styles.iter().enumerate() {
                card.row(
                    vec![Span::styled("■ ", Style::default().fg(accent_color(style.accent)))],
                    [i],
                );
                card.text(format!("    {}", style.desc), muted());
            }
        }
        Widget::CopySelection { options } => {
            for i in 0..options.len() {
                card.row(Vec::new(), [i]);
            }
        }
        Widget::ProductForm(_) => {
            card.text("商品类型", muted());
            card.row(Vec::new(), [0, 1, 2, 3]);
            card.text(FormField::Price.label(), muted());
            card.row(Vec::new(), [4]);
            card.text(FormField::Composition.label(), muted());
            card.row(Vec::new(), [5]);
            card.blank();
            card.row(Vec::new(), [6]);
        }
        Widget::Options { options, .. } => {
            card.row(Vec::new(), 0..options.len());
        }
        Widget::MarketingPlan => {
            let plan = &cards::MARKETING_PLAN;
            card.spans(vec![
                Span::styled(plan.title, heading()),
                Span::raw("  "),
                Span::styled(plan.budget, Style::default().fg(Color::Blue)),
            ]);
            for section in plan.sections {
                card.text(section.heading, Style::default().fg(Color::Blue).bold());
                for line in section.lines {
                    card.markdown(line);
                }
            }
            card.blank();
            card.row(Vec::new(), [0]);
        }
        Widget::OptimizationDecision => {
            for channel in &cards::OPTIMIZATION_CHANNELS {
                let cpa_color = if channel.healthy { Color::Green } else { Color::Red };
                card.spans(vec![
                    Span::styled(channel.channel, heading()),
                    Span::raw("  "),
                    Span::styled(format!("{} {}", channel.rate_label, channel.rate), muted()),
                    Span::raw("  "),
                    Span::styled(channel.cpa, Style::default().fg(cpa_color)),
                ]);
            }
            card.text(cards::OPTIMIZATION_PROMPT, muted());
            card.row(Vec::new(), [0]);
            card.row(Vec::new(), [1]);
        }
        Widget::CampaignReport => {
            let report = &cards::CAMPAIGN_REPORT;
            card.text(report.overline, muted());
            card.text(report.title, heading());
            card.spans(vec![
                Span::styled(format!("{} ", report.headline.label), muted()),
                Span::styled(report.headline.value, Style::default().fg(Color::Green).bold()),
            ]);
            let mut stats = Vec::new();
            for stat in report.stats {
                stats.push(Span::styled(format!("{} ", stat.label), muted()));
                stats.push(Span::styled(format!("{}   ", stat.value), heading()));
            }
            card.spans(stats);
            card.text(report.highlights_heading, heading());
            for highlight in report.highlights {
                card.markdown(&format!("• {}", highlight));
            }
            card.row(Vec::new(), [0]);
        }
        Widget::DiagnosisAlert => {
            let alert = &cards::DIAGNOSIS_ALERT;
            card.text(format!("⚠ {}", alert.title), Style::default().fg(Color::Red).bold());
            card.markdown(alert.body);
            card.row(Vec::new(), [0]);
        }
        Widget::DiagnosisCard { items, .. } => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    card.blank();
                }
                let icon = match item.icon {
                    DiagnosisIcon::Video => "🎬",
                    DiagnosisIcon::Dollar => "💰",
                    DiagnosisIcon::Bulb => "💡",
                };
                card.text(format!("{} {}", icon, item.title), heading());
                card.text(format!("问题：{}", item.problem), Style::default());
                card.text(format!("建议：{}", item.suggestion), Style::default().fg(Color::Green));
                if let Some(preview) = &item.preview {
                    card.text(format!("▶ {}", preview), Style::default().fg(Color::Blue));
                }
                card.row(Vec::new(), [i]);
            }
        }
        Widget::WeeklyReport { expanded } => {
            let report = &cards::WEEKLY_REPORT;
            card.spans(vec![
                Span::styled(report.title, heading()),
                Span::raw("  "),
                Span::styled(report.period, muted()),
            ]);
            card.text(report.greeting, Style::default());
            for stat in report.stats {
                card.spans(vec![
                    Span::styled(format!("{}  ", stat.label), muted()),
                    Span::styled(stat.value, heading()),
                ]);
            }
            if *expanded {
                for section in report.sections {
                    card.text(section.heading, Style::default().fg(Color::Blue).bold());
                    for line in section.lines {
                        card.markdown(line);
                    }
                }
            }
            // Rendered as a plain button rather than a checkbox
            if let Some(control) = card.controls.first_mut() {
                control.kind = ControlKind::Button;
            }
            card.row(Vec::new(), [0]);
        }
    }

    card
}

fn render_suggestions(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let mut spans = Vec::new();
    for (i, suggestion) in app.session.context().suggestions().iter().enumerate() {
        spans.push(Span::styled(format!(" {} ", i + 1), key_style));
        spans.push(Span::raw(format!(" {}  ", suggestion)));
    }
    let chips = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true });
    frame.render_widget(chips, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Input;
    let editing = focused && app.input_mode == InputMode::Editing;
    let border_color = if editing {
        Color::Yellow
    } else if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let title = if app.session.is_busy() { " 思考中... " } else { " 发送 " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);
    let inner = block.inner(area);

    if app.input.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            app.session.context().placeholder(),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(placeholder, area);
        if editing {
            frame.set_cursor_position((inner.x, inner.y));
        }
        return;
    }

    // Keep the cursor visible in both directions
    let before: String = app.input.chars().take(app.input_cursor).collect();
    let row = before.matches('\n').count() as u16;
    let current_line = before.rsplit('\n').next().unwrap_or_default();
    let col = Span::raw(current_line).width() as u16;
    let scroll_y = row.saturating_sub(inner.height.saturating_sub(1));
    let scroll_x = col.saturating_sub(inner.width.saturating_sub(1));

    let input = Paragraph::new(app.input.clone())
        .style(Style::default().fg(Color::Cyan))
        .block(block)
        .scroll((scroll_y, scroll_x));
    frame.render_widget(input, area);

    if editing {
        frame.set_cursor_position((inner.x + col - scroll_x, inner.y + row - scroll_y));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.focus {
        FocusPane::Sidebar => " 导航 ",
        FocusPane::Transcript => " 对话 ",
        FocusPane::Input => " 输入 ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        vec![
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    if app.field_editor.is_some() || app.show_api_key_input {
        hints.extend(hint("Enter", "保存"));
        hints.extend(hint("Esc", "取消"));
    } else {
        match (app.focus, app.input_mode) {
            (FocusPane::Input, InputMode::Editing) => {
                hints.extend(hint("Enter", "发送"));
                hints.extend(hint("Alt+Enter", "换行"));
                hints.extend(hint("Tab", "切换"));
                hints.extend(hint("Esc", "停止输入"));
            }
            (FocusPane::Input, InputMode::Normal) => {
                hints.extend(hint("i", "输入"));
                if app.session.show_suggestions() {
                    hints.extend(hint("1-4", "快捷提问"));
                }
            }
            (FocusPane::Sidebar, _) => {
                hints.extend(hint("j/k", "选择"));
                hints.extend(hint("Enter", "进入"));
            }
            (FocusPane::Transcript, _) => {
                hints.extend(hint("j/k", "控件"));
                hints.extend(hint("Enter", "操作"));
                hints.extend(hint("PgUp/PgDn", "滚动"));
            }
        }
        if app.input_mode == InputMode::Normal {
            hints.extend(hint("Tab", "切换"));
            hints.extend(hint("K", "API Key"));
            hints.extend(hint("q", "退出"));
        }
    }

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_field_editor(app: &App, frame: &mut Frame, area: Rect) {
    let Some(editor) = &app.field_editor else { return };

    let popup_area = centered_rect(area, 50, 6);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} ", editor.field.label()));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Enter 保存，Esc 取消").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let before: String = editor.input.chars().take(editor.cursor).collect();
    let col = Span::raw(before.as_str()).width() as u16;
    let scroll_x = col.saturating_sub(input_area.width.saturating_sub(1));

    let input = Paragraph::new(editor.input.clone())
        .style(Style::default().fg(Color::Cyan))
        .scroll((0, scroll_x));
    frame.render_widget(input, input_area);
    frame.set_cursor_position((input_area.x + col - scroll_x, input_area.y));
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(area, 60, 7);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Gemini API Key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("粘贴您的 API Key，Enter 保存，Esc 取消。")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);

    // Mask the key, showing the last 4 chars
    let char_count = app.api_key_input.chars().count();
    let display_text = if char_count <= 4 {
        "*".repeat(char_count)
    } else {
        let last_four: String = app.api_key_input.chars().skip(char_count - 4).collect();
        format!("{}...{}", "*".repeat((char_count - 4).min(20)), last_four)
    };
    let cursor_x = (display_text.chars().count() as u16).min(input_area.width);

    frame.render_widget(
        Paragraph::new(display_text).style(Style::default().fg(Color::Cyan)),
        input_area,
    );
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));

    let status = Paragraph::new(format!("{} characters", char_count))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, Rect::new(inner.x, inner.y + 4, inner.width, 1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use laike_core::{Config, Effect};
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(&Config::new(), tx)
    }

    /// Everything on screen with the padding cells of wide glyphs removed.
    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
            .replace(' ', "")
    }

    #[test]
    fn bold_markers_become_bold_spans() {
        let line = parse_markdown_line("发现一个**高优待办**，请及时处理", Style::default());
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].content, "高优待办");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));

        let unclosed = parse_markdown_line("a **b", Style::default());
        assert_eq!(unclosed.spans.len(), 1);
        assert_eq!(unclosed.spans[0].content, "a **b");
    }

    #[test]
    fn draws_chrome_and_greeting() {
        let mut app = app();
        let screen = screen(&mut app);
        assert!(screen.contains(PRODUCT_TITLE));
        assert!(screen.contains("BETA"));
        assert!(screen.contains(SHOP_NAME));
        assert!(screen.contains("Agent生成内容仅供参考"));
        assert!(screen.contains("绑定抖音号"));
        assert!(screen.contains("在此输入您的素材需求"));
    }

    #[test]
    fn busy_panel_shows_thinking() {
        let mut app = app();
        let epoch = app.session.epoch();
        app.apply_cue(epoch, Effect::Busy(true));
        assert!(screen(&mut app).contains("思考中."));
    }

    #[test]
    fn agent_page_offers_numbered_chips() {
        let mut app = app();
        app.select_context(NavContext::Agent);
        let screen = screen(&mut app);
        assert!(screen.contains("智能经营周报"));
        assert!(screen.contains("如何提升店铺动销率"));
    }

    #[test]
    fn selected_control_is_scrolled_into_view() {
        let mut app = app();
        app.select_context(NavContext::Diagnosis);
        app.focus = FocusPane::Transcript;
        app.focus_latest_control();
        screen(&mut app);
        assert!(!app.reveal_selection);
        assert!(app.follow_bottom);
    }
}
