use laike_core::script::ScenarioFlags;
use laike_core::widget::{FormField, Material, Payload};
use laike_core::{Effect, Message, NavContext, Role, Session, Timeline, Widget};

/// (offset in ms, what happens) for every cue, in firing order.
fn describe(timeline: &Timeline) -> Vec<(u128, String)> {
    timeline
        .clone()
        .into_cues()
        .into_iter()
        .map(|cue| {
            let what = match cue.effect {
                Effect::User(_) => "user".to_string(),
                Effect::Busy(true) => "busy".to_string(),
                Effect::Busy(false) => "idle".to_string(),
                Effect::Reply(m) => m.id,
            };
            (cue.at.as_millis(), what)
        })
        .collect()
}

fn expect(timeline: &Timeline, cues: &[(u128, &str)]) {
    let expected: Vec<(u128, String)> = cues.iter().map(|(t, w)| (*t, w.to_string())).collect();
    assert_eq!(describe(timeline), expected);
}

/// Apply every cue immediately, as if all timers had fired.
fn settle(session: &mut Session, timeline: Timeline) {
    let epoch = session.epoch();
    for cue in timeline.into_cues() {
        session.apply(epoch, cue.effect);
    }
}

fn last(session: &Session) -> &Message {
    session.messages().last().unwrap()
}

fn user_lines(session: &Session) -> Vec<&str> {
    session
        .messages()
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.text.as_str())
        .collect()
}

#[test]
fn every_context_opens_with_its_greeting() {
    let expected = [
        (NavContext::Agent, "welcome-agent", Some("smart-report")),
        (NavContext::Products, "welcome-products", Some("image-upload")),
        (NavContext::Assets, "welcome-assets", Some("data-binding")),
        (NavContext::Marketing, "welcome-marketing", Some("simple-options")),
        (NavContext::Diagnosis, "welcome-diagnosis", Some("diagnosis-alert")),
        (NavContext::Settings, "welcome-default", None),
    ];
    for (context, id, widget) in expected {
        let session = Session::new(context);
        assert_eq!(session.messages().len(), 1, "{:?}", context);
        let greeting = &session.messages()[0];
        assert_eq!(greeting.id, id);
        assert_eq!(greeting.role, Role::Assistant);
        assert_eq!(greeting.widget.as_ref().map(|w| w.kind_name()), widget);
    }
    assert!(Session::new(NavContext::Agent).messages()[0].text.is_empty());
}

#[test]
fn assets_walkthrough() {
    let mut session = Session::new(NavContext::Assets);

    let timeline = session.activate("welcome-assets", 0);
    expect(&timeline, &[(500, "user"), (1500, "data-summary")]);
    settle(&mut session, timeline);
    assert_eq!(user_lines(&session), vec!["已完成数据绑定"]);

    // The second binding does not repeat the summary.
    assert!(session.activate("welcome-assets", 1).is_empty());

    session.activate("data-summary", 0);
    session.activate("data-summary", 3);
    let timeline = session.activate("data-summary", Material::all().len());
    expect(&timeline, &[(0, "user"), (0, "busy"), (1500, "idle"), (1500, "copy-generation")]);
    settle(&mut session, timeline);
    assert_eq!(user_lines(&session)[1], "我选择了 2 种素材类型，开始生成吧！");
    assert!(!session.is_busy());

    let timeline = session.activate("copy-generation", 1);
    expect(&timeline, &[(0, "user"), (1000, "image-upload-req")]);
    settle(&mut session, timeline);

    let timeline = session.activate("image-upload-req", 0);
    expect(&timeline, &[(0, "user"), (0, "busy"), (2000, "idle"), (2000, "style-selection")]);
    settle(&mut session, timeline);

    let timeline = session.activate("style-selection", 1);
    expect(&timeline, &[(0, "user"), (0, "busy"), (1500, "idle"), (1500, "final-result")]);
    settle(&mut session, timeline);
    assert_eq!(user_lines(&session).last().copied(), Some("选二次元风，再加个“热销 TOP1”标签！"));
    assert!(last(&session).text.starts_with("✅ 已生成二次元风头图"));
}

#[test]
fn assets_start_button_stays_inert_without_selection() {
    let mut session = Session::new(NavContext::Assets);
    let timeline = session.activate("welcome-assets", 1);
    settle(&mut session, timeline);
    assert!(session.activate("data-summary", Material::all().len()).is_empty());
}

#[test]
fn products_walkthrough() {
    let mut session = Session::new(NavContext::Products);

    let timeline = session.activate("welcome-products", 0);
    expect(&timeline, &[(0, "user"), (0, "busy"), (1500, "idle"), (1500, "meituan-analysis")]);
    settle(&mut session, timeline);

    // "modify" has no scripted answer.
    assert!(session.activate("meituan-analysis", 1).is_empty());
    let timeline = session.activate("meituan-analysis", 0);
    expect(&timeline, &[(0, "user"), (1000, "menu-upload-req")]);
    settle(&mut session, timeline);

    let timeline = session.activate("menu-upload-req", 0);
    expect(&timeline, &[(0, "user"), (0, "busy"), (1500, "idle"), (1500, "menu-analysis")]);
    settle(&mut session, timeline);

    assert!(session.activate("menu-analysis", 1).is_empty());
    let timeline = session.activate("menu-analysis", 0);
    expect(&timeline, &[(0, "user"), (1500, "naming-proposal")]);
    settle(&mut session, timeline);

    // Only the differentiated name continues the script.
    assert!(session.activate("naming-proposal", 0).is_empty());
    let timeline = session.activate("naming-proposal", 1);
    expect(&timeline, &[(0, "user"), (0, "busy"), (2000, "idle"), (2000, "smart-decision-form")]);
    settle(&mut session, timeline);

    match &last(&session).widget {
        Some(Widget::ProductForm(config)) => {
            assert_eq!(config.product_type, "团购品");
            assert_eq!(config.price, "198");
        }
        other => panic!("expected product form, got {:?}", other),
    }
    session.activate("smart-decision-form", 2);
    assert!(session.set_field("smart-decision-form", FormField::Price, "188"));
    let timeline = session.activate("smart-decision-form", 6);
    expect(&timeline, &[(0, "user"), (1000, "style-selection-product")]);
    settle(&mut session, timeline);
    assert_eq!(user_lines(&session).last().copied(), Some("价格改成 188，商品类型选次卡，组合不变～"));
    assert!(last(&session).text.starts_with("已更新价格为 188 元，商品类型：次卡✅"));

    let timeline = session.activate("style-selection-product", 0);
    expect(&timeline, &[(0, "user"), (0, "busy"), (2000, "idle"), (2000, "copy-verify")]);
    settle(&mut session, timeline);
    assert!(last(&session).text.contains("【国潮风 3 人火锅套餐头图】"));

    let timeline = session.activate("copy-verify", 0);
    expect(&timeline, &[(0, "user"), (1000, "hosting-offer")]);
    settle(&mut session, timeline);

    assert!(session.activate("hosting-offer", 0).is_empty());
    let timeline = session.activate("hosting-offer", 1);
    expect(&timeline, &[(0, "user"), (1500, "single-items-offer")]);
    settle(&mut session, timeline);

    assert!(session.activate("single-items-offer", 1).is_empty());
    let timeline = session.activate("single-items-offer", 0);
    expect(&timeline, &[(0, "user"), (0, "busy"), (2000, "idle"), (2000, "final-singles-confirm")]);
    settle(&mut session, timeline);

    let timeline = session.activate("final-singles-confirm", 0);
    expect(&timeline, &[(0, "user"), (1000, "done")]);
    settle(&mut session, timeline);
    assert_eq!(last(&session).id, "done");
}

#[test]
fn marketing_walkthrough() {
    let mut session = Session::new(NavContext::Marketing);

    let timeline = session.activate("welcome-marketing", 0);
    expect(&timeline, &[(0, "user"), (0, "busy"), (1500, "idle"), (1500, "budget-ask")]);
    settle(&mut session, timeline);

    let timeline = session.activate("budget-ask", 0);
    expect(&timeline, &[(0, "user"), (1000, "duration-ask")]);
    settle(&mut session, timeline);

    let timeline = session.activate("duration-ask", 0);
    expect(&timeline, &[(0, "user"), (1000, "target-ask")]);
    settle(&mut session, timeline);

    let timeline = session.activate("target-ask", 0);
    expect(&timeline, &[(0, "user"), (0, "busy"), (2500, "idle"), (2500, "plan-proposal")]);
    settle(&mut session, timeline);

    let timeline = session.activate("plan-proposal", 0);
    expect(&timeline, &[(0, "user"), (1500, "sim-1week"), (2500, "optimize-report")]);
    settle(&mut session, timeline);

    let timeline = session.activate("optimize-report", 0);
    expect(
        &timeline,
        &[(0, "user"), (1000, "opt-confirm"), (3000, "sim-final"), (4000, "final-report")],
    );
    settle(&mut session, timeline);
    assert!(user_lines(&session).last().unwrap().contains("集中火力"));

    let timeline = session.activate("final-report", 0);
    expect(&timeline, &[(0, "user"), (1000, "bye")]);
    settle(&mut session, timeline);
    assert_eq!(last(&session).id, "bye");
}

#[test]
fn marketing_creative_swap_uses_its_own_user_line() {
    let mut session = Session::new(NavContext::Marketing);
    let timeline = session.dispatch(&laike_core::WidgetAction::with_value(
        laike_core::Action::OptimizeMarketing,
        "change_creative",
    ));
    settle(&mut session, timeline);
    assert_eq!(user_lines(&session), vec!["我觉得可以再试一下，帮我换个更吸引人的朋友圈素材吧。"]);
}

#[test]
fn diagnosis_walkthrough() {
    let mut session = Session::new(NavContext::Diagnosis);

    let timeline = session.activate("welcome-diagnosis", 0);
    expect(&timeline, &[(0, "user"), (0, "busy"), (1500, "idle"), (1500, "diagnosis-detail")]);
    settle(&mut session, timeline);

    assert!(session.activate("diagnosis-detail", 0).is_empty());
    assert!(session.activate("diagnosis-detail", 0).is_empty());
    assert!(session.activate("diagnosis-detail", 2).is_empty());
    let timeline = session.activate("diagnosis-detail", 1);
    expect(&timeline, &[(800, "diagnosis-success")]);
    settle(&mut session, timeline);
    assert!(last(&session).text.starts_with("👍 全部采纳成功！"));
}

#[test]
fn agent_follow_up_fires_once_per_visit() {
    let mut session = Session::new(NavContext::Agent);
    assert!(session.show_suggestions());

    let timeline = session.activate("welcome-agent", 0);
    expect(&timeline, &[(800, "agent-followup")]);
    settle(&mut session, timeline);
    assert!(session.flags().agent_follow_up_triggered);

    // Collapse and expand again: no second follow-up.
    assert!(session.activate("welcome-agent", 0).is_empty());
    assert!(session.activate("welcome-agent", 0).is_empty());

    session.select_context(NavContext::Settings);
    session.select_context(NavContext::Agent);
    assert_eq!(session.flags(), ScenarioFlags::default());
    expect(&session.activate("welcome-agent", 0), &[(800, "agent-followup")]);
}

#[test]
fn suggestions_disappear_once_the_chat_grows() {
    let mut session = Session::new(NavContext::Agent);
    session.begin_turn("如何提升店铺动销率？").unwrap();
    assert!(!session.show_suggestions());
    assert!(!Session::new(NavContext::Marketing).show_suggestions());
}

#[test]
fn context_switch_resets_assets_binding() {
    let mut session = Session::new(NavContext::Assets);
    let timeline = session.activate("welcome-assets", 0);
    assert!(session.flags().data_summary_requested);

    session.select_context(NavContext::Marketing);
    // The timeline from the old visit arrives late and is ignored.
    let stale_epoch = session.epoch() - 1;
    for cue in timeline.into_cues() {
        assert!(!session.apply(stale_epoch, cue.effect));
    }
    assert_eq!(session.messages().len(), 1);

    session.select_context(NavContext::Assets);
    assert!(!session.flags().data_summary_requested);
    assert!(!session.activate("welcome-assets", 0).is_empty());
}

#[test]
fn scripted_thinking_blocks_free_form_turns() {
    let mut session = Session::new(NavContext::Marketing);
    let epoch = session.epoch();
    let cues = session.activate("welcome-marketing", 0).into_cues();
    let (now, later): (Vec<_>, Vec<_>) = cues.into_iter().partition(|c| c.at.is_zero());
    for cue in now {
        session.apply(epoch, cue.effect);
    }
    assert!(session.is_busy());
    let before = session.messages().len();
    assert!(session.begin_turn("你好").is_none());
    assert_eq!(session.messages().len(), before);

    for cue in later {
        session.apply(epoch, cue.effect);
    }
    assert!(session.begin_turn("你好").is_some());
}

#[test]
fn scripted_pause_does_not_unlock_a_streaming_turn() {
    let mut session = Session::new(NavContext::Marketing);
    let turn = session.begin_turn("你好").unwrap();
    assert_eq!(session.streaming_reply(), Some(turn.reply_id.as_str()));

    // A card is clicked mid-stream and its whole pause plays out.
    let timeline = session.activate("welcome-marketing", 0);
    settle(&mut session, timeline);
    assert!(!session.is_thinking());
    assert!(session.is_busy());

    let before = session.messages().len();
    assert!(session.begin_turn("第二个问题").is_none());
    assert_eq!(session.messages().len(), before);

    session.finish_turn(&turn.reply_id);
    assert!(!session.is_busy());
    assert!(session.begin_turn("第二个问题").is_some());
}

#[test]
fn finished_stream_keeps_a_scripted_pause() {
    let mut session = Session::new(NavContext::Marketing);
    let epoch = session.epoch();
    let turn = session.begin_turn("你好").unwrap();

    let cues = session.activate("welcome-marketing", 0).into_cues();
    let (now, later): (Vec<_>, Vec<_>) = cues.into_iter().partition(|c| c.at.is_zero());
    for cue in now {
        session.apply(epoch, cue.effect);
    }
    session.finish_turn(&turn.reply_id);
    assert!(session.is_thinking());
    assert!(session.begin_turn("再问一个").is_none());

    for cue in later {
        session.apply(epoch, cue.effect);
    }
    assert!(!session.is_busy());
}

#[test]
fn replayed_card_gets_its_own_key() {
    let mut session = Session::new(NavContext::Diagnosis);
    for _ in 0..2 {
        let timeline = session.activate("welcome-diagnosis", 0);
        settle(&mut session, timeline);
    }

    let cards: Vec<String> = session
        .messages()
        .iter()
        .filter(|m| m.id.starts_with("diagnosis-detail"))
        .map(|m| m.id.clone())
        .collect();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0], "diagnosis-detail");
    assert_ne!(cards[0], cards[1]);

    // The second copy works on its own.
    assert!(session.activate(&cards[1], 0).is_empty());
    assert!(session.activate(&cards[1], 2).is_empty());
    expect(&session.activate(&cards[1], 1), &[(800, "diagnosis-success")]);

    // And the first one was left untouched.
    assert!(session.activate(&cards[0], 0).is_empty());
    assert!(session.activate(&cards[0], 2).is_empty());
    expect(&session.activate(&cards[0], 1), &[(800, "diagnosis-success")]);
}

#[test]
fn failed_stream_ends_with_fallback() {
    let mut session = Session::new(NavContext::Settings);
    let turn = session.begin_turn("帮我写一段火锅套餐的推广文案").unwrap();
    session.push_fragment(&turn.reply_id, "好的，");
    session.push_fragment(&turn.reply_id, laike_core::FALLBACK_MESSAGE);
    session.finish_turn(&turn.reply_id);

    let reply = last(&session);
    assert_eq!(reply.id, turn.reply_id);
    assert!(reply.text.ends_with(laike_core::FALLBACK_MESSAGE));
    assert!(!reply.streaming);
    assert!(!session.is_busy());
}

#[test]
fn material_payload_reaches_the_script() {
    let mut session = Session::new(NavContext::Assets);
    let action = laike_core::WidgetAction {
        action: laike_core::Action::ConfirmMaterials,
        payload: Payload::Materials(vec![Material::Copy, Material::Video, Material::Live]),
    };
    let timeline = session.dispatch(&action);
    settle(&mut session, timeline);
    assert_eq!(user_lines(&session), vec!["我选择了 3 种素材类型，开始生成吧！"]);
}
