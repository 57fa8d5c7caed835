//! Promotion walkthrough for a pour-over coffee voucher, including two
//! simulated jumps forward in time.

use super::Timeline;
use crate::state::Message;
use crate::widget::{Action, OptionButton, Widget, WidgetAction};

pub(super) fn greeting() -> Message {
    Message::assistant(
        "welcome-marketing",
        "好的，老李！很高兴能帮您。我是您的AI营销管家。\n\n听说您这周新推出了一个“手冲咖啡体验券”活动，能详细说说吗？我们一起来制定推广计划！",
    )
    .with_widget(Widget::options(
        Action::MarketingStart,
        vec![OptionButton::primary("开始“手冲咖啡”推广Demo", "start_demo")],
    ))
}

pub(super) fn handle(action: &WidgetAction) -> Timeline {
    match action.action {
        Action::MarketingStart => Timeline::new()
            .user(
                0,
                "AI管家，我又来找你了！我这周新推出了一个“手冲咖啡体验券”的活动，原价78块的体验，现在只要39块9。我想让更多我们店附近的新客人知道这个活动，周末能多来我们店里喝杯咖啡就好了。",
            )
            .thinking(
                0,
                1500,
                Message::assistant(
                    "budget-ask",
                    "好的，老李！“手冲咖啡体验券”听起来很棒，价格也很有吸引力。为了更好地为您制定推广计划，我需要先了解几个小问题：\n\n您大概想花多少钱做这次推广呢？比如，您对这次活动的总预算大概是多少？",
                )
                .with_widget(Widget::options(
                    Action::BudgetAnswer,
                    vec![
                        OptionButton::primary("预算2000元", "2000"),
                        OptionButton::plain("预算5000元", "5000"),
                    ],
                )),
            ),
        Action::BudgetAnswer => Timeline::new()
            .user(0, "预算啊……嗯，我是想先投入2000块钱，看看效果怎么样。如果效果好，下次我可以再加钱。")
            .reply(
                1000,
                Message::assistant(
                    "duration-ask",
                    "好的，2000元的预算我记下了。那么，您希望这次推广大概持续多久呢？比如两周，还是一个月？",
                )
                .with_widget(Widget::options(
                    Action::DurationAnswer,
                    vec![
                        OptionButton::primary("2-3周", "2-3weeks"),
                        OptionButton::plain("1个月", "1month"),
                    ],
                )),
            ),
        Action::DurationAnswer => Timeline::new()
            .user(0, "两到三周吧，我希望能尽快看到效果，也想赶在咖啡的新鲜度最好的时候推广。")
            .reply(
                1000,
                Message::assistant(
                    "target-ask",
                    "明白。最后，也是最关键的问题：您希望吸引什么样的新客人到店呢？\n\n比如，是年轻人还是中年人？是附近的上班族朋友多一些，还是住家居民多一些？对咖啡有什么偏好之类的？",
                )
                .with_widget(Widget::options(
                    Action::TargetAnswer,
                    vec![
                        OptionButton::primary("25-40岁白领/居民", "white_collar"),
                        OptionButton::plain("大学生/年轻人", "students"),
                    ],
                )),
            ),
        Action::TargetAnswer => Timeline::new()
            .user(
                0,
                "嗯，我的咖啡比较讲究品质。目标客人应该是那种25到40岁、喜欢尝试新东西、注重生活品质的白领和居民吧，他们大部分人工作在附近，或者就住在我们店周边。",
            )
            .thinking(
                0,
                2500,
                Message::assistant(
                    "plan-proposal",
                    "谢谢老李！根据您提供的信息，我为您准备了一套详细的“新客引流增益”方案。方案包含了达人推荐、营销工具配置和周边广告投放，预计能帮您在两三周内带来至少50-80位新客的到店体验。您听听看：",
                )
                .with_widget(Widget::MarketingPlan),
            ),
        Action::ConfirmMarketingPlan => Timeline::new()
            .user(0, "嗯……方案听起来很专业，也挺全面的！有两个达人推荐，这点很好。那就按这个执行吧！")
            .reply(1500, Message::assistant("sim-1week", "⏳ (系统模拟：时间已过去一周...)"))
            .reply(
                2500,
                Message::assistant(
                    "optimize-report",
                    "老李您好！我是AI管家。我监测到您的“手冲咖啡体验券”推广活动，目前上线一周，数据表现非常积极（已核销新客65位！），但也发现了一些可以优化的点。\n\n抖音效果很好，但微信朋友圈的成本偏高（CPA ¥35）。建议您：",
                )
                .with_widget(Widget::OptimizationDecision),
            ),
        Action::OptimizeMarketing => {
            let user_line = if action.payload.value() == Some("stop_wechat") {
                "哇！才一周就65个新客了，这效率太高了！嗯，微信朋友圈的效果确实不太理想。既然抖音效果那么好，那就把朋友圈那地方的钱都加到抖音去吧，集中火力！"
            } else {
                "我觉得可以再试一下，帮我换个更吸引人的朋友圈素材吧。"
            };
            Timeline::new()
                .user(0, user_line)
                .reply(
                    1000,
                    Message::assistant(
                        "opt-confirm",
                        "好的老李！您的指令已收到。我已为您暂停了微信朋友圈广告，并将剩余预算全部追加到抖音本地生活广告中。",
                    ),
                )
                .reply(3000, Message::assistant("sim-final", "⏳ (系统模拟：活动结束，两周半后...)"))
                .reply(
                    4000,
                    Message::assistant(
                        "final-report",
                        "老李您好！“手冲咖啡体验券”推广活动已圆满结束，效果远超预期！🎉\n\n总计带来新客 165 位 (预期50-80位)，平均获客成本仅 ¥12.1。以下是完整报告：",
                    )
                    .with_widget(Widget::CampaignReport),
                )
        }
        Action::FinishReport => Timeline::new()
            .user(0, "太棒了，这效果没得说！下次有新活动还找你！")
            .reply(
                1000,
                Message::assistant(
                    "bye",
                    "谢谢老李的认可！您可以随时在“经营诊断”里查看留存数据，我们也准备好了针对这批新客的复购方案，随时恭候您的召唤！",
                ),
            ),
        _ => Timeline::new(),
    }
}
