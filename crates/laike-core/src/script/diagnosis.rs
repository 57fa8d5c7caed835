//! Morning inspection: an ad cost alert and three one-click fixes.

use super::Timeline;
use crate::state::Message;
use crate::widget::{Action, DiagnosisIcon, DiagnosisItem, Widget, WidgetAction};

pub(super) fn greeting() -> Message {
    Message::assistant(
        "welcome-diagnosis",
        "早上好，李老板！您的AI助手已完成昨日经营巡检，发现一个**高优待办**，请及时处理：",
    )
    .with_widget(Widget::DiagnosisAlert)
}

pub(super) fn handle(action: &WidgetAction) -> Timeline {
    match action.action {
        Action::DiagnosisAnalyze => Timeline::new()
            .user(0, "成本怎么突然高了这么多？什么原因？")
            .thinking(
                0,
                1500,
                Message::assistant(
                    "diagnosis-detail",
                    "正在分析... AI定位到主要原因是：\n\n1. **素材衰退**：视频素材「热闹排队氛围」已投放15天，点击率下降20%，用户可能已产生审美疲劳。\n2. **出价不合理**：在“23:00-凌晨2:00”的夜宵时段，流量竞争少，但您的出价仍维持高峰期水平，导致成本浪费。\n\n我为您生成了智能诊断与优化方案：",
                )
                .with_widget(Widget::diagnosis_card(fix_items())),
            ),
        Action::DiagnosisAllApplied => Timeline::new().reply(
            800,
            Message::assistant(
                "diagnosis-success",
                "👍 全部采纳成功！\n\n- 广告计划已更新素材。\n- 分时出价策略已生效。\n- 商品详情页已补充新卖点。\n\nAI将持续监控优化效果，并在下周的经营周报中向您重点分析。祝您今天生意兴隆！",
            ),
        ),
        // Single items only change the card itself.
        _ => Timeline::new(),
    }
}

fn fix_items() -> Vec<DiagnosisItem> {
    vec![
        DiagnosisItem {
            id: "fix_material".to_string(),
            icon: DiagnosisIcon::Video,
            title: "问题1：素材衰退".to_string(),
            problem: "视频「热闹排队氛围」已进入衰退期。".to_string(),
            suggestion: "替换为高潜力视频「新品和牛展示」（AI评分A级，互动率高50%）。".to_string(),
            preview: Some("预览新素材视频.mp4".to_string()),
            action_label: "一键替换并暂停旧素材".to_string(),
        },
        DiagnosisItem {
            id: "fix_bid".to_string(),
            icon: DiagnosisIcon::Dollar,
            title: "问题2：出价不合理".to_string(),
            problem: "夜宵时段出价过高，存在优化空间。".to_string(),
            suggestion: "启用“分时段出价”，将“23:00-凌晨2:00”时段出价下调20%。".to_string(),
            preview: None,
            action_label: "采纳分时出价建议".to_string(),
        },
        DiagnosisItem {
            id: "fix_highlight".to_string(),
            icon: DiagnosisIcon::Bulb,
            title: "附：新发现的口碑亮点！".to_string(),
            problem: "15条好评提及“自助冰淇淋很好吃”。".to_string(),
            suggestion: "将“不限量供应哈根达斯风味冰淇淋”加入商品详情页，提升转化。".to_string(),
            preview: None,
            action_label: "一键添加至详情页".to_string(),
        },
    ]
}
