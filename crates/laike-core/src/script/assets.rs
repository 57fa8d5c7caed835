//! Material generation walkthrough: moon-rabbit lava cake for the Mid-Autumn festival.

use super::{ScenarioFlags, Timeline};
use crate::state::Message;
use crate::widget::{Accent, Action, CopyOption, Payload, StyleOption, Widget, WidgetAction};

pub(super) fn greeting() -> Message {
    Message::assistant(
        "welcome-assets",
        "我是您的素材生成助手。为了更精准地为您的商品生成全链路素材（视频、文案、直播话术），我需要先整合店铺数据。\n\n请您完成以下基础信息同步：",
    )
    .with_widget(Widget::data_binding())
}

pub(super) fn handle(flags: &mut ScenarioFlags, action: &WidgetAction) -> Timeline {
    match action.action {
        Action::BindDouyin | Action::BindMeituan => {
            // Either binding completes the sync; the summary is only produced once.
            if flags.data_summary_requested {
                return Timeline::new();
            }
            flags.data_summary_requested = true;
            Timeline::new()
                .user(500, "已完成数据绑定")
                .reply(1500, data_summary())
        }
        Action::ConfirmMaterials => {
            let count = match &action.payload {
                Payload::Materials(selected) => selected.len(),
                _ => 0,
            };
            Timeline::new()
                .user(0, format!("我选择了 {} 种素材类型，开始生成吧！", count))
                .thinking(0, 1500, copy_generation())
        }
        Action::SelectCopy => Timeline::new()
            .user(0, "我选这个文案方向，结合评价里的“流心爆浆”！")
            .reply(
                1000,
                Message::assistant(
                    "image-upload-req",
                    "明白！文案已锁定。\n\n接下来处理图片素材。请上传您的蛋糕实拍图，我将为您美化并生成不同风格的营销头图。",
                )
                .with_widget(Widget::upload("点击上传产品原图", "支持 JPG, PNG (最大 5MB)", Action::UploadImage)),
            ),
        Action::UploadImage => Timeline::new()
            .user(0, "[用户上传了一张蛋糕切面图片]")
            .thinking(
                0,
                2000,
                Message::assistant("style-selection", "图片识别完成～为您生成 3 版风格化头图，请选择：")
                    .with_widget(Widget::StyleSelection { styles: festive_styles() }),
            ),
        Action::SelectStyle => {
            let Some(style) = action.payload.value() else {
                return Timeline::new();
            };
            Timeline::new()
                .user(0, format!("选{}，再加个“热销 TOP1”标签！", style))
                .thinking(
                    0,
                    1500,
                    Message::assistant(
                        "final-result",
                        format!(
                            "✅ 已生成{}头图\n✅ 自动叠加“热销 TOP1”标签（弱样式，适配独立卡）\n✅ 硬广卡已配置“限时 5 折”闪烁标签\n\n全套素材已打包发送至您的【素材中心】，可直接一键投放！",
                            style
                        ),
                    ),
                )
        }
        _ => Timeline::new(),
    }
}

fn data_summary() -> Message {
    Message::assistant(
        "data-summary",
        "数据整合完成✅ 素材库基础信息：\n\n- 商品：月兔流心蛋糕（39.9 元 / 个，6 寸，流心奶黄 + 玉兔造型）\n- 核心卖点：中秋限定、流心爆浆、玉兔造型\n- 历史爆款逻辑：抖音 1.2w 播放视频（突出‘流心爆浆’特写）、美团评价‘氛围感拉满’\n\n现在为您生成全链路素材，请选择需要生成的类型：",
    )
    .with_widget(Widget::material_selection())
}

fn copy_generation() -> Message {
    Message::assistant(
        "copy-generation",
        "收到～先处理文案。已结合行业热词“中秋限定” + 商品卖点，生成以下多场景文案候选。请选择您喜欢的方向：",
    )
    .with_widget(Widget::CopySelection {
        options: vec![
            CopyOption::new("1", "大众化", "月兔流心蛋糕 39.9！中秋氛围感拉满（参考历史爆款）"),
            CopyOption::new("2", "家庭用户", "亲子 DIY！月兔流心蛋糕，中秋陪娃做甜点"),
            CopyOption::new("3", "年轻用户", "网红打卡！爆浆月兔蛋糕，朋友圈 C 位预定"),
        ],
    })
}

fn festive_styles() -> Vec<StyleOption> {
    vec![
        StyleOption::new("guochao", "国潮风", "中秋灯笼背景 + 强节日氛围", Accent::Red),
        StyleOption::new("anime", "二次元风", "Q版月兔 + 爆浆预警文字", Accent::Purple),
        StyleOption::new("real", "实景风", "高清切面 + 突出食欲感", Accent::Orange),
    ]
}
