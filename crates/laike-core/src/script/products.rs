//! Product listing walkthrough: moving a hot-pot set over from Meituan.

use super::Timeline;
use crate::state::Message;
use crate::widget::{Accent, Action, CopyOption, OptionButton, Payload, StyleOption, Widget, WidgetAction};

const SET_COMPOSITION: &str = "毛肚 1 + 肥牛 1 + 鲜切吊龙 1 + 响铃卷 1 + 蔬菜拼盘 1";

pub(super) fn greeting() -> Message {
    Message::assistant(
        "welcome-products",
        "收到需求啦😊 您可先上传美团商品截图快速搬品，或直接描述需求～",
    )
    .with_widget(Widget::upload("上传美团截图", "支持商品详情页截图", Action::UploadMeituan))
}

pub(super) fn handle(action: &WidgetAction) -> Timeline {
    let value = action.payload.value();
    match (action.action, value) {
        (Action::UploadMeituan, _) => Timeline::new()
            .user(0, "[用户上传了美团“经典3人火锅套餐”截图]")
            .thinking(
                0,
                1500,
                Message::assistant(
                    "meituan-analysis",
                    "正在识别美团信息→商品名称：经典 3 人火锅套餐，价格：168 元，组合：毛肚 1 份 + 肥牛 1 份 + 蔬菜拼盘 1 份。\n\n需自动匹配抖音来客“火锅”类目 +“团购品”模板吗？",
                )
                .with_widget(Widget::options(
                    Action::ConfirmMatch,
                    vec![
                        OptionButton::primary("确认匹配", "confirm"),
                        OptionButton::plain("修改类目/模板", "modify"),
                    ],
                )),
            ),
        (Action::ConfirmMatch, Some("confirm")) => Timeline::new()
            .user(0, "确认匹配～另外我还有张线下菜单，想把新品类的菜加进去。")
            .reply(
                1000,
                Message::assistant(
                    "menu-upload-req",
                    "没问题～【上传菜单图片】按钮已就绪，您可直接上传，我帮您拆解菜品信息～",
                )
                .with_widget(Widget::upload("上传菜单图片", "支持拍照或图片文件", Action::UploadMenu)),
            ),
        (Action::UploadMenu, _) => Timeline::new()
            .user(0, "[用户上传了菜单图片]")
            .thinking(
                0,
                1500,
                Message::assistant(
                    "menu-analysis",
                    "菜单识别完成→鲜切吊龙（58 元 / 大份）、响铃卷（12 元 / 份）。需将这些菜品加入新套餐的子商品吗？",
                )
                .with_widget(Widget::options(
                    Action::AddToSetDecision,
                    vec![
                        OptionButton::primary("添加至新套餐", "add"),
                        OptionButton::plain("单独创建商品", "separate"),
                    ],
                )),
            ),
        (Action::AddToSetDecision, Some("add")) => Timeline::new()
            .user(0, "添加到新套餐里，我想做个 3 人套餐，包含毛肚、肥牛、鲜切吊龙、响铃卷、蔬菜拼盘～")
            .reply(
                1500,
                Message::assistant(
                    "naming-proposal",
                    "明白～已拆解需求：3 人火锅套餐，子商品：毛肚 1 + 肥牛 1 + 鲜切吊龙 1 + 响铃卷 1 + 蔬菜拼盘 1。\n\n为您生成商品名称候选：",
                )
                .with_widget(Widget::CopySelection {
                    options: vec![
                        CopyOption::new("copy", "热卖复刻", "经典 3 人火锅套餐（同步美团款）"),
                        CopyOption::new("diff", "差异化升级", "鲜切吊龙版 3 人火锅套餐（含新品类）"),
                    ],
                }),
            ),
        (Action::SelectCopy, Some("diff")) => Timeline::new()
            .user(0, "想要差异化的，结合秋冬滋补的热点～")
            .thinking(
                0,
                2000,
                Message::assistant(
                    "smart-decision-form",
                    "好的～为您生成差异化名称：【秋冬滋补】鲜切吊龙 + 毛肚肥牛 3 人火锅套餐。\n\n根据您门店近 30 天 GMV（20 万）、库存（毛肚备货充足）、客单价（180 元），推荐信息如下，请确认：",
                )
                .with_widget(Widget::product_form("团购品", 198, SET_COMPOSITION)),
            ),
        (Action::ConfirmProductConfig, _) => {
            let Payload::Product(config) = &action.payload else {
                return Timeline::new();
            };
            Timeline::new()
                .user(
                    0,
                    format!("价格改成 {}，商品类型选{}，组合不变～", config.price, config.product_type),
                )
                .reply(
                    1000,
                    Message::assistant(
                        "style-selection-product",
                        format!(
                            "已更新价格为 {} 元，商品类型：{}✅\n\n现在为您生成头图～您喜欢哪种风格？",
                            config.price, config.product_type
                        ),
                    )
                    .with_widget(Widget::StyleSelection { styles: header_styles() }),
                )
        }
        (Action::SelectStyle, Some(style)) => Timeline::new()
            .user(0, format!("选{}～", style))
            .thinking(
                0,
                2000,
                Message::assistant(
                    "copy-verify",
                    format!(
                        "头图生成中→【{} 3 人火锅套餐头图】已完成～\n\n文案部分，结合用户评价高频需求“上菜快”，为您生成卖点：“30 分钟上齐菜，鲜切吊龙 + 毛肚肥牛，秋冬滋补必囤🔥”。\n\n需要调整文案风格或卖点吗？",
                        style
                    ),
                )
                .with_widget(Widget::options(
                    Action::VerifyCopy,
                    vec![
                        OptionButton::primary("确认文案", "confirm"),
                        OptionButton::plain("更换卖点方向", "change"),
                    ],
                )),
            ),
        (Action::VerifyCopy, _) => Timeline::new()
            .user(0, "确认文案，卖点挺好的～")
            .reply(
                1000,
                Message::assistant(
                    "hosting-offer",
                    "商品配置已全部完成✅ 您可选择：\n\n① 立即发布（审核后上架）\n② 加入商品托管（我会监控货架套餐数，若＜4 个，自动基于近 7 天热销品生成新商品，您可选择“审核后发布”或“全托管”~）",
                )
                .with_widget(Widget::options(
                    Action::HostingDecision,
                    vec![
                        OptionButton::plain("立即发布", "publish"),
                        OptionButton::primary("发布并开启托管", "publish_hosting"),
                    ],
                )),
            ),
        (Action::HostingDecision, Some("publish_hosting")) => Timeline::new()
            .user(0, "先发布这个套餐，托管功能也开启吧～")
            .reply(
                1500,
                Message::assistant(
                    "single-items-offer",
                    "已帮您发布“【秋冬滋补】鲜切吊龙 + 毛肚肥牛 3 人火锅套餐”，托管功能已开启～\n\n您上传的菜单已识别出“鲜切吊龙、响铃卷”，是否需要将它们单独创建为“单点菜品”？",
                )
                .with_widget(Widget::options(
                    Action::CreateSingles,
                    vec![
                        OptionButton::primary("是，单独创建", "yes"),
                        OptionButton::plain("否", "no"),
                    ],
                )),
            ),
        (Action::CreateSingles, Some("yes")) => Timeline::new()
            .user(0, "是，单独创建～")
            .thinking(
                0,
                2000,
                Message::assistant(
                    "final-singles-confirm",
                    "正在生成单点菜品信息→鲜切吊龙（58 元 / 大份）、响铃卷（12 元 / 份），头图已自动匹配“火锅菜品特写”风格。需要确认发布吗？",
                )
                .with_widget(Widget::options(
                    Action::FinishProcess,
                    vec![
                        OptionButton::primary("确认发布", "confirm"),
                        OptionButton::plain("修改价格/图片", "modify"),
                    ],
                )),
            ),
        (Action::FinishProcess, _) => Timeline::new()
            .user(0, "确认发布～")
            .reply(
                1000,
                Message::assistant(
                    "done",
                    "所有操作已完成✅ 您的 3 人套餐和 2 个单点菜品已上架～\n\n后续我会自动监控货架，若套餐数＜4 个，会基于近 7 天热销品生成新商品并提醒您审核哦～",
                ),
            ),
        _ => Timeline::new(),
    }
}

fn header_styles() -> Vec<StyleOption> {
    vec![
        StyleOption::new("guochao", "国潮风", "火锅场景 + 菜品特写，带“秋冬滋补”字样", Accent::Red),
        StyleOption::new("simple", "简约风", "白底 + 菜品摆盘，突出价格", Accent::Gray),
        StyleOption::new("3d", "动态 3D", "360° 旋转展示菜品", Accent::Blue),
    ]
}
