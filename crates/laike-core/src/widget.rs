//! Rich cards attached to assistant messages.
//!
//! A widget owns its local interaction state (bound flags, selections, form
//! fields, accepted items). Front ends walk its [`Control`]s and call
//! [`Widget::activate`]; any resulting [`WidgetAction`] goes to the scenario
//! dispatcher.

use serde::{Deserialize, Serialize};

/// Action identifiers emitted by widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Assets
    BindDouyin,
    BindMeituan,
    ConfirmMaterials,
    SelectCopy,
    UploadImage,
    SelectStyle,
    // Products
    UploadMeituan,
    ConfirmMatch,
    UploadMenu,
    AddToSetDecision,
    ConfirmProductConfig,
    VerifyCopy,
    HostingDecision,
    CreateSingles,
    FinishProcess,
    // Marketing
    MarketingStart,
    BudgetAnswer,
    DurationAnswer,
    TargetAnswer,
    ConfirmMarketingPlan,
    OptimizeMarketing,
    FinishReport,
    // Diagnosis
    DiagnosisAnalyze,
    DiagnosisItemApplied,
    DiagnosisAllApplied,
    // Agent
    ReportExpanded,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::BindDouyin => "bind_douyin",
            Action::BindMeituan => "bind_meituan",
            Action::ConfirmMaterials => "confirm_materials",
            Action::SelectCopy => "select_copy",
            Action::UploadImage => "upload_image",
            Action::SelectStyle => "select_style",
            Action::UploadMeituan => "upload_meituan",
            Action::ConfirmMatch => "confirm_match",
            Action::UploadMenu => "upload_menu",
            Action::AddToSetDecision => "add_to_set_decision",
            Action::ConfirmProductConfig => "confirm_product_config",
            Action::VerifyCopy => "verify_copy",
            Action::HostingDecision => "hosting_decision",
            Action::CreateSingles => "create_singles",
            Action::FinishProcess => "finish_process",
            Action::MarketingStart => "marketing_start",
            Action::BudgetAnswer => "budget_answer",
            Action::DurationAnswer => "duration_answer",
            Action::TargetAnswer => "target_answer",
            Action::ConfirmMarketingPlan => "confirm_marketing_plan",
            Action::OptimizeMarketing => "optimize_marketing",
            Action::FinishReport => "finish_report",
            Action::DiagnosisAnalyze => "diagnosis_analyze",
            Action::DiagnosisItemApplied => "diagnosis_item_applied",
            Action::DiagnosisAllApplied => "diagnosis_all_applied",
            Action::ReportExpanded => "report_expanded",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Value(String),
    Materials(Vec<Material>),
    Product(ProductConfig),
}

impl Payload {
    pub fn value(&self) -> Option<&str> {
        match self {
            Payload::Value(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetAction {
    pub action: Action,
    pub payload: Payload,
}

impl WidgetAction {
    pub fn new(action: Action) -> Self {
        Self { action, payload: Payload::None }
    }

    pub fn with_value(action: Action, value: impl Into<String>) -> Self {
        Self { action, payload: Payload::Value(value.into()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Copy,
    Image,
    Video,
    Live,
    Card,
    Landing,
}

impl Material {
    pub fn all() -> [Material; 6] {
        [
            Material::Copy,
            Material::Image,
            Material::Video,
            Material::Live,
            Material::Card,
            Material::Landing,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Material::Copy => "文案",
            Material::Image => "图片",
            Material::Video => "视频",
            Material::Live => "直播",
            Material::Card => "卡片",
            Material::Landing => "落地页",
        }
    }

    pub fn sub(&self) -> &'static str {
        match self {
            Material::Copy => "标题/口播",
            Material::Image => "主图/场景图",
            Material::Video => "混剪/口播",
            Material::Live => "背景/话术",
            Material::Card => "广告/独立卡",
            Material::Landing => "H5/小程序",
        }
    }
}

pub const PRODUCT_TYPES: [&str; 4] = ["团购品", "线索品", "次卡", "代金券"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfig {
    pub product_type: String,
    pub price: String,
    pub composition: String,
}

/// Editable text fields of the product form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Price,
    Composition,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Price => "推荐价格 (元)",
            FormField::Composition => "子商品组合",
        }
    }
}

/// Card tint used by style pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accent {
    Red,
    Purple,
    Orange,
    Gray,
    Blue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOption {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub accent: Accent,
}

impl StyleOption {
    pub fn new(id: &str, name: &str, desc: &str, accent: Accent) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            desc: desc.to_string(),
            accent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOption {
    pub id: String,
    pub tag: String,
    pub content: String,
}

impl CopyOption {
    pub fn new(id: &str, tag: &str, content: &str) -> Self {
        Self {
            id: id.to_string(),
            tag: tag.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionButton {
    pub label: String,
    pub value: String,
    pub primary: bool,
}

impl OptionButton {
    pub fn primary(label: &str, value: &str) -> Self {
        Self { label: label.to_string(), value: value.to_string(), primary: true }
    }

    pub fn plain(label: &str, value: &str) -> Self {
        Self { label: label.to_string(), value: value.to_string(), primary: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosisIcon {
    Video,
    Dollar,
    Bulb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisItem {
    pub id: String,
    pub icon: DiagnosisIcon,
    pub title: String,
    pub problem: String,
    pub suggestion: String,
    pub preview: Option<String>,
    pub action_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    DataBinding { douyin_bound: bool, meituan_bound: bool },
    MaterialSelection { selected: Vec<Material> },
    UploadPrompt { label: String, sub: String, action: Action },
    StyleSelection { styles: Vec<StyleOption> },
    CopySelection { options: Vec<CopyOption> },
    ProductForm(ProductConfig),
    Options { action: Action, options: Vec<OptionButton> },
    MarketingPlan,
    OptimizationDecision,
    CampaignReport,
    DiagnosisAlert,
    DiagnosisCard { items: Vec<DiagnosisItem>, accepted: Vec<String> },
    WeeklyReport { expanded: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Button,
    /// Multi-select checkbox.
    Toggle,
    /// One-of-many choice.
    Choice,
    Field(FormField),
}

/// A focusable element of a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub label: String,
    pub kind: ControlKind,
    pub enabled: bool,
    /// Checked, chosen, bound, accepted or expanded, depending on the kind.
    pub active: bool,
    pub primary: bool,
}

impl Control {
    fn button(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ControlKind::Button,
            enabled: true,
            active: false,
            primary: false,
        }
    }

    fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    fn with_kind(mut self, kind: ControlKind) -> Self {
        self.kind = kind;
        self
    }

    fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Widget {
    pub fn data_binding() -> Self {
        Widget::DataBinding { douyin_bound: false, meituan_bound: false }
    }

    pub fn material_selection() -> Self {
        Widget::MaterialSelection { selected: Vec::new() }
    }

    pub fn upload(label: &str, sub: &str, action: Action) -> Self {
        Widget::UploadPrompt {
            label: label.to_string(),
            sub: sub.to_string(),
            action,
        }
    }

    pub fn options(action: Action, options: Vec<OptionButton>) -> Self {
        Widget::Options { action, options }
    }

    pub fn product_form(product_type: &str, price: u32, composition: &str) -> Self {
        Widget::ProductForm(ProductConfig {
            product_type: product_type.to_string(),
            price: price.to_string(),
            composition: composition.to_string(),
        })
    }

    pub fn diagnosis_card(items: Vec<DiagnosisItem>) -> Self {
        Widget::DiagnosisCard { items, accepted: Vec::new() }
    }

    pub fn weekly_report() -> Self {
        Widget::WeeklyReport { expanded: false }
    }

    /// Short name used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Widget::DataBinding { .. } => "data-binding",
            Widget::MaterialSelection { .. } => "material-selection",
            Widget::UploadPrompt { .. } => "image-upload",
            Widget::StyleSelection { .. } => "style-selection",
            Widget::CopySelection { .. } => "copy-selection",
            Widget::ProductForm(_) => "product-form",
            Widget::Options { .. } => "simple-options",
            Widget::MarketingPlan => "marketing-plan",
            Widget::OptimizationDecision => "optimization-decision",
            Widget::CampaignReport => "campaign-report",
            Widget::DiagnosisAlert => "diagnosis-alert",
            Widget::DiagnosisCard { .. } => "diagnosis-card",
            Widget::WeeklyReport { .. } => "smart-report",
        }
    }

    /// Focusable controls, in display order.
    pub fn controls(&self) -> Vec<Control> {
        match self {
            Widget::DataBinding { douyin_bound, meituan_bound } => vec![
                Control::button(if *douyin_bound { "抖音号已绑定" } else { "绑定抖音号" })
                    .active(*douyin_bound)
                    .enabled(!douyin_bound),
                Control::button(if *meituan_bound { "链接已解析" } else { "美团商品链接" })
                    .active(*meituan_bound)
                    .enabled(!meituan_bound),
            ],
            Widget::MaterialSelection { selected } => {
                let mut controls: Vec<Control> = Material::all()
                    .iter()
                    .map(|m| {
                        Control::button(format!("{} · {}", m.label(), m.sub()))
                            .with_kind(ControlKind::Toggle)
                            .active(selected.contains(m))
                    })
                    .collect();
                controls.push(
                    Control::button(format!("开始生成 ({})", selected.len()))
                        .primary()
                        .enabled(!selected.is_empty()),
                );
                controls
            }
            Widget::UploadPrompt { label, .. } => vec![Control::button(label.clone()).primary()],
            Widget::StyleSelection { styles } => styles
                .iter()
                .map(|s| Control::button(s.name.clone()))
                .collect(),
            Widget::CopySelection { options } => options
                .iter()
                .map(|o| Control::button(format!("[{}] {}", o.tag, o.content)))
                .collect(),
            Widget::ProductForm(config) => {
                let mut controls: Vec<Control> = PRODUCT_TYPES
                    .iter()
                    .map(|t| {
                        Control::button(*t)
                            .with_kind(ControlKind::Choice)
                            .active(config.product_type == *t)
                    })
                    .collect();
                controls.push(
                    Control::button(format!("¥ {}", config.price))
                        .with_kind(ControlKind::Field(FormField::Price)),
                );
                controls.push(
                    Control::button(config.composition.clone())
                        .with_kind(ControlKind::Field(FormField::Composition)),
                );
                controls.push(Control::button("确认配置").primary());
                controls
            }
            Widget::Options { options, .. } => options
                .iter()
                .map(|o| {
                    let control = Control::button(o.label.clone());
                    if o.primary { control.primary() } else { control }
                })
                .collect(),
            Widget::MarketingPlan => vec![Control::button("确认方案并执行").primary()],
            Widget::OptimizationDecision => vec![
                Control::button("A. 停朋友圈，加投抖音").primary(),
                Control::button("B. 更换朋友圈素材"),
            ],
            Widget::CampaignReport => vec![Control::button("查看详细数据报表")],
            Widget::DiagnosisAlert => vec![Control::button("查看原因 & 优化 →")],
            Widget::DiagnosisCard { items, accepted } => items
                .iter()
                .map(|item| {
                    let done = accepted.contains(&item.id);
                    let label = if done { "已执行 ✓".to_string() } else { item.action_label.clone() };
                    Control::button(label).active(done).enabled(!done)
                })
                .collect(),
            Widget::WeeklyReport { expanded } => vec![
                Control::button(if *expanded { "收起周报" } else { "展开完整周报" })
                    .with_kind(ControlKind::Toggle)
                    .active(*expanded),
            ],
        }
    }

    /// Activate the control at `index`. Disabled or out-of-range controls do nothing.
    pub fn activate(&mut self, index: usize) -> Option<WidgetAction> {
        match self {
            Widget::DataBinding { douyin_bound, meituan_bound } => {
                let (flag, action) = match index {
                    0 => (douyin_bound, Action::BindDouyin),
                    1 => (meituan_bound, Action::BindMeituan),
                    _ => return None,
                };
                if *flag {
                    return None;
                }
                *flag = true;
                Some(WidgetAction::new(action))
            }
            Widget::MaterialSelection { selected } => {
                let materials = Material::all();
                if let Some(material) = materials.get(index) {
                    if let Some(pos) = selected.iter().position(|m| m == material) {
                        selected.remove(pos);
                    } else {
                        selected.push(*material);
                    }
                    None
                } else if index == materials.len() && !selected.is_empty() {
                    Some(WidgetAction {
                        action: Action::ConfirmMaterials,
                        payload: Payload::Materials(selected.clone()),
                    })
                } else {
                    None
                }
            }
            Widget::UploadPrompt { action, .. } => {
                (index == 0).then(|| WidgetAction::new(*action))
            }
            Widget::StyleSelection { styles } => styles
                .get(index)
                .map(|s| WidgetAction::with_value(Action::SelectStyle, s.name.clone())),
            Widget::CopySelection { options } => options
                .get(index)
                .map(|o| WidgetAction::with_value(Action::SelectCopy, o.id.clone())),
            Widget::ProductForm(config) => {
                if let Some(t) = PRODUCT_TYPES.get(index) {
                    config.product_type = t.to_string();
                    None
                } else if index == PRODUCT_TYPES.len() + 2 {
                    Some(WidgetAction {
                        action: Action::ConfirmProductConfig,
                        payload: Payload::Product(config.clone()),
                    })
                } else {
                    // Text fields are edited through set_field.
                    None
                }
            }
            Widget::Options { action, options } => options
                .get(index)
                .map(|o| WidgetAction::with_value(*action, o.value.clone())),
            Widget::MarketingPlan => {
                (index == 0).then(|| WidgetAction::new(Action::ConfirmMarketingPlan))
            }
            Widget::OptimizationDecision => match index {
                0 => Some(WidgetAction::with_value(Action::OptimizeMarketing, "stop_wechat")),
                1 => Some(WidgetAction::with_value(Action::OptimizeMarketing, "change_creative")),
                _ => None,
            },
            Widget::CampaignReport => (index == 0).then(|| WidgetAction::new(Action::FinishReport)),
            Widget::DiagnosisAlert => {
                (index == 0).then(|| WidgetAction::new(Action::DiagnosisAnalyze))
            }
            Widget::DiagnosisCard { items, accepted } => {
                let id = items.get(index)?.id.clone();
                if accepted.contains(&id) {
                    return None;
                }
                accepted.push(id.clone());
                if accepted.len() == items.len() {
                    Some(WidgetAction::new(Action::DiagnosisAllApplied))
                } else {
                    Some(WidgetAction::with_value(Action::DiagnosisItemApplied, id))
                }
            }
            Widget::WeeklyReport { expanded } => {
                if index != 0 {
                    return None;
                }
                *expanded = !*expanded;
                expanded.then(|| WidgetAction::new(Action::ReportExpanded))
            }
        }
    }

    pub fn field_value(&self, field: FormField) -> Option<&str> {
        match self {
            Widget::ProductForm(config) => Some(match field {
                FormField::Price => &config.price,
                FormField::Composition => &config.composition,
            }),
            _ => None,
        }
    }

    /// Update a product form text field. Returns false for other widgets.
    pub fn set_field(&mut self, field: FormField, value: &str) -> bool {
        match self {
            Widget::ProductForm(config) => {
                match field {
                    FormField::Price => config.price = value.trim().to_string(),
                    FormField::Composition => config.composition = value.to_string(),
                }
                true
            }
            _ => false,
        }
    }
}
