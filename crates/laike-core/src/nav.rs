use serde::{Deserialize, Serialize};

/// One of the six sidebar entries. Each entry owns its own scripted scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavContext {
    Agent,
    Products,
    Assets,
    Marketing,
    Diagnosis,
    Settings,
}

const DEFAULT_PLACEHOLDER: &str = "输入您的问题，例如：'如何提高团购转化率？'...";

impl NavContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavContext::Agent => "agent",
            NavContext::Products => "products",
            NavContext::Assets => "assets",
            NavContext::Marketing => "marketing",
            NavContext::Diagnosis => "diagnosis",
            NavContext::Settings => "settings",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "agent" => Some(NavContext::Agent),
            "products" => Some(NavContext::Products),
            "assets" => Some(NavContext::Assets),
            "marketing" => Some(NavContext::Marketing),
            "diagnosis" => Some(NavContext::Diagnosis),
            "settings" => Some(NavContext::Settings),
            _ => None,
        }
    }

    /// Sidebar order.
    pub fn all() -> [NavContext; 6] {
        [
            NavContext::Agent,
            NavContext::Products,
            NavContext::Assets,
            NavContext::Marketing,
            NavContext::Diagnosis,
            NavContext::Settings,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            NavContext::Agent => "来客 Agent",
            NavContext::Products => "管理店品",
            NavContext::Assets => "素材生成",
            NavContext::Marketing => "营销推广",
            NavContext::Diagnosis => "经营诊断",
            NavContext::Settings => "账号设置",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            NavContext::Assets => "在此输入您的素材需求，或按上方指引操作...",
            NavContext::Products => "在此输入您的新品需求，或上传菜单...",
            NavContext::Marketing => "在此输入您的推广需求...",
            NavContext::Diagnosis => "在此输入您的疑问...",
            NavContext::Agent | NavContext::Settings => DEFAULT_PLACEHOLDER,
        }
    }

    /// Quick-suggestion chips. Only the agent context offers them.
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            NavContext::Agent => &[
                "如何提升店铺动销率？",
                "帮我写一段火锅套餐的推广文案",
                "最近流量下降了，帮我诊断一下原因",
                "生成一个短视频拍摄脚本",
            ],
            _ => &[],
        }
    }
}

impl Default for NavContext {
    fn default() -> Self {
        NavContext::Assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for ctx in NavContext::all() {
            assert_eq!(NavContext::from_str(ctx.as_str()), Some(ctx));
        }
        assert_eq!(NavContext::from_str("MARKETING"), Some(NavContext::Marketing));
        assert_eq!(NavContext::from_str("billing"), None);
    }

    #[test]
    fn settings_shares_the_agent_placeholder() {
        assert_eq!(NavContext::Settings.placeholder(), NavContext::Agent.placeholder());
        assert_ne!(NavContext::Assets.placeholder(), NavContext::Agent.placeholder());
    }

    #[test]
    fn only_agent_has_suggestions() {
        assert_eq!(NavContext::Agent.suggestions().len(), 4);
        assert!(NavContext::all()
            .iter()
            .filter(|c| **c != NavContext::Agent)
            .all(|c| c.suggestions().is_empty()));
    }
}
