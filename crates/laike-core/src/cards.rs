//! Fixed copy shown on the static cards (plan, optimization, report, alert).

pub struct Section {
    pub heading: &'static str,
    pub lines: &'static [&'static str],
}

pub struct Stat {
    pub label: &'static str,
    pub value: &'static str,
}

pub struct PlanCard {
    pub title: &'static str,
    pub budget: &'static str,
    pub sections: &'static [Section],
}

pub const MARKETING_PLAN: PlanCard = PlanCard {
    title: "☕️ 手冲咖啡体验券 · 推广方案",
    budget: "预算 ¥2000",
    sections: &[
        Section {
            heading: "达人推荐 (¥800)",
            lines: &[
                "• @咖啡地图 (10w粉): 专业探店，精准垂直",
                "• @城市美好探店 (5w粉): 生活化，年轻受众",
            ],
        },
        Section {
            heading: "营销配置 (智能)",
            lines: &[
                "• 首购特惠: 新客到店立减5元",
                "• 复购激励: 满50减10元 (有效期30天)",
            ],
        },
        Section {
            heading: "精准投放 (¥1200)",
            lines: &[
                "• 抖音本地 (¥1000): 3km内, 25-40岁, 兴趣:咖啡",
                "• 微信附近推 (¥200): 朋友圈曝光补充",
            ],
        },
    ],
};

pub struct ChannelStat {
    pub channel: &'static str,
    pub rate: &'static str,
    pub rate_label: &'static str,
    pub cpa: &'static str,
    pub healthy: bool,
}

pub const OPTIMIZATION_CHANNELS: [ChannelStat; 2] = [
    ChannelStat {
        channel: "抖音本地生活",
        rate: "7%",
        rate_label: "转化率 (高)",
        cpa: "CPA: ¥12",
        healthy: true,
    },
    ChannelStat {
        channel: "微信朋友圈",
        rate: "2%",
        rate_label: "点击率 (低)",
        cpa: "CPA: ¥35",
        healthy: false,
    },
];

pub const OPTIMIZATION_PROMPT: &str = "建议优化操作：";

pub struct ReportCard {
    pub overline: &'static str,
    pub title: &'static str,
    pub headline: Stat,
    pub stats: &'static [Stat],
    pub highlights_heading: &'static str,
    pub highlights: &'static [&'static str],
}

pub const CAMPAIGN_REPORT: ReportCard = ReportCard {
    overline: "推广总览",
    title: "手冲咖啡体验券",
    headline: Stat { label: "核销新客", value: "165位" },
    stats: &[
        Stat { label: "总花费", value: "¥2000" },
        Stat { label: "客单成本", value: "¥12.1" },
        Stat { label: "ROI", value: "1:3.5" },
    ],
    highlights_heading: "成效亮点",
    highlights: &[
        "**达人推广** 贡献了 100 位新客 (Top1渠道)",
        "**复购券** 领取率达 80%，留存预期高",
        "**自动优化** 节省约 ¥300 无效投放",
    ],
};

pub struct AlertCard {
    pub title: &'static str,
    pub body: &'static str,
}

pub const DIAGNOSIS_ALERT: AlertCard = AlertCard {
    title: "高优待办：广告预警",
    body: "主推商品「双人畅享火锅套餐」的广告转化成本昨日上涨 **30%**，已超出预警线。",
};

pub struct WeeklyReportCard {
    pub title: &'static str,
    pub period: &'static str,
    pub greeting: &'static str,
    pub stats: &'static [Stat],
    pub sections: &'static [Section],
}

/// Agent landing card. Collapsed it shows the greeting and key stats; expanded
/// it adds the sections.
pub const WEEKLY_REPORT: WeeklyReportCard = WeeklyReportCard {
    title: "📊 智能经营周报",
    period: "上周 (周一至周日)",
    greeting: "李老板早上好！上周店铺整体经营平稳，以下是AI为您整理的核心数据：",
    stats: &[
        Stat { label: "成交额", value: "¥48,600 (+12%)" },
        Stat { label: "核销订单", value: "312单 (+8%)" },
        Stat { label: "复购率", value: "9% (行业均值 18%)" },
    ],
    sections: &[
        Section {
            heading: "经营亮点",
            lines: &[
                "• 「双人畅享火锅套餐」贡献 46% 成交，稳居门店爆品",
                "• 短视频带来的到店客占比提升至 35%",
            ],
        },
        Section {
            heading: "待改进",
            lines: &[
                "• **复购率偏低**：老客 30 天内回访不足一成，缺少会员与复购券承接",
                "• 工作日午市客流仅为周末的 40%",
            ],
        },
        Section {
            heading: "机会提示",
            lines: &[
                "• **跨年季**即将到来，同城“聚餐”搜索量预计上涨 3 倍",
                "• 建议提前布局多人套餐与跨年主题短视频",
            ],
        },
    ],
};
