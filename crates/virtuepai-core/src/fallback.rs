//! Canned replies for when the upstream chat model cannot answer.
//!
//! A message is classified into a [`Topic`] by substring match against a
//! fixed keyword table. Topics are checked in [`Topic::PRIORITY`] order and
//! the first hit wins, so a message mentioning both price and trial gets the
//! pricing reply.

/// Subject of a customer question, as far as the fallback cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Pricing,
    Trial,
    Features,
    Deployment,
    Contact,
    /// Nothing matched.
    General,
}

impl Topic {
    /// Matchable topics, highest priority first.
    pub const PRIORITY: [Topic; 5] = [
        Topic::Pricing,
        Topic::Trial,
        Topic::Features,
        Topic::Deployment,
        Topic::Contact,
    ];

    /// Keywords that select this topic.
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Pricing => &["价格", "收费", "费用", "多少钱"],
            Self::Trial => &["免费", "试用"],
            Self::Features => &["功能", "特点", "服务"],
            Self::Deployment => &["部署", "安装"],
            Self::Contact => &["联系", "客服"],
            Self::General => &[],
        }
    }

    /// The fixed reply for this topic.
    #[must_use]
    pub fn canned_reply(self) -> &'static str {
        match self {
            Self::Pricing => PRICING_REPLY,
            Self::Trial => TRIAL_REPLY,
            Self::Features => FEATURES_REPLY,
            Self::Deployment => DEPLOYMENT_REPLY,
            Self::Contact => CONTACT_REPLY,
            Self::General => GENERAL_REPLY,
        }
    }
}

const PRICING_REPLY: &str = "我们的AI客服解决方案价格灵活，基础套餐每月起价¥999，包含基本功能。企业级套餐¥2999/月，含高级功能和优先支持。我们也提供定制方案，具体价格根据需求确定。现在注册可享受30天免费试用！";

const TRIAL_REPLY: &str = "是的，我们提供30天全功能免费试用，无需信用卡。试用期结束后，您可以选择合适的付费套餐继续使用，或随时取消。立即访问我们的网站注册免费试用吧！";

const FEATURES_REPLY: &str = "我们的AI客服系统功能丰富，包括：\n1. 24/7自动回复客户咨询\n2. 多语言支持\n3. 情感分析\n4. 自定义知识库\n5. 无缝人工交接\n6. 客户意图识别\n7. 数据分析和报表\n8. 多渠道集成（网站、微信、电话等）\n还有什么特定功能您想了解吗？";

const DEPLOYMENT_REPLY: &str = "我们提供云端SaaS部署和私有化部署两种方式。云端部署可立即开始使用，我们负责维护和更新。私有化部署适合对数据安全有严格要求的企业，可部署在您的服务器上。两种方式都有完善的技术支持。";

const CONTACT_REPLY: &str = "您可以通过以下方式联系我们的客服团队：\n1. 电话：400-888-9999（工作日9:00-18:00）\n2. 邮箱：support@virtuepai.com\n3. 在线客服：访问我们的网站，点击右下角的客服图标\n我们会尽快回复您的咨询！";

const GENERAL_REPLY: &str = "感谢您的咨询。我是维普特AI客服助手，可以回答您关于我们产品的各种问题。您可以询问关于价格、功能、部署方式等信息。如需更详细的咨询，请联系我们的销售团队（电话：400-888-9999）或发送邮件至sales@virtuepai.com。";

/// Classify a message by the first topic whose keyword it contains.
#[must_use]
pub fn classify(message: &str) -> Topic {
    Topic::PRIORITY
        .into_iter()
        .find(|topic| topic.keywords().iter().any(|kw| message.contains(kw)))
        .unwrap_or(Topic::General)
}

/// The canned reply for `message`.
#[must_use]
pub fn fallback_reply(message: &str) -> &'static str {
    classify(message).canned_reply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_keyword_selects_pricing_reply() {
        assert_eq!(fallback_reply("你们的价格是多少？"), PRICING_REPLY);
        assert_eq!(classify("这个怎么收费"), Topic::Pricing);
    }

    #[test]
    fn trial_keyword_selects_trial_reply() {
        assert_eq!(fallback_reply("可以试用吗"), TRIAL_REPLY);
    }

    #[test]
    fn no_keyword_selects_general_reply() {
        assert_eq!(fallback_reply("hello there"), GENERAL_REPLY);
        assert_eq!(classify(""), Topic::General);
    }

    #[test]
    fn pricing_wins_over_trial() {
        assert_eq!(classify("试用结束后的价格"), Topic::Pricing);
        assert_eq!(fallback_reply("免费试用之后收费吗"), PRICING_REPLY);
    }

    #[test]
    fn priority_order_is_fixed() {
        assert_eq!(
            Topic::PRIORITY,
            [
                Topic::Pricing,
                Topic::Trial,
                Topic::Features,
                Topic::Deployment,
                Topic::Contact,
            ]
        );
        // "服务" is a feature keyword and outranks "部署".
        assert_eq!(classify("私有化部署的服务"), Topic::Features);
        assert_eq!(classify("如何安装并联系客服"), Topic::Deployment);
    }

    #[test]
    fn every_matchable_topic_is_reachable() {
        for topic in Topic::PRIORITY {
            for keyword in topic.keywords() {
                let message = format!("请问{keyword}");
                let hit = classify(&message);
                // A keyword may only be shadowed by a higher-priority topic.
                let rank = |t: Topic| Topic::PRIORITY.iter().position(|p| *p == t);
                assert!(rank(hit) <= rank(topic), "{keyword} classified as {hit:?}");
            }
            assert_eq!(classify(&format!("x{}x", topic.keywords()[0])), topic);
        }
    }

    #[test]
    fn general_has_no_keywords() {
        assert!(Topic::General.keywords().is_empty());
    }
}
