#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Severe,
    Moderate,
    Mild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Strong,
    Moderate,
    Mild,
}

/// Negative-news keyword dictionary with severity tags, carried over
/// verbatim from the canonical (most-recently-retained) source table.
const NEGATIVE_KEYWORDS: &[(&str, Severity)] = &[
    ("造假", Severity::Severe),
    ("财务造假", Severity::Severe),
    ("虚增利润", Severity::Severe),
    ("财务违规", Severity::Severe),
    ("亏损", Severity::Moderate),
    ("业绩下滑", Severity::Moderate),
    ("业绩暴雷", Severity::Severe),
    ("债务", Severity::Moderate),
    ("债务违约", Severity::Severe),
    ("资不抵债", Severity::Severe),
    ("调查", Severity::Severe),
    ("立案", Severity::Severe),
    ("立案调查", Severity::Severe),
    ("处罚", Severity::Moderate),
    ("罚款", Severity::Moderate),
    ("监管", Severity::Mild),
    ("退市", Severity::Severe),
    ("退市风险", Severity::Severe),
    ("ST", Severity::Severe),
    ("违规", Severity::Moderate),
    ("违规担保", Severity::Severe),
    ("内幕交易", Severity::Severe),
    ("诉讼", Severity::Moderate),
    ("起诉", Severity::Moderate),
    ("被诉", Severity::Moderate),
    ("官司", Severity::Mild),
    ("纠纷", Severity::Mild),
    ("停产", Severity::Severe),
    ("停产整顿", Severity::Severe),
    ("倒闭", Severity::Severe),
    ("破产", Severity::Severe),
    ("破产重整", Severity::Severe),
    ("裁员", Severity::Moderate),
    ("裁员风波", Severity::Moderate),
    ("政策", Severity::Mild),
    ("政策风险", Severity::Moderate),
    ("监管收紧", Severity::Moderate),
    ("加强监管", Severity::Moderate),
    ("暴跌", Severity::Moderate),
    ("大跌", Severity::Mild),
    ("风险", Severity::Mild),
    ("警示", Severity::Mild),
    ("风险提示", Severity::Mild),
];

const POSITIVE_KEYWORDS: &[(&str, Strength)] = &[
    ("增长", Strength::Mild),
    ("业绩增长", Strength::Moderate),
    ("业绩超预期", Strength::Strong),
    ("大增", Strength::Moderate),
    ("暴增", Strength::Strong),
    ("大涨", Strength::Moderate),
    ("回购", Strength::Strong),
    ("股份回购", Strength::Strong),
    ("增持", Strength::Strong),
    ("重大合同", Strength::Moderate),
    ("中标", Strength::Moderate),
    ("订单", Strength::Mild),
    ("获批", Strength::Moderate),
    ("认证", Strength::Moderate),
    ("突破", Strength::Moderate),
    ("独家", Strength::Moderate),
    ("首发", Strength::Moderate),
    ("首创", Strength::Moderate),
    ("分红", Strength::Mild),
    ("派息", Strength::Mild),
    ("高送转", Strength::Moderate),
    ("调研", Strength::Mild),
    ("机构调研", Strength::Moderate),
];

pub struct SentimentOutcome {
    pub passed: bool,
    pub result: String,
    pub score: i32,
    pub reasons: Vec<String>,
    pub risks: Vec<String>,
}

/// Scans `news_context` for every keyword (substring match) and applies
/// the veto-plus-bonus rules: any severe negative, or three or more
/// negatives of any severity, vetoes the signal outright.
pub fn check_sentiment(news_context: &str) -> SentimentOutcome {
    let negative_found: Vec<(&str, Severity)> = NEGATIVE_KEYWORDS
        .iter()
        .copied()
        .filter(|(kw, _)| news_context.contains(kw))
        .collect();
    let positive_found: Vec<(&str, Strength)> = POSITIVE_KEYWORDS
        .iter()
        .copied()
        .filter(|(kw, _)| news_context.contains(kw))
        .collect();

    let has_severe_negative = negative_found.iter().any(|(_, sev)| *sev == Severity::Severe);
    let has_many_negative = negative_found.len() >= 3;

    if has_severe_negative || has_many_negative {
        let mut risks = vec!["🚨 舆情过滤：发现重大利空新闻".to_string()];
        for (keyword, severity) in &negative_found {
            if *severity == Severity::Severe {
                risks.push(format!("   - {keyword}（严重）"));
            }
        }
        return SentimentOutcome {
            passed: false,
            result: "重大利空".to_string(),
            score: 0,
            reasons: Vec::new(),
            risks,
        };
    }

    if !positive_found.is_empty() {
        let strong_positive =
            positive_found.iter().filter(|(_, s)| matches!(s, Strength::Strong | Strength::Moderate)).count();
        if strong_positive >= 2 {
            let mut reasons = vec!["✅ 舆情加分：多条利好消息".to_string()];
            for (keyword, strength) in positive_found.iter().take(3) {
                if matches!(strength, Strength::Strong | Strength::Moderate) {
                    reasons.push(format!("   - {keyword}"));
                }
            }
            return SentimentOutcome { passed: true, result: "明显利好".to_string(), score: 5, reasons, risks: Vec::new() };
        }
        if strong_positive >= 1 {
            return SentimentOutcome {
                passed: true,
                result: "轻微利好".to_string(),
                score: 2,
                reasons: vec!["✅ 舆情加分：有利好消息".to_string()],
                risks: Vec::new(),
            };
        }
    }

    if !negative_found.is_empty() {
        return SentimentOutcome {
            passed: true,
            result: "中性偏空".to_string(),
            score: 0,
            reasons: Vec::new(),
            risks: vec!["⚠️ 舆情提示：发现轻微负面消息".to_string()],
        };
    }

    SentimentOutcome { passed: true, result: "中性".to_string(), score: 0, reasons: Vec::new(), risks: Vec::new() }
}
