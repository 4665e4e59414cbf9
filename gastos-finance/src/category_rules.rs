//! Merchant rules mapping a parsed merchant name to a spending category.
//!
//! Rules are either case-insensitive regexes (full confidence on a hit) or
//! plain names compared with a fuzzy similarity ratio.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 80.0;
pub const DEFAULT_SUGGESTION_THRESHOLD: f64 = 60.0;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// A score at or above this stops the rule scan.
const CONFIDENT_MATCH: f64 = 95.0;

/// A user-defined merchant → category rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantRule {
    pub pattern: String,
    pub category: String,
    #[serde(default)]
    pub is_regex: bool,
    /// Higher priority rules are tried first.
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_priority() -> u32 {
    1
}

fn default_active() -> bool {
    true
}

impl MerchantRule {
    pub fn name(pattern: &str, category: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            category: category.to_string(),
            is_regex: false,
            priority: default_priority(),
            is_active: true,
        }
    }

    pub fn regex(pattern: &str, category: &str) -> Self {
        Self {
            is_regex: true,
            ..Self::name(pattern, category)
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Winning rule for a merchant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMatch {
    pub category: String,
    /// 0.0 - 1.0
    pub confidence: f64,
}

/// Existing rule that resembles an uncategorized merchant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSuggestion {
    pub pattern: String,
    pub category: String,
    pub confidence: f64,
    pub is_regex: bool,
}

/// How a candidate rule scores against one merchant, before it is saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleTest {
    pub merchant: String,
    pub pattern: String,
    pub is_regex: bool,
    /// 0.0 - 1.0
    pub confidence: f64,
    /// Whether the score reaches the fuzzy threshold.
    pub matches: bool,
}

struct CompiledRule {
    rule: MerchantRule,
    // None for plain rules and for regex rules that failed to compile
    regex: Option<Regex>,
}

impl CompiledRule {
    fn new(rule: MerchantRule) -> Self {
        let regex = if rule.is_regex {
            match RegexBuilder::new(&rule.pattern).case_insensitive(true).build() {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = %rule.pattern, error = %e, "ignoring invalid merchant rule regex");
                    None
                }
            }
        } else {
            None
        };
        Self { rule, regex }
    }

    /// 0 - 100
    fn score(&self, merchant: &str) -> f64 {
        if self.rule.is_regex {
            match &self.regex {
                Some(re) if re.is_match(merchant) => 100.0,
                _ => 0.0,
            }
        } else {
            fuzzy_ratio(merchant, &self.rule.pattern)
        }
    }
}

pub struct Categorizer {
    /// Active rules only, highest priority first
    rules: Vec<CompiledRule>,
    fuzzy_threshold: f64,
    suggestion_threshold: f64,
    suggestion_limit: usize,
}

impl Categorizer {
    pub fn new(rules: Vec<MerchantRule>) -> Self {
        let mut rules: Vec<_> = rules
            .into_iter()
            .filter(|r| r.is_active)
            .map(CompiledRule::new)
            .collect();
        rules.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));

        Self {
            rules,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            suggestion_threshold: DEFAULT_SUGGESTION_THRESHOLD,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }

    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    pub fn with_suggestions(mut self, threshold: f64, limit: usize) -> Self {
        self.suggestion_threshold = threshold;
        self.suggestion_limit = limit;
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Best-scoring rule at or above the fuzzy threshold.
    pub fn categorize(&self, merchant: &str) -> Option<CategoryMatch> {
        let mut best: Option<&CompiledRule> = None;
        let mut best_score = 0.0;

        for rule in &self.rules {
            let score = rule.score(merchant);
            if score > best_score && score >= self.fuzzy_threshold {
                best = Some(rule);
                best_score = score;
                if score >= CONFIDENT_MATCH {
                    break;
                }
            }
        }

        best.map(|r| CategoryMatch {
            category: r.rule.category.clone(),
            confidence: best_score / 100.0,
        })
    }

    /// Rules whose pattern looks like `merchant`, most similar first.
    pub fn suggest(&self, merchant: &str) -> Vec<RuleSuggestion> {
        let mut out: Vec<RuleSuggestion> = self
            .rules
            .iter()
            .filter_map(|r| {
                let score = fuzzy_ratio(merchant, &r.rule.pattern);
                (score > self.suggestion_threshold).then(|| RuleSuggestion {
                    pattern: r.rule.pattern.clone(),
                    category: r.rule.category.clone(),
                    confidence: score / 100.0,
                    is_regex: r.rule.is_regex,
                })
            })
            .collect();

        out.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        out.truncate(self.suggestion_limit);
        out
    }

    /// Score an unsaved pattern against `merchant` the way `categorize` would.
    /// An invalid regex scores zero.
    pub fn score_pattern(&self, merchant: &str, pattern: &str, is_regex: bool) -> RuleTest {
        let rule = if is_regex {
            MerchantRule::regex(pattern, "")
        } else {
            MerchantRule::name(pattern, "")
        };
        let score = CompiledRule::new(rule).score(merchant);

        RuleTest {
            merchant: merchant.to_string(),
            pattern: pattern.to_string(),
            is_regex,
            confidence: score / 100.0,
            matches: score >= self.fuzzy_threshold,
        }
    }
}

/// Case-insensitive similarity in 0 - 100: `2 * LCS / (len_a + len_b)`,
/// rounded. Zero when either side is empty.
pub fn fuzzy_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let lcs = lcs_len(&a, &b);
    (200.0 * lcs as f64 / (a.len() + b.len()) as f64).round()
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
