//! Complexity scoring for incoming instructions
//!
//! Decides whether one reasoning pass is enough or the instruction should
//! go through the thinker/formatter pair. Scoring is table-driven: each
//! [`IndicatorFamily`] lists its tokens and weight, plus three structural
//! heuristics (length, repeated "and", wildcard glyphs).
//!
//! | Signal            | Weight                   |
//! |-------------------|--------------------------|
//! | multi-step phrase | +2 once                  |
//! | conditional word  | +3 once                  |
//! | file-pattern word | +1 per matching token    |
//! | analysis verb     | +2 once                  |
//! | location word     | +1 per matching token    |
//! | long instruction  | +1                       |
//! | "and" twice+      | +1                       |
//! | `* ? [ ]`         | +2                       |

use crate::core::config::AgentConfig;
use serde::Serialize;
use std::fmt;

/// How a family's weight accumulates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// Weight counted once if any token matches
    Once,
    /// Weight counted for every distinct matching token
    PerToken,
}

/// A keyword family and its contribution to the score
#[derive(Debug, Clone)]
pub struct IndicatorFamily {
    pub name: &'static str,
    pub weight: u32,
    pub scoring: Scoring,
    /// Lowercase words or space-separated phrases
    pub tokens: &'static [&'static str],
}

// Multi-step tokens are phrases so that no two-word instruction can reach
// the default threshold without a conditional, analysis verb or wildcard.
pub const DEFAULT_FAMILIES: &[IndicatorFamily] = &[
    IndicatorFamily {
        name: "multi_step",
        weight: 2,
        scoring: Scoring::Once,
        tokens: &[
            "and then",
            "after that",
            "followed by",
            "once done",
            "and also",
            "as well as",
            "step by step",
            "and afterwards",
        ],
    },
    IndicatorFamily {
        name: "conditional",
        weight: 3,
        scoring: Scoring::Once,
        tokens: &[
            "if", "unless", "when", "whenever", "otherwise", "else", "except", "whether",
        ],
    },
    IndicatorFamily {
        name: "file_pattern",
        weight: 1,
        scoring: Scoring::PerToken,
        tokens: &[
            "all",
            "every",
            "each",
            "files",
            "multiple",
            "recursively",
            "folders",
            "directories",
        ],
    },
    IndicatorFamily {
        name: "analysis",
        weight: 2,
        scoring: Scoring::Once,
        tokens: &[
            "analyze",
            "analyse",
            "search",
            "find",
            "summarize",
            "summarise",
            "compare",
            "count",
            "scan",
            "extract",
            "identify",
            "organize",
            "report",
            "grep",
        ],
    },
    IndicatorFamily {
        name: "location",
        weight: 1,
        scoring: Scoring::PerToken,
        tokens: &[
            "in", "into", "from", "to", "under", "inside", "within", "across", "between", "onto",
        ],
    },
];

pub const WILDCARD_GLYPHS: &[char] = &['*', '?', '[', ']'];
const WILDCARD_WEIGHT: u32 = 2;
const LENGTH_WEIGHT: u32 = 1;
const CONJUNCTION_WEIGHT: u32 = 1;

/// One matched signal: the family (or heuristic) and what matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Indicator {
    pub family: &'static str,
    pub token: String,
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.token)
    }
}

/// Full scoring breakdown for one instruction
#[derive(Debug, Clone, Serialize)]
pub struct ComplexityAnalysis {
    pub prompt: String,
    pub word_count: usize,
    pub score: u32,
    pub threshold: u32,
    pub is_complex: bool,
    pub indicators: Vec<Indicator>,
}

impl ComplexityAnalysis {
    pub fn recommended_approach(&self) -> &'static str {
        if self.is_complex {
            "Dual-stage"
        } else {
            "Single-stage"
        }
    }
}

/// Scores instructions against indicator tables
#[derive(Debug, Clone)]
pub struct ComplexityClassifier {
    families: Vec<IndicatorFamily>,
    threshold: u32,
    long_instruction_words: usize,
}

impl Default for ComplexityClassifier {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ComplexityClassifier {
    pub fn new(threshold: u32) -> Self {
        Self {
            families: DEFAULT_FAMILIES.to_vec(),
            threshold,
            long_instruction_words: 15,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.complexity_threshold)
            .with_long_instruction_words(config.long_instruction_words)
    }

    pub fn with_long_instruction_words(mut self, words: usize) -> Self {
        self.long_instruction_words = words;
        self
    }

    /// Replace the keyword tables
    pub fn with_families(mut self, families: Vec<IndicatorFamily>) -> Self {
        self.families = families;
        self
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn is_complex(&self, instruction: &str) -> bool {
        self.analyze(instruction).is_complex
    }

    pub fn score(&self, instruction: &str) -> u32 {
        self.analyze(instruction).score
    }

    /// Score an instruction and list every indicator that fired
    pub fn analyze(&self, instruction: &str) -> ComplexityAnalysis {
        let words = normalize(instruction);
        let word_count = instruction.split_whitespace().count();
        let mut score = 0;
        let mut indicators = Vec::new();

        for family in &self.families {
            let matched: Vec<&str> = family
                .tokens
                .iter()
                .copied()
                .filter(|token| contains_phrase(&words, token))
                .collect();
            if matched.is_empty() {
                continue;
            }
            score += match family.scoring {
                Scoring::Once => family.weight,
                Scoring::PerToken => family.weight * matched.len() as u32,
            };
            indicators.extend(matched.into_iter().map(|token| Indicator {
                family: family.name,
                token: token.to_string(),
            }));
        }

        if word_count > self.long_instruction_words {
            score += LENGTH_WEIGHT;
            indicators.push(Indicator {
                family: "length",
                token: format!("{} words", word_count),
            });
        }

        let and_count = words.iter().filter(|w| *w == "and").count();
        if and_count > 1 {
            score += CONJUNCTION_WEIGHT;
            indicators.push(Indicator {
                family: "conjunction",
                token: format!("and x{}", and_count),
            });
        }

        let glyphs: String = WILDCARD_GLYPHS
            .iter()
            .filter(|g| instruction.contains(**g))
            .collect();
        if !glyphs.is_empty() {
            score += WILDCARD_WEIGHT;
            indicators.push(Indicator {
                family: "wildcard",
                token: glyphs,
            });
        }

        let is_complex = word_count > 0 && score >= self.threshold;
        ComplexityAnalysis {
            prompt: instruction.to_string(),
            word_count,
            score,
            threshold: self.threshold,
            is_complex,
            indicators,
        }
    }
}

/// Lowercase words with surrounding punctuation stripped
fn normalize(instruction: &str) -> Vec<String> {
    instruction
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let parts: Vec<&str> = phrase.split(' ').collect();
    if parts.is_empty() || parts.len() > words.len() {
        return false;
    }
    words
        .windows(parts.len())
        .any(|window| window.iter().zip(&parts).all(|(w, p)| w == p))
}
