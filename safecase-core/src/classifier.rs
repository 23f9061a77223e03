//! Harm classifier.
//!
//! Evaluates text against a fixed, ordered table of harm categories. Every
//! category is an independent case-insensitive predicate; a text may match
//! several. The threat level is a step function of the match count only, so
//! any flag can be explained by pointing at the categories that matched.

use std::fmt;

use regex::{RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::ThreatLevel;

/// Harm categories, in evaluation and reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmCategory {
    Lethality,
    Threat,
    SexualViolence,
    Coercion,
    Exposure,
    Destruction,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 6] = [
        Self::Lethality,
        Self::Threat,
        Self::SexualViolence,
        Self::Coercion,
        Self::Exposure,
        Self::Destruction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lethality => "lethality",
            Self::Threat => "threat",
            Self::SexualViolence => "sexual_violence",
            Self::Coercion => "coercion",
            Self::Exposure => "exposure",
            Self::Destruction => "destruction",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Lethality => "Lethality or death language",
            Self::Threat => "Threat or harm language",
            Self::SexualViolence => "Sexual violence language",
            Self::Coercion => "Coercion or blackmail language",
            Self::Exposure => "Exposure or leak language",
            Self::Destruction => "Destructive-intent language",
        }
    }

    /// Word stems anchored on a left word boundary, so inflections and
    /// agent nouns match ("killer", "abuser") while embedded substrings
    /// ("skill", "pharmacy") do not.
    fn pattern(&self) -> &'static str {
        match self {
            Self::Lethality => {
                r"\bkill\w*|\bmurder\w*|\bdie[sd]?\b|\bdying\b|\bdead(?:ly|lier|liest)?\b|\bdeath\w*"
            }
            Self::Threat => {
                r"\bthreat\w*|\bharm(?:s|ed|ing|ful|fully)?\b|\bhurt\w*|\bi know where you live\b|\bwatch your back\b|\byou(?:['’]ll| will) (?:regret|pay for) (?:this|it)\b"
            }
            Self::SexualViolence => {
                r"\brap(?:e|es|ed|ing|ist|ists)\b|\bassault\w*|\babus\w*"
            }
            Self::Coercion => {
                r"\bblackmail\w*|\bextort\w*|\bdo what i say\b|\bor else\b|\byou(?:['’]d)? better\b|\bunless you (?:pay|send|do)\b"
            }
            Self::Exposure => {
                r"\bleak\w*|\bexpos\w*|\bshar(?:e|es|ed|ing)\b|\bpost (?:your|those|these|the) (?:photos?|pictures?|pics|videos?|nudes)\b"
            }
            Self::Destruction => r"\bdestr(?:oy|uct)\w*|\bruin\w*",
        }
    }
}

impl fmt::Display for HarmCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Classification {
    pub harm_detected: bool,
    pub matched_categories: Vec<String>,
    pub threat_level: ThreatLevel,
}

impl Classification {
    /// Derive harm flag and threat level from an ordered label list.
    ///
    /// Blank labels are dropped and duplicates collapse onto their first
    /// occurrence (case-insensitive).
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matched_categories: Vec<String> = Vec::new();
        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() {
                continue;
            }
            if !matched_categories
                .iter()
                .any(|seen| seen.eq_ignore_ascii_case(label))
            {
                matched_categories.push(label.to_string());
            }
        }

        Self {
            harm_detected: !matched_categories.is_empty(),
            threat_level: ThreatLevel::from_match_count(matched_categories.len()),
            matched_categories,
        }
    }
}

/// Deterministic harm classifier over the [`HarmCategory`] table.
#[derive(Debug, Clone)]
pub struct HarmClassifier {
    patterns: RegexSet,
}

impl HarmClassifier {
    /// Compile the category table.
    pub fn new() -> Result<Self> {
        let patterns = RegexSetBuilder::new(HarmCategory::ALL.iter().map(|c| c.pattern()))
            .case_insensitive(true)
            .build()?;
        Ok(Self { patterns })
    }

    /// Categories matched by `text`, in table order.
    pub fn matched_categories(&self, text: &str) -> Vec<HarmCategory> {
        // SetMatches iterates indices in ascending order, i.e. table order.
        self.patterns
            .matches(text)
            .into_iter()
            .map(|index| HarmCategory::ALL[index])
            .collect()
    }

    /// Classify `text`. Total over all inputs, including the empty string.
    pub fn classify(&self, text: &str) -> Classification {
        let matched = self.matched_categories(text);
        let classification = Classification::from_labels(matched.iter().map(|c| c.as_str()));

        tracing::debug!(
            matched = classification.matched_categories.len(),
            threat_level = %classification.threat_level,
            "Classified text"
        );

        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> HarmClassifier {
        HarmClassifier::new().expect("category table compiles")
    }

    #[test]
    fn test_coercive_exposure_threat_is_critical() {
        let result = classifier().classify(
            "I know where you live. You better do what I say or I'll share those photos with everyone.",
        );
        assert_eq!(
            result.matched_categories,
            vec!["threat", "coercion", "exposure"]
        );
        assert_eq!(result.threat_level, ThreatLevel::Critical);
        assert!(result.harm_detected);
    }

    #[test]
    fn test_benign_text_is_none() {
        let result = classifier().classify("Meeting at 5pm, bring the documents.");
        assert!(result.matched_categories.is_empty());
        assert_eq!(result.threat_level, ThreatLevel::None);
        assert!(!result.harm_detected);
    }

    #[test]
    fn test_single_threat_is_medium() {
        let result = classifier().classify("If you tell anyone I will hurt you.");
        assert_eq!(result.matched_categories, vec!["threat"]);
        assert_eq!(result.threat_level, ThreatLevel::Medium);
    }

    #[test]
    fn test_two_categories_is_high() {
        let result = classifier().classify("I will ruin you and destroy your life. I'll leak it.");
        assert_eq!(result.matched_categories, vec!["exposure", "destruction"]);
        assert_eq!(result.threat_level, ThreatLevel::High);
    }

    #[test]
    fn test_empty_text() {
        let result = classifier().classify("");
        assert_eq!(result, Classification::default());
    }

    #[test]
    fn test_case_insensitive() {
        let c = classifier();
        assert_eq!(
            c.matched_categories("BLACKMAIL"),
            vec![HarmCategory::Coercion]
        );
        assert_eq!(c.matched_categories("Murder"), vec![HarmCategory::Lethality]);
    }

    #[test]
    fn test_word_boundaries() {
        let c = classifier();
        assert!(c.matched_categories("a harmless pharmacy diet").is_empty());
        assert!(c.matched_categories("skill and shareholder value").is_empty());
        assert!(c.matched_categories("a rapid, harmless deadline").is_empty());
    }

    #[test]
    fn test_inflected_forms_match() {
        let c = classifier();
        let cases: &[(&str, HarmCategory)] = &[
            ("killer", HarmCategory::Lethality),
            ("murderer", HarmCategory::Lethality),
            ("deadly", HarmCategory::Lethality),
            ("died", HarmCategory::Lethality),
            ("deaths", HarmCategory::Lethality),
            ("threatening", HarmCategory::Threat),
            ("harmful", HarmCategory::Threat),
            ("hurtful", HarmCategory::Threat),
            ("rapist", HarmCategory::SexualViolence),
            ("assaulted", HarmCategory::SexualViolence),
            ("abuser", HarmCategory::SexualViolence),
            ("blackmailer", HarmCategory::Coercion),
            ("extortionist", HarmCategory::Coercion),
            ("leaked", HarmCategory::Exposure),
            ("exposure", HarmCategory::Exposure),
            ("shared", HarmCategory::Exposure),
            ("destruction", HarmCategory::Destruction),
            ("ruined", HarmCategory::Destruction),
        ];
        for (word, category) in cases {
            assert_eq!(c.matched_categories(word), vec![*category], "{word}");
        }
    }

    #[test]
    fn test_agent_nouns_raise_level() {
        let c = classifier();

        let result = c.classify("My abuser said he is a killer");
        assert_eq!(result.matched_categories, vec!["lethality", "sexual_violence"]);
        assert_eq!(result.threat_level, ThreatLevel::High);

        let result =
            c.classify("the blackmailer sent a threatening, harmful message about exposure");
        assert_eq!(result.matched_categories, vec!["threat", "coercion", "exposure"]);
        assert_eq!(result.threat_level, ThreatLevel::Critical);
    }

    #[test]
    fn test_all_categories_in_table_order() {
        let text = "destroy, leak, blackmail, abuse, threat, kill";
        assert_eq!(classifier().matched_categories(text), HarmCategory::ALL.to_vec());
        assert_eq!(
            classifier().classify(text).threat_level,
            ThreatLevel::Critical
        );
    }

    #[test]
    fn test_deterministic() {
        let c = classifier();
        let text = "You'll regret this. I will expose you.";
        assert_eq!(c.classify(text), c.classify(text));
    }

    #[test]
    fn test_from_labels_dedups_and_never_low() {
        let result = Classification::from_labels(["harassment", " Harassment", "", "threat"]);
        assert_eq!(result.matched_categories, vec!["harassment", "threat"]);
        assert_eq!(result.threat_level, ThreatLevel::High);

        for n in 0..8 {
            let labels: Vec<String> = (0..n).map(|i| format!("label-{i}")).collect();
            let result = Classification::from_labels(&labels);
            assert_ne!(result.threat_level, ThreatLevel::Low);
            assert_eq!(result.harm_detected, n > 0);
        }
    }
}
