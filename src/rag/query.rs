//! Query analysis: keyword extraction and intent detection

/// Detected intent of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    /// Asks for a procedure or steps
    HowTo,
    /// Asks what something is
    Definition,
    /// Asks why something happens
    Reason,
    General,
}

impl QueryIntent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HowTo => "how_to",
            Self::Definition => "definition",
            Self::Reason => "reason",
            Self::General => "general",
        }
    }
}

/// Result of analyzing a user question
#[derive(Debug, Clone)]
pub struct QueryAnalysis {
    pub original_query: String,
    pub keywords: Vec<String>,
    pub intent: QueryIntent,
}

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "do", "does", "did", "can", "could", "will",
    "would", "should", "what", "which", "who", "whom", "this", "that", "these", "those", "for",
    "and", "but", "not", "with", "about", "from", "into", "of", "on", "in", "to", "at", "by",
    "my", "your", "our", "their", "its",
];

const HOW_TO_MARKERS: &[&str] = &["how", "method", "procedure", "steps", "process", "way"];
const DEFINITION_MARKERS: &[&str] = &["what is", "what are", "define", "definition", "meaning"];
const REASON_MARKERS: &[&str] = &["why", "reason", "cause", "because"];

/// Analyzes questions before retrieval
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryAnalyzer;

impl QueryAnalyzer {
    #[must_use]
    pub fn analyze(&self, query: &str) -> QueryAnalysis {
        QueryAnalysis {
            original_query: query.to_string(),
            keywords: self.extract_keywords(query),
            intent: self.detect_intent(query),
        }
    }

    /// Extract content words: stopwords and short tokens are dropped
    #[must_use]
    pub fn extract_keywords(&self, query: &str) -> Vec<String> {
        query
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|w| w.chars().count() > 2 && !STOPWORDS.contains(&w.as_str()))
            .collect()
    }

    #[must_use]
    pub fn detect_intent(&self, query: &str) -> QueryIntent {
        let lower = query.to_lowercase();
        if DEFINITION_MARKERS.iter().any(|m| lower.contains(m)) {
            QueryIntent::Definition
        } else if HOW_TO_MARKERS.iter().any(|m| lower.contains(m)) {
            QueryIntent::HowTo
        } else if REASON_MARKERS.iter().any(|m| lower.contains(m)) {
            QueryIntent::Reason
        } else {
            QueryIntent::General
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_extraction_drops_stopwords() {
        let analyzer = QueryAnalyzer;
        let keywords = analyzer.extract_keywords("What is the annual fee for the card?");
        assert_eq!(keywords, vec!["annual", "fee", "card"]);
    }

    #[test]
    fn test_keyword_extraction_drops_short_tokens() {
        let analyzer = QueryAnalyzer;
        let keywords = analyzer.extract_keywords("is it ok to go");
        assert!(keywords.is_empty());
    }

    #[test]
    fn test_intent_how_to() {
        let analyzer = QueryAnalyzer;
        assert_eq!(
            analyzer.detect_intent("How do I reset my password?"),
            QueryIntent::HowTo
        );
        assert_eq!(
            analyzer.detect_intent("Card replacement procedure"),
            QueryIntent::HowTo
        );
    }

    #[test]
    fn test_intent_definition_beats_how_to() {
        // "What is X" questions often also contain "how"-adjacent words;
        // definition takes precedence.
        let analyzer = QueryAnalyzer;
        assert_eq!(
            analyzer.detect_intent("What is the settlement process?"),
            QueryIntent::Definition
        );
    }

    #[test]
    fn test_intent_reason_and_general() {
        let analyzer = QueryAnalyzer;
        assert_eq!(
            analyzer.detect_intent("Why was my payment declined?"),
            QueryIntent::Reason
        );
        assert_eq!(
            analyzer.detect_intent("Annual fee schedule"),
            QueryIntent::General
        );
    }
}
