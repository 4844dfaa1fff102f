//! Built-in tokenizer used when no tagging service is configured.
//!
//! Produces word, number, punctuation and whitespace tokens with lower-cased
//! lemmas. Part-of-speech tags are limited to `PUNCT`, `NUM`, `SPACE` and `X`,
//! morphology is left empty.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::Result;
use crate::nlp::Analyzer;
use crate::transcript::Token;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:qu|[cdjlmnst])['’]|\d+(?:[.,]\d+)*|\w+(?:['’-]\w+)*|\s+|[^\w\s]",
    )
    .unwrap()
});

// French elided articles and pronouns.
const ELISIONS: &[(&str, &str)] = &[
    ("c", "ce"),
    ("d", "de"),
    ("j", "je"),
    ("l", "le"),
    ("m", "me"),
    ("n", "ne"),
    ("qu", "que"),
    ("s", "se"),
    ("t", "te"),
];

pub struct RuleAnalyzer {
    language: String,
}

impl RuleAnalyzer {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut byte_pos = 0;
        let mut char_pos = 0;

        let matches: Vec<_> = TOKEN.find_iter(text).collect();

        for (i, m) in matches.iter().enumerate() {
            char_pos += text[byte_pos..m.start()].chars().count();
            let len = m.as_str().chars().count();
            let next = matches.get(i + 1).map(|n| n.as_str());

            tokens.push(self.token(m.as_str(), next, char_pos, char_pos + len));

            char_pos += len;
            byte_pos = m.end();
        }

        tokens
    }

    fn token(
        &self,
        text: &str,
        next: Option<&str>,
        start_char: usize,
        end_char: usize,
    ) -> Token {
        let first = text.chars().next().unwrap_or(' ');

        let (pos, is_punct) = if first.is_whitespace() {
            ("SPACE", false)
        } else if text.chars().all(|c| !c.is_alphanumeric() && c != '_') {
            ("PUNCT", true)
        } else if first.is_ascii_digit() {
            ("NUM", false)
        } else {
            ("X", false)
        };

        Token {
            text: text.to_string(),
            lemma: self.lemma(text, next),
            pos: pos.to_string(),
            tag: pos.to_string(),
            morph: BTreeMap::new(),
            start_char,
            end_char,
            is_punct,
        }
    }

    fn lemma(&self, text: &str, next: Option<&str>) -> String {
        let lower = text.to_lowercase();

        if self.language == "fr"
            && let Some(stem) = lower.strip_suffix(['\'', '’'])
        {
            // s'il, s'ils: elided "si"
            if stem == "s"
                && next.is_some_and(|n| matches!(n.to_lowercase().as_str(), "il" | "ils"))
            {
                return "si".to_string();
            }
            if let Some((_, lemma)) = ELISIONS.iter().find(|(e, _)| *e == stem) {
                return lemma.to_string();
            }
        }

        lower
    }
}

#[async_trait]
impl Analyzer for RuleAnalyzer {
    async fn tag(&self, texts: &[String]) -> Result<Vec<Vec<Token>>> {
        Ok(texts.iter().map(|text| self.tokenize(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn splits_words_and_punctuation() {
        let tokens = RuleAnalyzer::new("fr").tokenize("Bonjour, le monde !");

        assert_eq!(
            texts(&tokens),
            ["Bonjour", ",", " ", "le", " ", "monde", " ", "!"]
        );
        assert!(tokens[1].is_punct);
        assert_eq!(tokens[1].pos, "PUNCT");
        assert_eq!(tokens[2].pos, "SPACE");
        assert_eq!(tokens[0].lemma, "bonjour");
    }

    #[test]
    fn splits_french_elisions() {
        let tokens = RuleAnalyzer::new("fr").tokenize("L'homme qu’on voit aujourd'hui");

        assert_eq!(
            texts(&tokens),
            ["L'", "homme", " ", "qu’", "on", " ", "voit", " ", "aujourd'hui"]
        );
        assert_eq!(tokens[0].lemma, "le");
        assert_eq!(tokens[3].lemma, "que");
    }

    #[test]
    fn elided_si_before_il() {
        let tokens = RuleAnalyzer::new("fr").tokenize("S'il pleut, s’ils partent. Il s'appelle Paul");

        let elided: Vec<_> = tokens
            .iter()
            .filter(|t| t.text.ends_with(['\'', '’']))
            .map(|t| (t.text.as_str(), t.lemma.as_str()))
            .collect();
        assert_eq!(elided, [("S'", "si"), ("s’", "si"), ("s'", "se")]);
    }

    #[test]
    fn keeps_elision_lemma_outside_french() {
        let tokens = RuleAnalyzer::new("en").tokenize("l'a");

        assert_eq!(tokens[0].lemma, "l'");
    }

    #[test]
    fn offsets_count_characters() {
        let tokens = RuleAnalyzer::new("fr").tokenize("Ça été 3,5 fois");

        let spans: Vec<_> = tokens
            .iter()
            .filter(|t| t.pos != "SPACE")
            .map(|t| (t.text.as_str(), t.start_char, t.end_char))
            .collect();

        assert_eq!(
            spans,
            [("Ça", 0, 2), ("été", 3, 6), ("3,5", 7, 10), ("fois", 11, 15)]
        );
        assert_eq!(tokens[4].pos, "NUM");
    }

    #[test]
    fn covers_whole_text() {
        let text = "  Qu'est-ce que c'est ?!  ";
        let tokens = RuleAnalyzer::new("fr").tokenize(text);

        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, text);
        assert_eq!(tokens.last().unwrap().end_char, text.chars().count());
    }

    #[tokio::test]
    async fn tags_each_text() {
        let docs = RuleAnalyzer::new("fr")
            .tag(&["Oui.".to_string(), "Non".to_string()])
            .await
            .unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(texts(&docs[0]), ["Oui", "."]);
        assert_eq!(texts(&docs[1]), ["Non"]);
    }
}
