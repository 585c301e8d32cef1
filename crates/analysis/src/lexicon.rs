use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use aspector_core::config::LexiconConfig;
use aspector_core::constants::{COMPOUND_ALPHA, MIN_ASPECT_LEN};
use aspector_core::{AspectSentiment, ScoreBreakdown, Sentiment};

use crate::analyzer::AspectAnalyzer;
use crate::error::{AnalysisError, AnalysisResult};

/// Emoji replaced with English words before tokenization. Longer sequences
/// first, so the variation-selector forms win over their bare code points.
const EMOJI_WORDS: &[(&str, &str)] = &[
    ("❤️", "love"),
    ("❤", "love"),
    ("😍", "love"),
    ("🥰", "love"),
    ("😊", "happy"),
    ("😀", "happy"),
    ("😃", "happy"),
    ("🙂", "happy"),
    ("😠", "angry"),
    ("😡", "angry"),
    ("😢", "sad"),
    ("😭", "sad"),
    ("😂", "laughing"),
    ("🤣", "laughing"),
    ("👍", "good"),
    ("👎", "bad"),
];

/// Weighted opinion terms with valence in [-4, 4].
const WEIGHTED_TERMS: &[(&str, f64)] = &[
    // positive
    ("good", 1.9),
    ("great", 3.1),
    ("best", 3.2),
    ("better", 1.9),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("fantastic", 2.6),
    ("wonderful", 2.7),
    ("marvelous", 2.7),
    ("splendid", 2.6),
    ("exceptional", 2.6),
    ("superb", 3.0),
    ("outstanding", 3.1),
    ("brilliant", 2.8),
    ("incredible", 2.8),
    ("perfect", 2.7),
    ("flawless", 2.7),
    ("delightful", 2.6),
    ("delicious", 2.3),
    ("tasty", 1.9),
    ("flavorful", 2.0),
    ("juicy", 1.4),
    ("crispy", 1.3),
    ("tender", 1.4),
    ("fresh", 1.3),
    ("refreshing", 1.9),
    ("love", 3.2),
    ("loved", 2.9),
    ("like", 1.5),
    ("liked", 1.5),
    ("enjoy", 2.2),
    ("enjoyed", 2.2),
    ("enjoyable", 2.2),
    ("happy", 2.7),
    ("glad", 2.0),
    ("pleased", 2.2),
    ("nice", 1.8),
    ("lovely", 2.8),
    ("beautiful", 2.9),
    ("gorgeous", 3.0),
    ("stunning", 2.9),
    ("pretty", 1.8),
    ("elegant", 2.1),
    ("sleek", 1.7),
    ("charming", 2.2),
    ("cozy", 1.9),
    ("comfortable", 2.1),
    ("spacious", 1.6),
    ("clean", 1.7),
    ("immaculate", 2.2),
    ("pristine", 1.9),
    ("friendly", 2.2),
    ("polite", 1.8),
    ("courteous", 1.9),
    ("attentive", 1.9),
    ("helpful", 1.9),
    ("knowledgeable", 1.8),
    ("generous", 2.3),
    ("fast", 1.3),
    ("quick", 1.3),
    ("quickly", 1.3),
    ("prompt", 1.5),
    ("responsive", 1.9),
    ("efficient", 1.8),
    ("smooth", 1.6),
    ("smoothly", 1.6),
    ("seamless", 1.8),
    ("snappy", 1.4),
    ("reliable", 1.8),
    ("stable", 1.4),
    ("sturdy", 1.5),
    ("solid", 1.4),
    ("intuitive", 1.8),
    ("convenient", 1.7),
    ("affordable", 1.5),
    ("satisfying", 2.0),
    ("impressive", 2.3),
    ("recommend", 1.7),
    ("recommended", 1.7),
    ("vibrant", 1.8),
    ("authentic", 1.6),
    ("quiet", 1.1),
    ("laughing", 2.6),
    ("fun", 2.3),
    ("fine", 0.8),
    ("decent", 1.2),
    ("acceptable", 0.6),
    ("passable", 0.3),
    // negative
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.4),
    ("terrible", -3.1),
    ("awful", -3.1),
    ("horrible", -2.9),
    ("dreadful", -2.8),
    ("atrocious", -3.0),
    ("abysmal", -3.0),
    ("appalling", -2.8),
    ("poor", -2.1),
    ("lousy", -2.1),
    ("pathetic", -2.5),
    ("miserable", -2.5),
    ("mediocre", -1.3),
    ("lackluster", -1.5),
    ("subpar", -1.6),
    ("disappointing", -2.2),
    ("disappointed", -2.2),
    ("disappointment", -2.2),
    ("disgusting", -3.0),
    ("gross", -2.4),
    ("hate", -2.7),
    ("hated", -2.7),
    ("dislike", -1.6),
    ("bland", -1.4),
    ("tasteless", -1.8),
    ("stale", -1.6),
    ("soggy", -1.5),
    ("greasy", -1.4),
    ("watery", -1.3),
    ("burnt", -1.8),
    ("undercooked", -1.9),
    ("overcooked", -1.7),
    ("cold", -0.9),
    ("salty", -0.9),
    ("smelly", -2.0),
    ("slow", -1.2),
    ("sluggish", -1.6),
    ("laggy", -1.8),
    ("late", -1.1),
    ("delayed", -1.2),
    ("buggy", -1.9),
    ("broken", -2.0),
    ("faulty", -2.0),
    ("defective", -2.1),
    ("flimsy", -1.7),
    ("shoddy", -1.9),
    ("crashes", -2.0),
    ("crashed", -2.0),
    ("freezes", -1.7),
    ("unreliable", -1.9),
    ("unstable", -1.6),
    ("useless", -1.9),
    ("pointless", -1.7),
    ("clunky", -1.5),
    ("confusing", -1.6),
    ("outdated", -1.3),
    ("weak", -1.7),
    ("rude", -2.4),
    ("unfriendly", -1.9),
    ("unhelpful", -1.8),
    ("dismissive", -1.7),
    ("dirty", -1.9),
    ("filthy", -2.5),
    ("messy", -1.6),
    ("stained", -1.4),
    ("noisy", -1.4),
    ("loud", -0.9),
    ("cramped", -1.4),
    ("uncomfortable", -1.9),
    ("overpriced", -1.9),
    ("pricey", -1.1),
    ("expensive", -0.9),
    ("frustrating", -2.2),
    ("annoying", -1.9),
    ("angry", -2.3),
    ("sad", -2.1),
    ("upset", -1.9),
    ("sucks", -2.2),
    ("garbage", -2.3),
    ("trash", -2.3),
    ("damaged", -1.9),
    ("scratched", -1.2),
    ("ugly", -2.3),
    ("inconsistent", -1.3),
    ("sloppy", -1.6),
    // equivocal terms kept at zero so they still anchor a neutral record
    ("okay", 0.0),
    ("ok", 0.0),
    ("alright", 0.0),
    ("average", 0.0),
    ("standard", 0.0),
    ("normal", 0.0),
    ("ordinary", 0.0),
];

static VALENCE: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| WEIGHTED_TERMS.iter().copied().collect());

static EMOJI_REPLACEMENTS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| EMOJI_WORDS.iter().map(|(_, word)| *word).collect());

/// Conjunctions that end the current clause. The conjunction token itself
/// belongs to no clause.
static CONTRAST_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "but", "however", "although", "though", "yet", "while", "whereas",
    ]
    .into_iter()
    .collect()
});

static NEGATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "not", "no", "never", "none", "neither", "nor", "cannot", "without",
    ]
    .into_iter()
    .collect()
});

static INTENSIFIERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "very",
        "extremely",
        "really",
        "so",
        "super",
        "highly",
        "incredibly",
        "absolutely",
    ]
    .into_iter()
    .collect()
});

static SOFTENERS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["slightly", "somewhat", "barely", "mildly"].into_iter().collect());

/// Two-token softeners, matched against (previous, current) token pairs.
const SOFTENER_BIGRAMS: &[(&str, &str)] = &[("a", "bit"), ("kind", "of"), ("sort", "of")];

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "was", "were", "are", "this", "that", "these", "those", "there", "here",
        "when", "what", "which", "would", "could", "should", "will", "can", "may", "might", "must",
        "shall", "have", "has", "had", "having", "does", "did", "doing", "done", "they", "them",
        "their", "theirs", "she", "her", "hers", "him", "his", "its", "our", "ours", "your",
        "yours", "you", "who", "whom", "why", "how", "all", "any", "each", "both", "few", "more",
        "most", "other", "others", "another", "some", "such", "only", "own", "same", "than",
        "then", "too", "just", "also", "even", "still", "ever", "about", "above", "after", "again",
        "against", "before", "below", "between", "during", "into", "once", "over", "under",
        "until", "upon", "within", "out", "off", "from", "with", "for", "get", "got", "gets",
        "getting", "make", "made", "makes", "making", "take", "took", "taken", "takes", "come",
        "came", "comes", "going", "goes", "gone", "went", "seem", "seemed", "seems", "look",
        "looked", "looks", "looking", "feel", "feels", "felt", "feeling", "think", "thinks",
        "thought", "know", "knows", "knew", "known", "say", "says", "said", "want", "wants",
        "wanted", "tried", "tries", "trying", "use", "used", "uses", "using", "thing", "things",
        "stuff", "something", "anything", "everything", "nothing", "someone", "anyone", "everyone",
        "nobody", "quite", "rather", "fairly", "almost", "always", "usually", "often",
        "sometimes", "rarely", "already", "because", "since", "been", "being", "every", "whole",
        "new", "old", "one", "two", "way", "ways", "lot", "lots", "bit", "kind", "sort",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone)]
struct Token {
    text: String,
    lower: String,
    start: usize,
    end: usize,
    index: usize,
    /// Clause id, or `None` for clause-boundary tokens.
    clause: Option<usize>,
}

#[derive(Debug)]
struct Mention {
    key: String,
    display: String,
    span: (usize, usize),
    compound: f64,
}

/// Rule-based analyzer scoring aspects against a weighted lexicon.
///
/// The pipeline normalizes emoji to words, tokenizes with byte offsets,
/// segments the token stream into clauses, pairs aspect candidates with
/// nearby opinion words, and scores each pair with negation, intensifier,
/// and softener handling. Mentions of the same aspect merge by averaging
/// their signed scores.
pub struct LexiconAnalyzer {
    config: LexiconConfig,
    word_regex: Regex,
    name_str: String,
}

impl LexiconAnalyzer {
    /// Creates a new LexiconAnalyzer with the given scoring configuration.
    pub fn new(config: LexiconConfig) -> AnalysisResult<Self> {
        let word_regex =
            Regex::new(r"[\w']+").map_err(|e| AnalysisError::Config(e.to_string()))?;

        Ok(Self {
            config,
            word_regex,
            name_str: "lexicon".to_string(),
        })
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut clause = 0usize;
        let mut last_end = 0usize;

        for (index, found) in self.word_regex.find_iter(text).enumerate() {
            if !tokens.is_empty() {
                let gap = &text[last_end..found.start()];
                if gap
                    .chars()
                    .any(|c| matches!(c, '.' | ',' | ';' | '!' | '?'))
                {
                    clause += 1;
                }
            }

            let mut raw = found.as_str().to_string();
            let mut lower = raw.to_lowercase();
            let mut end = found.end();
            // Drop possessive suffixes so "kitchen's" scores as "kitchen".
            if lower.ends_with("'s") {
                raw.truncate(raw.len() - 2);
                lower.truncate(lower.len() - 2);
                end -= 2;
            }

            let slot = if CONTRAST_WORDS.contains(lower.as_str()) {
                clause += 1;
                None
            } else {
                Some(clause)
            };

            tokens.push(Token {
                text: raw,
                lower,
                start: found.start(),
                end,
                index,
                clause: slot,
            });
            last_end = found.end();
        }

        tokens
    }

    fn is_aspect_candidate(&self, token: &Token) -> bool {
        if token.clause.is_none() || token.lower.chars().count() < MIN_ASPECT_LEN {
            return false;
        }
        if !token.lower.chars().any(|c| c.is_alphabetic()) {
            return false;
        }
        let word = token.lower.as_str();
        !STOPWORDS.contains(word)
            && !VALENCE.contains_key(word)
            && !NEGATORS.contains(word)
            && !INTENSIFIERS.contains(word)
            && !SOFTENERS.contains(word)
            && !EMOJI_REPLACEMENTS.contains(word)
            && !word.ends_with("n't")
    }

    fn is_negated(&self, tokens: &[Token], opinion: &Token) -> bool {
        let start = opinion.index.saturating_sub(self.config.negation_window);
        tokens[start..opinion.index].iter().any(|token| {
            token.clause == opinion.clause
                && (NEGATORS.contains(token.lower.as_str()) || token.lower.ends_with("n't"))
        })
    }

    fn modifier_factor(&self, tokens: &[Token], aspect: &Token) -> f64 {
        let start = aspect.index.saturating_sub(self.config.adverb_window);
        let end = (aspect.index + self.config.adverb_window + 1).min(tokens.len());
        let mut factor = 1.0;

        for token in &tokens[start..end] {
            if token.index == aspect.index || token.clause != aspect.clause {
                continue;
            }
            if INTENSIFIERS.contains(token.lower.as_str()) {
                factor *= self.config.intensifier_boost;
            } else if SOFTENERS.contains(token.lower.as_str()) {
                factor *= self.config.softener_damping;
            } else if token.index > 0 {
                let prev = &tokens[token.index - 1];
                if SOFTENER_BIGRAMS
                    .iter()
                    .any(|(first, second)| prev.lower == *first && token.lower == *second)
                {
                    factor *= self.config.softener_damping;
                }
            }
        }

        factor
    }

    fn score_mentions(&self, tokens: &[Token]) -> Vec<Mention> {
        let mut mentions = Vec::new();

        for aspect in tokens.iter().filter(|t| self.is_aspect_candidate(t)) {
            for opinion in tokens {
                if opinion.clause != aspect.clause {
                    continue;
                }
                let Some(&valence) = VALENCE.get(opinion.lower.as_str()) else {
                    continue;
                };
                if aspect.index.abs_diff(opinion.index) > self.config.opinion_window {
                    continue;
                }

                let signed = if self.is_negated(tokens, opinion) {
                    -valence
                } else {
                    valence
                };
                let compound = normalize_valence(signed) * self.modifier_factor(tokens, aspect);

                mentions.push(Mention {
                    key: aspect.lower.clone(),
                    display: aspect.text.clone(),
                    span: (aspect.start, aspect.end),
                    compound: compound.clamp(-1.0, 1.0),
                });
            }
        }

        mentions
    }
}

impl AspectAnalyzer for LexiconAnalyzer {
    fn name(&self) -> &str {
        &self.name_str
    }

    fn analyze(&mut self, text: &str) -> AnalysisResult<Vec<AspectSentiment>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let normalized = replace_emoji(text);
        let tokens = self.tokenize(&normalized);
        let mentions = self.score_mentions(&tokens);

        Ok(merge_mentions(mentions))
    }
}

/// Replace known emoji with their word equivalents, padded with spaces.
fn replace_emoji(text: &str) -> String {
    let mut out = text.to_string();
    for (emoji, word) in EMOJI_WORDS {
        if out.contains(emoji) {
            out = out.replace(emoji, &format!(" {} ", word));
        }
    }
    out
}

/// Normalize a raw valence onto [-1, 1]: v / sqrt(v^2 + alpha).
fn normalize_valence(valence: f64) -> f64 {
    valence / (valence * valence + COMPOUND_ALPHA).sqrt()
}

/// Merge mentions of the same aspect by averaging their signed scores.
fn merge_mentions(mentions: Vec<Mention>) -> Vec<AspectSentiment> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, (String, (usize, usize), Vec<f64>)> = HashMap::new();

    for mention in mentions {
        match grouped.entry(mention.key) {
            Entry::Occupied(mut entry) => entry.get_mut().2.push(mention.compound),
            Entry::Vacant(entry) => {
                order.push(entry.key().clone());
                entry.insert((mention.display, mention.span, vec![mention.compound]));
            }
        }
    }

    let mut results = Vec::new();
    for key in order {
        if let Some((display, span, scores)) = grouped.remove(&key) {
            let average = scores.iter().sum::<f64>() / scores.len() as f64;
            let average = average.clamp(-1.0, 1.0);

            results.push(
                AspectSentiment::new(display, Sentiment::from_compound(average), average.abs())
                    .with_span(span.0, span.1)
                    .with_breakdown(ScoreBreakdown::from_compound(average)),
            );
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> LexiconAnalyzer {
        LexiconAnalyzer::new(LexiconConfig::default()).expect("build analyzer")
    }

    fn find<'a>(results: &'a [AspectSentiment], aspect: &str) -> &'a AspectSentiment {
        results
            .iter()
            .find(|r| r.aspect.eq_ignore_ascii_case(aspect))
            .unwrap_or_else(|| panic!("no record for aspect '{}': {:?}", aspect, results))
    }

    #[test]
    fn test_contrasting_clauses() {
        let mut analyzer = analyzer();
        let results = analyzer
            .analyze("The pizza was delicious but the service was terrible.")
            .expect("analyze");

        assert_eq!(results.len(), 2);
        assert_eq!(find(&results, "pizza").sentiment, Sentiment::Positive);
        assert_eq!(find(&results, "service").sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let mut analyzer = analyzer();
        let results = analyzer.analyze("The pizza was not good.").expect("analyze");

        let pizza = find(&results, "pizza");
        assert_eq!(pizza.sentiment, Sentiment::Negative);
        assert!(pizza.confidence > 0.3);
    }

    #[test]
    fn test_contraction_negation() {
        let mut analyzer = analyzer();
        let results = analyzer
            .analyze("The staff wasn't friendly at all.")
            .expect("analyze");

        assert_eq!(find(&results, "staff").sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_equivocal_word_is_neutral() {
        let mut analyzer = analyzer();
        let results = analyzer.analyze("The food was okay.").expect("analyze");

        let food = find(&results, "food");
        assert_eq!(food.sentiment, Sentiment::Neutral);
        assert!(food.confidence < 0.05);
    }

    #[test]
    fn test_intensifier_raises_confidence() {
        let mut analyzer = analyzer();
        let plain = analyzer.analyze("The movie was good.").expect("analyze");
        let boosted = analyzer
            .analyze("The movie was very good.")
            .expect("analyze");

        let plain = find(&plain, "movie").confidence;
        let boosted = find(&boosted, "movie").confidence;
        assert!(boosted >= plain, "expected {} >= {}", boosted, plain);
        assert!(boosted <= 1.0);
    }

    #[test]
    fn test_softener_lowers_confidence() {
        let mut analyzer = analyzer();
        let plain = analyzer.analyze("The service was bad.").expect("analyze");
        let softened = analyzer
            .analyze("The service was somewhat bad.")
            .expect("analyze");

        let softened = find(&softened, "service");
        assert_eq!(softened.sentiment, Sentiment::Negative);
        assert!(softened.confidence <= find(&plain, "service").confidence);
    }

    #[test]
    fn test_softener_bigram() {
        let mut analyzer = analyzer();
        let plain = analyzer.analyze("The delivery was slow.").expect("analyze");
        let softened = analyzer
            .analyze("The delivery was a bit slow.")
            .expect("analyze");

        assert!(
            find(&softened, "delivery").confidence <= find(&plain, "delivery").confidence
        );
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        let mut analyzer = analyzer();
        assert!(analyzer.analyze("").expect("analyze").is_empty());
        assert!(analyzer.analyze("   \n\t ").expect("analyze").is_empty());
    }

    #[test]
    fn test_aspect_without_opinion_is_absent() {
        let mut analyzer = analyzer();
        let results = analyzer.analyze("The pizza.").expect("analyze");
        assert!(results.is_empty());
    }

    #[test]
    fn test_emoji_normalization() {
        let mut analyzer = analyzer();
        let results = analyzer.analyze("I ❤️ the pizza").expect("analyze");

        let pizza = find(&results, "pizza");
        assert_eq!(pizza.sentiment, Sentiment::Positive);
        assert!(pizza.confidence > 0.5);
    }

    #[test]
    fn test_mentions_average_to_neutral() {
        let mut analyzer = analyzer();
        let results = analyzer
            .analyze("The hotel was nice but the hotel was noisy.")
            .expect("analyze");

        assert_eq!(results.len(), 1);
        let hotel = &results[0];
        assert_eq!(hotel.sentiment, Sentiment::Neutral);
        assert!(hotel.confidence < 0.05);
    }

    #[test]
    fn test_span_points_at_aspect() {
        let mut analyzer = analyzer();
        let text = "The pasta was delicious.";
        let results = analyzer.analyze(text).expect("analyze");

        let pasta = find(&results, "pasta");
        let (start, end) = pasta.text_span.expect("span");
        assert_eq!(&text[start..end], "pasta");
    }

    #[test]
    fn test_breakdown_present() {
        let mut analyzer = analyzer();
        let results = analyzer.analyze("The pizza was great.").expect("analyze");

        let breakdown = find(&results, "pizza").breakdown.as_ref().expect("breakdown");
        assert!(breakdown.compound > 0.05);
        assert!(breakdown.positive > 0.0);
        assert_eq!(breakdown.negative, 0.0);
    }

    #[test]
    fn test_opinion_stays_in_clause() {
        let mut analyzer = analyzer();
        let results = analyzer
            .analyze("The pizza was great. The screen cracked.")
            .expect("analyze");

        // "great" must not leak across the sentence boundary onto "screen".
        assert!(results.iter().all(|r| !r.aspect.eq_ignore_ascii_case("screen")));
    }

    #[test]
    fn test_deterministic() {
        let mut analyzer = analyzer();
        let text = "The camera was excellent but the battery was weak.";
        let first = analyzer.analyze(text).expect("analyze");
        let second = analyzer.analyze(text).expect("analyze");

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.aspect, b.aspect);
            assert_eq!(a.sentiment, b.sentiment);
            assert_eq!(a.confidence, b.confidence);
        }
    }

    #[test]
    fn test_possessive_suffix_dropped() {
        let mut analyzer = analyzer();
        let results = analyzer
            .analyze("The kitchen's layout was confusing.")
            .expect("analyze");

        assert!(results.iter().any(|r| r.aspect == "layout"));
        assert!(results.iter().any(|r| r.aspect == "kitchen"));
    }

    #[test]
    fn test_double_negative_reads_positive() {
        let mut analyzer = analyzer();
        let results = analyzer.analyze("The pizza was not bad.").expect("analyze");

        assert_eq!(find(&results, "pizza").sentiment, Sentiment::Positive);
    }
}
