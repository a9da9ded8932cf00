use std::collections::HashSet;

use docsearch_core::traits::Answerer;

/// Answers with the context sentence sharing the most words with the query.
///
/// A local stand-in for a generative model: it never invents text, it only
/// points at the most relevant sentence of the retrieved excerpt.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveAnswerer;

impl Answerer for ExtractiveAnswerer {
    fn answer(&self, query: &str, context: &str) -> anyhow::Result<String> {
        let query_words: HashSet<String> = words(query).filter(|w| w.chars().count() > 2).collect();
        let mut best: Option<(usize, &str)> = None;
        for sentence in sentences(context) {
            let overlap = words(sentence).collect::<HashSet<_>>().intersection(&query_words).count();
            // Strictly greater keeps the earliest sentence on ties.
            if best.map_or(true, |(score, _)| overlap > score) {
                best = Some((overlap, sentence));
            }
        }
        Ok(best.map(|(_, s)| s.to_string()).unwrap_or_default())
    }
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}
