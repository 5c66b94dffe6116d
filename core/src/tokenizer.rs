use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"[A-Za-z]+").expect("valid regex");
}

/// Tokenize text into lowercase words made of ASCII letters.
///
/// Every maximal run of anything else (digits, punctuation, whitespace,
/// non-ASCII letters) separates words, so empty tokens never appear. The
/// returned iterator is lazy; calling `tokenize` again restarts it. Indexing
/// and query parsing both go through here so their vocabularies agree.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    WORD_RE.find_iter(text).map(|m| m.as_str().to_ascii_lowercase())
}
