/// A tokenizer receives a stream of characters, breaks it up into individual tokens (usually individual words),
/// and outputs a stream of tokens.
/// The standard tokenizer splits on anything that is not a letter or digit,
/// so "MacBook Pro 16-inch" becomes [MacBook, Pro, 16, inch].
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

pub struct StandardTokenizer;

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_string())
            .collect::<Vec<String>>()
    }
}

/// A token filter receives the token stream and may add, remove, or change tokens.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<String>) -> Vec<String>;
}

pub struct LowerCaseTokenFilter;

impl TokenFilter for LowerCaseTokenFilter {
    fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter().map(|t| t.to_lowercase()).collect()
    }
}

/// Trims surrounding whitespace and drops tokens left empty.
pub struct TrimTokenFilter;

impl TokenFilter for TrimTokenFilter {
    fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter_map(|t| {
                let trimmed = t.trim();
                if trimmed.is_empty() {
                    return None;
                }
                if trimmed.len() != t.len() {
                    return Some(trimmed.to_string());
                }
                Some(t)
            })
            .collect()
    }
}

/// Pure text analysis pipeline - no async, no I/O, just text transformations
pub struct TextAnalyzer {
    tokenizer: Box<dyn Tokenizer>,
    token_filters: Vec<Box<dyn TokenFilter>>,
}

impl Default for TextAnalyzer {
    /// Standard tokenizer followed by lowercase and trim, matching the
    /// analyzer the catalog index applies to product names.
    fn default() -> Self {
        Self::new(
            Box::new(StandardTokenizer),
            vec![Box::new(LowerCaseTokenFilter), Box::new(TrimTokenFilter)],
        )
    }
}

impl TextAnalyzer {
    pub fn new(tokenizer: Box<dyn Tokenizer>, token_filters: Vec<Box<dyn TokenFilter>>) -> Self {
        Self {
            tokenizer,
            token_filters,
        }
    }

    /// Runs the tokenizer and every filter in order, returning the surviving terms.
    pub fn terms(&self, raw_content: &str) -> Vec<String> {
        let mut tokens = self.tokenizer.tokenize(raw_content);
        for filter in self.token_filters.iter() {
            tokens = filter.filter(tokens);
        }
        tokens
    }
}
