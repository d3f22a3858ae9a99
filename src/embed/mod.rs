//! Embedding generation
//!
//! This module provides an abstraction over the remote embedding service:
//! - A trait for embedding providers (seam for tests and alternate backends)
//! - An HTTP backend speaking the `{"inputs": [text]}` inference protocol
//!
//! Embedding failures are terminal for the call: the provider logs the cause
//! and returns `None`. Retries, if desired, belong to the caller.

mod http_backend;

pub use http_backend::*;

use async_trait::async_trait;

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text; `None` on rejection or any transport failure
    async fn embed(&self, text: &str) -> Option<Vec<f32>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Whether credentials for the remote service are present
    fn api_key_present(&self) -> bool;
}

/// Truncate text to at most `max_chars` characters, cutting back to the
/// nearest preceding word boundary. A prefix without any space is kept
/// whole. Lossy and silent; callers must not assume the full text survived.
pub fn truncate_to_word_boundary(text: &str, max_chars: usize) -> &str {
    let byte_cut = match text.char_indices().nth(max_chars) {
        Some((idx, _)) => idx,
        None => return text,
    };

    let prefix = &text[..byte_cut];
    match prefix.rfind(' ') {
        Some(pos) => &prefix[..pos],
        None => prefix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_to_word_boundary("hello world", 2000), "hello world");
    }

    #[test]
    fn test_truncates_at_word_boundary() {
        let words = vec!["alpha"; 600].join(" ");
        let truncated = truncate_to_word_boundary(&words, 2000);

        assert!(truncated.chars().count() <= 2000);
        // Never cuts mid-word: the result is a whole-word prefix
        assert!(truncated.split(' ').all(|w| w == "alpha"));
        assert!(!truncated.ends_with(' '));
    }

    #[test]
    fn test_unbroken_text_hard_cut() {
        let text = "x".repeat(3000);
        let truncated = truncate_to_word_boundary(&text, 2000);
        assert_eq!(truncated.chars().count(), 2000);
    }

    #[test]
    fn test_multibyte_boundary_safe() {
        let text = "é".repeat(2500);
        let truncated = truncate_to_word_boundary(&text, 2000);
        assert_eq!(truncated.chars().count(), 2000);
    }
}
