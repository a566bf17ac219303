//! Input checks applied before anything reaches the model.
//!
//! Each rule is a standalone predicate; `validate` runs them in order and stops at the first failure.

use crate::config::TranslationConfig;

pub const MSG_EMPTY: &str = "输入内容不能为空，请重新输入。";
pub const MSG_TOO_LONG: &str = "输入内容过长，请缩短后再试。";
pub const MSG_SAME_LANGUAGE: &str = "请输入其他语言内容以进行翻译。";
pub const MSG_SYMBOLS_ONLY: &str = "输入内容仅包含特殊字符，无法翻译，请重新输入。";
pub const MSG_SENSITIVE: &str = "输入内容包含敏感信息，无法翻译。";

/// Why an input was refused. The user receives `user_message()` as the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("input is empty")]
    Empty,
    #[error("input exceeds the length limit")]
    TooLong,
    #[error("input is already Chinese")]
    SameLanguage,
    #[error("input has no letters or digits")]
    SymbolsOnly,
    #[error("input contains a sensitive term")]
    Sensitive,
}

impl Rejection {
    pub fn user_message(&self) -> &'static str {
        match self {
            Rejection::Empty => MSG_EMPTY,
            Rejection::TooLong => MSG_TOO_LONG,
            Rejection::SameLanguage => MSG_SAME_LANGUAGE,
            Rejection::SymbolsOnly => MSG_SYMBOLS_ONLY,
            Rejection::Sensitive => MSG_SENSITIVE,
        }
    }
}

/// Limits for `validate`. Sensitive terms are stored lowercased.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub max_input_chars: usize,
    sensitive_terms: Vec<String>,
}

impl ValidationRules {
    pub fn new(max_input_chars: usize, sensitive_terms: &[String]) -> Self {
        Self {
            max_input_chars,
            sensitive_terms: sensitive_terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &TranslationConfig) -> Self {
        Self::new(config.max_input_chars, &config.sensitive_terms)
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::from_config(&TranslationConfig::default())
    }
}

/// Trim `text` and run every rule in order. Returns the trimmed text when all pass.
pub fn validate<'a>(text: &'a str, rules: &ValidationRules) -> Result<&'a str, Rejection> {
    let text = text.trim();
    if is_blank(text) {
        return Err(Rejection::Empty);
    }
    if exceeds_length(text, rules.max_input_chars) {
        return Err(Rejection::TooLong);
    }
    if is_chinese(text) {
        return Err(Rejection::SameLanguage);
    }
    if is_symbols_only(text) {
        return Err(Rejection::SymbolsOnly);
    }
    if let Some(term) = find_sensitive_term(text, &rules.sensitive_terms) {
        log::debug!("validate: matched sensitive term {:?}", term);
        return Err(Rejection::Sensitive);
    }
    Ok(text)
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Length is counted in characters, not bytes.
pub fn exceeds_length(text: &str, max_chars: usize) -> bool {
    text.chars().count() > max_chars
}

fn is_han(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF
        | 0x2F800..=0x2FA1F
        | 0x30000..=0x3134F)
}

fn is_kana(c: char) -> bool {
    matches!(c as u32, 0x3040..=0x30FF | 0x31F0..=0x31FF | 0xFF66..=0xFF9F)
}

fn is_hangul(c: char) -> bool {
    matches!(c as u32, 0xAC00..=0xD7AF | 0x1100..=0x11FF | 0x3130..=0x318F)
}

/// Chinese (simplified or traditional): Han ideographs are at least half of the letters,
/// and there is no kana (Japanese) or Hangul (Korean).
///
/// Only the script is inspected, so Japanese written entirely in kanji (e.g. "日本語")
/// is indistinguishable from Chinese and is classed as Chinese.
pub fn is_chinese(text: &str) -> bool {
    let mut han = 0usize;
    let mut letters = 0usize;
    for c in text.chars() {
        if is_kana(c) || is_hangul(c) {
            return false;
        }
        if is_han(c) {
            han += 1;
            letters += 1;
        } else if c.is_alphabetic() {
            letters += 1;
        }
    }
    han > 0 && han * 2 >= letters
}

/// No letter or digit in any script: punctuation, symbols, emoji only.
pub fn is_symbols_only(text: &str) -> bool {
    !text.trim().is_empty() && !text.chars().any(char::is_alphanumeric)
}

/// First configured term (already lowercased) found in `text`, case-insensitively.
pub fn find_sensitive_term<'t>(text: &str, terms: &'t [String]) -> Option<&'t str> {
    if terms.is_empty() {
        return None;
    }
    let lowered = text.to_lowercase();
    terms
        .iter()
        .find(|t| lowered.contains(t.as_str()))
        .map(String::as_str)
}
