//! Unicode script classification for CJK text

use serde::{Deserialize, Serialize};

/// Share of non-control characters that must be CJK for text to count as CJK.
const CJK_TEXT_THRESHOLD: f32 = 0.10;
const KOREAN_THRESHOLD: f32 = 0.30;
const JAPANESE_THRESHOLD: f32 = 0.10;

/// Dominant CJK language of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLanguage {
    Chinese,
    Japanese,
    Korean,
    Mixed,
    None,
}

impl ScriptLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptLanguage::Chinese => "chinese",
            ScriptLanguage::Japanese => "japanese",
            ScriptLanguage::Korean => "korean",
            ScriptLanguage::Mixed => "mixed",
            ScriptLanguage::None => "none",
        }
    }
}

fn is_ideograph(cp: u32) -> bool {
    matches!(cp,
        0x4E00..=0x9FFF     // CJK Unified Ideographs
        | 0x3400..=0x4DBF   // Extension A
        | 0x20000..=0x2A6DF // Extension B
    )
}

fn is_hiragana(cp: u32) -> bool {
    (0x3040..=0x309F).contains(&cp)
}

fn is_katakana(cp: u32) -> bool {
    (0x30A0..=0x30FF).contains(&cp)
}

fn is_hangul(cp: u32) -> bool {
    matches!(cp,
        0xAC00..=0xD7AF   // Hangul Syllables
        | 0x1100..=0x11FF // Hangul Jamo
        | 0x3130..=0x318F // Compatibility Jamo
    )
}

fn is_fullwidth(cp: u32) -> bool {
    (0xFF00..=0xFFEF).contains(&cp)
}

/// Returns `true` if the character belongs to one of the CJK blocks.
pub fn is_cjk_char(c: char) -> bool {
    let cp = c as u32;
    is_ideograph(cp) || is_hiragana(cp) || is_katakana(cp) || is_hangul(cp) || is_fullwidth(cp)
}

/// Returns `true` if more than 10% of the printable characters are CJK.
///
/// Whitespace and control characters (codepoint <= 0x20) are not counted.
pub fn is_cjk_text(text: &str) -> bool {
    let mut total = 0usize;
    let mut cjk = 0usize;

    for c in text.chars().filter(|c| *c as u32 > 0x20) {
        total += 1;
        if is_cjk_char(c) {
            cjk += 1;
        }
    }

    if total == 0 {
        return false;
    }

    cjk as f32 / total as f32 > CJK_TEXT_THRESHOLD
}

/// Guess which CJK language dominates the text.
pub fn detect_language(text: &str) -> ScriptLanguage {
    let mut ideographs = 0usize;
    let mut kana = 0usize;
    let mut hangul = 0usize;
    let mut total = 0usize;

    for c in text.chars() {
        let cp = c as u32;
        if is_ideograph(cp) {
            ideographs += 1;
        } else if is_hiragana(cp) || is_katakana(cp) {
            kana += 1;
        } else if is_hangul(cp) {
            hangul += 1;
        }
        if is_cjk_char(c) {
            total += 1;
        }
    }

    if total == 0 {
        return ScriptLanguage::None;
    }

    let total = total as f32;
    if hangul as f32 / total > KOREAN_THRESHOLD {
        ScriptLanguage::Korean
    } else if kana as f32 / total > JAPANESE_THRESHOLD {
        ScriptLanguage::Japanese
    } else if ideographs > 0 {
        ScriptLanguage::Chinese
    } else {
        ScriptLanguage::Mixed
    }
}
