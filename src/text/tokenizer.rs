//! Multilingual tokenizer producing BM25 terms.
//!
//! Latin runs are lowercased, stripped of punctuation and split on
//! whitespace. CJK runs have no word boundaries, so they are cut into
//! overlapping character bigrams (a lone CJK character is kept as-is).
//! CJK stop-words are dropped at the end.
//!
//! The output is a bag of terms: token order is not meaningful and no
//! positions are kept.

use super::script::is_cjk_char;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("static pattern is valid"));

const CHINESE_STOP_WORDS: &[&str] = &[
    "的", "了", "和", "是", "就", "都", "而", "及", "与", "着", "或", "一个", "没有", "我们",
    "你们", "他们", "她们", "它们", "这个", "那个", "这些", "那些", "自己", "什么", "因为",
    "所以", "但是", "如果", "虽然", "然后", "已经", "还是", "可以", "这", "那", "在", "有",
    "我", "你", "他", "她", "它", "也", "很", "到", "说", "要", "去", "会", "被", "把", "让",
    "从", "对", "为", "以", "之", "其", "于",
];

const JAPANESE_STOP_WORDS: &[&str] = &[
    "の", "に", "は", "を", "た", "が", "で", "て", "と", "し", "れ", "さ", "ある", "いる",
    "も", "する", "から", "な", "こと", "として", "い", "や", "など", "なっ", "ない", "この",
    "ため", "その", "あっ", "よう", "また", "もの", "という", "あり", "まで", "られ", "なる",
    "へ", "か", "だ", "これ", "によって", "により", "おり", "より", "による", "ず", "なり",
    "られる", "において", "ば", "なかっ", "なく", "しかし", "について", "せ", "だっ", "でき",
    "できる", "それ", "う", "ので", "なお", "のみ", "き", "つ", "における", "および", "いう",
    "さらに", "でも", "ら", "たり", "たち", "ます", "ん", "なら", "です",
];

const KOREAN_STOP_WORDS: &[&str] = &[
    "이", "그", "저", "것", "수", "등", "들", "및", "에", "의", "가", "을", "를", "은", "는",
    "로", "으로", "와", "과", "도", "에서", "하다", "있다", "되다", "이다", "그리고", "하지만",
    "그러나", "또한", "또는",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    CHINESE_STOP_WORDS
        .iter()
        .chain(JAPANESE_STOP_WORDS)
        .chain(KOREAN_STOP_WORDS)
        .copied()
        .collect()
});

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Convert raw text into index/query terms.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut latin_run = String::new();
    let mut cjk_run: Vec<char> = Vec::new();

    for c in text.chars() {
        // CJK punctuation (fullwidth commas etc.) separates runs instead of joining bigrams
        if is_cjk_char(c) && c.is_alphanumeric() {
            if !latin_run.is_empty() {
                push_latin_tokens(&latin_run, &mut tokens);
                latin_run.clear();
            }
            cjk_run.push(c);
        } else {
            if !cjk_run.is_empty() {
                push_cjk_bigrams(&cjk_run, &mut tokens);
                cjk_run.clear();
            }
            latin_run.push(c);
        }
    }

    if !latin_run.is_empty() {
        push_latin_tokens(&latin_run, &mut tokens);
    }
    if !cjk_run.is_empty() {
        push_cjk_bigrams(&cjk_run, &mut tokens);
    }

    tokens.retain(|token| !is_stop_word(token));
    tokens
}

/// Tokenize and count how often each term occurs.
pub fn term_frequencies(text: &str) -> HashMap<String, u32> {
    let mut freqs = HashMap::new();
    for token in tokenize(text) {
        *freqs.entry(token).or_insert(0) += 1;
    }
    freqs
}

fn push_latin_tokens(run: &str, tokens: &mut Vec<String>) {
    let lowered = run.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");
    tokens.extend(
        cleaned
            .split_whitespace()
            .filter(|word| word.chars().count() > 1)
            .map(str::to_string),
    );
}

fn push_cjk_bigrams(run: &[char], tokens: &mut Vec<String>) {
    if run.len() == 1 {
        tokens.push(run[0].to_string());
        return;
    }
    tokens.extend(run.windows(2).map(|pair| pair.iter().collect::<String>()));
}
