//! Word-list checks are case-insensitive substring tests: "relearn"
//! counts as "learn".

use regex::Regex;
use std::sync::LazyLock;

use crate::features::FeatureBag;

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").expect("valid digit pattern"));
static DIGIT_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digit group pattern"));

const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

const TUTORIAL_WORDS: [&str; 5] = ["tutorial", "how to", "learn", "guide", "course"];
const QUESTION_WORDS: [&str; 5] = ["what", "why", "how", "when", "where"];
const FRAMING_WORDS: [&str; 3] = ["what", "why", "how"];

const POSITIVE_WORDS: [&str; 8] = [
    "best", "top", "amazing", "awesome", "great", "ultimate", "complete", "perfect",
];
const NEGATIVE_WORDS: [&str; 7] = ["worst", "bad", "terrible", "avoid", "never", "don't", "stop"];
const POWER_WORDS: [&str; 9] = [
    "secret", "hack", "trick", "method", "system", "guide", "tutorial", "learn", "master",
];

#[derive(Debug, Clone, Default)]
pub struct TitleFeatures {
    pub length: usize,
    pub word_count: usize,
    pub has_number: bool,
    pub has_emoji: bool,
    pub has_question_mark: bool,
    pub has_exclamation: bool,
    pub special_char_count: usize,
    pub is_tutorial: bool,
    pub is_question: bool,
    pub uppercase_ratio: f64,
}

impl TitleFeatures {
    pub fn write_into(&self, bag: &mut FeatureBag) {
        bag.set("title_length", self.length as f64);
        bag.set("title_word_count", self.word_count as f64);
        bag.set_flag("title_has_number", self.has_number);
        bag.set_flag("title_has_emoji", self.has_emoji);
        bag.set_flag("title_has_question", self.has_question_mark);
        bag.set_flag("title_has_exclamation", self.has_exclamation);
        bag.set("title_special_char_count", self.special_char_count as f64);
        bag.set_flag("title_is_tutorial", self.is_tutorial);
        bag.set_flag("title_is_question", self.is_question);
        bag.set("title_uppercase_ratio", self.uppercase_ratio);
    }
}

#[derive(Debug, Clone, Default)]
pub struct TitleLexicon {
    pub positive_words: usize,
    pub negative_words: usize,
    pub power_words: usize,
    pub has_digit: bool,
    pub number_count: usize,
    pub starts_with_capital: bool,
    pub has_colon: bool,
    pub has_dash: bool,
}

pub fn analyze_title(title: &str) -> TitleFeatures {
    let lowercase = title.to_lowercase();
    let length = title.chars().count();

    let mut uppercase = 0usize;
    let mut special_char_count = 0usize;
    for ch in title.chars() {
        if ch.is_uppercase() {
            uppercase += 1;
        }
        if SPECIAL_CHARS.contains(ch) {
            special_char_count += 1;
        }
    }

    let uppercase_ratio = if length == 0 {
        0.0
    } else {
        uppercase as f64 / length as f64
    };

    let has_question_mark = title.contains('?');

    TitleFeatures {
        length,
        word_count: title.split_whitespace().count(),
        has_number: DIGIT.is_match(title),
        has_emoji: has_emoji(title),
        has_question_mark,
        has_exclamation: title.contains('!'),
        special_char_count,
        is_tutorial: contains_any(&lowercase, &TUTORIAL_WORDS),
        is_question: has_question_mark || contains_any(&lowercase, &QUESTION_WORDS),
        uppercase_ratio,
    }
}

pub fn analyze_title_lexicon(title: &str) -> TitleLexicon {
    let lowercase = title.to_lowercase();

    TitleLexicon {
        positive_words: count_present(&lowercase, &POSITIVE_WORDS),
        negative_words: count_present(&lowercase, &NEGATIVE_WORDS),
        power_words: count_present(&lowercase, &POWER_WORDS),
        has_digit: DIGIT.is_match(title),
        number_count: DIGIT_GROUP.find_iter(title).count(),
        starts_with_capital: title.chars().next().is_some_and(char::is_uppercase),
        has_colon: title.contains(':'),
        has_dash: title.contains('-') || title.contains('|'),
    }
}

/// Question framing as used by recommendations: a `?` or one of
/// what/why/how. Narrower than [`TitleFeatures::is_question`].
pub fn has_question_framing(title: &str) -> bool {
    title.contains('?') || contains_any(&title.to_lowercase(), &FRAMING_WORDS)
}

pub fn has_emoji(text: &str) -> bool {
    text.chars().any(|ch| {
        matches!(
            ch as u32,
            0x1F600..=0x1F64F
                | 0x1F300..=0x1F5FF
                | 0x1F680..=0x1F6FF
                | 0x1F1E0..=0x1F1FF
                | 0x2702..=0x27B0
                | 0x24C2..=0x1F251
        )
    })
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn count_present(haystack: &str, needles: &[&str]) -> usize {
    needles.iter().filter(|needle| haystack.contains(*needle)).count()
}
