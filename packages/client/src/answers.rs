//! Typed-answer checking for French translations.
//!
//! Expected answers may list several accepted variants separated by `/`.
//! Comparison is diacritic-insensitive and tolerates a single typo on words
//! long enough for that to be unambiguous. Numeric answers are folded to
//! their French spelling so "2" matches "deux".

/// Spellings of the small numbers that appear as vocabulary answers.
const DIGIT_WORDS: [&str; 13] = [
    "zero", "un", "deux", "trois", "quatre", "cinq", "six", "sept", "huit", "neuf", "dix", "onze",
    "douze",
];

/// Minimum length at which a one-letter typo is still accepted.
const FUZZY_MIN_CHARS: usize = 5;

fn fold_char(c: char) -> Option<&'static str> {
    match c {
        'à' | 'â' | 'ä' => Some("a"),
        'é' | 'è' | 'ê' | 'ë' => Some("e"),
        'î' | 'ï' => Some("i"),
        'ô' | 'ö' => Some("o"),
        'ù' | 'û' | 'ü' => Some("u"),
        'ç' => Some("c"),
        'œ' => Some("oe"),
        'æ' => Some("ae"),
        _ => None,
    }
}

/// Lowercases, folds diacritics, strips punctuation, collapses whitespace
/// and spells out digits 0 through 12.
pub fn normalize(input: &str) -> String {
    let mut folded = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        if let Some(replacement) = fold_char(c) {
            folded.push_str(replacement);
        } else if c.is_alphanumeric() {
            folded.push(c);
        } else {
            folded.push(' ');
        }
    }

    folded
        .split_whitespace()
        .map(|token| {
            token
                .parse::<usize>()
                .ok()
                .and_then(|n| DIGIT_WORDS.get(n).copied())
                .unwrap_or(token)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a typed answer matches the expected answer or one of its
/// `/`-separated variants.
pub fn matches(typed: &str, expected: &str) -> bool {
    let typed = normalize(typed);
    if typed.is_empty() {
        return false;
    }

    expected.split('/').any(|variant| {
        let variant = normalize(variant);
        if typed == variant {
            return true;
        }
        variant.chars().count() >= FUZZY_MIN_CHARS && edit_distance(&typed, &variant) <= 1
    })
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
