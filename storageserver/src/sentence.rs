//! Sentence and word tokenization (spec §4.4).
//!
//! Content splits on `.`, `!`, `?`; each delimiter terminates the sentence
//! it closes, and a run of spaces immediately after it is swallowed. A
//! trailing unterminated fragment becomes the final sentence.

const DELIMITERS: [char; 3] = ['.', '!', '?'];

pub fn parse_sentences(content: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if DELIMITERS.contains(&c) {
            sentences.push(std::mem::take(&mut current));
            while matches!(chars.peek(), Some(' ')) {
                chars.next();
            }
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

/// Joins sentences back into file content. A single space separates two
/// sentences when the left one doesn't already end in whitespace, so a
/// sentence ending in `. ` isn't doubled up.
pub fn reconstruct(sentences: &[String]) -> String {
    let mut out = String::new();
    for sentence in sentences {
        if !out.is_empty() && !out.ends_with(char::is_whitespace) {
            out.push(' ');
        }
        out.push_str(sentence);
    }
    out
}

/// Splits a sentence into words on single spaces. An empty sentence has
/// zero words, not one.
pub fn words(sentence: &str) -> Vec<String> {
    if sentence.is_empty() {
        Vec::new()
    } else {
        sentence.split(' ').map(str::to_owned).collect()
    }
}

pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_each_delimiter_and_keeps_it() {
        let sentences = parse_sentences("Hello world. How are you? Fine!");
        assert_eq!(sentences, vec!["Hello world.", "How are you?", "Fine!"]);
    }

    #[test]
    fn swallows_spaces_right_after_a_delimiter() {
        let sentences = parse_sentences("A.   B.");
        assert_eq!(sentences, vec!["A.", "B."]);
    }

    #[test]
    fn trailing_fragment_becomes_final_sentence() {
        let sentences = parse_sentences("Hello world");
        assert_eq!(sentences, vec!["Hello world"]);
    }

    #[test]
    fn empty_input_yields_zero_sentences() {
        assert!(parse_sentences("").is_empty());
    }

    #[test]
    fn reconstruct_round_trips_a_simple_case() {
        let sentences = parse_sentences("Hello world. How are you?");
        assert_eq!(reconstruct(&sentences), "Hello world. How are you?");
    }

    #[test]
    fn reconstruct_reparses_to_the_same_sentence_list() {
        let original = "One. Two! Three? trailing";
        let sentences = parse_sentences(original);
        let rebuilt = reconstruct(&sentences);
        assert_eq!(parse_sentences(&rebuilt), sentences);
    }

    #[test]
    fn words_splits_on_single_spaces() {
        assert_eq!(words("Hello world there"), vec!["Hello", "world", "there"]);
        assert!(words("").is_empty());
    }
}
