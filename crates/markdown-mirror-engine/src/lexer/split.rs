use regex::Regex;

/// Splits `text` around every match of `re`, keeping the matches.
///
/// The result alternates between the text before a match and the match
/// itself, ending with whatever follows the last match, so joining the parts
/// gives back `text`. Parts may be empty. An empty match at the previous
/// split point is skipped, and no match is attempted at the end of `text`.
pub fn split_keeping_matches<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    let mut parts = Vec::new();
    let mut last = 0;
    let mut at = 0;

    while at < text.len() {
        let Some(m) = re.find_at(text, at) else {
            break;
        };
        if m.start() >= text.len() {
            break;
        }
        if m.end() == last {
            at = next_char_boundary(text, m.start());
            continue;
        }
        parts.push(&text[last..m.start()]);
        parts.push(m.as_str());
        last = m.end();
        at = last;
    }

    parts.push(&text[last..]);
    parts
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map_or(text.len(), |c| from + c.len_utf8())
}
