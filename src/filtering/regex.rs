/// Characters with a regex meaning that are always escaped.
/// Alternation `|` and the escape character itself are left alone so users
/// can type `foo|bar` into the global search box.
const ESCAPED_CHARS: [char; 11] = ['[', '^', '$', '.', '?', '*', '+', '(', ')', '{', '}'];

/// Turn free text typed into the search box into a regex the database accepts.
///
/// Existing backslashes are dropped, regex metacharacters other than `|` are
/// escaped, runs of `|` collapse into one and a trailing `|` is removed (a
/// half-typed alternation would otherwise be a database error).
#[must_use]
pub fn clean_regex(regex: &str) -> String {
    let mut cleaned = String::with_capacity(regex.len() * 2);

    for c in regex.chars() {
        match c {
            '\\' => {}
            '|' if cleaned.ends_with('|') => {}
            c if ESCAPED_CHARS.contains(&c) => {
                cleaned.push('\\');
                cleaned.push(c);
            }
            c => cleaned.push(c),
        }
    }

    if cleaned.ends_with('|') {
        cleaned.pop();
    }

    cleaned
}
