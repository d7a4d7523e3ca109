//! Minimal HTML slicing helpers for the lunar-day page
//!
//! These are not a general HTML parser. They locate elements by tag name and
//! class, split a fragment into child elements of one tag, and flatten a cell
//! to its text. Tag and attribute names are matched case-insensitively; the
//! lowercased copy keeps the same byte offsets because only ASCII is folded.

/// Returns the inner HTML of the first `<tag>` whose `class` attribute
/// contains `class` as a whole token.
pub fn find_by_class<'a>(doc: &'a str, tag: &str, class: &str) -> Option<&'a str> {
    let lower = doc.to_ascii_lowercase();
    let open_pat = format!("<{}", tag.to_ascii_lowercase());
    let mut from = 0;

    while let Some(start) = find_open_tag(&lower, &open_pat, from) {
        let open_end = lower[start..].find('>')? + start + 1;
        let open_tag = &doc[start..open_end];
        let has_class = attr_value(open_tag, "class")
            .map(|value| value.split_whitespace().any(|c| c == class))
            .unwrap_or(false);

        if has_class {
            let close_pat = format!("</{}", tag.to_ascii_lowercase());
            let close = lower[open_end..].find(&close_pat)? + open_end;
            return Some(&doc[open_end..close]);
        }
        from = open_end;
    }

    None
}

/// Splits `fragment` into the inner HTML of each `<tag>...</tag>` in order.
///
/// An element without a closing tag runs until the next opening tag of the
/// same name (or the end of the fragment), which covers the optional `</td>`
/// and `</tr>` that browsers tolerate.
pub fn elements<'a>(fragment: &'a str, tag: &str) -> Vec<&'a str> {
    let lower = fragment.to_ascii_lowercase();
    let tag = tag.to_ascii_lowercase();
    let open_pat = format!("<{}", tag);
    let close_pat = format!("</{}>", tag);
    let mut out = Vec::new();
    let mut from = 0;

    while let Some(start) = find_open_tag(&lower, &open_pat, from) {
        let Some(rel) = lower[start..].find('>') else {
            break;
        };
        let open_end = start + rel + 1;
        let next_open = find_open_tag(&lower, &open_pat, open_end).unwrap_or(lower.len());
        let (inner_end, resume) = match lower[open_end..].find(&close_pat) {
            Some(rel) if open_end + rel <= next_open => {
                (open_end + rel, open_end + rel + close_pat.len())
            }
            _ => (next_open, next_open),
        };
        out.push(&fragment[open_end..inner_end]);
        from = resume;
    }

    out
}

/// Flattens an HTML fragment to its text: tags dropped, common entities
/// decoded, whitespace collapsed and trimmed.
pub fn text_content(fragment: &str) -> String {
    let mut stripped = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => {
                in_tag = true;
                stripped.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(ch),
            _ => {}
        }
    }
    collapse_whitespace(&decode_entities(&stripped))
}

/// Finds `<tag` at or after `from` where the name is not just a prefix
/// (so `<tr` does not match `<track`).
fn find_open_tag(lower: &str, open_pat: &str, from: usize) -> Option<usize> {
    let mut at = from;
    loop {
        let start = lower.get(at..)?.find(open_pat)? + at;
        let after = start + open_pat.len();
        match lower[after..].chars().next() {
            Some(c) if c.is_ascii_whitespace() || c == '>' || c == '/' => return Some(start),
            None => return None,
            _ => at = after,
        }
    }
}

/// Reads an attribute value from an opening tag, quoted or bare.
fn attr_value<'a>(open_tag: &'a str, name: &str) -> Option<&'a str> {
    let lower = open_tag.to_ascii_lowercase();
    let pat = format!("{}=", name);
    let mut at = 0;
    let value_start = loop {
        let idx = lower.get(at..)?.find(&pat)? + at;
        let preceded_by_space = lower[..idx]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_whitespace());
        if preceded_by_space {
            break idx + pat.len();
        }
        at = idx + pat.len();
    };

    let rest = &open_tag[value_start..];
    match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let body = &rest[1..];
            let end = body.find(quote)?;
            Some(&body[..end])
        }
        _ => {
            let end = rest
                .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
                .unwrap_or(rest.len());
            Some(&rest[..end])
        }
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_class_matches_token_not_substring() {
        let doc = r#"<table class="moon-events-table-old"><tr><td>old</td></tr></table>
<TABLE class="wide moon-events-table"><tr><td>new</td></tr></TABLE>"#;
        let inner = find_by_class(doc, "table", "moon-events-table").expect("table should be found");
        assert!(inner.contains("new"));
        assert!(!inner.contains("old"));
    }

    #[test]
    fn test_find_by_class_missing_returns_none() {
        let doc = "<table class=other><tr><td>x</td></tr></table>";
        assert!(find_by_class(doc, "table", "moon-events-table").is_none());
    }

    #[test]
    fn test_find_by_class_accepts_unquoted_attribute() {
        let doc = "<div><table class=moon-events-table><tr><td>x</td></tr></table></div>";
        assert_eq!(
            find_by_class(doc, "table", "moon-events-table"),
            Some("<tr><td>x</td></tr>")
        );
    }

    #[test]
    fn test_elements_in_order() {
        let cells = elements("<td>a</td><td class=x>b</td><td>c</td>", "td");
        assert_eq!(cells, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_elements_ignores_longer_tag_names() {
        let rows = elements("<track src=x><tr><td>a</td></tr>", "tr");
        assert_eq!(rows, vec!["<td>a</td>"]);
    }

    #[test]
    fn test_elements_tolerates_missing_close_tags() {
        let cells = elements("<td>a<td>b", "td");
        assert_eq!(cells, vec!["a", "b"]);
    }

    #[test]
    fn test_text_content_strips_tags_and_entities() {
        let text = text_content("  <b>начало</b>&nbsp;27\n  лунного <i>дня</i> &amp; ещё ");
        assert_eq!(text, "начало 27 лунного дня & ещё");
    }

    #[test]
    fn test_elements_absent_tag_is_empty() {
        assert!(elements("<tr><td>a</td></tr>", "tbody").is_empty());
    }
}
