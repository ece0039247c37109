//! Message markup rendering.
//!
//! Messages are stored raw; rendering to HTML happens at display time.
//! Supported markup is the lightweight subset the chat UI advertises:
//! `**bold**`, `*italic*`, `` `code` `` and bare-URL autolinking.

use pulldown_cmark::{Parser, html};

/// Renders one message body to an HTML fragment.
pub fn message_html(content: &str) -> String {
    let source = autolink(content);
    let parser = Parser::new(&source);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Wraps bare `http://` / `https://` runs in angle brackets so the markdown
/// parser emits them as links. URLs already written as markdown links or
/// autolinks are left alone.
fn autolink(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = find_url_start(rest) {
        let (before, from_url) = rest.split_at(start);
        out.push_str(before);

        // already inside <...> or a markdown link target
        if before.ends_with('<') || before.ends_with('(') {
            out.push_str(&from_url[..1]);
            rest = &from_url[1..];
            continue;
        }

        let end = from_url
            .find(char::is_whitespace)
            .unwrap_or(from_url.len());
        out.push('<');
        out.push_str(&from_url[..end]);
        out.push('>');
        rest = &from_url[end..];
    }

    out.push_str(rest);
    out
}

fn find_url_start(text: &str) -> Option<usize> {
    let http = text.find("http://");
    let https = text.find("https://");
    match (http, https) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_inline_markup() {
        assert_eq!(message_html("**hi**"), "<p><strong>hi</strong></p>\n");
        assert_eq!(message_html("*lean*"), "<p><em>lean</em></p>\n");
        assert_eq!(message_html("`code`"), "<p><code>code</code></p>\n");
    }

    #[test]
    fn links_bare_urls() {
        assert_eq!(
            message_html("see https://example.com for more"),
            "<p>see <a href=\"https://example.com\">https://example.com</a> for more</p>\n"
        );
    }

    #[test]
    fn leaves_bracketed_urls_alone() {
        assert_eq!(
            autolink("look at <https://example.com>"),
            "look at <https://example.com>"
        );
        assert_eq!(
            autolink("[x](https://example.com)"),
            "[x](https://example.com)"
        );
    }

    #[test]
    fn links_multiple_urls() {
        assert_eq!(
            autolink("http://a.example and https://b.example"),
            "<http://a.example> and <https://b.example>"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(message_html("hello there"), "<p>hello there</p>\n");
    }
}
