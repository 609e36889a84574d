// src/udemy/markdown.rs
//
// Regex-based HTML to markdown conversion for article lectures. Course
// article HTML is shallow enough that a tag-by-tag rewrite holds up.

use regex::Regex;
use std::sync::LazyLock;

macro_rules! re {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($pattern).unwrap());
    };
}

re!(H1_RE, r"(?s)<h1[^>]*>(.*?)</h1>");
re!(H2_RE, r"(?s)<h2[^>]*>(.*?)</h2>");
re!(H3_RE, r"(?s)<h3[^>]*>(.*?)</h3>");
re!(H4_RE, r"(?s)<h4[^>]*>(.*?)</h4>");
re!(STRONG_RE, r"(?s)<strong[^>]*>(.*?)</strong>");
re!(B_RE, r"(?s)<b[^>]*>(.*?)</b>");
re!(EM_RE, r"(?s)<em[^>]*>(.*?)</em>");
re!(I_RE, r"(?s)<i[^>]*>(.*?)</i>");
re!(PRE_CODE_RE, r"(?s)<pre[^>]*><code[^>]*>(.*?)</code></pre>");
re!(PRE_RE, r"(?s)<pre[^>]*>(.*?)</pre>");
re!(CODE_RE, r"(?s)<code[^>]*>(.*?)</code>");
re!(A_RE, r#"(?s)<a[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#);
re!(IMG_ALT_RE, r#"(?s)<img[^>]*src="([^"]*)"[^>]*alt="([^"]*)"[^>]*/?>"#);
re!(IMG_RE, r#"(?s)<img[^>]*src="([^"]*)"[^>]*/?>"#);
re!(UL_RE, r"(?s)<ul[^>]*>(.*?)</ul>");
re!(OL_RE, r"(?s)<ol[^>]*>(.*?)</ol>");
re!(LI_RE, r"(?s)<li[^>]*>(.*?)</li>");
re!(P_RE, r"(?s)<p[^>]*>(.*?)</p>");
re!(BR_RE, r"<br\s*/?>");
re!(TAG_RE, r"<[^>]+>");
re!(EXCESS_NEWLINES_RE, r"\n{3,}");
re!(ENTITY_RE, r"&(#x?[0-9a-fA-F]+|[a-zA-Z]+);");

/// Decodes the entities that show up in course HTML. Unknown named
/// entities pass through untouched.
pub fn unescape_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            match entity {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                "nbsp" => " ".to_string(),
                _ => {
                    let code = if let Some(hex) = entity.strip_prefix("#x").or(entity.strip_prefix("#X")) {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .into_owned()
}

/// Strips tags, decodes entities and collapses whitespace.
pub fn clean_html_text(text: &str) -> String {
    let text = unescape_entities(text);
    let text = TAG_RE.replace_all(&text, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn convert_list(list_html: &str, ordered: bool) -> String {
    let items: Vec<String> = LI_RE
        .captures_iter(list_html)
        .enumerate()
        .map(|(i, cap)| {
            let text = TAG_RE.replace_all(&cap[1], "");
            let text = text.trim();
            if ordered {
                format!("{}. {text}", i + 1)
            } else {
                format!("- {text}")
            }
        })
        .collect();
    format!("\n{}\n", items.join("\n"))
}

pub fn html_to_markdown(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let md = H1_RE.replace_all(html, "# $1");
    let md = H2_RE.replace_all(&md, "## $1");
    let md = H3_RE.replace_all(&md, "### $1");
    let md = H4_RE.replace_all(&md, "#### $1");

    let md = STRONG_RE.replace_all(&md, "**$1**");
    let md = B_RE.replace_all(&md, "**$1**");
    let md = EM_RE.replace_all(&md, "*$1*");
    let md = I_RE.replace_all(&md, "*$1*");

    let md = PRE_CODE_RE.replace_all(&md, "```\n$1\n```");
    let md = PRE_RE.replace_all(&md, "```\n$1\n```");
    let md = CODE_RE.replace_all(&md, "`$1`");

    let md = A_RE.replace_all(&md, "[$2]($1)");
    let md = IMG_ALT_RE.replace_all(&md, "![$2]($1)");
    let md = IMG_RE.replace_all(&md, "![Image]($1)");

    let md = UL_RE.replace_all(&md, |caps: &regex::Captures| convert_list(&caps[1], false));
    let md = OL_RE.replace_all(&md, |caps: &regex::Captures| convert_list(&caps[1], true));

    let md = P_RE.replace_all(&md, "$1\n\n");
    let md = BR_RE.replace_all(&md, "\n");
    let md = TAG_RE.replace_all(&md, "");

    let md = unescape_entities(&md);
    let md = EXCESS_NEWLINES_RE.replace_all(&md, "\n\n");

    md.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_headings_emphasis_and_code() {
        let html = "<h2>Example Article</h2>\n<p>This is a <strong>test</strong> with <code>inline code</code>.</p>";
        let md = html_to_markdown(html);
        assert!(md.contains("## Example Article"));
        assert!(md.contains("**test**"));
        assert!(md.contains("`inline code`"));
    }

    #[test]
    fn converts_code_blocks() {
        let html = "<pre><code>public class Test {\n    int x;\n}</code></pre>";
        let md = html_to_markdown(html);
        assert!(md.starts_with("```\npublic class Test {"));
        assert!(md.ends_with("```"));
    }

    #[test]
    fn converts_links_and_images() {
        let md = html_to_markdown(
            r#"<a href="https://example.org/doc">the docs</a> <img src="https://x.test/p.png" alt="diagram">"#,
        );
        assert!(md.contains("[the docs](https://example.org/doc)"));
        assert!(md.contains("![diagram](https://x.test/p.png)"));
    }

    #[test]
    fn converts_ordered_and_unordered_lists() {
        let md = html_to_markdown("<ul><li>Item 1</li><li>Item 2</li></ul><ol><li>First</li><li>Second</li></ol>");
        assert!(md.contains("- Item 1"));
        assert!(md.contains("- Item 2"));
        assert!(md.contains("1. First"));
        assert!(md.contains("2. Second"));
    }

    #[test]
    fn decodes_entities_and_collapses_newlines() {
        let md = html_to_markdown("<p>a &amp; b</p>\n\n\n\n<p>&lt;tag&gt; &#169;</p>");
        assert!(md.contains("a & b"));
        assert!(md.contains("<tag> ©"));
        assert!(!md.contains("\n\n\n"));
    }

    #[test]
    fn clean_text_strips_tags() {
        assert_eq!(
            clean_html_text("  <b>Hello</b>&nbsp;   <i>world</i> "),
            "Hello world"
        );
    }
}
