//! Converts feed content fragments (HTML-ish markup) into typed segments,
//! flat plain text, and a best-effort representative image URL.

use html_escape::decode_html_entities;
use regex::Regex;

/// One piece of a normalized content fragment, in original order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSegment {
    Text(String),
    Code {
        language: Option<String>,
        content: String,
    },
}

#[derive(Clone)]
pub struct Normalizer {
    code_block: Regex,
    br: Regex,
    para_end: Regex,
    heading_end: Regex,
    div_end: Regex,
    li_open: Regex,
    li_end: Regex,
    tag: Regex,
    blank_lines: Regex,
    img_src: Regex,
    img_srcset: Regex,
    link_image: Regex,
    bare_image: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            // Highlighted code blocks as emitted by dev-blog engines.
            // Non-greedy single pass, so an unterminated block simply
            // doesn't match and stays part of the surrounding text.
            code_block: Regex::new(
                r#"(?s)<pre class="highlight(?:\s+([a-zA-Z0-9]+))?"><code>(.*?)</code></pre>"#,
            )
            .expect("valid regex"),
            br: Regex::new(r"(?i)<br\s*/?>").expect("valid regex"),
            para_end: Regex::new(r"(?i)</p>").expect("valid regex"),
            heading_end: Regex::new(r"(?i)</h[1-6]>").expect("valid regex"),
            div_end: Regex::new(r"(?i)</div>").expect("valid regex"),
            li_open: Regex::new(r"(?i)<li[^>]*>").expect("valid regex"),
            li_end: Regex::new(r"(?i)</li>").expect("valid regex"),
            tag: Regex::new(r"<[^>]*>").expect("valid regex"),
            blank_lines: Regex::new(r"\n\s*\n\s*\n").expect("valid regex"),
            img_src: Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).expect("valid regex"),
            img_srcset: Regex::new(r#"(?i)<img[^>]+srcset=["']([^"']+)["']"#)
                .expect("valid regex"),
            link_image: Regex::new(
                r#"(?i)<a[^>]+href=["']([^"']+\.(?:jpg|jpeg|png|gif|webp))(?:\?[^"']*)?["']"#,
            )
            .expect("valid regex"),
            bare_image: Regex::new(
                r#"(?i)https?://[^\s<"']+\.(?:jpg|jpeg|png|gif|webp)(?:\?[^\s<"']*)?"#,
            )
            .expect("valid regex"),
        }
    }

    /// Split a fragment into ordered text/code segments. Text around and
    /// between code blocks is preserved; whitespace-only stretches are
    /// dropped.
    pub fn segments(&self, html: &str) -> Vec<ContentSegment> {
        let mut parts = Vec::new();
        let mut cursor = 0;

        for caps in self.code_block.captures_iter(html) {
            let whole = caps.get(0).expect("group 0 always present");

            if whole.start() > cursor {
                let text = &html[cursor..whole.start()];
                if !text.trim().is_empty() {
                    parts.push(ContentSegment::Text(self.plain_text(text)));
                }
            }

            // Code content is kept verbatim; entity decoding applies to
            // text segments only.
            let language = caps.get(1).map(|m| m.as_str().to_string());
            let content = caps.get(2).map_or("", |m| m.as_str()).to_string();
            parts.push(ContentSegment::Code { language, content });

            cursor = whole.end();
        }

        if cursor < html.len() {
            let text = &html[cursor..];
            if !text.trim().is_empty() {
                parts.push(ContentSegment::Text(self.plain_text(text)));
            }
        }

        parts
    }

    /// Flatten a fragment to plain text: block-level closers become line
    /// breaks, list items get a bullet marker, remaining tags are stripped
    /// and entities decoded. Three or more consecutive blank-ish lines
    /// collapse to one blank line.
    pub fn plain_text(&self, html: &str) -> String {
        let text = self.br.replace_all(html, "\n");
        let text = self.para_end.replace_all(&text, "\n\n");
        let text = self.heading_end.replace_all(&text, "\n\n");
        let text = self.div_end.replace_all(&text, "\n");
        let text = self.li_open.replace_all(&text, "\u{2022} ");
        let text = self.li_end.replace_all(&text, "\n");
        let mut text = self.tag.replace_all(&text, "").to_string();

        while self.blank_lines.is_match(&text) {
            text = self.blank_lines.replace_all(&text, "\n\n").to_string();
        }

        decode_html_entities(text.trim()).to_string()
    }

    /// Best-effort image URL extraction, in priority order: img src,
    /// img srcset (first candidate), image-extension hyperlink, bare
    /// image-extension URL.
    pub fn extract_image(&self, html: &str) -> Option<String> {
        if let Some(caps) = self.img_src.captures(html) {
            return Some(caps[1].to_string());
        }

        if let Some(caps) = self.img_srcset.captures(html) {
            let first = caps[1]
                .split(',')
                .next()
                .map(|c| c.trim())
                .and_then(|c| c.split_whitespace().next())
                .map(String::from);
            if first.is_some() {
                return first;
            }
        }

        if let Some(caps) = self.link_image.captures(html) {
            return Some(caps[1].to_string());
        }

        self.bare_image.find(html).map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_text_code_text() {
        let n = Normalizer::new();
        let html = r#"<p>Intro &amp; setup</p><pre class="highlight rust"><code>let x = 1 &lt; 2;</code></pre><p>Outro</p>"#;

        let parts = n.segments(html);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], ContentSegment::Text("Intro & setup".into()));
        assert_eq!(
            parts[1],
            ContentSegment::Code {
                language: Some("rust".into()),
                content: "let x = 1 &lt; 2;".into(),
            }
        );
        assert_eq!(parts[2], ContentSegment::Text("Outro".into()));
    }

    #[test]
    fn test_segments_code_without_language() {
        let n = Normalizer::new();
        let html = r#"<pre class="highlight"><code>plain</code></pre>"#;

        let parts = n.segments(html);
        assert_eq!(
            parts,
            vec![ContentSegment::Code {
                language: None,
                content: "plain".into(),
            }]
        );
    }

    #[test]
    fn test_segments_unterminated_block_stays_text() {
        let n = Normalizer::new();
        let html = r#"before <pre class="highlight rust"><code>never closed"#;

        let parts = n.segments(html);
        assert_eq!(parts.len(), 1);
        match &parts[0] {
            ContentSegment::Text(t) => assert!(t.contains("never closed")),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_segments_empty_input() {
        let n = Normalizer::new();
        assert!(n.segments("").is_empty());
        assert_eq!(n.plain_text(""), "");
    }

    #[test]
    fn test_plain_text_blocks_and_lists() {
        let n = Normalizer::new();
        let html = "<h2>Title</h2><p>First.</p><ul><li>one</li><li>two</li></ul>";

        assert_eq!(
            n.plain_text(html),
            "Title\n\nFirst.\n\n\u{2022} one\n\u{2022} two"
        );
    }

    #[test]
    fn test_plain_text_entities_decoded() {
        let n = Normalizer::new();
        assert_eq!(
            n.plain_text("a&nbsp;&lt;b&gt; &quot;c&quot; &#39;d&#39; &amp;e"),
            "a\u{a0}<b> \"c\" 'd' &e"
        );
    }

    #[test]
    fn test_plain_text_unknown_entity_passes_through() {
        let n = Normalizer::new();
        assert_eq!(n.plain_text("&bogus; stays"), "&bogus; stays");
    }

    #[test]
    fn test_plain_text_collapses_blank_lines() {
        let n = Normalizer::new();
        let html = "<p>a</p><p></p><p></p><p>b</p>";
        assert_eq!(n.plain_text(html), "a\n\nb");
    }

    #[test]
    fn test_extract_image_prefers_img_src() {
        let n = Normalizer::new();
        let html = r#"<img srcset="https://x.test/s.png 1x" src="https://x.test/a.png"> <a href="https://x.test/b.jpg">b</a>"#;
        assert_eq!(n.extract_image(html), Some("https://x.test/a.png".into()));
    }

    #[test]
    fn test_extract_image_srcset_first_candidate() {
        let n = Normalizer::new();
        let html = r#"<img srcset="https://x.test/small.png 480w, https://x.test/big.png 1080w">"#;
        assert_eq!(
            n.extract_image(html),
            Some("https://x.test/small.png".into())
        );
    }

    #[test]
    fn test_extract_image_from_link_then_bare_url() {
        let n = Normalizer::new();
        assert_eq!(
            n.extract_image(r#"<a href="https://x.test/photo.webp?w=800">photo</a>"#),
            Some("https://x.test/photo.webp".into())
        );
        assert_eq!(
            n.extract_image("see https://x.test/pic.gif for details"),
            Some("https://x.test/pic.gif".into())
        );
    }

    #[test]
    fn test_extract_image_none() {
        let n = Normalizer::new();
        assert_eq!(n.extract_image("<p>no pictures here</p>"), None);
    }
}
