//! Message markup.
//!
//! [`format_message`] turns raw model or user text into safe markup. Input is
//! escaped first; every later pass only inserts fixed tags around text that is
//! already escaped.

const EMOTICONS: [(&str, &str); 4] = [(":)", "😊"), (":(", "😔"), (":D", "😄"), (":|", "😐")];

/// Escape HTML metacharacters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render raw text as transcript markup.
///
/// Passes run in a fixed order: escape, fenced code blocks, inline code,
/// `**bold**`, `*italic*`, `__underline__`, line breaks, emoticons.
#[must_use]
pub fn format_message(raw: &str) -> String {
    let mut out = escape_html(raw);
    out = code_blocks(&out);
    out = delimited(&out, Span::INLINE_CODE);
    out = delimited(&out, Span::BOLD);
    out = delimited(&out, Span::ITALIC);
    out = delimited(&out, Span::UNDERLINE);
    out = out.replace('\n', "<br>");
    for (emoticon, glyph) in EMOTICONS {
        out = out.replace(emoticon, glyph);
    }
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Length in bytes of the char starting at `i`.
fn char_len_at(s: &str, i: usize) -> usize {
    s[i..].chars().next().map_or(1, char::len_utf8)
}

/// ```` ```lang\nbody``` ```` → labelled code block. Unterminated fences are
/// left as text.
fn code_blocks(s: &str) -> String {
    const FENCE: &str = "```";
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if !s[i..].starts_with(FENCE) {
            let len = char_len_at(s, i);
            out.push_str(&s[i..i + len]);
            i += len;
            continue;
        }

        let lang_start = i + FENCE.len();
        let mut lang_end = lang_start;
        while lang_end < bytes.len() && is_word_byte(bytes[lang_end]) {
            lang_end += 1;
        }
        let mut body_start = lang_end;
        if bytes.get(body_start) == Some(&b'\n') {
            body_start += 1;
        }

        match s[body_start..].find(FENCE) {
            Some(rel) => {
                let body_end = body_start + rel;
                let lang = if lang_end > lang_start {
                    &s[lang_start..lang_end]
                } else {
                    "text"
                };
                out.push_str(&format!(
                    "<div class=\"code-block\"><div class=\"code-header\">\
                     <span class=\"code-lang\">{lang}</span></div>\
                     <pre><code class=\"language-{lang}\">{}</code></pre></div>",
                    s[body_start..body_end].trim()
                ));
                i = body_end + FENCE.len();
            }
            None => {
                out.push('`');
                i += 1;
            }
        }
    }
    out
}

/// A delimiter pair and the tags it becomes.
struct Span {
    marker: &'static str,
    open: &'static str,
    close: &'static str,
    /// Content may be empty (`****`).
    allow_empty: bool,
    /// Content may span lines.
    multiline: bool,
}

impl Span {
    const INLINE_CODE: Self = Self {
        marker: "`",
        open: "<code class=\"inline-code\">",
        close: "</code>",
        allow_empty: false,
        multiline: true,
    };
    const BOLD: Self = Self {
        marker: "**",
        open: "<strong>",
        close: "</strong>",
        allow_empty: true,
        multiline: false,
    };
    const ITALIC: Self = Self {
        marker: "*",
        open: "<em>",
        close: "</em>",
        allow_empty: true,
        multiline: false,
    };
    const UNDERLINE: Self = Self {
        marker: "__",
        open: "<u>",
        close: "</u>",
        allow_empty: true,
        multiline: false,
    };
}

/// Wrap each shortest `marker…marker` run, scanning left to right.
fn delimited(s: &str, span: Span) -> String {
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if s[i..].starts_with(span.marker) {
            let content_start = i + span.marker.len();
            if let Some(content_end) = closing_marker(s, content_start, &span) {
                out.push_str(span.open);
                out.push_str(&s[content_start..content_end]);
                out.push_str(span.close);
                i = content_end + span.marker.len();
                continue;
            }
        }
        let len = char_len_at(s, i);
        out.push_str(&s[i..i + len]);
        i += len;
    }
    out
}

fn closing_marker(s: &str, from: usize, span: &Span) -> Option<usize> {
    let rest = &s[from..];
    let end = from + rest.find(span.marker)?;
    if !span.allow_empty && end == from {
        return None;
    }
    if !span.multiline && s[from..end].contains('\n') {
        return None;
    }
    Some(end)
}
