//! Escaping for the serialization targets.
//!
//! Every piece of user-supplied text (aliases, entity ids, service names, friendly names) goes
//! through one of these before it is embedded in a document.

use std::fmt::Write as _;

fn html_escape_for(b: u8) -> Option<&'static str> {
    match b {
        b'&' => Some("&amp;"),
        b'<' => Some("&lt;"),
        b'>' => Some("&gt;"),
        b'"' => Some("&quot;"),
        b'\'' => Some("&#39;"),
        _ => None,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(&mut out, text);
    out
}

pub fn escape_html_into(out: &mut String, text: &str) {
    let _ = write!(out, "{}", escape_html_display(text));
}

pub fn escape_html_display(text: &str) -> EscapeHtmlDisplay<'_> {
    EscapeHtmlDisplay(text)
}

/// Lazily HTML-escapes its text when formatted.
pub struct EscapeHtmlDisplay<'a>(&'a str);

impl std::fmt::Display for EscapeHtmlDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self.0;
        let mut start = 0usize;
        for (i, &b) in text.as_bytes().iter().enumerate() {
            let Some(esc) = html_escape_for(b) else {
                continue;
            };
            if start < i {
                f.write_str(&text[start..i])?;
            }
            f.write_str(esc)?;
            start = i + 1;
        }
        if start < text.len() {
            f.write_str(&text[start..])?;
        }
        Ok(())
    }
}

/// Escapes text for a quoted Mermaid label (`id["..."]`).
///
/// Mermaid decodes `#name;` / `#NN;` entity codes, so markup characters, quotes and `#` itself are
/// written that way. Line breaks collapse to spaces.
pub fn escape_mermaid(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("#quot;"),
            '&' => out.push_str("#amp;"),
            '<' => out.push_str("#lt;"),
            '>' => out.push_str("#gt;"),
            '#' => out.push_str("#35;"),
            '\r' | '\n' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_covers_markup_and_quotes() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
        assert_eq!(escape_html("Kitchen → Hall"), "Kitchen → Hall");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn escape_mermaid_uses_entity_codes() {
        assert_eq!(
            escape_mermaid("say \"hi\" <b>#1</b>\n&"),
            "say #quot;hi#quot; #lt;b#gt;#35;1#lt;/b#gt; #amp;"
        );
    }
}
