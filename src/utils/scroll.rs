use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Handles scroll-related calculations and line wrapping.
///
/// The transcript is pre-wrapped to the viewport width before rendering so
/// that line counts, and therefore scroll offsets, match what ratatui puts on
/// screen exactly.
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Wraps styled lines to `width` display columns at word boundaries,
    /// breaking tokens that are wider than a full line. Span styles carry
    /// over onto the wrapped segments.
    pub fn prewrap_lines(lines: &[Line], width: u16) -> Vec<Line<'static>> {
        let width = width as usize;
        if width == 0 {
            return lines.iter().map(clone_owned).collect();
        }

        let mut out: Vec<Line<'static>> = Vec::with_capacity(lines.len());
        for line in lines {
            if line.spans.is_empty() {
                out.push(Line::from(""));
                continue;
            }

            let mut current: Vec<Span<'static>> = Vec::new();
            let mut current_width = 0usize;

            for span in &line.spans {
                for token in tokenize(&span.content) {
                    let token_width = UnicodeWidthStr::width(token);

                    if current_width + token_width > width && current_width > 0 {
                        trim_line_end(&mut current);
                        out.push(Line::from(std::mem::take(&mut current)));
                        current_width = 0;
                        // Whitespace at a break point disappears into the wrap.
                        if token.trim().is_empty() {
                            continue;
                        }
                    }

                    if token_width > width {
                        current_width =
                            break_long_token(token, span.style, width, &mut current, &mut out);
                        continue;
                    }

                    if current_width == 0 && token.trim().is_empty() {
                        continue;
                    }
                    push_styled(&mut current, token, span.style);
                    current_width += token_width;
                }
            }

            out.push(Line::from(current));
        }
        out
    }

    pub fn wrapped_line_count(lines: &[Line], width: u16) -> u16 {
        Self::prewrap_lines(lines, width).len().min(u16::MAX as usize) as u16
    }

    pub fn max_scroll_offset(lines: &[Line], width: u16, viewport_height: u16) -> u16 {
        Self::wrapped_line_count(lines, width).saturating_sub(viewport_height)
    }
}

fn clone_owned(line: &Line) -> Line<'static> {
    if line.spans.is_empty() {
        return Line::from("");
    }
    let spans: Vec<Span<'static>> = line
        .spans
        .iter()
        .map(|s| Span::styled(s.content.to_string(), s.style))
        .collect();
    Line::from(spans)
}

/// Splits text into alternating word and whitespace runs.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != is_space => {
                tokens.push(&text[start..idx]);
                start = idx;
                in_space = Some(is_space);
            }
            None => in_space = Some(is_space),
            _ => {}
        }
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Hard-breaks a token wider than the viewport, emitting full lines as it
/// goes. Returns the width of the partial segment left in `current`.
fn break_long_token(
    token: &str,
    style: Style,
    width: usize,
    current: &mut Vec<Span<'static>>,
    out: &mut Vec<Line<'static>>,
) -> usize {
    let mut segment = String::new();
    let mut segment_width = 0usize;

    for ch in token.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if segment_width + ch_width > width && segment_width > 0 {
            push_styled(current, &segment, style);
            out.push(Line::from(std::mem::take(current)));
            segment.clear();
            segment_width = 0;
        }
        segment.push(ch);
        segment_width += ch_width;
    }

    if !segment.is_empty() {
        push_styled(current, &segment, style);
    }
    segment_width
}

fn trim_line_end(current: &mut Vec<Span<'static>>) {
    while let Some(last) = current.last_mut() {
        let trimmed = last.content.trim_end();
        if trimmed.is_empty() {
            current.pop();
        } else {
            if trimmed.len() != last.content.len() {
                *last = Span::styled(trimmed.to_string(), last.style);
            }
            break;
        }
    }
}

fn push_styled(current: &mut Vec<Span<'static>>, text: &str, style: Style) {
    if let Some(last) = current.last_mut() {
        if last.style == style {
            let mut combined = String::with_capacity(last.content.len() + text.len());
            combined.push_str(&last.content);
            combined.push_str(text);
            *last = Span::styled(combined, style);
            return;
        }
    }
    current.push(Span::styled(text.to_string(), style));
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn short_lines_pass_through() {
        let lines = vec![Line::from("hello world"), Line::from("")];
        let wrapped = ScrollCalculator::prewrap_lines(&lines, 40);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(line_text(&wrapped[0]), "hello world");
        assert!(wrapped[1].spans.is_empty() || line_text(&wrapped[1]).is_empty());
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = vec![Line::from("the quick brown fox jumps")];
        let wrapped = ScrollCalculator::prewrap_lines(&lines, 10);
        let texts: Vec<String> = wrapped.iter().map(line_text).collect();
        assert_eq!(texts, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn breaks_tokens_wider_than_the_viewport() {
        let lines = vec![Line::from("abcdefghij12345")];
        let wrapped = ScrollCalculator::prewrap_lines(&lines, 6);
        let texts: Vec<String> = wrapped.iter().map(line_text).collect();
        assert_eq!(texts, vec!["abcdef", "ghij12", "345"]);
    }

    #[test]
    fn styles_survive_wrapping() {
        let styled = Style::default().fg(Color::Cyan);
        let lines = vec![Line::from(vec![
            Span::styled("You: ", styled),
            Span::raw("a somewhat longer message"),
        ])];
        let wrapped = ScrollCalculator::prewrap_lines(&lines, 12);
        assert!(wrapped.len() > 1);
        assert_eq!(wrapped[0].spans[0].style, styled);
        assert_eq!(wrapped[0].spans[0].content.as_ref(), "You: ");
    }

    #[test]
    fn zero_width_passes_lines_through() {
        let lines = vec![Line::from("anything at all")];
        let wrapped = ScrollCalculator::prewrap_lines(&lines, 0);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(line_text(&wrapped[0]), "anything at all");
    }

    #[test]
    fn max_scroll_offset_accounts_for_viewport() {
        let lines: Vec<Line> = (0..10).map(|i| Line::from(format!("line {i}"))).collect();
        assert_eq!(ScrollCalculator::max_scroll_offset(&lines, 40, 4), 6);
        assert_eq!(ScrollCalculator::max_scroll_offset(&lines, 40, 20), 0);
    }
}
