//! Splitting processed text into text and image segments for display.

use serde::Serialize;

use crate::catalog::ResourceHandle;
use crate::line::{ActiveLine, ProcessedLine, ResolvedImageRef};
use crate::placeholder::{find_tokens, unfinished_token_start};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Segment<'a> {
    Text(&'a str),
    Image(&'a ResourceHandle),
}

/// Segments of a committed line
pub fn line_segments(line: &ProcessedLine) -> Vec<Segment<'_>> {
    segments(line.text(), line.images())
}

/// Segments of the line being typed. A token that is only partly revealed is
/// held back until its closing braces arrive.
pub fn active_segments(active: &ActiveLine) -> Vec<Segment<'_>> {
    let visible = match unfinished_token_start(&active.text) {
        Some(start) => &active.text[..start],
        None => active.text.as_str(),
    };
    segments(visible, &active.images)
}

fn segments<'a>(text: &'a str, images: &'a [ResolvedImageRef]) -> Vec<Segment<'a>> {
    let mut out = Vec::new();
    let mut last = 0;

    for token in find_tokens(text) {
        let image = images.iter().find(|image| image.slot_index == token.slot);
        // Tokens without an image stay as text
        let Some(image) = image else { continue };

        if token.span.start > last {
            out.push(Segment::Text(&text[last..token.span.start]));
        }
        out.push(Segment::Image(&image.resource));
        last = token.span.end;
    }

    if last < text.len() {
        out.push(Segment::Text(&text[last..]));
    }
    out
}

/// Flatten segments to a string, drawing images with `image`
pub fn to_plain<F>(segments: &[Segment<'_>], mut image: F) -> String
where
    F: FnMut(&ResourceHandle) -> String,
{
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => (*text).to_string(),
            Segment::Image(resource) => image(resource),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heart_line() -> ProcessedLine {
        ProcessedLine::new(
            "love {{IMG_0}}!",
            vec![ResolvedImageRef::new(0, ResourceHandle::new("heart.jfif"))],
        )
        .unwrap()
    }

    #[test]
    fn test_line_segments() {
        let line = heart_line();
        let segs = line_segments(&line);
        assert_eq!(
            segs,
            vec![
                Segment::Text("love "),
                Segment::Image(&line.images()[0].resource),
                Segment::Text("!"),
            ]
        );
    }

    #[test]
    fn test_plain_line_is_one_segment() {
        let line = ProcessedLine::plain("hi").unwrap();
        assert_eq!(line_segments(&line), vec![Segment::Text("hi")]);
        let empty = ProcessedLine::plain("").unwrap();
        assert!(line_segments(&empty).is_empty());
    }

    #[test]
    fn test_active_hides_partial_token() {
        let line = heart_line();
        let mut active = ActiveLine::start(&line);
        active.text = "love {{IMG_".to_string();
        assert_eq!(active_segments(&active), vec![Segment::Text("love ")]);

        active.text = "love {{IMG_0}}".to_string();
        assert_eq!(
            active_segments(&active),
            vec![
                Segment::Text("love "),
                Segment::Image(&line.images()[0].resource)
            ]
        );
    }

    #[test]
    fn test_to_plain() {
        let line = heart_line();
        let text = to_plain(&line_segments(&line), |r| format!("[{}]", r));
        assert_eq!(text, "love [heart.jfif]!");
    }
}
