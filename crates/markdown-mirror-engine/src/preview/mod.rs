//! # Preview
//!
//! Renders the preview pane with `pulldown-cmark`. Every top-level block is
//! tagged with the 0-based source line it starts on, as
//! `class="line" data-line="N"`, which is what the scroll map pairs with the
//! source pane's anchors.

mod lines;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};

use crate::scroll::PreviewAnchor;
use lines::LineIndex;

/// Coarse kind of a top-level preview block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Heading(u8),
    Paragraph,
    Quote,
    Code,
    List,
    Table,
    Rule,
    Html,
    Other,
}

/// A top-level block flattened to plain text, for hosts that cannot show
/// HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewBlock {
    pub line: u32,
    pub kind: PreviewKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PreviewRenderer {
    options: Options,
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_MATH);
        Self { options }
    }

    /// Renders `text` to HTML with line-tagged top-level blocks.
    pub fn render(&self, text: &str) -> String {
        let lines = LineIndex::new(text);
        let mut events: Vec<Event> = Vec::new();
        let mut depth = 0usize;
        let mut wrapped = false;

        for (event, range) in Parser::new_ext(text, self.options).into_offset_iter() {
            match event {
                Event::Start(tag) => {
                    if depth == 0 {
                        let line = lines.line_of(range.start);
                        match tagged_start(&tag, line) {
                            Some(start) => events.push(Event::Html(start.into())),
                            None => {
                                events.push(Event::Html(format!("<div{}>\n", attrs(line)).into()));
                                events.push(Event::Start(tag));
                                wrapped = true;
                            }
                        }
                    } else {
                        events.push(Event::Start(tag));
                    }
                    depth += 1;
                }
                Event::End(tag) => {
                    depth = depth.saturating_sub(1);
                    events.push(Event::End(tag));
                    if depth == 0 && wrapped {
                        events.push(Event::Html("</div>\n".into()));
                        wrapped = false;
                    }
                }
                Event::Rule if depth == 0 => {
                    let line = lines.line_of(range.start);
                    events.push(Event::Html(format!("<hr{} />\n", attrs(line)).into()));
                }
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    /// Top-level blocks of `text` as plain text.
    pub fn blocks(&self, text: &str) -> Vec<PreviewBlock> {
        let lines = LineIndex::new(text);
        let mut blocks = Vec::new();
        let mut current: Option<PreviewBlock> = None;
        let mut lists: Vec<Option<u64>> = Vec::new();
        let mut depth = 0usize;

        for (event, range) in Parser::new_ext(text, self.options).into_offset_iter() {
            if depth == 0 && current.is_none() {
                current = Some(PreviewBlock {
                    line: lines.line_of(range.start),
                    kind: block_kind(&event),
                    text: String::new(),
                });
            }
            let Some(block) = current.as_mut() else {
                continue;
            };

            match event {
                Event::Start(tag) => {
                    depth += 1;
                    match tag {
                        Tag::List(start) => lists.push(start),
                        Tag::Item => push_item_marker(&mut block.text, &mut lists),
                        Tag::Paragraph | Tag::CodeBlock(_) if depth > 1 => {
                            ensure_line_start(&mut block.text);
                        }
                        _ => {}
                    }
                }
                Event::End(tag) => {
                    depth = depth.saturating_sub(1);
                    match tag {
                        TagEnd::List(_) => {
                            lists.pop();
                        }
                        TagEnd::Item | TagEnd::TableHead | TagEnd::TableRow => {
                            ensure_line_start(&mut block.text);
                        }
                        TagEnd::TableCell => block.text.push_str("  "),
                        _ => {}
                    }
                }
                Event::Text(text)
                | Event::Code(text)
                | Event::InlineMath(text)
                | Event::DisplayMath(text)
                | Event::Html(text)
                | Event::InlineHtml(text) => block.text.push_str(&text),
                Event::SoftBreak => block.text.push(' '),
                Event::HardBreak => block.text.push('\n'),
                Event::TaskListMarker(done) => {
                    block.text.push_str(if done { "[x] " } else { "[ ] " });
                }
                Event::FootnoteReference(label) => {
                    block.text.push_str(&format!("[^{label}]"));
                }
                _ => {}
            }

            if depth == 0
                && let Some(mut block) = current.take()
            {
                let trimmed = block.text.trim_end().len();
                block.text.truncate(trimmed);
                blocks.push(block);
            }
        }
        blocks
    }

    /// Line anchors of the top-level blocks, positioned by `offset`.
    ///
    /// `offset` receives each block's index and line and returns its
    /// vertical position in the host's layout.
    pub fn anchors(
        &self,
        blocks: &[PreviewBlock],
        mut offset: impl FnMut(usize, &PreviewBlock) -> f64,
    ) -> Vec<PreviewAnchor> {
        blocks
            .iter()
            .enumerate()
            .map(|(index, block)| PreviewAnchor {
                line: block.line,
                offset: offset(index, block),
            })
            .collect()
    }
}

/// Opening tag carrying the line attributes, for the blocks whose tag can be
/// written directly. `None` means the block has to be wrapped instead.
fn tagged_start(tag: &Tag, line: u32) -> Option<String> {
    let attrs = attrs(line);
    let start = match tag {
        Tag::Paragraph => format!("<p{attrs}>"),
        Tag::Heading { level, .. } => format!("<h{}{attrs}>", *level as usize),
        Tag::BlockQuote(_) => format!("<blockquote{attrs}>\n"),
        Tag::CodeBlock(kind) => match code_language(kind) {
            Some(lang) => format!(
                "<pre{attrs}><code class=\"language-{}\">",
                html_escape::encode_double_quoted_attribute(lang)
            ),
            None => format!("<pre{attrs}><code>"),
        },
        Tag::List(Some(1)) => format!("<ol{attrs}>\n"),
        Tag::List(Some(start)) => format!("<ol{attrs} start=\"{start}\">\n"),
        Tag::List(None) => format!("<ul{attrs}>\n"),
        _ => return None,
    };
    Some(start)
}

fn attrs(line: u32) -> String {
    format!(" class=\"line\" data-line=\"{line}\"")
}

fn code_language<'a>(kind: &'a CodeBlockKind) -> Option<&'a str> {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next(),
        CodeBlockKind::Indented => None,
    }
}

fn block_kind(event: &Event) -> PreviewKind {
    match event {
        Event::Start(Tag::Heading { level, .. }) => PreviewKind::Heading(*level as u8),
        Event::Start(Tag::Paragraph) => PreviewKind::Paragraph,
        Event::Start(Tag::BlockQuote(_)) => PreviewKind::Quote,
        Event::Start(Tag::CodeBlock(_)) => PreviewKind::Code,
        Event::Start(Tag::List(_)) => PreviewKind::List,
        Event::Start(Tag::Table(_)) => PreviewKind::Table,
        Event::Start(Tag::HtmlBlock) => PreviewKind::Html,
        Event::Rule => PreviewKind::Rule,
        _ => PreviewKind::Other,
    }
}

fn push_item_marker(text: &mut String, lists: &mut [Option<u64>]) {
    ensure_line_start(text);
    let indent = "  ".repeat(lists.len().saturating_sub(1));
    text.push_str(&indent);
    match lists.last_mut() {
        Some(Some(number)) => {
            text.push_str(&format!("{number}. "));
            *number += 1;
        }
        _ => text.push_str("• "),
    }
}

fn ensure_line_start(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn renders_line_tagged_blocks() {
        let html = PreviewRenderer::new().render("# Title\n\nSome *text*.");
        assert_snapshot!(html.trim_end(), @r#"
        <h1 class="line" data-line="0">Title</h1>
        <p class="line" data-line="2">Some <em>text</em>.</p>
        "#);
    }

    #[rstest]
    #[case("- a\n- b\n", r#"<ul class="line" data-line="0">"#)]
    #[case("3. a\n4. b\n", r#"<ol class="line" data-line="0" start="3">"#)]
    #[case("\n\n> quoted\n", r#"<blockquote class="line" data-line="2">"#)]
    #[case("```rust\nfn main() {}\n```\n", r#"<pre class="line" data-line="0"><code class="language-rust">"#)]
    #[case("a\n\n---\n", r#"<hr class="line" data-line="2" />"#)]
    fn tags_each_kind_of_block(#[case] text: &str, #[case] expected: &str) {
        let html = PreviewRenderer::new().render(text);
        assert!(html.contains(expected), "{html}");
    }

    #[test]
    fn wraps_tables_in_a_tagged_div() {
        let html = PreviewRenderer::new().render("intro\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<div class=\"line\" data-line=\"2\">\n<table>"), "{html}");
        assert!(html.trim_end().ends_with("</table>\n</div>"), "{html}");
    }

    #[test]
    fn nested_blocks_are_not_tagged() {
        let html = PreviewRenderer::new().render("> para one\n>\n> para two\n");
        assert_eq!(html.matches("data-line").count(), 1, "{html}");
    }

    #[test]
    fn language_is_escaped() {
        let html = PreviewRenderer::new().render("```a\"b\nx\n```\n");
        assert!(!html.contains("language-a\"b"), "{html}");
    }

    #[test]
    fn blocks_flatten_to_plain_text() {
        let blocks = PreviewRenderer::new().blocks("# Title\n\nSome *text*\nwrapped.\n\n- one\n- two\n");
        assert_eq!(
            blocks,
            vec![
                PreviewBlock {
                    line: 0,
                    kind: PreviewKind::Heading(1),
                    text: "Title".to_string(),
                },
                PreviewBlock {
                    line: 2,
                    kind: PreviewKind::Paragraph,
                    text: "Some text wrapped.".to_string(),
                },
                PreviewBlock {
                    line: 5,
                    kind: PreviewKind::List,
                    text: "• one\n• two".to_string(),
                },
            ]
        );
    }

    #[test]
    fn ordered_lists_count_up() {
        let blocks = PreviewRenderer::new().blocks("2. a\n3. b\n");
        assert_eq!(blocks[0].text, "2. a\n3. b");
    }

    #[test]
    fn rule_is_its_own_block() {
        let blocks = PreviewRenderer::new().blocks("a\n\n***\n\nb\n");
        let kinds: Vec<_> = blocks.iter().map(|b| (b.kind, b.line)).collect();
        assert_eq!(
            kinds,
            vec![
                (PreviewKind::Paragraph, 0),
                (PreviewKind::Rule, 2),
                (PreviewKind::Paragraph, 4),
            ]
        );
    }

    #[test]
    fn anchors_follow_host_offsets() {
        let renderer = PreviewRenderer::new();
        let blocks = renderer.blocks("a\n\nb\n");
        let anchors = renderer.anchors(&blocks, |index, _| index as f64 * 3.0);
        assert_eq!(
            anchors,
            vec![
                PreviewAnchor {
                    line: 0,
                    offset: 0.0
                },
                PreviewAnchor {
                    line: 2,
                    offset: 3.0
                },
            ]
        );
    }
}
