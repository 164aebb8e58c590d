//! # Lexer
//!
//! Classifies a whole buffer into a flat sequence of [`Token`]s, driven by a
//! [`RuleTable`]. The lexer keeps no state between calls: every input event
//! re-tokenizes the full text and leaves it to the
//! [renderer](crate::render) to work out what actually changed.
//!
//! ## Phases
//!
//! 1. **Normalize**: strip `\r`, pad a trailing line break with a space
//! 2. **Split**: cut the text on the combined block pattern and classify each
//!    fragment with the first block rule that covers it
//! 3. **Run-in**: glue fragments onto a directly preceding block that their
//!    rules allow (lazy paragraph continuation)
//! 4. **Anchor**: give the first token of every non-silent block the number
//!    of line breaks since the previous anchored block
//! 5. **Inline**: split off the block marker, then cut the rest on the inline
//!    pattern that applies to the block

mod split;

pub use split::split_keeping_matches;

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use crate::rules::{BlockKind, BlockType, InlineKind, RuleTable, SubRules};

/// A classified slice of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub block: BlockType,
    pub inline: Option<InlineKind>,
    /// Line breaks since the previous anchored token, or 0 when this token
    /// does not start an anchored block.
    pub line: u32,
}

impl Token {
    /// Composite class: block type and inline type separated by a space.
    pub fn class(&self) -> String {
        format!(
            "{} {}",
            self.block,
            self.inline.map_or("", InlineKind::as_str)
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<16}", self.class().trim_end())?;
        if self.line != 0 {
            write!(f, " +{:<4}", self.line)?;
        } else {
            write!(f, "      ")?;
        }
        write!(f, " {:?}", self.text)
    }
}

/// Strips carriage returns and pads a trailing line break.
///
/// Tokens produced by [`Lexer::tokenize`] always concatenate to this.
pub fn normalize_input(text: &str) -> Cow<'_, str> {
    // A trailing `\r` counts as a break too, so check before stripping.
    let pad = text.ends_with(['\n', '\r']);
    let mut text = if text.contains('\r') {
        Cow::Owned(text.replace('\r', ""))
    } else {
        Cow::Borrowed(text)
    };
    if pad {
        text.to_mut().push(' ');
    }
    text
}

/// A block fragment after run-in merging.
#[derive(Debug, Clone)]
struct Fragment {
    span: Range<usize>,
    kind: BlockKind,
}

#[derive(Debug, Clone, Copy)]
pub struct Lexer<'r> {
    rules: &'r RuleTable,
}

impl<'r> Lexer<'r> {
    pub fn new(rules: &'r RuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'r RuleTable {
        self.rules
    }

    /// Tokenizes the whole of `text`.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let input = normalize_input(text);
        let input = input.as_ref();

        let fragments = self.merge_run_ins(input);

        let mut tokens = Vec::new();
        let mut line_breaks = 0u32;
        for fragment in &fragments {
            let block = &input[fragment.span.clone()];
            let line = if self.rules.is_silent(fragment.kind) {
                0
            } else {
                std::mem::take(&mut line_breaks)
            };
            self.tokenize_block(block, fragment.kind, line, &mut tokens);
            line_breaks += block.matches('\n').count() as u32;
        }
        tokens
    }

    /// Inline kind of `text` inside a block of type `block`.
    pub fn identify_inline(&self, block: BlockType, text: &str) -> Option<InlineKind> {
        self.rules.identify_inline(block, text)
    }

    fn merge_run_ins(&self, input: &str) -> Vec<Fragment> {
        let mut fragments: Vec<Fragment> = Vec::new();
        // Kind of the last fragment that started a block; merges keep it.
        let mut previous: Option<BlockKind> = None;
        let mut offset = 0;

        for part in split_keeping_matches(self.rules.blocks().splitter(), input) {
            let span = offset..offset + part.len();
            offset = span.end;
            if part.is_empty() {
                continue;
            }

            let kind = self.rules.classify(part);
            if let (Some(prev), Some(last)) = (previous, fragments.last_mut())
                && self.rules.run_in(kind).contains(&prev)
            {
                last.span.end = span.end;
                continue;
            }

            fragments.push(Fragment { span, kind });
            previous = Some(kind);
        }
        fragments
    }

    fn tokenize_block(&self, block: &str, kind: BlockKind, mut line: u32, out: &mut Vec<Token>) {
        let rules = match self.rules.sub_rules(kind) {
            Some(SubRules::Opaque) => {
                out.push(Token {
                    text: block.to_string(),
                    block: BlockType::block(kind),
                    inline: None,
                    line,
                });
                return;
            }
            Some(SubRules::Rules(set)) => set,
            None => self.rules.inline(),
        };

        let mut rest = block;
        if let Some(marker) = self.rules.marker(kind)
            && let Some(caps) = marker.captures(block)
            && let (Some(mark), Some(remainder)) = (caps.get(1), caps.get(2))
            && !remainder.is_empty()
        {
            let block_type = BlockType::mark(kind);
            out.push(Token {
                text: mark.as_str().to_string(),
                block: block_type,
                inline: self.rules.identify_inline(block_type, mark.as_str()),
                line,
            });
            line = 0;
            rest = remainder.as_str();
        }

        let block_type = BlockType::block(kind);
        for part in split_keeping_matches(rules.splitter(), rest) {
            if part.is_empty() {
                continue;
            }
            out.push(Token {
                text: part.to_string(),
                block: block_type,
                inline: rules.identify(part),
                line,
            });
            line = 0;
        }
    }
}

/// Tokenizes `text` with the built-in Markdown rules.
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(crate::rules::markdown_rules()).tokenize(text)
}
