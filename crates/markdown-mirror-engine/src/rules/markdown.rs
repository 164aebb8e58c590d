//! The shipped Markdown + LaTeX rule table.

use std::sync::OnceLock;

use super::{BlockKind, InlineKind, RuleError, RuleTable};

/// Options for [`RuleTable::markdown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleOptions {
    pub case_insensitive: bool,
}

// Block rules, in precedence order. `paragraph` is the catch-all and takes a
// single line; consecutive lines are glued back together by run-in.
const LATEX_BLOCK: &str = r"[ \t]*\$\$\n?(?:[^\n]+\n)*(?:[^\n]*[^\\\n])?\$\$(?:[ \t]*\([ \t]*\S+[ \t]*\))?[ \t]*(?:\n|$)";
const EMPTY: &str = r"(?:[ \t]*\n)+";
const FENCE: &str = r"```[\s\S]*?(?:$|```(?:\n|$))";
const REFERENCE: &str = r"\[[^\]]+\]:[^\n]*(?:\n|$)";
// The heading leaves its line break to the following block.
const HEADER: &str = r"#{1,6} [^\n]*";
const HEADER2: &str = r"[^\n]+\n[ \t]*[=-]{2,}(?:\n|$)";
const RULE: &str = r"(?:[*]{3,}|[-]{3,}|[_]{3,})(?:\n|$)";
const LIST: &str = r"[ ]{0,3}(?:[+\-*]|\d+\.)[ \t]+[^\n]*(?:\n[ \t]*[^\n\t ]+[ \t]*)*(?:\n|$)";
const QUOTE: &str = r"[ ]{0,3}>[^\n]*(?:\n|$)";
const PARAGRAPH: &str = r"[\s\S]*?(?:\n|$)";

const LATEX: &str = r"\$\$(?:[\s\S]*?[^\\])?\$\$";
const LINK: &str = r"\[.+?\][(\[].*?[)\]]";
const BOLD: &str = r"(?:\s|^)__[\s\S]*?\S__|\*\*[\s\S]*?\S\*\*";
const ITALIC: &str = r"(?:\s|^)_[\s\S]*?[^\\\s]_|\*[^\\\s]\*|\*\S[\s\S]*?[^\\\s]\*";
const STRIKE: &str = r"~~.+?~~";
const SUP: &str = r"\^.+?\^";
const SUB: &str = r"~.+?~";
const CODE: &str = r"``.+?``|`.*?[^`\\]`";

// Inside `$$ … $$`.
const TEX_COMMENT: &str = r"%(?:[^\n$]|\$[^\n$])*";
const TEX_REFERENCE: &str = r"[ \t]*\([ \t]*\S+[ \t]*\)[ \t\n]*$";
const TEX_INDEX: &str = r"(?:\^|_)(?:\\[a-zA-Zа-яА-я]+[*]?(?:\{.*?\})|\{[a-zA-Zа-яА-я0-9]*?\}|[a-zA-Zа-яА-я0-9])";
const TEX_BRACKET: &str = r"(?:(?:\\left|\\right)?[{}\[\]()|])";
const TEX_KEYWORD: &str = r"\\[a-zA-Zа-яА-я]+[*]?";
const TEX_KEYWORD2: &str = r"\\[^a-zA-Zа-яА-я0-9]";
const TEX_KEYWORD3: &str = r"&";
const TEX_DELIMITER: &str = r"\$\$";

const LIST_MARKER: &str = r"^([ ]{0,3}(?:[+\-*]|\d+\.)[ \t]+)([\s\S]*)$";
const QUOTE_MARKER: &str = r"^([ ]{0,3}(?:>[ \t]*)+)([\s\S]*)$";
const HEADER_MARKER: &str = r"^(#{1,6} )([\s\S]*)$";

impl RuleTable {
    /// Rules for Markdown with `$$`-delimited LaTeX.
    pub fn markdown(options: &RuleOptions) -> Result<RuleTable, RuleError> {
        RuleTable::builder()
            .case_insensitive(options.case_insensitive)
            .block(BlockKind::LatexBlock, LATEX_BLOCK)
            .block(BlockKind::Empty, EMPTY)
            .block(BlockKind::Fence, FENCE)
            .block(BlockKind::Reference, REFERENCE)
            .block(BlockKind::Header, HEADER)
            .block(BlockKind::Header2, HEADER2)
            .block(BlockKind::Rule, RULE)
            .block(BlockKind::List, LIST)
            .block(BlockKind::Quote, QUOTE)
            .block(BlockKind::Paragraph, PARAGRAPH)
            .inline(InlineKind::Latex, LATEX)
            .inline(InlineKind::Link, LINK)
            .inline(InlineKind::Bold, BOLD)
            .inline(InlineKind::Italic, ITALIC)
            .inline(InlineKind::Strike, STRIKE)
            .inline(InlineKind::Sup, SUP)
            .inline(InlineKind::Sub, SUB)
            .inline(InlineKind::Code, CODE)
            .opaque(BlockKind::Fence)
            .opaque(BlockKind::Rule)
            .sub_rules(
                BlockKind::LatexBlock,
                [
                    (InlineKind::Comment, TEX_COMMENT),
                    (InlineKind::Reference, TEX_REFERENCE),
                    (InlineKind::Index, TEX_INDEX),
                    (InlineKind::Bracket, TEX_BRACKET),
                    (InlineKind::Keyword, TEX_KEYWORD),
                    (InlineKind::Keyword2, TEX_KEYWORD2),
                    (InlineKind::Keyword3, TEX_KEYWORD3),
                    (InlineKind::Delimiter, TEX_DELIMITER),
                ],
            )
            .run_in(
                BlockKind::Paragraph,
                &[BlockKind::Paragraph, BlockKind::Quote, BlockKind::List],
            )
            .marker(BlockKind::List, LIST_MARKER)
            .marker(BlockKind::Quote, QUOTE_MARKER)
            .marker(BlockKind::Header, HEADER_MARKER)
            .silent(BlockKind::Empty)
            .build()
    }
}

/// The default Markdown table, built on first use.
pub fn markdown_rules() -> &'static RuleTable {
    static RULES: OnceLock<RuleTable> = OnceLock::new();
    RULES.get_or_init(|| {
        RuleTable::markdown(&RuleOptions::default()).expect("Invalid built-in markdown rules")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::BlockType;
    use rstest::rstest;

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn markdown_table_builds(#[case] case_insensitive: bool) {
        let table = RuleTable::markdown(&RuleOptions { case_insensitive }).unwrap();
        assert_eq!(table.catch_all(), BlockKind::Paragraph);
        assert!(table.is_silent(BlockKind::Empty));
        assert!(!table.is_silent(BlockKind::Paragraph));
    }

    #[rstest]
    #[case("# Title", BlockKind::Header)]
    #[case("\n\n", BlockKind::Empty)]
    #[case("```\nlet x = 1;\n```\n", BlockKind::Fence)]
    #[case("[id]: http://example.com\n", BlockKind::Reference)]
    #[case("Title\n=====\n", BlockKind::Header2)]
    #[case("***\n", BlockKind::Rule)]
    #[case("- item\n", BlockKind::List)]
    #[case("12. item\n", BlockKind::List)]
    #[case("> quoted\n", BlockKind::Quote)]
    #[case("$$x^2$$\n", BlockKind::LatexBlock)]
    #[case("plain words\n", BlockKind::Paragraph)]
    fn classifies_blocks(#[case] fragment: &str, #[case] expected: BlockKind) {
        assert_eq!(markdown_rules().classify(fragment), expected);
    }

    #[rstest]
    #[case("*text*", Some(InlineKind::Italic))]
    #[case("**text**", Some(InlineKind::Bold))]
    #[case("`code`", Some(InlineKind::Code))]
    #[case("[a](http://b)", Some(InlineKind::Link))]
    #[case("~~gone~~", Some(InlineKind::Strike))]
    #[case("$$e=mc^2$$", Some(InlineKind::Latex))]
    #[case("plain", None)]
    fn identifies_paragraph_inlines(#[case] text: &str, #[case] expected: Option<InlineKind>) {
        let paragraph = BlockType::block(BlockKind::Paragraph);
        assert_eq!(markdown_rules().identify_inline(paragraph, text), expected);
    }

    #[rstest]
    #[case(r"\alpha", Some(InlineKind::Keyword))]
    #[case(r"\{", Some(InlineKind::Keyword2))]
    #[case("&", Some(InlineKind::Keyword3))]
    #[case("$$", Some(InlineKind::Delimiter))]
    #[case("^2", Some(InlineKind::Index))]
    #[case(r"\left(", Some(InlineKind::Bracket))]
    #[case("% note", Some(InlineKind::Comment))]
    #[case("*text*", None)]
    fn latex_blocks_use_their_own_rules(#[case] text: &str, #[case] expected: Option<InlineKind>) {
        let latex = BlockType::block(BlockKind::LatexBlock);
        assert_eq!(markdown_rules().identify_inline(latex, text), expected);
    }

    #[test]
    fn fences_are_opaque() {
        let fence = BlockType::block(BlockKind::Fence);
        assert_eq!(markdown_rules().identify_inline(fence, "*text*"), None);
    }
}
