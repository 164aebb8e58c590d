//! # Rule Table
//!
//! Declarative configuration for the [lexer](crate::lexer): block patterns,
//! inline patterns, per-block sub-rule overrides, run-in merges and marker
//! extraction. A [`RuleTable`] is built once by [`RuleTableBuilder`], validated
//! on `build`, and never mutated afterwards.
//!
//! ## Rule order
//!
//! Order is part of the contract. Block rules are joined into a single
//! alternation in the order they were added, so when two rules could match at
//! the same position the earlier one takes the span. Classification of a
//! fragment also tries rules in that order and keeps the first match. Inline
//! rules and sub-rules follow the same rule. The last block rule must be a
//! catch-all.

pub mod kinds;
pub mod markdown;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

pub use kinds::{BlockKind, BlockType, InlineKind};
pub use markdown::{RuleOptions, markdown_rules};

/// Text samples every catch-all block rule must classify.
const CATCH_ALL_PROBES: [&str; 5] = ["x", "x\n", " ", "#", "-"];

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern for rule `{rule}`: {source}")]
    InvalidPattern { rule: String, source: regex::Error },

    #[error("no {0} rules configured")]
    EmptyRuleSet(String),

    #[error("last block rule `{0}` is not a catch-all")]
    MissingCatchAll(BlockKind),

    #[error("rule `{0}` is declared more than once")]
    DuplicateRule(String),

    #[error("marker pattern for `{0}` must have exactly two capture groups")]
    InvalidMarker(BlockKind),

    #[error("`{0}` declares a marker but its content is opaque")]
    OpaqueMarker(BlockKind),
}

/// A single named pattern.
#[derive(Debug, Clone)]
pub struct Rule<K> {
    kind: K,
    source: String,
    exact: Regex,
}

impl<K: Copy> Rule<K> {
    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the pattern covers the whole of `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.exact.is_match(text)
    }
}

/// An ordered set of rules plus the combined pattern used for splitting.
#[derive(Debug, Clone)]
pub struct RuleSet<K> {
    rules: Vec<Rule<K>>,
    splitter: Regex,
}

impl<K: Copy + PartialEq + std::fmt::Display> RuleSet<K> {
    fn compile(
        what: &str,
        patterns: &[(K, String)],
        case_insensitive: bool,
    ) -> Result<Self, RuleError> {
        if patterns.is_empty() {
            return Err(RuleError::EmptyRuleSet(what.to_string()));
        }

        let mut rules: Vec<Rule<K>> = Vec::with_capacity(patterns.len());
        for (kind, source) in patterns {
            if rules.iter().any(|r| r.kind == *kind) {
                return Err(RuleError::DuplicateRule(kind.to_string()));
            }
            let exact = compile(&kind.to_string(), &format!("^(?:{source})$"), case_insensitive)?;
            rules.push(Rule {
                kind: *kind,
                source: source.clone(),
                exact,
            });
        }

        let alternation = patterns
            .iter()
            .map(|(_, source)| format!("(?:{source})"))
            .collect::<Vec<_>>()
            .join("|");
        let splitter = compile(what, &alternation, case_insensitive)?;

        Ok(Self { rules, splitter })
    }
}

impl<K: Copy> RuleSet<K> {
    /// First rule, in order, matching the whole of `text`.
    pub fn identify(&self, text: &str) -> Option<K> {
        self.rules
            .iter()
            .find(|rule| rule.is_match(text))
            .map(|rule| rule.kind)
    }

    /// The alternation of every rule, in order.
    pub fn splitter(&self) -> &Regex {
        &self.splitter
    }

    pub fn rules(&self) -> &[Rule<K>] {
        &self.rules
    }
}

/// Per-block replacement of the inline rules.
#[derive(Debug, Clone)]
pub enum SubRules {
    /// No inline classification: the block is a single token.
    Opaque,
    /// Use these rules instead of the global inline rules.
    Rules(RuleSet<InlineKind>),
}

/// Immutable, validated lexer configuration.
#[derive(Debug, Clone)]
pub struct RuleTable {
    blocks: RuleSet<BlockKind>,
    inline: RuleSet<InlineKind>,
    sub_rules: [Option<SubRules>; BlockKind::COUNT],
    run_in: [Vec<BlockKind>; BlockKind::COUNT],
    markers: [Option<Regex>; BlockKind::COUNT],
    silent: [bool; BlockKind::COUNT],
}

impl RuleTable {
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    pub fn blocks(&self) -> &RuleSet<BlockKind> {
        &self.blocks
    }

    pub fn inline(&self) -> &RuleSet<InlineKind> {
        &self.inline
    }

    /// The block rule guaranteed to match any fragment.
    pub fn catch_all(&self) -> BlockKind {
        // `build` rejects an empty block rule set.
        self.blocks.rules[self.blocks.rules.len() - 1].kind
    }

    /// Classify a block fragment; falls back to the catch-all.
    pub fn classify(&self, fragment: &str) -> BlockKind {
        self.blocks
            .identify(fragment)
            .unwrap_or_else(|| self.catch_all())
    }

    pub fn sub_rules(&self, kind: BlockKind) -> Option<&SubRules> {
        self.sub_rules[kind.index()].as_ref()
    }

    /// Blocks that `kind` may be merged into when it directly follows them.
    pub fn run_in(&self, kind: BlockKind) -> &[BlockKind] {
        &self.run_in[kind.index()]
    }

    pub fn marker(&self, kind: BlockKind) -> Option<&Regex> {
        self.markers[kind.index()].as_ref()
    }

    /// Silent blocks never carry a line anchor.
    pub fn is_silent(&self, kind: BlockKind) -> bool {
        self.silent[kind.index()]
    }

    /// The inline rules that apply inside a block, or `None` when opaque.
    pub fn inline_rules_for(&self, kind: BlockKind) -> Option<&RuleSet<InlineKind>> {
        match self.sub_rules(kind) {
            Some(SubRules::Opaque) => None,
            Some(SubRules::Rules(set)) => Some(set),
            None => Some(&self.inline),
        }
    }

    /// Inline kind of `text` inside a block of type `block`.
    ///
    /// Marker tokens resolve against the global inline rules, since overrides
    /// are keyed by the block itself.
    pub fn identify_inline(&self, block: BlockType, text: &str) -> Option<InlineKind> {
        if block.is_mark {
            return self.inline.identify(text);
        }
        self.inline_rules_for(block.kind)?.identify(text)
    }
}

/// Chained construction of a [`RuleTable`].
#[derive(Debug, Default, Clone)]
pub struct RuleTableBuilder {
    case_insensitive: bool,
    block_rules: Vec<(BlockKind, String)>,
    inline_rules: Vec<(InlineKind, String)>,
    sub_rules: Vec<(BlockKind, Option<Vec<(InlineKind, String)>>)>,
    run_in: Vec<(BlockKind, Vec<BlockKind>)>,
    markers: Vec<(BlockKind, String)>,
    silent: Vec<BlockKind>,
}

impl RuleTableBuilder {
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// Append a block rule. Earlier rules win.
    pub fn block(mut self, kind: BlockKind, pattern: &str) -> Self {
        self.block_rules.push((kind, pattern.to_string()));
        self
    }

    /// Append a global inline rule. Earlier rules win.
    pub fn inline(mut self, kind: InlineKind, pattern: &str) -> Self {
        self.inline_rules.push((kind, pattern.to_string()));
        self
    }

    /// Replace the inline rules inside `block`.
    pub fn sub_rules<'a>(
        mut self,
        block: BlockKind,
        rules: impl IntoIterator<Item = (InlineKind, &'a str)>,
    ) -> Self {
        let rules = rules
            .into_iter()
            .map(|(kind, pattern)| (kind, pattern.to_string()))
            .collect();
        self.sub_rules.push((block, Some(rules)));
        self
    }

    /// Emit `block` as a single token without inline classification.
    pub fn opaque(mut self, block: BlockKind) -> Self {
        self.sub_rules.push((block, None));
        self
    }

    /// Merge `block` into a directly preceding block of one of `allowed` kinds.
    pub fn run_in(mut self, block: BlockKind, allowed: &[BlockKind]) -> Self {
        self.run_in.push((block, allowed.to_vec()));
        self
    }

    /// Split the leading marker of `block`.
    ///
    /// The pattern must be anchored and capture the marker in group 1 and the
    /// remainder in group 2.
    pub fn marker(mut self, block: BlockKind, pattern: &str) -> Self {
        self.markers.push((block, pattern.to_string()));
        self
    }

    /// Blocks of this kind do not take a line anchor.
    pub fn silent(mut self, block: BlockKind) -> Self {
        self.silent.push(block);
        self
    }

    pub fn build(self) -> Result<RuleTable, RuleError> {
        let ci = self.case_insensitive;
        let blocks = RuleSet::compile("block", &self.block_rules, ci)?;
        let inline = RuleSet::compile("inline", &self.inline_rules, ci)?;

        let last = &blocks.rules[blocks.rules.len() - 1];
        if !CATCH_ALL_PROBES.iter().all(|probe| last.is_match(probe)) {
            return Err(RuleError::MissingCatchAll(last.kind));
        }

        let mut sub_rules: [Option<SubRules>; BlockKind::COUNT] = Default::default();
        for (block, rules) in self.sub_rules {
            let slot = &mut sub_rules[block.index()];
            if slot.is_some() {
                return Err(RuleError::DuplicateRule(format!("{block} sub-rules")));
            }
            *slot = Some(match rules {
                None => SubRules::Opaque,
                Some(rules) => {
                    let what = format!("inline rules for `{block}`");
                    SubRules::Rules(RuleSet::compile(&what, &rules, ci)?)
                }
            });
        }

        let mut run_in: [Vec<BlockKind>; BlockKind::COUNT] = Default::default();
        for (block, allowed) in self.run_in {
            run_in[block.index()].extend(allowed);
        }

        let mut markers: [Option<Regex>; BlockKind::COUNT] = Default::default();
        for (block, pattern) in self.markers {
            if matches!(sub_rules[block.index()], Some(SubRules::Opaque)) {
                return Err(RuleError::OpaqueMarker(block));
            }
            let slot = &mut markers[block.index()];
            if slot.is_some() {
                return Err(RuleError::DuplicateRule(format!("{block} marker")));
            }
            let re = compile(&format!("{block} marker"), &pattern, ci)?;
            if re.captures_len() != 3 {
                return Err(RuleError::InvalidMarker(block));
            }
            *slot = Some(re);
        }

        let mut silent = [false; BlockKind::COUNT];
        for block in self.silent {
            silent[block.index()] = true;
        }

        Ok(RuleTable {
            blocks,
            inline,
            sub_rules,
            run_in,
            markers,
            silent,
        })
    }
}

fn compile(rule: &str, pattern: &str, case_insensitive: bool) -> Result<Regex, RuleError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| RuleError::InvalidPattern {
            rule: rule.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn minimal() -> RuleTableBuilder {
        RuleTable::builder()
            .block(BlockKind::Empty, r"(?:[ \t]*\n)+")
            .block(BlockKind::Paragraph, r"[\s\S]*?(?:\n|$)")
            .inline(InlineKind::Bold, r"\*\*[^*]+\*\*")
    }

    #[test]
    fn minimal_table_builds() {
        let table = minimal().build().unwrap();
        assert_eq!(table.catch_all(), BlockKind::Paragraph);
        assert_eq!(table.classify("\n\n"), BlockKind::Empty);
        assert_eq!(table.classify("text\n"), BlockKind::Paragraph);
    }

    #[test]
    fn missing_catch_all_is_rejected() {
        let err = RuleTable::builder()
            .block(BlockKind::Header, r"#{1,6} [^\n]*")
            .inline(InlineKind::Bold, r"\*\*[^*]+\*\*")
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::MissingCatchAll(BlockKind::Header)));
    }

    #[test]
    fn catch_all_must_be_last() {
        let err = RuleTable::builder()
            .block(BlockKind::Paragraph, r"[\s\S]*?(?:\n|$)")
            .block(BlockKind::Empty, r"(?:[ \t]*\n)+")
            .inline(InlineKind::Bold, r"\*\*[^*]+\*\*")
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::MissingCatchAll(BlockKind::Empty)));
    }

    #[rstest]
    #[case::no_blocks(RuleTable::builder().inline(InlineKind::Bold, "x"))]
    #[case::no_inline(RuleTable::builder().block(BlockKind::Paragraph, r"[\s\S]*?(?:\n|$)"))]
    fn empty_rule_sets_are_rejected(#[case] builder: RuleTableBuilder) {
        assert!(matches!(builder.build(), Err(RuleError::EmptyRuleSet(_))));
    }

    #[test]
    fn invalid_pattern_names_the_rule() {
        let err = minimal()
            .inline(InlineKind::Code, r"`(unclosed")
            .build()
            .unwrap_err();
        match err {
            RuleError::InvalidPattern { rule, .. } => assert_eq!(rule, "code"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_block_rule_is_rejected() {
        let err = minimal()
            .block(BlockKind::Empty, r"\n")
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::DuplicateRule(_)));
    }

    #[test]
    fn marker_needs_two_groups() {
        let err = minimal()
            .marker(BlockKind::Paragraph, r"^(>)[\s\S]*$")
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::InvalidMarker(BlockKind::Paragraph)));
    }

    #[test]
    fn marker_on_opaque_block_is_ambiguous() {
        let err = minimal()
            .opaque(BlockKind::Paragraph)
            .marker(BlockKind::Paragraph, r"^(>)([\s\S]*)$")
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::OpaqueMarker(BlockKind::Paragraph)));
    }

    #[test]
    fn case_insensitive_flag_applies_to_every_pattern() {
        let table = minimal()
            .inline(InlineKind::Keyword, r"\\begin")
            .case_insensitive(true)
            .build()
            .unwrap();
        let paragraph = BlockType::block(BlockKind::Paragraph);
        assert_eq!(
            table.identify_inline(paragraph, r"\BEGIN"),
            Some(InlineKind::Keyword)
        );
    }

    #[test]
    fn opaque_blocks_have_no_inline_rules() {
        let table = minimal().opaque(BlockKind::Empty).build().unwrap();
        assert!(table.inline_rules_for(BlockKind::Empty).is_none());
        assert_eq!(
            table.identify_inline(BlockType::block(BlockKind::Empty), "**x**"),
            None
        );
        assert_eq!(
            table.identify_inline(BlockType::block(BlockKind::Paragraph), "**x**"),
            Some(InlineKind::Bold)
        );
    }
}
