use markdown_mirror_engine::render::{RenderedNode, reconcile};
use markdown_mirror_engine::rules::{RuleOptions, RuleTable};
use markdown_mirror_engine::lexer::split_keeping_matches;
use markdown_mirror_engine::{Lexer, normalize_input, tokenize};
use proptest::prelude::*;

/// Text built from the characters the rules care about, plus a couple of
/// multi-byte ones.
fn markdownish() -> impl Strategy<Value = String> {
    proptest::string::string_regex(r"[a-c0-9 #*_`~$>\-\[\]()^%&{}|=.\\\n\r\téя]{0,160}")
        .expect("valid strategy regex")
}

fn concat(text: &str) -> String {
    tokenize(text).into_iter().map(|t| t.text).collect()
}

proptest! {
    #[test]
    fn tokens_cover_the_normalized_input(text in markdownish()) {
        prop_assert_eq!(concat(&text), normalize_input(&text).into_owned());
    }

    #[test]
    fn plain_input_round_trips_exactly(text in markdownish()) {
        let text = text.replace('\r', "");
        let text = text.trim_end_matches('\n');
        prop_assert_eq!(concat(text), text);
    }

    #[test]
    fn case_insensitive_rules_cover_the_input(text in markdownish()) {
        let rules = RuleTable::markdown(&RuleOptions { case_insensitive: true })
            .expect("markdown rules compile");
        let joined: String = Lexer::new(&rules).tokenize(&text).into_iter().map(|t| t.text).collect();
        prop_assert_eq!(joined, normalize_input(&text).into_owned());
    }

    #[test]
    fn no_token_is_empty(text in markdownish()) {
        prop_assert!(tokenize(&text).iter().all(|t| !t.text.is_empty()));
    }

    #[test]
    fn line_deltas_never_exceed_line_breaks(text in markdownish()) {
        let normalized = normalize_input(&text);
        let breaks = normalized.matches('\n').count() as u64;
        let total: u64 = tokenize(&text).iter().map(|t| u64::from(t.line)).sum();
        prop_assert!(total <= breaks);
    }

    #[test]
    fn reconcile_mirrors_the_new_tokens(old in markdownish(), new in markdownish()) {
        let mut nodes: Vec<RenderedNode> = Vec::new();
        reconcile(&mut nodes, &tokenize(&old));

        let tokens = tokenize(&new);
        reconcile(&mut nodes, &tokens);
        prop_assert_eq!(nodes.len(), tokens.len());
        for (node, token) in nodes.iter().zip(&tokens) {
            prop_assert_eq!(&node.text, &token.text);
            prop_assert_eq!(node.block, token.block);
            if let Some(anchor) = node.anchor {
                prop_assert_eq!(anchor, token.line);
            }
        }

        let again = reconcile(&mut nodes, &tokens);
        prop_assert!(again.is_noop(), "{:?}", again);
    }

    #[test]
    fn some_block_rule_matches_every_fragment(text in markdownish(), case_insensitive in any::<bool>()) {
        let rules = RuleTable::markdown(&RuleOptions { case_insensitive })
            .expect("markdown rules compile");
        let text = normalize_input(&text);
        for fragment in split_keeping_matches(rules.blocks().splitter(), &text) {
            if fragment.is_empty() {
                continue;
            }
            prop_assert!(
                rules.blocks().identify(fragment).is_some(),
                "no block rule matches {:?}",
                fragment
            );
        }
    }
}
