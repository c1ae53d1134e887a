//! The saturation parser.
//!
//! - Select the subset of rules plausible for the input (bucket gating, see
//!   `trigger.rs`).
//! - Repeatedly apply those rules to grow a `Stash` of `Node`s until a
//!   fixpoint is reached.
//! - Deduplicate produced nodes to keep saturation finite and deterministic.
//! - Select final top-level nodes by dropping spans contained in larger
//!   matches (longest match wins, rule priority breaks ties).
//!
//! ## Key concepts
//!
//! - **Rule** (`crate::Rule`): a sequence of `Pattern`s with a production.
//! - **Node** (`crate::Node`): a matched token with a span and a `Token`.
//! - **Stash** (`crate::Stash`): the growing set of discovered nodes.
//! - **Saturation**: apply rules until an iteration produces no new nodes.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::engine::TriggerInfo;
use crate::{Dimension, Node, Pattern, Rule, Span, Stash, Token, TokenKind};

/// A partially matched rule as the engine advances through its pattern.
/// `route` holds the matched `Node`s so far; `position` points at the end of
/// the last consumed node.
struct PartialMatch<'a> {
    rule: &'a Rule,
    next_idx: usize,
    position: usize,
    route: Vec<Node>,
}

/// Stable key used to avoid re-adding equivalent nodes during saturation.
/// Includes the producing rule so distinct derivations of the same span are
/// not collapsed before selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NodeKey {
    start: usize,
    end: usize,
    dim: Dimension,
    rule_name: &'static str,
    kind_key: String,
}

impl NodeKey {
    fn from_node(node: &Node) -> Self {
        let kind_key = match &node.token.kind {
            TokenKind::Number(n) => n.value.to_string(),
            TokenKind::Phrase(p) => format!("{p:?}"),
            TokenKind::RegexMatch(groups) => {
                groups.first().cloned().flatten().unwrap_or_default()
            }
        };
        NodeKey {
            start: node.span.start,
            end: node.span.end,
            dim: node.token.dim,
            rule_name: node.rule_name,
            kind_key,
        }
    }
}

/// Parser orchestrates applying `Rule`s against an input string.
///
/// Usage: create with `Parser::new(input, &rules)`, call
/// [`Parser::saturate`], then read top-level nodes from [`Parser::select`].
/// The ruleset is injected by the caller and only borrowed; the parser holds
/// no global state.
#[derive(Debug)]
pub(crate) struct Parser<'a> {
    /// Input text to parse.
    input: &'a str,
    /// Stash of discovered nodes (intermediate parse results).
    stash: Stash,
    /// Set of seen node keys used to avoid re-adding identical nodes.
    seen: HashSet<NodeKey>,
    /// Active rules that start with a `Regex` pattern.
    regex_rules: Vec<&'a Rule>,
    /// Active rules that start with a `Predicate` pattern.
    predicate_rules: Vec<&'a Rule>,
    /// Priority by rule name, for selection tie-breaking.
    priorities: HashMap<&'static str, u16>,
}

impl<'a> Parser<'a> {
    /// Create a new `Parser` for `input` using `rules`.
    ///
    /// Two separate vectors are built for rules that start with a regex vs. a
    /// predicate. This lets [`Parser::saturate`] bias the first pass toward
    /// cheap positional regex matches, then follow up with predicate-driven
    /// matches that rely on previously discovered nodes.
    pub fn new(input: &'a str, rules: &'a [Rule]) -> Self {
        let trigger = TriggerInfo::scan(input);
        debug!(buckets = ?trigger.buckets, "trigger scan");

        let active: Vec<&Rule> = rules
            .iter()
            .filter(|r| (trigger.buckets.bits() & r.buckets) == r.buckets)
            .collect();
        debug!(active = active.len(), total = rules.len(), "rule activation");

        let regex_rules = active
            .iter()
            .copied()
            .filter(|r| matches!(r.pattern.first(), Some(Pattern::Regex(_))))
            .collect();
        let predicate_rules = active
            .iter()
            .copied()
            .filter(|r| matches!(r.pattern.first(), Some(Pattern::Predicate(_))))
            .collect();
        let priorities = rules.iter().map(|r| (r.name, r.priority)).collect();

        Parser {
            input,
            stash: Stash::empty(),
            seen: HashSet::new(),
            regex_rules,
            predicate_rules,
            priorities,
        }
    }

    /// Find nodes that match `pat` and start exactly at `position`.
    fn lookup_item(&self, pat: &Pattern, position: usize) -> Vec<Node> {
        match pat {
            Pattern::Regex(re) => {
                let mut res = Vec::new();
                for caps in re.captures_iter(self.input) {
                    let m = caps.get(0).unwrap();
                    if m.start() == position {
                        let groups: Vec<Option<String>> = (0..caps.len())
                            .map(|i| caps.get(i).map(|g| g.as_str().to_lowercase()))
                            .collect();
                        res.push(Node {
                            span: Span { start: m.start(), end: m.end() },
                            token: Token {
                                dim: Dimension::RegexMatch,
                                kind: TokenKind::RegexMatch(groups),
                            },
                            rule_name: "<regex>",
                        });
                    }
                }
                res
            }
            Pattern::Predicate(pred) => self
                .stash
                .to_pos_ordered_list()
                .into_iter()
                .filter(|n| n.span.start == position && pred(&n.token))
                .collect(),
        }
    }

    /// Find nodes that match `pat` anywhere in the input. Used to seed
    /// partial matches for a rule's first pattern.
    fn lookup_item_anywhere(&self, pat: &Pattern) -> Vec<Node> {
        match pat {
            Pattern::Regex(re) => {
                let mut res = Vec::new();
                for caps in re.captures_iter(self.input) {
                    let m = caps.get(0).unwrap();
                    let groups: Vec<Option<String>> = (0..caps.len())
                        .map(|i| caps.get(i).map(|g| g.as_str().to_lowercase()))
                        .collect();
                    res.push(Node {
                        span: Span { start: m.start(), end: m.end() },
                        token: Token {
                            dim: Dimension::RegexMatch,
                            kind: TokenKind::RegexMatch(groups),
                        },
                        rule_name: "<regex>",
                    });
                }
                res
            }
            Pattern::Predicate(pred) => {
                self.stash.to_pos_ordered_list().into_iter().filter(|n| pred(&n.token)).collect()
            }
        }
    }

    /// Match a rule's first pattern anywhere and return an initial
    /// `PartialMatch` for each hit.
    fn seed_first_pattern_anywhere(&self, rule: &'a Rule) -> Vec<PartialMatch<'a>> {
        let Some(first) = rule.pattern.first() else {
            return Vec::new();
        };
        self.lookup_item_anywhere(first)
            .into_iter()
            .map(|node| PartialMatch { rule, next_idx: 1, position: node.span.end, route: vec![node] })
            .collect()
    }

    /// Depth-first expansion of `PartialMatch`es until the entire rule
    /// pattern is satisfied.
    fn match_all(&self, input_matches: Vec<PartialMatch<'a>>) -> Vec<PartialMatch<'a>> {
        let mut results = Vec::new();
        let mut stack: Vec<PartialMatch<'a>> = input_matches;

        while let Some(m) = stack.pop() {
            if m.next_idx >= m.rule.pattern.len() {
                results.push(m);
                continue;
            }

            let pat = &m.rule.pattern[m.next_idx];
            for node in self.lookup_item(pat, m.position).into_iter().rev() {
                let mut new_route = m.route.clone();
                let position = node.span.end;
                new_route.push(node);
                stack.push(PartialMatch {
                    rule: m.rule,
                    next_idx: m.next_idx + 1,
                    position,
                    route: new_route,
                });
            }
        }

        results
    }

    /// Convert a completed `PartialMatch` into a `Node` by invoking the
    /// rule's production callback.
    fn produce_node(&self, m: &PartialMatch) -> Option<Node> {
        if m.next_idx < m.rule.pattern.len() {
            return None;
        }
        let tokens: Vec<Token> = m.route.iter().map(|n| n.token.clone()).collect();
        let tok = (m.rule.production)(&tokens)?;
        let (first, last) = (m.route.first()?, m.route.last()?);

        debug!(
            rule = m.rule.name,
            span = ?(first.span.start, last.span.end),
            text = &self.input[first.span.start..last.span.end.min(self.input.len())],
            "production"
        );
        Some(Node {
            span: Span { start: first.span.start, end: last.span.end },
            token: tok,
            rule_name: m.rule.name,
        })
    }

    /// Apply an ordered set of rules once and return the nodes produced.
    fn apply_rules_once(&self, rule_set: &[&Rule]) -> Vec<Node> {
        let mut discovered = Vec::new();
        for rule in rule_set {
            let starts = self.seed_first_pattern_anywhere(rule);
            for m in self.match_all(starts) {
                if let Some(node) = self.produce_node(&m) {
                    discovered.push(node);
                }
            }
        }
        discovered
    }

    /// Fold freshly discovered nodes into the stash; returns how many were new.
    fn admit(&mut self, discovered: Vec<Node>) -> usize {
        let mut fresh = Stash::empty();
        let mut produced = 0;
        for node in discovered {
            let key = NodeKey::from_node(&node);
            if self.seen.insert(key) {
                fresh.insert(node);
                produced += 1;
            }
        }
        if !fresh.null() {
            self.stash.absorb(fresh);
        }
        produced
    }

    /// Saturate the stash by repeatedly applying rules until a fixpoint.
    ///
    /// ```text
    /// regex_rules pass
    ///      │
    ///      ▼
    ///  stash grows ──┐
    ///                │ predicate + regex passes
    ///                └── repeat until fixed point
    /// ```
    pub fn saturate(&mut self) {
        // Initial regex-first pass seeds the stash from the raw input.
        let discovered = self.apply_rules_once(&self.regex_rules);
        if self.admit(discovered) == 0 {
            return;
        }

        let mut all_rules: Vec<&Rule> = Vec::new();
        all_rules.extend(self.predicate_rules.iter().copied());
        all_rules.extend(self.regex_rules.iter().copied());

        let mut pass = 0usize;
        loop {
            pass += 1;
            let discovered = self.apply_rules_once(&all_rules);
            let produced = self.admit(discovered);
            debug!(pass, produced, "saturation pass");
            if produced == 0 {
                break;
            }
        }
    }

    /// Select final top-level nodes: semantic phrases only, sorted by
    /// position, dropping any span contained in (or equal to) an already
    /// kept one. Higher rule priority wins between equal spans.
    pub fn select(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = self
            .stash
            .get_nodes()
            .iter()
            .filter(|n| n.token.dim == Dimension::Phrase)
            .cloned()
            .collect();

        nodes.sort_by(|a, b| {
            let pa = self.priorities.get(a.rule_name).copied().unwrap_or(0);
            let pb = self.priorities.get(b.rule_name).copied().unwrap_or(0);
            a.span
                .start
                .cmp(&b.span.start)
                .then(b.span.end.cmp(&a.span.end))
                .then(pb.cmp(&pa))
        });

        let mut kept: Vec<Node> = Vec::new();
        for node in nodes {
            let subsumed = kept
                .iter()
                .any(|k| k.span.start <= node.span.start && k.span.end >= node.span.end);
            if !subsumed {
                kept.push(node);
            }
        }
        kept
    }
}
