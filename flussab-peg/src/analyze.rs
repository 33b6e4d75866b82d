//! Static well-formedness check for grammars.
//!
//! A PEG rule that can reach itself again without consuming any input in between recurses
//! without bound when matched. Similarly, repeating a rule that can succeed without consuming
//! input never terminates. Both problems are properties of the grammar alone, so they can be
//! detected without matching any input using [`analyze`].
use std::{any::TypeId, fmt};

use zwohash::{HashMap, HashSet};

use crate::Rule;

/// Identity of a rule.
pub type RuleId = TypeId;

/// How a rule consumes input, in terms of the rules it refers to.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Kind {
    /// Consumes input whenever it succeeds.
    Consume,
    /// May succeed without consuming input.
    Opt,
    /// Matches its sub-rules in order, consuming input iff any of them does.
    Seq,
    /// Matches one of its sub-rules, consuming input iff all of them do.
    Sor,
}

struct Node {
    name: &'static str,
    kind: Kind,
    children: Vec<RuleId>,
    // Number of leading children that only end a repetition, `None` for non-repeating rules.
    repeats_after: Option<usize>,
}

/// A problem found by [`analyze`].
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Issue {
    /// Name of the offending rule.
    pub rule: &'static str,
    /// The kind of problem.
    pub kind: IssueKind,
}

/// The kinds of [`Issue`]s.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum IssueKind {
    /// The rule can reach itself without consuming input.
    LeftRecursion,
    /// The rule repeats a rule that can succeed without consuming input.
    EmptyLoop,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::LeftRecursion => write!(
                f,
                "rule {} can recurse into itself without consuming input",
                self.rule
            ),
            IssueKind::EmptyLoop => write!(
                f,
                "rule {} repeats a rule that can succeed without consuming input",
                self.rule
            ),
        }
    }
}

/// The composition graph of a grammar, built by [`Rule::describe`].
#[derive(Default)]
pub struct Analysis {
    nodes: HashMap<RuleId, Node>,
    order: Vec<RuleId>,
}

impl Analysis {
    /// Registers a rule without sub-rules.
    pub fn leaf<R: Rule>(&mut self, kind: Kind) -> RuleId {
        self.insert::<R>(kind, None, |_| vec![])
    }

    /// Registers a rule and, if not registered before, its sub-rules.
    pub fn node<R: Rule>(
        &mut self,
        kind: Kind,
        children: impl FnOnce(&mut Self) -> Vec<RuleId>,
    ) -> RuleId {
        self.insert::<R>(kind, None, children)
    }

    /// Registers a rule that repeats its sub-rules without an upper bound.
    ///
    /// The first `lookahead` sub-rules are only used to end the repetition, the remaining ones
    /// are the repeated sequence.
    pub fn repetition<R: Rule>(
        &mut self,
        kind: Kind,
        lookahead: usize,
        children: impl FnOnce(&mut Self) -> Vec<RuleId>,
    ) -> RuleId {
        self.insert::<R>(kind, Some(lookahead), children)
    }

    /// Registers the named rule `R` with the body `B`.
    pub fn named<R: Rule, B: Rule>(&mut self) -> RuleId {
        self.node::<R>(Kind::Seq, |analysis| vec![B::describe(analysis)])
    }

    fn insert<R: Rule>(
        &mut self,
        kind: Kind,
        repeats_after: Option<usize>,
        children: impl FnOnce(&mut Self) -> Vec<RuleId>,
    ) -> RuleId {
        let id = TypeId::of::<R>();
        if self.nodes.contains_key(&id) {
            return id;
        }
        // Insert before visiting the sub-rules, so recursive references terminate.
        self.nodes.insert(
            id,
            Node {
                name: R::name(),
                kind,
                children: vec![],
                repeats_after,
            },
        );
        self.order.push(id);
        let children = children(self);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children;
        }
        id
    }

    /// Number of distinct rules registered.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Computes the rules that can succeed without consuming input.
    fn nullable(&self) -> HashSet<RuleId> {
        let mut nullable = <HashSet<RuleId>>::default();
        loop {
            let mut changed = false;
            for id in &self.order {
                if nullable.contains(id) {
                    continue;
                }
                let node = &self.nodes[id];
                let is_nullable = match node.kind {
                    Kind::Consume => false,
                    Kind::Opt => true,
                    Kind::Seq => node.children.iter().all(|child| nullable.contains(child)),
                    Kind::Sor => node.children.iter().any(|child| nullable.contains(child)),
                };
                if is_nullable {
                    nullable.insert(*id);
                    changed = true;
                }
            }
            if !changed {
                return nullable;
            }
        }
    }

    /// Sub-rules that can be reached from `node` before any input is consumed.
    fn leading<'a>(
        node: &'a Node,
        nullable: &'a HashSet<RuleId>,
    ) -> impl Iterator<Item = RuleId> + 'a {
        let len = match node.kind {
            Kind::Opt | Kind::Sor => node.children.len(),
            Kind::Seq | Kind::Consume => node
                .children
                .iter()
                .position(|child| !nullable.contains(child))
                .map_or(node.children.len(), |pos| pos + 1),
        };
        node.children[..len].iter().copied()
    }

    fn reaches_itself(&self, start: RuleId, nullable: &HashSet<RuleId>) -> bool {
        let mut seen = <HashSet<RuleId>>::default();
        let mut stack: Vec<RuleId> = Self::leading(&self.nodes[&start], nullable).collect();
        while let Some(id) = stack.pop() {
            if id == start {
                return true;
            }
            if seen.insert(id) {
                stack.extend(Self::leading(&self.nodes[&id], nullable));
            }
        }
        false
    }

    /// Returns all problems of the registered rules, in registration order.
    pub fn issues(&self) -> Vec<Issue> {
        let nullable = self.nullable();
        let mut issues = vec![];
        for &id in &self.order {
            let node = &self.nodes[&id];
            if self.reaches_itself(id, &nullable) {
                issues.push(Issue {
                    rule: node.name,
                    kind: IssueKind::LeftRecursion,
                });
            }
            if let Some(lookahead) = node.repeats_after {
                let repeated = &node.children[lookahead.min(node.children.len())..];
                if repeated.iter().all(|child| nullable.contains(child)) {
                    issues.push(Issue {
                        rule: node.name,
                        kind: IssueKind::EmptyLoop,
                    });
                }
            }
        }
        issues
    }
}

/// Checks the grammar starting at `R` for rules that can recurse or loop without consuming input.
///
/// Returns an empty vector for a well-formed grammar.
pub fn analyze<R: Rule>() -> Vec<Issue> {
    let mut analysis = Analysis::default();
    R::describe(&mut analysis);
    let issues = analysis.issues();
    for issue in &issues {
        log::debug!("{}", issue);
    }
    issues
}
