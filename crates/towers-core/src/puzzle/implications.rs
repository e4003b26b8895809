//! # Implications Tracker
//!
//! Directed implication graph over triple literals.
//!
//! A literal is a triple together with a polarity: *on* (the triple is
//! asserted) or *off* (the triple is excluded). Four adjacency relations
//! are kept, one per polarity pair. Every inserted edge also inserts its
//! contrapositive, so the graph is always closed under contraposition:
//!
//! | Inserted        | Contrapositive  |
//! |-----------------|-----------------|
//! | `a -> c`        | `!c -> !a`      |
//! | `a -> !c`       | `c -> !a`       |
//! | `!a -> c`       | `!c -> a`       |
//!
//! Only binary implications are represented; this is not a clause store.

use crate::types::Triple;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

type Adjacency = BTreeMap<Triple, BTreeSet<Triple>>;

// =============================================================================
// IMPLICATION KINDS
// =============================================================================

/// The three kinds of implication callers can add.
///
/// `off -> off` is never added directly; it only exists as the
/// contrapositive of an `on -> on` implication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ImplicationKind {
    /// `from` asserted forces `to` asserted.
    OnToOn,
    /// `from` asserted forces `to` excluded.
    OnToOff,
    /// `from` excluded forces `to` asserted.
    OffToOn,
}

/// The full partition forced by one starting literal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    /// Triples forced to be asserted (the start is included when it is on).
    pub set: BTreeSet<Triple>,
    /// Triples forced to be excluded (the start is included when it is off).
    pub excluded: BTreeSet<Triple>,
}

impl Closure {
    /// Whether some triple is forced both ways.
    #[must_use]
    pub fn is_contradictory(&self) -> bool {
        self.set.intersection(&self.excluded).next().is_some()
    }
}

// =============================================================================
// TRACKER
// =============================================================================

/// Implication graph with contrapositive closure.
#[derive(Debug, Clone, Default)]
pub struct ImplicationsTracker {
    on_to_on: Adjacency,
    on_to_off: Adjacency,
    off_to_on: Adjacency,
    off_to_off: Adjacency,
}

impl ImplicationsTracker {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Outgoing set of `from`, inserting an empty set on first use.
    fn outgoing_mut(adjacency: &mut Adjacency, from: Triple) -> &mut BTreeSet<Triple> {
        adjacency.entry(from).or_default()
    }

    fn outgoing(adjacency: &Adjacency, from: Triple) -> impl Iterator<Item = Triple> + '_ {
        adjacency.get(&from).into_iter().flatten().copied()
    }

    fn insert_edge(adjacency: &mut Adjacency, from: Triple, to: Triple) -> bool {
        Self::outgoing_mut(adjacency, from).insert(to)
    }

    fn remove_edge(adjacency: &mut Adjacency, from: Triple, to: Triple) -> bool {
        let Some(targets) = adjacency.get_mut(&from) else {
            return false;
        };
        let removed = targets.remove(&to);
        if targets.is_empty() {
            adjacency.remove(&from);
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Insertion
    // -------------------------------------------------------------------------

    /// `antecedent` asserted forces `consequent` asserted.
    ///
    /// Also inserts `!consequent -> !antecedent`. Returns whether the
    /// implication is new.
    pub fn add_implication(&mut self, antecedent: Triple, consequent: Triple) -> bool {
        let new = Self::insert_edge(&mut self.on_to_on, antecedent, consequent);
        let contra = Self::insert_edge(&mut self.off_to_off, consequent, antecedent);
        new || contra
    }

    /// `antecedent` asserted forces `consequent` excluded.
    ///
    /// Also inserts `consequent -> !antecedent`.
    pub fn add_on_to_off_implication(&mut self, antecedent: Triple, consequent: Triple) -> bool {
        let new = Self::insert_edge(&mut self.on_to_off, antecedent, consequent);
        let contra = Self::insert_edge(&mut self.on_to_off, consequent, antecedent);
        new || contra
    }

    /// `antecedent` excluded forces `consequent` asserted.
    ///
    /// Also inserts `!consequent -> antecedent`.
    pub fn add_off_to_on_implication(&mut self, antecedent: Triple, consequent: Triple) -> bool {
        let new = Self::insert_edge(&mut self.off_to_on, antecedent, consequent);
        let contra = Self::insert_edge(&mut self.off_to_on, consequent, antecedent);
        new || contra
    }

    /// Insert an implication of the given kind.
    pub fn add(&mut self, kind: ImplicationKind, from: Triple, to: Triple) -> bool {
        match kind {
            ImplicationKind::OnToOn => self.add_implication(from, to),
            ImplicationKind::OnToOff => self.add_on_to_off_implication(from, to),
            ImplicationKind::OffToOn => self.add_off_to_on_implication(from, to),
        }
    }

    /// Remove an implication of the given kind together with its
    /// contrapositive. Returns whether anything was removed.
    pub fn remove(&mut self, kind: ImplicationKind, from: Triple, to: Triple) -> bool {
        let (forward, contra) = match kind {
            ImplicationKind::OnToOn => (
                Self::remove_edge(&mut self.on_to_on, from, to),
                Self::remove_edge(&mut self.off_to_off, to, from),
            ),
            ImplicationKind::OnToOff => (
                Self::remove_edge(&mut self.on_to_off, from, to),
                Self::remove_edge(&mut self.on_to_off, to, from),
            ),
            ImplicationKind::OffToOn => (
                Self::remove_edge(&mut self.off_to_on, from, to),
                Self::remove_edge(&mut self.off_to_on, to, from),
            ),
        };
        forward || contra
    }

    /// Whether the implication (not its contrapositive) is present.
    #[must_use]
    pub fn contains(&self, kind: ImplicationKind, from: Triple, to: Triple) -> bool {
        let adjacency = match kind {
            ImplicationKind::OnToOn => &self.on_to_on,
            ImplicationKind::OnToOff => &self.on_to_off,
            ImplicationKind::OffToOn => &self.off_to_on,
        };
        adjacency.get(&from).is_some_and(|targets| targets.contains(&to))
    }

    /// Total number of directed edges across all four relations.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        [
            &self.on_to_on,
            &self.on_to_off,
            &self.off_to_on,
            &self.off_to_off,
        ]
        .iter()
        .map(|adjacency| adjacency.values().map(BTreeSet::len).sum::<usize>())
        .sum()
    }

    /// Whether there are no implications at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }

    /// Every directed edge as `(relation, from, to)`, for snapshots.
    #[must_use]
    pub fn edges(&self) -> Vec<(&'static str, Triple, Triple)> {
        let mut edges = Vec::new();
        for (name, adjacency) in [
            ("on->on", &self.on_to_on),
            ("on->off", &self.on_to_off),
            ("off->on", &self.off_to_on),
            ("off->off", &self.off_to_off),
        ] {
            for (from, targets) in adjacency {
                for to in targets {
                    edges.push((name, *from, *to));
                }
            }
        }
        edges
    }

    // -------------------------------------------------------------------------
    // Closure
    // -------------------------------------------------------------------------

    /// Everything forced by asserting `node`.
    #[must_use]
    pub fn implications_from_node_set(&self, node: Triple) -> Closure {
        self.closure(vec![node], Vec::new())
    }

    /// Everything forced by excluding `node`.
    #[must_use]
    pub fn implications_from_node_removal(&self, node: Triple) -> Closure {
        self.closure(Vec::new(), vec![node])
    }

    /// Whether asserting `node` forces some triple both ways.
    #[must_use]
    pub fn implies_contradiction(&self, node: Triple) -> bool {
        self.implications_from_node_set(node).is_contradictory()
    }

    /// Whether excluding `node` forces some triple both ways.
    #[must_use]
    pub fn removal_implies_contradiction(&self, node: Triple) -> bool {
        self.implications_from_node_removal(node).is_contradictory()
    }

    /// Breadth-first fixed point, one layer of on-literals and one layer of
    /// off-literals at a time.
    fn closure(&self, mut on_frontier: Vec<Triple>, mut off_frontier: Vec<Triple>) -> Closure {
        let mut closure = Closure {
            set: on_frontier.iter().copied().collect(),
            excluded: off_frontier.iter().copied().collect(),
        };

        while !on_frontier.is_empty() || !off_frontier.is_empty() {
            let mut next_on = Vec::new();
            let mut next_off = Vec::new();

            for &literal in &on_frontier {
                for target in Self::outgoing(&self.on_to_on, literal) {
                    if closure.set.insert(target) {
                        next_on.push(target);
                    }
                }
                for target in Self::outgoing(&self.on_to_off, literal) {
                    if closure.excluded.insert(target) {
                        next_off.push(target);
                    }
                }
            }
            for &literal in &off_frontier {
                for target in Self::outgoing(&self.off_to_on, literal) {
                    if closure.set.insert(target) {
                        next_on.push(target);
                    }
                }
                for target in Self::outgoing(&self.off_to_off, literal) {
                    if closure.excluded.insert(target) {
                        next_off.push(target);
                    }
                }
            }

            on_frontier = next_on;
            off_frontier = next_off;
        }

        closure
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn t(row: usize, col: usize, val: usize) -> Triple {
        Triple::new(row, col, val)
    }

    #[test]
    fn add_implication_inserts_contrapositive() {
        let mut graph = ImplicationsTracker::new();
        assert!(graph.add_implication(t(0, 0, 0), t(1, 1, 1)));
        assert!(!graph.add_implication(t(0, 0, 0), t(1, 1, 1)));

        let removal = graph.implications_from_node_removal(t(1, 1, 1));
        assert!(removal.excluded.contains(&t(0, 0, 0)));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn closure_is_transitive() {
        let mut graph = ImplicationsTracker::new();
        let (a, b, c, d) = (t(0, 0, 0), t(0, 1, 1), t(0, 2, 2), t(0, 3, 3));
        graph.add_implication(a, b);
        graph.add_on_to_off_implication(b, c);
        graph.add_off_to_on_implication(c, d);

        let closure = graph.implications_from_node_set(a);
        assert!(closure.set.contains(&a));
        assert!(closure.set.contains(&b));
        assert!(closure.excluded.contains(&c));
        assert!(closure.set.contains(&d));
        assert!(!closure.is_contradictory());
    }

    #[test]
    fn on_to_off_contrapositive_is_symmetric() {
        let mut graph = ImplicationsTracker::new();
        let (a, b) = (t(0, 0, 0), t(0, 1, 0));
        graph.add_on_to_off_implication(a, b);

        assert!(graph.implications_from_node_set(b).excluded.contains(&a));
        assert!(graph.contains(ImplicationKind::OnToOff, b, a));
    }

    #[test]
    fn off_to_on_contrapositive() {
        let mut graph = ImplicationsTracker::new();
        let (a, b) = (t(0, 0, 0), t(0, 1, 0));
        graph.add_off_to_on_implication(a, b);

        assert!(graph.implications_from_node_removal(b).set.contains(&a));
    }

    #[test]
    fn detects_contradiction() {
        let mut graph = ImplicationsTracker::new();
        let (a, b) = (t(0, 0, 0), t(1, 1, 1));
        graph.add_implication(a, b);
        graph.add_on_to_off_implication(a, b);

        assert!(graph.implies_contradiction(a));
        assert!(!graph.removal_implies_contradiction(a));
        // Excluding b excludes a (via !b -> !a) and asserts nothing.
        assert!(!graph.removal_implies_contradiction(b));
    }

    #[test]
    fn self_loop_through_removal_is_contradiction() {
        let mut graph = ImplicationsTracker::new();
        let a = t(2, 2, 2);
        // !a -> a
        graph.add_off_to_on_implication(a, a);
        assert!(graph.removal_implies_contradiction(a));
    }

    #[test]
    fn remove_drops_both_directions() {
        let mut graph = ImplicationsTracker::new();
        let (a, b) = (t(0, 0, 0), t(1, 1, 1));
        graph.add(ImplicationKind::OnToOn, a, b);
        assert!(graph.remove(ImplicationKind::OnToOn, a, b));
        assert!(graph.is_empty());
        assert!(!graph.remove(ImplicationKind::OnToOn, a, b));
    }

    #[test]
    fn cycles_terminate() {
        let mut graph = ImplicationsTracker::new();
        let (a, b) = (t(0, 0, 0), t(1, 1, 1));
        graph.add_implication(a, b);
        graph.add_implication(b, a);

        let closure = graph.implications_from_node_set(a);
        assert_eq!(closure.set.len(), 2);
    }
}
