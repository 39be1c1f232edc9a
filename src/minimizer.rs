//! Minimization of an [`Automaton`] by Moore-style partition refinement.
//!
//! States are first split into accepting and non-accepting groups, then every group is split by
//! the groups its transitions lead to until a full pass splits nothing. Each pass reads group
//! membership from the partition as it stood when the pass began.

use rustc_hash::FxHashMap as HashMap;
use tracing::trace;

use crate::automaton::{Automaton, State, Symbol};

/// Per-symbol target groups of one state; `None` where no transition is defined.
type Signature = Vec<Option<usize>>;

#[derive(Debug, Clone, PartialEq)]
struct Partition<S: State> {
    groups: Vec<Vec<S>>,
    // state -> index into `groups`
    group_of: HashMap<S, usize>,
}

impl<S: State> Partition<S> {
    fn new(groups: Vec<Vec<S>>) -> Self {
        let group_of = groups
            .iter()
            .enumerate()
            .flat_map(|(index, group)| group.iter().map(move |state| (state.clone(), index)))
            .collect();
        Self { groups, group_of }
    }

    /// Accepting states first, then the rest; empty groups are dropped.
    fn initial<A: Symbol>(automaton: &Automaton<S, A>) -> Self {
        let (accepting, rejecting): (Vec<S>, Vec<S>) = automaton
            .sorted_states()
            .into_iter()
            .cloned()
            .partition(|state| automaton.is_accept_state(state));
        Self::new(
            [accepting, rejecting]
                .into_iter()
                .filter(|group| !group.is_empty())
                .collect(),
        )
    }

    fn len(&self) -> usize {
        self.groups.len()
    }

    fn group_of(&self, state: &S) -> Option<usize> {
        self.group_of.get(state).copied()
    }

    fn signature<A: Symbol>(
        &self,
        automaton: &Automaton<S, A>,
        state: &S,
        symbols: &[&A],
    ) -> Signature {
        symbols
            .iter()
            .map(|symbol| {
                automaton
                    .transition(state, symbol)
                    .and_then(|next_state| self.group_of(next_state))
            })
            .collect()
    }

    /// Splits every group by signature, keeping the order in which signatures first appear.
    ///
    /// Returns `None` when no group was split, i.e. the partition is stable.
    fn refine<A: Symbol>(&self, automaton: &Automaton<S, A>, symbols: &[&A]) -> Option<Self> {
        let mut groups: Vec<Vec<S>> = Vec::with_capacity(self.len());
        let mut split = false;
        for group in &self.groups {
            if group.len() <= 1 {
                groups.push(group.clone());
                continue;
            }
            let mut slot_of: HashMap<Signature, usize> = HashMap::default();
            let mut refined: Vec<Vec<S>> = Vec::new();
            for state in group {
                let signature = self.signature(automaton, state, symbols);
                let slot = *slot_of.entry(signature).or_insert_with(|| {
                    refined.push(Vec::new());
                    refined.len() - 1
                });
                refined[slot].push(state.clone());
            }
            split |= refined.len() > 1;
            groups.extend(refined);
        }
        split.then(|| Self::new(groups))
    }
}

impl<S: State, A: Symbol> Automaton<S, A> {
    /// Returns the minimal automaton accepting the same language.
    ///
    /// Unreachable states are discarded, never merged. The receiver is left untouched. States of
    /// the result are named by [`State::canonical`] in partition order, unless at most one state
    /// is reachable, in which case the pruned copy is returned as is.
    pub fn minimize(&self) -> Automaton<S, A> {
        let mut reachable = self.clone();
        reachable.remove_unreachable_states();
        if reachable.num_states() <= 1 {
            return reachable;
        }
        let partition = reachable.stable_partition();
        reachable.rebuild(&partition)
    }

    /// Groups of mutually indistinguishable reachable states, in partition order.
    pub fn equivalent_state_groups(&self) -> Vec<Vec<S>> {
        let mut reachable = self.clone();
        reachable.remove_unreachable_states();
        reachable.stable_partition().groups
    }

    fn stable_partition(&self) -> Partition<S> {
        let symbols = self.sorted_alphabet();
        let mut partition = Partition::initial(self);
        let mut passes = 0usize;
        while let Some(refined) = partition.refine(self, &symbols) {
            partition = refined;
            passes += 1;
        }
        trace!(
            states = self.num_states(),
            groups = partition.len(),
            passes,
            "partition refinement converged"
        );
        partition
    }

    /// Collapses every group of `partition` into one state.
    ///
    /// `partition` must cover every state of `self`.
    fn rebuild(&self, partition: &Partition<S>) -> Self {
        let names: Vec<S> = (0..partition.len()).map(S::canonical).collect();
        let name_of = |state: &S| names[partition.group_of[state]].clone();

        let mut transitions: HashMap<S, HashMap<A, S>> = HashMap::default();
        for (state, symbol, next_state) in self.transitions() {
            transitions
                .entry(name_of(state))
                .or_default()
                .entry(symbol.clone())
                .or_insert_with(|| name_of(next_state));
        }

        Automaton::from_parts(
            names.iter().cloned().collect(),
            self.alphabet().clone(),
            transitions,
            name_of(self.start_state()),
            self.accept_states().iter().map(name_of).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::tests::{ends_with_01, with_unreachable_state};

    fn s(name: &str) -> String {
        name.to_string()
    }

    fn edge(from: &str, symbol: char, to: &str) -> ((String, char), String) {
        ((s(from), symbol), s(to))
    }

    /// Every string over `alphabet` of length at most `max_len`, the empty string included.
    fn words(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut all = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..max_len {
            frontier = frontier
                .iter()
                .flat_map(|prefix| {
                    alphabet.iter().map(move |symbol| {
                        let mut word = prefix.clone();
                        word.push(*symbol);
                        word
                    })
                })
                .collect();
            all.extend(frontier.iter().cloned());
        }
        all
    }

    fn assert_same_language(original: &Automaton, minimized: &Automaton, max_len: usize) {
        let mut alphabet: Vec<char> = original.alphabet().iter().copied().collect();
        alphabet.sort();
        for word in words(&alphabet, max_len) {
            assert_eq!(
                original.accepts(word.chars()),
                minimized.accepts(word.chars()),
                "language differs on {word:?}"
            );
        }
    }

    /// Two indistinguishable accepting sinks (q2, q4) and two indistinguishable predecessors
    /// (q1, q3).
    fn redundant() -> Automaton {
        Automaton::new(
            ["q0", "q1", "q2", "q3", "q4"].map(s),
            ['0', '1'],
            [
                edge("q0", '0', "q1"),
                edge("q0", '1', "q0"),
                edge("q1", '0', "q2"),
                edge("q1", '1', "q3"),
                edge("q2", '0', "q2"),
                edge("q2", '1', "q4"),
                edge("q3", '0', "q2"),
                edge("q3", '1', "q3"),
                edge("q4", '0', "q4"),
                edge("q4", '1', "q4"),
            ],
            s("q0"),
            [s("q2"), s("q4")],
        )
        .unwrap()
    }

    #[test]
    fn redundant_states_collapse() {
        let dfa = redundant();
        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 3);
        assert_same_language(&dfa, &minimized, 4);
        assert_eq!(minimized.alphabet(), dfa.alphabet());
        assert!(minimized.is_complete());
    }

    #[test]
    fn redundant_partition_and_names_are_stable() {
        let dfa = redundant();
        assert_eq!(
            dfa.equivalent_state_groups(),
            vec![vec![s("q2"), s("q4")], vec![s("q0")], vec![s("q1"), s("q3")]]
        );
        let minimized = dfa.minimize();
        assert_eq!(minimized.start_state(), "q1");
        assert_eq!(minimized.sorted_accept_states(), vec!["q0"]);
        assert_eq!(
            minimized.format_transitions(),
            vec![
                "δ(q0, 0) = q0",
                "δ(q0, 1) = q0",
                "δ(q1, 0) = q2",
                "δ(q1, 1) = q1",
                "δ(q2, 0) = q0",
                "δ(q2, 1) = q2",
            ]
        );
    }

    #[test]
    fn minimal_automaton_keeps_its_size() {
        let dfa = ends_with_01();
        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 3);
        assert_same_language(&dfa, &minimized, 6);
        assert_eq!(
            dfa.equivalent_state_groups(),
            vec![vec![s("q2")], vec![s("q0")], vec![s("q1")]]
        );
    }

    #[test]
    fn single_state_is_its_own_class() {
        let dfa = Automaton::new(
            [s("q0")],
            ['0', '1'],
            [edge("q0", '0', "q0"), edge("q0", '1', "q0")],
            s("q0"),
            [s("q0")],
        )
        .unwrap();
        let minimized = dfa.minimize();
        assert_eq!(minimized, dfa);
        assert_eq!(minimized.num_states(), 1);
        for word in words(&['0', '1'], 3) {
            assert!(minimized.accepts(word.chars()));
        }
        assert_eq!(dfa.equivalent_state_groups(), vec![vec![s("q0")]]);
    }

    #[test]
    fn unreachable_accept_state_is_dropped() {
        let dfa = with_unreachable_state(true);
        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 3);
        assert_eq!(minimized.accept_states().len(), 1);
        assert_same_language(&dfa, &minimized, 5);

        let grouped: Vec<String> = dfa.equivalent_state_groups().into_iter().flatten().collect();
        assert!(!grouped.contains(&s("q3")));
        assert_eq!(grouped.len(), 3);
    }

    #[test]
    fn minimize_leaves_input_untouched() {
        let dfa = with_unreachable_state(true);
        let before = dfa.clone();
        let _ = dfa.minimize();
        let _ = dfa.equivalent_state_groups();
        assert_eq!(dfa, before);
    }

    #[test]
    fn minimize_is_idempotent() {
        for dfa in [redundant(), ends_with_01(), with_unreachable_state(true)] {
            let once = dfa.minimize();
            let twice = once.minimize();
            assert_eq!(twice.num_states(), once.num_states());
            assert_same_language(&once, &twice, 5);
        }
    }

    #[test]
    fn missing_transitions_count_as_distinguishing() {
        // c accepts and is stuck; b and d accept and keep reading 'x'
        let dfa = Automaton::new(
            ["a", "b", "c", "d"].map(s),
            ['x', 'y'],
            [
                edge("a", 'x', "b"),
                edge("a", 'y', "c"),
                edge("b", 'x', "d"),
                edge("d", 'x', "d"),
            ],
            s("a"),
            ["b", "c", "d"].map(s),
        )
        .unwrap();
        assert_eq!(
            dfa.equivalent_state_groups(),
            vec![vec![s("b"), s("d")], vec![s("c")], vec![s("a")]]
        );
        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 3);
        assert!(!minimized.is_complete());
        assert_same_language(&dfa, &minimized, 5);

        let stuck = Automaton::new(
            ["a", "b", "c"].map(s),
            ['x', 'y'],
            [edge("a", 'x', "b"), edge("a", 'y', "c")],
            s("a"),
            ["b", "c"].map(s),
        )
        .unwrap();
        assert_eq!(
            stuck.equivalent_state_groups(),
            vec![vec![s("b"), s("c")], vec![s("a")]]
        );
        assert_eq!(stuck.minimize().num_states(), 2);
    }

    #[test]
    fn uniform_acceptance_needs_no_split_when_complete() {
        let dfa = Automaton::new(
            ["p", "r"].map(s),
            ['0'],
            [edge("p", '0', "r"), edge("r", '0', "p")],
            s("p"),
            Vec::<String>::new(),
        )
        .unwrap();
        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 1);
        assert!(minimized.accept_states().is_empty());
        assert_eq!(minimized.transition(&s("q0"), &'0'), Some(&s("q0")));
    }

    #[test]
    fn integer_states_are_renumbered() {
        // 1 and 2 are interchangeable
        let dfa: Automaton<u32, char> = Automaton::new(
            [10, 1, 2],
            ['a'],
            [((10, 'a'), 1), ((1, 'a'), 2), ((2, 'a'), 1)],
            10,
            [1, 2],
        )
        .unwrap();
        let minimized = dfa.minimize();
        assert_eq!(minimized.sorted_states(), vec![&0, &1]);
        assert_eq!(minimized.start_state(), &1);
        assert_eq!(minimized.sorted_accept_states(), vec![&0]);
    }
}
