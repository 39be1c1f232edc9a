//! Transition tables: one row per state, one column per symbol.

use std::fmt;

use crate::automaton::{Automaton, State, Symbol};
use crate::wire::Transitions;
use crate::{Error, Result};

/// Marker for a missing transition.
pub const NO_TRANSITION: &str = "-";

/// A header row (`State`, then the symbols) followed by one row per state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    rows: Vec<Vec<String>>,
}

impl TransitionTable {
    /// Lays out `automaton` with states and symbols in sorted order.
    pub fn from_automaton<S: State, A: Symbol>(automaton: &Automaton<S, A>) -> Self {
        let alphabet = automaton.sorted_alphabet();
        let mut header = vec!["State".to_string()];
        header.extend(alphabet.iter().map(ToString::to_string));

        let mut rows = vec![header];
        for state in automaton.sorted_states() {
            let mut row = vec![state.to_string()];
            row.extend(alphabet.iter().map(|symbol| {
                automaton
                    .transition(state, symbol)
                    .map_or_else(|| NO_TRANSITION.to_string(), ToString::to_string)
            }));
            rows.push(row);
        }
        TransitionTable { rows }
    }

    /// Wraps raw rows, checking that every row is as wide as the header.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self> {
        let Some(header) = rows.first() else {
            return Err(Error::EmptyTable);
        };
        // a header needs at least the state column
        if rows.len() < 2 || header.is_empty() {
            return Err(Error::EmptyTable);
        }
        let width = header.len();
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            let state = row.first().cloned().unwrap_or_default();
            return Err(Error::RaggedTable(state, row.len(), width));
        }
        Ok(TransitionTable { rows })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn symbols(&self) -> &[String] {
        &self.rows[0][1..]
    }

    /// Reads the transitions back; `-` and empty cells mean no transition.
    pub fn to_transitions(&self) -> Transitions {
        let symbols = self.symbols();
        let mut triples = Vec::new();
        for row in &self.rows[1..] {
            let state = &row[0];
            for (symbol, next_state) in symbols.iter().zip(&row[1..]) {
                if next_state == NO_TRANSITION || next_state.is_empty() {
                    continue;
                }
                triples.push(vec![state.clone(), symbol.clone(), next_state.clone()]);
            }
        }
        Transitions::List(triples)
    }
}

impl fmt::Display for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.rows[0].len();
        let widths: Vec<usize> = (0..columns)
            .map(|column| {
                self.rows
                    .iter()
                    .map(|row| row[column].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect();
            writeln!(f, "{}", cells.join(" | ").trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::tests::ends_with_01;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn table_of_a_complete_automaton() {
        let table = TransitionTable::from_automaton(&ends_with_01());
        assert_eq!(
            table.rows(),
            [
                row(&["State", "0", "1"]),
                row(&["q0", "q1", "q0"]),
                row(&["q1", "q1", "q2"]),
                row(&["q2", "q1", "q0"]),
            ]
        );
        assert_eq!(
            table.to_string(),
            "State | 0  | 1\nq0    | q1 | q0\nq1    | q1 | q2\nq2    | q1 | q0\n"
        );
    }

    #[test]
    fn missing_transitions_render_as_dashes() {
        let dfa = Automaton::new(
            ["a".to_string(), "b".to_string()],
            ['x', 'y'],
            [(("a".to_string(), 'y'), "b".to_string())],
            "a".to_string(),
            ["b".to_string()],
        )
        .unwrap();
        let table = TransitionTable::from_automaton(&dfa);
        assert_eq!(table.rows()[1], row(&["a", "-", "b"]));
        assert_eq!(table.rows()[2], row(&["b", "-", "-"]));
    }

    #[test]
    fn rows_parse_back_into_transitions() {
        let table = TransitionTable::from_rows(vec![
            row(&["State", "0", "1"]),
            row(&["q0", "q1", "-"]),
            row(&["q1", "", "q0"]),
        ])
        .unwrap();
        assert_eq!(
            table.to_transitions(),
            Transitions::List(vec![row(&["q0", "0", "q1"]), row(&["q1", "1", "q0"])])
        );
    }

    #[test]
    fn tables_without_symbols_have_no_transitions() {
        let table = TransitionTable::from_rows(vec![row(&["State"]), row(&["q0"])]).unwrap();
        assert!(table.symbols().is_empty());
        assert_eq!(table.to_transitions(), Transitions::List(vec![]));
    }

    #[test]
    fn round_trip_through_a_table() {
        let dfa = ends_with_01();
        let table = TransitionTable::from_automaton(&dfa);
        let rebuilt = TransitionTable::from_rows(table.rows().to_vec()).unwrap();
        let triples = rebuilt.to_transitions().to_triples().unwrap();
        assert_eq!(triples.len(), dfa.num_transitions());
    }

    #[test]
    fn tables_need_a_header_and_a_row() {
        assert!(matches!(TransitionTable::from_rows(vec![]), Err(Error::EmptyTable)));
        assert!(matches!(
            TransitionTable::from_rows(vec![row(&["State", "0"])]),
            Err(Error::EmptyTable)
        ));
        assert!(matches!(
            TransitionTable::from_rows(vec![vec![], vec![]]),
            Err(Error::EmptyTable)
        ));
        assert!(matches!(
            TransitionTable::from_rows(vec![row(&["State", "0"]), row(&["q0"])]),
            Err(Error::RaggedTable(state, 1, 2)) if state == "q0"
        ));
    }
}
