//! Cross-checks the knowledge engine with a SAT solver.
//!
//! Every sentence becomes an exactly-k cardinality constraint over the cells
//! it still mentions. The solver then decides, cell by cell, which
//! values are possible. Anything it finds forced that the engine has not yet
//! marked is deduction the propagation rules missed; an unsatisfiable
//! knowledge base means a false count was fed in.

use crate::cell::Cell;
use crate::knowledge::KnowledgeEngine;
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

/// The possible outcomes of the solver's analysis for a single unresolved cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeducedState {
    ForcedMine,   // All valid solutions require this cell to be a mine.
    ForcedSafe,   // All valid solutions require this cell to be safe.
    Undetermined, // Valid solutions exist for this cell being either a mine or safe.
}

/// Solver verdict for every cell still mentioned by some sentence.
#[derive(Debug, Clone, Default)]
pub struct Audit {
    pub deductions: HashMap<Cell, DeducedState>,
}

impl Audit {
    pub fn forced_mines(&self) -> HashSet<Cell> {
        self.cells_in(DeducedState::ForcedMine)
    }

    pub fn forced_safes(&self) -> HashSet<Cell> {
        self.cells_in(DeducedState::ForcedSafe)
    }

    fn cells_in(&self, wanted: DeducedState) -> HashSet<Cell> {
        self.deductions
            .iter()
            .filter(|&(_, &state)| state == wanted)
            .map(|(&cell, _)| cell)
            .collect()
    }

    /// Forced cells the engine has not marked yet.
    pub fn missed_by(&self, engine: &KnowledgeEngine) -> usize {
        let mines = self
            .forced_mines()
            .into_iter()
            .filter(|cell| !engine.mines().contains(cell))
            .count();
        let safes = self
            .forced_safes()
            .into_iter()
            .filter(|cell| !engine.safes().contains(cell))
            .count();
        mines + safes
    }
}

/// Runs the SAT analysis over the engine's current knowledge base.
pub fn audit(engine: &KnowledgeEngine) -> anyhow::Result<Audit> {
    let mut solver = Solver::new();
    let mut var_map: HashMap<Cell, Var> = HashMap::new();

    // 1. Allocate a SAT variable per unresolved cell.
    for sentence in engine.knowledge().iter().filter(|s| !s.is_empty()) {
        for &cell in sentence.cells() {
            var_map.entry(cell).or_insert_with(|| solver.new_var());
        }
    }

    // 2. Encode every sentence as CNF. An empty sentence with a positive
    // count encodes as the empty clause.
    let mut formula = CnfFormula::new();
    for sentence in engine.knowledge() {
        let lits: Vec<Lit> = sentence
            .cells()
            .iter()
            .sorted()
            .map(|cell| Lit::from_var(var_map[cell], true))
            .collect();
        encode_exactly_k_to_formula(&mut formula, &mut solver, &lits, sentence.count());
    }
    solver.add_formula(&formula);

    // 3. A false count shows up as an unsatisfiable knowledge base.
    if !solver.solve()? {
        anyhow::bail!("knowledge base is inconsistent");
    }

    // 4. Test both values of every variable under assumptions.
    let mut deductions = HashMap::new();
    for (&cell, &var) in &var_map {
        let mine_possible = can_hold(&mut solver, Lit::from_var(var, true))?;
        let safe_possible = can_hold(&mut solver, Lit::from_var(var, false))?;

        let state = match (mine_possible, safe_possible) {
            (true, true) => DeducedState::Undetermined,
            (true, false) => DeducedState::ForcedMine,
            (false, true) => DeducedState::ForcedSafe,
            (false, false) => anyhow::bail!("cell {cell} can be neither mine nor safe"),
        };
        deductions.insert(cell, state);
    }

    Ok(Audit { deductions })
}

fn can_hold(solver: &mut Solver, lit: Lit) -> anyhow::Result<bool> {
    solver.assume(&[lit]);
    let result = solver.solve();
    solver.assume(&[]);
    Ok(result?)
}

/// Encodes an "exactly k" constraint into the CNF formula.
fn encode_exactly_k_to_formula(
    formula: &mut CnfFormula,
    solver: &mut Solver,
    vars: &[Lit],
    k: usize,
) {
    encode_at_most_k_to_formula(formula, solver, vars, k);
    encode_at_least_k_to_formula(formula, solver, vars, k);
}

fn encode_at_most_k_to_formula(
    formula: &mut CnfFormula,
    solver: &mut Solver,
    vars: &[Lit],
    k: usize,
) {
    if k >= vars.len() {
        return;
    }
    if k == 0 {
        for &lit in vars {
            formula.add_clause(&[!lit]);
        }
        return;
    }

    // Neighborhood sentences are at most 8 cells; inferred ones can be larger.
    if vars.len() <= 10 {
        for combo in vars.iter().copied().combinations(k + 1) {
            let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
            formula.add_clause(&clause);
        }
    } else {
        encode_sequential_counter_at_most_k_to_formula(formula, solver, vars, k);
    }
}

fn encode_at_least_k_to_formula(
    formula: &mut CnfFormula,
    solver: &mut Solver,
    vars: &[Lit],
    k: usize,
) {
    if k == 0 {
        return;
    }
    if k > vars.len() {
        formula.add_clause(&[]);
        return;
    }

    if vars.len() <= 10 {
        for combo in vars.iter().copied().combinations(vars.len() - k + 1) {
            formula.add_clause(&combo);
        }
    } else {
        // At least k true is at most n - k false.
        let negated: Vec<Lit> = vars.iter().map(|&lit| !lit).collect();
        encode_sequential_counter_at_most_k_to_formula(formula, solver, &negated, vars.len() - k);
    }
}

/// Sinz sequential counter: `s[i][j]` holds when at least `j + 1` of the
/// first `i + 1` literals are true.
fn encode_sequential_counter_at_most_k_to_formula(
    formula: &mut CnfFormula,
    solver: &mut Solver,
    vars: &[Lit],
    k: usize,
) {
    let n = vars.len();
    if k >= n {
        return;
    }
    if k == 0 {
        for &lit in vars {
            formula.add_clause(&[!lit]);
        }
        return;
    }

    let s: Vec<Vec<Lit>> = (0..n - 1)
        .map(|_| (0..k).map(|_| Lit::from_var(solver.new_var(), true)).collect())
        .collect();

    formula.add_clause(&[!vars[0], s[0][0]]);
    for j in 1..k {
        formula.add_clause(&[!s[0][j]]);
    }

    for i in 1..n - 1 {
        formula.add_clause(&[!vars[i], s[i][0]]);
        formula.add_clause(&[!s[i - 1][0], s[i][0]]);
        for j in 1..k {
            formula.add_clause(&[!vars[i], !s[i - 1][j - 1], s[i][j]]);
            formula.add_clause(&[!s[i - 1][j], s[i][j]]);
        }
        formula.add_clause(&[!vars[i], !s[i - 1][k - 1]]);
    }

    formula.add_clause(&[!vars[n - 1], !s[n - 2][k - 1]]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Dimensions;
    use crate::knowledge::InferenceMode;

    fn c(row: usize, col: usize) -> Cell {
        Cell::new(row, col)
    }

    #[test]
    fn test_empty_knowledge_audits_clean() {
        let engine = KnowledgeEngine::new(Dimensions::new(4, 4));
        let audit = audit(&engine).unwrap();
        assert!(audit.deductions.is_empty());
        assert_eq!(audit.missed_by(&engine), 0);
    }

    #[test]
    fn test_symmetric_sentence_is_undetermined() {
        let mut engine = KnowledgeEngine::new(Dimensions::new(1, 3));
        // The middle cell sees one mine between its two neighbors.
        engine.add_knowledge(c(0, 1), 1);

        let audit = audit(&engine).unwrap();
        assert_eq!(audit.deductions.get(&c(0, 0)), Some(&DeducedState::Undetermined));
        assert_eq!(audit.deductions.get(&c(0, 2)), Some(&DeducedState::Undetermined));
    }

    #[test]
    fn test_finds_what_single_pass_left_pending() {
        // 3x3 board, single mine at (2,2).
        let mut engine = KnowledgeEngine::with_mode(Dimensions::new(3, 3), InferenceMode::SinglePass);
        engine.add_knowledge(c(0, 0), 0);
        engine.add_knowledge(c(1, 1), 1);
        engine.add_knowledge(c(1, 2), 1);

        let audit = audit(&engine).unwrap();
        assert!(audit.forced_safes().contains(&c(2, 0)));
        assert!(!engine.safes().contains(&c(2, 0)));
        assert!(audit.missed_by(&engine) > 0);
    }

    #[test]
    fn test_false_count_is_inconsistent() {
        let mut engine = KnowledgeEngine::new(Dimensions::new(1, 5));
        engine.add_knowledge(c(0, 2), 1);
        engine.add_knowledge(c(0, 0), 1);
        // (0,1) is now a mine and (0,3) safe, so (0,4) truly sees no mines.
        assert!(engine.mines().contains(&c(0, 1)));
        assert!(engine.safes().contains(&c(0, 3)));

        engine.add_knowledge(c(0, 4), 1);

        assert!(audit(&engine).is_err());
    }

    #[test]
    fn test_large_sentence_uses_sequential_counter() {
        let mut solver = Solver::new();
        let vars: Vec<Lit> = (0..12)
            .map(|_| Lit::from_var(solver.new_var(), true))
            .collect();

        let mut formula = CnfFormula::new();
        encode_exactly_k_to_formula(&mut formula, &mut solver, &vars, 11);
        solver.add_formula(&formula);

        // Forcing the first cell safe leaves the rest as mines.
        solver.assume(&[!vars[0]]);
        assert!(solver.solve().unwrap());
        let model = solver.model().unwrap();
        let mines = vars.iter().filter(|&&lit| model.contains(&lit)).count();
        assert_eq!(mines, 11);

        // Twelve mines is impossible.
        solver.assume(&vars);
        assert!(!solver.solve().unwrap());
    }
}
