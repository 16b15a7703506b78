use std::cell::RefCell;
use std::fmt;

use log::trace;

use crate::encoding::{self, ClauseSink};
use crate::instance::{Clause, Literal, Variable};
use crate::variable_registry::VariableRegister;

#[derive(Clone, Debug, Default)]
pub struct ProblemBuilder {
    variables: RefCell<VariableRegister>,
    clauses: RefCell<Vec<Clause>>,
    objective: Vec<Literal>,
}

impl ProblemBuilder {
    pub fn new() -> ProblemBuilder {
        ProblemBuilder::default()
    }

    pub fn var(&mut self, name: &str) -> Variable {
        self.variables.borrow_mut().create_original(name)
    }

    pub fn variable_count(&self) -> usize {
        self.variables.borrow().len()
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.borrow().len()
    }

    pub fn require(&self, lit: Literal) {
        self.push_clause(&[lit]);
    }

    pub fn require_clause(&self, lits: &[Literal]) {
        self.push_clause(lits);
    }

    // a -> b
    pub fn require_implies(&self, a: Literal, b: Literal) {
        self.push_clause(&[a.invert(), b]);
    }

    // a <-> b
    pub fn require_equal(&self, a: Literal, b: Literal) {
        self.require_implies(a, b);
        self.require_implies(b, a);
    }

    pub fn define_or(&self, label: Literal, lits: &[Literal]) {
        // Do the tseitin shuffle: label -> (a | b | ...), and each of a, b, ... -> label
        let mut cover = Vec::with_capacity(lits.len() + 1);
        cover.push(label.invert());
        cover.extend_from_slice(lits);
        self.push_clause(&cover);
        for &lit in lits {
            self.push_clause(&[lit.invert(), label]);
        }
    }

    pub fn at_most(&mut self, lits: &[Literal], k: usize) {
        encoding::at_most(self, lits, k);
    }

    pub fn at_least(&mut self, lits: &[Literal], k: usize) {
        encoding::at_least(self, lits, k);
    }

    pub fn minimize(&mut self, lits: Vec<Literal>) {
        self.objective = lits;
    }

    pub fn build(self) -> Problem {
        Problem {
            variables: self.variables.into_inner(),
            clauses: self.clauses.into_inner(),
            objective: self.objective,
        }
    }

    fn push_clause(&self, lits: &[Literal]) {
        let clause = Clause::new(lits);
        if clause.is_tautology() {
            trace!("dropping tautology {:?}", clause);
            return;
        }
        if clause.is_empty() {
            self.add_contradiction_ref();
            return;
        }
        self.clauses.borrow_mut().push(clause);
    }

    fn add_contradiction_ref(&self) {
        let v = Literal::positive(self.variables.borrow_mut().create_auxiliary());
        let mut clauses = self.clauses.borrow_mut();
        clauses.push(Clause::new(&[v]));
        clauses.push(Clause::new(&[v.invert()]));
    }
}

impl ClauseSink for ProblemBuilder {
    fn fresh_variable(&mut self) -> Variable {
        self.variables.get_mut().create_auxiliary()
    }

    fn add_clause(&mut self, literals: &[Literal]) {
        self.push_clause(literals);
    }
}

#[derive(Clone)]
pub struct Problem {
    variables: VariableRegister,
    clauses: Vec<Clause>,
    objective: Vec<Literal>,
}

impl Problem {
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn variable_name(&self, var: Variable) -> Option<&str> {
        self.variables.get(var)
    }

    pub fn variable_by_name(&self, name: &str) -> Option<Variable> {
        self.variables.get_by_name(name)
    }

    pub fn original_variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.variables.iter_original()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn objective(&self) -> &[Literal] {
        &self.objective
    }

    pub fn objective_value(&self, value: impl Fn(Literal) -> bool) -> usize {
        self.objective.iter().filter(|&&lit| value(lit)).count()
    }

    pub fn first_violated(&self, value: impl Fn(Literal) -> bool) -> Option<&Clause> {
        self.clauses.iter().find(|c| !c.is_satisfied_by(&value))
    }
}

impl fmt::Debug for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Problem {{ variables: {} ({} original), clauses: {}, objective terms: {} }}",
            self.variables.len(),
            self.variables.iter_original().count(),
            self.clauses.len(),
            self.objective.len()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn value_of(assignment: &[bool]) -> impl Fn(Literal) -> bool + '_ {
        move |lit| assignment[lit.var().index()] == lit.polarity()
    }

    #[test]
    fn test_build_unary_problem() {
        let mut pb = ProblemBuilder::new();

        let x = pb.var("x");
        let y = pb.var("y");

        assert_ne!(x, y);
        pb.require(Literal::positive(x));
        let problem = pb.build();
        assert_eq!(problem.variable_count(), 2);
        assert_eq!(problem.clauses().len(), 1);
        assert_eq!(problem.variable_by_name("y"), Some(y));
    }

    #[test]
    fn test_or_label_is_equivalent_to_disjunction() {
        let mut pb = ProblemBuilder::new();
        let x = Literal::positive(pb.var("x"));
        let y = Literal::positive(pb.var("y"));
        let label = Literal::positive(pb.var("x|y"));
        pb.define_or(label, &[x, y]);
        assert_eq!(pb.clause_count(), 3);
        let problem = pb.build();

        for (vx, vy) in [(false, false), (true, false), (false, true), (true, true)] {
            let consistent = [vx, vy, vx || vy];
            let inconsistent = [vx, vy, !(vx || vy)];
            assert!(problem.first_violated(value_of(&consistent)).is_none());
            assert!(problem.first_violated(value_of(&inconsistent)).is_some());
        }
        assert_eq!(label.var(), Variable(2));
    }

    #[test]
    fn test_equal_and_implies() {
        let mut pb = ProblemBuilder::new();
        let a = Literal::positive(pb.var("a"));
        let b = Literal::positive(pb.var("b"));
        let c = Literal::positive(pb.var("c"));
        pb.require_equal(a, b);
        pb.require_implies(b, c.invert());
        let problem = pb.build();

        assert!(problem.first_violated(value_of(&[true, true, false])).is_none());
        assert!(problem.first_violated(value_of(&[true, false, false])).is_some());
        assert!(problem.first_violated(value_of(&[true, true, true])).is_some());
        assert!(problem.first_violated(value_of(&[false, false, true])).is_none());
    }

    #[test]
    fn test_tautologies_are_dropped() {
        let mut pb = ProblemBuilder::new();
        let a = Literal::positive(pb.var("a"));
        pb.require_clause(&[a, a.invert()]);
        assert_eq!(pb.clause_count(), 0);
    }

    #[test]
    fn test_empty_clause_is_contradiction() {
        let pb = ProblemBuilder::new();
        pb.require_clause(&[]);
        let problem = pb.build();
        assert_eq!(problem.clauses().len(), 2);
        assert!(problem.first_violated(value_of(&[true])).is_some());
        assert!(problem.first_violated(value_of(&[false])).is_some());
    }

    #[test]
    fn test_objective_value() {
        let mut pb = ProblemBuilder::new();
        let lits: Vec<Literal> = (0..3)
            .map(|i| Literal::positive(pb.var(&format!("v{}", i))))
            .collect();
        pb.minimize(lits);
        let problem = pb.build();
        assert_eq!(problem.objective_value(value_of(&[true, false, true])), 2);
    }
}
