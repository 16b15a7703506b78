//! Cardinality encodings over literals.
//!
//! Both the [`ProblemBuilder`](crate::problem_builder::ProblemBuilder) and the solving engines
//! need to bound how many literals of a set are true: the builder for the timetable's
//! counting rules, the engines for tightening the objective. The encodings here only talk to
//! a [`ClauseSink`], so they work against either.

use log::trace;

use crate::instance::{Literal, Variable};

/// Pairwise at-most-one is used below this many literals; the sequential counter above it.
const PAIRWISE_LIMIT: usize = 5;

/// Something that accepts clauses and hands out fresh auxiliary variables.
pub trait ClauseSink {
    fn fresh_variable(&mut self) -> Variable;

    fn add_clause(&mut self, literals: &[Literal]);

    /// Adds a contradiction, making the sink unsatisfiable.
    fn add_contradiction(&mut self) {
        let v = Literal::positive(self.fresh_variable());
        self.add_clause(&[v]);
        self.add_clause(&[v.invert()]);
    }
}

/// At most `k` of `literals` are true.
///
/// Uses the sequential counter of Sinz (2005): register `s[i][j]` holds "at least j + 1 of
/// the first i + 1 literals are true", which costs O(n * k) variables and clauses.
pub fn at_most<S: ClauseSink + ?Sized>(sink: &mut S, literals: &[Literal], k: usize) {
    let n = literals.len();
    if k >= n {
        return;
    }
    if k == 0 {
        for &lit in literals {
            sink.add_clause(&[lit.invert()]);
        }
        return;
    }
    if k == 1 && n <= PAIRWISE_LIMIT {
        for (ix, &a) in literals.iter().enumerate() {
            for &b in &literals[ix + 1..] {
                sink.add_clause(&[a.invert(), b.invert()]);
            }
        }
        return;
    }

    trace!("sequential counter: n={} k={}", n, k);
    let mut registers: Vec<Vec<Literal>> = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let mut row = Vec::with_capacity(k);
        for _ in 0..k {
            row.push(Literal::positive(sink.fresh_variable()));
        }
        registers.push(row);
    }

    // First literal
    sink.add_clause(&[literals[0].invert(), registers[0][0]]);
    for j in 1..k {
        sink.add_clause(&[registers[0][j].invert()]);
    }

    for i in 1..n - 1 {
        let x = literals[i];
        let prev = &registers[i - 1];
        let cur = &registers[i];
        sink.add_clause(&[x.invert(), cur[0]]);
        sink.add_clause(&[prev[0].invert(), cur[0]]);
        for j in 1..k {
            sink.add_clause(&[x.invert(), prev[j - 1].invert(), cur[j]]);
            sink.add_clause(&[prev[j].invert(), cur[j]]);
        }
        // Overflow
        sink.add_clause(&[x.invert(), prev[k - 1].invert()]);
    }

    sink.add_clause(&[literals[n - 1].invert(), registers[n - 2][k - 1].invert()]);
}

/// At least `k` of `literals` are true.
pub fn at_least<S: ClauseSink + ?Sized>(sink: &mut S, literals: &[Literal], k: usize) {
    let n = literals.len();
    if k == 0 {
        return;
    }
    if k > n {
        sink.add_contradiction();
        return;
    }
    if k == 1 {
        sink.add_clause(literals);
        return;
    }
    if k == n {
        for &lit in literals {
            sink.add_clause(&[lit]);
        }
        return;
    }
    // At least k true == at most n - k false
    let negated: Vec<Literal> = literals.iter().map(|l| l.invert()).collect();
    at_most(sink, &negated, n - k);
}
