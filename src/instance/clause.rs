use core::fmt;

use itertools::Itertools;

use super::Literal;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(lits: &[Literal]) -> Clause {
        let literals = lits.iter().copied().sorted().dedup().collect_vec();
        Clause { literals }
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_tautology(&self) -> bool {
        // Sorting places x and !x next to each other
        self.literals
            .iter()
            .tuple_windows()
            .any(|(a, b)| a.var() == b.var())
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn is_satisfied_by(&self, value: impl Fn(Literal) -> bool) -> bool {
        self.literals.iter().any(|&lit| value(lit))
    }
}

impl fmt::Debug for Clause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut fst = true;
        for &lit in &self.literals {
            if !fst {
                write!(f, ", ")?;
            }
            fst = false;
            write!(f, "{:?}", lit)?;
        }
        Ok(())
    }
}
