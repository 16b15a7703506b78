use std::fmt;

use super::Variable;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(usize);

pub const MAX_VARIABLE: usize = usize::MAX >> 1;

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.polarity() {
            write!(f, "{:?}", self.var())
        } else {
            write!(f, "!{:?}", self.var())
        }
    }
}

impl Literal {
    pub fn new(var: Variable, polarity: bool) -> Literal {
        assert!(var.0 <= MAX_VARIABLE, "variable index too large");
        Literal((var.0 << 1) | (polarity as usize))
    }

    pub fn positive(var: Variable) -> Literal {
        Literal::new(var, true)
    }

    pub fn negative(var: Variable) -> Literal {
        Literal::new(var, false)
    }

    pub fn var(&self) -> Variable {
        Variable(self.0 >> 1)
    }

    pub fn polarity(&self) -> bool {
        (self.0 & 1) != 0
    }

    pub fn invert(&self) -> Literal {
        Literal(self.0 ^ 1)
    }

    pub fn to_dimacs(&self) -> i64 {
        let number = self.var().0 as i64 + 1;
        if self.polarity() {
            number
        } else {
            -number
        }
    }

    pub fn from_dimacs(value: i64) -> Option<Literal> {
        // 0 terminates a clause
        if value == 0 {
            return None;
        }
        let var = Variable(value.unsigned_abs() as usize - 1);
        Some(Literal::new(var, value > 0))
    }
}
