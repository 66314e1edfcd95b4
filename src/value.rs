use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// A numeric register value, integer or floating point.
///
/// Integer arithmetic wraps; mixing in a float promotes the result to
/// float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(f) => f,
        }
    }

    /// Truncating integer view, for places the machine needs a whole
    /// number.
    pub fn as_i64(self) -> i64 {
        match self {
            Num::Int(n) => n,
            Num::Float(f) => f as i64,
        }
    }

    /// Total three-way comparison. Mixed operands compare as floats.
    pub fn total_cmp(&self, other: &Num) -> Ordering {
        match (self, other) {
            (Num::Int(a), Num::Int(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }
}

impl Default for Num {
    fn default() -> Self {
        Num::Int(0)
    }
}

impl Add for Num {
    type Output = Num;

    fn add(self, rhs: Num) -> Num {
        match (self, rhs) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_add(b)),
            (a, b) => Num::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl Sub for Num {
    type Output = Num;

    fn sub(self, rhs: Num) -> Num {
        match (self, rhs) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a.wrapping_sub(b)),
            (a, b) => Num::Float(a.as_f64() - b.as_f64()),
        }
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Num::Int(n) => write!(f, "{n}"),
            Num::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A resolved operand value.
///
/// Resolution never fails: the raw token is the final fallback. Each
/// instruction handler pattern-matches the kinds it can use and rejects
/// the rest with a typed error.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    /// An instruction index produced by a label lookup.
    Index(usize),
    /// The raw operand token, for tokens that are neither registers,
    /// numbers, nor known labels.
    Text(String),
}

impl Value {
    /// Kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "an integer",
            Value::Float(_) => "a float",
            Value::Index(_) => "an instruction index",
            Value::Text(_) => "text",
        }
    }

    /// Numeric view: numbers themselves, and label indices as integers.
    pub fn to_num(&self) -> Option<Num> {
        match *self {
            Value::Int(n) => Some(Num::Int(n)),
            Value::Float(f) => Some(Num::Float(f)),
            Value::Index(i) => Some(Num::Int(i as i64)),
            Value::Text(_) => None,
        }
    }

    /// Instruction-index view: label indices, and non-negative integers.
    pub fn to_index(&self) -> Option<usize> {
        match *self {
            Value::Index(i) => Some(i),
            Value::Int(n) => usize::try_from(n).ok(),
            _ => None,
        }
    }
}

impl From<Num> for Value {
    fn from(num: Num) -> Self {
        match num {
            Num::Int(n) => Value::Int(n),
            Num::Float(f) => Value::Float(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_arithmetic_stays_int() {
        assert_eq!(Num::Int(3) + Num::Int(5), Num::Int(8));
        assert_eq!(Num::Int(3) - Num::Int(5), Num::Int(-2));
    }

    #[test]
    fn float_operand_promotes() {
        assert_eq!(Num::Int(3) + Num::Float(0.5), Num::Float(3.5));
        assert_eq!(Num::Float(1.5) - Num::Int(1), Num::Float(0.5));
    }

    #[test]
    fn mixed_comparison_goes_through_floats() {
        assert_eq!(Num::Int(2).total_cmp(&Num::Float(2.0)), Ordering::Equal);
        assert_eq!(Num::Int(2).total_cmp(&Num::Float(2.5)), Ordering::Less);
        assert_eq!(Num::Int(3).total_cmp(&Num::Int(2)), Ordering::Greater);
    }

    #[test]
    fn text_is_not_numeric() {
        assert_eq!(Value::Text("auto".to_string()).to_num(), None);
        assert_eq!(Value::Int(7).to_num(), Some(Num::Int(7)));
        assert_eq!(Value::Index(4).to_num(), Some(Num::Int(4)));
    }

    #[test]
    fn index_view_rejects_negatives_and_floats() {
        assert_eq!(Value::Int(-1).to_index(), None);
        assert_eq!(Value::Float(2.0).to_index(), None);
        assert_eq!(Value::Int(3).to_index(), Some(3));
        assert_eq!(Value::Index(9).to_index(), Some(9));
    }
}
