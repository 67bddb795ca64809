use std::fmt;

use crate::ast::LiteralValue;

/// A runtime value. Booleans only arise from relational and logical
/// operators; there is no literal for them.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// The declared type of a symbol, fixed at its first definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    Integer,
    Float,
    String,
    Boolean,
}

impl ValueType {
    /// Whether a value of type `offered` may be stored in a slot of this type.
    /// Identical types always fit; an integer widens into a float slot.
    pub fn accepts(self, offered: ValueType) -> bool {
        self == offered || (self == ValueType::Float && offered == ValueType::Integer)
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::Str(_) => ValueType::String,
            Self::Bool(_) => ValueType::Boolean,
        }
    }

    /// Zero and the empty string are false, as is `false` itself.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Float(n) => *n != 0.0,
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// Float promotion of numeric values; `None` for strings and booleans.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Numbers compare by their promoted float value, so `5 == 5.0`;
    /// everything else needs the same variant and payload.
    pub fn is_equal(&self, other: &Self) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Integer(n) => Self::Integer(*n),
            LiteralValue::Float(n) => Self::Float(*n),
            LiteralValue::String(s) => Self::Str(s.clone()),
        }
    }
}

/// Spells a float the way Python's `repr` does: positional notation with a
/// decimal point for exponents in `-4..16`, otherwise `d.ddde+XX` with at
/// least two exponent digits. Digits are the shortest round-trip form.
pub fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sign = if n.is_sign_negative() { "-" } else { "" };
    let scientific = format!("{:e}", n.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exponent) {
        // Number of digits in front of the decimal point
        let whole = exponent + 1;
        if whole <= 0 {
            let zeros = "0".repeat(whole.unsigned_abs() as usize);
            format!("{sign}0.{zeros}{digits}")
        } else {
            let whole = whole as usize;
            if digits.len() <= whole {
                let zeros = "0".repeat(whole - digits.len());
                format!("{sign}{digits}{zeros}.0")
            } else {
                format!("{sign}{}.{}", &digits[..whole], &digits[whole..])
            }
        }
    } else {
        let (first, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{sign}{first}{fraction}e{exponent_sign}{:02}",
            exponent.unsigned_abs()
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => f.write_str(&format_float(*n)),
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}
