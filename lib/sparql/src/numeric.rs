use crate::error::{ThinError, ThinResult};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNodeRef};
use oxsdatatypes::{Decimal, Double, Float, Integer};
use std::cmp::Ordering;
use std::str::FromStr;

/// A numeric SPARQL value.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Numeric {
    Integer(Integer),
    Decimal(Decimal),
    Float(Float),
    Double(Double),
}

impl Numeric {
    /// Parses a literal of a numeric datatype. Derived integer types become [Numeric::Integer].
    pub(crate) fn from_literal(literal: &Literal) -> ThinResult<Self> {
        let value = literal.value();
        let numeric = match literal.datatype() {
            xsd::INTEGER
            | xsd::INT
            | xsd::LONG
            | xsd::SHORT
            | xsd::BYTE
            | xsd::NON_NEGATIVE_INTEGER
            | xsd::POSITIVE_INTEGER
            | xsd::NON_POSITIVE_INTEGER
            | xsd::NEGATIVE_INTEGER
            | xsd::UNSIGNED_LONG
            | xsd::UNSIGNED_INT
            | xsd::UNSIGNED_SHORT
            | xsd::UNSIGNED_BYTE => Self::Integer(Integer::from_str(value)?),
            xsd::DECIMAL => Self::Decimal(Decimal::from_str(value)?),
            xsd::FLOAT => Self::Float(Float::from_str(value)?),
            xsd::DOUBLE => Self::Double(Double::from_str(value)?),
            _ => return ThinError::expected(),
        };
        Ok(numeric)
    }

    pub(crate) fn is_numeric_datatype(datatype: NamedNodeRef<'_>) -> bool {
        matches!(
            datatype,
            xsd::INTEGER
                | xsd::INT
                | xsd::LONG
                | xsd::SHORT
                | xsd::BYTE
                | xsd::NON_NEGATIVE_INTEGER
                | xsd::POSITIVE_INTEGER
                | xsd::NON_POSITIVE_INTEGER
                | xsd::NEGATIVE_INTEGER
                | xsd::UNSIGNED_LONG
                | xsd::UNSIGNED_INT
                | xsd::UNSIGNED_SHORT
                | xsd::UNSIGNED_BYTE
                | xsd::DECIMAL
                | xsd::FLOAT
                | xsd::DOUBLE
        )
    }

    pub(crate) fn into_literal(self) -> Literal {
        match self {
            Self::Integer(value) => Literal::new_typed_literal(value.to_string(), xsd::INTEGER),
            Self::Decimal(value) => Literal::new_typed_literal(value.to_string(), xsd::DECIMAL),
            Self::Float(value) => Literal::new_typed_literal(value.to_string(), xsd::FLOAT),
            Self::Double(value) => Literal::new_typed_literal(value.to_string(), xsd::DOUBLE),
        }
    }

    pub(crate) fn is_zero(self) -> bool {
        match self {
            Self::Integer(value) => value == Integer::from(0_i64),
            Self::Decimal(value) => value == Decimal::from(0_i64),
            Self::Float(value) => f32::from(value) == 0.0,
            Self::Double(value) => f64::from(value) == 0.0,
        }
    }

    pub(crate) fn is_nan(self) -> bool {
        match self {
            Self::Float(value) => value.is_nan(),
            Self::Double(value) => value.is_nan(),
            Self::Integer(_) | Self::Decimal(_) => false,
        }
    }

    pub(crate) fn checked_add(self, rhs: Self) -> ThinResult<Self> {
        let result = match NumericPair::with_casts_from(self, rhs) {
            NumericPair::Integer(lhs, rhs) => lhs.checked_add(rhs).map(Self::Integer),
            NumericPair::Decimal(lhs, rhs) => lhs.checked_add(rhs).map(Self::Decimal),
            NumericPair::Float(lhs, rhs) => Some(Self::Float(lhs + rhs)),
            NumericPair::Double(lhs, rhs) => Some(Self::Double(lhs + rhs)),
        };
        result.ok_or(ThinError::default())
    }

    pub(crate) fn checked_sub(self, rhs: Self) -> ThinResult<Self> {
        let result = match NumericPair::with_casts_from(self, rhs) {
            NumericPair::Integer(lhs, rhs) => lhs.checked_sub(rhs).map(Self::Integer),
            NumericPair::Decimal(lhs, rhs) => lhs.checked_sub(rhs).map(Self::Decimal),
            NumericPair::Float(lhs, rhs) => Some(Self::Float(lhs - rhs)),
            NumericPair::Double(lhs, rhs) => Some(Self::Double(lhs - rhs)),
        };
        result.ok_or(ThinError::default())
    }

    pub(crate) fn checked_mul(self, rhs: Self) -> ThinResult<Self> {
        let result = match NumericPair::with_casts_from(self, rhs) {
            NumericPair::Integer(lhs, rhs) => lhs.checked_mul(rhs).map(Self::Integer),
            NumericPair::Decimal(lhs, rhs) => lhs.checked_mul(rhs).map(Self::Decimal),
            NumericPair::Float(lhs, rhs) => Some(Self::Float(lhs * rhs)),
            NumericPair::Double(lhs, rhs) => Some(Self::Double(lhs * rhs)),
        };
        result.ok_or(ThinError::default())
    }

    /// Divides two numbers. The division of two integers is a decimal.
    pub(crate) fn checked_div(self, rhs: Self) -> ThinResult<Self> {
        let result = match NumericPair::with_casts_from(self, rhs) {
            NumericPair::Integer(lhs, rhs) => Decimal::from(lhs)
                .checked_div(Decimal::from(rhs))
                .map(Self::Decimal),
            NumericPair::Decimal(lhs, rhs) => lhs.checked_div(rhs).map(Self::Decimal),
            NumericPair::Float(lhs, rhs) => Some(Self::Float(lhs / rhs)),
            NumericPair::Double(lhs, rhs) => Some(Self::Double(lhs / rhs)),
        };
        result.ok_or(ThinError::default())
    }

    pub(crate) fn checked_neg(self) -> ThinResult<Self> {
        let result = match self {
            Self::Integer(value) => value.checked_neg().map(Self::Integer),
            Self::Decimal(value) => value.checked_neg().map(Self::Decimal),
            Self::Float(value) => Some(Self::Float(-value)),
            Self::Double(value) => Some(Self::Double(-value)),
        };
        result.ok_or(ThinError::default())
    }

    pub(crate) fn checked_abs(self) -> ThinResult<Self> {
        let result = match self {
            Self::Integer(value) => value.checked_abs().map(Self::Integer),
            Self::Decimal(value) => value.checked_abs().map(Self::Decimal),
            Self::Float(value) => Some(Self::Float(value.abs())),
            Self::Double(value) => Some(Self::Double(value.abs())),
        };
        result.ok_or(ThinError::default())
    }

    pub(crate) fn checked_ceil(self) -> ThinResult<Self> {
        let result = match self {
            Self::Integer(_) => Some(self),
            Self::Decimal(value) => value.checked_ceil().map(Self::Decimal),
            Self::Float(value) => Some(Self::Float(value.ceil())),
            Self::Double(value) => Some(Self::Double(value.ceil())),
        };
        result.ok_or(ThinError::default())
    }

    pub(crate) fn checked_floor(self) -> ThinResult<Self> {
        let result = match self {
            Self::Integer(_) => Some(self),
            Self::Decimal(value) => value.checked_floor().map(Self::Decimal),
            Self::Float(value) => Some(Self::Float(value.floor())),
            Self::Double(value) => Some(Self::Double(value.floor())),
        };
        result.ok_or(ThinError::default())
    }

    pub(crate) fn checked_round(self) -> ThinResult<Self> {
        let result = match self {
            Self::Integer(_) => Some(self),
            Self::Decimal(value) => value.checked_round().map(Self::Decimal),
            Self::Float(value) => Some(Self::Float(value.round())),
            Self::Double(value) => Some(Self::Double(value.round())),
        };
        result.ok_or(ThinError::default())
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Self::Integer(value.into())
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match NumericPair::with_casts_from(*self, *other) {
            NumericPair::Integer(lhs, rhs) => Some(lhs.cmp(&rhs)),
            NumericPair::Decimal(lhs, rhs) => Some(lhs.cmp(&rhs)),
            NumericPair::Float(lhs, rhs) => lhs.partial_cmp(&rhs),
            NumericPair::Double(lhs, rhs) => lhs.partial_cmp(&rhs),
        }
    }
}

/// Two numbers promoted to their common type.
pub(crate) enum NumericPair {
    Integer(Integer, Integer),
    Decimal(Decimal, Decimal),
    Float(Float, Float),
    Double(Double, Double),
}

impl NumericPair {
    pub(crate) fn with_casts_from(lhs: Numeric, rhs: Numeric) -> NumericPair {
        match (lhs, rhs) {
            (Numeric::Integer(lhs), Numeric::Integer(rhs)) => NumericPair::Integer(lhs, rhs),
            (Numeric::Integer(lhs), Numeric::Decimal(rhs)) => {
                NumericPair::Decimal(Decimal::from(lhs), rhs)
            }
            (Numeric::Integer(lhs), Numeric::Float(rhs)) => NumericPair::Float(lhs.into(), rhs),
            (Numeric::Integer(lhs), Numeric::Double(rhs)) => NumericPair::Double(lhs.into(), rhs),

            (Numeric::Decimal(lhs), Numeric::Integer(rhs)) => NumericPair::Decimal(lhs, rhs.into()),
            (Numeric::Decimal(lhs), Numeric::Decimal(rhs)) => NumericPair::Decimal(lhs, rhs),
            (Numeric::Decimal(lhs), Numeric::Float(rhs)) => NumericPair::Float(lhs.into(), rhs),
            (Numeric::Decimal(lhs), Numeric::Double(rhs)) => NumericPair::Double(lhs.into(), rhs),

            (Numeric::Float(lhs), Numeric::Integer(rhs)) => NumericPair::Float(lhs, rhs.into()),
            (Numeric::Float(lhs), Numeric::Decimal(rhs)) => NumericPair::Float(lhs, rhs.into()),
            (Numeric::Float(lhs), Numeric::Float(rhs)) => NumericPair::Float(lhs, rhs),
            (Numeric::Float(lhs), Numeric::Double(rhs)) => NumericPair::Double(lhs.into(), rhs),

            (Numeric::Double(lhs), Numeric::Integer(rhs)) => NumericPair::Double(lhs, rhs.into()),
            (Numeric::Double(lhs), Numeric::Decimal(rhs)) => NumericPair::Double(lhs, rhs.into()),
            (Numeric::Double(lhs), Numeric::Float(rhs)) => NumericPair::Double(lhs, rhs.into()),
            (Numeric::Double(lhs), Numeric::Double(rhs)) => NumericPair::Double(lhs, rhs),
        }
    }
}
