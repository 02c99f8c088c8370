//  EXPR.rs
//    by Lut99
//
//  Created:
//    14 Mar 2025, 10:26:43
//  Last edited:
//    01 Aug 2025, 15:58:02
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the expression language of a planning problem: concrete
//!   [`Value`]s, instantiated fluent keys ([`GroundFluent`]) and symbolic
//!   [`Expr`]essions over fluents, action parameters and objects.
//!
//!   The language is quantifier-free by construction. Grounding removes all
//!   action parameters, so everything that reaches the simulator evaluates to
//!   a concrete [`Value`] or fails with an evaluation error.
//

// Imports
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FResult};

use num_rational::Rational64;

use super::Ident;


/***** ERRORS *****/
/// Represents that an expression was not a constant when a [`Value`] was demanded of it.
#[derive(Debug)]
pub struct NotConstantError;
impl Display for NotConstantError {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult { write!(f, "Cannot turn a non-constant expression into a value") }
}
impl Error for NotConstantError {}





/***** LIBRARY *****/
/// The kind of a [`Value`] (and, by extension, of a declared fluent).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueKind {
    /// Booleans (predicates).
    Bool,
    /// 64-bit integers.
    Int,
    /// Exact rationals.
    Real,
    /// Objects of some declared type.
    Object,
}
impl ValueKind {
    /// Returns whether this kind takes part in arithmetic.
    ///
    /// # Returns
    /// True for [`ValueKind::Int`] and [`ValueKind::Real`], false otherwise.
    #[inline]
    pub const fn is_numeric(&self) -> bool { matches!(self, Self::Int | Self::Real) }
}
impl Display for ValueKind {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Real => write!(f, "real"),
            Self::Object => write!(f, "object"),
        }
    }
}



/// A concrete constant.
///
/// States assign exactly one Value to every fluent key; evaluation reduces
/// expressions to Values. Reals are exact rationals so that Values can be
/// compared and hashed without floating-point caveats.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Value {
    /// A boolean constant.
    Bool(bool),
    /// An integer constant.
    Int(i64),
    /// A rational constant.
    Real(Rational64),
    /// A named object.
    Object(Ident),
}
impl Value {
    /// Returns the [`ValueKind`] of this Value.
    ///
    /// # Returns
    /// The matching [`ValueKind`].
    #[inline]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Real(_) => ValueKind::Real,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Returns the boolean in this Value, if any.
    ///
    /// # Returns
    /// The wrapped [`bool`], or [`None`] if this is not a [`Value::Bool`].
    #[inline]
    pub const fn as_bool(&self) -> Option<bool> { if let Self::Bool(b) = self { Some(*b) } else { None } }

    /// Returns the integer in this Value, if any.
    ///
    /// # Returns
    /// The wrapped [`i64`], or [`None`] if this is not a [`Value::Int`].
    #[inline]
    pub const fn as_int(&self) -> Option<i64> { if let Self::Int(i) = self { Some(*i) } else { None } }
}
impl Display for Value {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Object(o) => write!(f, "{o}"),
        }
    }
}
impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self { Self::Bool(value) }
}
impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self { Self::Int(value) }
}
impl From<Rational64> for Value {
    #[inline]
    fn from(value: Rational64) -> Self { Self::Real(value) }
}



/// An instantiated fluent: the name of a declared fluent applied to concrete
/// argument [`Value`]s.
///
/// GroundFluents are the keys of the simulator's state. Their sequence is
/// fixed when a domain is built and never changes length or order afterwards.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct GroundFluent {
    /// The name of the declared fluent.
    pub ident: Ident,
    /// The concrete arguments it is applied to.
    pub args:  Vec<Value>,
}
impl GroundFluent {
    /// Constructor for a GroundFluent.
    ///
    /// # Arguments
    /// - `ident`: The name of the declared fluent.
    /// - `args`: The concrete arguments it is applied to.
    ///
    /// # Returns
    /// A new GroundFluent.
    #[inline]
    pub fn new(ident: impl Into<Ident>, args: impl IntoIterator<Item = Value>) -> Self {
        Self { ident: ident.into(), args: args.into_iter().collect() }
    }
}
impl Display for GroundFluent {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        write!(f, "{}", self.ident)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}



/// A symbolic expression over fluents, action parameters and objects.
///
/// Preconditions, effect values, effect guards and goals are all Exprs. The
/// conjunctive collections in the model (precondition sets, goal sets) are
/// plain `Vec<Expr>`s instead of a toplevel [`Expr::And`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Expr {
    /// A constant.
    Value(Value),
    /// A fluent applied to argument expressions.
    Fluent(Ident, Vec<Expr>),
    /// A reference to an action parameter. Never survives grounding.
    Param(Ident),
    /// A reference to a declared object.
    Object(Ident),

    /// Logical negation.
    Not(Box<Expr>),
    /// Logical conjunction. Empty conjunctions are true.
    And(Vec<Expr>),
    /// Logical disjunction. Empty disjunctions are false.
    Or(Vec<Expr>),

    /// Equality between two same-kind values.
    Equals(Box<Expr>, Box<Expr>),
    /// Strictly-less-than between two same-kind numbers.
    Lt(Box<Expr>, Box<Expr>),
    /// Less-than-or-equal between two same-kind numbers.
    Le(Box<Expr>, Box<Expr>),

    /// Numeric sum. Empty sums are `0`.
    Plus(Vec<Expr>),
    /// Numeric difference.
    Minus(Box<Expr>, Box<Expr>),
    /// Numeric product. Empty products are `1`.
    Times(Vec<Expr>),
    /// Numeric division.
    Div(Box<Expr>, Box<Expr>),
}
impl Expr {
    /// Builds a fluent application.
    #[inline]
    pub fn fluent(ident: impl Into<Ident>, args: impl IntoIterator<Item = Expr>) -> Self { Self::Fluent(ident.into(), args.into_iter().collect()) }

    /// Builds an action-parameter reference.
    #[inline]
    pub fn param(ident: impl Into<Ident>) -> Self { Self::Param(ident.into()) }

    /// Builds an object reference.
    #[inline]
    pub fn object(ident: impl Into<Ident>) -> Self { Self::Object(ident.into()) }

    /// Builds a negation.
    #[inline]
    pub fn not(expr: Expr) -> Self { Self::Not(Box::new(expr)) }

    /// Builds a conjunction.
    #[inline]
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Self { Self::And(exprs.into_iter().collect()) }

    /// Builds a disjunction.
    #[inline]
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Self { Self::Or(exprs.into_iter().collect()) }

    /// Builds an equality.
    #[inline]
    pub fn equals(lhs: Expr, rhs: Expr) -> Self { Self::Equals(Box::new(lhs), Box::new(rhs)) }

    /// Builds a strictly-less-than comparison.
    #[inline]
    pub fn lt(lhs: Expr, rhs: Expr) -> Self { Self::Lt(Box::new(lhs), Box::new(rhs)) }

    /// Builds a less-than-or-equal comparison.
    #[inline]
    pub fn le(lhs: Expr, rhs: Expr) -> Self { Self::Le(Box::new(lhs), Box::new(rhs)) }

    /// Builds a sum.
    #[inline]
    pub fn plus(exprs: impl IntoIterator<Item = Expr>) -> Self { Self::Plus(exprs.into_iter().collect()) }

    /// Builds a difference.
    #[inline]
    pub fn minus(lhs: Expr, rhs: Expr) -> Self { Self::Minus(Box::new(lhs), Box::new(rhs)) }

    /// Builds a product.
    #[inline]
    pub fn times(exprs: impl IntoIterator<Item = Expr>) -> Self { Self::Times(exprs.into_iter().collect()) }

    /// Builds a division.
    #[inline]
    pub fn div(lhs: Expr, rhs: Expr) -> Self { Self::Div(Box::new(lhs), Box::new(rhs)) }



    /// Returns whether this expression is a constant.
    ///
    /// # Returns
    /// True if this is an [`Expr::Value`], false otherwise. Composite
    /// expressions over constants do not count; fold them first.
    #[inline]
    pub const fn is_constant(&self) -> bool { matches!(self, Self::Value(_)) }
}
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> FResult {
        /// Writes a parenthesized, space-separated operator application.
        fn write_op(f: &mut Formatter, op: &str, operands: &[Expr]) -> FResult {
            write!(f, "({op}")?;
            for operand in operands {
                write!(f, " {operand}")?;
            }
            write!(f, ")")
        }

        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Fluent(ident, args) if args.is_empty() => write!(f, "{ident}"),
            Self::Fluent(ident, args) => {
                write!(f, "({ident}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            },
            Self::Param(ident) => write!(f, "?{ident}"),
            Self::Object(ident) => write!(f, "{ident}"),

            Self::Not(e) => write!(f, "(not {e})"),
            Self::And(es) => write_op(f, "and", es),
            Self::Or(es) => write_op(f, "or", es),

            Self::Equals(l, r) => write!(f, "(= {l} {r})"),
            Self::Lt(l, r) => write!(f, "(< {l} {r})"),
            Self::Le(l, r) => write!(f, "(<= {l} {r})"),

            Self::Plus(es) => write_op(f, "+", es),
            Self::Minus(l, r) => write!(f, "(- {l} {r})"),
            Self::Times(es) => write_op(f, "*", es),
            Self::Div(l, r) => write!(f, "(/ {l} {r})"),
        }
    }
}
impl From<Value> for Expr {
    #[inline]
    fn from(value: Value) -> Self { Self::Value(value) }
}
impl From<bool> for Expr {
    #[inline]
    fn from(value: bool) -> Self { Self::Value(Value::Bool(value)) }
}
impl From<i64> for Expr {
    #[inline]
    fn from(value: i64) -> Self { Self::Value(Value::Int(value)) }
}
impl From<Rational64> for Expr {
    #[inline]
    fn from(value: Rational64) -> Self { Self::Value(Value::Real(value)) }
}
impl TryFrom<Expr> for Value {
    type Error = NotConstantError;

    #[inline]
    fn try_from(value: Expr) -> Result<Self, Self::Error> {
        match value {
            Expr::Value(v) => Ok(v),
            _ => Err(NotConstantError),
        }
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::Bool(true).kind(), ValueKind::Bool);
        assert_eq!(Value::Int(42).kind(), ValueKind::Int);
        assert_eq!(Value::Real(Rational64::new(1, 2)).kind(), ValueKind::Real);
        assert_eq!(Value::Object(Ident::from("table")).kind(), ValueKind::Object);
        assert!(ValueKind::Int.is_numeric());
        assert!(ValueKind::Real.is_numeric());
        assert!(!ValueKind::Bool.is_numeric());
        assert!(!ValueKind::Object.is_numeric());
    }

    #[test]
    fn test_expr_display() {
        let e: Expr = Expr::and([
            Expr::fluent("robot_at", [Expr::object("kitchen")]),
            Expr::not(Expr::fluent("robot_at", [Expr::param("to")])),
            Expr::le(Expr::from(10), Expr::fluent("battery", [])),
        ]);
        assert_eq!(e.to_string(), "(and (robot_at kitchen) (not (robot_at ?to)) (<= 10 battery))");
    }

    #[test]
    fn test_ground_fluent_display() {
        assert_eq!(GroundFluent::new("battery", []).to_string(), "battery");
        assert_eq!(
            GroundFluent::new("connected", [Value::Object(Ident::from("kitchen")), Value::Object(Ident::from("hall"))]).to_string(),
            "connected(kitchen, hall)"
        );
    }

    #[test]
    fn test_expr_constants() {
        assert!(Expr::from(true).is_constant());
        assert!(!Expr::plus([Expr::from(1), Expr::from(2)]).is_constant());
        assert_eq!(Value::try_from(Expr::from(5)).unwrap(), Value::Int(5));
        assert!(Value::try_from(Expr::param("x")).is_err());
    }
}
