//  MOD.rs
//    by Lut99
//
//  Created:
//    17 Mar 2025, 13:40:12
//  Last edited:
//    01 Aug 2025, 16:09:44
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements substitution-and-simplification over the
//!   [expression language](crate::model::expr).
//!
//!   Three operations cover everything the grounder and the simulator need:
//!   - [`substitute()`] replaces action-parameter references with bound
//!     values (grounding time);
//!   - [`fold()`] partially simplifies an expression by constant folding,
//!     without needing a state (grounding time);
//!   - [`evaluate()`] reduces a ground expression to a concrete [`Value`]
//!     under a [`Valuation`] (simulation time).
//!
//!   Arithmetic is strictly kinded: integer fluents use checked 64-bit
//!   integer arithmetic, real fluents use exact rational arithmetic, and the
//!   two never mix implicitly.
//

// Imports
use std::collections::HashMap;
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use indexmap::IndexMap;

use crate::model::expr::{Expr, GroundFluent, Value, ValueKind};
use crate::model::Ident;


/***** ERRORS *****/
/// Defines the ways in which an expression can fail to simplify to a
/// concrete constant.
///
/// Any of these signals a malformed problem or an unsupported expression
/// shape. They are never retried; re-evaluating the same expression against
/// the same state yields the same error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A fluent key is not part of the state.
    UnknownFluent { fluent: GroundFluent },
    /// An action-parameter reference survived into evaluation.
    UnboundParameter { param: Ident },
    /// A boolean was demanded but something else was found.
    NotBoolean { expr: String, found: ValueKind },
    /// A number was demanded but something else was found.
    NotNumeric { expr: String, found: ValueKind },
    /// Integer and real operands met in one arithmetic operation.
    MixedArithmetic { expr: String, lhs: ValueKind, rhs: ValueKind },
    /// Two kinds were compared, or a value did not match a fluent's declared kind.
    KindMismatch { expr: String, expected: ValueKind, found: ValueKind },
    /// Checked integer arithmetic wrapped.
    Overflow { expr: String },
    /// The divisor evaluated to zero.
    DivisionByZero { expr: String },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::UnknownFluent { fluent } => write!(f, "Fluent \"{fluent}\" is not part of the state"),
            Self::UnboundParameter { param } => write!(f, "Parameter \"?{param}\" is unbound at evaluation time"),
            Self::NotBoolean { expr, found } => write!(f, "Expression \"{expr}\" did not simplify to a boolean (found {found})"),
            Self::NotNumeric { expr, found } => write!(f, "Expression \"{expr}\" did not simplify to a number (found {found})"),
            Self::MixedArithmetic { expr, lhs, rhs } => write!(f, "Expression \"{expr}\" mixes {lhs} and {rhs} arithmetic"),
            Self::KindMismatch { expr, expected, found } => write!(f, "Expression \"{expr}\" has kind {found}, expected {expected}"),
            Self::Overflow { expr } => write!(f, "Integer overflow while evaluating \"{expr}\""),
            Self::DivisionByZero { expr } => write!(f, "Division by zero while evaluating \"{expr}\""),
        }
    }
}
impl error::Error for Error {}





/***** HELPER FUNCTIONS *****/
/// Adds two same-kind numbers.
fn add(ctx: &Expr, lhs: Value, rhs: Value) -> Result<Value, Error> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => l.checked_add(r).map(Value::Int).ok_or_else(|| Error::Overflow { expr: ctx.to_string() }),
        (Value::Real(l), Value::Real(r)) => Ok(Value::Real(l + r)),
        (l, r) if l.kind().is_numeric() && r.kind().is_numeric() => {
            Err(Error::MixedArithmetic { expr: ctx.to_string(), lhs: l.kind(), rhs: r.kind() })
        },
        (l, r) => {
            let found = if l.kind().is_numeric() { r.kind() } else { l.kind() };
            Err(Error::NotNumeric { expr: ctx.to_string(), found })
        },
    }
}

/// Subtracts two same-kind numbers.
fn sub(ctx: &Expr, lhs: Value, rhs: Value) -> Result<Value, Error> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => l.checked_sub(r).map(Value::Int).ok_or_else(|| Error::Overflow { expr: ctx.to_string() }),
        (Value::Real(l), Value::Real(r)) => Ok(Value::Real(l - r)),
        (l, r) if l.kind().is_numeric() && r.kind().is_numeric() => {
            Err(Error::MixedArithmetic { expr: ctx.to_string(), lhs: l.kind(), rhs: r.kind() })
        },
        (l, r) => {
            let found = if l.kind().is_numeric() { r.kind() } else { l.kind() };
            Err(Error::NotNumeric { expr: ctx.to_string(), found })
        },
    }
}

/// Multiplies two same-kind numbers.
fn mul(ctx: &Expr, lhs: Value, rhs: Value) -> Result<Value, Error> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => l.checked_mul(r).map(Value::Int).ok_or_else(|| Error::Overflow { expr: ctx.to_string() }),
        (Value::Real(l), Value::Real(r)) => Ok(Value::Real(l * r)),
        (l, r) if l.kind().is_numeric() && r.kind().is_numeric() => {
            Err(Error::MixedArithmetic { expr: ctx.to_string(), lhs: l.kind(), rhs: r.kind() })
        },
        (l, r) => {
            let found = if l.kind().is_numeric() { r.kind() } else { l.kind() };
            Err(Error::NotNumeric { expr: ctx.to_string(), found })
        },
    }
}

/// Divides two same-kind numbers. Integer division truncates.
fn div(ctx: &Expr, lhs: Value, rhs: Value) -> Result<Value, Error> {
    match (lhs, rhs) {
        (Value::Int(_), Value::Int(0)) => Err(Error::DivisionByZero { expr: ctx.to_string() }),
        (Value::Int(l), Value::Int(r)) => l.checked_div(r).map(Value::Int).ok_or_else(|| Error::Overflow { expr: ctx.to_string() }),
        (Value::Real(l), Value::Real(r)) => {
            if *r.numer() == 0 {
                Err(Error::DivisionByZero { expr: ctx.to_string() })
            } else {
                Ok(Value::Real(l / r))
            }
        },
        (l, r) if l.kind().is_numeric() && r.kind().is_numeric() => {
            Err(Error::MixedArithmetic { expr: ctx.to_string(), lhs: l.kind(), rhs: r.kind() })
        },
        (l, r) => {
            let found = if l.kind().is_numeric() { r.kind() } else { l.kind() };
            Err(Error::NotNumeric { expr: ctx.to_string(), found })
        },
    }
}

/// Compares two same-kind numbers.
///
/// # Returns
/// [`Ordering`](std::cmp::Ordering) of `lhs` relative to `rhs`.
fn cmp(ctx: &Expr, lhs: &Value, rhs: &Value) -> Result<std::cmp::Ordering, Error> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => Ok(l.cmp(r)),
        (Value::Real(l), Value::Real(r)) => Ok(l.cmp(r)),
        (l, r) if l.kind().is_numeric() && r.kind().is_numeric() => {
            Err(Error::MixedArithmetic { expr: ctx.to_string(), lhs: l.kind(), rhs: r.kind() })
        },
        (l, r) => {
            let found = if l.kind().is_numeric() { r.kind() } else { l.kind() };
            Err(Error::NotNumeric { expr: ctx.to_string(), found })
        },
    }
}

/// Evaluates an operand and demands a boolean of it.
fn eval_bool<V: Valuation + ?Sized>(expr: &Expr, valuation: &V) -> Result<bool, Error> {
    match evaluate(expr, valuation)? {
        Value::Bool(b) => Ok(b),
        v => Err(Error::NotBoolean { expr: expr.to_string(), found: v.kind() }),
    }
}

/// A [`Valuation`] that knows nothing, for folding constant subtrees.
struct NoValuation;
impl Valuation for NoValuation {
    #[inline]
    fn value_of(&self, _fluent: &GroundFluent) -> Option<Value> { None }
}





/***** INTERFACES *****/
/// Resolves fluent keys to their current values.
///
/// Implemented by the simulator's state view and by initial-value maps; also
/// the window through which [native effects](crate::model::SimulatedEffect)
/// observe the pre-transition state.
pub trait Valuation {
    /// Returns the current value of the given fluent key.
    ///
    /// # Arguments
    /// - `fluent`: The key to resolve.
    ///
    /// # Returns
    /// The key's [`Value`], or [`None`] if the key is unknown.
    fn value_of(&self, fluent: &GroundFluent) -> Option<Value>;
}
impl Valuation for IndexMap<GroundFluent, Value> {
    #[inline]
    fn value_of(&self, fluent: &GroundFluent) -> Option<Value> { self.get(fluent).cloned() }
}





/***** LIBRARY FUNCTIONS *****/
/// Replaces action-parameter references by their bound values.
///
/// Unbound parameters are left untouched; the grounder always binds the full
/// signature, so leftovers surface later as
/// [`Error::UnboundParameter`] at evaluation time.
///
/// # Arguments
/// - `expr`: The expression to substitute in.
/// - `binding`: Maps parameter names to the values they are bound to.
///
/// # Returns
/// An equivalent [`Expr`] without references to the bound parameters.
pub fn substitute(expr: &Expr, binding: &HashMap<Ident, Value>) -> Expr {
    match expr {
        Expr::Param(p) => match binding.get(p) {
            Some(v) => Expr::Value(v.clone()),
            None => expr.clone(),
        },
        Expr::Value(_) | Expr::Object(_) => expr.clone(),
        Expr::Fluent(ident, args) => Expr::Fluent(ident.clone(), args.iter().map(|a| substitute(a, binding)).collect()),

        Expr::Not(e) => Expr::not(substitute(e, binding)),
        Expr::And(es) => Expr::And(es.iter().map(|e| substitute(e, binding)).collect()),
        Expr::Or(es) => Expr::Or(es.iter().map(|e| substitute(e, binding)).collect()),

        Expr::Equals(l, r) => Expr::equals(substitute(l, binding), substitute(r, binding)),
        Expr::Lt(l, r) => Expr::lt(substitute(l, binding), substitute(r, binding)),
        Expr::Le(l, r) => Expr::le(substitute(l, binding), substitute(r, binding)),

        Expr::Plus(es) => Expr::Plus(es.iter().map(|e| substitute(e, binding)).collect()),
        Expr::Minus(l, r) => Expr::minus(substitute(l, binding), substitute(r, binding)),
        Expr::Times(es) => Expr::Times(es.iter().map(|e| substitute(e, binding)).collect()),
        Expr::Div(l, r) => Expr::div(substitute(l, binding), substitute(r, binding)),
    }
}



/// Partially simplifies an expression by constant folding.
///
/// Boolean connectives short-circuit on absorbing constants (a false operand
/// collapses a conjunction even when its siblings are not constant) and drop
/// neutral ones; arithmetic and comparisons fold when every operand is a
/// constant. Anything that cannot be folded is left untouched, including
/// operations whose constants would fail to evaluate; those produce their
/// proper error at evaluation time.
///
/// # Arguments
/// - `expr`: The expression to fold.
///
/// # Returns
/// An equivalent, possibly smaller [`Expr`].
pub fn fold(expr: &Expr) -> Expr {
    /// Tries full constant evaluation on a rebuilt node whose children are already folded.
    fn fold_leaf_op(rebuilt: Expr) -> Expr {
        let all_const = match &rebuilt {
            Expr::Equals(l, r) | Expr::Lt(l, r) | Expr::Le(l, r) | Expr::Minus(l, r) | Expr::Div(l, r) => l.is_constant() && r.is_constant(),
            Expr::Plus(es) | Expr::Times(es) => es.iter().all(Expr::is_constant),
            _ => false,
        };
        if all_const {
            if let Ok(v) = evaluate(&rebuilt, &NoValuation) {
                return Expr::Value(v);
            }
        }
        rebuilt
    }

    match expr {
        Expr::Value(_) | Expr::Param(_) => expr.clone(),
        Expr::Object(o) => Expr::Value(Value::Object(o.clone())),
        Expr::Fluent(ident, args) => Expr::Fluent(ident.clone(), args.iter().map(fold).collect()),

        Expr::Not(e) => match fold(e) {
            Expr::Value(Value::Bool(b)) => Expr::from(!b),
            other => Expr::not(other),
        },
        Expr::And(es) => {
            let mut rest: Vec<Expr> = Vec::with_capacity(es.len());
            for e in es {
                match fold(e) {
                    Expr::Value(Value::Bool(true)) => continue,
                    Expr::Value(Value::Bool(false)) => return Expr::from(false),
                    other => rest.push(other),
                }
            }
            if rest.is_empty() { Expr::from(true) } else { Expr::And(rest) }
        },
        Expr::Or(es) => {
            let mut rest: Vec<Expr> = Vec::with_capacity(es.len());
            for e in es {
                match fold(e) {
                    Expr::Value(Value::Bool(false)) => continue,
                    Expr::Value(Value::Bool(true)) => return Expr::from(true),
                    other => rest.push(other),
                }
            }
            if rest.is_empty() { Expr::from(false) } else { Expr::Or(rest) }
        },

        Expr::Equals(l, r) => fold_leaf_op(Expr::equals(fold(l), fold(r))),
        Expr::Lt(l, r) => fold_leaf_op(Expr::lt(fold(l), fold(r))),
        Expr::Le(l, r) => fold_leaf_op(Expr::le(fold(l), fold(r))),

        Expr::Plus(es) => fold_leaf_op(Expr::Plus(es.iter().map(fold).collect())),
        Expr::Minus(l, r) => fold_leaf_op(Expr::minus(fold(l), fold(r))),
        Expr::Times(es) => fold_leaf_op(Expr::Times(es.iter().map(fold).collect())),
        Expr::Div(l, r) => fold_leaf_op(Expr::div(fold(l), fold(r))),
    }
}



/// Reduces a ground expression to a concrete [`Value`] under a [`Valuation`].
///
/// # Arguments
/// - `expr`: The expression to evaluate.
/// - `valuation`: Resolves fluent keys to their current values.
///
/// # Returns
/// The concrete [`Value`] the expression simplifies to.
///
/// # Errors
/// An [`Error`] when the expression does not simplify to a concrete constant:
/// unknown fluent keys, leftover parameters, kind violations, integer
/// overflow or division by zero.
pub fn evaluate<V: Valuation + ?Sized>(expr: &Expr, valuation: &V) -> Result<Value, Error> {
    match expr {
        Expr::Value(v) => Ok(v.clone()),
        Expr::Object(o) => Ok(Value::Object(o.clone())),
        Expr::Param(p) => Err(Error::UnboundParameter { param: p.clone() }),
        Expr::Fluent(ident, args) => {
            let mut values: Vec<Value> = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, valuation)?);
            }
            let key = GroundFluent { ident: ident.clone(), args: values };
            match valuation.value_of(&key) {
                Some(v) => Ok(v),
                None => Err(Error::UnknownFluent { fluent: key }),
            }
        },

        Expr::Not(e) => Ok(Value::Bool(!eval_bool(e, valuation)?)),
        Expr::And(es) => {
            for e in es {
                if !eval_bool(e, valuation)? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        },
        Expr::Or(es) => {
            for e in es {
                if eval_bool(e, valuation)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        },

        Expr::Equals(l, r) => {
            let lv: Value = evaluate(l, valuation)?;
            let rv: Value = evaluate(r, valuation)?;
            if lv.kind() != rv.kind() {
                return Err(Error::KindMismatch { expr: expr.to_string(), expected: lv.kind(), found: rv.kind() });
            }
            Ok(Value::Bool(lv == rv))
        },
        Expr::Lt(l, r) => {
            let lv: Value = evaluate(l, valuation)?;
            let rv: Value = evaluate(r, valuation)?;
            Ok(Value::Bool(cmp(expr, &lv, &rv)?.is_lt()))
        },
        Expr::Le(l, r) => {
            let lv: Value = evaluate(l, valuation)?;
            let rv: Value = evaluate(r, valuation)?;
            Ok(Value::Bool(cmp(expr, &lv, &rv)?.is_le()))
        },

        Expr::Plus(es) => {
            let mut acc: Value = Value::Int(0);
            for (i, e) in es.iter().enumerate() {
                let v: Value = evaluate(e, valuation)?;
                acc = if i == 0 { v } else { add(expr, acc, v)? };
            }
            Ok(acc)
        },
        Expr::Minus(l, r) => {
            let lv: Value = evaluate(l, valuation)?;
            let rv: Value = evaluate(r, valuation)?;
            sub(expr, lv, rv)
        },
        Expr::Times(es) => {
            let mut acc: Value = Value::Int(1);
            for (i, e) in es.iter().enumerate() {
                let v: Value = evaluate(e, valuation)?;
                acc = if i == 0 { v } else { mul(expr, acc, v)? };
            }
            Ok(acc)
        },
        Expr::Div(l, r) => {
            let lv: Value = evaluate(l, valuation)?;
            let rv: Value = evaluate(r, valuation)?;
            div(expr, lv, rv)
        },
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use num_rational::Rational64;

    use super::*;
    use crate::tests::{make_fluent, make_object};


    /// Builds a little valuation to evaluate against.
    fn make_valuation() -> IndexMap<GroundFluent, Value> {
        IndexMap::from([
            (make_fluent("robot_at", ["kitchen"]), Value::Bool(true)),
            (make_fluent("robot_at", ["hall"]), Value::Bool(false)),
            (make_fluent("battery", []), Value::Int(80)),
            (make_fluent("speed", []), Value::Real(Rational64::new(3, 2))),
        ])
    }


    #[test]
    fn test_evaluate_fluents() {
        let val = make_valuation();
        assert_eq!(evaluate(&Expr::fluent("battery", []), &val), Ok(Value::Int(80)));
        assert_eq!(evaluate(&Expr::fluent("robot_at", [Expr::object("hall")]), &val), Ok(Value::Bool(false)));
        assert!(matches!(evaluate(&Expr::fluent("cargo", []), &val), Err(Error::UnknownFluent { .. })));
    }

    #[test]
    fn test_evaluate_connectives() {
        let val = make_valuation();
        let e: Expr = Expr::and([Expr::fluent("robot_at", [Expr::object("kitchen")]), Expr::not(Expr::fluent("robot_at", [Expr::object("hall")]))]);
        assert_eq!(evaluate(&e, &val), Ok(Value::Bool(true)));
        assert_eq!(evaluate(&Expr::or([Expr::from(false), Expr::from(false)]), &val), Ok(Value::Bool(false)));
        // Empty connectives have their neutral meanings
        assert_eq!(evaluate(&Expr::and([]), &val), Ok(Value::Bool(true)));
        assert_eq!(evaluate(&Expr::or([]), &val), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_evaluate_arithmetic() {
        let val = make_valuation();
        let e: Expr = Expr::minus(Expr::fluent("battery", []), Expr::from(30));
        assert_eq!(evaluate(&e, &val), Ok(Value::Int(50)));
        let e: Expr = Expr::plus([Expr::fluent("speed", []), Expr::from(Rational64::new(1, 2))]);
        assert_eq!(evaluate(&e, &val), Ok(Value::Real(Rational64::new(2, 1))));
        let e: Expr = Expr::le(Expr::from(10), Expr::fluent("battery", []));
        assert_eq!(evaluate(&e, &val), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_evaluate_no_widening() {
        let val = make_valuation();
        let e: Expr = Expr::plus([Expr::fluent("battery", []), Expr::from(Rational64::new(1, 2))]);
        assert!(matches!(evaluate(&e, &val), Err(Error::MixedArithmetic { .. })));
        let e: Expr = Expr::equals(Expr::from(1), Expr::from(Rational64::new(1, 1)));
        assert!(matches!(evaluate(&e, &val), Err(Error::KindMismatch { .. })));
    }

    #[test]
    fn test_evaluate_degenerate_numbers() {
        let val = make_valuation();
        assert!(matches!(evaluate(&Expr::div(Expr::from(1), Expr::from(0)), &val), Err(Error::DivisionByZero { .. })));
        assert!(matches!(evaluate(&Expr::plus([Expr::from(i64::MAX), Expr::from(1)]), &val), Err(Error::Overflow { .. })));
        assert!(matches!(evaluate(&Expr::plus([Expr::from(true), Expr::from(1)]), &val), Err(Error::NotNumeric { .. })));
    }

    #[test]
    fn test_substitute() {
        let binding: HashMap<Ident, Value> = HashMap::from([(Ident::from("from"), make_object("kitchen")), (Ident::from("to"), make_object("hall"))]);
        let e: Expr = Expr::and([Expr::fluent("robot_at", [Expr::param("from")]), Expr::not(Expr::fluent("robot_at", [Expr::param("to")]))]);
        let subbed: Expr = substitute(&e, &binding);
        assert_eq!(subbed.to_string(), "(and (robot_at kitchen) (not (robot_at hall)))");
        // Unbound parameters stay put
        let e: Expr = Expr::param("via");
        assert_eq!(substitute(&e, &binding), Expr::param("via"));
    }

    #[test]
    fn test_fold() {
        // Absorbing constants collapse connectives around non-constant siblings
        let e: Expr = Expr::and([Expr::fluent("robot_at", [Expr::object("kitchen")]), Expr::from(false)]);
        assert_eq!(fold(&e), Expr::from(false));
        let e: Expr = Expr::or([Expr::from(true), Expr::fluent("robot_at", [Expr::object("kitchen")])]);
        assert_eq!(fold(&e), Expr::from(true));
        // Neutral constants drop out
        let e: Expr = Expr::and([Expr::from(true), Expr::fluent("robot_at", [Expr::object("kitchen")])]);
        assert_eq!(fold(&e).to_string(), "(and (robot_at kitchen))");
        // Constant arithmetic folds
        assert_eq!(fold(&Expr::plus([Expr::from(1), Expr::from(2)])), Expr::from(3));
        assert_eq!(fold(&Expr::equals(Expr::object("kitchen"), Expr::object("kitchen"))), Expr::from(true));
        // Non-constant arithmetic stays
        let e: Expr = Expr::minus(Expr::fluent("battery", []), Expr::from(30));
        assert_eq!(fold(&e), e);
        // Fold-resistant degenerate constants stay for evaluation to report
        let e: Expr = Expr::div(Expr::from(1), Expr::from(0));
        assert_eq!(fold(&e), e);
    }
}
