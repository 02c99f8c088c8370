//  MOD.rs
//    by Lut99
//
//  Created:
//    20 Mar 2025, 09:12:40
//  Last edited:
//    01 Aug 2025, 16:12:30
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the grounded form of a [`Problem`](crate::model::Problem): every
//!   action is parameter-free, every fluent key is enumerated and assigned an
//!   initial value, and a back-map records how ground actions rewrite to the
//!   original vocabulary.
//!
//!   Ground problems cannot be authored directly, but only obtained through
//!   [compilation](compile()).
//

// Define the compiler submodule
pub mod compile;

// Imports
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter, Result as FResult};

use indexmap::IndexMap;

use crate::model::expr::{Expr, Value, ValueKind};
use crate::model::{EffectKind, Ident, SimulatedEffectFn};
use crate::plan::ActionInstance;
pub use crate::model::expr::GroundFluent;
pub use compile::compile;


/***** LIBRARY *****/
/// Identifies a [`GroundAction`] by its position in the ground problem's
/// declared action order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ActionId(pub usize);
impl Display for ActionId {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult { write!(f, "#{}", self.0) }
}



/// A fully instantiated effect of a [`GroundAction`].
#[derive(Clone, Debug)]
pub struct GroundEffect {
    /// The fluent key it writes.
    pub fluent:    GroundFluent,
    /// How it writes it.
    pub kind:      EffectKind,
    /// The (parameter-free) value expression.
    pub value:     Expr,
    /// An optional (parameter-free) boolean guard.
    pub condition: Option<Expr>,
}

/// A fully instantiated native effect of a [`GroundAction`].
#[derive(Clone)]
pub struct GroundSimulatedEffect {
    /// The fluent keys it writes, in the order the function returns values for them.
    pub targets: Vec<GroundFluent>,
    /// The caller-supplied function computing those values.
    pub func:    SimulatedEffectFn,
}
impl Debug for GroundSimulatedEffect {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        f.debug_struct("GroundSimulatedEffect").field("targets", &self.targets).field("func", &"<native>").finish()
    }
}

/// A parameter-free instantiation of a lifted action.
///
/// The preconditions and effect expressions reference fluent keys and
/// constants only; evaluation against a state cannot encounter parameters
/// anymore.
#[derive(Clone, Debug)]
pub struct GroundAction {
    /// The generated name, e.g. `move(kitchen, hall)`.
    pub ident:         Ident,
    /// The conjunctive precondition set. Statically true members are already dropped.
    pub preconditions: Vec<Expr>,
    /// The instantiated effects.
    pub effects:       Vec<GroundEffect>,
    /// The instantiated native effect, if the lifted action declared one.
    pub simulated:     Option<GroundSimulatedEffect>,
}
impl Display for GroundAction {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult { write!(f, "{}", self.ident) }
}



/// A grounded planning problem: the input shape for the
/// [`Domain`](crate::domain::Domain).
#[derive(Clone, Debug)]
pub struct GroundProblem {
    /// The name of the problem it was compiled from.
    pub ident:     Ident,
    /// The parameter-free actions, in grounding order.
    pub actions:   Vec<GroundAction>,
    /// The declared kind of every fluent name.
    pub kinds:     HashMap<Ident, ValueKind>,
    /// The initial value of every fluent key. Its enumeration order is the
    /// fixed key sequence of every state of this problem.
    pub init:      IndexMap<GroundFluent, Value>,
    /// The conjunctive goal set, statically folded.
    pub goals:     Vec<Expr>,
    /// For every action (positionally), how it rewrites back to the original
    /// problem's vocabulary.
    pub instances: Vec<ActionInstance>,
}
impl GroundProblem {
    /// Returns the action with the given identifier.
    ///
    /// # Arguments
    /// - `id`: The [`ActionId`] to resolve.
    ///
    /// # Returns
    /// The matching [`GroundAction`], or [`None`] if the identifier is out of range.
    #[inline]
    pub fn action(&self, id: ActionId) -> Option<&GroundAction> { self.actions.get(id.0) }

    /// Returns all actions together with their identifiers, in declared order.
    ///
    /// # Returns
    /// An [`Iterator`] yielding `(ActionId, &GroundAction)` pairs.
    #[inline]
    pub fn actions(&self) -> impl '_ + Iterator<Item = (ActionId, &GroundAction)> { self.actions.iter().enumerate().map(|(i, a)| (ActionId(i), a)) }

    /// Returns the rewrite-back instance for the given action.
    ///
    /// # Arguments
    /// - `id`: The [`ActionId`] to resolve.
    ///
    /// # Returns
    /// The matching [`ActionInstance`], or [`None`] if the identifier is out of range.
    #[inline]
    pub fn instance(&self, id: ActionId) -> Option<&ActionInstance> { self.instances.get(id.0) }

    /// Returns the declared kind of the given fluent name.
    ///
    /// # Arguments
    /// - `ident`: The fluent name to look up.
    ///
    /// # Returns
    /// The declared [`ValueKind`], or [`None`] if no such fluent was declared.
    #[inline]
    pub fn fluent_kind(&self, ident: &Ident) -> Option<ValueKind> { self.kinds.get(ident).copied() }
}
