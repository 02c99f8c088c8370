//  MOD.rs
//    by Lut99
//
//  Created:
//    24 Mar 2025, 13:58:10
//  Last edited:
//    01 Aug 2025, 16:18:37
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the [`Domain`]: a deterministic state-transition and
//!   goal-test interface over a grounded planning problem, shaped the way a
//!   generic state-space search procedure expects it.
//!
//!   A domain is built once per solver invocation, holds the grounded
//!   problem as a read-only snapshot and produces fresh [`State`]s from
//!   every transition. It performs no I/O and never blocks; cancellation and
//!   timeouts belong to whoever drives it.
//

// Modules
pub mod state;

// Imports
use std::cell::RefCell;
use std::error;
use std::fmt::{Debug, Display, Formatter, Result as FResult};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::eval::{self, evaluate, Valuation};
use crate::ground::{compile, ActionId, GroundAction, GroundFluent, GroundProblem};
use crate::log::trace;
use crate::model::expr::{Expr, Value};
use crate::model::{EffectKind, Problem};
use crate::plan::SequentialPlan;
pub use state::State;


/***** ERRORS *****/
/// Defines the ways in which a transition can fail.
///
/// [`Error::Inapplicable`] is the one a search procedure should expect and
/// treat as a dead branch; it is also recorded as the domain's
/// [last error](Domain::last_error()). Everything else signals a malformed
/// problem and is not worth retrying.
#[derive(Debug)]
pub enum Error {
    /// The given action identifier does not belong to this domain.
    UnknownAction { id: ActionId },
    /// A precondition evaluated to false.
    Inapplicable { action: crate::model::Ident, precondition: String },
    /// Two effects wrote different values to one fluent in the same transition.
    Conflict { action: crate::model::Ident, fluent: GroundFluent },
    /// A native effect function reported a failure.
    Simulated { action: crate::model::Ident, message: String },
    /// A native effect function returned the wrong number of values.
    SimulatedArity { action: crate::model::Ident, expected: usize, found: usize },
    /// An expression failed to simplify to the constant it had to.
    Eval { err: eval::Error },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::UnknownAction { id } => write!(f, "Action {id} does not belong to this domain"),
            Self::Inapplicable { action, precondition } => write!(f, "Precondition {precondition} of action {action} is not satisfied"),
            Self::Conflict { action, fluent } => write!(f, "Action {action} writes conflicting values to fluent \"{fluent}\" in one transition"),
            Self::Simulated { action, message } => write!(f, "Native effect of action {action} failed: {message}"),
            Self::SimulatedArity { action, expected, found } => {
                write!(f, "Native effect of action {action} returned {found} value(s) for {expected} declared target(s)")
            },
            Self::Eval { .. } => write!(f, "Failed to evaluate expression"),
        }
    }
}
impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Eval { err } => Some(err),
            _ => None,
        }
    }
}
impl From<eval::Error> for Error {
    #[inline]
    fn from(value: eval::Error) -> Self { Self::Eval { err: value } }
}





/***** AUXILLARY *****/
/// Resolves fluent keys against a [`State`] through the domain's key sequence.
///
/// This is the [`Valuation`] handed to expression evaluation and to
/// [native effects](crate::model::SimulatedEffect).
#[derive(Clone, Copy, Debug)]
pub struct StateView<'d> {
    /// The domain's fixed key sequence.
    keys:   &'d IndexSet<GroundFluent>,
    /// The state's values, positionally aligned to `keys`.
    values: &'d [Value],
}
impl Valuation for StateView<'_> {
    #[inline]
    fn value_of(&self, fluent: &GroundFluent) -> Option<Value> { self.keys.get_index_of(fluent).map(|i| self.values[i].clone()) }
}



/// Decides what a transition costs.
///
/// The simulated problems carry no canonical cost fluent, so the
/// per-transition value is explicit configuration instead of a guessed
/// formula. The default is [`CostModel::Unit`].
#[derive(Clone)]
pub enum CostModel {
    /// Every transition costs `1.0`.
    Unit,
    /// Every transition costs the given amount.
    Constant(f64),
    /// A caller-supplied function of the transition.
    Custom(Arc<dyn Fn(&State, &GroundAction, &State) -> f64 + Send + Sync>),
}
impl Debug for CostModel {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::Unit => write!(f, "CostModel::Unit"),
            Self::Constant(c) => write!(f, "CostModel::Constant({c})"),
            Self::Custom(_) => write!(f, "CostModel::Custom(<native>)"),
        }
    }
}
impl Default for CostModel {
    #[inline]
    fn default() -> Self { Self::Unit }
}





/***** LIBRARY *****/
/// A deterministic state-transition and goal-test interface over a grounded
/// planning problem.
///
/// The fluent-key sequence is fixed at construction time from the grounded
/// problem's initial-value enumeration order; every [`State`] this domain
/// produces aligns to it positionally.
#[derive(Debug)]
pub struct Domain {
    /// The grounded problem, as a read-only snapshot.
    ground:     GroundProblem,
    /// The fixed fluent-key sequence.
    keys:       IndexSet<GroundFluent>,
    /// The initial values, in key order.
    init:       Vec<Value>,
    /// What a transition costs.
    cost:       CostModel,
    /// The last inapplicability, for search procedures that want to know why
    /// a branch died.
    last_error: RefCell<Option<String>>,
}
impl Domain {
    /// Constructor for a Domain that grounds the given problem first.
    ///
    /// # Arguments
    /// - `problem`: The lifted [`Problem`] to ground and simulate.
    ///
    /// # Returns
    /// A new Domain over the compiled problem.
    ///
    /// # Errors
    /// A [`compile::Error`](crate::ground::compile::Error) if the problem
    /// cannot be grounded.
    #[inline]
    pub fn new(problem: &Problem) -> Result<Self, crate::ground::compile::Error> { Ok(Self::from_ground(compile(problem)?)) }

    /// Constructor for a Domain over an already-grounded problem.
    ///
    /// # Arguments
    /// - `ground`: The [`GroundProblem`] to simulate.
    ///
    /// # Returns
    /// A new Domain.
    pub fn from_ground(ground: GroundProblem) -> Self {
        let keys: IndexSet<GroundFluent> = ground.init.keys().cloned().collect();
        let init: Vec<Value> = ground.init.values().cloned().collect();
        trace!("Domain over '{}': {} fluent key(s), {} action(s)", ground.ident, keys.len(), ground.actions.len());
        Self { ground, keys, init, cost: CostModel::default(), last_error: RefCell::new(None) }
    }

    /// Installs a [`CostModel`] on this domain.
    ///
    /// # Arguments
    /// - `cost`: The model deciding what [`transition_value()`](Domain::transition_value()) reports.
    ///
    /// # Returns
    /// The same Domain, with the model installed.
    #[inline]
    pub fn with_cost_model(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }



    /// Returns the initial state and clears the recorded last error.
    ///
    /// # Returns
    /// A fresh [`State`] carrying the grounded problem's initial values.
    #[inline]
    pub fn reset(&self) -> State {
        *self.last_error.borrow_mut() = None;
        State::new(self.init.clone())
    }

    /// Applies an action to a state, producing the successor state.
    ///
    /// Every effect is computed against the _pre_-transition state: no effect
    /// observes another effect's result within the same transition. The input
    /// state is never mutated.
    ///
    /// # Arguments
    /// - `state`: The [`State`] to transition from.
    /// - `id`: The [`ActionId`] of the action to apply.
    ///
    /// # Returns
    /// A fresh [`State`] over the same key sequence, with non-affected keys
    /// unchanged.
    ///
    /// # Errors
    /// An [`Error::Inapplicable`] (also recorded as the
    /// [last error](Domain::last_error())) if a precondition is violated; an
    /// [`Error::Conflict`] on contradictory simultaneous writes; an
    /// [`Error::Eval`] if an expression fails to simplify to the constant it
    /// has to.
    pub fn get_successor(&self, state: &State, id: ActionId) -> Result<State, Error> {
        let Some(action) = self.ground.action(id) else {
            return Err(Error::UnknownAction { id });
        };
        let view = StateView { keys: &self.keys, values: state.values() };
        trace!("Attempting transition '{}'", action.ident);

        // Every precondition must hold concretely before anything is applied
        for pre in &action.preconditions {
            match evaluate(pre, &view)? {
                Value::Bool(true) => continue,
                Value::Bool(false) => {
                    let err = Error::Inapplicable { action: action.ident.clone(), precondition: pre.to_string() };
                    *self.last_error.borrow_mut() = Some(err.to_string());
                    trace!("--> {err}");
                    return Err(err);
                },
                v => return Err(Error::Eval { err: eval::Error::NotBoolean { expr: pre.to_string(), found: v.kind() } }),
            }
        }

        // Stage all writes against the pre-transition view
        let mut staged: IndexMap<usize, Value> = IndexMap::new();
        for effect in &action.effects {
            // False guards skip the effect
            if let Some(guard) = &effect.condition {
                match evaluate(guard, &view)? {
                    Value::Bool(true) => {},
                    Value::Bool(false) => {
                        trace!("--> Guard '{guard}' skips the effect on '{}'", effect.fluent);
                        continue;
                    },
                    v => return Err(Error::Eval { err: eval::Error::NotBoolean { expr: guard.to_string(), found: v.kind() } }),
                }
            }

            let Some(index) = self.keys.get_index_of(&effect.fluent) else {
                return Err(Error::Eval { err: eval::Error::UnknownFluent { fluent: effect.fluent.clone() } });
            };
            let current: &Value = &state.values()[index];
            let value: Value = evaluate(&effect.value, &view)?;
            let new: Value = match effect.kind {
                EffectKind::Assign => {
                    if value.kind() != current.kind() {
                        return Err(Error::Eval { err: eval::Error::KindMismatch {
                            expr:     effect.value.to_string(),
                            expected: current.kind(),
                            found:    value.kind(),
                        } });
                    }
                    value
                },
                // Same trick as the wrapped simplifier: build the sum over the
                // current value and simplify it, inheriting the strict
                // integer/rational arithmetic
                EffectKind::Increase => evaluate(&Expr::plus([Expr::Value(current.clone()), Expr::Value(value)]), &view)?,
                EffectKind::Decrease => evaluate(&Expr::minus(Expr::Value(current.clone()), Expr::Value(value)), &view)?,
            };
            trace!("--> Effect stages '{}' := '{new}'", effect.fluent);
            match staged.get(&index) {
                Some(prev) if prev != &new => return Err(Error::Conflict { action: action.ident.clone(), fluent: self.keys[index].clone() }),
                _ => {
                    staged.insert(index, new);
                },
            }
        }

        // The native effect observes the same pre-transition view and merges
        // under the same conflict rule
        if let Some(sim) = &action.simulated {
            let values: Vec<Value> = (sim.func)(&self.ground, &view).map_err(|message| Error::Simulated { action: action.ident.clone(), message })?;
            if values.len() != sim.targets.len() {
                return Err(Error::SimulatedArity { action: action.ident.clone(), expected: sim.targets.len(), found: values.len() });
            }
            for (target, value) in sim.targets.iter().zip(values) {
                let Some(index) = self.keys.get_index_of(target) else {
                    return Err(Error::Eval { err: eval::Error::UnknownFluent { fluent: target.clone() } });
                };
                let current: &Value = &state.values()[index];
                if value.kind() != current.kind() {
                    return Err(Error::Eval { err: eval::Error::KindMismatch { expr: target.to_string(), expected: current.kind(), found: value.kind() } });
                }
                trace!("--> Native effect stages '{target}' := '{value}'");
                match staged.get(&index) {
                    Some(prev) if prev != &value => return Err(Error::Conflict { action: action.ident.clone(), fluent: target.clone() }),
                    _ => {
                        staged.insert(index, value);
                    },
                }
            }
        }

        // Merge the staged writes over the prior values
        let mut values: Vec<Value> = state.values().to_vec();
        for (index, value) in staged {
            values[index] = value;
        }
        trace!("--> Transition '{}' OK", action.ident);
        Ok(State::new(values))
    }

    /// Returns whether a state satisfies the goal condition.
    ///
    /// # Arguments
    /// - `state`: The [`State`] to test.
    ///
    /// # Returns
    /// True iff every goal expression evaluates to a concrete true.
    ///
    /// # Errors
    /// An [`eval::Error`] if a goal fails to simplify to a concrete boolean.
    /// That is never a normal false; it means the problem is malformed.
    pub fn is_goal(&self, state: &State) -> Result<bool, eval::Error> {
        let view = StateView { keys: &self.keys, values: state.values() };
        for goal in &self.ground.goals {
            match evaluate(goal, &view)? {
                Value::Bool(true) => continue,
                Value::Bool(false) => return Ok(false),
                v => return Err(eval::Error::NotBoolean { expr: goal.to_string(), found: v.kind() }),
            }
        }
        Ok(true)
    }

    /// Returns the actions whose full precondition set holds in a state.
    ///
    /// # Arguments
    /// - `state`: The [`State`] to filter against.
    ///
    /// # Returns
    /// The applicable [`ActionId`]s, in the ground problem's declared action
    /// order.
    ///
    /// # Errors
    /// An [`eval::Error`] if a precondition fails to simplify to a concrete
    /// boolean.
    pub fn get_applicable_actions(&self, state: &State) -> Result<Vec<ActionId>, eval::Error> {
        let view = StateView { keys: &self.keys, values: state.values() };
        let mut ids: Vec<ActionId> = Vec::new();
        'actions: for (id, action) in self.ground.actions() {
            for pre in &action.preconditions {
                match evaluate(pre, &view)? {
                    Value::Bool(true) => continue,
                    Value::Bool(false) => continue 'actions,
                    v => return Err(eval::Error::NotBoolean { expr: pre.to_string(), found: v.kind() }),
                }
            }
            ids.push(id);
        }
        Ok(ids)
    }

    /// Returns all actions of this domain, applicable or not.
    ///
    /// # Returns
    /// The full [`GroundAction`] slice, in declared order.
    #[inline]
    pub fn get_action_space(&self) -> &[GroundAction] { &self.ground.actions }

    /// Rewrites a plan over ground actions into one over the original
    /// problem's actions.
    ///
    /// Purely structural and order-preserving; nothing is re-evaluated.
    ///
    /// # Arguments
    /// - `plan`: The ground plan, as the [`ActionId`]s that were applied, in order.
    ///
    /// # Returns
    /// The corresponding [`SequentialPlan`] in the original vocabulary.
    ///
    /// # Errors
    /// An [`Error::UnknownAction`] if an identifier does not belong to this
    /// domain.
    pub fn rewrite_back(&self, plan: &[ActionId]) -> Result<SequentialPlan, Error> {
        let mut actions = Vec::with_capacity(plan.len());
        for id in plan {
            match self.ground.instance(*id) {
                Some(instance) => actions.push(instance.clone()),
                None => return Err(Error::UnknownAction { id: *id }),
            }
        }
        Ok(SequentialPlan { actions })
    }

    /// Reports the cost of a transition under the installed [`CostModel`].
    ///
    /// # Arguments
    /// - `state`: The [`State`] the transition left.
    /// - `id`: The [`ActionId`] of the applied action.
    /// - `next`: The [`State`] the transition produced.
    ///
    /// # Returns
    /// The transition's cost.
    ///
    /// # Errors
    /// An [`Error::UnknownAction`] if the identifier does not belong to this
    /// domain.
    pub fn transition_value(&self, state: &State, id: ActionId, next: &State) -> Result<f64, Error> {
        let Some(action) = self.ground.action(id) else {
            return Err(Error::UnknownAction { id });
        };
        match &self.cost {
            CostModel::Unit => Ok(1.0),
            CostModel::Constant(c) => Ok(*c),
            CostModel::Custom(func) => Ok(func(state, action, next)),
        }
    }



    /// Returns the grounded problem this domain simulates.
    #[inline]
    pub fn ground(&self) -> &GroundProblem { &self.ground }

    /// Returns the action with the given identifier.
    ///
    /// # Arguments
    /// - `id`: The [`ActionId`] to resolve.
    ///
    /// # Returns
    /// The matching [`GroundAction`], or [`None`] if the identifier is out of range.
    #[inline]
    pub fn action(&self, id: ActionId) -> Option<&GroundAction> { self.ground.action(id) }

    /// Returns the fixed fluent-key sequence of this domain.
    ///
    /// # Returns
    /// An [`Iterator`] over the keys, in the order states align to.
    #[inline]
    pub fn keys(&self) -> impl '_ + Iterator<Item = &GroundFluent> { self.keys.iter() }

    /// Returns the position of a fluent key in the key sequence.
    #[inline]
    pub fn key_index(&self, fluent: &GroundFluent) -> Option<usize> { self.keys.get_index_of(fluent) }

    /// Returns the value a state assigns to a fluent key.
    ///
    /// # Arguments
    /// - `state`: The [`State`] to read.
    /// - `fluent`: The key to resolve.
    ///
    /// # Returns
    /// The assigned [`Value`], or [`None`] if the key is not part of this
    /// domain's sequence.
    #[inline]
    pub fn state_value<'s>(&self, state: &'s State, fluent: &GroundFluent) -> Option<&'s Value> {
        self.keys.get_index_of(fluent).and_then(|i| state.value(i))
    }

    /// Returns a [`Valuation`] view of a state, for evaluating custom
    /// expressions against it.
    #[inline]
    pub fn view<'d>(&'d self, state: &'d State) -> StateView<'d> { StateView { keys: &self.keys, values: state.values() } }

    /// Returns the message of the last failed transition, if any.
    ///
    /// Cleared by [`reset()`](Domain::reset()).
    #[inline]
    pub fn last_error(&self) -> Option<String> { self.last_error.borrow().clone() }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, Effect, Fluent, SimulatedEffect, ValueKind};
    use crate::tests::{make_fluent, make_robot_problem, setup_logger};


    /// Builds the smallest interesting domain: one boolean fluent `done`,
    /// one action `finish` flipping it, one goal demanding it.
    fn make_done_problem() -> Problem {
        let mut problem = Problem::new("done");
        problem.add_fluent(Fluent::new("done", ValueKind::Bool, []));
        problem.set_initial_value(make_fluent("done", []), false);
        problem.add_action(
            Action::new("finish", [])
                .precondition(Expr::equals(Expr::fluent("done", []), Expr::from(false)))
                .effect(Effect::assign("done", [], true)),
        );
        problem.add_goal(Expr::equals(Expr::fluent("done", []), Expr::from(true)));
        problem
    }


    #[test]
    fn test_domain_done_end_to_end() {
        setup_logger();

        let domain = Domain::new(&make_done_problem()).unwrap();
        let state: State = domain.reset();
        assert_eq!(state.values(), &[Value::Bool(false)]);

        // Exactly `finish` is applicable
        let applicable: Vec<ActionId> = domain.get_applicable_actions(&state).unwrap();
        assert_eq!(applicable, vec![ActionId(0)]);
        assert!(!domain.is_goal(&state).unwrap());

        // Applying it reaches the goal
        let next: State = domain.get_successor(&state, ActionId(0)).unwrap();
        assert_eq!(next.values(), &[Value::Bool(true)]);
        assert!(domain.is_goal(&next).unwrap());
        assert!(domain.get_applicable_actions(&next).unwrap().is_empty());

        // And the rewritten plan is `[finish]`
        assert_eq!(domain.rewrite_back(&applicable).unwrap().to_string(), "[finish]");
    }

    #[test]
    fn test_domain_key_sequence_is_stable() {
        let domain = Domain::new(&make_robot_problem()).unwrap();
        let state: State = domain.reset();
        assert_eq!(state.len(), domain.keys().count());

        let next: State = domain.get_successor(&state, ActionId(0)).unwrap();
        assert_eq!(next.len(), state.len());
        // Non-affected keys are untouched, affected ones moved
        assert_eq!(domain.state_value(&next, &make_fluent("robot_at", ["kitchen"])), Some(&Value::Bool(false)));
        assert_eq!(domain.state_value(&next, &make_fluent("robot_at", ["hall"])), Some(&Value::Bool(true)));
        assert_eq!(domain.state_value(&next, &make_fluent("battery", [])), Some(&Value::Int(90)));
        // And the input state is untouched altogether
        assert_eq!(domain.state_value(&state, &make_fluent("robot_at", ["kitchen"])), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_domain_inapplicable_is_an_error() {
        let domain = Domain::new(&make_robot_problem()).unwrap();
        let state: State = domain.reset();

        // `move(hall, kitchen)` is not applicable at reset...
        assert!(!domain.get_applicable_actions(&state).unwrap().contains(&ActionId(1)));
        // ...so attempting it must fail, never silently return a state
        let err = domain.get_successor(&state, ActionId(1)).unwrap_err();
        assert!(matches!(err, Error::Inapplicable { .. }), "unexpected error {err:?}");
        assert!(domain.last_error().unwrap().contains("move(hall, kitchen)"));

        // Resetting clears the recorded error
        let _ = domain.reset();
        assert!(domain.last_error().is_none());
    }

    #[test]
    fn test_domain_unknown_action() {
        let domain = Domain::new(&make_done_problem()).unwrap();
        let state: State = domain.reset();
        assert!(matches!(domain.get_successor(&state, ActionId(42)), Err(Error::UnknownAction { .. })));
    }

    #[test]
    fn test_domain_effects_observe_pre_state() {
        // `{x := x + 1, y := x}` from `{x: 1, y: 0}` must yield `{x: 2, y: 1}`
        let mut problem = Problem::new("simultaneous");
        problem.add_fluent(Fluent::new("x", ValueKind::Int, []));
        problem.add_fluent(Fluent::new("y", ValueKind::Int, []));
        problem.set_initial_value(make_fluent("x", []), 1);
        problem.set_initial_value(make_fluent("y", []), 0);
        problem.add_action(
            Action::new("step", [])
                .effect(Effect::assign("x", [], Expr::plus([Expr::fluent("x", []), Expr::from(1)])))
                .effect(Effect::assign("y", [], Expr::fluent("x", []))),
        );

        let domain = Domain::new(&problem).unwrap();
        let next: State = domain.get_successor(&domain.reset(), ActionId(0)).unwrap();
        assert_eq!(next.values(), &[Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn test_domain_conditional_effects() {
        let mut problem = Problem::new("guarded");
        problem.add_fluent(Fluent::new("hot", ValueKind::Bool, []));
        problem.add_fluent(Fluent::new("temp", ValueKind::Int, []));
        problem.set_initial_value(make_fluent("hot", []), false);
        problem.set_initial_value(make_fluent("temp", []), 20);
        problem.add_action(
            Action::new("tick", [])
                .effect(Effect::increase("temp", [], 5).when(Expr::fluent("hot", [])))
                .effect(Effect::assign("hot", [], true)),
        );

        let domain = Domain::new(&problem).unwrap();
        let state: State = domain.reset();
        // First tick: the guard is still false, so only `hot` flips
        let state: State = domain.get_successor(&state, ActionId(0)).unwrap();
        assert_eq!(domain.state_value(&state, &make_fluent("temp", [])), Some(&Value::Int(20)));
        // Second tick: now the guard holds and the temperature moves
        let state: State = domain.get_successor(&state, ActionId(0)).unwrap();
        assert_eq!(domain.state_value(&state, &make_fluent("temp", [])), Some(&Value::Int(25)));
    }

    #[test]
    fn test_domain_conflicting_writes() {
        let mut problem = Problem::new("conflicted");
        problem.add_fluent(Fluent::new("x", ValueKind::Int, []));
        problem.set_initial_value(make_fluent("x", []), 0);
        problem.add_action(Action::new("tear", []).effect(Effect::assign("x", [], 1)).effect(Effect::assign("x", [], 2)));
        problem.add_action(Action::new("agree", []).effect(Effect::assign("x", [], 1)).effect(Effect::assign("x", [], 1)));

        let domain = Domain::new(&problem).unwrap();
        let state: State = domain.reset();
        assert!(matches!(domain.get_successor(&state, ActionId(0)), Err(Error::Conflict { .. })));
        // Identical writes merge silently
        assert_eq!(domain.get_successor(&state, ActionId(1)).unwrap().values(), &[Value::Int(1)]);
    }

    #[test]
    fn test_domain_simulated_effects() {
        let mut problem = make_robot_problem();
        problem.add_action(Action::new("fast_charge", []).simulate(SimulatedEffect::new(
            [(crate::model::Ident::from("battery"), vec![])],
            |_, state: &dyn Valuation| {
                let battery = state.value_of(&make_fluent("battery", [])).and_then(|v| v.as_int()).ok_or("battery is gone")?;
                Ok(vec![Value::Int((battery + 100).min(100))])
            },
        )));

        let domain = Domain::new(&problem).unwrap();
        let state: State = domain.reset();
        let next: State = domain.get_successor(&state, ActionId(2)).unwrap();
        assert_eq!(domain.state_value(&next, &make_fluent("battery", [])), Some(&Value::Int(100)));
    }

    #[test]
    fn test_domain_simulated_arity() {
        let mut problem = make_robot_problem();
        problem.add_action(
            Action::new("confused", []).simulate(SimulatedEffect::new([(crate::model::Ident::from("battery"), vec![])], |_, _| Ok(vec![]))),
        );

        let domain = Domain::new(&problem).unwrap();
        let state: State = domain.reset();
        assert!(matches!(domain.get_successor(&state, ActionId(2)), Err(Error::SimulatedArity { expected: 1, found: 0, .. })));
    }

    #[test]
    fn test_domain_is_goal_is_pure() {
        let domain = Domain::new(&make_robot_problem()).unwrap();
        let state: State = domain.reset();
        assert_eq!(domain.is_goal(&state).unwrap(), domain.is_goal(&state).unwrap());
        let again: State = domain.reset();
        assert_eq!(state, again);
        assert_eq!(domain.is_goal(&again).unwrap(), false);
    }

    #[test]
    fn test_domain_transition_value() {
        let domain = Domain::new(&make_robot_problem()).unwrap();
        let state: State = domain.reset();
        let next: State = domain.get_successor(&state, ActionId(0)).unwrap();
        assert_eq!(domain.transition_value(&state, ActionId(0), &next).unwrap(), 1.0);

        let domain = Domain::new(&make_robot_problem()).unwrap().with_cost_model(CostModel::Constant(2.5));
        assert_eq!(domain.transition_value(&state, ActionId(0), &next).unwrap(), 2.5);

        // A custom model can, e.g., charge for the battery drained
        let domain = Domain::new(&make_robot_problem()).unwrap().with_cost_model(CostModel::Custom(Arc::new(|state, _, next| {
            let drained = state.values()[2].as_int().unwrap_or(0) - next.values()[2].as_int().unwrap_or(0);
            drained as f64
        })));
        assert_eq!(domain.transition_value(&state, ActionId(0), &next).unwrap(), 10.0);
    }

    #[test]
    fn test_domain_rewrite_back_preserves_order() {
        let domain = Domain::new(&make_robot_problem()).unwrap();
        let plan: SequentialPlan = domain.rewrite_back(&[ActionId(0), ActionId(1), ActionId(0)]).unwrap();
        assert_eq!(plan.to_string(), "[move(kitchen, hall), move(hall, kitchen), move(kitchen, hall)]");
        assert!(matches!(domain.rewrite_back(&[ActionId(7)]), Err(Error::UnknownAction { .. })));
    }
}
