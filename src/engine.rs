//  ENGINE.rs
//    by Lut99
//
//  Created:
//    02 Apr 2025, 11:21:48
//  Last edited:
//    01 Aug 2025, 16:24:19
//  Auto updated?
//    Yes
//
//  Description:
//!   Drives an external [`Solver`] through a [`Domain`] and turns the result
//!   into a [`SequentialPlan`] over the original problem's actions.
//!
//!   The engine does not search; it grounds the problem, hands the domain to
//!   the solver, rolls the solver's policy out step by step and rewrites the
//!   applied actions back into the original vocabulary. Anything that
//!   resembles search lives on the other side of the [`Solver`] trait.
//

// Imports
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use crate::domain::{CostModel, Domain, State};
use crate::ground::ActionId;
use crate::log::{debug, trace};
use crate::model::Problem;
use crate::plan::SequentialPlan;


/***** CONSTANTS *****/
/// The default bound on the number of rollout steps before the engine gives up.
pub const DEFAULT_MAX_STEPS: usize = 10_000;





/***** ERRORS *****/
/// Defines the ways in which driving a solver can fail.
#[derive(Debug)]
pub enum Error {
    /// The problem did not ground.
    Ground { err: crate::ground::compile::Error },
    /// The solver declared itself incompatible with the domain.
    Incompatible { solver: String },
    /// The solver itself failed.
    Solver { solver: String, err: Box<dyn error::Error + Send + Sync> },
    /// The solver's policy produced a failing transition during rollout.
    Transition { err: crate::domain::Error },
    /// A goal expression failed to simplify to a concrete boolean.
    Eval { err: crate::eval::Error },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::Ground { .. } => write!(f, "Failed to ground the problem"),
            Self::Incompatible { solver } => write!(f, "Solver \"{solver}\" is not compatible with this domain"),
            Self::Solver { solver, .. } => write!(f, "Solver \"{solver}\" failed"),
            Self::Transition { .. } => write!(f, "The solver's policy produced a failing transition"),
            Self::Eval { .. } => write!(f, "Failed to evaluate the goal condition"),
        }
    }
}
impl error::Error for Error {
    #[inline]
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Ground { err } => Some(err),
            Self::Incompatible { .. } => None,
            Self::Solver { err, .. } => Some(&**err),
            Self::Transition { err } => Some(err),
            Self::Eval { err } => Some(err),
        }
    }
}
impl From<crate::ground::compile::Error> for Error {
    #[inline]
    fn from(value: crate::ground::compile::Error) -> Self { Self::Ground { err: value } }
}
impl From<crate::domain::Error> for Error {
    #[inline]
    fn from(value: crate::domain::Error) -> Self { Self::Transition { err: value } }
}
impl From<crate::eval::Error> for Error {
    #[inline]
    fn from(value: crate::eval::Error) -> Self { Self::Eval { err: value } }
}





/***** INTERFACES *****/
/// The seam to the external search procedure.
///
/// A solver prepares whatever policy it likes in [`solve()`](Solver::solve())
/// and is then asked for one action at a time while the engine rolls the
/// policy out. Solvers read the domain through its public interface
/// ([`get_applicable_actions()`](Domain::get_applicable_actions()),
/// [`get_successor()`](Domain::get_successor()),
/// [`is_goal()`](Domain::is_goal()),
/// [`transition_value()`](Domain::transition_value())) and never mutate it.
pub trait Solver {
    /// Returns the name of this solver, for error reporting.
    ///
    /// # Returns
    /// A human-readable name.
    #[inline]
    fn name(&self) -> &str { "solver" }

    /// Returns whether this solver can handle the given domain.
    ///
    /// # Arguments
    /// - `domain`: The [`Domain`] it would be asked to solve.
    ///
    /// # Returns
    /// True to accept; false makes the engine fail with
    /// [`Error::Incompatible`] before any search happens.
    #[inline]
    fn supports(&self, domain: &Domain) -> bool {
        let _ = domain;
        true
    }

    /// Prepares a policy for the given domain.
    ///
    /// # Arguments
    /// - `domain`: The [`Domain`] to solve.
    ///
    /// # Errors
    /// Whatever the solver wants; the engine wraps it in [`Error::Solver`].
    fn solve(&mut self, domain: &Domain) -> Result<(), Box<dyn error::Error + Send + Sync>>;

    /// Samples the policy's action for the given state.
    ///
    /// # Arguments
    /// - `domain`: The [`Domain`] being rolled out.
    /// - `state`: The current [`State`].
    ///
    /// # Returns
    /// The [`ActionId`] to apply next, or [`None`] if the policy has nothing
    /// to offer for this state.
    fn sample_action(&mut self, domain: &Domain, state: &State) -> Option<ActionId>;
}





/***** AUXILLARY *****/
/// Configuration for an [`Engine`].
#[derive(Clone, Debug)]
pub struct Options {
    /// The bound on the number of rollout steps before the engine reports
    /// [`Status::Timeout`].
    pub max_steps: usize,
    /// The [`CostModel`] installed on the domain the solver sees.
    pub cost:      CostModel,
}
impl Default for Options {
    #[inline]
    fn default() -> Self { Self { max_steps: DEFAULT_MAX_STEPS, cost: CostModel::default() } }
}



/// How a solve attempt ended.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    /// The rollout reached the goal. No optimality is claimed.
    SolvedSatisficing,
    /// The policy had no action to offer before the goal was reached.
    UnsolvableIncompletely,
    /// The rollout hit the step bound.
    Timeout,
}
impl Display for Status {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::SolvedSatisficing => write!(f, "solved (satisficing)"),
            Self::UnsolvableIncompletely => write!(f, "unsolvable (incomplete)"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// The outcome of [`Engine::solve()`].
#[derive(Clone, Debug)]
pub struct PlanGenerationResult {
    /// How the attempt ended.
    pub status: Status,
    /// The found plan, in the original problem's vocabulary. Only present on
    /// [`Status::SolvedSatisficing`].
    pub plan:   Option<SequentialPlan>,
    /// The name of the engine that produced this result.
    pub engine: String,
}





/***** LIBRARY *****/
/// Drives a [`Solver`] through a [`Domain`] built from a lifted
/// [`Problem`].
#[derive(Debug)]
pub struct Engine<S> {
    /// The solver to drive.
    solver:  S,
    /// The engine's configuration.
    options: Options,
}
impl<S: Solver> Engine<S> {
    /// Constructor for an Engine with default [`Options`].
    ///
    /// # Arguments
    /// - `solver`: The [`Solver`] to drive.
    ///
    /// # Returns
    /// A new Engine.
    #[inline]
    pub fn new(solver: S) -> Self { Self::with_options(solver, Options::default()) }

    /// Constructor for an Engine.
    ///
    /// # Arguments
    /// - `solver`: The [`Solver`] to drive.
    /// - `options`: The [`Options`] to drive it with.
    ///
    /// # Returns
    /// A new Engine.
    #[inline]
    pub fn with_options(solver: S, options: Options) -> Self { Self { solver, options } }

    /// Returns the name of this engine.
    #[inline]
    pub fn name(&self) -> &'static str { env!("CARGO_PKG_NAME") }

    /// Grounds a problem, lets the solver prepare a policy for it and rolls
    /// that policy out into a plan.
    ///
    /// # Arguments
    /// - `problem`: The lifted [`Problem`] to solve.
    ///
    /// # Returns
    /// A [`PlanGenerationResult`]: on [`Status::SolvedSatisficing`] it
    /// carries the plan in the original problem's vocabulary, on the other
    /// statuses it carries none.
    ///
    /// # Errors
    /// An [`Error`] if grounding fails, if the solver rejects or fails on the
    /// domain, or if the policy produces a failing transition during rollout.
    pub fn solve(&mut self, problem: &Problem) -> Result<PlanGenerationResult, Error> {
        debug!("Solving '{}' with solver '{}'", problem.ident, self.solver.name());
        let domain: Domain = Domain::new(problem)?.with_cost_model(self.options.cost.clone());
        if !self.solver.supports(&domain) {
            return Err(Error::Incompatible { solver: self.solver.name().into() });
        }
        self.solver.solve(&domain).map_err(|err| Error::Solver { solver: self.solver.name().into(), err })?;

        // Roll the policy out from the initial state
        let mut state: State = domain.reset();
        let mut applied: Vec<ActionId> = Vec::new();
        while !domain.is_goal(&state)? {
            if applied.len() >= self.options.max_steps {
                debug!("Hit the step bound of {} step(s) before reaching the goal", self.options.max_steps);
                return Ok(PlanGenerationResult { status: Status::Timeout, plan: None, engine: self.name().into() });
            }
            let Some(id) = self.solver.sample_action(&domain, &state) else {
                debug!("Solver '{}' has no action to offer after {} step(s)", self.solver.name(), applied.len());
                return Ok(PlanGenerationResult { status: Status::UnsolvableIncompletely, plan: None, engine: self.name().into() });
            };
            trace!("--> Applying action {id}");
            state = domain.get_successor(&state, id)?;
            applied.push(id);
        }

        // Rewrite what we applied back into the original vocabulary
        let plan: SequentialPlan = domain.rewrite_back(&applied)?;
        debug!("Solved '{}' in {} step(s)", problem.ident, plan.len());
        Ok(PlanGenerationResult { status: Status::SolvedSatisficing, plan: Some(plan), engine: self.name().into() })
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::model::expr::{Expr, ValueKind};
    use crate::model::{Action, Effect, Fluent};
    use crate::tests::{make_fluent, make_robot_problem, setup_logger};


    /// A [`Solver`] that replays a fixed script of actions.
    struct ScriptedSolver {
        script: VecDeque<ActionId>,
    }
    impl ScriptedSolver {
        fn new(script: impl IntoIterator<Item = usize>) -> Self { Self { script: script.into_iter().map(ActionId).collect() } }
    }
    impl Solver for ScriptedSolver {
        fn name(&self) -> &str { "scripted" }

        fn solve(&mut self, _domain: &Domain) -> Result<(), Box<dyn std::error::Error + Send + Sync>> { Ok(()) }

        fn sample_action(&mut self, _domain: &Domain, _state: &State) -> Option<ActionId> { self.script.pop_front() }
    }

    /// A [`Solver`] that rejects every domain.
    struct PickySolver;
    impl Solver for PickySolver {
        fn name(&self) -> &str { "picky" }

        fn supports(&self, _domain: &Domain) -> bool { false }

        fn solve(&mut self, _domain: &Domain) -> Result<(), Box<dyn std::error::Error + Send + Sync>> { Ok(()) }

        fn sample_action(&mut self, _domain: &Domain, _state: &State) -> Option<ActionId> { None }
    }

    /// A [`Solver`] whose policy is one action, forever.
    struct RepeatSolver(ActionId);
    impl Solver for RepeatSolver {
        fn solve(&mut self, _domain: &Domain) -> Result<(), Box<dyn std::error::Error + Send + Sync>> { Ok(()) }

        fn sample_action(&mut self, _domain: &Domain, _state: &State) -> Option<ActionId> { Some(self.0) }
    }


    #[test]
    fn test_engine_solves_robot() {
        setup_logger();

        let mut engine = Engine::new(ScriptedSolver::new([0]));
        let result: PlanGenerationResult = engine.solve(&make_robot_problem()).unwrap();
        assert_eq!(result.status, Status::SolvedSatisficing);
        assert_eq!(result.plan.unwrap().to_string(), "[move(kitchen, hall)]");
        assert_eq!(result.engine, "plansim");
    }

    #[test]
    fn test_engine_unsolvable_when_policy_dries_up() {
        let mut engine = Engine::new(ScriptedSolver::new([]));
        let result: PlanGenerationResult = engine.solve(&make_robot_problem()).unwrap();
        assert_eq!(result.status, Status::UnsolvableIncompletely);
        assert!(result.plan.is_none());
    }

    #[test]
    fn test_engine_times_out() {
        // A counter that only grows, with an unreachable goal
        let mut problem = Problem::new("counter");
        problem.add_fluent(Fluent::new("n", ValueKind::Int, []));
        problem.set_initial_value(make_fluent("n", []), 0);
        problem.add_action(Action::new("inc", []).effect(Effect::increase("n", [], 1)));
        problem.add_goal(Expr::lt(Expr::fluent("n", []), Expr::from(0)));

        let mut engine = Engine::with_options(RepeatSolver(ActionId(0)), Options { max_steps: 3, cost: CostModel::Unit });
        let result: PlanGenerationResult = engine.solve(&problem).unwrap();
        assert_eq!(result.status, Status::Timeout);
        assert!(result.plan.is_none());
    }

    #[test]
    fn test_engine_rejects_incompatible_solver() {
        let mut engine = Engine::new(PickySolver);
        assert!(matches!(engine.solve(&make_robot_problem()), Err(Error::Incompatible { .. })));
    }

    #[test]
    fn test_engine_surfaces_bad_policies() {
        // Action #1 is inapplicable at reset; the rollout must fail loudly
        let mut engine = Engine::new(ScriptedSolver::new([1]));
        let err: Error = engine.solve(&make_robot_problem()).unwrap_err();
        assert!(matches!(err, Error::Transition { err: crate::domain::Error::Inapplicable { .. } }), "unexpected error {err:?}");
    }
}
