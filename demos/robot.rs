//  ROBOT.rs
//    by Lut99
//
//  Created:
//    07 Apr 2025, 15:44:02
//  Last edited:
//    01 Aug 2025, 16:29:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Builds a small delivery-robot problem, solves it with a breadth-first
//!   policy implemented on the consumer side of the [`Solver`] trait and
//!   prints the plan in the original problem's vocabulary.
//

use std::collections::{HashMap, HashSet, VecDeque};
use std::error::Error;

use clap::Parser;
use console::style;
use log::{debug, info};
use plansim::domain::{Domain, State};
use plansim::engine::{Engine, Options, Solver, Status};
use plansim::ground::ActionId;
use plansim::model::expr::{Expr, GroundFluent, Value, ValueKind};
use plansim::model::{Action, Effect, Fluent, Parameter, Problem};


/***** ARGUMENTS *****/
/// Defines the arguments of the demo.
#[derive(Debug, Parser)]
pub struct Arguments {
    /// If given, enables more verbose logging.
    #[clap(long, global = true)]
    debug: bool,

    /// The bound on the number of rollout steps.
    #[clap(long, default_value_t = plansim::engine::DEFAULT_MAX_STEPS)]
    steps: usize,
}





/***** HELPER FUNCTIONS *****/
/// Builds a ground fluent over object arguments.
fn key(name: &str, args: impl IntoIterator<Item = &'static str>) -> GroundFluent {
    GroundFluent::new(name, args.into_iter().map(|a| Value::Object(a.into())))
}

/// Builds the delivery-robot problem: three rooms in a row, a robot that can
/// move along connections and a battery that drains per move.
fn make_problem() -> Problem {
    let mut problem = Problem::new("deliveries");
    problem.add_type("room");
    problem.add_object("kitchen", "room").add_object("hall", "room").add_object("garden", "room");

    problem.add_fluent(Fluent::new("robot_at", ValueKind::Bool, [Parameter::new("r", "room")]));
    problem.add_fluent(Fluent::new("connected", ValueKind::Bool, [Parameter::new("a", "room"), Parameter::new("b", "room")]));
    problem.add_fluent(Fluent::new("battery", ValueKind::Int, []));

    problem.add_action(
        Action::new("move", [Parameter::new("from", "room"), Parameter::new("to", "room")])
            .precondition(Expr::fluent("connected", [Expr::param("from"), Expr::param("to")]))
            .precondition(Expr::fluent("robot_at", [Expr::param("from")]))
            .precondition(Expr::le(Expr::from(10), Expr::fluent("battery", [])))
            .effect(Effect::assign("robot_at", [Expr::param("from")], false))
            .effect(Effect::assign("robot_at", [Expr::param("to")], true))
            .effect(Effect::decrease("battery", [], 10)),
    );

    problem.set_default("robot_at", false);
    problem.set_default("connected", false);
    problem.set_initial_value(key("robot_at", ["kitchen"]), true);
    problem.set_initial_value(key("connected", ["kitchen", "hall"]), true);
    problem.set_initial_value(key("connected", ["hall", "garden"]), true);
    problem.set_initial_value(key("battery", []), 50);
    problem.add_goal(Expr::fluent("robot_at", [Expr::object("garden")]));
    problem
}





/***** SOLVER *****/
/// A breadth-first policy: searches the state space up front, then replays
/// the found action sequence step by step.
#[derive(Default)]
struct BfsSolver {
    /// The action sequence found by [`Solver::solve()`], replayed in order.
    plan: VecDeque<ActionId>,
}
impl Solver for BfsSolver {
    fn name(&self) -> &str { "bfs" }

    fn solve(&mut self, domain: &Domain) -> Result<(), Box<dyn Error + Send + Sync>> {
        let init: State = domain.reset();
        let mut seen: HashSet<State> = HashSet::from([init.clone()]);
        let mut parents: HashMap<State, (State, ActionId)> = HashMap::new();
        let mut queue: VecDeque<State> = VecDeque::from([init.clone()]);
        while let Some(state) = queue.pop_front() {
            if domain.is_goal(&state)? {
                // Walk the parent chain back to the initial state
                let mut plan: Vec<ActionId> = Vec::new();
                let mut cursor: &State = &state;
                while let Some((prev, id)) = parents.get(cursor) {
                    plan.push(*id);
                    cursor = prev;
                }
                plan.reverse();
                debug!("Found a plan of {} step(s) after expanding {} state(s)", plan.len(), seen.len());
                self.plan = plan.into();
                return Ok(());
            }
            for id in domain.get_applicable_actions(&state)? {
                let next: State = domain.get_successor(&state, id)?;
                if seen.insert(next.clone()) {
                    parents.insert(next.clone(), (state.clone(), id));
                    queue.push_back(next);
                }
            }
        }
        Err("the goal is unreachable".into())
    }

    fn sample_action(&mut self, _domain: &Domain, _state: &State) -> Option<ActionId> { self.plan.pop_front() }
}





/***** ENTRYPOINT *****/
fn main() {
    // Parse the CLI arguments
    let args = Arguments::parse();

    // Setup the logger
    env_logger::builder().filter_level(if args.debug { log::LevelFilter::Trace } else { log::LevelFilter::Warn }).init();
    info!("plansim {} - v{}", env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"));

    // Build the problem, then let the engine drive the search
    let problem: Problem = make_problem();
    let mut engine = Engine::with_options(BfsSolver::default(), Options { max_steps: args.steps, ..Default::default() });
    let result = match engine.solve(&problem) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{}: {err}", style("ERROR").red().bold());
            std::process::exit(1);
        },
    };

    // Report what happened
    match result.status {
        Status::SolvedSatisficing => {
            let plan = result.plan.unwrap_or_default();
            println!("{} ({} step(s)):", style("Plan found").green().bold(), plan.len());
            for action in &plan.actions {
                println!("  {}", style(action).bold());
            }
        },
        status => println!("{}: {status}", style("No plan").yellow().bold()),
    }
}
