//  TESTS.rs
//    by Lut99
//
//  Created:
//    24 Mar 2025, 15:02:11
//  Last edited:
//    14 Jul 2025, 11:16:40
//  Auto updated?
//    Yes
//
//  Description:
//!   Contains some common test functions.
//

#![allow(unused)]

use crate::model::expr::{Expr, GroundFluent, Value, ValueKind};
use crate::model::{Action, Effect, Fluent, Parameter, Problem};


/***** LIBRARY *****/
/// Sets up a logger if the `LOGGER` environment variable asks for one.
pub fn setup_logger() {
    if let Ok(logger) = std::env::var("LOGGER") {
        if logger == "1" || logger == "true" {
            let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Trace).try_init();
        }
    }
}



/// Makes an object [`Value`] conveniently.
pub fn make_object(name: &str) -> Value { Value::Object(name.into()) }

/// Makes a [`GroundFluent`] over object arguments conveniently.
pub fn make_fluent(name: &str, args: impl IntoIterator<Item = &'static str>) -> GroundFluent {
    GroundFluent::new(name, args.into_iter().map(make_object))
}

/// Makes the problem most tests run on: a robot shuttling between two rooms
/// on a finite battery.
///
/// Two rooms (`kitchen`, `hall`), a boolean `robot_at` fluent per room, an
/// integer `battery` fluent, and a `move` action that relocates the robot and
/// drains 10 battery as long as at least 10 is left. The goal is reaching the
/// hall. Same-room moves are statically impossible.
pub fn make_robot_problem() -> Problem {
    let mut problem = Problem::new("robot");
    problem.add_type("room");
    problem.add_object("kitchen", "room").add_object("hall", "room");
    problem.add_fluent(Fluent::new("robot_at", ValueKind::Bool, [Parameter::new("r", "room")]));
    problem.add_fluent(Fluent::new("battery", ValueKind::Int, []));
    problem.add_action(
        Action::new("move", [Parameter::new("from", "room"), Parameter::new("to", "room")])
            .precondition(Expr::not(Expr::equals(Expr::param("from"), Expr::param("to"))))
            .precondition(Expr::fluent("robot_at", [Expr::param("from")]))
            .precondition(Expr::le(Expr::from(10), Expr::fluent("battery", [])))
            .effect(Effect::assign("robot_at", [Expr::param("from")], false))
            .effect(Effect::assign("robot_at", [Expr::param("to")], true))
            .effect(Effect::decrease("battery", [], 10)),
    );
    problem.set_initial_value(make_fluent("robot_at", ["kitchen"]), true);
    problem.set_default("robot_at", false);
    problem.set_initial_value(make_fluent("battery", []), 100);
    problem.add_goal(Expr::fluent("robot_at", [Expr::object("hall")]));
    problem
}
