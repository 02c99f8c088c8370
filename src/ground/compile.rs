//  COMPILE.rs
//    by Lut99
//
//  Created:
//    20 Mar 2025, 09:44:03
//  Last edited:
//    01 Aug 2025, 16:15:51
//  Auto updated?
//    Yes
//
//  Description:
//!   Compiles a lifted [`Problem`] into a [`GroundProblem`].
//!
//!   Grounding enumerates every binding of every action's parameters over the
//!   declared objects, substitutes the bindings into preconditions and
//!   effects and folds the results. Instantiations whose precondition folds
//!   to a constant false are pruned on the spot; everything else is kept for
//!   the simulator to decide at run time.
//

// Imports
use std::collections::HashMap;
use std::error;
use std::fmt::{Display, Formatter, Result as FResult};

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools as _;

use super::{GroundAction, GroundEffect, GroundFluent, GroundProblem, GroundSimulatedEffect};
use crate::eval::{fold, substitute};
use crate::log::{debug, trace};
use crate::model::expr::{Expr, Value, ValueKind};
use crate::model::{EffectKind, Ident, Parameter, Problem};
use crate::plan::ActionInstance;


/***** ERRORS *****/
/// Defines the ways in which a lifted [`Problem`] can fail to ground.
///
/// All of these are fatal: the problem as given cannot be simulated, and
/// compiling it again without changing it yields the same error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// An object, fluent parameter or action parameter references an undeclared type.
    UndeclaredType { ty: Ident, owner: Ident },
    /// An effect targets an undeclared fluent.
    UndeclaredFluent { fluent: Ident, action: Ident },
    /// An explicit initial assignment references a fluent key that is never enumerated.
    UnknownInitialAssignment { fluent: GroundFluent },
    /// A fluent key has neither an explicit initial value nor a default.
    UninitializedFluent { fluent: GroundFluent },
    /// An initial value does not match its fluent's declared kind.
    InitialValueKind { fluent: GroundFluent, expected: ValueKind, found: ValueKind },
    /// An effect's target arguments do not fold to constants.
    EffectTarget { action: Ident, fluent: Ident },
    /// An effect targets a fluent key outside the enumerated key sequence.
    UnknownKey { action: Ident, fluent: GroundFluent },
    /// An increase/decrease effect targets a non-numeric fluent.
    NumericEffect { action: Ident, fluent: Ident, kind: ValueKind },
}
impl Display for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        match self {
            Self::UndeclaredType { ty, owner } => write!(f, "\"{owner}\" references undeclared type \"{ty}\""),
            Self::UndeclaredFluent { fluent, action } => write!(f, "Action \"{action}\" has an effect on undeclared fluent \"{fluent}\""),
            Self::UnknownInitialAssignment { fluent } => write!(f, "Initial assignment to \"{fluent}\" does not match any enumerated fluent key"),
            Self::UninitializedFluent { fluent } => write!(f, "Fluent \"{fluent}\" has no initial value and no default"),
            Self::InitialValueKind { fluent, expected, found } => {
                write!(f, "Initial value of \"{fluent}\" has kind {found}, expected {expected}")
            },
            Self::EffectTarget { action, fluent } => {
                write!(f, "Action \"{action}\" has an effect on \"{fluent}\" whose arguments are not constant after grounding")
            },
            Self::UnknownKey { action, fluent } => write!(f, "Action \"{action}\" has an effect on \"{fluent}\", which is not an enumerated fluent key"),
            Self::NumericEffect { action, fluent, kind } => {
                write!(f, "Action \"{action}\" increases/decreases fluent \"{fluent}\" of non-numeric kind {kind}")
            },
        }
    }
}
impl error::Error for Error {}





/***** HELPER FUNCTIONS *****/
/// Substitutes a binding into an expression and folds the result.
#[inline]
fn ground_expr(expr: &Expr, binding: &HashMap<Ident, Value>) -> Expr { fold(&substitute(expr, binding)) }

/// Enumerates every binding of the given parameters over the declared objects.
///
/// # Arguments
/// - `types`: The declared type names, to validate the parameters against.
/// - `objects`: The declared objects, grouped by type name.
/// - `params`: The parameter signature to enumerate.
/// - `owner`: Who the signature belongs to, for error reporting.
///
/// # Returns
/// Every full binding, as one [`Value`] per parameter in signature order. A
/// signature without parameters yields exactly one empty binding; a parameter
/// whose type has no objects yields none at all.
///
/// # Errors
/// An [`Error::UndeclaredType`] if a parameter references an unknown type.
fn enumerate_bindings(
    types: &IndexSet<Ident>,
    objects: &HashMap<Ident, Vec<Value>>,
    params: &[Parameter],
    owner: &Ident,
) -> Result<Vec<Vec<Value>>, Error> {
    if params.is_empty() {
        return Ok(vec![Vec::new()]);
    }
    let mut domains: Vec<Vec<Value>> = Vec::with_capacity(params.len());
    for param in params {
        if !types.contains(&param.ty) {
            return Err(Error::UndeclaredType { ty: param.ty.clone(), owner: owner.clone() });
        }
        domains.push(objects.get(&param.ty).cloned().unwrap_or_default());
    }
    Ok(domains.into_iter().multi_cartesian_product().collect())
}





/***** LIBRARY FUNCTIONS *****/
/// Compiles a lifted [`Problem`] into a [`GroundProblem`].
///
/// The resulting problem has parameter-free actions only, one initial value
/// for every enumerated fluent key (the enumeration order is the fixed key
/// sequence of all states) and a positional [`ActionInstance`] back-map for
/// rewriting ground plans into the original vocabulary.
///
/// # Arguments
/// - `problem`: The lifted [`Problem`] to compile.
///
/// # Returns
/// The compiled [`GroundProblem`].
///
/// # Errors
/// An [`Error`] if the problem references undeclared names, leaves fluent
/// keys without initial values or declares effects the simulator cannot
/// apply.
pub fn compile(problem: &Problem) -> Result<GroundProblem, Error> {
    debug!("Grounding problem '{}'", problem.ident);

    // Group the declared objects by type, validating their types as we go
    let mut objects: HashMap<Ident, Vec<Value>> = HashMap::with_capacity(problem.types.len());
    for obj in &problem.objects {
        if !problem.types.contains(&obj.ty) {
            return Err(Error::UndeclaredType { ty: obj.ty.clone(), owner: obj.ident.clone() });
        }
        objects.entry(obj.ty.clone()).or_default().push(Value::Object(obj.ident.clone()));
    }

    // Collect the kind of every declared fluent
    let mut kinds: HashMap<Ident, ValueKind> = HashMap::with_capacity(problem.fluents.len());
    for fluent in &problem.fluents {
        kinds.insert(fluent.ident.clone(), fluent.kind);
    }

    // Enumerate every fluent key and give it an initial value. This order is
    // the key sequence every state of the domain aligns to.
    let mut init: IndexMap<GroundFluent, Value> = IndexMap::new();
    for fluent in &problem.fluents {
        for args in enumerate_bindings(&problem.types, &objects, &fluent.params, &fluent.ident)? {
            let key = GroundFluent { ident: fluent.ident.clone(), args };
            let value: Value = match problem.init.get(&key).or_else(|| problem.defaults.get(&fluent.ident)) {
                Some(value) => value.clone(),
                None => return Err(Error::UninitializedFluent { fluent: key }),
            };
            if value.kind() != fluent.kind {
                return Err(Error::InitialValueKind { fluent: key, expected: fluent.kind, found: value.kind() });
            }
            trace!("--> Key '{key}' starts at '{value}'");
            init.insert(key, value);
        }
    }

    // Explicit assignments to keys that were never enumerated point at typos
    for key in problem.init.keys() {
        if !init.contains_key(key) {
            return Err(Error::UnknownInitialAssignment { fluent: key.clone() });
        }
    }

    // Instantiate every action over every binding of its parameters
    let mut actions: Vec<GroundAction> = Vec::new();
    let mut instances: Vec<ActionInstance> = Vec::new();
    let mut pruned: usize = 0;
    for action in &problem.actions {
        for bound in enumerate_bindings(&problem.types, &objects, &action.params, &action.ident)? {
            let binding: HashMap<Ident, Value> = action.params.iter().map(|p| p.ident.clone()).zip(bound.iter().cloned()).collect();

            // Ground the preconditions, dropping statically true members and
            // pruning the whole instantiation on a statically false one
            let mut preconditions: Vec<Expr> = Vec::with_capacity(action.preconditions.len());
            let mut dead: bool = false;
            for pre in &action.preconditions {
                match ground_expr(pre, &binding) {
                    Expr::Value(Value::Bool(true)) => continue,
                    Expr::Value(Value::Bool(false)) => {
                        dead = true;
                        break;
                    },
                    other => preconditions.push(other),
                }
            }
            if dead {
                trace!("--> Pruning '{}({})': precondition is statically false", action.ident, bound.iter().join(", "));
                pruned += 1;
                continue;
            }

            // Ground the effects
            let mut effects: Vec<GroundEffect> = Vec::with_capacity(action.effects.len());
            for effect in &action.effects {
                let Some(kind) = kinds.get(&effect.fluent).copied() else {
                    return Err(Error::UndeclaredFluent { fluent: effect.fluent.clone(), action: action.ident.clone() });
                };
                if effect.kind != EffectKind::Assign && !kind.is_numeric() {
                    return Err(Error::NumericEffect { action: action.ident.clone(), fluent: effect.fluent.clone(), kind });
                }

                // The target's arguments must be fully determined at grounding time
                let mut args: Vec<Value> = Vec::with_capacity(effect.args.len());
                for arg in &effect.args {
                    match ground_expr(arg, &binding) {
                        Expr::Value(v) => args.push(v),
                        _ => return Err(Error::EffectTarget { action: action.ident.clone(), fluent: effect.fluent.clone() }),
                    }
                }
                let key = GroundFluent { ident: effect.fluent.clone(), args };
                if !init.contains_key(&key) {
                    return Err(Error::UnknownKey { action: action.ident.clone(), fluent: key });
                }

                // Statically false guards drop the effect; statically true ones drop the guard
                let condition: Option<Expr> = match &effect.condition {
                    Some(cond) => match ground_expr(cond, &binding) {
                        Expr::Value(Value::Bool(true)) => None,
                        Expr::Value(Value::Bool(false)) => continue,
                        other => Some(other),
                    },
                    None => None,
                };

                effects.push(GroundEffect { fluent: key, kind: effect.kind, value: ground_expr(&effect.value, &binding), condition });
            }

            // Ground the native effect's targets, if any
            let simulated: Option<GroundSimulatedEffect> = match &action.simulated {
                Some(sim) => {
                    let mut targets: Vec<GroundFluent> = Vec::with_capacity(sim.targets.len());
                    for (fluent, target_args) in &sim.targets {
                        if !kinds.contains_key(fluent) {
                            return Err(Error::UndeclaredFluent { fluent: fluent.clone(), action: action.ident.clone() });
                        }
                        let mut args: Vec<Value> = Vec::with_capacity(target_args.len());
                        for arg in target_args {
                            match ground_expr(arg, &binding) {
                                Expr::Value(v) => args.push(v),
                                _ => return Err(Error::EffectTarget { action: action.ident.clone(), fluent: fluent.clone() }),
                            }
                        }
                        let key = GroundFluent { ident: fluent.clone(), args };
                        if !init.contains_key(&key) {
                            return Err(Error::UnknownKey { action: action.ident.clone(), fluent: key });
                        }
                        targets.push(key);
                    }
                    Some(GroundSimulatedEffect { targets, func: sim.func.clone() })
                },
                None => None,
            };

            // Name the instantiation and record how it rewrites back
            let ident: Ident = if bound.is_empty() {
                action.ident.clone()
            } else {
                Ident::from(format!("{}({})", action.ident, bound.iter().join(", ")))
            };
            trace!("--> Grounded '{ident}'");
            instances.push(ActionInstance { action: action.ident.clone(), params: bound });
            actions.push(GroundAction { ident, preconditions, effects, simulated });
        }
    }
    debug!("Grounded {} action(s) for '{}' ({} instantiation(s) pruned statically)", actions.len(), problem.ident, pruned);

    // Goals only need folding; they never reference parameters
    let goals: Vec<Expr> = problem.goals.iter().map(fold).collect();

    Ok(GroundProblem { ident: problem.ident.clone(), actions, kinds, init, goals, instances })
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ground::ActionId;
    use crate::model::{Action, Effect, Fluent};
    use crate::tests::{make_fluent, make_object, make_robot_problem, setup_logger};


    #[test]
    fn test_compile_robot() {
        setup_logger();

        let ground: GroundProblem = compile(&make_robot_problem()).unwrap();

        // Same-room moves are pruned statically, the rest is kept
        assert_eq!(ground.actions.len(), 2);
        assert_eq!(ground.actions[0].ident.as_str(), "move(kitchen, hall)");
        assert_eq!(ground.actions[1].ident.as_str(), "move(hall, kitchen)");

        // The statically-true inequality precondition is dropped; the two
        // state-dependent ones survive
        assert_eq!(ground.actions[0].preconditions.len(), 2);

        // The key sequence follows fluent declaration order, then object order
        let keys: Vec<String> = ground.init.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["robot_at(kitchen)", "robot_at(hall)", "battery"]);
        assert_eq!(ground.init[&make_fluent("battery", [])], Value::Int(100));
        assert_eq!(ground.init[&make_fluent("robot_at", ["hall"])], Value::Bool(false));
    }

    #[test]
    fn test_compile_back_map() {
        let ground: GroundProblem = compile(&make_robot_problem()).unwrap();
        let instance: &ActionInstance = ground.instance(ActionId(1)).unwrap();
        assert_eq!(instance.action.as_str(), "move");
        assert_eq!(instance.params, vec![make_object("hall"), make_object("kitchen")]);
    }

    #[test]
    fn test_compile_uninitialized() {
        let mut problem = make_robot_problem();
        problem.add_fluent(Fluent::new("cargo", ValueKind::Int, []));
        assert_eq!(compile(&problem).unwrap_err(), Error::UninitializedFluent { fluent: make_fluent("cargo", []) });
    }

    #[test]
    fn test_compile_initial_kind() {
        let mut problem = make_robot_problem();
        problem.add_fluent(Fluent::new("cargo", ValueKind::Int, []));
        problem.set_initial_value(make_fluent("cargo", []), true);
        assert_eq!(compile(&problem).unwrap_err(), Error::InitialValueKind {
            fluent:   make_fluent("cargo", []),
            expected: ValueKind::Int,
            found:    ValueKind::Bool,
        });
    }

    #[test]
    fn test_compile_unknown_initial_assignment() {
        let mut problem = make_robot_problem();
        problem.set_initial_value(make_fluent("robot_at", ["garden"]), false);
        assert_eq!(compile(&problem).unwrap_err(), Error::UnknownInitialAssignment { fluent: make_fluent("robot_at", ["garden"]) });
    }

    #[test]
    fn test_compile_numeric_effect_on_bool() {
        let mut problem = make_robot_problem();
        problem.add_action(Action::new("break", []).effect(Effect::increase("robot_at", [Expr::object("kitchen")], 1)));
        assert_eq!(compile(&problem).unwrap_err(), Error::NumericEffect {
            action: Ident::from("break"),
            fluent: Ident::from("robot_at"),
            kind:   ValueKind::Bool,
        });
    }

    #[test]
    fn test_compile_unknown_key() {
        let mut problem = make_robot_problem();
        problem.add_action(Action::new("teleport", []).effect(Effect::assign("robot_at", [Expr::object("garden")], true)));
        assert_eq!(compile(&problem).unwrap_err(), Error::UnknownKey {
            action: Ident::from("teleport"),
            fluent: make_fluent("robot_at", ["garden"]),
        });
    }
}
