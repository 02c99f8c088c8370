//  MODEL.rs
//    by Lut99
//
//  Created:
//    14 Mar 2025, 10:19:21
//  Last edited:
//    01 Aug 2025, 16:04:55
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the lifted planning problem: typed objects, fluent declarations
//!   and parameterized [`Action`]s with preconditions and effects.
//!
//!   Problems are authored programmatically through the builder-style API on
//!   [`Problem`] and then handed to the [grounder](crate::ground::compile())
//!   or directly to a [`Domain`](crate::domain::Domain). There is no text
//!   format.
//

// Define the expression submodule
pub mod expr;

// Imports
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter, Result as FResult};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::eval::Valuation;
use crate::ground::GroundProblem;
pub use expr::{Expr, GroundFluent, Value, ValueKind};


/***** LIBRARY *****/
/// An interned name: of a type, object, fluent, parameter or action.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ident {
    /// The name itself.
    pub value: String,
}
impl Ident {
    /// Returns the name as a string slice.
    ///
    /// # Returns
    /// A [`str`] referring to this Ident's contents.
    #[inline]
    pub fn as_str(&self) -> &str { &self.value }
}
impl Display for Ident {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult { write!(f, "{}", self.value) }
}
impl From<&str> for Ident {
    #[inline]
    fn from(value: &str) -> Self { Self { value: value.into() } }
}
impl From<String> for Ident {
    #[inline]
    fn from(value: String) -> Self { Self { value } }
}
impl std::borrow::Borrow<str> for Ident {
    #[inline]
    fn borrow(&self) -> &str { &self.value }
}



/// A typed parameter of a fluent or action signature.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Parameter {
    /// The name of the parameter.
    pub ident: Ident,
    /// The name of its declared type.
    pub ty:    Ident,
}
impl Parameter {
    /// Constructor for a Parameter.
    ///
    /// # Arguments
    /// - `ident`: The name of the parameter.
    /// - `ty`: The name of its declared type.
    ///
    /// # Returns
    /// A new Parameter.
    #[inline]
    pub fn new(ident: impl Into<Ident>, ty: impl Into<Ident>) -> Self { Self { ident: ident.into(), ty: ty.into() } }
}
impl Display for Parameter {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult { write!(f, "?{}: {}", self.ident, self.ty) }
}

/// A declared object of some type.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ObjectDecl {
    /// The name of the object.
    pub ident: Ident,
    /// The name of its declared type.
    pub ty:    Ident,
}

/// A declared state variable.
///
/// Fluents have a fixed kind and a typed parameter signature; every full
/// instantiation of the signature over declared objects contributes one
/// [`GroundFluent`] key to the simulator's state.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Fluent {
    /// The name of the fluent.
    pub ident:  Ident,
    /// The kind of value it holds.
    pub kind:   ValueKind,
    /// Its typed parameter signature.
    pub params: Vec<Parameter>,
}
impl Fluent {
    /// Constructor for a Fluent.
    ///
    /// # Arguments
    /// - `ident`: The name of the fluent.
    /// - `kind`: The kind of value it holds.
    /// - `params`: Its typed parameter signature.
    ///
    /// # Returns
    /// A new Fluent.
    #[inline]
    pub fn new(ident: impl Into<Ident>, kind: ValueKind, params: impl IntoIterator<Item = Parameter>) -> Self {
        Self { ident: ident.into(), kind, params: params.into_iter().collect() }
    }
}



/// How an [`Effect`] changes its target fluent.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EffectKind {
    /// Replace the target's value outright.
    Assign,
    /// Add the effect value to the target's current value.
    Increase,
    /// Subtract the effect value from the target's current value.
    Decrease,
}

/// A state change performed by an action.
///
/// All effects of one action read the pre-transition state; none observes
/// another effect's result within the same transition.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Effect {
    /// The name of the target fluent.
    pub fluent:    Ident,
    /// The target's argument expressions. Must fold to constants at grounding time.
    pub args:      Vec<Expr>,
    /// How the target changes.
    pub kind:      EffectKind,
    /// The value expression, evaluated against the pre-transition state.
    pub value:     Expr,
    /// An optional boolean guard; false guards skip the effect.
    pub condition: Option<Expr>,
}
impl Effect {
    /// Builds an assignment effect.
    ///
    /// # Arguments
    /// - `fluent`: The name of the target fluent.
    /// - `args`: The target's argument expressions.
    /// - `value`: The value to assign.
    ///
    /// # Returns
    /// A new, unguarded Effect.
    #[inline]
    pub fn assign(fluent: impl Into<Ident>, args: impl IntoIterator<Item = Expr>, value: impl Into<Expr>) -> Self {
        Self { fluent: fluent.into(), args: args.into_iter().collect(), kind: EffectKind::Assign, value: value.into(), condition: None }
    }

    /// Builds an increase effect.
    ///
    /// # Arguments
    /// - `fluent`: The name of the target fluent.
    /// - `args`: The target's argument expressions.
    /// - `value`: The value to add to the target's current value.
    ///
    /// # Returns
    /// A new, unguarded Effect.
    #[inline]
    pub fn increase(fluent: impl Into<Ident>, args: impl IntoIterator<Item = Expr>, value: impl Into<Expr>) -> Self {
        Self { fluent: fluent.into(), args: args.into_iter().collect(), kind: EffectKind::Increase, value: value.into(), condition: None }
    }

    /// Builds a decrease effect.
    ///
    /// # Arguments
    /// - `fluent`: The name of the target fluent.
    /// - `args`: The target's argument expressions.
    /// - `value`: The value to subtract from the target's current value.
    ///
    /// # Returns
    /// A new, unguarded Effect.
    #[inline]
    pub fn decrease(fluent: impl Into<Ident>, args: impl IntoIterator<Item = Expr>, value: impl Into<Expr>) -> Self {
        Self { fluent: fluent.into(), args: args.into_iter().collect(), kind: EffectKind::Decrease, value: value.into(), condition: None }
    }

    /// Guards this effect with a condition.
    ///
    /// # Arguments
    /// - `condition`: The boolean guard expression.
    ///
    /// # Returns
    /// The same Effect, now conditional.
    #[inline]
    pub fn when(mut self, condition: impl Into<Expr>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}



/// The signature of a native effect function.
///
/// Invoked with the grounded problem and the pre-transition state; returns one
/// [`Value`] per declared target, in declaration order.
pub type SimulatedEffectFn = Arc<dyn Fn(&GroundProblem, &dyn Valuation) -> Result<Vec<Value>, String> + Send + Sync>;

/// A native effect: state changes computed by a caller-supplied function
/// instead of declared expressions.
///
/// Its outputs are applied as further assignments after the declared effects,
/// under the same conflict rules.
#[derive(Clone)]
pub struct SimulatedEffect {
    /// The target fluent applications, possibly referencing action parameters.
    pub targets: Vec<(Ident, Vec<Expr>)>,
    /// The function producing one value per target.
    pub func:    SimulatedEffectFn,
}
impl SimulatedEffect {
    /// Constructor for a SimulatedEffect.
    ///
    /// # Arguments
    /// - `targets`: The target fluent applications, as `(fluent name, argument expressions)` pairs.
    /// - `func`: The function producing one value per target, given the grounded problem and the pre-transition state.
    ///
    /// # Returns
    /// A new SimulatedEffect.
    #[inline]
    pub fn new(
        targets: impl IntoIterator<Item = (Ident, Vec<Expr>)>,
        func: impl Fn(&GroundProblem, &dyn Valuation) -> Result<Vec<Value>, String> + Send + Sync + 'static,
    ) -> Self {
        Self { targets: targets.into_iter().collect(), func: Arc::new(func) }
    }
}
impl Debug for SimulatedEffect {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        f.debug_struct("SimulatedEffect").field("targets", &self.targets).field("func", &"<native>").finish()
    }
}



/// A parameterized action: a conjunctive precondition set plus a list of
/// effects, and optionally a native effect function.
#[derive(Clone, Debug)]
pub struct Action {
    /// The name of the action.
    pub ident:         Ident,
    /// Its typed parameters.
    pub params:        Vec<Parameter>,
    /// The conjunctive precondition set.
    pub preconditions: Vec<Expr>,
    /// The declared effects.
    pub effects:       Vec<Effect>,
    /// An optional native effect.
    pub simulated:     Option<SimulatedEffect>,
}
impl Action {
    /// Constructor for an Action without preconditions or effects yet.
    ///
    /// # Arguments
    /// - `ident`: The name of the action.
    /// - `params`: Its typed parameters.
    ///
    /// # Returns
    /// A new Action, ready for [`precondition()`](Action::precondition())/[`effect()`](Action::effect()) chaining.
    #[inline]
    pub fn new(ident: impl Into<Ident>, params: impl IntoIterator<Item = Parameter>) -> Self {
        Self { ident: ident.into(), params: params.into_iter().collect(), preconditions: Vec::new(), effects: Vec::new(), simulated: None }
    }

    /// Adds a precondition to this action's conjunctive set.
    #[inline]
    pub fn precondition(mut self, expr: impl Into<Expr>) -> Self {
        self.preconditions.push(expr.into());
        self
    }

    /// Adds an effect to this action.
    #[inline]
    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Installs a native effect on this action.
    #[inline]
    pub fn simulate(mut self, simulated: SimulatedEffect) -> Self {
        self.simulated = Some(simulated);
        self
    }
}
impl Display for Action {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        write!(f, "{}", self.ident)?;
        if !self.params.is_empty() {
            write!(f, "(")?;
            for (i, param) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{param}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}



/// A lifted planning problem.
///
/// Collects the type names, objects, fluents and actions of a domain together
/// with one instance's initial assignment and conjunctive goal set. Read-only
/// once handed to a [`Domain`](crate::domain::Domain).
#[derive(Clone, Debug)]
pub struct Problem {
    /// The name of the problem.
    pub ident:    Ident,
    /// The declared type names.
    pub types:    IndexSet<Ident>,
    /// The declared objects.
    pub objects:  Vec<ObjectDecl>,
    /// The declared fluents.
    pub fluents:  Vec<Fluent>,
    /// The declared actions.
    pub actions:  Vec<Action>,
    /// Explicitly assigned initial values, in insertion order.
    pub init:     IndexMap<GroundFluent, Value>,
    /// Per-fluent default initial values, for keys not in `init`.
    pub defaults: HashMap<Ident, Value>,
    /// The conjunctive goal set.
    pub goals:    Vec<Expr>,
}
impl Problem {
    /// Constructor for an empty Problem.
    ///
    /// # Arguments
    /// - `ident`: The name of the problem.
    ///
    /// # Returns
    /// A new Problem without any declarations.
    #[inline]
    pub fn new(ident: impl Into<Ident>) -> Self {
        Self {
            ident:    ident.into(),
            types:    IndexSet::new(),
            objects:  Vec::new(),
            fluents:  Vec::new(),
            actions:  Vec::new(),
            init:     IndexMap::new(),
            defaults: HashMap::new(),
            goals:    Vec::new(),
        }
    }

    /// Declares a type name.
    #[inline]
    pub fn add_type(&mut self, ty: impl Into<Ident>) -> &mut Self {
        self.types.insert(ty.into());
        self
    }

    /// Declares an object of a previously declared type.
    #[inline]
    pub fn add_object(&mut self, ident: impl Into<Ident>, ty: impl Into<Ident>) -> &mut Self {
        self.objects.push(ObjectDecl { ident: ident.into(), ty: ty.into() });
        self
    }

    /// Declares a fluent.
    #[inline]
    pub fn add_fluent(&mut self, fluent: Fluent) -> &mut Self {
        self.fluents.push(fluent);
        self
    }

    /// Sets the default initial value for every instantiation of a fluent not
    /// explicitly assigned by [`set_initial_value()`](Problem::set_initial_value()).
    #[inline]
    pub fn set_default(&mut self, fluent: impl Into<Ident>, value: impl Into<Value>) -> &mut Self {
        self.defaults.insert(fluent.into(), value.into());
        self
    }

    /// Declares an action.
    #[inline]
    pub fn add_action(&mut self, action: Action) -> &mut Self {
        self.actions.push(action);
        self
    }

    /// Assigns the initial value of one fluent key.
    #[inline]
    pub fn set_initial_value(&mut self, fluent: GroundFluent, value: impl Into<Value>) -> &mut Self {
        self.init.insert(fluent, value.into());
        self
    }

    /// Adds a goal to the conjunctive goal set.
    #[inline]
    pub fn add_goal(&mut self, goal: impl Into<Expr>) -> &mut Self {
        self.goals.push(goal.into());
        self
    }



    /// Returns the declared fluent with the given name, if any.
    ///
    /// # Arguments
    /// - `ident`: The name to look for.
    ///
    /// # Returns
    /// The matching [`Fluent`], or [`None`] if it is not declared.
    #[inline]
    pub fn fluent(&self, ident: &Ident) -> Option<&Fluent> { self.fluents.iter().find(|f| &f.ident == ident) }

    /// Returns the names of all objects of the given type, in declaration order.
    ///
    /// # Arguments
    /// - `ty`: The type name to filter on.
    ///
    /// # Returns
    /// An [`Iterator`] over the matching object [`Ident`]s.
    #[inline]
    pub fn objects_of_type<'s>(&'s self, ty: &'s Ident) -> impl 's + Iterator<Item = &'s Ident> {
        self.objects.iter().filter(move |o| &o.ty == ty).map(|o| &o.ident)
    }
}





/***** TESTS *****/
