//  PLAN.rs
//    by Lut99
//
//  Created:
//    20 Mar 2025, 09:31:17
//  Last edited:
//    14 Jul 2025, 11:08:26
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines plans in the original problem's vocabulary: ordered sequences of
//!   [`ActionInstance`]s, as produced by
//!   [`Domain::rewrite_back()`](crate::domain::Domain::rewrite_back()).
//

// Imports
use std::fmt::{Display, Formatter, Result as FResult};

use crate::model::expr::Value;
use crate::model::Ident;


/***** LIBRARY *****/
/// One application of a lifted action to actual parameters.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ActionInstance {
    /// The name of the lifted action.
    pub action: Ident,
    /// The actual parameters it is applied to, in signature order.
    pub params: Vec<Value>,
}
impl Display for ActionInstance {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        write!(f, "{}", self.action)?;
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



/// An ordered sequence of [`ActionInstance`]s over the original problem's
/// actions.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SequentialPlan {
    /// The actions to apply, in order.
    pub actions: Vec<ActionInstance>,
}
impl SequentialPlan {
    /// Constructor for an empty SequentialPlan.
    ///
    /// # Returns
    /// A new SequentialPlan without any actions.
    #[inline]
    pub fn new() -> Self { Self { actions: Vec::new() } }

    /// Returns the number of actions in this plan.
    #[inline]
    pub fn len(&self) -> usize { self.actions.len() }

    /// Returns whether this plan carries no actions at all.
    #[inline]
    pub fn is_empty(&self) -> bool { self.actions.is_empty() }
}
impl Default for SequentialPlan {
    #[inline]
    fn default() -> Self { Self::new() }
}
impl Display for SequentialPlan {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> FResult {
        write!(f, "[")?;
        for (i, action) in self.actions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{action}")?;
        }
        write!(f, "]")
    }
}
impl FromIterator<ActionInstance> for SequentialPlan {
    #[inline]
    fn from_iter<T: IntoIterator<Item = ActionInstance>>(iter: T) -> Self { Self { actions: iter.into_iter().collect() } }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::make_object;


    #[test]
    fn test_plan_display() {
        let plan: SequentialPlan = SequentialPlan::from_iter([
            ActionInstance { action: Ident::from("move"), params: vec![make_object("kitchen"), make_object("hall")] },
            ActionInstance { action: Ident::from("charge"), params: vec![] },
        ]);
        assert_eq!(plan.to_string(), "[move(kitchen, hall), charge]");
        assert_eq!(plan.len(), 2);
        assert!(!plan.is_empty());
    }
}
