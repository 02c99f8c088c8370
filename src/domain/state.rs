//  STATE.rs
//    by Lut99
//
//  Created:
//    24 Mar 2025, 14:05:29
//  Last edited:
//    23 Jun 2025, 10:44:51
//  Auto updated?
//    Yes
//
//  Description:
//!   The simulator's state: one [`Value`] per fluent key, positionally
//!   aligned to the [`Domain`](super::Domain)'s fixed key sequence.
//

// Imports
use crate::model::expr::Value;


/***** LIBRARY *****/
/// An assignment of one [`Value`] to every fluent key of a domain.
///
/// States carry values only; the key sequence lives in the domain that
/// produced them and never changes. States are immutable: transitions always
/// return a fresh State instead of mutating in place.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct State {
    /// The values, in the domain's key order.
    values: Vec<Value>,
}
impl State {
    /// Constructor for a State.
    ///
    /// Only domains build states; everybody else receives them from
    /// [`reset()`](super::Domain::reset()) or
    /// [`get_successor()`](super::Domain::get_successor()).
    #[inline]
    pub(crate) fn new(values: Vec<Value>) -> Self { Self { values } }

    /// Returns the values of this State, in the domain's key order.
    ///
    /// # Returns
    /// A slice of [`Value`]s.
    #[inline]
    pub fn values(&self) -> &[Value] { &self.values }

    /// Returns the value at the given key position.
    ///
    /// # Arguments
    /// - `index`: The position in the domain's key sequence.
    ///
    /// # Returns
    /// The [`Value`] at that position, or [`None`] if out of range.
    #[inline]
    pub fn value(&self, index: usize) -> Option<&Value> { self.values.get(index) }

    /// Returns the number of fluent keys this State assigns.
    #[inline]
    pub fn len(&self) -> usize { self.values.len() }

    /// Returns whether this State assigns no keys at all.
    #[inline]
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
}
