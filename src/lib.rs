//  LIB.rs
//    by Lut99
//
//  Created:
//    14 Mar 2025, 10:02:56
//  Last edited:
//    01 Aug 2025, 16:21:08
//  Auto updated?
//    Yes
//
//  Description:
//!   A deterministic state-transition simulator over grounded planning
//!   problems.
//!
//!   Problems are authored through the lifted [`model`], compiled by the
//!   [`ground`]er into a parameter-free [`GroundProblem`](ground::GroundProblem)
//!   and then driven through the [`Domain`](domain::Domain), which exposes the
//!   `reset` / `get_successor` / `is_goal` / `get_applicable_actions` interface
//!   that a generic state-space search procedure expects. The optional
//!   [`engine`] module (feature `engine`) drives an external
//!   [`Solver`](engine::Solver) through that interface and rewrites the found
//!   plan back into the original problem's vocabulary.
//

// Declare modules
pub mod domain;
#[cfg(feature = "engine")]
pub mod engine;
pub mod eval;
pub mod ground;
mod log;
pub mod model;
pub mod plan;
#[cfg(test)]
mod tests;
