//! Timetable conflict and move-proposal engine.
//!
//! The store holds one school's weekly timetable; the rules module answers
//! blackout and availability questions; the planners search for legal
//! rearrangements (direct move, two-party swap, three-party triangle, and
//! administrator-defined N-way rotations); the apply module commits a chosen
//! plan and carries it across the persistence boundary. Everything is a pure
//! function of `(store, request)` except the explicit apply step.

pub mod advisory;
pub mod apply;
pub mod model;
pub mod planner;
pub mod rotation;
pub mod rules;
pub mod store;
