//! Voluntary changes reissue engine: rule byte resolution, tag war and
//! validation of process tag permutations for an exchange.

pub mod config;
pub mod diag;
pub mod error;
pub mod logger;
pub mod model;
pub mod permutation;
pub mod scenario;
pub mod validation;

#[cfg(test)]
mod test_support;
