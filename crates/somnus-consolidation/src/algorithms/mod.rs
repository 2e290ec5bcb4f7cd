//! Consolidation algorithms: cluster cohesion and union-find.

pub mod similarity;
pub mod union_find;
