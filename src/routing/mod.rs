// Routing module: decides whether and where a normalized record lands.

pub mod filter;
pub mod override_rule;
pub mod partition;

pub use filter::{InclusionPredicate, Verdict, identity_key, screen};
pub use override_rule::apply_category_override;
pub use partition::{MarkerMode, PartitionRouter};
