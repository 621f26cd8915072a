//! Service layer orchestrating repositories and providers.
//!
//! Services are generic over the repository traits so callcoach-core never
//! depends on callcoach-infra.

pub mod coach;
pub mod report;
