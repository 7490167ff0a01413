//! Literature-metadata API clients.
//!
//! Thin collaborators around OpenAlex (venues, funders) and Semantic
//! Scholar (related papers). Both retry on HTTP 429 with bounded
//! exponential backoff and absorb terminal failures into empty results,
//! so the recommendation agents degrade instead of aborting a run.

mod openalex;
mod scholar;

pub use openalex::*;
pub use scholar::*;
