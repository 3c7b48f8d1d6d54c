mod bean;
mod method;
mod record;

pub use bean::{Bean, RoastDate};
pub use method::{BrewMethod, MethodStep, BLOOM_ACTION};
pub use record::{BrewDetails, BrewRecord, Ratings, Recipe};
