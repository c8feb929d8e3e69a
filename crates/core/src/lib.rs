pub mod restaurant;
pub mod result;

pub use restaurant::{
    default_restaurants, PatternFile, PatternFileError, RestaurantPatterns, DEFAULT_RESTAURANTS,
};
pub use result::ExtractionResult;
