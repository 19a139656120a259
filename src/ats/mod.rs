pub mod scorer;

pub use scorer::calculate_score;
