pub mod concurrent_strategy;
pub mod fetch_strategy;
pub mod sequential_strategy;
