pub mod api_connection;
pub mod cli;
pub mod error;
pub mod knowledge_index;
pub mod meal_planner;
pub mod nutrition;
pub mod profile;
pub mod search;
pub mod skin_tone;
