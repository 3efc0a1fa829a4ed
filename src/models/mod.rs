pub mod analysis;
pub mod date_query;
pub mod injury_log;
pub mod match_log;
pub mod pain;
pub mod routine;
pub mod training_log;
pub mod user;
