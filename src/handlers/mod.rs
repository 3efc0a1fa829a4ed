pub mod ai;
pub mod health;
pub mod injury_logs;
pub mod match_logs;
pub mod routines;
pub mod training_logs;
pub mod users;
