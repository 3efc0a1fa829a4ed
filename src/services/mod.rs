pub mod analyzer;
pub mod coach;
pub mod emotion;
pub mod injury_tree;
