pub mod champion;
pub mod team;
