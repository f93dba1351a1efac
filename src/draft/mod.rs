pub mod series;
pub mod state;
pub mod tournament;
