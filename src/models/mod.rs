pub mod directory;
pub mod leaderboard;
pub mod score;
