pub mod directory;
pub mod high_score;
pub mod leaderboard;
