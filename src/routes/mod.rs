pub mod health;
pub mod health_score;
