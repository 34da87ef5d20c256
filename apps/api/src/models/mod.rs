pub mod career;
pub mod progress;
pub mod quiz;
pub mod roadmap;
