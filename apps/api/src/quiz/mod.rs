// Quiz: static question bank, per-session controller, HTTP handlers.

pub mod controller;
pub mod handlers;
pub mod question_bank;
