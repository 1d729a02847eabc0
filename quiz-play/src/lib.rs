//! quiz-play - terminal front end for the quiz
//!
//! Presentation only: [`input`] turns typed lines into root actions and
//! [`render`] draws state snapshots. All game logic lives in `libquiz`.

pub mod feedback;
pub mod input;
pub mod render;
