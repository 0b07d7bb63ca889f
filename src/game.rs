//! Family 100 game model
//!
//! Questions, the per-chat session record, and the text rendered into chat.

pub mod board;
mod question;
mod session;


pub use question::{AnswerSlot, Question, QuestionBank};
pub use session::{Credit, Session, SessionView};
