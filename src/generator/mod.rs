pub mod question;

pub use question::{QuestionFilter, QuestionGenerator, RandomQuestionGenerator, answerable};
