pub mod answer;
pub mod history;
pub mod press;
pub mod quiz;
pub mod quiz_session;
pub mod result;
pub mod timer;
pub mod visualizer;
