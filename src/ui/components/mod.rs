pub mod key_caps;
pub mod progress_bar;
pub mod quiz_panel;
pub mod quiz_summary;
pub mod shortcut_list;
