/// Pane grid planning.
pub mod planner;
