//! egui rendering: side/top panels, the four views, their tables and charts.
pub mod panels;
pub mod plot;
pub mod tables;
pub mod views;
