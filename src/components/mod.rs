pub mod app;
pub mod camera_list;
pub mod camera_matrix;
pub mod dom_display;
pub mod error_panel;
pub mod feed_hud;
pub mod pan_control;
