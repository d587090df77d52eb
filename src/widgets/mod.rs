pub mod cell_editor;
pub mod controls;
pub mod debug;
pub mod grid;
pub mod saved_list;
pub mod toast;
