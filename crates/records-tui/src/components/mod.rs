pub mod header;
pub mod help_overlay;
pub mod player;
pub mod record_info;
pub mod record_stack;
