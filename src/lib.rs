pub mod epa_model;
pub mod fake_pbp;
pub mod pbp_fetch;
pub mod play_data;
pub mod situation;
pub mod state;
