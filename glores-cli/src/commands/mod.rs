pub mod apply;
pub mod run;
pub mod status;
pub mod update;
