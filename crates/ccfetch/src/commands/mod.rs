/// `ccfetch clean`.
pub mod clean;
/// `ccfetch fetch`.
pub mod fetch;
/// `ccfetch plan`.
pub mod plan;
/// `ccfetch spec`.
pub mod spec;
/// `ccfetch status`.
pub mod status;
