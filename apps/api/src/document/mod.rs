pub mod path;
pub mod skills;
