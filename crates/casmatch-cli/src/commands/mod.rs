pub mod extract;
pub mod list;
pub mod reference;
pub mod run;
