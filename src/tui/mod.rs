pub mod input;
pub mod mode;
pub mod scope;
pub mod view;
