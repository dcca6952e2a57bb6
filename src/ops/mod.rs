pub mod board;
pub mod filter;
pub mod labels;
pub mod lifecycle;
pub mod order;
pub mod seed;
pub mod selection;
pub mod todo_ops;
