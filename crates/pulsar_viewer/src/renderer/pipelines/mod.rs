pub mod points;
pub mod post_stack;
