pub mod code_allocator;
pub mod password;
pub mod validators;
