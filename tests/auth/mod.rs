pub mod register_test;
pub mod reset_password_test;
