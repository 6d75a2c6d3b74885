pub mod common;

mod special_tests;
