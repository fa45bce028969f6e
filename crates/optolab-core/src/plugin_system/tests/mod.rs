pub mod support;

pub mod manager_tests;
