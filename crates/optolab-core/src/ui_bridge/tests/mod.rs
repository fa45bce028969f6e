pub mod window_tests;
