pub mod support;

mod polling_tests;
