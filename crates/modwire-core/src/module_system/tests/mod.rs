pub mod permissions_tests;
pub mod uninstall_tests;
