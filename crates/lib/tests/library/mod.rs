pub mod coercion_tests;
pub mod mapping_tests;
pub mod strict_tests;
