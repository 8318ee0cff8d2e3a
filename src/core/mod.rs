// Edit-LSH: Core Types
//
// Alphabet, probability parameters, random oracle and the transcript hash
// family. Everything here is immutable once built.

pub mod alphabet;
pub mod config;
pub mod family;
pub mod oracle;
pub mod params;
pub mod transcript;
pub mod types;
