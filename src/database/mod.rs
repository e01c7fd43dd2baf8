pub mod connection;
pub mod seed;
pub mod vocabulary;
