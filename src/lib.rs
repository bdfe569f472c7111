pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod gateway;
pub mod library;
pub mod practice;
pub mod reader;
pub mod text;
pub mod vocabulary;
