//! CLI module for promptr - command-line interface and subcommands.
//!
//! Provides the entry point with subcommands for rendering templates,
//! invoking a model, streaming a response, and the scripted demo.

pub mod commands;

pub use commands::Cli;
