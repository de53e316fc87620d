// SQLite module - the database handle the mapper runs on
//
// - config: location and connection options
// - params: conversion between mapper values and SQLite values
// - query: row value extraction
// - cursor: scoped statements
// - savepoint: nested transaction guards
// - database: the handle itself

pub mod config;
pub mod cursor;
pub mod database;
pub mod params;
pub mod query;
pub mod savepoint;

pub use config::{DatabaseOptions, DatabaseOptionsBuilder, DbLocation, MEMORY_MARKER};
pub use cursor::{Cursor, CursorRows};
pub use database::Database;
pub use params::Params;
pub use savepoint::Savepoint;
