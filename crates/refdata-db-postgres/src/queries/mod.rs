//! SQL query modules for the PostgreSQL record store.

pub mod crud;
