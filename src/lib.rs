pub mod acl;
pub mod commands;
pub mod common;
pub mod config;
pub mod fs;
pub mod storage;
pub mod web;
