//! Core runtime types

pub mod entity;
