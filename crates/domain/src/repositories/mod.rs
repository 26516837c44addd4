//! Repository Abstractions - persistence contracts for the catalog

mod part_repository;

pub use part_repository::PartRepository;
