pub mod db;
pub mod events;
pub mod repo;
pub mod stacks;
pub mod tags;
pub mod tasks;
