pub mod challenge;
pub mod participant;
