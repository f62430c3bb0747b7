pub mod challenge;
pub mod participant;
pub mod submission;
