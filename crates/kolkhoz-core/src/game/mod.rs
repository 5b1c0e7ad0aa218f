pub mod assignment;
pub mod decision;
pub mod error;
pub mod history;
pub mod jobs;
pub mod requisition;
pub mod rules;
pub mod serialization;
pub mod state;
