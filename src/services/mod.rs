pub mod facilities;
pub mod forms;
pub mod front_page;
pub mod lifecycle;
pub mod links;
pub mod loader;
pub mod logos;
pub mod ordering;
pub mod stats;
