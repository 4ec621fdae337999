pub mod agent;
pub mod errors;
pub mod models;
pub mod news;
pub mod prompt_template;
pub mod providers;
pub mod scraper;
pub mod summarizer;
pub mod tools;
