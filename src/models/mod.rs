pub mod aggregate;
pub mod entity;
pub mod event;
pub mod language_tally;
pub mod repository;
pub mod store;

#[cfg(test)]
pub mod test_fixtures;
