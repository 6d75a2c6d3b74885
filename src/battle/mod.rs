pub mod engine;
pub mod events;
pub mod queue;
pub mod stats;

#[cfg(test)]
mod tests;
