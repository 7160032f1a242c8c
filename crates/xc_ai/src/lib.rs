pub mod answer;
pub mod corpus;
pub mod extract;
pub mod llm;
pub mod ollama;
pub mod pipeline;
pub mod retrieve;
