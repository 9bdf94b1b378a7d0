// Résumé analysis pipeline.
// Implements: lexicon lookup, field extraction, embeddings, similarity scoring,
// ranking and classification. LLM calls go through llm_client only.

pub mod classification;
pub mod embedding;
pub mod extractor;
pub mod handlers;
pub mod lexicon;
pub mod prompts;
pub mod ranking;
pub mod similarity;
