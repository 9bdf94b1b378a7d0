// LLM prompt constants for résumé classification.
// JSON-only enforcement comes from llm_client::prompts::JSON_ONLY_SYSTEM.

/// Classification prompt. Replace `{categories}` and `{resume_text}` before sending.
pub const CLASSIFY_PROMPT_TEMPLATE: &str = r#"Classify the following resume into exactly one job category.

Allowed categories (use the label exactly as written):
{categories}

Return a JSON object with this EXACT schema (no extra fields):
{"category": "<one allowed category>"}

Resume:
"""
{resume_text}
""""#;
