//! Instruction template for the structured extraction call.

/// Render the extraction prompt.
///
/// Inputs are interpolated verbatim in a single pass, so braces or
/// placeholder-like text inside the news cannot disturb the template.
#[must_use]
pub fn render(company_name: &str, stock_code: &str, news: &str) -> String {
    format!(
        r#"You are a financial analysis assistant.

Your task is to:
1. Carefully read the financial news about a company.
2. Think step-by-step to extract the key information: entities, sentiment, industries, and implications.
3. Output the structured analysis as a single JSON object.

Use exactly this format for your final answer:

```json
{{
  "company_name": "string",
  "stock_code": "string",
  "newsdesc": "string",
  "sentiment": "Positive | Neutral | Negative",
  "people_names": ["string", "..."],
  "places_names": ["string", "..."],
  "other_companies_referred": ["string", "..."],
  "related_industries": ["string", "..."],
  "market_implications": "string",
  "confidence_score": 0.0
}}
```

"sentiment" must be one of Positive, Neutral or Negative.
"confidence_score" is a number from 0 to 1.
Every key is required; use an empty list when nothing applies.
Be strict with JSON formatting. Only return the JSON, with no extra text or explanation.

Company: {company_name}
Ticker: {stock_code}

News Articles:
{news}

Think step-by-step and return your analysis in the required format.
"#
    )
}
