use super::ValuationError;
use crate::vehicle::ValuationRecord;

pub const TEXT_SYSTEM_PROMPT: &str = r#"You are a helpful car valuation assistant.
The user will provide a car description like "Honda Civic 2024".
Reply with only a JSON object in this exact format:

{
  "make": string,
  "model": string,
  "year": number,
  "valueRange": string,
  "engine": string,
  "horsepower": number,
  "drivetrain": string,
  "description": string,
  "priceHistoryMonthly": [{"name": string, "value": number}],
  "priceHistoryYearly": [{"name": string, "value": number}],
  "listings": [{"id": number, "title": string, "price": string, "mileage": string}]
}

priceHistoryMonthly covers the last 12 months, priceHistoryYearly the last 5 years.
Provide up to 4 listings with realistic price and mileage estimates."#;

pub const PHOTO_SYSTEM_PROMPT: &str = r#"You are a helpful car valuation assistant.
The user will provide an image of a car.
Identify the vehicle and reply with only a JSON object in this exact format:

{
  "make": string,
  "model": string,
  "year": number,
  "valueRange": string,
  "engine": string,
  "horsepower": number,
  "drivetrain": string,
  "description": string,
  "priceHistoryMonthly": [{"name": string, "value": number}],
  "priceHistoryYearly": [{"name": string, "value": number}],
  "listings": [{"id": number, "title": string, "price": string, "mileage": string}]
}"#;

/// Parses a model reply into a record, tolerating a surrounding markdown fence.
pub fn parse_reply(reply: &str) -> Result<ValuationRecord, ValuationError> {
    let body = strip_code_fence(reply);
    if body.is_empty() {
        return Err(ValuationError::EmptyReply);
    }
    Ok(serde_json::from_str(body)?)
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string on the opening line, whatever its case.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim_end().trim_end_matches("```").trim()
}
