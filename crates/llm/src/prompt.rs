//! Prompt builders
//!
//! Two prompts drive the pipeline: a structured-extraction prompt that must
//! come back as strict JSON, and a web-search prompt whose markdown output is
//! parsed into service records.

use referral_agent_core::Language;

/// System prompt for the intent extractor
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a specialized assistant that extracts \
specific structured information from human services queries.";

/// Build the intent-extraction prompt
///
/// The category vocabulary is the full distinct set currently present in the
/// catalog; the model is asked for exact-match categories ranked by
/// relevance plus a 5-digit postal code, as strict JSON.
pub fn extraction_prompt(query: &str, categories: &[String]) -> String {
    let vocabulary = categories.join(", ");
    format!(
        r#"TASK: Extract TWO key pieces of information from this query:
1. ALL RELEVANT SERVICE CATEGORIES that match what the user is asking for
2. The specific POSTAL CODE where they need these services

User Query: "{query}"

AVAILABLE SERVICE CATEGORIES IN DATABASE:
{vocabulary}

DETAILED INSTRUCTIONS:

1. SERVICE CATEGORIES:
   - Identify ALL categories from our database that relate to what the user is asking for
   - Look for both EXACT MATCHES and SIMILAR/RELATED terms to what the user is asking about
   - Rank categories by relevance: exact matches first, followed by similar/related matches
   - Consider synonyms and related concepts (e.g., "hungry" -> "Food Pantry", "can't pay rent" -> "Housing")
   - Return ALL relevant categories without limiting the number
   - Be comprehensive, but don't include categories that are completely unrelated
   - If no categories match or relate, return an empty array

2. POSTAL CODE:
   - Extract the exact 5-digit postal code where the user needs services
   - Look for a 5-digit number in the query (e.g., 60605, 90210, 30312)
   - If no postal code is mentioned, return null

EXAMPLES:
"Where are the food pantries in my area?" -> ["Food Pantry"], null
"Where are the food pantries in 60605?" -> ["Food Pantry"], "60605"
"Where are the shelters near 90210?" -> ["Homeless Services", "Housing"], "90210"

RESPONSE FORMAT:
Return ONLY a JSON object with this structure:
{{
    "service_categories": ["category1", "category2", ...],
    "postal_code": "5-digit postal code or null if none found"
}}

The response must be valid, parseable JSON with no additional text."#
    )
}

/// System prompt for the web-search fallback, with language enforcement
pub fn fallback_system_prompt(language: Language) -> String {
    format!(
        "You are a specialized assistant that provides detailed information about human \
services and support resources.\n\
IMPORTANT: You must respond ONLY in {language} language. Do not use any other language.\n\
Your responses should be helpful, accurate, and culturally sensitive.\n\
When you don't know the answer to something, acknowledge it rather than making up information."
    )
}

/// Build the web-search fallback prompt
///
/// The response-format example is load-bearing: the parser keys off bolded
/// organization names, the address on the following line, and `-`-prefixed
/// detail bullets.
pub fn fallback_prompt(query: &str, postal_code: Option<&str>, language: Language) -> String {
    let location = match postal_code {
        Some(code) => format!("Postal code {code}"),
        None => "Location not specified".to_string(),
    };
    format!(
        r#"TASK: Respond to a user query about human services and support resources.

USER QUERY: "{query}"

LOCATION CONTEXT: {location}

DETAILED INSTRUCTIONS:

1. SERVICE UNDERSTANDING:
   - Correctly identify what services the user is looking for
   - Consider both explicit and implicit needs in the query
   - For questions about food, address food pantries, meal programs, SNAP benefits, etc.
   - For questions about shelter, address emergency shelters, housing assistance, etc.
   - For questions about children, address childcare, youth programs, family services, etc.
   - For questions about medical needs, address clinics, healthcare programs, etc.

2. LOCATION AWARENESS:
   - If a postal code is provided, incorporate this into your response
   - If no location is specified, provide general information applicable to most locations
   - When appropriate, mention that services vary by location

3. RESPONSE STRUCTURE:
   - Begin with a direct answer to the user's question
   - For each service, put the organization name in bold using markdown (** **)
   - After the organization name, list its full address on the next line
   - Use bullet points for hours, phone, and additional information
   - Keep your response concise but informative
   - CRITICAL: Your entire response must be in {language} language only

RESPONSE FORMAT EXAMPLE:
**Organization Name**
123 Main Street, City, State 12345
- Hours: Monday-Friday 9am-5pm
- Phone: 555-123-4567
- Additional information: Provides food, clothing, and emergency assistance.

**Second Organization**
456 Oak Avenue, City, State 12345
- Hours: Tuesday & Thursday 10am-2pm
- Phone: 555-987-6543
- Requirements: Must bring ID and proof of residence

REMEMBER: Your entire response must be in {language} language. This is absolutely required."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_contains_vocabulary() {
        let categories = vec!["Food Pantry".to_string(), "Housing".to_string()];
        let prompt = extraction_prompt("I need food in 60605", &categories);
        assert!(prompt.contains("Food Pantry, Housing"));
        assert!(prompt.contains("I need food in 60605"));
        assert!(prompt.contains("service_categories"));
    }

    #[test]
    fn test_fallback_prompt_location_context() {
        let with = fallback_prompt("food pantries", Some("60605"), Language::English);
        assert!(with.contains("Postal code 60605"));

        let without = fallback_prompt("food pantries", None, Language::English);
        assert!(without.contains("Location not specified"));
    }

    #[test]
    fn test_fallback_prompts_enforce_language() {
        let system = fallback_system_prompt(Language::Polish);
        assert!(system.contains("ONLY in polish"));
        let user = fallback_prompt("schronisko", None, Language::Polish);
        assert!(user.contains("must be in polish language"));
    }
}
