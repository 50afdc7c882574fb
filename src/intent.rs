// Keyword buckets, checked in order - first hit wins
const INTENTS: &[(&str, &[&str])] = &[
    ("property_law", &["property", "real estate", "landlord", "tenant", "rent", "deposit", "lease", "eviction", "housing"]),
    ("employment_law", &["job", "employment", "salary", "workplace", "fired", "resignation", "termination", "labor"]),
    ("family_law", &["marriage", "divorce", "custody", "alimony", "domestic", "family", "dowry", "maintenance"]),
    ("criminal_law", &["police", "arrest", "crime", "criminal", "theft", "assault", "bail", "fir", "complaint"]),
    ("consumer_law", &["consumer", "refund", "warranty", "defective", "fraud", "complaint", "product", "service"]),
    ("contract_law", &["contract", "agreement", "breach", "terms", "conditions", "violation", "business"]),
    ("civil_law", &["civil", "damages", "compensation", "negligence", "liability", "tort", "injury"]),
    ("tax_law", &["tax", "income tax", "gst", "tds", "return", "penalty", "assessment"]),
    ("constitutional_law", &["constitutional", "fundamental rights", "petition", "writ", "supreme court", "high court"]),
];

pub const GENERAL: &str = "general_legal";

/// Tag a user message with a coarse legal area using substring keywords.
pub fn detect_intent(message: &str) -> &'static str {
    let lowered = message.to_lowercase();

    INTENTS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(GENERAL)
}
