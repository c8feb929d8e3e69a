use serde::{Deserialize, Serialize};

/// Outcome of processing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub restaurant: Option<String>,
    /// True iff `restaurant` is set.
    pub success: bool,
}

impl ExtractionResult {
    pub fn new(text: String, restaurant: Option<String>) -> Self {
        let success = restaurant.is_some();
        ExtractionResult {
            text,
            restaurant,
            success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_follows_restaurant() {
        assert!(ExtractionResult::new("kfc".into(), Some("kfc".into())).success);
        assert!(!ExtractionResult::new("nothing".into(), None).success);
    }

    #[test]
    fn serializes_with_null_restaurant() {
        let json = serde_json::to_value(ExtractionResult::new(String::new(), None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "text": "", "restaurant": null, "success": false })
        );
    }
}
