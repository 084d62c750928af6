use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TopicViewPayload {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    #[validate(range(min = 0, max = 1440))]
    #[serde(default)]
    pub time_spent: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TopicCompletionPayload {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    #[validate(range(min = 0, max = 1440))]
    #[serde(default)]
    pub time_to_complete: i32,
    #[validate(range(min = 0.0, max = 100.0))]
    pub quiz_score: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub code_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseActivityPayload {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    #[validate(length(min = 1, max = 200))]
    pub exercise_id: String,
    pub completed: bool,
    #[validate(range(min = 0.0, max = 100.0))]
    pub score: Option<f64>,
    #[validate(range(min = 0, max = 1440))]
    #[serde(default)]
    pub time_spent: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateTopicPayload {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(range(min = 1, max = 5, message = "Difficulty must be between 1 and 5"))]
    pub difficulty: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_out_of_range_is_rejected() {
        let payload: RateTopicPayload =
            serde_json::from_str(r#"{"topic":"Rust","rating":6}"#).unwrap();
        assert!(payload.validate().is_err());
        let payload: RateTopicPayload =
            serde_json::from_str(r#"{"topic":"Rust","rating":4,"difficulty":2}"#).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn time_defaults_to_zero() {
        let payload: TopicViewPayload = serde_json::from_str(r#"{"topic":"Rust"}"#).unwrap();
        assert_eq!(payload.time_spent, 0);
    }
}
