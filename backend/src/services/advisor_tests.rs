use super::*;
use crate::routes::advisor::FormValue;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Replays a canned completion and records the prompts it saw.
struct Canned {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl Canned {
    fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextGenerator for Canned {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        self.prompts.lock().push(prompt.to_string());
        self.reply.clone().map_err(|message| AiError::Provider { message })
    }
}

#[test]
fn test_fenced_json_wins_over_bare_braces() {
    let text = "Note {not json}\n```json\n{\"predictedYield\": 4.2}\n```";
    assert_eq!(extract_json(text, &OBJECT_RE), Some("{\"predictedYield\": 4.2}"));
}

#[test]
fn test_prediction_from_fenced_json() {
    let text = "Here you go:\n```json\n{\"predictedYield\": 4.2, \"confidence\": 85, \
                \"factors\": [\"Rainfall\", \"Soil\"], \"recommendations\": \"Irrigate\"}\n```";
    let p = parse_prediction(text);
    assert_eq!(p.predicted_yield, 4.2);
    assert_eq!(p.confidence, 85.0);
    assert_eq!(p.factors, Advice::Items(vec!["Rainfall".into(), "Soil".into()]));
    assert_eq!(p.recommendations, Advice::from("Irrigate"));
    assert!(p.raw_response.is_none());
}

#[test]
fn test_prediction_from_bare_object_with_string_numbers() {
    let text = r#"Result: {"predictedYield": "3.5", "confidence": "90%"} done"#;
    let p = parse_prediction(text);
    assert_eq!(p.predicted_yield, 3.5);
    assert_eq!(p.confidence, 90.0);
}

#[test]
fn test_prediction_regex_fallback() {
    let text = "Expect around 12.5 metric tons with 80% confidence.";
    let p = parse_prediction(text);
    assert_eq!(p.predicted_yield, 12.5);
    assert_eq!(p.confidence, 80.0);
    assert_eq!(p.factors, Advice::Text(text.to_string()));
    assert_eq!(p.raw_response.as_deref(), Some(text));
}

#[test]
fn test_prediction_regex_defaults() {
    let p = parse_prediction("I cannot say.");
    assert_eq!(p.predicted_yield, 0.0);
    assert_eq!(p.confidence, DEFAULT_CONFIDENCE);
}

#[test]
fn test_malformed_object_uses_regex() {
    let p = parse_prediction("{ predictedYield: 7 tons, 60% }");
    assert_eq!(p.predicted_yield, 7.0);
    assert_eq!(p.confidence, 60.0);
}

#[test]
fn test_recommendations_from_array() {
    let text = r#"[{"cropName":"Maize","reason":"Warm","suitabilityScore":9},
                   {"cropName":"Onion","reason":"Demand","suitabilityScore":"7"}]"#;
    let recs = parse_recommendations(text);
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0], CropRecommendation::new("Maize", "Warm", 9.0));
    assert_eq!(recs[1].suitability_score, 7.0);
}

#[test]
fn test_recommendations_without_json_use_defaults() {
    let recs = parse_recommendations("Grow wheat and rice.");
    let names: Vec<&str> = recs.iter().map(|r| r.crop_name.as_str()).collect();
    assert_eq!(names, ["Wheat", "Rice", "Cotton"]);
}

#[test]
fn test_malformed_recommendations() {
    let recs = parse_recommendations("[Wheat, Rice]");
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[1].reason, "High demand and good climate");
}

#[test]
fn test_unavailable_prediction_range() {
    let mut rng = StdRng::seed_from_u64(11);
    let err = AiError::EmptyResponse;
    for _ in 0..50 {
        let p = unavailable_prediction(&mut rng, &err);
        assert!((50.0..150.0).contains(&p.predicted_yield));
        assert_eq!(p.confidence, FALLBACK_CONFIDENCE);
        assert!(p.error.is_some());
    }
}

#[tokio::test]
async fn test_unconfigured_advisor_reports_config_error() {
    let advisor = YieldAdvisor::unconfigured();
    assert!(!advisor.is_configured());
    let err = advisor
        .predict_yield(&YieldRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AiError::Config { .. }));
    assert!(advisor
        .recommend_crops(&RecommendationRequest::default())
        .await
        .is_err());
}

#[tokio::test]
async fn test_prompt_applies_defaults() {
    let generator = Canned::ok("{\"predictedYield\": 2}");
    let advisor = YieldAdvisor::new(generator.clone());
    let req = YieldRequest {
        crop_type: Some("Rice".to_string()),
        area: Some(FormValue::Number(2.5)),
        latitude: Some(FormValue::Text("30.9".to_string())),
        ..Default::default()
    };
    let p = advisor.predict_yield(&req).await.unwrap();
    assert_eq!(p.predicted_yield, 2.0);

    let prompts = generator.prompts.lock();
    let prompt = &prompts[0];
    assert!(prompt.contains("- Crop Type: Rice\n"));
    assert!(prompt.contains("- Area (hectares): 2.5\n"));
    assert!(prompt.contains("- Weather Condition: Normal\n"));
    assert!(prompt.contains("- Fertilizer Used: Organic\n"));
    assert!(prompt.contains("- Historical Yield (if available): Not available\n"));
    assert!(prompt.contains("Latitude 30.9, Longitude Not specified"));
}

#[tokio::test]
async fn test_generator_failure_is_absorbed() {
    let advisor = YieldAdvisor::new(Canned::failing("quota exceeded"));
    let p = advisor
        .predict_yield(&YieldRequest::default())
        .await
        .unwrap();
    assert!((50.0..150.0).contains(&p.predicted_yield));
    assert!(p.error.unwrap().contains("quota exceeded"));

    let recs = advisor
        .recommend_crops(&RecommendationRequest::default())
        .await
        .unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[1].reason, "High demand");
}

#[tokio::test]
async fn test_recommendation_prompt_uses_season() {
    let generator = Canned::ok("[]");
    let advisor = YieldAdvisor::new(generator.clone());
    let req = RecommendationRequest {
        season: Some("Kharif".to_string()),
        ..Default::default()
    };
    assert!(advisor.recommend_crops(&req).await.unwrap().is_empty());
    assert!(generator.prompts.lock()[0].contains("season: Kharif,"));
}
